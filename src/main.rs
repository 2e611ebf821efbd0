use std::io::{ self, BufRead, Write };
use std::sync::mpsc::{ self, Receiver, Sender };
use std::sync::{ Arc, Weak };
use std::thread;
use drink_kiosk::api::models::{ DispenseEvent, DispenseRequest, DrinkId, PumpId, Recipe, UserAccount, UserId };
use drink_kiosk::api::{ DispenseHandle, DualAllocator, Error, KioskConfig, KioskService, KioskServiceFactory, Slider };

const HELP: &str = "\
login <card id>        log a card in
logout                 log the current card out
balance                show the current balance
pumps                  show what every pump holds
menu <pump>            show the drinks a pump can switch to
assign <pump> <drink>  load a drink on a pump
recipes                list the fixed recipes
mix <recipe>           pour a fixed recipe (25 points)
blend <alcohol> | <soft> | <alcohol cl> | <soft cl>
                       pour a free blend (1 point per cl alcohol, 0.1 per cl soft)
rinse                  flush every pump
recharge <points>      add 0 to 1000 points to the current card
quit                   leave";

#[derive(Debug, PartialEq)]
enum Command {
    Login(UserId),
    Logout,
    Balance,
    Pumps,
    Menu(PumpId),
    Assign(PumpId, DrinkId),
    Recipes,
    Mix(String),
    Blend { alcohol: DrinkId, soft: DrinkId, alcohol_cl: u32, soft_cl: u32 },
    Rinse,
    Recharge(u32),
    Help,
    Quit
}

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.find(char::is_whitespace) {
        Some(index) => (&line[..index], line[index..].trim()),
        None => (line, "")
    };
    match word.to_ascii_lowercase().as_str() {
        "login" => Ok(Command::Login(UserId::from(require(rest, "a card id")?))),
        "logout" => Ok(Command::Logout),
        "balance" => Ok(Command::Balance),
        "pumps" => Ok(Command::Pumps),
        "menu" => Ok(Command::Menu(parse_pump(require(rest, "a pump number")?)?)),
        "assign" => {
            let rest = require(rest, "a pump number and a drink")?;
            let (pump, drink) = match rest.find(char::is_whitespace) {
                Some(index) => (&rest[..index], rest[index..].trim()),
                None => return Err(String::from("Expected a drink"))
            };
            Ok(Command::Assign(parse_pump(pump)?, DrinkId::from(drink)))
        },
        "recipes" => Ok(Command::Recipes),
        "mix" => Ok(Command::Mix(require(rest, "a recipe name")?.to_string())),
        "blend" => {
            let parts: Vec<&str> = require(rest, "a blend")?.split('|').map(str::trim).collect();
            if parts.len() != 4 {
                return Err(String::from("Expected <alcohol> | <soft> | <alcohol cl> | <soft cl>"));
            }
            Ok(Command::Blend {
                alcohol: DrinkId::from(parts[0]),
                soft: DrinkId::from(parts[1]),
                alcohol_cl: parse_amount(parts[2])?,
                soft_cl: parse_amount(parts[3])?
            })
        },
        "rinse" => Ok(Command::Rinse),
        "recharge" => Ok(Command::Recharge(parse_amount(require(rest, "an amount")?)?)),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("Unknown command \"{}\", try help", other))
    }
}

fn require<'a>(rest: &'a str, what: &str) -> Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("Expected {}", what))
    } else {
        Ok(rest)
    }
}

fn current_user(session: &Option<UserAccount>) -> Result<UserId, Error> {
    session
        .as_ref()
        .map(|account| account.id.clone())
        .ok_or_else(|| Error::Input(String::from("Log a card in first")))
}

fn parse_pump(value: &str) -> Result<PumpId, String> {
    value.parse::<PumpId>().map_err(|_| format!("Couldn't parse pump number \"{}\"", value))
}

fn parse_amount(value: &str) -> Result<u32, String> {
    value.trim().parse::<u32>().map_err(|_| format!("Couldn't parse amount \"{}\"", value))
}

fn follow(handle: DispenseHandle) {
    let job_id = handle.job().id;
    let spawned = thread::Builder::new().name(String::from("progress")).spawn(move || {
        for event in handle.events() {
            match event {
                DispenseEvent::Progress(percent) if percent % 10 == 0 => println!("[{}] {}%", job_id, percent),
                DispenseEvent::Progress(_) => {},
                DispenseEvent::Done => println!("[{}] Done, enjoy", job_id),
                DispenseEvent::Fault(message) => println!("[{}] Failed: {}", job_id, message),
                DispenseEvent::Cancelled => println!("[{}] Cancelled", job_id)
            }
        }
    });
    if let Err(error) = spawned {
        log::error!("Couldn't follow dispense progress: {}", error);
    }
}

fn run(kiosk: &KioskService, session: &mut Option<UserAccount>, command: Command) -> Result<bool, Error> {
    match command {
        Command::Login(user) => {
            let account = kiosk.authenticate(&user)?;
            println!("Hello {} ({} points)", account.name, account.balance);
            *session = Some(account);
        },
        Command::Logout => *session = None,
        Command::Balance => println!("{} points", kiosk.balance(&current_user(session)?)?),
        Command::Pumps => {
            for (position, state) in kiosk.pump_states()?.iter().enumerate() {
                let running = if state.is_running { " (running)" } else { "" };
                println!("Pump {} [{}]: {}{}", position + 1, state.pump, state.drink, running);
            }
        },
        Command::Menu(pump) => {
            let options: Vec<String> = kiosk.menu(pump)?.options.iter().map(DrinkId::to_string).collect();
            println!("{}", options.join(", "));
        },
        Command::Assign(pump, drink) => {
            kiosk.reassign(pump, &drink)?;
            println!("Pump {} now pours {}", pump, drink);
        },
        Command::Recipes => {
            for recipe in Recipe::catalog() {
                let ingredients: Vec<String> = recipe.ingredients.iter().map(DrinkId::to_string).collect();
                println!("{}: {}", recipe.name, ingredients.join(" + "));
            }
        },
        Command::Mix(name) => {
            let recipe = Recipe::find(&name).ok_or(Error::UnknownRecipe(name))?;
            follow(kiosk.dispense_request(&current_user(session)?, &DispenseRequest::Recipe(recipe))?);
        },
        Command::Blend { alcohol, soft, alcohol_cl, soft_cl } => {
            let mut allocator = DualAllocator::new();
            allocator.set_value(Slider::Alcohol, alcohol_cl);
            if allocator.set_value(Slider::Soft, soft_cl) < soft_cl {
                println!("Glass is full, pouring {} cl {}", allocator.value(Slider::Soft), soft);
            }
            let request = DispenseRequest::Blend { alcohol, soft, volumes: allocator.values() };
            follow(kiosk.dispense_request(&current_user(session)?, &request)?);
        },
        Command::Rinse => {
            let user = session.as_ref().map(|account| account.id.clone()).unwrap_or_else(|| UserId::from("operator"));
            follow(kiosk.dispense_request(&user, &DispenseRequest::Rinse)?);
        },
        Command::Recharge(amount) => println!("{} points", kiosk.recharge(&current_user(session)?, amount)?),
        Command::Help => println!("{}", HELP),
        Command::Quit => return Ok(false)
    }
    Ok(true)
}

/// What the console loop waits on.
enum Input {
    Line(String),
    Closed,
    Interrupted
}

fn read_stdin(inputs: Sender<Input>) -> io::Result<()> {
    thread::Builder::new().name(String::from("stdin")).spawn(move || {
        let stdin = io::stdin();
        loop {
            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => {
                    if inputs.send(Input::Line(line)).is_err() {
                        return;
                    }
                },
                Err(error) => {
                    log::error!("Couldn't read input: {}", error);
                    break;
                }
            }
        }
        let _ = inputs.send(Input::Closed);
    })?;
    Ok(())
}

/// Ctrl-C and SIGTERM stop the running pour straight away, then end the
/// console loop so the pumps are switched off on the way out.
fn handle_interrupts(kiosk: &Arc<KioskService>, inputs: Sender<Input>) -> Result<(), ctrlc::Error> {
    let kiosk = Arc::downgrade(kiosk);
    ctrlc::set_handler(move || interrupt(&kiosk, &inputs))
}

fn interrupt(kiosk: &Weak<KioskService>, inputs: &Sender<Input>) {
    if let Some(kiosk) = kiosk.upgrade() {
        kiosk.cancel_dispense();
    }
    let _ = inputs.send(Input::Interrupted);
}

/// Runs commands until input ends, the operator quits or an interrupt arrives.
fn console(kiosk: &KioskService, received: &Receiver<Input>) {
    let mut session: Option<UserAccount> = None;
    loop {
        print!("> ");
        let _ = io::stdout().flush();
        let line = match received.recv() {
            Ok(Input::Line(line)) => line,
            Ok(Input::Interrupted) => {
                log::warn!("Interrupted, switching the pumps off");
                return;
            },
            Ok(Input::Closed) | Err(_) => return
        };
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };
        match run(kiosk, &mut session, command) {
            Ok(true) => {},
            Ok(false) => return,
            Err(error) if error.is_fatal() => {
                log::error!("{}", error);
                return;
            },
            Err(error) => println!("{}", error)
        }
    }
}

fn main() {
    dotenv::dotenv().ok();
    env_logger::init();
    let kiosk = match KioskConfig::from_env().and_then(|config| KioskServiceFactory::create(&config)) {
        Ok(kiosk) => Arc::new(kiosk),
        Err(error) => {
            log::error!("Couldn't create kiosk service: {}", error);
            std::process::exit(1);
        }
    };

    let (inputs, received) = mpsc::channel();
    if let Err(error) = handle_interrupts(&kiosk, inputs.clone()) {
        log::warn!("Couldn't install the interrupt handler: {}", error);
    }
    if let Err(error) = read_stdin(inputs) {
        log::error!("Couldn't read input: {}", error);
        kiosk.shutdown();
        drop(kiosk);
        std::process::exit(1);
    }

    println!("MIXOMAT 3000, type help for commands");
    console(&kiosk, &received);
    kiosk.shutdown();
    // The last handle drops the channel bank, which forces every relay off.
    drop(kiosk);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use drink_kiosk::api::{
        Channel, ChannelBank, ChannelError, DispenseScheduler, PointsLedger, PumpRegistryFactory, ResourceService
    };

    struct Relay {
        pump: PumpId,
        energized: Arc<Mutex<Vec<PumpId>>>
    }

    impl Channel for Relay {
        fn activate(&mut self) -> Result<(), ChannelError> {
            self.energized.lock().unwrap().push(self.pump);
            Ok(())
        }

        fn deactivate(&mut self) -> Result<(), ChannelError> {
            self.energized.lock().unwrap().retain(|pump| *pump != self.pump);
            Ok(())
        }
    }

    #[test]
    fn test_interrupt_stops_the_pour_and_the_console() {
        let dir = tempfile::tempdir().unwrap();
        let config = KioskConfig::with_data_dir(dir.path());
        std::fs::write(&config.ledger_file_path, "1001, Alice, 100.0\n").unwrap();
        let resource_service = ResourceService::embedded().unwrap();
        let registry = PumpRegistryFactory::create(&config, &resource_service).unwrap();
        let ledger = PointsLedger::load(resource_service.clone(), config.ledger_file_path.clone().into_boxed_path()).unwrap();
        let energized = Arc::new(Mutex::new(vec![]));
        let channels = config
            .pump_pin_numbers
            .iter()
            .map(|pump| {
                let channel: Box<dyn Channel> = Box::new(Relay { pump: *pump, energized: energized.clone() });
                (*pump, channel)
            })
            .collect();
        let scheduler = DispenseScheduler::new(resource_service.clone(), ChannelBank::new(resource_service.clone(), channels));
        let kiosk = Arc::new(KioskService::new(resource_service, registry, ledger, scheduler, config.ms_per_cl));

        // A rinse at the default flow rate runs for ten seconds.
        let handle = kiosk.dispense_request(&UserId::from("1001"), &DispenseRequest::Rinse).unwrap();
        assert_eq!(handle.events().next(), Some(DispenseEvent::Progress(0)));
        assert_eq!(energized.lock().unwrap().len(), 6);

        let (inputs, received) = mpsc::channel();
        interrupt(&Arc::downgrade(&kiosk), &inputs);
        console(&kiosk, &received);

        assert!(matches!(handle.wait(), Err(Error::Cancelled)));
        assert!(energized.lock().unwrap().is_empty());
        kiosk.shutdown();
        assert!(!kiosk.is_dispensing());
    }

    #[test]
    fn test_parse_assign_keeps_spaces_in_drink() {
        assert_eq!(
            parse_command("assign 19 Orange Juice").unwrap(),
            Command::Assign(PumpId(19), DrinkId::from("Orange Juice"))
        );
    }

    #[test]
    fn test_parse_blend() {
        assert_eq!(
            parse_command("blend Vodka | Coca Cola | 10 | 15").unwrap(),
            Command::Blend {
                alcohol: DrinkId::from("Vodka"),
                soft: DrinkId::from("Coca Cola"),
                alcohol_cl: 10,
                soft_cl: 15
            }
        );
        assert!(parse_command("blend Vodka | 10").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("login").is_err());
        assert!(parse_command("recharge -5").is_err());
        assert!(parse_command("menu pump").is_err());
        assert!(parse_command("dance").is_err());
        assert_eq!(parse_command("  QUIT ").unwrap(), Command::Quit);
    }
}
