use std::fs;
use std::path::Path;
use std::sync::{ Arc, Mutex };
use drink_kiosk::api::models::{ DispenseEvent, DispenseRequest, DrinkId, PumpId, Recipe, UserId };
use drink_kiosk::api::{
    Channel, ChannelBank, ChannelError, DispenseScheduler, DualAllocator, Error, KioskConfig, KioskService,
    PointsLedger, PumpRegistryFactory, ResourceService, Slider
};

/// Records which pumps are energized right now.
struct RecordingChannel {
    pump: PumpId,
    energized: Arc<Mutex<Vec<PumpId>>>,
    fail_activate: bool
}

impl Channel for RecordingChannel {
    fn activate(&mut self) -> Result<(), ChannelError> {
        if self.fail_activate {
            return Err(ChannelError::from(format!("relay {} stuck", self.pump)));
        }
        self.energized.lock().unwrap().push(self.pump);
        Ok(())
    }

    fn deactivate(&mut self) -> Result<(), ChannelError> {
        self.energized.lock().unwrap().retain(|pump| *pump != self.pump);
        Ok(())
    }
}

struct Fixture {
    kiosk: KioskService,
    energized: Arc<Mutex<Vec<PumpId>>>,
    ledger_file_path: std::path::PathBuf,
    _dir: tempfile::TempDir
}

fn fixture() -> Fixture {
    // 1 ms per cl keeps a 25 cl pour at 25 ms.
    fixture_with_flow(1)
}

fn fixture_with_flow(ms_per_cl: u64) -> Fixture {
    fixture_with_channels(ms_per_cl, &[], &[])
}

/// Leaves the `missing` pumps out of the channel bank and makes the `failing`
/// ones refuse to switch on.
fn fixture_with_channels(ms_per_cl: u64, missing: &[PumpId], failing: &[PumpId]) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let mut config = KioskConfig::with_data_dir(dir.path());
    config.ms_per_cl = ms_per_cl;
    fs::write(&config.ledger_file_path, "1001, Alice, 100.0\n1002, Bob, 30.0\nbroken\n").unwrap();

    let resource_service = ResourceService::embedded().unwrap();
    let registry = PumpRegistryFactory::create(&config, &resource_service).unwrap();
    let ledger = PointsLedger::load(resource_service.clone(), config.ledger_file_path.clone().into_boxed_path()).unwrap();
    let energized = Arc::new(Mutex::new(vec![]));
    let channels = config
        .pump_pin_numbers
        .iter()
        .filter(|pump| !missing.contains(*pump))
        .map(|pump| {
            let channel: Box<dyn Channel> = Box::new(RecordingChannel {
                pump: *pump,
                energized: energized.clone(),
                fail_activate: failing.contains(pump)
            });
            (*pump, channel)
        })
        .collect();
    let scheduler = DispenseScheduler::new(resource_service.clone(), ChannelBank::new(resource_service.clone(), channels));
    let kiosk = KioskService::new(resource_service, registry, ledger, scheduler, config.ms_per_cl);
    Fixture { kiosk, energized, ledger_file_path: config.ledger_file_path, _dir: dir }
}

fn stored_balance(ledger_file_path: &Path, user: &str) -> f64 {
    let reloaded = PointsLedger::load(ResourceService::embedded().unwrap(), ledger_file_path.to_path_buf().into_boxed_path()).unwrap();
    reloaded.balance(&UserId::from(user)).unwrap()
}

#[test]
fn test_recipe_pours_on_assigned_pumps_and_costs_25() {
    let fixture = fixture();
    let alice = UserId::from("1001");
    let recipe = Recipe::find("Vodka Cola").unwrap();
    let handle = fixture.kiosk.dispense_request(&alice, &DispenseRequest::Recipe(recipe)).unwrap();
    // Default base list puts Vodka on 17 and Coca Cola on 20.
    assert_eq!(handle.job().pumps, vec![PumpId(17), PumpId(20)]);
    assert_eq!(handle.job().duration_in_milliseconds, 25);
    handle.wait().unwrap();

    assert!(fixture.energized.lock().unwrap().is_empty());
    assert_eq!(fixture.kiosk.balance(&alice).unwrap(), 75.0);
    assert_eq!(stored_balance(&fixture.ledger_file_path, "1001"), 75.0);
    assert_eq!(stored_balance(&fixture.ledger_file_path, "1002"), 30.0);
}

#[test]
fn test_reassignment_moves_the_pour() {
    let fixture = fixture();
    fixture.kiosk.reassign(PumpId(17), &DrinkId::from("Coca Cola")).unwrap();
    let recipe = Recipe::find("Vodka Cola").unwrap();
    let handle = fixture.kiosk.dispense_request(&UserId::from("1001"), &DispenseRequest::Recipe(recipe)).unwrap();
    assert_eq!(handle.job().pumps, vec![PumpId(20), PumpId(17)]);
    handle.wait().unwrap();
}

#[test]
fn test_blend_from_sliders() {
    let fixture = fixture();
    let mut allocator = DualAllocator::new();
    allocator.set_value(Slider::Alcohol, 10);
    allocator.set_value(Slider::Soft, 15);
    let request = DispenseRequest::Blend {
        alcohol: DrinkId::from("Bacardi"),
        soft: DrinkId::from("Fanta"),
        volumes: allocator.values()
    };
    let bob = UserId::from("1002");
    let handle = fixture.kiosk.dispense_request(&bob, &request).unwrap();
    assert_eq!(handle.job().pumps, vec![PumpId(18), PumpId(22)]);
    assert_eq!(handle.job().duration_in_milliseconds, 15);
    handle.wait().unwrap();
    assert!((fixture.kiosk.balance(&bob).unwrap() - 18.5).abs() < 1e-9);
}

#[test]
fn test_busy_kiosk_rejects_without_charging() {
    let fixture = fixture_with_flow(20);
    let alice = UserId::from("1001");
    let rinse = fixture.kiosk.dispense_request(&alice, &DispenseRequest::Rinse).unwrap();
    assert_eq!(rinse.job().pumps.len(), 6);

    let recipe = DispenseRequest::Recipe(Recipe::find("Fanta Korn").unwrap());
    assert!(matches!(fixture.kiosk.dispense_request(&alice, &recipe), Err(Error::Busy)));
    assert_eq!(fixture.kiosk.balance(&alice).unwrap(), 100.0);

    let events: Vec<DispenseEvent> = rinse.events().collect();
    assert_eq!(events.last(), Some(&DispenseEvent::Done));
    assert_eq!(events.len(), 102);
    fixture.kiosk.dispense_request(&alice, &recipe).unwrap().wait().unwrap();
    assert_eq!(fixture.kiosk.balance(&alice).unwrap(), 75.0);
}

#[test]
fn test_unknown_card_pours_nothing() {
    let fixture = fixture();
    let recipe = DispenseRequest::Recipe(Recipe::find("Bacardi Cola").unwrap());
    assert!(matches!(fixture.kiosk.authenticate(&UserId::from("9999")), Err(Error::UnknownUser(_))));
    assert!(matches!(fixture.kiosk.dispense_request(&UserId::from("9999"), &recipe), Err(Error::UnknownUser(_))));
    assert!(!fixture.kiosk.is_dispensing());
    assert!(fixture.energized.lock().unwrap().is_empty());
}

#[test]
fn test_recharge_bounds() {
    let fixture = fixture();
    let bob = UserId::from("1002");
    assert_eq!(fixture.kiosk.recharge(&bob, 1000).unwrap(), 1030.0);
    assert!(matches!(fixture.kiosk.recharge(&bob, 1001), Err(Error::Input(_))));
    assert_eq!(stored_balance(&fixture.ledger_file_path, "1002"), 1030.0);
}

#[test]
fn test_empty_blend_rejected() {
    let fixture = fixture();
    let request = DispenseRequest::Blend {
        alcohol: DrinkId::from("Vodka"),
        soft: DrinkId::from("Fanta"),
        volumes: DualAllocator::new().values()
    };
    assert!(matches!(fixture.kiosk.dispense_request(&UserId::from("1001"), &request), Err(Error::EmptyRequest)));
}

#[test]
fn test_pump_states_follow_assignment() {
    let fixture = fixture();
    fixture.kiosk.reassign(PumpId(21), &DrinkId::from("Vodka")).unwrap();
    let states = fixture.kiosk.pump_states().unwrap();
    assert_eq!(states.len(), 6);
    assert_eq!(states[0].drink, DrinkId::from("Orange Juice"));
    assert_eq!(states[4].drink, DrinkId::from("Vodka"));
    assert!(states.iter().all(|state| !state.is_running));
}

#[test]
fn test_refund_when_the_pour_cannot_start() {
    // Coca Cola sits on pump 20, which has no channel.
    let fixture = fixture_with_channels(1, &[PumpId(20)], &[]);
    let alice = UserId::from("1001");
    let recipe = DispenseRequest::Recipe(Recipe::find("Vodka Cola").unwrap());
    assert!(matches!(fixture.kiosk.dispense_request(&alice, &recipe), Err(Error::UnknownPump(PumpId(20)))));
    assert_eq!(fixture.kiosk.balance(&alice).unwrap(), 100.0);
    assert_eq!(stored_balance(&fixture.ledger_file_path, "1001"), 100.0);
    assert!(!fixture.kiosk.is_dispensing());
    assert!(fixture.energized.lock().unwrap().is_empty());
}

#[test]
fn test_relay_fault_mid_start_keeps_the_charge() {
    let fixture = fixture_with_channels(1, &[], &[PumpId(20)]);
    let alice = UserId::from("1001");
    let recipe = DispenseRequest::Recipe(Recipe::find("Vodka Cola").unwrap());
    let handle = fixture.kiosk.dispense_request(&alice, &recipe).unwrap();
    assert!(matches!(handle.wait(), Err(Error::DispenseFault(_))));
    assert!(fixture.energized.lock().unwrap().is_empty());
    assert!(!fixture.kiosk.is_dispensing());
    assert_eq!(fixture.kiosk.balance(&alice).unwrap(), 75.0);
    assert_eq!(stored_balance(&fixture.ledger_file_path, "1001"), 75.0);
}

#[test]
fn test_overflowing_flow_rate_charges_nothing() {
    let fixture = fixture_with_flow(u64::MAX);
    let alice = UserId::from("1001");
    let recipe = DispenseRequest::Recipe(Recipe::find("Fanta Korn").unwrap());
    assert!(matches!(fixture.kiosk.dispense_request(&alice, &recipe), Err(Error::Config(_))));
    assert_eq!(fixture.kiosk.balance(&alice).unwrap(), 100.0);
    assert!(!fixture.kiosk.is_dispensing());
}

#[test]
fn test_cancel_dispense_switches_everything_off() {
    let fixture = fixture_with_flow(1000);
    let handle = fixture.kiosk.dispense_request(&UserId::from("1002"), &DispenseRequest::Rinse).unwrap();
    assert_eq!(handle.events().next(), Some(DispenseEvent::Progress(0)));
    assert_eq!(fixture.energized.lock().unwrap().len(), 6);
    fixture.kiosk.cancel_dispense();
    assert!(matches!(handle.wait(), Err(Error::Cancelled)));
    assert!(fixture.energized.lock().unwrap().is_empty());
    assert!(!fixture.kiosk.is_dispensing());
}
