use std::collections::HashSet;
use std::path::{ Path, PathBuf };
use crate::api::error::{ Error, Result };
use crate::api::models::{ DrinkId, PumpId, PUMP_COUNT };

const DEFAULT_CHIP_NAME: &str = "/dev/gpiochip0";
const DEFAULT_PUMP_PIN_NUMBERS: &str = "17,18,19,20,21,22";
const DEFAULT_MILLISECONDS_PER_CL: u64 = 1000;
const DEFAULT_PUMP_CONFIG_FILE_PATH: &str = ".drink-kiosk/pump_config.json";
const DEFAULT_LEDGER_FILE_PATH: &str = ".drink-kiosk/accepted_id.txt";
const DEFAULT_DRINKS: &str = "Vodka,Bacardi,Lelet,Coca Cola,Orange Juice,Fanta";

#[derive(Clone, Debug)]
pub struct KioskConfig {
    pub rpi_chip_name: String,
    pub is_relay_inverted: bool,
    /// Pump channels in display order ("Pump 1" first).
    pub pump_pin_numbers: Vec<PumpId>,
    pub ms_per_cl: u64,
    pub pump_config_file_path: PathBuf,
    pub ledger_file_path: PathBuf,
    pub default_drinks: Vec<DrinkId>,
    pub strings_xml_file_path: Option<PathBuf>
}

impl KioskConfig {
    pub fn from_env() -> Result<KioskConfig> {
        let home_dir = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let config = KioskConfig {
            rpi_chip_name: var_or("RPI_CHIP_NAME", DEFAULT_CHIP_NAME),
            is_relay_inverted: var_or("IS_RELAY_INVERTED", "0").ends_with('1'),
            pump_pin_numbers: parse_pump_pin_numbers(&var_or("ORDERED_PUMP_PIN_NUMBERS", DEFAULT_PUMP_PIN_NUMBERS))?,
            ms_per_cl: var_or("MILLISECONDS_PER_CL", &DEFAULT_MILLISECONDS_PER_CL.to_string())
                .trim()
                .parse::<u64>()
                .map_err(|error| Error::Config(format!("MILLISECONDS_PER_CL: {}", error)))?,
            pump_config_file_path: home_dir.join(var_or("PUMP_CONFIG_FILE_PATH", DEFAULT_PUMP_CONFIG_FILE_PATH)),
            ledger_file_path: home_dir.join(var_or("LEDGER_FILE_PATH", DEFAULT_LEDGER_FILE_PATH)),
            default_drinks: parse_drink_list(&var_or("DEFAULT_DRINKS", DEFAULT_DRINKS)),
            strings_xml_file_path: dotenv::var("STRINGS_XML_FILE_PATH").ok().map(|path| home_dir.join(path))
        };
        Ok(config)
    }

    /// Defaults with both data files placed under `data_dir`.
    pub fn with_data_dir(data_dir: &Path) -> KioskConfig {
        KioskConfig {
            rpi_chip_name: DEFAULT_CHIP_NAME.to_string(),
            is_relay_inverted: false,
            pump_pin_numbers: (17..=22).map(PumpId).collect(),
            ms_per_cl: DEFAULT_MILLISECONDS_PER_CL,
            pump_config_file_path: data_dir.join("pump_config.json"),
            ledger_file_path: data_dir.join("accepted_id.txt"),
            default_drinks: parse_drink_list(DEFAULT_DRINKS),
            strings_xml_file_path: None
        }
    }
}

fn var_or(key: &str, default: &str) -> String {
    dotenv::var(key).unwrap_or_else(|_| {
        log::debug!("{} not set, using default: {}", key, default);
        default.to_string()
    })
}

pub fn parse_pump_pin_numbers(value: &str) -> Result<Vec<PumpId>> {
    let mut pump_pin_numbers = vec![];
    for number in value.split(',') {
        let pump = number.parse::<PumpId>()
            .map_err(|_| Error::Config(format!("\"{}\" is not a pin number", number.trim())))?;
        pump_pin_numbers.push(pump);
    }
    let distinct: HashSet<&PumpId> = pump_pin_numbers.iter().collect();
    if pump_pin_numbers.len() != PUMP_COUNT || distinct.len() != PUMP_COUNT {
        return Err(Error::Config(format!("expected {} distinct pump pins, got \"{}\"", PUMP_COUNT, value)));
    }
    Ok(pump_pin_numbers)
}

pub fn parse_drink_list(value: &str) -> Vec<DrinkId> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(DrinkId::from)
        .collect()
}
