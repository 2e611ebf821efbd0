use std::collections::BTreeMap;
use std::fs;
use std::io::{ ErrorKind, Write };
use std::path::Path;
use serde_json::json;
use crate::api::error::{ Error, Result };
use crate::api::models::{ DrinkId, PumpAssignment, PumpId };
use crate::api::ResourceService;

/// Durable pump to drink mapping: a JSON object keyed by pump channel number.
pub struct ConfigStore {
    resource_service: ResourceService,
    config_file_path: Box<Path>
}

impl ConfigStore {
    pub fn new(resource_service: ResourceService, config_file_path: Box<Path>) -> ConfigStore {
        ConfigStore { resource_service, config_file_path }
    }

    pub fn path(&self) -> &Path {
        &self.config_file_path
    }

    /// Drinks stored for `pumps`, in the same order. `Ok(None)` when nothing
    /// has been saved yet.
    pub fn load(&self, pumps: &[PumpId]) -> Result<Option<Vec<DrinkId>>> {
        let config_json = match fs::read_to_string(&self.config_file_path) {
            Ok(config_json) => config_json,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                let message = self.resource_service.render(
                    "pump_config_missing_info_message_template",
                    &json!({ "path": self.config_file_path.display().to_string() })
                );
                log::info!("{}", message);
                return Ok(None);
            },
            Err(error) => return Err(error.into())
        };
        let mut stored: BTreeMap<String, String> = serde_json::from_str(&config_json)?;
        let mut drinks = vec![];
        for pump in pumps {
            match stored.remove(&pump.to_string()) {
                Some(drink) => drinks.push(DrinkId::from(drink)),
                None => return Err(Error::Config(format!("pump {} missing from {}", pump, self.config_file_path.display())))
            }
        }
        if let Some(extra) = stored.keys().next() {
            return Err(Error::Config(format!("unknown pump \"{}\" in {}", extra, self.config_file_path.display())));
        }
        log::debug!("{}", self.resource_service.render(
            "pump_config_loaded_debug_message_template",
            &json!({ "path": self.config_file_path.display().to_string() })
        ));
        Ok(Some(drinks))
    }

    /// Rewrites the whole file. The new content goes to a sibling temp file
    /// first so a crash never leaves a half written mapping behind.
    pub fn save(&self, assignment: &PumpAssignment) -> Result<()> {
        let stored: BTreeMap<String, String> = assignment
            .iter()
            .map(|(pump, drink)| (pump.to_string(), drink.to_string()))
            .collect();
        let config_json = serde_json::to_string_pretty(&stored)?;
        if let Some(parent) = self.config_file_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let temp_file_path = self.config_file_path.with_extension("json.tmp");
        let mut config_file = fs::File::create(&temp_file_path)?;
        config_file.write_all(config_json.as_bytes())?;
        config_file.sync_all()?;
        fs::rename(&temp_file_path, &self.config_file_path)?;
        log::debug!("{}", self.resource_service.render(
            "pump_config_saved_debug_message_template",
            &json!({ "path": self.config_file_path.display().to_string() })
        ));
        Ok(())
    }
}
