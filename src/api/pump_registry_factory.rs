use serde_json::json;
use crate::api::error::Result;
use crate::api::models::RotationGenerator;
use crate::api::{ ConfigStore, KioskConfig, PumpRegistry, ResourceService };

pub struct PumpRegistryFactory {}

impl PumpRegistryFactory {
    /// Seeds the registry from the stored mapping, or from the default drink
    /// list on first start (and stores that right away).
    pub fn create(config: &KioskConfig, resource_service: &ResourceService) -> Result<PumpRegistry> {
        let config_store = ConfigStore::new(
            resource_service.clone(),
            config.pump_config_file_path.clone().into_boxed_path()
        );
        let stored_drinks = config_store.load(&config.pump_pin_numbers)?;
        let is_first_start = stored_drinks.is_none();
        let base_drinks = stored_drinks.unwrap_or_else(|| config.default_drinks.clone());
        let (assignment, menus) = RotationGenerator::generate(&config.pump_pin_numbers, &base_drinks)?;
        if is_first_start {
            config_store.save(&assignment)?;
        }
        let drinks: Vec<&str> = assignment.drinks().iter().map(|drink| drink.as_str()).collect();
        log::info!("{}", resource_service.render(
            "pump_registry_ready_info_message_template",
            &json!({ "drinks": drinks.join(", ") })
        ));
        Ok(PumpRegistry::new(resource_service.clone(), config_store, assignment, menus))
    }
}
