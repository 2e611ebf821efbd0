use std::sync::{ Mutex, MutexGuard };
use serde_json::json;
use crate::api::error::{ Error, Result };
use crate::api::models::{ DrinkId, PumpAssignment, PumpId, PumpMenu };
use crate::api::{ ConfigStore, ResourceService };

struct RegistryState {
    assignment: PumpAssignment,
    menus: Vec<PumpMenu>
}

/// Owns the pump to drink bijection. Every change goes through
/// [`reassign`], which swaps two pumps and persists under one lock.
///
/// [`reassign`]: PumpRegistry::reassign
pub struct PumpRegistry {
    resource_service: ResourceService,
    config_store: ConfigStore,
    pumps: Vec<PumpId>,
    state: Mutex<RegistryState>
}

impl PumpRegistry {
    pub fn new(
        resource_service: ResourceService,
        config_store: ConfigStore,
        assignment: PumpAssignment,
        menus: Vec<PumpMenu>
    ) -> PumpRegistry {
        PumpRegistry {
            resource_service,
            config_store,
            pumps: assignment.pumps().to_vec(),
            state: Mutex::new(RegistryState { assignment, menus })
        }
    }

    pub fn pumps(&self) -> &[PumpId] {
        &self.pumps
    }

    /// Points `pump` at `desired` and moves its previous drink to the pump
    /// that held `desired`. Returns the assignment after the change.
    pub fn reassign(&self, pump: PumpId, desired: &DrinkId) -> Result<PumpAssignment> {
        let mut state = self.lock_state()?;
        let menu = state.menus.iter().find(|menu| menu.pump == pump).ok_or(Error::UnknownPump(pump))?;
        if !menu.contains(desired) {
            return Err(Error::NotInMenu { pump, drink: desired.clone() });
        }
        let mut candidate = state.assignment.clone();
        let old_drink = candidate.drink_for(pump).cloned().ok_or(Error::UnknownPump(pump))?;
        let other_pump = match candidate.swap(pump, desired)? {
            Some(other_pump) => other_pump,
            None => return Ok(candidate)
        };
        if !candidate.is_bijection() {
            return Err(Error::Consistency(format!("swapping pumps {} and {} broke the assignment", pump, other_pump)));
        }
        self.config_store.save(&candidate)?;
        state.assignment = candidate.clone();
        let message_data = &json!({
            "pump": pump.0,
            "drink": desired.as_str(),
            "other_pump": other_pump.0,
            "old_drink": old_drink.as_str()
        });
        log::info!("{}", self.resource_service.render("pump_reassigned_info_message_template", message_data));
        Ok(candidate)
    }

    pub fn lookup(&self, drink: &DrinkId) -> Result<PumpId> {
        let state = self.lock_state()?;
        Self::lookup_in(&state, drink)
    }

    /// Resolves several drinks against one snapshot of the assignment.
    pub fn lookup_all(&self, drinks: &[DrinkId]) -> Result<Vec<PumpId>> {
        let state = self.lock_state()?;
        drinks.iter().map(|drink| Self::lookup_in(&state, drink)).collect()
    }

    pub fn current_assignment(&self) -> Result<PumpAssignment> {
        Ok(self.lock_state()?.assignment.clone())
    }

    pub fn menu(&self, pump: PumpId) -> Result<PumpMenu> {
        let state = self.lock_state()?;
        state.menus.iter().find(|menu| menu.pump == pump).cloned().ok_or(Error::UnknownPump(pump))
    }

    fn lookup_in(state: &RegistryState, drink: &DrinkId) -> Result<PumpId> {
        if let Some(pump) = state.assignment.pump_for(drink) {
            return Ok(pump);
        }
        // A drink from the menus that no pump holds means the bijection broke.
        if state.menus.iter().any(|menu| menu.contains(drink)) {
            return Err(Error::Consistency(format!("\"{}\" is not assigned to any pump", drink)));
        }
        Err(Error::UnknownDrink(drink.clone()))
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, RegistryState>> {
        self.state.lock().map_err(|_| Error::poisoned("pump registry"))
    }
}
