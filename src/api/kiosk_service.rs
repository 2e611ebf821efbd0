use std::time::Duration;
use serde_json::json;
use crate::api::error::{ Error, Result };
use crate::api::models::{
    DispenseRequest, DrinkId, PumpAssignment, PumpId, PumpMenu, PumpState, UserAccount, UserId
};
use crate::api::{ DispenseHandle, DispenseScheduler, PointsLedger, PumpRegistry, ResourceService };

/// Largest recharge the operator may enter at once.
pub const MAX_RECHARGE_POINTS: u32 = 1000;

/// What the kiosk front end talks to: pump assignment, points and pouring.
pub struct KioskService {
    resource_service: ResourceService,
    registry: PumpRegistry,
    ledger: PointsLedger,
    scheduler: DispenseScheduler,
    ms_per_cl: u64
}

impl KioskService {
    pub fn new(
        resource_service: ResourceService,
        registry: PumpRegistry,
        ledger: PointsLedger,
        scheduler: DispenseScheduler,
        ms_per_cl: u64
    ) -> KioskService {
        KioskService { resource_service, registry, ledger, scheduler, ms_per_cl }
    }

    pub fn reassign(&self, pump: PumpId, drink: &DrinkId) -> Result<PumpAssignment> {
        self.registry.reassign(pump, drink)
    }

    pub fn current_assignment(&self) -> Result<PumpAssignment> {
        self.registry.current_assignment()
    }

    pub fn menu(&self, pump: PumpId) -> Result<PumpMenu> {
        self.registry.menu(pump)
    }

    pub fn pump_states(&self) -> Result<Vec<PumpState>> {
        let running_pumps = self.scheduler.running_pumps();
        let assignment = self.registry.current_assignment()?;
        Ok(assignment
            .iter()
            .map(|(pump, drink)| PumpState { pump, drink: drink.clone(), is_running: running_pumps.contains(&pump) })
            .collect())
    }

    pub fn authenticate(&self, user: &UserId) -> Result<UserAccount> {
        self.ledger.find(user)?.ok_or_else(|| Error::UnknownUser(user.clone()))
    }

    pub fn balance(&self, user: &UserId) -> Result<f64> {
        self.ledger.balance(user)
    }

    pub fn apply_points(&self, user: &UserId, delta: f64) -> Result<f64> {
        self.ledger.apply(user, delta)
    }

    pub fn recharge(&self, user: &UserId, amount: u32) -> Result<f64> {
        if amount > MAX_RECHARGE_POINTS {
            return Err(Error::Input(format!("recharge is limited to {} points", MAX_RECHARGE_POINTS)));
        }
        self.ledger.apply(user, f64::from(amount))
    }

    pub fn is_dispensing(&self) -> bool {
        self.scheduler.is_busy()
    }

    /// Resolves the request to pumps, charges the user and starts pouring.
    /// Nothing is charged when the machine is busy or the request can't run.
    pub fn dispense_request(&self, user: &UserId, request: &DispenseRequest) -> Result<DispenseHandle> {
        let pumps = match request.drinks() {
            Some(drinks) if drinks.is_empty() => return Err(Error::EmptyRequest),
            Some(drinks) => self.registry.lookup_all(&drinks)?,
            None => self.registry.pumps().to_vec()
        };
        let duration = u64::from(request.volume_cl())
            .checked_mul(self.ms_per_cl)
            .map(Duration::from_millis)
            .ok_or_else(|| Error::Config(format!("flow rate of {}ms per cl overflows the pour time", self.ms_per_cl)))?;
        let admission = self.scheduler.reserve()?;
        let delta = request.points_delta();
        if delta != 0.0 {
            self.ledger.apply(user, delta)?;
        }
        match self.scheduler.start_reserved(admission, duration, &pumps) {
            Ok(handle) => Ok(handle),
            Err(error) => {
                if delta != 0.0 {
                    self.refund(user, delta);
                }
                Err(error)
            }
        }
    }

    /// Stops the running pour, if any, without waiting for it.
    pub fn cancel_dispense(&self) {
        self.scheduler.cancel();
    }

    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    fn refund(&self, user: &UserId, delta: f64) {
        let message_data = &json!({ "user": user.as_str(), "points": -delta });
        match self.ledger.apply(user, -delta) {
            Ok(_) => log::info!("{}", self.resource_service.render("refund_info_message_template", message_data)),
            Err(error) => log::error!(
                "{}: {}", self.resource_service.render("refund_failed_error_message_template", message_data), error
            )
        }
    }
}
