use serde::Serialize;
use crate::api::error::{ Error, Result };
use crate::api::models::{ DrinkId, PumpAssignment, PumpId, PUMP_COUNT };

/// The drinks a pump may be switched to.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct PumpMenu {
    pub pump: PumpId,
    pub options: Vec<DrinkId>
}

impl PumpMenu {
    pub fn contains(&self, drink: &DrinkId) -> bool {
        self.options.contains(drink)
    }
}

/// Builds one menu per pump by rotating the base list left by the pump's
/// index. The head of rotation `k` is `base[k]`, so the initial selections
/// are exactly the base list and every drink is reachable from every pump.
pub struct RotationGenerator {}

impl RotationGenerator {
    pub fn generate(pumps: &[PumpId], base: &[DrinkId]) -> Result<(PumpAssignment, Vec<PumpMenu>)> {
        if base.len() != PUMP_COUNT {
            return Err(Error::Config(format!("expected {} drinks, got {}", PUMP_COUNT, base.len())));
        }
        let assignment = PumpAssignment::new(pumps.to_vec(), base.to_vec())?;
        let menus = pumps
            .iter()
            .enumerate()
            .map(|(index, pump)| {
                let mut options = base.to_vec();
                options.rotate_left(index);
                PumpMenu { pump: *pump, options }
            })
            .collect();
        Ok((assignment, menus))
    }
}
