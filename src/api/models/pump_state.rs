use serde::Serialize;
use crate::api::models::{ DrinkId, PumpId };

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct PumpState {
    pub pump: PumpId,
    pub drink: DrinkId,
    pub is_running: bool
}
