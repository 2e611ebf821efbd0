use serde::Serialize;
use uuid::Uuid;
use crate::api::models::PumpId;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub enum DispenseEvent {
    /// Percent complete, 0 through 100.
    Progress(u8),
    Done,
    Fault(String),
    Cancelled
}

impl DispenseEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, DispenseEvent::Progress(_))
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct DispenseJob {
    pub id: Uuid,
    pub pumps: Vec<PumpId>,
    pub duration_in_milliseconds: u64
}
