use thiserror::Error;
use crate::api::models::{ DrinkId, PumpId, UserId };

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Dispense fault: {0}")]
    DispenseFault(String),

    #[error("A dispense job is already running")]
    Busy,

    #[error("Dispense job was cancelled")]
    Cancelled,

    #[error("Unknown user \"{0}\"")]
    UnknownUser(UserId),

    #[error("Unknown pump {0}")]
    UnknownPump(PumpId),

    #[error("Pump {pump} can't be assigned \"{drink}\"")]
    NotInMenu { pump: PumpId, drink: DrinkId },

    #[error("No pump is loaded with \"{0}\"")]
    UnknownDrink(DrinkId),

    #[error("Unknown recipe \"{0}\"")]
    UnknownRecipe(String),

    #[error("Nothing to dispense")]
    EmptyRequest,

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Internal consistency failure: {0}")]
    Consistency(String),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Fatal errors mean the kiosk can't keep pouring safely.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Config(_) | Error::Consistency(_))
    }

    pub(crate) fn poisoned(what: &str) -> Self {
        Error::Consistency(format!("{} lock poisoned", what))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
