use std::fmt;
use std::str::FromStr;
use serde::{ Deserialize, Serialize };

/// Number of physical pump channels the machine is built with.
pub const PUMP_COUNT: usize = 6;

/// A physical pump channel, identified by its GPIO line offset.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct PumpId(pub u32);

impl fmt::Display for PumpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PumpId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<u32>().map(PumpId)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct DrinkId(String);

impl DrinkId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DrinkId {
    fn from(name: &str) -> Self {
        DrinkId(name.trim().to_string())
    }
}

impl From<String> for DrinkId {
    fn from(name: String) -> Self {
        DrinkId::from(name.as_str())
    }
}

impl fmt::Display for DrinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Card id of a kiosk user, as read from the RFID tag.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId(id.trim().to_string())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
