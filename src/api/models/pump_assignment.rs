use std::collections::HashSet;
use std::hash::Hash;
use serde::Serialize;
use crate::api::error::{ Error, Result };
use crate::api::models::{ DrinkId, PumpId, PUMP_COUNT };

/// Which drink every pump currently holds. Always a bijection between the
/// fixed pump set and the fixed drink set; the only mutation is [`swap`].
///
/// [`swap`]: PumpAssignment::swap
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct PumpAssignment {
    pumps: Vec<PumpId>,
    drinks: Vec<DrinkId>
}

impl PumpAssignment {
    /// `drinks[i]` is assigned to `pumps[i]`.
    pub fn new(pumps: Vec<PumpId>, drinks: Vec<DrinkId>) -> Result<Self> {
        if pumps.len() != PUMP_COUNT || drinks.len() != PUMP_COUNT {
            return Err(Error::Config(format!(
                "expected {} pumps and {} drinks, got {} and {}",
                PUMP_COUNT, PUMP_COUNT, pumps.len(), drinks.len()
            )));
        }
        if !all_distinct(&pumps) {
            return Err(Error::Config(String::from("pump channels must be distinct")));
        }
        if !all_distinct(&drinks) {
            return Err(Error::Config(String::from("drink list contains duplicates")));
        }
        Ok(PumpAssignment { pumps, drinks })
    }

    pub fn pumps(&self) -> &[PumpId] {
        &self.pumps
    }

    pub fn drinks(&self) -> &[DrinkId] {
        &self.drinks
    }

    pub fn iter(&self) -> impl Iterator<Item = (PumpId, &DrinkId)> {
        self.pumps.iter().copied().zip(self.drinks.iter())
    }

    pub fn drink_for(&self, pump: PumpId) -> Option<&DrinkId> {
        self.index_of_pump(pump).map(|index| &self.drinks[index])
    }

    pub fn pump_for(&self, drink: &DrinkId) -> Option<PumpId> {
        self.drinks.iter().position(|held| held == drink).map(|index| self.pumps[index])
    }

    pub fn is_bijection(&self) -> bool {
        self.pumps.len() == PUMP_COUNT
            && self.drinks.len() == PUMP_COUNT
            && all_distinct(&self.pumps)
            && all_distinct(&self.drinks)
    }

    /// Gives `pump` the drink `desired` and hands its old drink to whichever
    /// pump held `desired`. Returns that other pump, or `None` when `pump`
    /// already held `desired`.
    pub fn swap(&mut self, pump: PumpId, desired: &DrinkId) -> Result<Option<PumpId>> {
        let index_a = self.index_of_pump(pump).ok_or(Error::UnknownPump(pump))?;
        let index_b = self.drinks.iter().position(|held| held == desired).ok_or_else(|| {
            Error::Consistency(format!("no pump holds \"{}\"", desired))
        })?;
        if index_a == index_b {
            return Ok(None);
        }
        self.drinks.swap(index_a, index_b);
        Ok(Some(self.pumps[index_b]))
    }

    fn index_of_pump(&self, pump: PumpId) -> Option<usize> {
        self.pumps.iter().position(|candidate| *candidate == pump)
    }
}

fn all_distinct<T: Eq + Hash>(items: &[T]) -> bool {
    let mut seen = HashSet::new();
    items.iter().all(|item| seen.insert(item))
}
