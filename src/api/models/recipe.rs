use serde::Serialize;
use crate::api::models::DrinkId;

/// Every catalog recipe pours for this many cl worth of time.
pub const RECIPE_VOLUME_CL: u32 = 25;
/// Flat price of a catalog recipe.
pub const RECIPE_COST_POINTS: f64 = 25.0;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Recipe {
    pub name: String,
    pub ingredients: Vec<DrinkId>
}

impl Recipe {
    pub fn new(name: &str, ingredients: &[&str]) -> Self {
        Recipe {
            name: name.to_string(),
            ingredients: ingredients.iter().map(|ingredient| DrinkId::from(*ingredient)).collect()
        }
    }

    pub fn catalog() -> Vec<Recipe> {
        vec![
            Recipe::new("Vodka Cola", &["Vodka", "Coca Cola"]),
            Recipe::new("Bacardi Cola", &["Bacardi", "Coca Cola"]),
            Recipe::new("Fanta Korn", &["Fanta", "Vodka"]),
        ]
    }

    pub fn find(name: &str) -> Option<Recipe> {
        let name = name.trim();
        Recipe::catalog().into_iter().find(|recipe| recipe.name.eq_ignore_ascii_case(name))
    }
}
