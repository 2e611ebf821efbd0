use serde::Serialize;
use crate::api::models::{ DrinkId, Recipe, VolumePair, RECIPE_COST_POINTS, RECIPE_VOLUME_CL };

/// Rinsing runs every pump for this many cl worth of time.
pub const RINSE_VOLUME_CL: u32 = 10;

#[derive(Serialize, Clone, Debug, PartialEq)]
pub enum DispenseRequest {
    Recipe(Recipe),
    Blend {
        alcohol: DrinkId,
        soft: DrinkId,
        volumes: VolumePair
    },
    Rinse
}

impl DispenseRequest {
    /// Points to add to the user's balance for this request.
    pub fn points_delta(&self) -> f64 {
        match self {
            DispenseRequest::Recipe(_) => -RECIPE_COST_POINTS,
            DispenseRequest::Blend { volumes, .. } => -volumes.points_cost(),
            DispenseRequest::Rinse => 0.0
        }
    }

    /// Volume that sets the pour time. Blend channels run side by side, so
    /// the larger of the two volumes decides.
    pub fn volume_cl(&self) -> u32 {
        match self {
            DispenseRequest::Recipe(_) => RECIPE_VOLUME_CL,
            DispenseRequest::Blend { volumes, .. } => volumes.alcohol_cl().max(volumes.soft_cl()),
            DispenseRequest::Rinse => RINSE_VOLUME_CL
        }
    }

    /// Drinks whose pumps must run, in order. `None` means every pump.
    pub fn drinks(&self) -> Option<Vec<DrinkId>> {
        match self {
            DispenseRequest::Recipe(recipe) => Some(recipe.ingredients.clone()),
            DispenseRequest::Blend { alcohol, soft, volumes } => {
                let mut drinks = vec![];
                if volumes.alcohol_cl() > 0 {
                    drinks.push(alcohol.clone());
                }
                if volumes.soft_cl() > 0 && !drinks.contains(soft) {
                    drinks.push(soft.clone());
                }
                Some(drinks)
            },
            DispenseRequest::Rinse => None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blend(alcohol_cl: u32, soft_cl: u32) -> DispenseRequest {
        DispenseRequest::Blend {
            alcohol: DrinkId::from("Vodka"),
            soft: DrinkId::from("Fanta"),
            volumes: VolumePair::new(alcohol_cl, soft_cl).unwrap()
        }
    }

    #[test]
    fn test_recipe_costs_flat_25() {
        for recipe in Recipe::catalog() {
            assert_eq!(DispenseRequest::Recipe(recipe).points_delta(), -25.0);
        }
    }

    #[test]
    fn test_blend_cost_and_duration() {
        let request = blend(10, 15);
        assert!((request.points_delta() + 11.5).abs() < 1e-9);
        assert_eq!(request.volume_cl(), 15);
    }

    #[test]
    fn test_blend_skips_empty_side() {
        assert_eq!(blend(0, 12).drinks(), Some(vec![DrinkId::from("Fanta")]));
        assert_eq!(blend(8, 0).drinks(), Some(vec![DrinkId::from("Vodka")]));
        assert_eq!(blend(0, 0).drinks(), Some(vec![]));
    }

    #[test]
    fn test_rinse_is_free_and_uses_every_pump() {
        assert_eq!(DispenseRequest::Rinse.points_delta(), 0.0);
        assert_eq!(DispenseRequest::Rinse.drinks(), None);
        assert_eq!(DispenseRequest::Rinse.volume_cl(), RINSE_VOLUME_CL);
    }
}
