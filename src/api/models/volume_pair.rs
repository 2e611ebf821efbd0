use serde::Serialize;
use crate::api::error::{ Error, Result };

/// Most a free blend may hold, in cl.
pub const VOLUME_CAP_CL: u32 = 25;

/// Alcohol and soft drink volumes of a free blend, never exceeding
/// [`VOLUME_CAP_CL`] together.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct VolumePair {
    #[serde(rename = "alcoholCl")]
    alcohol_cl: u32,
    #[serde(rename = "softCl")]
    soft_cl: u32
}

impl VolumePair {
    pub fn new(alcohol_cl: u32, soft_cl: u32) -> Result<Self> {
        if alcohol_cl.saturating_add(soft_cl) > VOLUME_CAP_CL {
            return Err(Error::Input(format!(
                "{} cl + {} cl exceeds the {} cl glass", alcohol_cl, soft_cl, VOLUME_CAP_CL
            )));
        }
        Ok(VolumePair { alcohol_cl, soft_cl })
    }

    /// Caller guarantees the pair is within the cap.
    pub(crate) fn from_parts(alcohol_cl: u32, soft_cl: u32) -> Self {
        debug_assert!(alcohol_cl + soft_cl <= VOLUME_CAP_CL);
        VolumePair { alcohol_cl, soft_cl }
    }

    pub fn alcohol_cl(&self) -> u32 {
        self.alcohol_cl
    }

    pub fn soft_cl(&self) -> u32 {
        self.soft_cl
    }

    pub fn total_cl(&self) -> u32 {
        self.alcohol_cl + self.soft_cl
    }

    pub fn is_empty(&self) -> bool {
        self.total_cl() == 0
    }

    /// Alcohol is charged per cl, soft drinks per 10 cl.
    pub fn points_cost(&self) -> f64 {
        self.alcohol_cl as f64 + self.soft_cl as f64 / 10.0
    }
}
