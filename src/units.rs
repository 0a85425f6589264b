//! Angular unit conversion and scope-correction helpers.
//!
//! Everything here is plain linear arithmetic on a measured offset at a
//! known range; none of it touches the trajectory solver.

use serde::{Deserialize, Serialize};

use crate::constants::{CM_TO_MIL_AT_RANGE, CM_TO_MOA_AT_RANGE, MIL_TO_MOA};
use crate::error::{BallisticsError, Validator};

/// Angular unit for holds and dial corrections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AngularUnit {
    Mil,
    Moa,
}

impl AngularUnit {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mil" | "mils" | "mrad" => Some(AngularUnit::Mil),
            "moa" => Some(AngularUnit::Moa),
            _ => None,
        }
    }

    /// Express a value given in mil in this unit.
    pub fn from_mil(self, mil: f64) -> f64 {
        match self {
            AngularUnit::Mil => mil,
            AngularUnit::Moa => mil_to_moa(mil),
        }
    }
}

impl std::fmt::Display for AngularUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AngularUnit::Mil => write!(f, "mil"),
            AngularUnit::Moa => write!(f, "MOA"),
        }
    }
}

/// Dial correction: positive `up` means dial up, positive `right` dial right.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScopeCorrection {
    pub up: f64,
    pub right: f64,
    pub unit: AngularUnit,
}

/// A hold in mil, as reported by the solver (elevation up, windage right).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Hold {
    pub up_mil: f64,
    pub right_mil: f64,
}

/// Observed point-of-impact offset from the aim point, in centimeters.
/// Positive `up_cm` means the group landed high, positive `right_cm` right.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ImpactOffset {
    pub up_cm: f64,
    pub right_cm: f64,
}

pub fn mil_to_moa(mil: f64) -> f64 {
    mil * MIL_TO_MOA
}

pub fn moa_to_mil(moa: f64) -> f64 {
    moa / MIL_TO_MOA
}

/// Linear drop/drift at range (m) to an angular hold in mil.
pub fn hold_mil(offset_m: f64, range_m: f64) -> f64 {
    offset_m / range_m * 1000.0
}

fn correction_from_offset(
    range_m: f64,
    offset: ImpactOffset,
    factor: f64,
    unit: AngularUnit,
) -> Result<ScopeCorrection, BallisticsError> {
    let mut v = Validator::new();
    v.positive("range_m", range_m);
    v.finite("offset_up_cm", offset.up_cm);
    v.finite("offset_right_cm", offset.right_cm);
    v.finish()?;

    Ok(ScopeCorrection {
        up: (-offset.up_cm * factor) / range_m,
        right: (-offset.right_cm * factor) / range_m,
        unit,
    })
}

/// Dial correction in mil that moves the group back onto the aim point.
pub fn mil_from_offset(
    range_m: f64,
    offset_up_cm: f64,
    offset_right_cm: f64,
) -> Result<ScopeCorrection, BallisticsError> {
    correction_from_offset(
        range_m,
        ImpactOffset { up_cm: offset_up_cm, right_cm: offset_right_cm },
        CM_TO_MIL_AT_RANGE,
        AngularUnit::Mil,
    )
}

/// Dial correction in MOA that moves the group back onto the aim point.
pub fn moa_from_offset(
    range_m: f64,
    offset_up_cm: f64,
    offset_right_cm: f64,
) -> Result<ScopeCorrection, BallisticsError> {
    correction_from_offset(
        range_m,
        ImpactOffset { up_cm: offset_up_cm, right_cm: offset_right_cm },
        CM_TO_MOA_AT_RANGE,
        AngularUnit::Moa,
    )
}

/// Refined dial setting: the predicted hold plus the correction implied by
/// the observed offset, in the requested unit.
///
/// Every non-finite input and a non-positive range are reported together.
pub fn suggest_scope_correction(
    predicted_hold: Hold,
    observed_offset: ImpactOffset,
    range_m: f64,
    unit: AngularUnit,
) -> Result<ScopeCorrection, BallisticsError> {
    let mut v = Validator::new();
    v.positive("range_m", range_m);
    v.finite("offset_up_cm", observed_offset.up_cm);
    v.finite("offset_right_cm", observed_offset.right_cm);
    v.finite("hold_up_mil", predicted_hold.up_mil);
    v.finite("hold_right_mil", predicted_hold.right_mil);
    v.finish()?;

    let factor = match unit {
        AngularUnit::Mil => CM_TO_MIL_AT_RANGE,
        AngularUnit::Moa => CM_TO_MOA_AT_RANGE,
    };
    let correction = correction_from_offset(range_m, observed_offset, factor, unit)?;

    Ok(ScopeCorrection {
        up: unit.from_mil(predicted_hold.up_mil) + correction.up,
        right: unit.from_mil(predicted_hold.right_mil) + correction.right,
        unit,
    })
}
