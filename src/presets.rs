//! Discrete instrument settings offered by the control panel.

use serde::Serialize;
use std::ops::RangeInclusive;

use crate::error::{OpticsError, Result};

/// Condenser apertures the panel offers
pub const CONDENSER_NA_PRESETS: [f64; 3] = [0.5, 0.9, 1.25];

/// Visible-light slider range, violet to red
pub const WAVELENGTH_RANGE_NM: RangeInclusive<f64> = 400.0..=700.0;
pub const WAVELENGTH_STEP_NM: f64 = 10.0;

/// Objective lenses; each magnification fixes its NA and immersion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectivePreset {
    X10,
    X40,
    X60,
    X100,
}

impl ObjectivePreset {
    pub const ALL: [ObjectivePreset; 4] = [
        ObjectivePreset::X10,
        ObjectivePreset::X40,
        ObjectivePreset::X60,
        ObjectivePreset::X100,
    ];

    pub fn from_magnification(magnification: u32) -> Result<Self> {
        match magnification {
            10 => Ok(ObjectivePreset::X10),
            40 => Ok(ObjectivePreset::X40),
            60 => Ok(ObjectivePreset::X60),
            100 => Ok(ObjectivePreset::X100),
            other => Err(OpticsError::UnknownMagnification(other)),
        }
    }

    pub fn magnification(self) -> u32 {
        match self {
            ObjectivePreset::X10 => 10,
            ObjectivePreset::X40 => 40,
            ObjectivePreset::X60 => 60,
            ObjectivePreset::X100 => 100,
        }
    }

    pub fn numerical_aperture(self) -> f64 {
        match self {
            ObjectivePreset::X10 => 0.25,
            ObjectivePreset::X40 => 0.65,
            ObjectivePreset::X60 => 0.85,
            ObjectivePreset::X100 => 1.4,
        }
    }

    /// Only the 100x objective is an oil-immersion lens
    pub fn immersion(self) -> bool {
        matches!(self, ObjectivePreset::X100)
    }
}

/// Serializable row of the objective table
#[derive(Debug, Clone, Serialize)]
pub struct ObjectiveInfo {
    pub magnification: u32,
    pub numerical_aperture: f64,
    pub immersion: bool,
}

impl From<ObjectivePreset> for ObjectiveInfo {
    fn from(preset: ObjectivePreset) -> Self {
        ObjectiveInfo {
            magnification: preset.magnification(),
            numerical_aperture: preset.numerical_aperture(),
            immersion: preset.immersion(),
        }
    }
}

/// Clamp to the slider range and round to the nearest slider step.
/// Non-finite input snaps to the 550 nm default.
pub fn snap_wavelength(wavelength_nm: f64) -> f64 {
    if !wavelength_nm.is_finite() {
        return 550.0;
    }
    let clamped = wavelength_nm.clamp(*WAVELENGTH_RANGE_NM.start(), *WAVELENGTH_RANGE_NM.end());
    (clamped / WAVELENGTH_STEP_NM).round() * WAVELENGTH_STEP_NM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objective_table() {
        let rows: Vec<(u32, f64, bool)> = ObjectivePreset::ALL
            .iter()
            .map(|p| (p.magnification(), p.numerical_aperture(), p.immersion()))
            .collect();
        assert_eq!(
            rows,
            vec![
                (10, 0.25, false),
                (40, 0.65, false),
                (60, 0.85, false),
                (100, 1.4, true),
            ]
        );
    }

    #[test]
    fn test_from_magnification() {
        for preset in ObjectivePreset::ALL {
            assert_eq!(ObjectivePreset::from_magnification(preset.magnification()), Ok(preset));
        }
        assert_eq!(
            ObjectivePreset::from_magnification(20),
            Err(OpticsError::UnknownMagnification(20))
        );
    }

    #[test]
    fn test_snap_wavelength() {
        assert_eq!(snap_wavelength(550.0), 550.0);
        assert_eq!(snap_wavelength(553.0), 550.0);
        assert_eq!(snap_wavelength(556.0), 560.0);
        assert_eq!(snap_wavelength(250.0), 400.0);
        assert_eq!(snap_wavelength(900.0), 700.0);
        assert_eq!(snap_wavelength(f64::NAN), 550.0);
    }
}
