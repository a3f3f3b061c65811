//! Instrument configuration: every input the optical model reads.
//! Values are not range-checked here; the formula accepts any real input.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::OpticsError;
use crate::presets::ObjectivePreset;

/// Contrast technique used to observe the specimen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationMethod {
    #[default]
    Brightfield,
    Darkfield,
    Phase,
    Fluorescence,
}

impl ObservationMethod {
    pub const ALL: [ObservationMethod; 4] = [
        ObservationMethod::Brightfield,
        ObservationMethod::Darkfield,
        ObservationMethod::Phase,
        ObservationMethod::Fluorescence,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ObservationMethod::Brightfield => "brightfield",
            ObservationMethod::Darkfield => "darkfield",
            ObservationMethod::Phase => "phase",
            ObservationMethod::Fluorescence => "fluorescence",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ObservationMethod::Brightfield => "Brightfield",
            ObservationMethod::Darkfield => "Darkfield",
            ObservationMethod::Phase => "Phase contrast",
            ObservationMethod::Fluorescence => "Fluorescence",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ObservationMethod::Brightfield => "Standard observation",
            ObservationMethod::Darkfield => "High-contrast objects",
            ObservationMethod::Phase => "Transparent structures",
            ObservationMethod::Fluorescence => "Maximum resolution",
        }
    }
}

impl FromStr for ObservationMethod {
    type Err = OpticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "brightfield" => Ok(ObservationMethod::Brightfield),
            "darkfield" => Ok(ObservationMethod::Darkfield),
            "phase" => Ok(ObservationMethod::Phase),
            "fluorescence" => Ok(ObservationMethod::Fluorescence),
            _ => Err(OpticsError::UnknownMethod(s.to_string())),
        }
    }
}

impl fmt::Display for ObservationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Complete input to one evaluation of the optical model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    /// Illumination wavelength in nanometers
    pub wavelength_nm: f64,
    pub objective_na: f64,
    pub objective_magnification: u32,
    /// Only drives the illumination advisory, never the resolution
    pub condenser_na: f64,
    pub immersion: bool,
    pub method: ObservationMethod,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        InstrumentConfig {
            wavelength_nm: 550.0,
            objective_na: ObjectivePreset::X40.numerical_aperture(),
            objective_magnification: ObjectivePreset::X40.magnification(),
            condenser_na: 0.9,
            immersion: ObjectivePreset::X40.immersion(),
            method: ObservationMethod::Brightfield,
        }
    }
}

impl InstrumentConfig {
    pub fn with_wavelength(self, wavelength_nm: f64) -> Self {
        InstrumentConfig {
            wavelength_nm,
            ..self
        }
    }

    /// Install an objective from the preset table, keeping NA and immersion consistent
    pub fn with_objective(self, preset: ObjectivePreset) -> Self {
        InstrumentConfig {
            objective_na: preset.numerical_aperture(),
            objective_magnification: preset.magnification(),
            immersion: preset.immersion(),
            ..self
        }
    }

    /// Override the objective NA without touching magnification or immersion
    pub fn with_objective_na(self, objective_na: f64) -> Self {
        InstrumentConfig {
            objective_na,
            ..self
        }
    }

    pub fn with_condenser_na(self, condenser_na: f64) -> Self {
        InstrumentConfig {
            condenser_na,
            ..self
        }
    }

    pub fn with_method(self, method: ObservationMethod) -> Self {
        InstrumentConfig { method, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_initial_instrument() {
        let config = InstrumentConfig::default();
        assert_eq!(config.wavelength_nm, 550.0);
        assert_eq!(config.objective_magnification, 40);
        assert_eq!(config.objective_na, 0.65);
        assert_eq!(config.condenser_na, 0.9);
        assert!(!config.immersion);
        assert_eq!(config.method, ObservationMethod::Brightfield);
    }

    #[test]
    fn test_with_objective_derives_immersion() {
        let config = InstrumentConfig::default().with_objective(ObjectivePreset::X100);
        assert_eq!(config.objective_magnification, 100);
        assert_eq!(config.objective_na, 1.4);
        assert!(config.immersion);

        let config = config.with_objective(ObjectivePreset::X60);
        assert_eq!(config.objective_na, 0.85);
        assert!(!config.immersion);
    }

    #[test]
    fn test_na_override_accepts_any_pair() {
        let config = InstrumentConfig::default().with_objective_na(0.3);
        assert_eq!(config.objective_magnification, 40);
        assert_eq!(config.objective_na, 0.3);
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!(
            "Fluorescence".parse::<ObservationMethod>(),
            Ok(ObservationMethod::Fluorescence)
        );
        assert_eq!(" phase ".parse::<ObservationMethod>(), Ok(ObservationMethod::Phase));
        assert_eq!(
            "dic".parse::<ObservationMethod>(),
            Err(OpticsError::UnknownMethod("dic".to_string()))
        );
    }

    #[test]
    fn test_method_round_trips_through_its_name() {
        for method in ObservationMethod::ALL {
            assert_eq!(method.as_str().parse::<ObservationMethod>(), Ok(method));
        }
    }

    #[test]
    fn test_method_serializes_lowercase() {
        let json = serde_json::to_string(&ObservationMethod::Fluorescence).unwrap();
        assert_eq!(json, "\"fluorescence\"");
    }
}
