//! Abbe resolution limit of a light microscope.
//!
//! d = 0.61 * λ * k / NA
//!
//! where λ is the illumination wavelength, NA the objective numerical aperture
//! and k a contrast-method factor (0.5 for fluorescence under the default policy).

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::config::{InstrumentConfig, ObservationMethod};
use crate::error::{OpticsError, Result};

/// Rayleigh constant for a circular aperture
pub const ABBE_CONSTANT: f64 = 0.61;

/// Effective factor fluorescence applies to the resolvable distance
pub const FLUORESCENCE_FACTOR: f64 = 0.5;

/// How the observation method scales the resolution distance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MethodFactorPolicy {
    /// Fluorescence halves the resolvable distance
    #[default]
    #[serde(rename = "halved")]
    FluorescenceHalved,
    /// Plain Abbe formula for every method
    Uniform,
}

impl MethodFactorPolicy {
    pub fn factor(self, method: ObservationMethod) -> f64 {
        match (self, method) {
            (MethodFactorPolicy::FluorescenceHalved, ObservationMethod::Fluorescence) => {
                FLUORESCENCE_FACTOR
            }
            _ => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MethodFactorPolicy::FluorescenceHalved => "halved",
            MethodFactorPolicy::Uniform => "uniform",
        }
    }
}

impl FromStr for MethodFactorPolicy {
    type Err = OpticsError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "halved" | "fluorescence-halved" => Ok(MethodFactorPolicy::FluorescenceHalved),
            "uniform" | "plain" => Ok(MethodFactorPolicy::Uniform),
            _ => Err(OpticsError::UnknownPolicy(s.to_string())),
        }
    }
}

/// Abbe limit in nanometers for an explicit method factor
pub fn abbe_limit_nm(wavelength_nm: f64, numerical_aperture: f64, factor: f64) -> Result<f64> {
    if !(numerical_aperture.is_finite() && numerical_aperture > 0.0) {
        return Err(OpticsError::NonPositiveAperture(numerical_aperture));
    }
    Ok((ABBE_CONSTANT * wavelength_nm * factor) / numerical_aperture)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ResolutionCalculator {
    policy: MethodFactorPolicy,
}

impl ResolutionCalculator {
    pub fn new(policy: MethodFactorPolicy) -> Self {
        ResolutionCalculator { policy }
    }

    pub fn policy(&self) -> MethodFactorPolicy {
        self.policy
    }

    /// Smallest resolvable distance in nanometers.
    /// Condenser NA and immersion do not enter the formula.
    pub fn compute(&self, config: &InstrumentConfig) -> Result<f64> {
        abbe_limit_nm(
            config.wavelength_nm,
            config.objective_na,
            self.policy.factor(config.method),
        )
    }
}

/// Resolution under the default fluorescence-halved policy
pub fn compute_resolution(config: &InstrumentConfig) -> Result<f64> {
    ResolutionCalculator::default().compute(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::ObjectivePreset;
    use approx::assert_relative_eq;
    use rand::Rng;

    #[test]
    fn test_brightfield_40x_green() {
        let config = InstrumentConfig::default();
        let d = compute_resolution(&config).unwrap();
        assert_relative_eq!(d, 516.153_846, epsilon = 1e-4);
    }

    #[test]
    fn test_fluorescence_halves_distance() {
        let config = InstrumentConfig::default()
            .with_objective(ObjectivePreset::X100)
            .with_method(ObservationMethod::Fluorescence);
        let d = compute_resolution(&config).unwrap();
        assert_relative_eq!(d, 0.305 * 550.0 / 1.4, epsilon = 1e-9);
        assert_relative_eq!(d, 119.821, epsilon = 1e-3);
    }

    #[test]
    fn test_uniform_policy_ignores_method() {
        let calc = ResolutionCalculator::new(MethodFactorPolicy::Uniform);
        let base = InstrumentConfig::default().with_objective(ObjectivePreset::X100);
        let expected = 0.61 * 550.0 / 1.4;
        for method in ObservationMethod::ALL {
            let d = calc.compute(&base.with_method(method)).unwrap();
            assert_relative_eq!(d, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_condenser_and_immersion_do_not_matter() {
        let config = InstrumentConfig::default();
        let mut tweaked = config.with_condenser_na(0.5);
        tweaked.immersion = true;
        assert_eq!(compute_resolution(&config), compute_resolution(&tweaked));
    }

    #[test]
    fn test_non_positive_aperture_rejected() {
        for na in [0.0, -0.65, f64::NAN, f64::INFINITY] {
            let config = InstrumentConfig::default().with_objective_na(na);
            assert!(matches!(
                compute_resolution(&config),
                Err(OpticsError::NonPositiveAperture(_))
            ));
        }
    }

    #[test]
    fn test_formula_identity_random_inputs() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let wavelength: f64 = rng.gen_range(1.0..2000.0);
            let na: f64 = rng.gen_range(0.01..2.0);
            let method = ObservationMethod::ALL[rng.gen_range(0..4)];
            let config = InstrumentConfig::default()
                .with_wavelength(wavelength)
                .with_objective_na(na)
                .with_method(method);

            let d = compute_resolution(&config).unwrap();
            let k = if method == ObservationMethod::Fluorescence { 0.305 } else { 0.61 };
            assert_relative_eq!(d, k * wavelength / na, max_relative = 1e-12);
            assert!(d >= 0.0);
        }
    }

    #[test]
    fn test_repeated_calls_are_bit_identical() {
        let config = InstrumentConfig::default().with_wavelength(437.0);
        let a = compute_resolution(&config).unwrap();
        let b = compute_resolution(&config).unwrap();
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("halved".parse::<MethodFactorPolicy>(), Ok(MethodFactorPolicy::FluorescenceHalved));
        assert_eq!("Uniform".parse::<MethodFactorPolicy>(), Ok(MethodFactorPolicy::Uniform));
        assert!("double".parse::<MethodFactorPolicy>().is_err());
    }

    #[test]
    fn test_policy_name_matches_serialized_form() {
        for policy in [MethodFactorPolicy::FluorescenceHalved, MethodFactorPolicy::Uniform] {
            assert_eq!(serde_json::to_value(policy).unwrap(), policy.as_str());
            assert_eq!(policy.as_str().parse::<MethodFactorPolicy>(), Ok(policy));
        }
    }
}
