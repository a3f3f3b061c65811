//! Hints shown next to the live numbers: illumination quality, what to try
//! next, total magnification and the colour of the light source.

use serde::Serialize;

use crate::config::InstrumentConfig;

/// Fixed eyepiece of the instrument
pub const EYEPIECE_MAGNIFICATION: u32 = 10;

/// Condenser NA at or above which illumination supports high resolution
pub const OPTIMAL_CONDENSER_NA: f64 = 0.9;

pub fn total_magnification(objective_magnification: u32) -> u32 {
    objective_magnification.saturating_mul(EYEPIECE_MAGNIFICATION)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CondenserAdvisory {
    Optimal,
    Limited,
}

impl CondenserAdvisory {
    pub fn message(self) -> &'static str {
        match self {
            CondenserAdvisory::Optimal => "Optimal illumination for high resolution",
            CondenserAdvisory::Limited => "Low condenser NA limits resolution",
        }
    }
}

pub fn condenser_advisory(condenser_na: f64) -> CondenserAdvisory {
    if condenser_na >= OPTIMAL_CONDENSER_NA {
        CondenserAdvisory::Optimal
    } else {
        CondenserAdvisory::Limited
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigurationTip {
    /// 100x oil immersion is already installed
    MaximumConfiguration,
    IncreaseObjective,
    SwitchTo100x,
}

impl ConfigurationTip {
    pub fn message(self) -> &'static str {
        match self {
            ConfigurationTip::MaximumConfiguration => {
                "Maximum configuration! Try fluorescence to observe viruses"
            }
            ConfigurationTip::IncreaseObjective => {
                "Raise the objective to 100x with immersion for maximum resolution"
            }
            ConfigurationTip::SwitchTo100x => {
                "Good configuration! Switch to 100x to observe bacteria"
            }
        }
    }
}

pub fn configuration_tip(config: &InstrumentConfig) -> ConfigurationTip {
    if config.objective_magnification == 100 && config.immersion {
        ConfigurationTip::MaximumConfiguration
    } else if config.objective_magnification < 60 {
        ConfigurationTip::IncreaseObjective
    } else {
        ConfigurationTip::SwitchTo100x
    }
}

/// Coarse colour band of visible light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SpectralBand {
    Violet,
    Blue,
    Green,
    Yellow,
    Orange,
    Red,
}

impl SpectralBand {
    /// Band edges are exclusive upper bounds: 450, 495, 570, 590, 620 nm
    pub fn from_wavelength(wavelength_nm: f64) -> Self {
        if wavelength_nm < 450.0 {
            SpectralBand::Violet
        } else if wavelength_nm < 495.0 {
            SpectralBand::Blue
        } else if wavelength_nm < 570.0 {
            SpectralBand::Green
        } else if wavelength_nm < 590.0 {
            SpectralBand::Yellow
        } else if wavelength_nm < 620.0 {
            SpectralBand::Orange
        } else {
            SpectralBand::Red
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpectralBand::Violet => "violet",
            SpectralBand::Blue => "blue",
            SpectralBand::Green => "green",
            SpectralBand::Yellow => "yellow",
            SpectralBand::Orange => "orange",
            SpectralBand::Red => "red",
        }
    }

    pub fn hex_color(self) -> &'static str {
        match self {
            SpectralBand::Violet => "#8B5CF6",
            SpectralBand::Blue => "#0EA5E9",
            SpectralBand::Green => "#10B981",
            SpectralBand::Yellow => "#F59E0B",
            SpectralBand::Orange => "#F97316",
            SpectralBand::Red => "#EF4444",
        }
    }
}

pub fn light_color(wavelength_nm: f64) -> &'static str {
    SpectralBand::from_wavelength(wavelength_nm).hex_color()
}
