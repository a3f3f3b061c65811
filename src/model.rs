//! The optical model as one call: configuration in, observation out.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::advisory::{
    condenser_advisory, configuration_tip, light_color, total_magnification, CondenserAdvisory,
    ConfigurationTip, SpectralBand,
};
use crate::config::InstrumentConfig;
use crate::error::Result;
use crate::resolution::{MethodFactorPolicy, ResolutionCalculator};
use crate::structures::{GatingPolicy, StructureEntry, VisibilityFilter};

/// Which behavior to use where the reference tools disagree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelSettings {
    pub method_factor: MethodFactorPolicy,
    pub gating: GatingPolicy,
}

/// Everything the presentation layer shows for one configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub resolution_nm: f64,
    pub total_magnification: u32,
    pub visible: Vec<&'static StructureEntry>,
    pub condenser: CondenserAdvisory,
    pub tip: ConfigurationTip,
    pub spectral_band: SpectralBand,
    pub light_color: &'static str,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OpticalModel {
    calculator: ResolutionCalculator,
    filter: VisibilityFilter,
}

impl OpticalModel {
    pub fn new(settings: ModelSettings) -> Self {
        OpticalModel {
            calculator: ResolutionCalculator::new(settings.method_factor),
            filter: VisibilityFilter::new(settings.gating),
        }
    }

    pub fn settings(&self) -> ModelSettings {
        ModelSettings {
            method_factor: self.calculator.policy(),
            gating: self.filter.policy(),
        }
    }

    pub fn evaluate(&self, config: &InstrumentConfig) -> Result<Observation> {
        let resolution_nm = self.calculator.compute(config)?;
        let visible = self.filter.visible(resolution_nm, config.method);
        debug!(
            wavelength_nm = config.wavelength_nm,
            na = config.objective_na,
            method = %config.method,
            resolution_nm,
            visible = visible.len(),
            "evaluated optical path"
        );

        Ok(Observation {
            resolution_nm,
            total_magnification: total_magnification(config.objective_magnification),
            visible,
            condenser: condenser_advisory(config.condenser_na),
            tip: configuration_tip(config),
            spectral_band: SpectralBand::from_wavelength(config.wavelength_nm),
            light_color: light_color(config.wavelength_nm),
        })
    }
}
