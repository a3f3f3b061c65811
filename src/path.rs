//! Stages of the light path, light source to result, with their live captions.

use serde::Serialize;

use crate::config::InstrumentConfig;
use crate::model::Observation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StageId {
    Light,
    Condenser,
    Specimen,
    Objective,
    Method,
    Eyepiece,
    Result,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stage {
    pub id: StageId,
    pub label: String,
    pub subtitle: String,
}

impl Stage {
    fn new(id: StageId, label: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Stage {
            id,
            label: label.into(),
            subtitle: subtitle.into(),
        }
    }
}

/// The seven stages in the order light passes through them.
/// Each stage feeds the next one.
pub fn optical_path(config: &InstrumentConfig, observation: &Observation) -> Vec<Stage> {
    vec![
        Stage::new(
            StageId::Light,
            "Light source",
            format!("{} nm", config.wavelength_nm),
        ),
        Stage::new(
            StageId::Condenser,
            "Condenser",
            format!("NA {}", config.condenser_na),
        ),
        Stage::new(
            StageId::Specimen,
            "Specimen",
            format!("{:.0} nm", observation.resolution_nm),
        ),
        Stage::new(
            StageId::Objective,
            "Objective",
            format!(
                "{}x / NA {}",
                config.objective_magnification, config.objective_na
            ),
        ),
        Stage::new(
            StageId::Method,
            config.method.display_name(),
            "Observation method",
        ),
        Stage::new(
            StageId::Eyepiece,
            "Eyepiece",
            format!("Total {}x", observation.total_magnification),
        ),
        Stage::new(
            StageId::Result,
            "Observation result",
            format!("{} structures", observation.visible.len()),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ObservationMethod;
    use crate::model::OpticalModel;
    use crate::presets::ObjectivePreset;

    fn subtitles(config: &InstrumentConfig) -> Vec<String> {
        let obs = OpticalModel::default().evaluate(config).unwrap();
        optical_path(config, &obs)
            .into_iter()
            .map(|s| s.subtitle)
            .collect()
    }

    #[test]
    fn test_default_captions() {
        assert_eq!(
            subtitles(&InstrumentConfig::default()),
            vec![
                "550 nm",
                "NA 0.9",
                "516 nm",
                "40x / NA 0.65",
                "Observation method",
                "Total 400x",
                "5 structures",
            ]
        );
    }

    #[test]
    fn test_captions_follow_config() {
        let config = InstrumentConfig::default()
            .with_wavelength(400.0)
            .with_objective(ObjectivePreset::X100)
            .with_method(ObservationMethod::Fluorescence);
        let obs = OpticalModel::default().evaluate(&config).unwrap();
        let stages = optical_path(&config, &obs);
        assert_eq!(stages[2].subtitle, "87 nm");
        assert_eq!(stages[3].subtitle, "100x / NA 1.4");
        assert_eq!(stages[4].label, "Fluorescence");
        assert_eq!(stages[5].subtitle, "Total 1000x");
        assert_eq!(stages[6].subtitle, "7 structures");
    }

    #[test]
    fn test_stage_order() {
        let config = InstrumentConfig::default();
        let obs = OpticalModel::default().evaluate(&config).unwrap();
        let ids: Vec<StageId> = optical_path(&config, &obs).iter().map(|s| s.id).collect();
        assert_eq!(
            ids,
            vec![
                StageId::Light,
                StageId::Condenser,
                StageId::Specimen,
                StageId::Objective,
                StageId::Method,
                StageId::Eyepiece,
                StageId::Result,
            ]
        );
    }
}
