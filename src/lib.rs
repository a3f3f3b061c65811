//! Optical model of a light microscope: the Abbe resolution limit of an
//! instrument configuration and the biological structures it can resolve.

pub mod advisory;
pub mod config;
pub mod error;
pub mod model;
pub mod path;
pub mod presets;
pub mod resolution;
pub mod structures;

pub use config::{InstrumentConfig, ObservationMethod};
pub use error::{OpticsError, Result};
pub use model::{ModelSettings, Observation, OpticalModel};
pub use presets::ObjectivePreset;
pub use resolution::{compute_resolution, MethodFactorPolicy, ResolutionCalculator};
pub use structures::{
    catalog, visible_structures, GatingPolicy, StructureCategory, StructureEntry,
    VisibilityFilter,
};

/// Install the `tracing` subscriber used by both binaries. `RUST_LOG`
/// overrides the default `info` level.
pub fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
