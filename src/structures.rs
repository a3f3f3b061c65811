//! Biological structures and which of them a given resolution can show.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::config::ObservationMethod;
use crate::error::OpticsError;

/// Display grouping only, never consulted by the filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureCategory {
    Organelle,
    Microorganism,
    Macromolecule,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureEntry {
    pub name: &'static str,
    /// Smallest feature size in nanometers
    pub min_size_nm: f64,
    pub category: StructureCategory,
    pub symbol: &'static str,
    /// Needs a fluorescent label to be seen under the method-gated policy
    pub requires_fluorescence: bool,
}

const fn entry(
    name: &'static str,
    min_size_nm: f64,
    category: StructureCategory,
    symbol: &'static str,
    requires_fluorescence: bool,
) -> StructureEntry {
    StructureEntry {
        name,
        min_size_nm,
        category,
        symbol,
        requires_fluorescence,
    }
}

/// Catalog in display order. Filter results keep this order.
static CATALOG: [StructureEntry; 8] = [
    entry("Cell nucleus", 5000.0, StructureCategory::Organelle, "⚪", false),
    entry("Chloroplast", 5000.0, StructureCategory::Organelle, "🟢", false),
    entry("Mitochondria", 1000.0, StructureCategory::Organelle, "🔵", false),
    entry("Golgi apparatus", 1000.0, StructureCategory::Organelle, "🟣", false),
    entry("Endoplasmic reticulum", 800.0, StructureCategory::Organelle, "🟠", false),
    entry("Bacteria", 500.0, StructureCategory::Microorganism, "🦠", false),
    entry("Viruses", 100.0, StructureCategory::Microorganism, "🔺", true),
    entry("Ribosomes", 25.0, StructureCategory::Macromolecule, "🔴", true),
];

pub fn catalog() -> &'static [StructureEntry] {
    &CATALOG
}

/// Whether the observation method can gate structure visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GatingPolicy {
    /// Fluorescence-labelled entries appear only under fluorescence
    #[default]
    MethodGated,
    /// Size threshold alone decides
    SizeOnly,
}

impl GatingPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            GatingPolicy::MethodGated => "method-gated",
            GatingPolicy::SizeOnly => "size-only",
        }
    }
}

impl FromStr for GatingPolicy {
    type Err = OpticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "method-gated" | "method" => Ok(GatingPolicy::MethodGated),
            "size-only" | "size" => Ok(GatingPolicy::SizeOnly),
            _ => Err(OpticsError::UnknownPolicy(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityFilter {
    policy: GatingPolicy,
}

impl VisibilityFilter {
    pub fn new(policy: GatingPolicy) -> Self {
        VisibilityFilter { policy }
    }

    pub fn policy(&self) -> GatingPolicy {
        self.policy
    }

    pub fn is_visible(
        &self,
        entry: &StructureEntry,
        resolution_nm: f64,
        method: ObservationMethod,
    ) -> bool {
        if !(entry.min_size_nm >= resolution_nm) {
            return false;
        }
        match self.policy {
            GatingPolicy::MethodGated => {
                !entry.requires_fluorescence || method == ObservationMethod::Fluorescence
            }
            GatingPolicy::SizeOnly => true,
        }
    }

    /// Catalog entries resolvable at `resolution_nm`, in catalog order.
    /// NaN resolution shows nothing.
    pub fn visible(
        &self,
        resolution_nm: f64,
        method: ObservationMethod,
    ) -> Vec<&'static StructureEntry> {
        CATALOG
            .iter()
            .filter(|entry| self.is_visible(entry, resolution_nm, method))
            .collect()
    }
}

/// Visible structures under the default method-gated policy
pub fn visible_structures(
    resolution_nm: f64,
    method: ObservationMethod,
) -> Vec<&'static StructureEntry> {
    VisibilityFilter::default().visible(resolution_nm, method)
}
