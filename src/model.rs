use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// How a mention entered the pipeline: matched out of free-form prose, or
/// carried over from a structured bill-of-quantities row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    #[serde(rename = "pattern")]
    Pattern,
    #[serde(rename = "structured-row")]
    StructuredRow,
}

/// Primary quantity family of a volume mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "m3")]
    M3,
    #[serde(rename = "m2")]
    M2,
    #[serde(rename = "ks")]
    Ks,
    #[serde(rename = "t")]
    T,
}

impl Unit {
    pub fn label(&self) -> &'static str {
        match self {
            Unit::M3 => "m3",
            Unit::M2 => "m2",
            Unit::Ks => "ks",
            Unit::T => "t",
        }
    }
}

/// A concrete-grade designation found in a document. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeMention {
    pub designation: String,
    /// Sorted and deduplicated, e.g. {"XC2", "XF1"}.
    pub exposure_classes: BTreeSet<String>,
    pub doc: String,
    /// 1-based line number in the source document.
    pub line: u32,
    pub context: String,
    pub confidence: f64,
    pub origin: Origin,
}

/// A quantity/price mention, not yet tied to a grade.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolumeMention {
    /// None until the cross-linker assigns one.
    pub grade: Option<String>,
    pub volume_m3: Option<f64>,
    pub area_m2: Option<f64>,
    pub thickness_mm: Option<f64>,
    pub unit_price: Option<f64>,
    pub total_cost: Option<f64>,
    pub unit: Unit,
    pub element: String,
    pub doc: String,
    pub line: u32,
    pub context: String,
    pub confidence: f64,
    pub origin: Origin,
}

/// Final output unit: a volume bound to a grade and an element.
/// `grade` is empty only when the source document had no grade mentions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedEntry {
    pub grade: String,
    pub exposure_classes: BTreeSet<String>,
    pub element: String,
    pub volume_m3: Option<f64>,
    pub area_m2: Option<f64>,
    pub thickness_mm: Option<f64>,
    pub unit_price: Option<f64>,
    pub total_cost: Option<f64>,
    pub unit: Unit,
    pub doc: String,
    pub line: u32,
    pub confidence: f64,
    pub context: String,
}

/// Aggregate totals for one (grade, element) group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupTotal {
    pub grade: String,
    pub element: String,
    pub volume_m3: f64,
    pub total_cost: f64,
    pub entries: usize,
}

/// Aggregate totals keyed by a single dimension (grade alone, element alone).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyTotal {
    pub key: String,
    pub volume_m3: f64,
    pub total_cost: f64,
    pub entries: usize,
}

/// Derived grouping of linked entries; recomputed on demand, never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Summary {
    pub by_grade_element: Vec<GroupTotal>,
    pub by_grade: Vec<KeyTotal>,
    pub by_element: Vec<KeyTotal>,
    pub total_volume_m3: f64,
    pub total_cost: f64,
    pub entry_count: usize,
}
