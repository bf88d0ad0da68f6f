//! Core types for TenderDesk

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ordinal outcome label attached to a prediction (A best, E worst)
///
/// Labels outside A–E are preserved verbatim so that a backend change never
/// drops records on the floor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Rank {
    A,
    B,
    C,
    D,
    E,
    /// Any label the backend sends that is not A–E
    Other(String),
}

impl Rank {
    /// The label as sent on the wire
    pub fn as_str(&self) -> &str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::E => "E",
            Self::Other(label) => label,
        }
    }

    /// Recommendation score used in exports (A=5 … E=1, unknown 0)
    pub fn score(&self) -> u8 {
        match self {
            Self::A => 5,
            Self::B => 4,
            Self::C => 3,
            Self::D => 2,
            Self::E => 1,
            Self::Other(_) => 0,
        }
    }

    /// Ranks A and B count as recommended
    pub fn is_recommended(&self) -> bool {
        matches!(self, Self::A | Self::B)
    }

    /// Human-readable description of the rank
    pub fn description(&self) -> &'static str {
        match self {
            Self::A => "非常に有望",
            Self::B => "有望",
            Self::C => "妥当",
            Self::D => "やや不利",
            Self::E => "困難",
            Self::Other(_) => "―",
        }
    }
}

impl From<String> for Rank {
    fn from(label: String) -> Self {
        match label.trim() {
            "A" => Self::A,
            "B" => Self::B,
            "C" => Self::C,
            "D" => Self::D,
            "E" => Self::E,
            _ => Self::Other(label),
        }
    }
}

impl From<&str> for Rank {
    fn from(label: &str) -> Self {
        Self::from(label.to_string())
    }
}

impl From<Rank> for String {
    fn from(rank: Rank) -> Self {
        rank.as_str().to_string()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Confidence the backend attaches to a prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Confidence {
    Low,
    Medium,
    High,
    Other(String),
}

impl Confidence {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Other(label) => label,
        }
    }

    /// Localized short label; unknown values are shown as received
    pub fn label(&self) -> &str {
        match self {
            Self::Low => "低",
            Self::Medium => "中",
            Self::High => "高",
            Self::Other(label) => label,
        }
    }
}

impl From<String> for Confidence {
    fn from(label: String) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "low" => Self::Low,
            "medium" => Self::Medium,
            "high" => Self::High,
            _ => Self::Other(label),
        }
    }
}

impl From<Confidence> for String {
    fn from(confidence: Confidence) -> Self {
        confidence.as_str().to_string()
    }
}

/// A public tender listing as returned by the search endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenderSummary {
    pub tender_id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub publisher: String,

    #[serde(default)]
    pub prefecture: String,

    #[serde(default)]
    pub municipality: String,

    #[serde(default)]
    pub use_type: String,

    #[serde(default)]
    pub floor_area_m2: Option<f64>,

    #[serde(default)]
    pub bid_date: String,

    /// Reference (estimated) price, the classifier's ceiling
    #[serde(default)]
    pub estimated_price: Option<u64>,

    /// Minimum acceptable price, the classifier's floor
    #[serde(default)]
    pub minimum_price: Option<u64>,

    #[serde(default)]
    pub bid_method: String,

    #[serde(default)]
    pub jv_allowed: bool,
}

impl TenderSummary {
    /// Create a tender with only an identifier and a title
    pub fn new(tender_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            tender_id: tender_id.into(),
            title: title.into(),
            publisher: String::new(),
            prefecture: String::new(),
            municipality: String::new(),
            use_type: String::new(),
            floor_area_m2: None,
            bid_date: String::new(),
            estimated_price: None,
            minimum_price: None,
            bid_method: String::new(),
            jv_allowed: false,
        }
    }

    /// Set the floor and ceiling prices
    pub fn with_prices(mut self, minimum_price: Option<u64>, estimated_price: Option<u64>) -> Self {
        self.minimum_price = minimum_price;
        self.estimated_price = estimated_price;
        self
    }
}

/// Externally computed win prediction for one tender
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub tender_id: String,

    /// Preferred display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,

    /// Fallback display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub rank: Rank,

    /// Probability of winning, 0.0-1.0
    pub win_probability: f64,

    #[serde(default = "default_confidence")]
    pub confidence: Confidence,

    /// Free-form advisory text (markdown, rendered by the presentation layer)
    #[serde(default)]
    pub recommendation: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judgment_reason: Option<String>,

    #[serde(default)]
    pub risk_notes: Vec<String>,
}

fn default_confidence() -> Confidence {
    Confidence::Medium
}

impl PredictionRecord {
    /// Create a prediction with the fields needed for aggregation
    pub fn new(tender_id: impl Into<String>, rank: impl Into<Rank>, win_probability: f64) -> Self {
        Self {
            tender_id: tender_id.into(),
            project_name: None,
            title: None,
            rank: rank.into(),
            win_probability,
            confidence: default_confidence(),
            recommendation: String::new(),
            judgment_reason: None,
            risk_notes: Vec::new(),
        }
    }

    /// Set the display name
    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = Some(name.into());
        self
    }

    /// Set the fallback title
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Project name, falling back to the title; empty names count as absent
    pub fn display_name(&self) -> Option<&str> {
        self.project_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.title.as_deref().filter(|title| !title.is_empty()))
    }
}

/// Advisory value domains for the search filters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub prefectures: Vec<String>,

    #[serde(default)]
    pub municipalities: Vec<String>,

    #[serde(default)]
    pub use_types: Vec<String>,

    #[serde(default)]
    pub bid_methods: Vec<String>,

    /// Allowed municipalities per prefecture
    #[serde(default)]
    pub prefecture_municipalities: BTreeMap<String, Vec<String>>,
}

impl FilterOptions {
    /// Allowed sub-regions for a region, if the mapping knows the region
    pub fn sub_regions_of(&self, region: &str) -> Option<&[String]> {
        self.prefecture_municipalities
            .get(region)
            .map(|list| list.as_slice())
    }
}

/// Outbound tender search parameters
///
/// Absent fields are omitted from the request entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefecture: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bid_method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_price: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
}

impl SearchRequest {
    /// True when no filter is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
