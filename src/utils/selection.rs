//! Filter and mode types shared by the aggregation passes
//!
//! The UI speaks in sentinel strings ("All Program Crops", "All Programs",
//! "All States"); these are folded into enums once at the boundary so the
//! hot path never compares against sentinel text.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

/// Commodity "select everything" sentinels
pub const ALL_COMMODITIES: [&str; 2] = ["All Program Crops", "All Commodities"];
/// Program "select everything" sentinel
pub const ALL_PROGRAMS: &str = "All Programs";
/// State "no filter" sentinel
pub const ALL_STATES: &str = "All States";

/// Which policy dataset a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Current,
    Proposed,
}

impl Scenario {
    /// Scenario name used inside region records
    pub fn record_name(self) -> &'static str {
        match self {
            Scenario::Current => "Current",
            Scenario::Proposed => "Proposed",
        }
    }
}

/// Which figure the map displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Current,
    Proposed,
    Difference,
}

impl ViewMode {
    /// Datasets to walk for this view, in walk order
    pub fn scenarios(self) -> &'static [Scenario] {
        match self {
            ViewMode::Current => &[Scenario::Current],
            ViewMode::Proposed => &[Scenario::Proposed],
            ViewMode::Difference => &[Scenario::Current, Scenario::Proposed],
        }
    }

    /// The view-selected value for a current/proposed pair
    #[inline]
    pub fn select(self, current: f64, proposed: f64) -> f64 {
        match self {
            ViewMode::Current => current,
            ViewMode::Proposed => proposed,
            ViewMode::Difference => proposed - current,
        }
    }
}

/// Raw dollar totals or weighted per-acre rates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueMode {
    #[default]
    Total,
    MeanRate,
}

/// Commodity or program selection
///
/// Serialized through [`commodity_labels`] or [`program_labels`] so that
/// `All` is written as the sentinel of its own family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Named(SmallVec<[String; 4]>),
}

impl Selection {
    /// Build a commodity selection from UI labels
    pub fn commodities<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_labels(labels, &ALL_COMMODITIES)
    }

    /// Build a program selection from UI labels
    pub fn programs<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_labels(labels, &[ALL_PROGRAMS])
    }

    fn from_labels<I, S>(labels: I, sentinels: &[&str]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: SmallVec<[String; 4]> = labels.into_iter().map(Into::into).collect();
        if names.iter().any(|n| sentinels.contains(&n.as_str())) {
            Selection::All
        } else {
            Selection::Named(names)
        }
    }

    pub fn includes(&self, name: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Named(names) => names.iter().any(|n| n == name),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    /// True for "all" or more than one named entry
    pub fn is_multiple(&self) -> bool {
        match self {
            Selection::All => true,
            Selection::Named(names) => names.len() > 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Named(names) if names.is_empty())
    }

    /// UI labels, with `All` written as `sentinel`
    pub fn labels(&self, sentinel: &str) -> Vec<String> {
        match self {
            Selection::All => vec![sentinel.to_string()],
            Selection::Named(names) => names.to_vec(),
        }
    }
}

impl Default for Selection {
    fn default() -> Self {
        Selection::All
    }
}

/// Serde adapter for commodity selections: `All` <-> "All Program Crops"
pub mod commodity_labels {
    use super::*;

    pub fn serialize<S: Serializer>(selection: &Selection, serializer: S) -> Result<S::Ok, S::Error> {
        selection.labels(ALL_COMMODITIES[0]).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Selection, D::Error> {
        Vec::<String>::deserialize(deserializer).map(Selection::commodities)
    }
}

/// Serde adapter for program selections: `All` <-> "All Programs"
pub mod program_labels {
    use super::*;

    pub fn serialize<S: Serializer>(selection: &Selection, serializer: S) -> Result<S::Ok, S::Error> {
        selection.labels(ALL_PROGRAMS).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Selection, D::Error> {
        Vec::<String>::deserialize(deserializer).map(Selection::programs)
    }
}

/// State restriction, by display name (or raw code)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StateFilter {
    #[default]
    All,
    Named(String),
}

impl StateFilter {
    pub fn is_active(&self) -> bool {
        matches!(self, StateFilter::Named(_))
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            StateFilter::All => None,
            StateFilter::Named(name) => Some(name),
        }
    }
}

impl From<String> for StateFilter {
    fn from(label: String) -> Self {
        if label.is_empty() || label == ALL_STATES {
            StateFilter::All
        } else {
            StateFilter::Named(label)
        }
    }
}

impl From<&str> for StateFilter {
    fn from(label: &str) -> Self {
        StateFilter::from(label.to_string())
    }
}

impl From<StateFilter> for String {
    fn from(filter: StateFilter) -> Self {
        match filter {
            StateFilter::All => ALL_STATES.to_string(),
            StateFilter::Named(name) => name,
        }
    }
}
