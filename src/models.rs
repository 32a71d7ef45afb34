use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Configuration problems. These are caller bugs, never "no match found".
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Target element has not been set")]
    MissingExemplar,

    #[error("Unsupported target element: {0}")]
    InvalidExemplar(String),

    #[error("Unsupported matchType: {0}")]
    UnsupportedMatchType(String),

    #[error("Unsupported matchTolerance: {0}")]
    UnsupportedTolerance(String),

    #[error("Invalid matchMaxDepth: {0}")]
    InvalidDepth(String),

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),
}

/// How two nodes are compared, ignoring their children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchType {
    /// Tag name and attribute mapping must be equal
    Strict,
    /// Tag name must be equal
    #[default]
    Loose,
}

impl MatchType {
    pub fn name(&self) -> &'static str {
        match self {
            MatchType::Strict => "strict",
            MatchType::Loose => "loose",
        }
    }
}

impl FromStr for MatchType {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "strict" => Ok(MatchType::Strict),
            "1" | "loose" => Ok(MatchType::Loose),
            _ => Err(ConfigurationError::UnsupportedMatchType(s.trim().to_string())),
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which side of a child-count difference is a candidate allowed to be on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchTolerance {
    /// Every exemplar child must be paired with exactly one candidate child
    #[default]
    MatchAll,
    /// The candidate may lack trailing children the exemplar has
    MatchMissingChild,
    /// The candidate may carry trailing children the exemplar lacks
    MatchRedundantChild,
}

impl MatchTolerance {
    pub fn name(&self) -> &'static str {
        match self {
            MatchTolerance::MatchAll => "matchAll",
            MatchTolerance::MatchMissingChild => "matchMissingChild",
            MatchTolerance::MatchRedundantChild => "matchRedundantChild",
        }
    }

    /// Whether a child-count difference of this kind still counts as a match
    pub fn tolerates(&self, divergence: Divergence) -> bool {
        matches!(
            (*self, divergence),
            (MatchTolerance::MatchMissingChild, Divergence::MissingChild)
                | (MatchTolerance::MatchRedundantChild, Divergence::RedundantChild)
        )
    }
}

impl FromStr for MatchTolerance {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "0" | "all" | "matchall" => Ok(MatchTolerance::MatchAll),
            "1" | "missing-child" | "matchmissingchild" => Ok(MatchTolerance::MatchMissingChild),
            "2" | "redundant-child" | "matchredundantchild" => Ok(MatchTolerance::MatchRedundantChild),
            _ => Err(ConfigurationError::UnsupportedTolerance(s.trim().to_string())),
        }
    }
}

impl fmt::Display for MatchTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A child-count difference found after the lock-step child walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Divergence {
    /// Exemplar still has children, candidate ran out
    MissingChild,
    /// Candidate still has children, exemplar ran out
    RedundantChild,
}

/// Parse a depth limit; `inf`, `none` and `unbounded` lift the limit
pub fn parse_max_depth(s: &str) -> Result<Option<usize>, ConfigurationError> {
    let value = s.trim();
    match value.to_lowercase().as_str() {
        "inf" | "none" | "unbounded" => Ok(None),
        _ => value
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ConfigurationError::InvalidDepth(value.to_string())),
    }
}

/// Policy for one matching session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MatchConfig {
    pub match_type: MatchType,

    /// Deepest level compared; the exemplar root is depth 0. `None` is unbounded.
    pub match_max_depth: Option<usize>,

    pub match_tolerance: MatchTolerance,

    /// Reserved scope restriction. Not honored by the matcher yet.
    pub match_inside_element: Option<String>,
}

impl MatchConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match_type(mut self, match_type: MatchType) -> Self {
        self.match_type = match_type;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.match_max_depth = Some(depth);
        self
    }

    pub fn with_tolerance(mut self, tolerance: MatchTolerance) -> Self {
        self.match_tolerance = tolerance;
        self
    }

    /// Set a field by its settings name, e.g. `("matchType", "0")`
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigurationError> {
        match key.trim() {
            "matchType" => self.match_type = value.parse()?,
            "matchMaxDepth" => self.match_max_depth = parse_max_depth(value)?,
            "matchTolerance" => self.match_tolerance = value.parse()?,
            "matchInsideElement" => {
                let value = value.trim();
                self.match_inside_element = (!value.is_empty()).then(|| value.to_string());
            }
            other => return Err(ConfigurationError::UnknownSetting(other.to_string())),
        }
        Ok(())
    }

    /// Current policy as a name -> value mapping
    pub fn settings(&self) -> BTreeMap<String, Value> {
        let mut settings = BTreeMap::new();
        settings.insert("matchType".to_string(), json!(self.match_type.name()));
        settings.insert(
            "matchMaxDepth".to_string(),
            match self.match_max_depth {
                Some(depth) => json!(depth),
                None => json!("inf"),
            },
        );
        settings.insert("matchTolerance".to_string(), json!(self.match_tolerance.name()));
        settings.insert("matchInsideElement".to_string(), json!(self.match_inside_element));
        settings
    }
}
