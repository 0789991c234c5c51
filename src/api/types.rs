//! Request and response types of the analysis API

use crate::error::{RagError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Length and depth of the generated analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Two short paragraphs
    Summary,
    /// Multi-section analysis: market, location, risk, strategy
    #[default]
    Detailed,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMode::Summary => write!(f, "summary"),
            AnalysisMode::Detailed => write!(f, "detailed"),
        }
    }
}

impl FromStr for AnalysisMode {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "summary" => Ok(AnalysisMode::Summary),
            "detailed" => Ok(AnalysisMode::Detailed),
            other => Err(RagError::InvalidRequest(format!(
                "Unknown analysis type '{}' (expected 'summary' or 'detailed')",
                other
            ))),
        }
    }
}

/// A caller's outlook question for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Region name, e.g. "강남구"
    pub region: String,
    /// Free-form follow-up question
    #[serde(default)]
    pub query: String,
    /// Requested analysis depth
    #[serde(default)]
    pub analysis_type: AnalysisMode,
}

impl AnalysisRequest {
    pub fn new(region: impl Into<String>, query: impl Into<String>, mode: AnalysisMode) -> Self {
        Self {
            region: region.into(),
            query: query.into(),
            analysis_type: mode,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(RagError::InvalidRequest("region must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Scored recommendation returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Investment score, 1 (strong sell) to 7 (strong buy)
    pub score: u8,
    /// Analysis prose with the score tag removed
    pub result: String,
}
