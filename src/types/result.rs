//! Parsed classification verdict

use serde::{Deserialize, Serialize};

use super::presentation::DisplayState;

/// Message the detect service sends when nothing was recognised.
pub const NO_DETECTION_MESSAGE: &str = "No object detected.";

/// A recognised object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Human-readable material name, shown as the verdict.
    pub cluster_name: String,
    /// Server-side cluster identifier.
    pub cluster: String,
    pub confidence: f64,
    /// Server-side prediction time as reported by the service.
    pub pred_time: f64,
    pub materials: String,
    pub recyclable: bool,
}

impl Detection {
    pub fn display_state(&self) -> DisplayState {
        DisplayState {
            material: self.cluster_name.clone(),
            is_recyclable: self.recyclable,
        }
    }
}

/// Outcome of one classification request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassificationResult {
    NoMatch,
    Match(Detection),
}

impl ClassificationResult {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match(_))
    }

    pub fn detection(&self) -> Option<&Detection> {
        match self {
            Self::Match(detection) => Some(detection),
            Self::NoMatch => None,
        }
    }
}
