//! What the result screen shows

use serde::{Deserialize, Serialize};

/// Data the "match" sheet renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    pub material: String,
    pub is_recyclable: bool,
}

/// Which result sheet to open, carrying the data it needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum PresentationChoice {
    ShowMatch(DisplayState),
    ShowNoMatch,
}

impl PresentationChoice {
    pub fn is_match(&self) -> bool {
        matches!(self, Self::ShowMatch(_))
    }
}
