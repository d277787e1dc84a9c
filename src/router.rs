//! Maps a verdict to the sheet the result screen opens.

use crate::types::{ClassificationResult, PresentationChoice};

/// Pick the presentation for a verdict. Pure; the caller performs the
/// actual screen transition.
pub fn route(result: &ClassificationResult) -> PresentationChoice {
    match result {
        ClassificationResult::NoMatch => PresentationChoice::ShowNoMatch,
        ClassificationResult::Match(detection) => {
            PresentationChoice::ShowMatch(detection.display_state())
        }
    }
}
