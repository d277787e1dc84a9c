//! Public types for the Clearbin round trip.

mod captured;
mod flash;
mod presentation;
mod request;
mod result;

pub use captured::{CapturedImage, ImageFormat};
pub use flash::FlashMode;
pub use presentation::{DisplayState, PresentationChoice};
pub use request::ClassificationRequest;
pub use result::{ClassificationResult, Detection, NO_DETECTION_MESSAGE};
