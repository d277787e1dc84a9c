//! Clearbin - capture-to-classification client for recycling verdicts
//!
//! A photo is captured, written to a temp file, embedded in a base64 data
//! URI and POSTed to the clearbin detect service. The JSON reply becomes a
//! [`ClassificationResult`], which [`route`] turns into the sheet the result
//! screen shows.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use clearbin::capture::{CaptureController, FileCamera};
//! use clearbin::session::{ClassificationSession, NoProgress, Outcome};
//! use clearbin::{ClassificationClient, PresentationChoice};
//!
//! #[tokio::main]
//! async fn main() -> clearbin::Result<()> {
//!     let client = ClassificationClient::new()?;
//!     let controller = CaptureController::new(FileCamera::new("bottle.jpg"), "/tmp/photo.jpg");
//!     let mut session = ClassificationSession::new(Arc::new(client), Arc::new(NoProgress));
//!
//!     match session.run_round_trip(&controller).await? {
//!         Outcome::Presented(PresentationChoice::ShowMatch(state)) => {
//!             println!("{} (recyclable: {})", state.material, state.is_recyclable);
//!         }
//!         Outcome::Presented(PresentationChoice::ShowNoMatch) => println!("nothing found"),
//!         Outcome::Failed { message, .. } => eprintln!("{message}"),
//!         Outcome::Discarded => {}
//!     }
//!     Ok(())
//! }
//! ```

pub mod capture;
pub mod config;
pub mod encoder;
pub mod error;
pub mod navigation;
pub mod providers;
pub mod router;
pub mod session;
pub mod telemetry;
pub mod types;
mod version;

// Re-export main types at crate root
pub use config::Config;
pub use encoder::{ImageEncoder, decode_data_uri};
pub use error::{ClearbinError, ErrorCategory, Result};
pub use providers::{ClassificationClient, ImageClassifier};
pub use router::route;
pub use version::{PKG_VERSION, version_string};

pub use types::{
    CapturedImage, ClassificationRequest, ClassificationResult, Detection, DisplayState,
    FlashMode, ImageFormat, NO_DETECTION_MESSAGE, PresentationChoice,
};
