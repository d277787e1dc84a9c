//! Classification backends.
//!
//! [`ClassificationClient`] talks to the remote detect service over HTTP.
//! Anything implementing [`ImageClassifier`] can stand in for it, which is
//! how sessions are driven in tests.

pub mod detect;
pub mod traits;

pub use detect::{ClassificationClient, ClassificationClientBuilder, parse_response};
pub use traits::ImageClassifier;
