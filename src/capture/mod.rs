//! Camera capture and temp-file persistence.

mod camera;
mod controller;

pub use camera::{CameraSource, FileCamera};
pub use controller::CaptureController;
