// A tiny error type so we don't rely on anyhow/thiserror.
// Every variant states *where* things went wrong. Only setup-time failures
// land here; per-frame conditions (no hand detected, model still loading,
// capture without a selection) are silent no-ops, not errors.
use std::fmt::{self, Display};

#[derive(Debug)]
pub enum Error {
    WindowInit(String),   // Creating the window failed
    WindowUpdate(String), // Updating the window buffer failed
    CameraInit(String),   // Opening/starting the camera failed
    CameraFrame(String),  // Grabbing/decoding a frame failed
    TrackerInit(String),  // Locating/spawning the hand-landmark detector failed
}

impl Display for Error {
    // This decides how the error is printed to your console.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::WindowInit(s) => write!(f, "Window init error: {s}"),
            Error::WindowUpdate(s) => write!(f, "Window update error: {s}"),
            Error::CameraInit(s) => write!(f, "Camera init error: {s}"),
            Error::CameraFrame(s) => write!(f, "Camera frame error: {s}"),
            Error::TrackerInit(s) => write!(f, "Tracker init error: {s}"),
        }
    }
}

impl std::error::Error for Error {}
