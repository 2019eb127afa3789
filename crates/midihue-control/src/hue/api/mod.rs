//! Hue Bridge REST calls

pub mod error;
pub mod groups;

pub use error::HueError;
pub use groups::{GroupStreamControl, HueGroupStreamControl, NoopGroupStreamControl};
