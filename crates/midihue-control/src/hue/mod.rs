//! Philips Hue entertainment streaming

pub mod api;
pub mod engine;
pub mod models;
pub mod stream;

pub use engine::{EntertainmentEngine, TickReport, DEFAULT_TICK_INTERVAL};
pub use models::{BridgeDirectory, HueConfig};
