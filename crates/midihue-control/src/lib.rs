//! MIDIHue Control - MIDI-driven color streaming to Philips Hue lights
//!
//! This crate holds the real-time control pipeline:
//! - **Color**: per-light RGB/HSV state with clamping and quantization
//! - **Effects**: MIDI event filters and dispatch policies writing color attributes
//! - **MIDI**: message parsing and a driver-backed input source
//! - **Hue**: entertainment frame encoding, the streaming session and the
//!   stream-mode REST toggle
//!
//! ## Feature Flags
//!
//! - `midi`: Enable MIDI input (requires `midir`)
//! - `dtls`: Enable the DTLS-PSK stream channel (requires `openssl`)
//!
//! ## Quick Start
//!
//! ```rust
//! use midihue_control::color::{ColorChannel, ColorSpace};
//! use midihue_control::effect::{EffectBinding, EffectEngine, EventFilter};
//! use midihue_control::{LightSet, MidiMessage};
//!
//! # fn main() -> midihue_control::Result<()> {
//! let mut lights = LightSet::from_specs([(3, ColorSpace::Rgb)], 16)?;
//! let fader = EffectBinding::direct(
//!     ColorChannel::Brightness,
//!     3,
//!     EventFilter::control_change(8, 78),
//! )?;
//! let engine = EffectEngine::new(vec![fader], &lights)?;
//!
//! engine.process(
//!     &[MidiMessage::ControlChange { channel: 8, controller: 78, value: 127 }],
//!     &mut lights,
//! );
//! let frame = lights.snapshot().to_bytes();
//! assert_eq!(frame.len(), 16 + 9);
//! # Ok(())
//! # }
//! ```

// Core modules
/// Color model
pub mod color;
/// Error types
pub mod error;
/// Light registry
pub mod light;

/// Effect bindings and dispatch
pub mod effect;
/// Philips Hue streaming
pub mod hue;
/// MIDI events and input
pub mod midi;

// Re-exports
pub use color::{ColorChannel, ColorSpace, ColorState, RgbTriple};
pub use effect::{DispatchPolicy, EffectBinding, EffectEngine, EventFilter};
pub use error::{ControlError, Result};
pub use hue::stream::{SessionState, StreamMessage, StreamingSession};
pub use light::LightSet;
pub use midi::{EventKind, EventSource, MidiMessage};
