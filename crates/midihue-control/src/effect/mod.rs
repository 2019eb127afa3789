//! MIDI-driven color effects
//!
//! Effects run at the tick rate (~100Hz), so they receive every MIDI message
//! that arrived since the previous tick. Each [`EffectBinding`] filters those
//! messages and, depending on its [`DispatchPolicy`], applies either the most
//! recent match or all of them.

mod binding;
mod engine;

pub use binding::{BindingConfig, DispatchPolicy, EffectBinding, EventFilter};
pub use engine::{default_mapping, AppliedWrite, EffectEngine, LightConfig};
