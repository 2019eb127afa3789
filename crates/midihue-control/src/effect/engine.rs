use serde::{Deserialize, Serialize};
use tracing::trace;

use super::binding::{BindingConfig, EffectBinding, EventFilter};
use crate::color::{ColorChannel, ColorSpace};
use crate::light::LightSet;
use crate::midi::MidiMessage;
use crate::{error::ControlError, Result};

/// One attribute write performed by [`EffectEngine::process`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedWrite {
    pub light_id: u16,
    pub channel: ColorChannel,
    /// Scaled value handed to the light, before clamping
    pub value: f64,
}

/// Applies every binding, in registration order, to the events of one tick.
#[derive(Debug, Clone, Default)]
pub struct EffectEngine {
    bindings: Vec<EffectBinding>,
}

impl EffectEngine {
    /// Validate `bindings` against the lights they will drive.
    ///
    /// Fails when a binding names an unregistered light, or when two bindings
    /// could write the same attribute of the same light for the same event.
    pub fn new(bindings: Vec<EffectBinding>, lights: &LightSet) -> Result<Self> {
        for binding in &bindings {
            if let Some(missing) = binding.lights().iter().find(|id| !lights.contains(**id)) {
                return Err(ControlError::Configuration(format!(
                    "Binding for {} targets unknown light {}",
                    binding.target(),
                    missing
                )));
            }
        }

        for (i, a) in bindings.iter().enumerate() {
            for (j, b) in bindings.iter().enumerate().skip(i + 1) {
                if let Some(light) = a.conflicts_with(b) {
                    return Err(ControlError::Configuration(format!(
                        "Bindings #{} and #{} both write {} of light {} for overlapping events",
                        i, j, a.target(), light
                    )));
                }
            }
        }

        Ok(Self { bindings })
    }

    /// Build from serialized bindings
    pub fn from_config(configs: &[BindingConfig], lights: &LightSet) -> Result<Self> {
        let bindings = configs
            .iter()
            .map(EffectBinding::try_from)
            .collect::<Result<Vec<_>>>()?;
        Self::new(bindings, lights)
    }

    pub fn bindings(&self) -> &[EffectBinding] {
        &self.bindings
    }

    /// Apply this tick's events. Events matching no binding are ignored.
    pub fn process(&self, events: &[MidiMessage], lights: &mut LightSet) -> Vec<AppliedWrite> {
        let mut writes = Vec::new();
        if events.is_empty() {
            return writes;
        }

        for binding in &self.bindings {
            for value in binding.values_for(events) {
                for &light_id in binding.lights() {
                    if let Some(light) = lights.get_mut(light_id) {
                        light.set(binding.target(), value);
                        trace!("Light {} {} <- {:.4}", light_id, binding.target(), value);
                        writes.push(AppliedWrite {
                            light_id,
                            channel: binding.target(),
                            value,
                        });
                    }
                }
            }
        }

        writes
    }
}

/// Serialized light definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightConfig {
    pub id: u16,
    #[serde(default)]
    pub color_space: ColorSpace,
}

/// Built-in mapping used when no configuration is supplied: one light,
/// saturation and brightness on two faders of channel 8, hue nudged by a pad.
///
/// The light is stored as HSV so hue and saturation survive while it is dark.
pub fn default_mapping() -> (Vec<LightConfig>, Vec<BindingConfig>) {
    const LIGHT: u16 = 3;
    const CHANNEL: u8 = 8;

    let binding = |target: &str, filter: EventFilter, scale: f64| BindingConfig {
        target: target.to_string(),
        lights: vec![LIGHT],
        filter,
        policy: Default::default(),
        scale,
    };

    (
        vec![LightConfig {
            id: LIGHT,
            color_space: ColorSpace::Hsv,
        }],
        vec![
            binding("saturation", EventFilter::control_change(CHANNEL, 77), 1.0),
            binding("brightness", EventFilter::control_change(CHANNEL, 78), 1.0),
            binding("hue", EventFilter::note_on(CHANNEL, 73), 0.2),
            binding("hue", EventFilter::note_off(CHANNEL, 73), 1.0),
        ],
    )
}
