//! Effect bindings: filtered MIDI events mapped onto one color attribute

use serde::{Deserialize, Serialize};

use crate::color::ColorChannel;
use crate::midi::{EventKind, MidiMessage};
use crate::{error::ControlError, Result};

/// How a binding treats several matching events arriving in one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DispatchPolicy {
    /// Only the latest matching event is applied (fader semantics)
    #[default]
    DiscardRedundant,
    /// Every matching event is applied in arrival order
    ApplyAll,
}

/// Event predicate. `None` fields are wildcards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct EventFilter {
    #[serde(default, rename = "event_type")]
    pub kind: Option<EventKind>,
    #[serde(default)]
    pub channel: Option<u8>,
    /// Controller number for control changes, note number for notes
    #[serde(default)]
    pub number: Option<u8>,
}

impl EventFilter {
    pub fn control_change(channel: u8, controller: u8) -> Self {
        Self {
            kind: Some(EventKind::ControlChange),
            channel: Some(channel),
            number: Some(controller),
        }
    }

    pub fn note_on(channel: u8, note: u8) -> Self {
        Self {
            kind: Some(EventKind::NoteOn),
            channel: Some(channel),
            number: Some(note),
        }
    }

    pub fn note_off(channel: u8, note: u8) -> Self {
        Self {
            kind: Some(EventKind::NoteOff),
            channel: Some(channel),
            number: Some(note),
        }
    }

    /// True when every set field equals the message's field and the message
    /// carries a normalizable value.
    pub fn matches(&self, message: &MidiMessage) -> bool {
        if message.normalized().is_none() {
            return false;
        }
        field_matches(self.kind, Some(message.kind()))
            && field_matches(self.channel, message.channel())
            && field_matches(self.number, message.number())
    }

    /// True unless some field is set on both sides to different values.
    pub fn overlaps(&self, other: &EventFilter) -> bool {
        fields_overlap(self.kind, other.kind)
            && fields_overlap(self.channel, other.channel)
            && fields_overlap(self.number, other.number)
    }

    fn validate(&self) -> Result<()> {
        if let Some(channel) = self.channel {
            if channel > 15 {
                return Err(ControlError::Configuration(format!(
                    "MIDI channel must be 0-15, got {}",
                    channel
                )));
            }
        }
        if let Some(number) = self.number {
            if number > 127 {
                return Err(ControlError::Configuration(format!(
                    "Controller/note number must be 0-127, got {}",
                    number
                )));
            }
        }
        Ok(())
    }
}

fn field_matches<T: PartialEq>(filter: Option<T>, value: Option<T>) -> bool {
    match filter {
        None => true,
        Some(expected) => value == Some(expected),
    }
}

fn fields_overlap<T: PartialEq>(a: Option<T>, b: Option<T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// A configured rule writing one attribute of one or more lights
#[derive(Debug, Clone, PartialEq)]
pub struct EffectBinding {
    target: ColorChannel,
    lights: Vec<u16>,
    filter: EventFilter,
    policy: DispatchPolicy,
    scale: f64,
}

impl EffectBinding {
    pub fn new(
        target: ColorChannel,
        lights: Vec<u16>,
        filter: EventFilter,
        policy: DispatchPolicy,
        scale: f64,
    ) -> Result<Self> {
        if lights.is_empty() {
            return Err(ControlError::Configuration(format!(
                "Binding for {} has no target lights",
                target
            )));
        }
        if !scale.is_finite() {
            return Err(ControlError::Configuration(format!(
                "Binding for {} has a non-finite scale factor",
                target
            )));
        }
        filter.validate()?;
        Ok(Self {
            target,
            lights,
            filter,
            policy,
            scale,
        })
    }

    /// Fader-style binding with no scaling
    pub fn direct(target: ColorChannel, light: u16, filter: EventFilter) -> Result<Self> {
        Self::new(target, vec![light], filter, DispatchPolicy::DiscardRedundant, 1.0)
    }

    pub fn target(&self) -> ColorChannel {
        self.target
    }

    pub fn lights(&self) -> &[u16] {
        &self.lights
    }

    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    pub fn policy(&self) -> DispatchPolicy {
        self.policy
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Values to write this tick, in order, after filtering, policy and scaling
    pub fn values_for(&self, events: &[MidiMessage]) -> Vec<f64> {
        let matched = events
            .iter()
            .filter(|e| self.filter.matches(e))
            .filter_map(|e| e.normalized())
            .map(|v| v * self.scale);
        match self.policy {
            DispatchPolicy::DiscardRedundant => matched.last().into_iter().collect(),
            DispatchPolicy::ApplyAll => matched.collect(),
        }
    }

    /// True when both bindings can write the same attribute of the same light
    /// in response to the same event.
    pub fn conflicts_with(&self, other: &EffectBinding) -> Option<u16> {
        if self.target != other.target || !self.filter.overlaps(&other.filter) {
            return None;
        }
        self.lights
            .iter()
            .copied()
            .find(|id| other.lights.contains(id))
    }
}

/// Serialized form of a binding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingConfig {
    pub target: String,
    pub lights: Vec<u16>,
    #[serde(flatten)]
    pub filter: EventFilter,
    #[serde(default)]
    pub policy: DispatchPolicy,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl TryFrom<&BindingConfig> for EffectBinding {
    type Error = ControlError;

    fn try_from(config: &BindingConfig) -> Result<Self> {
        let target = config.target.parse::<ColorChannel>()?;
        EffectBinding::new(
            target,
            config.lights.clone(),
            config.filter,
            config.policy,
            config.scale,
        )
    }
}
