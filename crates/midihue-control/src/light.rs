//! The set of lights driven during a run

use crate::color::{ColorSpace, ColorState};
use crate::hue::stream::StreamMessage;
use crate::{error::ControlError, Result};

/// Lights in registration order, unique by id
#[derive(Debug, Clone, Default)]
pub struct LightSet {
    lights: Vec<ColorState>,
}

impl LightSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from `(id, space)` pairs with a shared quantization depth
    pub fn from_specs(
        specs: impl IntoIterator<Item = (u16, ColorSpace)>,
        bits_per_channel: u8,
    ) -> Result<Self> {
        let mut set = Self::new();
        for (id, space) in specs {
            set.insert(ColorState::with_bits(id, space, bits_per_channel)?)?;
        }
        Ok(set)
    }

    /// Register a light. Ids must be unique.
    pub fn insert(&mut self, light: ColorState) -> Result<()> {
        if self.contains(light.light_id()) {
            return Err(ControlError::Configuration(format!(
                "Light {} is registered twice",
                light.light_id()
            )));
        }
        self.lights.push(light);
        Ok(())
    }

    pub fn contains(&self, light_id: u16) -> bool {
        self.get(light_id).is_some()
    }

    pub fn get(&self, light_id: u16) -> Option<&ColorState> {
        self.lights.iter().find(|l| l.light_id() == light_id)
    }

    pub fn get_mut(&mut self, light_id: u16) -> Option<&mut ColorState> {
        self.lights.iter_mut().find(|l| l.light_id() == light_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColorState> {
        self.lights.iter()
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Frame carrying every light's current quantized color
    pub fn snapshot(&self) -> StreamMessage {
        let mut message = StreamMessage::new();
        for light in &self.lights {
            message.add(light.light_id(), light.rgb_int());
        }
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::ColorChannel;

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut set = LightSet::new();
        set.insert(ColorState::new(3, ColorSpace::Rgb)).unwrap();
        let err = set.insert(ColorState::new(3, ColorSpace::Hsv)).unwrap_err();
        assert!(matches!(err, ControlError::Configuration(_)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_snapshot_keeps_registration_order() {
        let mut set = LightSet::from_specs([(23, ColorSpace::Rgb), (9, ColorSpace::Hsv)], 16).unwrap();
        set.get_mut(9).unwrap().set(ColorChannel::Brightness, 1.0);

        let frame = set.snapshot();
        let ids: Vec<u16> = frame.entries().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![23, 9]);
        assert_eq!(frame.get(9), Some((65535, 65535, 65535)));
        assert_eq!(frame.get(23), Some((0, 0, 0)));
    }

    #[test]
    fn test_from_specs_validates_bits() {
        assert!(LightSet::from_specs([(1, ColorSpace::Rgb)], 0).is_err());
    }
}
