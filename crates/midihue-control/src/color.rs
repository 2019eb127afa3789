//! Per-light color state
//!
//! A [`ColorState`] stores its color canonically in exactly one space (RGB or
//! HSV), chosen at construction. The other space is derived on every read with
//! [`rgb_from_hsv`] / [`hsv_from_rgb`] and never cached. Every channel is a
//! unit-interval scalar; writes clamp silently instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{error::ControlError, Result};

/// Default quantization depth of [`ColorState::rgb_int`]
pub const DEFAULT_BITS_PER_CHANNEL: u8 = 16;

/// Quantized RGB triple as sent on the wire
pub type RgbTriple = (u16, u16, u16);

/// Color space a light stores its channels in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    #[default]
    Rgb,
    Hsv,
}

/// One logical color attribute of a light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
    Hue,
    Saturation,
    Brightness,
}

impl ColorChannel {
    pub const ALL: [ColorChannel; 6] = [
        ColorChannel::Red,
        ColorChannel::Green,
        ColorChannel::Blue,
        ColorChannel::Hue,
        ColorChannel::Saturation,
        ColorChannel::Brightness,
    ];

    /// Color space this channel belongs to
    pub fn space(&self) -> ColorSpace {
        match self {
            ColorChannel::Red | ColorChannel::Green | ColorChannel::Blue => ColorSpace::Rgb,
            ColorChannel::Hue | ColorChannel::Saturation | ColorChannel::Brightness => {
                ColorSpace::Hsv
            }
        }
    }

    /// Position of the channel inside its space's triple
    fn index(&self) -> usize {
        match self {
            ColorChannel::Red | ColorChannel::Hue => 0,
            ColorChannel::Green | ColorChannel::Saturation => 1,
            ColorChannel::Blue | ColorChannel::Brightness => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ColorChannel::Red => "red",
            ColorChannel::Green => "green",
            ColorChannel::Blue => "blue",
            ColorChannel::Hue => "hue",
            ColorChannel::Saturation => "saturation",
            ColorChannel::Brightness => "brightness",
        }
    }
}

impl fmt::Display for ColorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorChannel {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" | "r" => Ok(ColorChannel::Red),
            "green" | "g" => Ok(ColorChannel::Green),
            "blue" | "b" => Ok(ColorChannel::Blue),
            "hue" | "h" => Ok(ColorChannel::Hue),
            "saturation" | "s" => Ok(ColorChannel::Saturation),
            "brightness" | "value" | "v" => Ok(ColorChannel::Brightness),
            other => Err(ControlError::Configuration(format!(
                "Unknown target attribute '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

/// Clamp to [0.0, 1.0]. NaN maps to 0.0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Standard RGB -> HSV. Hue is in [0, 1).
pub fn hsv_from_rgb(rgb: Rgb) -> Hsv {
    let Rgb { r, g, b } = rgb;
    let maxc = r.max(g).max(b);
    let minc = r.min(g).min(b);
    let v = maxc;
    if minc == maxc {
        return Hsv { h: 0.0, s: 0.0, v };
    }
    let range = maxc - minc;
    let s = range / maxc;
    let rc = (maxc - r) / range;
    let gc = (maxc - g) / range;
    let bc = (maxc - b) / range;
    let h = if r == maxc {
        bc - gc
    } else if g == maxc {
        2.0 + rc - bc
    } else {
        4.0 + gc - rc
    };
    Hsv {
        h: (h / 6.0).rem_euclid(1.0),
        s,
        v,
    }
}

/// Standard HSV -> RGB. Hue wraps modulo 1.0.
pub fn rgb_from_hsv(hsv: Hsv) -> Rgb {
    let Hsv { h, s, v } = hsv;
    if s == 0.0 {
        return Rgb { r: v, g: v, b: v };
    }
    let scaled = h.rem_euclid(1.0) * 6.0;
    let sector = scaled.floor();
    let f = scaled - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match (sector as u8) % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Rgb { r, g, b }
}

/// Scale a unit value by `2^bits - 1` and truncate.
fn quantize(value: f64, bits: u8) -> u16 {
    let max = ((1u32 << bits) - 1) as f64;
    (clamp_unit(value) * max) as u16
}

/// Color of a single light
#[derive(Debug, Clone, PartialEq)]
pub struct ColorState {
    light_id: u16,
    space: ColorSpace,
    channels: [f64; 3],
    bits_per_channel: u8,
}

impl ColorState {
    /// Black light with 16 bits per channel
    pub fn new(light_id: u16, space: ColorSpace) -> Self {
        Self {
            light_id,
            space,
            channels: [0.0; 3],
            bits_per_channel: DEFAULT_BITS_PER_CHANNEL,
        }
    }

    /// Black light with a custom quantization depth (1..=16 bits)
    pub fn with_bits(light_id: u16, space: ColorSpace, bits_per_channel: u8) -> Result<Self> {
        if !(1..=16).contains(&bits_per_channel) {
            return Err(ControlError::Configuration(format!(
                "Light {}: bits per channel must be 1-16, got {}",
                light_id, bits_per_channel
            )));
        }
        Ok(Self {
            bits_per_channel,
            ..Self::new(light_id, space)
        })
    }

    pub fn light_id(&self) -> u16 {
        self.light_id
    }

    pub fn color_space(&self) -> ColorSpace {
        self.space
    }

    pub fn bits_per_channel(&self) -> u8 {
        self.bits_per_channel
    }

    /// Read a channel, deriving it from the canonical space if needed
    pub fn get(&self, channel: ColorChannel) -> f64 {
        if channel.space() == self.space {
            return self.channels[channel.index()];
        }
        match channel.space() {
            ColorSpace::Rgb => {
                let Rgb { r, g, b } = self.rgb();
                [r, g, b][channel.index()]
            }
            ColorSpace::Hsv => {
                let Hsv { h, s, v } = self.hsv();
                [h, s, v][channel.index()]
            }
        }
    }

    /// Clamp and write a single channel
    pub fn set(&mut self, channel: ColorChannel, value: f64) {
        let value = clamp_unit(value);
        if channel.space() == self.space {
            self.channels[channel.index()] = value;
            return;
        }
        match channel.space() {
            ColorSpace::Rgb => {
                let Rgb { r, g, b } = self.rgb();
                let mut rgb = [r, g, b];
                rgb[channel.index()] = value;
                self.set_rgb(Rgb {
                    r: rgb[0],
                    g: rgb[1],
                    b: rgb[2],
                });
            }
            ColorSpace::Hsv => {
                let Hsv { h, s, v } = self.hsv();
                let mut hsv = [h, s, v];
                hsv[channel.index()] = value;
                self.set_hsv(Hsv {
                    h: hsv[0],
                    s: hsv[1],
                    v: hsv[2],
                });
            }
        }
    }

    pub fn rgb(&self) -> Rgb {
        let [a, b, c] = self.channels;
        match self.space {
            ColorSpace::Rgb => Rgb { r: a, g: b, b: c },
            ColorSpace::Hsv => rgb_from_hsv(Hsv { h: a, s: b, v: c }),
        }
    }

    pub fn set_rgb(&mut self, rgb: Rgb) {
        let rgb = Rgb {
            r: clamp_unit(rgb.r),
            g: clamp_unit(rgb.g),
            b: clamp_unit(rgb.b),
        };
        self.channels = match self.space {
            ColorSpace::Rgb => [rgb.r, rgb.g, rgb.b],
            ColorSpace::Hsv => {
                let Hsv { h, s, v } = hsv_from_rgb(rgb);
                [h, s, v]
            }
        };
    }

    pub fn hsv(&self) -> Hsv {
        let [a, b, c] = self.channels;
        match self.space {
            ColorSpace::Hsv => Hsv { h: a, s: b, v: c },
            ColorSpace::Rgb => hsv_from_rgb(Rgb { r: a, g: b, b: c }),
        }
    }

    pub fn set_hsv(&mut self, hsv: Hsv) {
        let hsv = Hsv {
            h: clamp_unit(hsv.h),
            s: clamp_unit(hsv.s),
            v: clamp_unit(hsv.v),
        };
        self.channels = match self.space {
            ColorSpace::Hsv => [hsv.h, hsv.s, hsv.v],
            ColorSpace::Rgb => {
                let Rgb { r, g, b } = rgb_from_hsv(hsv);
                [clamp_unit(r), clamp_unit(g), clamp_unit(b)]
            }
        };
    }

    /// Quantized RGB at the light's configured depth
    pub fn rgb_int(&self) -> RgbTriple {
        self.int_triple(self.bits_per_channel)
    }

    /// Quantized RGB at an explicit depth; `bits` is clamped to 1..=16
    pub fn int_triple(&self, bits: u8) -> RgbTriple {
        let bits = bits.clamp(1, 16);
        let Rgb { r, g, b } = self.rgb();
        (quantize(r, bits), quantize(g, bits), quantize(b, bits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn lights() -> Vec<ColorState> {
        [ColorSpace::Rgb, ColorSpace::Hsv]
            .into_iter()
            .map(|space| {
                let mut light = ColorState::new(7, space);
                light.set_rgb(Rgb {
                    r: 0.15,
                    g: 0.3,
                    b: 0.4,
                });
                light
            })
            .collect()
    }

    #[test]
    fn test_get_rgb() {
        for light in lights() {
            assert!(close(light.get(ColorChannel::Red), 0.15));
            assert!(close(light.get(ColorChannel::Green), 0.3));
            assert!(close(light.get(ColorChannel::Blue), 0.4));
        }
    }

    #[test]
    fn test_get_hsv() {
        for light in lights() {
            assert!(close(light.get(ColorChannel::Hue), 17.0 / 30.0));
            assert!(close(light.get(ColorChannel::Saturation), 0.625));
            assert!(close(light.get(ColorChannel::Brightness), 0.4));
        }
    }

    #[test]
    fn test_rgb_int_truncates() {
        for light in lights() {
            assert_eq!(light.rgb_int(), (9830, 19660, 26214));
        }
    }

    #[test]
    fn test_set_rgb_clamps() {
        for mut light in lights() {
            light.set_rgb(Rgb {
                r: -0.1,
                g: 5.0,
                b: -4.0,
            });
            let rgb = light.rgb();
            assert!(close(rgb.r, 0.0));
            assert!(close(rgb.g, 1.0));
            assert!(close(rgb.b, 0.0));

            let hsv = light.hsv();
            assert!(close(hsv.h, 1.0 / 3.0));
            assert!(close(hsv.s, 1.0));
            assert!(close(hsv.v, 1.0));
        }
    }

    #[test]
    fn test_set_rgb_get_hsv() {
        for mut light in lights() {
            light.set_rgb(Rgb {
                r: 0.1,
                g: 0.75,
                b: 0.22,
            });
            let hsv = light.hsv();
            assert!(close(hsv.h, 0.36410256410256414));
            assert!(close(hsv.s, 0.8666666666666667));
            assert!(close(hsv.v, 0.75));
        }
    }

    #[test]
    fn test_set_hsv_get_rgb() {
        for mut light in lights() {
            light.set_hsv(Hsv {
                h: 0.5,
                s: 1.0,
                v: 1.0,
            });
            let rgb = light.rgb();
            assert!(close(rgb.r, 0.0));
            assert!(close(rgb.g, 1.0));
            assert!(close(rgb.b, 1.0));

            light.set_hsv(Hsv {
                h: -0.1,
                s: 1.2,
                v: 0.25,
            });
            let rgb = light.rgb();
            assert!(close(rgb.r, 0.25));
            assert!(close(rgb.g, 0.0));
            assert!(close(rgb.b, 0.0));
        }
    }

    #[test]
    fn test_channel_setters_clamp() {
        for (value, expected) in [(0.7, 0.7), (-0.2, 0.0), (30.0, 1.0)] {
            for mut light in lights() {
                for channel in [
                    ColorChannel::Red,
                    ColorChannel::Green,
                    ColorChannel::Blue,
                    ColorChannel::Saturation,
                    ColorChannel::Brightness,
                ] {
                    light.set(channel, value);
                    assert!(
                        close(light.get(channel), expected),
                        "{} on {:?}",
                        channel,
                        light.color_space()
                    );
                }
            }
        }
    }

    #[test]
    fn test_hue_setter_wraps_at_one() {
        for mut light in lights() {
            light.set(ColorChannel::Hue, 30.0);
            let h = light.get(ColorChannel::Hue);
            // Hue 1.0 and 0.0 are the same color; RGB-canonical lights read back 0.0.
            assert!(close(h, 1.0) || close(h, 0.0));

            light.set(ColorChannel::Hue, 0.7);
            assert!(close(light.get(ColorChannel::Hue), 0.7));
        }
    }

    #[test]
    fn test_hue_wraps_in_conversion() {
        let a = rgb_from_hsv(Hsv {
            h: 1.0,
            s: 1.0,
            v: 1.0,
        });
        let b = rgb_from_hsv(Hsv {
            h: 0.0,
            s: 1.0,
            v: 1.0,
        });
        assert_eq!(a, b);
    }

    #[test]
    fn test_nan_clamps_to_zero() {
        let mut light = ColorState::new(1, ColorSpace::Rgb);
        light.set(ColorChannel::Red, f64::NAN);
        assert_eq!(light.get(ColorChannel::Red), 0.0);
    }

    #[test]
    fn test_custom_bits() {
        let mut light = ColorState::with_bits(1, ColorSpace::Rgb, 8).unwrap();
        light.set(ColorChannel::Red, 1.0);
        light.set(ColorChannel::Green, 0.5);
        assert_eq!(light.rgb_int(), (255, 127, 0));
        assert_eq!(light.int_triple(16), (65535, 32767, 0));
    }

    #[test]
    fn test_invalid_bits_rejected() {
        assert!(ColorState::with_bits(1, ColorSpace::Rgb, 0).is_err());
        assert!(ColorState::with_bits(1, ColorSpace::Rgb, 17).is_err());
    }

    #[test]
    fn test_channel_names() {
        assert_eq!("value".parse::<ColorChannel>().unwrap(), ColorChannel::Brightness);
        assert_eq!("Saturation".parse::<ColorChannel>().unwrap(), ColorChannel::Saturation);
        assert!(matches!(
            "alpha".parse::<ColorChannel>(),
            Err(ControlError::Configuration(_))
        ));
        for channel in ColorChannel::ALL {
            assert_eq!(channel.name().parse::<ColorChannel>().unwrap(), channel);
        }
    }
}
