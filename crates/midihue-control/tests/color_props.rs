use midihue_control::color::{hsv_from_rgb, rgb_from_hsv, Rgb};
use midihue_control::{ColorChannel, ColorSpace, ColorState};
use proptest::prelude::*;

fn channel() -> impl Strategy<Value = ColorChannel> {
    prop::sample::select(ColorChannel::ALL.to_vec())
}

fn space() -> impl Strategy<Value = ColorSpace> {
    prop_oneof![Just(ColorSpace::Rgb), Just(ColorSpace::Hsv)]
}

proptest! {
    #[test]
    fn set_then_get_is_clamped_in_native_space(ch in channel(), x in -2.0f64..3.0) {
        let mut light = ColorState::new(1, ch.space());
        light.set(ch, x);
        prop_assert_eq!(light.get(ch), x.clamp(0.0, 1.0));
    }

    #[test]
    fn set_then_get_is_clamped_on_hsv_light(ch in channel(), x in -2.0f64..3.0) {
        let mut light = ColorState::new(1, ColorSpace::Hsv);
        light.set(ch, x);
        prop_assert!((light.get(ch) - x.clamp(0.0, 1.0)).abs() < 1e-9);
    }

    #[test]
    fn hsv_channels_survive_on_dark_hsv_light(h in 0.0f64..=1.0, s in 0.0f64..=1.0) {
        let mut light = ColorState::new(1, ColorSpace::Hsv);
        light.set(ColorChannel::Saturation, s);
        light.set(ColorChannel::Hue, h);
        light.set(ColorChannel::Brightness, 0.0);
        prop_assert_eq!(light.get(ColorChannel::Hue), h);
        prop_assert_eq!(light.get(ColorChannel::Saturation), s);
    }

    #[test]
    fn stored_channels_stay_in_unit_range(
        space in space(),
        writes in prop::collection::vec((channel(), -10.0f64..10.0), 1..20),
    ) {
        let mut light = ColorState::new(1, space);
        for (ch, x) in writes {
            light.set(ch, x);
        }
        for ch in ColorChannel::ALL {
            let value = light.get(ch);
            prop_assert!((0.0..=1.0).contains(&value), "{} = {}", ch, value);
        }
    }

    #[test]
    fn rgb_survives_hsv_round_trip(r in 0.0f64..=1.0, g in 0.0f64..=1.0, b in 0.0f64..=1.0) {
        let back = rgb_from_hsv(hsv_from_rgb(Rgb { r, g, b }));
        prop_assert!((back.r - r).abs() < 1e-9);
        prop_assert!((back.g - g).abs() < 1e-9);
        prop_assert!((back.b - b).abs() < 1e-9);
    }

    #[test]
    fn rgb_int_is_truncated_to_depth(
        bits in 1u8..=16,
        r in 0.0f64..=1.0,
        g in 0.0f64..=1.0,
        b in 0.0f64..=1.0,
    ) {
        let mut light = ColorState::with_bits(1, ColorSpace::Rgb, bits).unwrap();
        light.set_rgb(Rgb { r, g, b });
        let max = ((1u32 << bits) - 1) as f64;
        let expected = ((r * max) as u16, (g * max) as u16, (b * max) as u16);
        prop_assert_eq!(light.rgb_int(), expected);
    }

    #[test]
    fn rgb_channel_on_hsv_light_reads_back(x in 0.0f64..=1.0) {
        let mut light = ColorState::new(1, ColorSpace::Hsv);
        light.set(ColorChannel::Red, x);
        prop_assert!((light.get(ColorChannel::Red) - x).abs() < 1e-9);
    }
}
