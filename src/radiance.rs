//! Light descriptors and their time-varying radius.
//!
//! A [`Radiance`] describes one light: how far it reaches, what tint it casts, and how its
//! radius flickers (randomly) or strobes (regularly) over time. Only [`Radiance::flare`] is
//! meant to change after construction, to brighten a light during some event.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::color::Color;

/// Seeds are handed out along a Weyl sequence so nearby lights get unrelated flicker.
static NEXT_SEED: AtomicU32 = AtomicU32::new(0x2545_F491);

fn next_seed() -> u32 {
    NEXT_SEED.fetch_add(0x9E37_79B9, Ordering::Relaxed)
}

/// Converts wall-clock milliseconds into light time, the unit flicker and strobe rates
/// are measured in. Wraps every 2^18 ms (about four and a half minutes).
pub fn light_time(millis: u64) -> f32 {
    (millis & 0x3_FFFF) as f32 * (1.5625 / 512.0)
}

/// One light source's parameters.
#[derive(Debug, Clone)]
pub struct Radiance {
    range: f32,
    color: Option<Color>,
    flicker: f32,
    strobe: f32,
    delay: f32,
    /// Temporary floor on the current range, as a fraction of `range`. Usually `0.0..=1.0`;
    /// larger values let the light exceed its normal range.
    pub flare: f32,
    seed: u32,
}

impl Default for Radiance {
    fn default() -> Self {
        Radiance::new(0.0)
    }
}

impl PartialEq for Radiance {
    /// Parameters only; two lights with the same settings are equal even though they
    /// flicker differently.
    fn eq(&self, other: &Self) -> bool {
        self.range == other.range
            && self.color == other.color
            && self.flicker == other.flicker
            && self.strobe == other.strobe
            && self.delay == other.delay
            && self.flare == other.flare
    }
}

impl Radiance {
    /// An untinted, steady light reaching `range` cells. `0.0` lights only its own cell.
    pub fn new(range: f32) -> Self {
        Radiance {
            range: range.max(0.0),
            color: None,
            flicker: 0.0,
            strobe: 0.0,
            delay: 0.0,
            flare: 0.0,
            seed: next_seed(),
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Rate of random continuous change to the range.
    pub fn with_flicker(mut self, flicker: f32) -> Self {
        self.flicker = flicker.max(0.0);
        self
    }

    /// Rate of regular pulsing of the range.
    pub fn with_strobe(mut self, strobe: f32) -> Self {
        self.strobe = strobe.max(0.0);
        self
    }

    /// Phase offset for flicker and strobe, usually `0.0..=1.0`.
    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_flare(mut self, flare: f32) -> Self {
        self.flare = flare;
        self
    }

    /// Replace the flicker seed, for reproducible flicker.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Same parameters, new flicker pattern.
    pub fn fresh_copy(&self) -> Self {
        Radiance {
            seed: next_seed(),
            ..self.clone()
        }
    }

    pub fn range(&self) -> f32 {
        self.range
    }

    /// The tint, or `None` for an untinted light.
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn flicker(&self) -> f32 {
        self.flicker
    }

    pub fn strobe(&self) -> f32 {
        self.strobe
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// The effective radius at light time `now` (see [`light_time`]).
    ///
    /// Flicker scales the range by a seeded, smoothly varying factor in `[0.625, 1.0]`;
    /// strobe by a deterministic pulse in `[0.5, 1.0]`. The result never drops below
    /// `range * flare`.
    pub fn current_range(&self, now: f32) -> f32 {
        let mut current = self.range;
        if self.flicker != 0.0 {
            let sway = sway_randomized(self.seed, now * self.flicker + self.delay);
            current *= (sway * 0.375 + 0.625).min(1.0);
        }
        if self.strobe != 0.0 {
            current *= sway_tight(now * self.strobe + self.delay) * 0.5 + 0.5;
        }
        current.max(self.range * self.flare)
    }

    /// `length` lights that pulse one after another, e.g. along a corridor.
    pub fn chain(length: usize, range: f32, color: Color, strobe: f32) -> Vec<Radiance> {
        if length <= 1 {
            return vec![Radiance::new(range).with_color(color).with_strobe(strobe)];
        }
        let step = -2.0 / length as f32;
        (0..length)
            .map(|i| {
                Radiance::new(range)
                    .with_color(color)
                    .with_strobe(strobe)
                    .with_delay(step * i as f32)
            })
            .collect()
    }

    // ========================================================================
    // Persisted form
    // ========================================================================

    /// Fixed-width text form: six comma-separated 8-digit hex bit patterns of
    /// `range, color, flicker, strobe, delay, flare` inside braces.
    ///
    /// An untinted light stores opaque white, and reads back untinted.
    pub fn serialize_to_string(&self) -> String {
        let color = self.color.unwrap_or(Color::WHITE).to_float_bits();
        let fields = [self.range, color, self.flicker, self.strobe, self.delay, self.flare];
        let hex: Vec<String> = fields.iter().map(|f| format!("{:08X}", f.to_bits())).collect();
        format!("{{{}}}", hex.join(","))
    }

    /// Parse [`Radiance::serialize_to_string`] output. Returns `None` for inputs shorter
    /// than 54 characters or with bad hex digits. The parsed light gets a new seed.
    pub fn deserialize_from_string(data: &str) -> Option<Radiance> {
        if data.len() < 54 {
            return None;
        }
        let field = |i: usize| -> Option<f32> {
            let start = 1 + i * 9;
            let digits = data.get(start..start + 8)?;
            u32::from_str_radix(digits, 16).ok().map(f32::from_bits)
        };
        let color = Color::from_float_bits(field(1)?);
        let untinted = color.0 & 0xFEFF_FFFF == Color::WHITE.0 & 0xFEFF_FFFF;
        Some(Radiance {
            range: field(0)?,
            color: (!untinted).then_some(color),
            flicker: field(2)?,
            strobe: field(3)?,
            delay: field(4)?,
            flare: field(5)?,
            seed: next_seed(),
        })
    }
}

// ============================================================================
// Oscillators
// ============================================================================

/// Smooth pseudo-random wave in `[0, 1)`, fixed by `seed` and continuous in `value`.
fn sway_randomized(seed: u32, value: f32) -> f32 {
    let floor = value.floor();
    let cell = floor as i64 as u64;
    let start = hash_unit(seed, cell);
    let end = hash_unit(seed, cell.wrapping_add(1));
    let t = value - floor;
    let t = t * t * (3.0 - 2.0 * t);
    (1.0 - t) * start + t * end
}

fn hash_unit(seed: u32, n: u64) -> f32 {
    let mut z = (seed as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ n.wrapping_mul(0x6C8E_9CF5_7093_2BD5);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 40) as f32 * (1.0 / (1u32 << 24) as f32)
}

/// Deterministic wave in `[0, 1]`: 0 at even integers, 1 at odd ones, flat at both.
fn sway_tight(value: f32) -> f32 {
    let floor = value.floor();
    let t = value - floor;
    let s = t * t * t * (t * (t * 6.0 - 15.0) + 10.0);
    if (floor as i64) & 1 == 1 { 1.0 - s } else { s }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steady_light_keeps_range() {
        let light = Radiance::new(5.0).with_color(Color::RED);
        for step in 0..100 {
            assert_eq!(light.current_range(step as f32 * 0.37), 5.0);
        }
    }

    #[test]
    fn test_flicker_bounds_and_variation() {
        let light = Radiance::new(8.0).with_flicker(2.0);
        let mut seen_low = false;
        for step in 0..1000 {
            let r = light.current_range(step as f32 * 0.05);
            assert!((8.0 * 0.625 - 1e-4..=8.0).contains(&r), "range {r}");
            seen_low |= r < 7.5;
        }
        assert!(seen_low, "flicker should actually reduce the range sometimes");
    }

    #[test]
    fn test_flicker_is_seeded_by_light() {
        let a = Radiance::new(8.0).with_flicker(1.0).with_seed(1);
        let b = Radiance::new(8.0).with_flicker(1.0).with_seed(2);
        assert_eq!(a, b);
        let differs = (0..200).any(|i| {
            let now = i as f32 * 0.1 + 0.5;
            (a.current_range(now) - b.current_range(now)).abs() > 1e-3
        });
        assert!(differs);
        // same seed, same output
        let a2 = a.clone();
        assert_eq!(a.current_range(3.3), a2.current_range(3.3));
    }

    #[test]
    fn test_strobe_is_deterministic() {
        let a = Radiance::new(4.0).with_strobe(1.0);
        let b = Radiance::new(4.0).with_strobe(1.0);
        assert_eq!(a.current_range(0.0), 2.0);
        assert_eq!(a.current_range(1.0), 4.0);
        assert_eq!(a.current_range(1.7), b.current_range(1.7));
    }

    #[test]
    fn test_flare_sets_floor() {
        let light = Radiance::new(4.0).with_strobe(1.0).with_flare(1.0);
        assert_eq!(light.current_range(0.0), 4.0);
        // Flare above 1 deliberately exceeds the nominal range.
        let bright = Radiance::new(4.0).with_flare(1.5);
        assert_eq!(bright.current_range(0.0), 6.0);
    }

    #[test]
    fn test_fresh_copy_reseeds() {
        let light = Radiance::new(6.0).with_color(Color::TORCH).with_flicker(1.0).with_seed(7);
        let copy = light.fresh_copy();
        assert_eq!(copy, light);
        assert_ne!(copy.seed(), light.seed());
        assert_eq!(light.clone().seed(), 7);
    }

    #[test]
    fn test_chain_delays() {
        let chain = Radiance::chain(4, 3.0, Color::BLUE, 1.0);
        let delays: Vec<f32> = chain.iter().map(Radiance::delay).collect();
        assert_eq!(delays, vec![0.0, -0.5, -1.0, -1.5]);
        assert_eq!(Radiance::chain(0, 3.0, Color::BLUE, 1.0).len(), 1);
    }

    #[test]
    fn test_persisted_form() {
        let light = Radiance::new(6.5)
            .with_color(Color::EMBER)
            .with_flicker(1.25)
            .with_strobe(0.5)
            .with_delay(0.25)
            .with_flare(0.1);
        let text = light.serialize_to_string();
        assert_eq!(text.len(), 55);
        assert!(text.starts_with('{') && text.ends_with('}'));

        let back = Radiance::deserialize_from_string(&text).unwrap();
        assert_eq!(back.range(), 6.5);
        assert_eq!(back.flicker(), 1.25);
        assert_eq!(back.flare, 0.1);
        let color = back.color().unwrap();
        assert_eq!((color.r(), color.g(), color.b()), (255, 96, 32));

        // trailing brace is optional
        assert!(Radiance::deserialize_from_string(&text[..54]).is_some());
        assert!(Radiance::deserialize_from_string(&text[..53]).is_none());
        assert!(Radiance::deserialize_from_string("").is_none());
    }

    #[test]
    fn test_persisted_untinted() {
        let text = Radiance::new(2.0).serialize_to_string();
        let back = Radiance::deserialize_from_string(&text).unwrap();
        assert_eq!(back.color(), None);
    }

    #[test]
    fn test_light_time_wraps() {
        assert_eq!(light_time(0), 0.0);
        assert_eq!(light_time(512), 1.5625);
        assert_eq!(light_time(0x4_0000), 0.0);
    }
}
