//! Packed colors and the blending step shared by light mixing and output.
//!
//! A [`Color`] packs red into the lowest byte, then green, then blue, with alpha in the
//! top byte. Only the top seven bits of alpha take part in blending, which keeps the
//! float-bits form (see [`Color::to_float_bits`]) away from NaN patterns.

use std::fmt;

/// 32-bit packed color, `0xAABBGGRR`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color(pub u32);

impl Color {
    pub const TRANSPARENT: Color = Color(0);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(0, 0, 255);
    pub const YELLOW: Color = Color::rgb(255, 255, 0);
    pub const TORCH: Color = Color::rgb(255, 204, 102);
    pub const EMBER: Color = Color::rgb(255, 96, 32);
    pub const FROST: Color = Color::rgb(128, 200, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Color((r as u32) | (g as u32) << 8 | (b as u32) << 16 | (a as u32) << 24)
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::rgba(r, g, b, 255)
    }

    #[inline]
    pub const fn r(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    #[inline]
    pub const fn g(self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    #[inline]
    pub const fn b(self) -> u8 {
        ((self.0 >> 16) & 0xFF) as u8
    }

    #[inline]
    pub const fn a(self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// Alpha as a blend weight, from the seven significant alpha bits.
    #[inline]
    pub fn alpha_fraction(self) -> f32 {
        (self.0 >> 25) as f32 * (1.0 / 127.0)
    }

    /// `0x00RRGGBB`, the layout framebuffer windows expect.
    pub fn to_xrgb(self) -> u32 {
        (self.r() as u32) << 16 | (self.g() as u32) << 8 | self.b() as u32
    }

    /// The color as a single-precision float whose bit pattern is the packed value,
    /// with the lowest alpha bit cleared.
    pub fn to_float_bits(self) -> f32 {
        f32::from_bits(self.0 & 0xFEFF_FFFF)
    }

    pub fn from_float_bits(bits: f32) -> Self {
        Color(bits.to_bits())
    }

    /// Move each of red, green and blue from `self` toward `end` by `t`, keeping this
    /// color's alpha. `t` is used as given.
    pub fn lerp_channels(self, end: Color, t: f32) -> Color {
        let mix = |s: u8, e: u8| -> u32 {
            let (s, e) = (s as f32, e as f32);
            ((s + t * (e - s)) as i32 & 0xFF) as u32
        };
        Color(
            mix(self.r(), end.r())
                | mix(self.g(), end.g()) << 8
                | mix(self.b(), end.b()) << 16
                | (self.0 & 0xFE00_0000),
        )
    }

    /// Blend toward `end` by `change` scaled by `end`'s own alpha.
    pub fn lerp_blended(self, end: Color, change: f32) -> Color {
        self.lerp_channels(end, change * end.alpha_fraction())
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color(#{:02x}{:02x}{:02x}/{:02x})", self.r(), self.g(), self.b(), self.a())
    }
}
