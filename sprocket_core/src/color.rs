// Copyright 2026 the Sprocket Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 8-bit RGB colors and the multiplicative cascade.

/// An opaque 8-bit RGB color.
///
/// Opacity is tracked separately (see [`cascade_channel`]) so that color and
/// opacity can cascade independently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Color {
    /// Pure white, the neutral element of the cascade.
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Pure black.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Creates a color from its channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns `self` modulated by `parent`, channel by channel.
    #[inline]
    #[must_use]
    pub const fn cascade(self, parent: Self) -> Self {
        Self {
            r: cascade_channel(self.r, parent.r),
            g: cascade_channel(self.g, parent.g),
            b: cascade_channel(self.b, parent.b),
        }
    }

    /// Returns `true` if this is [`WHITE`](Self::WHITE).
    #[inline]
    #[must_use]
    pub const fn is_white(self) -> bool {
        self.r == 255 && self.g == 255 && self.b == 255
    }
}

/// Computes `real * parent / 255`, truncated.
///
/// The result never exceeds `real`, and `cascade_channel(x, 255) == x`.
#[inline]
#[must_use]
#[expect(
    clippy::cast_possible_truncation,
    reason = "real * parent / 255 is at most 255"
)]
pub const fn cascade_channel(real: u8, parent: u8) -> u8 {
    (real as u16 * parent as u16 / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_parent_is_neutral() {
        let c = Color::new(12, 200, 99);
        assert_eq!(c.cascade(Color::WHITE), c);
        assert_eq!(cascade_channel(77, 255), 77);
    }

    #[test]
    fn half_opacity_truncates() {
        assert_eq!(cascade_channel(255, 128), 128);
        assert_eq!(cascade_channel(100, 128), 50);
        assert_eq!(cascade_channel(1, 254), 0);
    }

    #[test]
    fn black_parent_zeroes() {
        assert_eq!(Color::new(9, 8, 7).cascade(Color::BLACK), Color::BLACK);
    }
}
