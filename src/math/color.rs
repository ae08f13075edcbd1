use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ColourError;

/// 24-bit sRGB colour packed as `0xRRGGBB`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Colour(u32);

impl Colour {
    pub const WHITE: Colour = Colour(0xffffff);
    pub const BLACK: Colour = Colour(0x000000);

    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Packs a hex value, rejecting anything above `0xFFFFFF`.
    pub fn from_hex(hex: u32) -> Result<Self, ColourError> {
        if hex > 0xffffff {
            return Err(ColourError::OutOfRange(hex));
        }
        Ok(Self(hex))
    }

    pub const fn hex(self) -> u32 {
        self.0
    }

    pub const fn to_rgb(self) -> [u8; 3] {
        [(self.0 >> 16) as u8, (self.0 >> 8) as u8, self.0 as u8]
    }

    pub fn from_srgb_array(rgb: [u8; 3]) -> Self {
        Self::from_rgb(rgb[0], rgb[1], rgb[2])
    }

    /// Converts from linear components, clamping each to `0.0..=1.0`.
    pub fn from_linear_rgb(linear: [f32; 3]) -> Self {
        let [r, g, b] = linear.map(|c| {
            let encoded = linear_to_srgb(c.clamp(0.0, 1.0));
            (encoded * 255.0).round() as u8
        });
        Self::from_rgb(r, g, b)
    }

    pub fn to_linear_rgb(self) -> [f32; 3] {
        self.to_rgb().map(|c| srgb_to_linear(c as f32 / 255.0))
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

impl Default for Colour {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl FromStr for Colour {
    type Err = ColourError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .unwrap_or(s);
        if digits.len() != 6 {
            return Err(ColourError::Parse(s.to_string()));
        }
        let hex = u32::from_str_radix(digits, 16).map_err(|_| ColourError::Parse(s.to_string()))?;
        Self::from_hex(hex)
    }
}

impl TryFrom<String> for Colour {
    type Error = ColourError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Colour> for String {
    fn from(colour: Colour) -> Self {
        colour.to_string()
    }
}

impl TryFrom<u32> for Colour {
    type Error = ColourError;

    fn try_from(hex: u32) -> Result<Self, Self::Error> {
        Self::from_hex(hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_packing() {
        let teal = Colour::from_rgb(0x44, 0xaa, 0x88);
        assert_eq!(teal.hex(), 0x44aa88);
        assert_eq!(teal.to_rgb(), [0x44, 0xaa, 0x88]);
    }

    #[test]
    fn test_from_hex_rejects_out_of_range() {
        assert!(Colour::from_hex(0xffffff).is_ok());
        assert!(matches!(
            Colour::from_hex(0x1000000),
            Err(ColourError::OutOfRange(0x1000000))
        ));
    }

    #[test]
    fn test_parse_and_display() {
        let colour: Colour = "#cccccc".parse().unwrap();
        assert_eq!(colour.hex(), 0xcccccc);
        assert_eq!(colour.to_string(), "#cccccc");
        assert_eq!("0x44aa88".parse::<Colour>().unwrap().hex(), 0x44aa88);
        assert!("#abc".parse::<Colour>().is_err());
        assert!("#zzzzzz".parse::<Colour>().is_err());
    }

    #[test]
    fn test_linear_conversion_endpoints() {
        assert_eq!(Colour::WHITE.to_linear_rgb(), [1.0, 1.0, 1.0]);
        assert_eq!(Colour::BLACK.to_linear_rgb(), [0.0, 0.0, 0.0]);
        assert_eq!(Colour::from_linear_rgb([1.0, 0.0, 2.0]), Colour::from_rgb(255, 0, 255));
    }

    #[test]
    fn test_linear_round_trip_is_stable() {
        let colour = Colour::from_rgb(0x44, 0xaa, 0x88);
        assert_eq!(Colour::from_linear_rgb(colour.to_linear_rgb()), colour);
    }
}
