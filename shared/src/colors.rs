use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::state::Comparison;

/// Solid RGB color. Serialized as a `#rrggbb` hex string, which is the
/// form the host persists and the renderer consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rgb` or `#rrggbb`. Returns `None` for anything else.
    pub fn parse(text: &str) -> Option<Rgb> {
        let hex = text.trim().strip_prefix('#')?;
        match hex.len() {
            3 => {
                let mut digits = hex.chars().map(|c| c.to_digit(16));
                let r = digits.next()??;
                let g = digits.next()??;
                let b = digits.next()??;
                Some(Rgb::new((r * 17) as u8, (g * 17) as u8, (b * 17) as u8))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Rgb::new(r, g, b))
            }
            _ => None,
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear interpolation toward `other` by `t` in [0,1].
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| ((a as f64 + (b as f64 - a as f64) * t).round()) as u8;
        Rgb::new(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }

    /// Relative luminance in [0,1] (ITU-R BT.601 weights).
    pub fn luminance(self) -> f64 {
        (0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64) / 255.0
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Rgb::parse(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color: {text:?}")))
    }
}

/// Wash a color out toward white. `amount` 0 leaves the color untouched,
/// 1 yields pure white.
pub fn white_blend(color: Rgb, amount: f64) -> Rgb {
    color.lerp(Rgb::WHITE, amount)
}

/// High-contrast text color for the given background fill.
pub fn auto_text_color(background: Rgb) -> Rgb {
    if background.luminance() > 0.5 {
        Rgb::new(0x21, 0x21, 0x21)
    } else {
        Rgb::WHITE
    }
}

/// Deterministic fallback color via CRC32 hash of a display name.
/// Takes (r, g, b) from the first 3 bytes of the hash.
pub fn name_color(name: &str) -> Rgb {
    let hash = crc32fast::hash(name.as_bytes());
    let bytes = hash.to_be_bytes();
    Rgb::new(bytes[0], bytes[1], bytes[2])
}

const RAMP_GOOD: Rgb = Rgb::new(0x2e, 0xa0, 0x43);
const RAMP_MID: Rgb = Rgb::new(0xf2, 0xc8, 0x0f);
const RAMP_BAD: Rgb = Rgb::new(0xd7, 0x19, 0x1c);

/// Generated ramp for thresholds lacking an explicit color, keyed by the
/// comparison direction: descending comparisons get green first (highest
/// band evaluated first), ascending comparisons get red first.
pub fn state_palette(count: usize, comparison: Comparison) -> Vec<Rgb> {
    if count == 0 {
        return Vec::new();
    }
    let mut ramp: Vec<Rgb> = (0..count)
        .map(|i| {
            if count == 1 {
                return RAMP_GOOD;
            }
            let t = i as f64 / (count - 1) as f64;
            if t < 0.5 {
                RAMP_GOOD.lerp(RAMP_MID, t * 2.0)
            } else {
                RAMP_MID.lerp(RAMP_BAD, (t - 0.5) * 2.0)
            }
        })
        .collect();
    if comparison.is_ascending() {
        ramp.reverse();
    }
    ramp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_long_and_short_hex() {
        assert_eq!(Rgb::parse("#01B8AA"), Some(Rgb::new(0x01, 0xb8, 0xaa)));
        assert_eq!(Rgb::parse("#fff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::parse("#abc"), Some(Rgb::new(0xaa, 0xbb, 0xcc)));
        assert_eq!(Rgb::parse("teal"), None);
        assert_eq!(Rgb::parse("#12345"), None);
    }

    #[test]
    fn hex_roundtrip() {
        let color = Rgb::new(37, 91, 201);
        assert_eq!(Rgb::parse(&color.to_hex()), Some(color));
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&Rgb::new(1, 184, 170)).unwrap();
        assert_eq!(json, "\"#01b8aa\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgb::new(1, 184, 170));
    }

    #[test]
    fn white_blend_endpoints() {
        let base = Rgb::new(100, 50, 0);
        assert_eq!(white_blend(base, 0.0), base);
        assert_eq!(white_blend(base, 1.0), Rgb::WHITE);
        assert_eq!(white_blend(base, 0.5), Rgb::new(178, 153, 128));
    }

    #[test]
    fn auto_text_color_picks_contrast() {
        assert_eq!(auto_text_color(Rgb::WHITE), Rgb::new(0x21, 0x21, 0x21));
        assert_eq!(auto_text_color(Rgb::BLACK), Rgb::WHITE);
        assert_eq!(auto_text_color(Rgb::new(0xd7, 0x19, 0x1c)), Rgb::WHITE);
    }

    #[test]
    fn name_color_is_deterministic() {
        assert_eq!(name_color("North"), name_color("North"));
        assert_ne!(name_color("North"), name_color("South"));
    }

    #[test]
    fn state_palette_direction() {
        let descending = state_palette(3, Comparison::Gt);
        let ascending = state_palette(3, Comparison::Lt);
        assert_eq!(descending.len(), 3);
        assert_eq!(descending[0], RAMP_GOOD);
        assert_eq!(descending[2], RAMP_BAD);
        assert_eq!(ascending[0], RAMP_BAD);
        assert_eq!(ascending[2], RAMP_GOOD);
    }

    #[test]
    fn state_palette_degenerate_counts() {
        assert!(state_palette(0, Comparison::Gt).is_empty());
        assert_eq!(state_palette(1, Comparison::Gt), vec![RAMP_GOOD]);
    }
}
