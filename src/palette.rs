//! Fixed ball color palette

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// An RGB color, serialized as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color(pub u32);

impl Color {
    pub const fn rgb(hex: u32) -> Self {
        Self(hex & 0x00ff_ffff)
    }

    pub fn to_hex(&self) -> String {
        format!("#{:06x}", self.0)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix('#')?;
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::rgb)
    }

    /// Position of this color in the palette, if it is a member
    pub fn palette_index(&self) -> Option<usize> {
        PALETTE.iter().position(|c| c == self)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Color::from_hex(&s).ok_or_else(|| format!("not a #rrggbb color: {s}"))
    }
}

/// Pastel palette; every ball starts with the first entry
pub const PALETTE: [Color; 16] = [
    Color::rgb(0xa5dee5),
    Color::rgb(0xe0f9b5),
    Color::rgb(0xfefdca),
    Color::rgb(0xffcfdf),
    Color::rgb(0x61c0bf),
    Color::rgb(0xbbded6),
    Color::rgb(0xfae3d9),
    Color::rgb(0xffb6b9),
    Color::rgb(0xffaaa5),
    Color::rgb(0xffd3b6),
    Color::rgb(0xdcedc1),
    Color::rgb(0xa8e6cf),
    Color::rgb(0xcca8e9),
    Color::rgb(0xc3bef0),
    Color::rgb(0xcadefc),
    Color::rgb(0xdefcf9),
];

/// Pick a palette color different from `current`, uniformly among the rest
pub fn shift_color<R: Rng + ?Sized>(current: Color, rng: &mut R) -> Color {
    loop {
        let candidate = PALETTE[rng.random_range(0..PALETTE.len())];
        if candidate != current {
            return candidate;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_palette_entries_distinct() {
        for (i, a) in PALETTE.iter().enumerate() {
            for b in &PALETTE[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_hex_roundtrip() {
        let color = Color::from_hex("#ffcfdf").unwrap();
        assert_eq!(color, PALETTE[3]);
        assert_eq!(color.to_string(), "#ffcfdf");
        assert!(Color::from_hex("ffcfdf").is_none());
        assert!(Color::from_hex("#12345").is_none());
    }

    #[test]
    fn test_color_serializes_as_hex_string() {
        let json = serde_json::to_string(&PALETTE[0]).unwrap();
        assert_eq!(json, "\"#a5dee5\"");
        let back: Color = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PALETTE[0]);
    }

    #[test]
    fn test_shift_color_leaves_non_palette_color() {
        let mut rng = Pcg32::seed_from_u64(3);
        let outside = Color::rgb(0x000000);
        let shifted = shift_color(outside, &mut rng);
        assert!(shifted.palette_index().is_some());
    }

    proptest! {
        #[test]
        fn shift_color_always_changes(start in 0usize..16, seed in any::<u64>()) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut current = PALETTE[start];
            for _ in 0..50 {
                let next = shift_color(current, &mut rng);
                prop_assert_ne!(next, current);
                prop_assert!(next.palette_index().is_some());
                current = next;
            }
        }
    }
}
