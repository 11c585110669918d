//! Theme lookup - maps a color name to the accent used when rendering.
//!
//! Unknown names fall back to orange.

/// Style tokens for one theme color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    /// Canonical color name
    pub name: &'static str,
    /// Main accent as `0xRRGGBB`
    pub accent: u32,
    /// Lighter shade as `0xRRGGBB`
    pub soft: u32,
    /// Emoji used as a color marker in plain-text replies
    pub marker: &'static str,
}

const PALETTES: [Palette; 6] = [
    Palette {
        name: "orange",
        accent: 0x00F9_7316,
        soft: 0x00FF_EDD5,
        marker: "🟧",
    },
    Palette {
        name: "blue",
        accent: 0x0025_63EB,
        soft: 0x00DB_EAFE,
        marker: "🟦",
    },
    Palette {
        name: "green",
        accent: 0x0016_A34A,
        soft: 0x00DC_FCE7,
        marker: "🟩",
    },
    Palette {
        name: "purple",
        accent: 0x0093_33EA,
        soft: 0x00F3_E8FF,
        marker: "🟪",
    },
    Palette {
        name: "pink",
        accent: 0x00DB_2777,
        soft: 0x00FC_E7F3,
        marker: "🩷",
    },
    Palette {
        name: "teal",
        accent: 0x000D_9488,
        soft: 0x00CC_FBF1,
        marker: "🩵",
    },
];

/// Names of every known theme color.
pub fn color_names() -> impl Iterator<Item = &'static str> {
    PALETTES.iter().map(|palette| palette.name)
}

/// Whether `name` is a known theme color.
#[must_use]
pub fn is_known_color(name: &str) -> bool {
    PALETTES.iter().any(|palette| palette.name == name)
}

/// Palette for `name`, or the orange palette when the name is unknown.
#[must_use]
pub fn palette(name: &str) -> Palette {
    let wanted = name.trim().to_lowercase();
    PALETTES
        .iter()
        .find(|palette| palette.name == wanted)
        .copied()
        .unwrap_or(PALETTES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_known_colors() {
        assert_eq!(palette("teal").name, "teal");
        assert_eq!(palette(" Blue ").accent, 0x0025_63EB);
        assert_eq!(color_names().count(), 6);
    }

    #[test]
    fn test_palette_falls_back_to_orange() {
        assert_eq!(palette("magenta").name, "orange");
        assert_eq!(palette("").name, "orange");
        assert!(!is_known_color("magenta"));
        assert!(is_known_color("pink"));
    }
}
