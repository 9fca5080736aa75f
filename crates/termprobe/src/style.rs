//! Colors, text modifiers and cell styles.
//!
//! Colors keep the representation they were created with: `Named(Red)`,
//! `Indexed(1)` and `Rgb(0x800000)` may look alike on a real terminal but are
//! never equal here.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the 16 fixed palette colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedColor {
    /// black
    Black,
    /// red
    Red,
    /// green
    Green,
    /// yellow
    Yellow,
    /// blue
    Blue,
    /// magenta
    Magenta,
    /// cyan
    Cyan,
    /// gray
    Gray,
    /// dark_gray
    DarkGray,
    /// light_red
    LightRed,
    /// light_green
    LightGreen,
    /// light_yellow
    LightYellow,
    /// light_blue
    LightBlue,
    /// light_magenta
    LightMagenta,
    /// light_cyan
    LightCyan,
    /// white
    White,
}

impl NamedColor {
    /// All palette colors in ANSI order.
    pub const ALL: [Self; 16] = [
        Self::Black,
        Self::Red,
        Self::Green,
        Self::Yellow,
        Self::Blue,
        Self::Magenta,
        Self::Cyan,
        Self::Gray,
        Self::DarkGray,
        Self::LightRed,
        Self::LightGreen,
        Self::LightYellow,
        Self::LightBlue,
        Self::LightMagenta,
        Self::LightCyan,
        Self::White,
    ];

    /// Canonical snake_case name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
            Self::Gray => "gray",
            Self::DarkGray => "dark_gray",
            Self::LightRed => "light_red",
            Self::LightGreen => "light_green",
            Self::LightYellow => "light_yellow",
            Self::LightBlue => "light_blue",
            Self::LightMagenta => "light_magenta",
            Self::LightCyan => "light_cyan",
            Self::White => "white",
        }
    }

    /// Look up a palette color by name. `grey` spellings are accepted.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('-', "_");
        let normalized = normalized.replace("grey", "gray");
        Self::ALL.into_iter().find(|c| c.name() == normalized)
    }
}

impl fmt::Display for NamedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A cell color.
///
/// Textual forms: palette name (`red`), `index:N`, `#RRGGBB`, `unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Color {
    /// Inherit the terminal default
    #[default]
    Unset,
    /// Palette color
    Named(NamedColor),
    /// 256-color index
    Indexed(u8),
    /// 24-bit color, `0xRRGGBB`
    Rgb(u32),
}

impl Color {
    /// Build an RGB color from components.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Parse a `#RRGGBB` hex string.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::Rgb)
    }

    /// Whether this is the unset/default color.
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => f.write_str("unset"),
            Self::Named(named) => f.write_str(named.name()),
            Self::Indexed(index) => write!(f, "index:{index}"),
            Self::Rgb(value) => write!(f, "#{:06X}", value & 0x00FF_FFFF),
        }
    }
}

/// Error returned when a string is not a recognized color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(pub String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized color {:?}", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('#') {
            return Self::from_hex(trimmed).ok_or_else(|| ParseColorError(s.to_string()));
        }
        if let Some(index) = trimmed.strip_prefix("index:") {
            return index
                .parse::<u8>()
                .map(Self::Indexed)
                .map_err(|_| ParseColorError(s.to_string()));
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "unset" | "reset" | "default" => Ok(Self::Unset),
            other => NamedColor::from_name(other)
                .map(Self::Named)
                .ok_or_else(|| ParseColorError(s.to_string())),
        }
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NamedColor> for Color {
    fn from(named: NamedColor) -> Self {
        Self::Named(named)
    }
}

bitflags! {
    /// Text attributes applied to a cell.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifier: u16 {
        /// Bold / increased intensity
        const BOLD        = 0b0_0000_0001;
        /// Dim / decreased intensity
        const DIM         = 0b0_0000_0010;
        /// Italic
        const ITALIC      = 0b0_0000_0100;
        /// Underlined
        const UNDERLINED  = 0b0_0000_1000;
        /// Slow blink
        const SLOW_BLINK  = 0b0_0001_0000;
        /// Rapid blink
        const RAPID_BLINK = 0b0_0010_0000;
        /// Reversed fg/bg
        const REVERSED    = 0b0_0100_0000;
        /// Hidden
        const HIDDEN      = 0b0_1000_0000;
        /// Crossed out
        const CROSSED_OUT = 0b1_0000_0000;
    }
}

impl Modifier {
    /// Canonical modifier names.
    pub const NAMES: [(&'static str, Self); 9] = [
        ("bold", Self::BOLD),
        ("dim", Self::DIM),
        ("italic", Self::ITALIC),
        ("underlined", Self::UNDERLINED),
        ("slow_blink", Self::SLOW_BLINK),
        ("rapid_blink", Self::RAPID_BLINK),
        ("reversed", Self::REVERSED),
        ("hidden", Self::HIDDEN),
        ("crossed_out", Self::CROSSED_OUT),
    ];

    /// Alternative spellings accepted by [`Modifier::parse_name`].
    pub const ALIASES: [(&'static str, Self); 6] = [
        ("underline", Self::UNDERLINED),
        ("inverse", Self::REVERSED),
        ("inverse_video", Self::REVERSED),
        ("strikethrough", Self::CROSSED_OUT),
        ("strike", Self::CROSSED_OUT),
        ("blink", Self::SLOW_BLINK),
    ];

    /// Look up a single modifier by canonical name or alias.
    #[must_use]
    pub fn parse_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        Self::NAMES
            .iter()
            .chain(Self::ALIASES.iter())
            .find(|(n, _)| *n == name)
            .map(|(_, m)| *m)
    }

    /// Canonical names of the set members, in declaration order.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(_, m)| self.contains(*m))
            .map(|(n, _)| *n)
            .collect()
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&self.names().join("|"))
        }
    }
}

impl Serialize for Modifier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.names())
    }
}

impl<'de> Deserialize<'de> for Modifier {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        names.iter().try_fold(Self::empty(), |acc, name| {
            Self::parse_name(name)
                .map(|m| acc | m)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown modifier {name:?}")))
        })
    }
}

/// Foreground, background and modifiers of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Style {
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Text attributes
    pub modifiers: Modifier,
}

impl Style {
    /// Unstyled.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fg: Color::Unset,
            bg: Color::Unset,
            modifiers: Modifier::empty(),
        }
    }

    /// Set the foreground color.
    #[must_use]
    pub fn fg(mut self, color: impl Into<Color>) -> Self {
        self.fg = color.into();
        self
    }

    /// Set the background color.
    #[must_use]
    pub fn bg(mut self, color: impl Into<Color>) -> Self {
        self.bg = color.into();
        self
    }

    /// Add modifiers.
    #[must_use]
    pub fn add_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers |= modifier;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod color_tests {
        use super::*;

        #[test]
        fn test_named_roundtrip_through_text() {
            for named in NamedColor::ALL {
                let color = Color::Named(named);
                assert_eq!(color.to_string().parse::<Color>(), Ok(color));
            }
        }

        #[test]
        fn test_hex_canonical_form() {
            let color = Color::rgb(0x12, 0xab, 0xef);
            assert_eq!(color.to_string(), "#12ABEF");
            assert_eq!("#12abef".parse::<Color>(), Ok(color));
        }

        #[test]
        fn test_bad_hex() {
            assert!(Color::from_hex("#12345").is_none());
            assert!(Color::from_hex("123456").is_none());
            assert!("#zzzzzz".parse::<Color>().is_err());
        }

        #[test]
        fn test_indexed() {
            assert_eq!("index:200".parse::<Color>(), Ok(Color::Indexed(200)));
            assert!("index:300".parse::<Color>().is_err());
            assert_eq!(Color::Indexed(7).to_string(), "index:7");
        }

        #[test]
        fn test_representations_not_normalized() {
            assert_ne!(Color::Named(NamedColor::Red), Color::Indexed(1));
            assert_ne!(Color::Named(NamedColor::Black), Color::rgb(0, 0, 0));
        }

        #[test]
        fn test_grey_spelling() {
            assert_eq!(
                "dark_grey".parse::<Color>(),
                Ok(Color::Named(NamedColor::DarkGray))
            );
        }

        #[test]
        fn test_unset() {
            assert_eq!("reset".parse::<Color>(), Ok(Color::Unset));
            assert!(Color::default().is_unset());
        }

        #[test]
        fn test_bare_number_is_not_a_color() {
            assert!("1".parse::<Color>().is_err());
        }
    }

    mod modifier_tests {
        use super::*;

        #[test]
        fn test_aliases() {
            assert_eq!(Modifier::parse_name("underline"), Some(Modifier::UNDERLINED));
            assert_eq!(Modifier::parse_name("inverse_video"), Some(Modifier::REVERSED));
            assert_eq!(Modifier::parse_name("strike"), Some(Modifier::CROSSED_OUT));
            assert_eq!(Modifier::parse_name("blink"), Some(Modifier::SLOW_BLINK));
            assert_eq!(Modifier::parse_name("sparkle"), None);
        }

        #[test]
        fn test_display() {
            assert_eq!(Modifier::empty().to_string(), "none");
            assert_eq!((Modifier::BOLD | Modifier::ITALIC).to_string(), "bold|italic");
        }

        #[test]
        fn test_yaml_roundtrip() {
            let modifiers = Modifier::BOLD | Modifier::CROSSED_OUT;
            let yaml = serde_yaml_ng::to_string(&modifiers).unwrap();
            let back: Modifier = serde_yaml_ng::from_str(&yaml).unwrap();
            assert_eq!(back, modifiers);
        }
    }

    #[test]
    fn test_style_builder() {
        let style = Style::new()
            .fg(NamedColor::Red)
            .bg(Color::Indexed(4))
            .add_modifier(Modifier::BOLD);
        assert_eq!(style.fg, Color::Named(NamedColor::Red));
        assert_eq!(style.bg, Color::Indexed(4));
        assert!(style.modifiers.contains(Modifier::BOLD));
    }
}
