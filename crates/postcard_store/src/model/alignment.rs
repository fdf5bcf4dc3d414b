//! Two-character text alignment codes.
//!
//! The first character picks the horizontal anchor (`L`, `C`, `R`), the second
//! the vertical anchor (`T`, `M`, `B`). Codes are upper-case only: `LT` is
//! left/top, `CM` is centered.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Horizontal text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

impl HorizontalAlign {
    pub fn as_char(self) -> char {
        match self {
            Self::Left => 'L',
            Self::Center => 'C',
            Self::Right => 'R',
        }
    }

    fn from_char(value: char) -> Option<Self> {
        match value {
            'L' => Some(Self::Left),
            'C' => Some(Self::Center),
            'R' => Some(Self::Right),
            _ => None,
        }
    }
}

/// Vertical text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

impl VerticalAlign {
    pub fn as_char(self) -> char {
        match self {
            Self::Top => 'T',
            Self::Middle => 'M',
            Self::Bottom => 'B',
        }
    }

    fn from_char(value: char) -> Option<Self> {
        match value {
            'T' => Some(Self::Top),
            'M' => Some(Self::Middle),
            'B' => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// Validated alignment directive for postcard text placement.
///
/// Serialized as its two-character code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TextAlignment {
    pub horizontal: HorizontalAlign,
    pub vertical: VerticalAlign,
}

impl TextAlignment {
    pub fn new(horizontal: HorizontalAlign, vertical: VerticalAlign) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Parses a code such as `LT`.
    ///
    /// # Errors
    /// - `AlignmentLength` unless the input is exactly two characters.
    /// - `UnknownHorizontal` / `UnknownVertical` for characters outside the
    ///   alphabet, including lower-case letters.
    pub fn parse(code: &str) -> Result<Self, ValidationError> {
        let mut chars = code.chars();
        let (Some(first), Some(second), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(ValidationError::AlignmentLength(code.to_string()));
        };

        let horizontal =
            HorizontalAlign::from_char(first).ok_or(ValidationError::UnknownHorizontal(first))?;
        let vertical =
            VerticalAlign::from_char(second).ok_or(ValidationError::UnknownVertical(second))?;
        Ok(Self::new(horizontal, vertical))
    }

    /// Returns the two-character storage code.
    pub fn code(&self) -> String {
        self.to_string()
    }
}

impl Display for TextAlignment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.horizontal.as_char(), self.vertical.as_char())
    }
}

impl FromStr for TextAlignment {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for TextAlignment {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TextAlignment> for String {
    fn from(value: TextAlignment) -> Self {
        value.code()
    }
}

#[cfg(test)]
mod tests {
    use super::{HorizontalAlign, TextAlignment, VerticalAlign};
    use crate::model::ValidationError;

    #[test]
    fn every_code_in_the_alphabet_parses_and_prints_back() {
        for h in ['L', 'C', 'R'] {
            for v in ['T', 'M', 'B'] {
                let code = format!("{h}{v}");
                let parsed = TextAlignment::parse(&code).unwrap();
                assert_eq!(parsed.code(), code);
            }
        }
    }

    #[test]
    fn parse_maps_characters_to_anchors() {
        let parsed: TextAlignment = "RB".parse().unwrap();
        assert_eq!(parsed.horizontal, HorizontalAlign::Right);
        assert_eq!(parsed.vertical, VerticalAlign::Bottom);
    }

    #[test]
    fn parse_rejects_wrong_length() {
        for code in ["", "L", "LTB"] {
            assert_eq!(
                TextAlignment::parse(code),
                Err(ValidationError::AlignmentLength(code.to_string()))
            );
        }
        assert_eq!(
            TextAlignment::parse("  "),
            Err(ValidationError::UnknownHorizontal(' '))
        );
    }

    #[test]
    fn parse_rejects_characters_outside_alphabet() {
        assert_eq!(
            TextAlignment::parse("XT"),
            Err(ValidationError::UnknownHorizontal('X'))
        );
        assert_eq!(
            TextAlignment::parse("LX"),
            Err(ValidationError::UnknownVertical('X'))
        );
        assert_eq!(
            TextAlignment::parse("lt"),
            Err(ValidationError::UnknownHorizontal('l'))
        );
        assert_eq!(
            TextAlignment::parse("TL"),
            Err(ValidationError::UnknownHorizontal('T'))
        );
    }

    #[test]
    fn multibyte_input_counts_characters_not_bytes() {
        assert_eq!(
            TextAlignment::parse("Lé"),
            Err(ValidationError::UnknownVertical('é'))
        );
    }

    #[test]
    fn serde_uses_the_two_character_code() {
        let alignment = TextAlignment::new(HorizontalAlign::Center, VerticalAlign::Middle);
        let json = serde_json::to_string(&alignment).unwrap();
        assert_eq!(json, "\"CM\"");

        let back: TextAlignment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, alignment);
        assert!(serde_json::from_str::<TextAlignment>("\"ZZ\"").is_err());
    }
}
