use std::fmt;

use serde::Deserialize;

use crate::AsciiError;

/// Ordered glyph lookup table, authored dense/dark-first.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Palette {
    chars: Vec<char>,
}

impl Palette {
    pub fn new(chars: impl Into<String>) -> Result<Self, AsciiError> {
        let chars: Vec<char> = chars.into().chars().collect();
        if chars.is_empty() || chars.iter().any(|ch| ch.is_control()) {
            return Err(AsciiError::InvalidPalette);
        }
        Ok(Self { chars })
    }

    fn preset(chars: &str) -> Self {
        Self { chars: chars.chars().collect() }
    }

    pub fn classic() -> Self {
        Self::preset("@%#*+=-:. ")
    }

    pub fn blocks() -> Self {
        Self::preset("█▉▊▋▌▍▎▏ ")
    }

    pub fn detailed() -> Self {
        Self::preset("MNHQOdbpqwmZO2J3G6hg9#&8@$")
    }

    pub fn simple() -> Self {
        Self::preset(".:;+=xX$&")
    }

    pub fn binary() -> Self {
        Self::preset("01 ")
    }

    pub fn lines() -> Self {
        Self::preset("╬╦╩╠╣║═│┌┐└┘ ")
    }

    pub fn sketch() -> Self {
        Self::preset("▓▒░ ")
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Always false; a palette holds at least one glyph.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn char_at(&self, index: usize) -> char {
        self.chars[index.min(self.chars.len() - 1)]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::classic()
    }
}

impl TryFrom<String> for Palette {
    type Error = AsciiError;

    fn try_from(chars: String) -> Result<Self, Self::Error> {
        Self::new(chars)
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chars.iter().try_for_each(|ch| write!(f, "{ch}"))
    }
}
