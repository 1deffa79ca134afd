use std::ops::RangeInclusive;

use serde::Deserialize;

use crate::ascii::palette::Palette;
use crate::AsciiError;

pub const OUTPUT_WIDTH_RANGE: RangeInclusive<u32> = 40..=200;
pub const DEFAULT_OUTPUT_WIDTH: u32 = 80;

/// User-facing settings read by every tick.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LiveConfig {
    output_width: u32,
    palette: Palette,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self { output_width: DEFAULT_OUTPUT_WIDTH, palette: Palette::default() }
    }
}

impl LiveConfig {
    pub fn new(output_width: u32, palette: Palette) -> Result<Self, AsciiError> {
        let mut config = Self { output_width: DEFAULT_OUTPUT_WIDTH, palette };
        config.set_output_width(output_width)?;
        Ok(config)
    }

    /// Parses a TOML document such as
    ///
    /// ```toml
    /// output_width = 120
    /// palette = "@%#*+=-:. "
    /// ```
    pub fn from_toml(source: &str) -> Result<Self, AsciiError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn output_width(&self) -> u32 {
        self.output_width
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_output_width(&mut self, output_width: u32) -> Result<(), AsciiError> {
        if !OUTPUT_WIDTH_RANGE.contains(&output_width) {
            return Err(AsciiError::InvalidWidth(output_width));
        }
        self.output_width = output_width;
        Ok(())
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    fn validate(&self) -> Result<(), AsciiError> {
        if !OUTPUT_WIDTH_RANGE.contains(&self.output_width) {
            return Err(AsciiError::InvalidWidth(self.output_width));
        }
        Ok(())
    }
}
