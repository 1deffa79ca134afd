use super::{frame::TextFrame, palette::Palette};
use crate::image_pipeline::raster::Raster;

/// Weighted luminance of an RGB sample, in [0.0, 255.0].
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)
}

/// Brightness index into a palette of `len` glyphs, in `0..len`.
///
/// The glyph actually drawn is taken from the opposite end, see [`glyph_for`].
pub fn brightness_index(luminance: f64, len: usize) -> usize {
    let max_index = len.saturating_sub(1);
    let index = ((luminance / 255.0) * max_index as f64).floor();
    if index <= 0.0 {
        0
    } else {
        (index as usize).min(max_index)
    }
}

/// Position of the glyph selected for `luminance`. Bright samples select the
/// first glyph, dark samples the last.
pub fn palette_position(luminance: f64, len: usize) -> usize {
    len.saturating_sub(1) - brightness_index(luminance, len)
}

pub fn glyph_for(rgb: [u8; 3], palette: &Palette) -> char {
    let [r, g, b] = rgb;
    palette.char_at(palette_position(luminance(r, g, b), palette.len()))
}

/// Maps every sample of `raster` onto a glyph of `palette`.
pub fn map(raster: &Raster, palette: &Palette) -> TextFrame {
    if raster.is_empty() {
        return TextFrame::empty();
    }

    let (width, height) = (raster.width(), raster.height());
    let max_glyph_len = palette.chars().iter().map(|ch| ch.len_utf8()).max().unwrap_or(1);
    let mut text = String::with_capacity((width as usize * max_glyph_len + 1) * height as usize);

    for row in raster.rows() {
        for sample in row.chunks_exact(3) {
            text.push(glyph_for([sample[0], sample[1], sample[2]], palette));
        }
        text.push('\n');
    }

    TextFrame::new(width, height, text)
}
