use crate::image_pipeline::resize::GridSize;

pub const MIN_FONT_SIZE: f32 = 3.0;
pub const MAX_FONT_SIZE: f32 = 25.0;

/// Fraction of the viewport the rendered block should span.
const FILL_WIDTH: f32 = 0.95;
const FILL_HEIGHT: f32 = 0.85;

/// Display area in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Font size in pixels so `grid` fills the target share of `viewport`.
pub fn font_size_for(grid: GridSize, viewport: Viewport) -> f32 {
    if grid.columns == 0 || grid.rows == 0 {
        return MAX_FONT_SIZE;
    }

    let by_width = viewport.width * FILL_WIDTH / grid.columns as f32;
    let by_height = viewport.height * FILL_HEIGHT / grid.rows as f32;
    let size = by_width.min(by_height);
    if size.is_nan() {
        return MIN_FONT_SIZE;
    }
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limited_by_tighter_axis() {
        let grid = GridSize { columns: 80, rows: 45 };
        let size = font_size_for(grid, Viewport::new(1280.0, 720.0));
        assert!((size - 720.0 * 0.85 / 45.0).abs() < 1e-4);
    }

    #[test]
    fn clamps_to_range() {
        let tiny = font_size_for(GridSize { columns: 200, rows: 112 }, Viewport::new(320.0, 240.0));
        assert_eq!(tiny, MIN_FONT_SIZE);
        let huge = font_size_for(GridSize { columns: 40, rows: 22 }, Viewport::new(3840.0, 2160.0));
        assert_eq!(huge, MAX_FONT_SIZE);
    }
}
