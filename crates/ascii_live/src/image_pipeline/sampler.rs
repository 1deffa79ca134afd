use image::imageops::FilterType;

use super::{loader::FrameSource, raster::Raster, resize::GridSize};
use crate::AsciiError;

/// Downsamples source frames to the output grid.
///
/// The derived grid is kept until the source dimensions or the requested
/// width change.
#[derive(Debug, Default)]
pub struct FrameSampler {
    cached: Option<CachedGrid>,
}

#[derive(Clone, Copy, Debug)]
struct CachedGrid {
    source: (u32, u32),
    columns: u32,
    grid: GridSize,
}

impl FrameSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the cached grid so the next sample derives it again.
    pub fn reset(&mut self) {
        self.cached = None;
    }

    /// Grid most recently used for sampling.
    pub fn grid(&self) -> Option<GridSize> {
        self.cached.map(|cached| cached.grid)
    }

    /// Grid for `source` at `columns`, or [`AsciiError::SourceNotReady`] while
    /// the source has no intrinsic size.
    pub fn grid_for<F>(&mut self, source: &F, columns: u32) -> Result<GridSize, AsciiError>
    where
        F: FrameSource + ?Sized,
    {
        let dimensions = source.dimensions();
        if let Some(cached) = self.cached {
            if cached.source == dimensions && cached.columns == columns {
                return Ok(cached.grid);
            }
        }

        let (width, height) = dimensions;
        let grid = GridSize::derive(width, height, columns).ok_or(AsciiError::SourceNotReady)?;
        self.cached = Some(CachedGrid { source: dimensions, columns, grid });
        Ok(grid)
    }

    /// Scales the current source frame into a `columns`-wide raster.
    pub fn sample<F>(&mut self, source: &mut F, columns: u32) -> Result<Raster, AsciiError>
    where
        F: FrameSource + ?Sized,
    {
        let grid = self.grid_for(source, columns)?;
        if grid.columns == 0 {
            return Ok(Raster::empty());
        }

        let frame = source.current_frame()?;
        let resized = frame.resize_exact(grid.columns, grid.rows, FilterType::Triangle);
        Ok(Raster::new(resized.to_rgb8()))
    }
}
