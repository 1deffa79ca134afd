/// Output grid dimensions in glyph cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridSize {
    pub columns: u32,
    pub rows: u32,
}

impl GridSize {
    /// Derives the grid for `columns` glyphs per row, preserving the source
    /// aspect ratio.
    ///
    /// Returns `None` while the source reports a zero dimension. Rows are
    /// `floor(columns * source_height / source_width)`, never less than one.
    pub fn derive(source_width: u32, source_height: u32, columns: u32) -> Option<Self> {
        if source_width == 0 || source_height == 0 {
            return None;
        }

        let rows = u64::from(columns) * u64::from(source_height) / u64::from(source_width);
        let rows = u32::try_from(rows).unwrap_or(u32::MAX).max(1);
        Some(Self { columns, rows })
    }

    pub fn cells(&self) -> usize {
        self.columns as usize * self.rows as usize
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn widescreen_camera_at_eighty_columns() {
        assert_eq!(GridSize::derive(1280, 720, 80), Some(GridSize { columns: 80, rows: 45 }));
    }

    #[test]
    fn not_ready_source_has_no_grid() {
        assert_eq!(GridSize::derive(0, 720, 80), None);
        assert_eq!(GridSize::derive(1280, 0, 80), None);
    }

    #[test]
    fn very_wide_source_keeps_one_row() {
        assert_eq!(GridSize::derive(10_000, 10, 40), Some(GridSize { columns: 40, rows: 1 }));
    }

    proptest! {
        #[test]
        fn rows_follow_aspect_ratio(sw in 1u32..8192, sh in 1u32..8192, columns in 1u32..=200) {
            let grid = GridSize::derive(sw, sh, columns).unwrap();
            let expected = (u64::from(columns) * u64::from(sh) / u64::from(sw)).max(1);
            prop_assert_eq!(u64::from(grid.rows), expected);
            prop_assert_eq!(grid.columns, columns);
        }
    }
}
