//! Occupancy tracking for one layout session.

use fixedbitset::FixedBitSet;

use crate::error::{EnumLayoutError, Result};
use crate::spec::{SpecMergeRect, SpecSheetGeometry};

/// Row-major `height x width` occupancy bitmap.
///
/// Cells only ever go from free to occupied.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    n_width: usize,
    n_height: usize,
    bits: FixedBitSet,
}

impl OccupancyGrid {
    /// Allocate an all-free grid.
    pub fn new(geometry: SpecSheetGeometry) -> Self {
        Self {
            n_width: geometry.width,
            n_height: geometry.height,
            bits: FixedBitSet::with_capacity(geometry.width * geometry.height),
        }
    }

    /// Grid dimensions.
    pub fn geometry(&self) -> SpecSheetGeometry {
        SpecSheetGeometry {
            width: self.n_width,
            height: self.n_height,
        }
    }

    /// Whether `(row, col)` is taken. Out-of-range cells report occupied.
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        if row >= self.n_height || col >= self.n_width {
            return true;
        }
        self.bits.contains(row * self.n_width + col)
    }

    /// First free cell at or after `(row, col)` in row-major order.
    ///
    /// A column past the right edge continues on the next row. Returns
    /// [`EnumLayoutError::LayoutOverflow`] when the scan runs off the grid.
    pub fn find_free(&self, row: usize, col: usize) -> Result<(usize, usize)> {
        let (n_row_start, n_col_start) = if col >= self.n_width {
            (row + 1, 0)
        } else {
            (row, col)
        };
        let n_idx_start = n_row_start
            .saturating_mul(self.n_width)
            .saturating_add(n_col_start);
        let n_len = self.n_width * self.n_height;
        if let Some(n_idx) = (n_idx_start..n_len).find(|idx| !self.bits.contains(*idx)) {
            return Ok((n_idx / self.n_width, n_idx % self.n_width));
        }
        Err(EnumLayoutError::LayoutOverflow {
            row,
            col,
            width: self.n_width,
            height: self.n_height,
        })
    }

    /// Mark every cell of `rect` occupied.
    ///
    /// Fails without marking anything if `rect` leaves the grid or touches an
    /// occupied cell.
    pub fn occupy(&mut self, rect: &SpecMergeRect) -> Result<()> {
        if rect.row_last >= self.n_height || rect.col_last >= self.n_width {
            return Err(EnumLayoutError::LayoutOverflow {
                row: rect.row_last,
                col: rect.col_last,
                width: self.n_width,
                height: self.n_height,
            });
        }
        if let Some((row, col)) = rect
            .cells()
            .find(|(row, col)| self.is_occupied(*row, *col))
        {
            return Err(EnumLayoutError::MergeConflict { row, col });
        }
        for (row, col) in rect.cells() {
            self.bits.insert(row * self.n_width + col);
        }
        Ok(())
    }

    /// Number of occupied cells.
    pub fn count_occupied(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Render the grid as rows of `■` (occupied) and `□` (free).
    pub fn render(&self) -> String {
        let mut c_out = String::new();
        for row in 0..self.n_height {
            c_out.push_str(" |");
            for col in 0..self.n_width {
                c_out.push(' ');
                let c_cell = if self.is_occupied(row, col) {
                    '■'
                } else {
                    '□'
                };
                c_out.push(c_cell);
            }
            c_out.push('\n');
        }
        c_out
    }
}
