//! Block-mean pooling of the occupancy grid into kernels.
//!
//! ```text
//! cols          = ceil(sqrt(granularity))
//! kernel_width  = ceil(W / cols)
//! rows          = granularity / cols        (real valued)
//! kernel_height = ceil(H / rows)
//! ```

use rayon::prelude::*;

use crate::simulation::config::Granularity;
use crate::simulation::error::GridError;

/// Binary occupancy of the visible sub-window; `true` marks an obstacle pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OccupancyGrid {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// All-free grid.
    ///
    /// # Errors
    ///
    /// `Empty` if either dimension is zero.
    pub fn new(width: usize, height: usize) -> Result<Self, GridError> {
        if width == 0 || height == 0 {
            return Err(GridError::Empty);
        }
        Ok(Self {
            width,
            height,
            cells: vec![false; width * height],
        })
    }

    /// Builds a grid from rows of 0/1 values.
    ///
    /// # Errors
    ///
    /// `Empty`, `Ragged` or `InvalidCell` for malformed input.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self, GridError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut grid = Self::new(width, height)?;
        for (r, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(GridError::Ragged {
                    row: r,
                    expected: width,
                    found: row.len(),
                });
            }
            for (c, &value) in row.iter().enumerate() {
                match value {
                    0 => {}
                    1 => grid.cells[r * width + c] = true,
                    _ => return Err(GridError::InvalidCell { row: r, col: c, value }),
                }
            }
        }
        Ok(grid)
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Whether the pixel at (`row`, `col`) is occupied. Out of range reads as free.
    #[must_use]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.cells[row * self.width + col]
    }

    /// Marks the pixel at (`row`, `col`). Out of range writes are ignored.
    pub fn set(&mut self, row: usize, col: usize, occupied: bool) {
        if row < self.height && col < self.width {
            self.cells[row * self.width + col] = occupied;
        }
    }

    /// Marks every pixel of the clipped rectangle as occupied.
    pub fn fill_rect(&mut self, row: usize, col: usize, height: usize, width: usize) {
        for r in row..(row + height).min(self.height) {
            for c in col..(col + width).min(self.width) {
                self.cells[r * self.width + c] = true;
            }
        }
    }

    /// Iterator over `(row, col)` of every free pixel, row-major.
    pub fn free_pixels(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, &occupied)| !occupied)
            .map(move |(i, _)| (i / self.width, i % self.width))
    }

    /// Number of occupied pixels.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }
}

/// Coordinates of one kernel in the pooled grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KernelCell {
    pub row: usize,
    pub col: usize,
}

impl KernelCell {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Pooled grid of mean kernel activations in [0, 1].
#[derive(Clone, Debug, PartialEq)]
pub struct KernelGrid {
    activations: Vec<f64>,
    rows: usize,
    cols: usize,
    /// Kernel width in pixels.
    pub kernel_width: usize,
    /// Kernel height in pixels.
    pub kernel_height: usize,
    /// `granularity / cols`; the number of decision rows, not necessarily integral.
    pub decision_rows: f64,
}

impl KernelGrid {
    /// Materialized number of kernel rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Materialized number of kernel columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn activation(&self, cell: KernelCell) -> f64 {
        self.activations[cell.row * self.cols + cell.col]
    }

    /// Iterator over every cell with its activation, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (KernelCell, f64)> + '_ {
        self.activations
            .iter()
            .enumerate()
            .map(|(i, &a)| (KernelCell::new(i / self.cols, i % self.cols), a))
    }

    /// Pixel centre of `cell` relative to the observation origin, as `(x, y)`.
    #[must_use]
    pub fn pixel_center(&self, cell: KernelCell) -> (f64, f64) {
        let kw = self.kernel_width as f64;
        let kh = self.kernel_height as f64;
        (
            cell.col as f64 * kw + kw / 2.0,
            cell.row as f64 * kh + kh / 2.0,
        )
    }
}

/// Pools `grid` into roughly `granularity` kernels by block averaging.
///
/// Edge tiles that are cut short by the grid boundary average over the pixels
/// they actually cover.
#[must_use]
pub fn convolve(grid: &OccupancyGrid, granularity: Granularity) -> KernelGrid {
    let count = f64::from(granularity.count());
    let stride_cols = count.sqrt().ceil();
    let kernel_width = (grid.width() as f64 / stride_cols).ceil() as usize;
    let decision_rows = count / stride_cols;
    let kernel_height = (grid.height() as f64 / decision_rows).ceil() as usize;

    let rows = grid.height().div_ceil(kernel_height);
    let cols = grid.width().div_ceil(kernel_width);

    let activations: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map_iter(|kr| {
            let top = kr * kernel_height;
            let bottom = (top + kernel_height).min(grid.height());
            (0..cols).map(move |kc| {
                let left = kc * kernel_width;
                let right = (left + kernel_width).min(grid.width());
                let occupied = (top..bottom)
                    .flat_map(|r| (left..right).map(move |c| (r, c)))
                    .filter(|&(r, c)| grid.is_occupied(r, c))
                    .count();
                occupied as f64 / ((bottom - top) * (right - left)) as f64
            })
        })
        .collect();

    KernelGrid {
        activations,
        rows,
        cols,
        kernel_width,
        kernel_height,
        decision_rows,
    }
}
