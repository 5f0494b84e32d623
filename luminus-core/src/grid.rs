//! Logical grid coordinates and the serpentine strip mapping.
//!
//! The matrix is a single WS2812 strip folded into rows. Even rows run
//! left-to-right and odd rows run right-to-left, so the same logical column
//! lands on a different strip offset depending on the row parity.

use core::fmt;

/// Number of columns on the matrix.
pub const GRID_WIDTH: usize = 5;

/// Number of rows on the matrix.
pub const GRID_HEIGHT: usize = 5;

/// Total number of pixels on the strip.
pub const LED_COUNT: usize = GRID_WIDTH * GRID_HEIGHT;

/// Offset of a pixel along the physical strip.
pub type LinearIndex = usize;

/// Logical matrix position, column `x` and row `y`.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

impl Cell {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Centre of the grid, where the cursor starts.
    pub const fn center() -> Self {
        Self::new(GRID_WIDTH / 2, GRID_HEIGHT / 2)
    }

    /// Returns `true` when the cell lies on the matrix.
    pub const fn is_on_grid(self) -> bool {
        self.x < GRID_WIDTH && self.y < GRID_HEIGHT
    }

    /// Strip offset of this cell.
    pub fn to_linear(self) -> Result<LinearIndex, GridError> {
        to_linear(self.x, self.y)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Mapping failures. Both indicate a caller bug rather than bad player input.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum GridError {
    /// Coordinates outside `[0, GRID_WIDTH) x [0, GRID_HEIGHT)`.
    OutOfRange { x: usize, y: usize },
    /// Strip offset outside `[0, LED_COUNT)`.
    IndexOutOfRange(LinearIndex),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::OutOfRange { x, y } => write!(f, "cell ({x},{y}) is off the grid"),
            GridError::IndexOutOfRange(index) => {
                write!(f, "strip index {index} exceeds {LED_COUNT} pixels")
            }
        }
    }
}

impl core::error::Error for GridError {}

/// Converts a logical cell into its offset on the serpentine strip.
pub fn to_linear(x: usize, y: usize) -> Result<LinearIndex, GridError> {
    if x >= GRID_WIDTH || y >= GRID_HEIGHT {
        return Err(GridError::OutOfRange { x, y });
    }

    let row_start = y * GRID_WIDTH;
    if y % 2 == 0 {
        Ok(row_start + x)
    } else {
        Ok(row_start + (GRID_WIDTH - 1 - x))
    }
}

/// Inverse of [`to_linear`].
pub fn from_linear(index: LinearIndex) -> Result<Cell, GridError> {
    if index >= LED_COUNT {
        return Err(GridError::IndexOutOfRange(index));
    }

    let y = index / GRID_WIDTH;
    let offset = index % GRID_WIDTH;
    let x = if y % 2 == 0 {
        offset
    } else {
        GRID_WIDTH - 1 - offset
    };
    Ok(Cell::new(x, y))
}
