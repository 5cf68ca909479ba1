//! Per-cell pendulum state and read-only grid views

use serde::{Deserialize, Serialize};

/// State of one double pendulum.
///
/// Angles are in radians and are never wrapped, so they accumulate as a
/// pendulum spins over the top.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CellState {
    /// Angle of the first arm
    pub angle1: f64,
    /// Angular velocity of the first arm
    pub angular_velocity1: f64,
    /// Angle of the second arm
    pub angle2: f64,
    /// Angular velocity of the second arm
    pub angular_velocity2: f64,
}

impl CellState {
    /// A pendulum at rest at the given angles
    pub fn at_rest(angle1: f64, angle2: f64) -> Self {
        Self {
            angle1,
            angular_velocity1: 0.0,
            angle2,
            angular_velocity2: 0.0,
        }
    }

    /// True when all four fields are finite
    pub fn is_finite(&self) -> bool {
        self.angle1.is_finite()
            && self.angular_velocity1.is_finite()
            && self.angle2.is_finite()
            && self.angular_velocity2.is_finite()
    }
}

/// Row-major linear index of `(row, col)` in a grid of side `side`
pub fn index_of(side: usize, row: usize, col: usize) -> usize {
    row * side + col
}

/// `(row, col)` of a row-major linear index in a grid of side `side`
pub fn coords_of(side: usize, index: usize) -> (usize, usize) {
    (index / side, index % side)
}

/// Borrowed, read-only view of an `N × N` grid of cells.
///
/// Views borrow the buffer they read, so one obtained from a simulator
/// cannot outlive the next `step()`.
#[derive(Debug, Clone, Copy)]
pub struct GridView<'a> {
    side: usize,
    cells: &'a [CellState],
}

impl<'a> GridView<'a> {
    /// Wrap a row-major slice of `side * side` cells
    pub fn new(side: usize, cells: &'a [CellState]) -> Self {
        assert_eq!(
            cells.len(),
            side * side,
            "grid view of side {side} needs {} cells",
            side * side
        );
        Self { side, cells }
    }

    /// Grid side length
    pub fn side(&self) -> usize {
        self.side
    }

    /// Number of cells (`side * side`)
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cell at `(row, col)`, or `None` when out of bounds
    pub fn get(&self, row: usize, col: usize) -> Option<&'a CellState> {
        if row < self.side && col < self.side {
            self.cells.get(index_of(self.side, row, col))
        } else {
            None
        }
    }

    /// All cells in row-major order
    pub fn cells(&self) -> &'a [CellState] {
        self.cells
    }

    /// One row of cells
    pub fn row(&self, row: usize) -> &'a [CellState] {
        let start = index_of(self.side, row, 0);
        &self.cells[start..start + self.side]
    }

    /// Iterate over `(row, col, cell)`
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &'a CellState)> + 'a {
        let side = self.side;
        self.cells.iter().enumerate().map(move |(i, cell)| {
            let (row, col) = coords_of(side, i);
            (row, col, cell)
        })
    }

    /// Number of cells holding a NaN or infinite field
    pub fn non_finite_count(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_finite()).count()
    }

    /// Largest angular velocity magnitude in the grid (NaN cells ignored)
    pub fn max_speed(&self) -> f64 {
        self.cells
            .iter()
            .flat_map(|c| [c.angular_velocity1.abs(), c.angular_velocity2.abs()])
            .filter(|v| !v.is_nan())
            .fold(0.0, f64::max)
    }

    /// Copy the cells out of the borrowed buffer
    pub fn to_vec(&self) -> Vec<CellState> {
        self.cells.to_vec()
    }
}
