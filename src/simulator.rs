//! Double-buffered CPU simulation of a pendulum grid
//!
//! Two buffers of `N × N` cells are allocated up front. Each step reads
//! only the current buffer and writes only the other one, then flips the
//! index that says which is current. Nothing is updated in place, so the
//! order in which cells (or rows) are processed cannot change the result.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::initial::InitialAngles;
use crate::integrator::step_slice;
use crate::params::SimulationParams;
use crate::state::{CellState, GridView};

/// How the per-cell pass of a CPU step is executed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Execution {
    /// One thread, cells in row-major order
    #[default]
    Serial,
    /// Rows distributed over the rayon thread pool
    Parallel,
}

/// Common surface of every grid backend.
///
/// `snapshot` copies the current buffer out, which also works for backends
/// whose state does not live in host memory (and can therefore fail).
pub trait GridSimulator {
    /// Grid side length
    fn side(&self) -> usize;

    /// Advance every cell by one `dt` and make the result current
    fn step(&mut self);

    /// Number of completed steps since construction
    fn steps_taken(&self) -> u64;

    /// Copy of the current state in row-major order
    fn snapshot(&self) -> SimResult<Vec<CellState>>;

    /// Advance by `n` steps
    fn step_n(&mut self, n: usize) {
        for _ in 0..n {
            self.step();
        }
    }
}

impl<S: GridSimulator + ?Sized> GridSimulator for Box<S> {
    fn side(&self) -> usize {
        (**self).side()
    }

    fn step(&mut self) {
        (**self).step()
    }

    fn steps_taken(&self) -> u64 {
        (**self).steps_taken()
    }

    fn snapshot(&self) -> SimResult<Vec<CellState>> {
        (**self).snapshot()
    }
}

/// Grid of independent double pendulums stepped on the CPU
#[derive(Debug, Clone)]
pub struct Simulator {
    side: usize,
    params: SimulationParams,
    execution: Execution,
    buffers: [Vec<CellState>; 2],
    /// Index of the buffer holding the latest state
    current: usize,
    steps: u64,
}

impl Simulator {
    /// Create a simulator of `side × side` cells.
    ///
    /// `initial` is called once per cell with `(row, col)`; every pendulum
    /// starts at rest at the returned angles.
    pub fn new<F>(side: usize, params: SimulationParams, initial: F) -> SimResult<Self>
    where
        F: Fn(usize, usize) -> InitialAngles,
    {
        let cell_count = checked_cell_count(side)?;
        params.validate()?;

        let mut front = Vec::with_capacity(cell_count);
        for row in 0..side {
            for col in 0..side {
                let angles = initial(row, col);
                front.push(CellState::at_rest(angles.angle1, angles.angle2));
            }
        }
        let back = vec![CellState::default(); cell_count];

        tracing::debug!(side, cell_count, "allocated pendulum grid buffers");

        Ok(Self {
            side,
            params,
            execution: Execution::default(),
            buffers: [front, back],
            current: 0,
            steps: 0,
        })
    }

    /// Choose how the per-cell pass runs
    pub fn with_execution(mut self, execution: Execution) -> Self {
        self.execution = execution;
        self
    }

    /// Advance the whole grid by one `dt`
    pub fn step(&mut self) {
        let side = self.side;
        let params = self.params;
        let execution = self.execution;
        let (src, dst) = self.split_buffers();

        match execution {
            Execution::Serial => step_slice(src, dst, &params),
            Execution::Parallel => {
                dst.par_chunks_mut(side)
                    .zip(src.par_chunks(side))
                    .for_each(|(dst_row, src_row)| step_slice(src_row, dst_row, &params));
            }
        }

        self.current ^= 1;
        self.steps += 1;
    }

    /// Read-only view of the latest state
    pub fn current_state(&self) -> GridView<'_> {
        GridView::new(self.side, &self.buffers[self.current])
    }

    /// Grid side length
    pub fn side(&self) -> usize {
        self.side
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn execution(&self) -> Execution {
        self.execution
    }

    /// Number of completed steps
    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    /// Index (0 or 1) of the buffer currently marked current
    pub fn current_buffer(&self) -> usize {
        self.current
    }

    /// Current buffer as source, the other as destination
    fn split_buffers(&mut self) -> (&[CellState], &mut [CellState]) {
        let [a, b] = &mut self.buffers;
        if self.current == 0 {
            (a.as_slice(), b.as_mut_slice())
        } else {
            (b.as_slice(), a.as_mut_slice())
        }
    }
}

impl GridSimulator for Simulator {
    fn side(&self) -> usize {
        self.side
    }

    fn step(&mut self) {
        Simulator::step(self)
    }

    fn steps_taken(&self) -> u64 {
        self.steps
    }

    fn snapshot(&self) -> SimResult<Vec<CellState>> {
        Ok(self.current_state().to_vec())
    }
}

/// `side * side`, rejecting zero and overflow
pub(crate) fn checked_cell_count(side: usize) -> SimResult<usize> {
    if side == 0 {
        return Err(SimError::InvalidGridSize(side));
    }
    side.checked_mul(side).ok_or(SimError::GridTooLarge(side))
}
