//! pendulum-grid - A grid of independent double pendulums.
//!
//! Every cell of an `N × N` grid holds its own double pendulum. The whole
//! grid is advanced with a semi-implicit Euler step that reads one buffer
//! and writes another, then swaps their roles. The current state can be
//! colored by angle and written out as images or JSON.

pub mod color;
pub mod config;
pub mod driver;
pub mod error;
#[cfg(feature = "gpu")]
pub mod gpu;
pub mod initial;
pub mod integrator;
pub mod params;
pub mod simulator;
pub mod snapshot;
pub mod state;

pub use config::{Backend, SimulationConfig};
pub use driver::FrameDriver;
pub use error::{SimError, SimResult};
pub use initial::{InitialAngles, InitialCondition, reference_sweep};
pub use params::SimulationParams;
pub use simulator::{Execution, GridSimulator, Simulator};
pub use state::{CellState, GridView};
