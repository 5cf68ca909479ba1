//! GPU-accelerated pendulum grid
//!
//! Runs the same per-cell step as the CPU simulator as a wgpu compute
//! shader. Grid state lives in two storage buffers that trade the
//! "current" and "next" roles after every dispatch, the compute-shader
//! counterpart of ping-ponging between two render targets.
//!
//! # Example
//!
//! ```rust,ignore
//! use pendulum_grid::gpu::GpuSimulation;
//! use pendulum_grid::{SimulationParams, GridSimulator, reference_sweep};
//!
//! let mut sim = GpuSimulation::new(256, SimulationParams::default(), reference_sweep(256))?;
//! sim.step_n(100);
//! let cells = sim.snapshot()?;
//! ```
//!
//! # Precision
//!
//! The GPU works in f32 while the CPU simulator works in f64. Both follow
//! the same equations, so they agree closely for the first steps and then
//! drift apart wherever the dynamics are chaotic.

mod shaders;
mod simulation;
mod types;

pub use shaders::step_shader;
pub use simulation::GpuSimulation;
pub use types::{GpuCell, StepUniforms, WORKGROUP_SIZE};
