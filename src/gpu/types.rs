//! GPU buffer types for the pendulum grid step
//!
//! These types are uploaded directly to GPU buffers.
//! All use f32 for GPU compatibility and are repr(C) for predictable layout.

use bytemuck::{Pod, Zeroable};

use crate::params::SimulationParams;
use crate::state::CellState;

/// Threads per compute workgroup (must match the shader)
pub const WORKGROUP_SIZE: u32 = 256;

/// One pendulum cell in a storage buffer.
///
/// Laid out like an RGBA texel: angle1, angular velocity 1, angle2,
/// angular velocity 2.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct GpuCell {
    pub angle1: f32,
    pub angular_velocity1: f32,
    pub angle2: f32,
    pub angular_velocity2: f32,
}

impl From<&CellState> for GpuCell {
    fn from(cell: &CellState) -> Self {
        Self {
            angle1: cell.angle1 as f32,
            angular_velocity1: cell.angular_velocity1 as f32,
            angle2: cell.angle2 as f32,
            angular_velocity2: cell.angular_velocity2 as f32,
        }
    }
}

impl From<GpuCell> for CellState {
    fn from(cell: GpuCell) -> Self {
        Self {
            angle1: cell.angle1 as f64,
            angular_velocity1: cell.angular_velocity1 as f64,
            angle2: cell.angle2 as f64,
            angular_velocity2: cell.angular_velocity2 as f64,
        }
    }
}

/// Simulation parameters passed to the GPU as uniforms
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct StepUniforms {
    /// Gravitational constant
    pub g: f32,
    /// Integration time step
    pub dt: f32,
    /// Angular velocity clamp magnitude
    pub v_max: f32,
    /// Denominator floor (0 = disabled)
    pub denominator_floor: f32,
    pub l1: f32,
    pub l2: f32,
    pub m1: f32,
    pub m2: f32,
    /// Number of cells in each buffer
    pub cell_count: u32,
    /// Padding for 16-byte alignment
    pub _padding: [u32; 3],
}

impl StepUniforms {
    pub fn new(params: &SimulationParams, cell_count: u32) -> Self {
        Self {
            g: params.g as f32,
            dt: params.dt as f32,
            v_max: params.v_max as f32,
            denominator_floor: params.denominator_floor.unwrap_or(0.0) as f32,
            l1: params.l1 as f32,
            l2: params.l2 as f32,
            m1: params.m1 as f32,
            m2: params.m2 as f32,
            cell_count,
            _padding: [0; 3],
        }
    }
}
