//! Double pendulum equations of motion and the per-cell step
//!
//! Accelerations follow the classical point-mass double pendulum. Integration
//! is semi-implicit Euler: the clamped new velocity moves the angle.

use crate::params::SimulationParams;
use crate::state::CellState;

/// Angular accelerations of both arms for one cell.
///
/// The denominators vanish only for degenerate mass choices (e.g. `m1 = 0`
/// with aligned arms). Without a configured floor the result is then
/// infinite or NaN and is returned as-is.
pub fn accelerations(state: &CellState, params: &SimulationParams) -> (f64, f64) {
    let SimulationParams {
        g, l1, l2, m1, m2, ..
    } = *params;
    let CellState {
        angle1: a1,
        angular_velocity1: v1,
        angle2: a2,
        angular_velocity2: v2,
    } = *state;

    let delta = a1 - a2;
    let sin_delta = delta.sin();
    let cos_delta = delta.cos();

    let mass_term = 2.0 * m1 + m2 - m2 * (2.0 * delta).cos();
    let den1 = floor_denominator(l1 * mass_term, params.denominator_floor);
    let den2 = floor_denominator(l2 * mass_term, params.denominator_floor);

    let num1 = -g * (2.0 * m1 + m2) * a1.sin()
        - m2 * g * (a1 - 2.0 * a2).sin()
        - 2.0 * sin_delta * m2 * (v2 * v2 * l2 + v1 * v1 * l1 * cos_delta);
    let num2 = 2.0
        * sin_delta
        * (v1 * v1 * l1 * (m1 + m2) + g * (m1 + m2) * a1.cos() + v2 * v2 * l2 * m2 * cos_delta);

    (num1 / den1, num2 / den2)
}

fn floor_denominator(den: f64, floor: Option<f64>) -> f64 {
    match floor {
        Some(floor) if den.abs() < floor => {
            if den < 0.0 {
                -floor
            } else {
                floor
            }
        }
        _ => den,
    }
}

/// Advance one cell by `params.dt`.
///
/// Velocities are clamped to `[-v_max, v_max]` before they update the
/// angles. A NaN velocity stays NaN.
pub fn step_cell(state: &CellState, params: &SimulationParams) -> CellState {
    let (accel1, accel2) = accelerations(state, params);
    let dt = params.dt;

    let v1 = clamp_velocity(state.angular_velocity1 + accel1 * dt, params.v_max);
    let v2 = clamp_velocity(state.angular_velocity2 + accel2 * dt, params.v_max);

    CellState {
        angle1: state.angle1 + v1 * dt,
        angular_velocity1: v1,
        angle2: state.angle2 + v2 * dt,
        angular_velocity2: v2,
    }
}

fn clamp_velocity(v: f64, v_max: f64) -> f64 {
    v.clamp(-v_max, v_max)
}

/// Step every cell of `src` into the same position of `dst`
pub fn step_slice(src: &[CellState], dst: &mut [CellState], params: &SimulationParams) {
    debug_assert_eq!(src.len(), dst.len());
    for (out, cell) in dst.iter_mut().zip(src) {
        *out = step_cell(cell, params);
    }
}
