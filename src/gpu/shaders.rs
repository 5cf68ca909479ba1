//! WGSL compute shader for the pendulum grid step
//!
//! One invocation per cell. The shader reads the `src` buffer and writes the
//! `dst` buffer; the host swaps which physical buffer is bound to each role
//! after every dispatch.

/// Common type definitions and bindings
pub const TYPES: &str = r#"
struct Cell {
    angle1: f32,
    angular_velocity1: f32,
    angle2: f32,
    angular_velocity2: f32,
}

struct Uniforms {
    g: f32,
    dt: f32,
    v_max: f32,
    denominator_floor: f32,
    l1: f32,
    l2: f32,
    m1: f32,
    m2: f32,
    cell_count: u32,
    _padding0: u32,
    _padding1: u32,
    _padding2: u32,
}

@group(0) @binding(0) var<storage, read> src: array<Cell>;
@group(0) @binding(1) var<storage, read_write> dst: array<Cell>;
@group(0) @binding(2) var<uniform> uniforms: Uniforms;
"#;

/// Semi-implicit Euler step of the double pendulum equations
pub const STEP: &str = r#"
fn floor_denominator(den: f32) -> f32 {
    let min_den = uniforms.denominator_floor;
    if (min_den > 0.0 && abs(den) < min_den) {
        return select(min_den, -min_den, den < 0.0);
    }
    return den;
}

@compute @workgroup_size(256)
fn step_cells(@builtin(global_invocation_id) global_id: vec3<u32>) {
    let idx = global_id.x;
    if (idx >= uniforms.cell_count) {
        return;
    }

    let cell = src[idx];
    let a1 = cell.angle1;
    let v1 = cell.angular_velocity1;
    let a2 = cell.angle2;
    let v2 = cell.angular_velocity2;

    let g = uniforms.g;
    let m1 = uniforms.m1;
    let m2 = uniforms.m2;
    let l1 = uniforms.l1;
    let l2 = uniforms.l2;

    let delta = a1 - a2;
    let sin_delta = sin(delta);
    let cos_delta = cos(delta);

    let mass_term = 2.0 * m1 + m2 - m2 * cos(2.0 * delta);
    let den1 = floor_denominator(l1 * mass_term);
    let den2 = floor_denominator(l2 * mass_term);

    let num1 = -g * (2.0 * m1 + m2) * sin(a1)
        - m2 * g * sin(a1 - 2.0 * a2)
        - 2.0 * sin_delta * m2 * (v2 * v2 * l2 + v1 * v1 * l1 * cos_delta);
    let num2 = 2.0 * sin_delta
        * (v1 * v1 * l1 * (m1 + m2) + g * (m1 + m2) * cos(a1) + v2 * v2 * l2 * m2 * cos_delta);

    let accel1 = num1 / den1;
    let accel2 = num2 / den2;

    let new_v1 = clamp(v1 + accel1 * uniforms.dt, -uniforms.v_max, uniforms.v_max);
    let new_v2 = clamp(v2 + accel2 * uniforms.dt, -uniforms.v_max, uniforms.v_max);

    var next: Cell;
    next.angle1 = a1 + new_v1 * uniforms.dt;
    next.angular_velocity1 = new_v1;
    next.angle2 = a2 + new_v2 * uniforms.dt;
    next.angular_velocity2 = new_v2;

    dst[idx] = next;
}
"#;

/// Full shader source for the step pipeline
pub fn step_shader() -> String {
    format!("{}\n{}", TYPES, STEP)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_declares_ping_pong_bindings() {
        let source = step_shader();
        assert!(source.contains("var<storage, read> src"));
        assert!(source.contains("var<storage, read_write> dst"));
        assert!(source.contains("fn step_cells("));
    }

    #[test]
    fn workgroup_size_matches_host() {
        let expected = format!("@workgroup_size({})", super::super::types::WORKGROUP_SIZE);
        assert!(STEP.contains(&expected));
    }
}
