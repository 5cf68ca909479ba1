use std::f64::consts::PI;

use approx::assert_abs_diff_eq;
use pendulum_grid::integrator::step_cell;
use pendulum_grid::state::index_of;
use pendulum_grid::{
    CellState, Execution, GridSimulator, InitialAngles, InitialCondition, SimulationParams,
    Simulator, reference_sweep,
};

fn uniform(angle1: f64, angle2: f64) -> impl Fn(usize, usize) -> InitialAngles {
    move |_, _| InitialAngles::new(angle1, angle2)
}

#[test]
fn two_by_two_reference_grid_first_step() {
    let mut sim = Simulator::new(2, SimulationParams::default(), reference_sweep(2)).unwrap();

    let before = sim.current_state().get(0, 0).copied().unwrap();
    assert_abs_diff_eq!(before.angle1, -PI);
    assert_abs_diff_eq!(before.angle2, -PI);

    sim.step();

    let cell = sim.current_state().get(0, 0).copied().unwrap();
    assert_abs_diff_eq!(cell.angle1, -PI, epsilon = 1e-6);
    assert_abs_diff_eq!(cell.angular_velocity1, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(cell.angle2, -PI, epsilon = 1e-6);
    assert_abs_diff_eq!(cell.angular_velocity2, 0.0, epsilon = 1e-6);
    assert_eq!(sim.steps_taken(), 1);
}

#[test]
fn identical_inputs_give_identical_grids() {
    let params = SimulationParams::default();
    let mut a = Simulator::new(16, params, reference_sweep(16)).unwrap();
    let mut b = Simulator::new(16, params, reference_sweep(16)).unwrap();

    a.step_n(50);
    b.step_n(50);

    for (x, y) in a.current_state().cells().iter().zip(b.current_state().cells()) {
        assert_eq!(x.angle1.to_bits(), y.angle1.to_bits());
        assert_eq!(x.angular_velocity1.to_bits(), y.angular_velocity1.to_bits());
        assert_eq!(x.angle2.to_bits(), y.angle2.to_bits());
        assert_eq!(x.angular_velocity2.to_bits(), y.angular_velocity2.to_bits());
    }
}

#[test]
fn serial_and_parallel_execution_agree_bitwise() {
    let params = SimulationParams::default();
    let mut serial = Simulator::new(24, params, reference_sweep(24)).unwrap();
    let mut parallel = Simulator::new(24, params, reference_sweep(24))
        .unwrap()
        .with_execution(Execution::Parallel);

    serial.step_n(30);
    parallel.step_n(30);

    let lhs = serial.current_state().to_vec();
    let rhs = parallel.current_state().to_vec();
    assert_eq!(lhs.len(), rhs.len());
    for (x, y) in lhs.iter().zip(&rhs) {
        assert_eq!(x.angle1.to_bits(), y.angle1.to_bits());
        assert_eq!(x.angle2.to_bits(), y.angle2.to_bits());
    }
}

#[test]
fn velocities_never_exceed_the_clamp() {
    let params = SimulationParams::new(9.81, 0.1, 2.0);
    let mut sim = Simulator::new(12, params, reference_sweep(12)).unwrap();

    for _ in 0..40 {
        sim.step();
        for cell in sim.current_state().cells() {
            assert!(cell.angular_velocity1.abs() <= params.v_max);
            assert!(cell.angular_velocity2.abs() <= params.v_max);
        }
    }
}

#[test]
fn zero_gravity_at_rest_is_a_fixed_point() {
    let params = SimulationParams::new(0.0, 0.1, 5.0);
    let init = InitialCondition::default().for_side(8);
    let mut sim = Simulator::new(8, params, &init).unwrap();
    let start = sim.current_state().to_vec();

    sim.step_n(10);

    assert_eq!(sim.current_state().cells(), start.as_slice());
}

#[test]
fn cells_evolve_independently() {
    let side = 6;
    let params = SimulationParams::default();
    let base = uniform(1.0, 0.5);
    let perturbed = |row: usize, col: usize| {
        if (row, col) == (2, 3) {
            InitialAngles::new(-2.0, 2.5)
        } else {
            base(row, col)
        }
    };

    let mut reference = Simulator::new(side, params, &base).unwrap();
    let mut changed = Simulator::new(side, params, perturbed).unwrap();
    reference.step_n(25);
    changed.step_n(25);

    let lhs = reference.current_state();
    let rhs = changed.current_state();
    for (row, col, cell) in lhs.iter() {
        let other = rhs.get(row, col).unwrap();
        if (row, col) == (2, 3) {
            assert_ne!(cell, other);
        } else {
            assert_eq!(cell, other);
        }
    }
}

#[test]
fn grid_step_matches_single_cell_step() {
    let params = SimulationParams::default();
    let mut sim = Simulator::new(4, params, reference_sweep(4)).unwrap();
    let start = sim.current_state().to_vec();

    sim.step();
    sim.step();

    for (i, cell) in start.iter().enumerate() {
        let expected = step_cell(&step_cell(cell, &params), &params);
        assert_eq!(sim.current_state().cells()[i], expected);
    }
}

#[test]
fn buffers_swap_roles_every_step() {
    let mut sim = Simulator::new(4, SimulationParams::default(), uniform(1.0, 0.5)).unwrap();
    assert_eq!(sim.current_buffer(), 0);

    let initial = sim.current_state().to_vec();
    sim.step();
    assert_eq!(sim.current_buffer(), 1);
    let after_one = sim.current_state().to_vec();
    assert_ne!(after_one, initial);

    sim.step();
    assert_eq!(sim.current_buffer(), 0);
    let after_two = sim.current_state().to_vec();
    assert_ne!(after_two, after_one);
    assert_eq!(sim.steps_taken(), 2);
}

#[test]
fn degenerate_cell_does_not_spread() {
    let side = 4;
    let params = SimulationParams::default().with_masses(0.0, 1.0);
    let init = |row: usize, col: usize| {
        if (row, col) == (1, 1) {
            InitialAngles::new(0.5, 0.5)
        } else {
            InitialAngles::new(0.5, 1.2)
        }
    };
    let mut sim = Simulator::new(side, params, init).unwrap();

    sim.step();

    let view = sim.current_state();
    assert_eq!(view.non_finite_count(), 1);
    let bad = index_of(side, 1, 1);
    for (i, cell) in view.cells().iter().enumerate() {
        assert_eq!(cell.is_finite(), i != bad, "cell {i}");
    }
}

#[test]
fn denominator_floor_keeps_degenerate_cells_finite() {
    let params = SimulationParams::default()
        .with_masses(0.0, 1.0)
        .with_denominator_floor(1e-6);
    let mut sim = Simulator::new(3, params, uniform(0.5, 0.5)).unwrap();

    sim.step_n(5);

    assert_eq!(sim.current_state().non_finite_count(), 0);
}

#[test]
fn boxed_simulator_snapshot_matches_current_state() {
    let sim = Simulator::new(5, SimulationParams::default(), reference_sweep(5)).unwrap();
    let expected: Vec<CellState> = sim.current_state().to_vec();

    let mut boxed: Box<dyn GridSimulator> = Box::new(sim);
    assert_eq!(boxed.snapshot().unwrap(), expected);

    boxed.step_n(3);
    assert_eq!(boxed.steps_taken(), 3);
    assert_eq!(boxed.snapshot().unwrap().len(), 25);
}
