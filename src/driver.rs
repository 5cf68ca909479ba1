//! Per-frame driver for a grid simulation
//!
//! A visual front end calls the simulation once per animation frame.
//! [`FrameDriver`] plays that role: each `tick` is one
//! frame, and a frame advances the grid by a fixed number of steps. The
//! time step is a simulation parameter and never depends on how long a
//! frame took.

use crate::simulator::GridSimulator;

/// Drives a simulator one frame at a time
pub struct FrameDriver<S: GridSimulator> {
    simulator: S,
    steps_per_frame: u32,
    frame: u64,
    paused: bool,
}

impl<S: GridSimulator> FrameDriver<S> {
    /// One step per frame
    pub fn new(simulator: S) -> Self {
        Self::with_steps_per_frame(simulator, 1)
    }

    /// `steps_per_frame` steps per frame (at least one)
    pub fn with_steps_per_frame(simulator: S, steps_per_frame: u32) -> Self {
        Self {
            simulator,
            steps_per_frame: steps_per_frame.max(1),
            frame: 0,
            paused: false,
        }
    }

    /// Advance one frame. Does nothing while paused.
    ///
    /// Returns whether the simulation advanced.
    pub fn tick(&mut self) -> bool {
        if self.paused {
            return false;
        }
        for _ in 0..self.steps_per_frame {
            self.simulator.step();
        }
        self.frame += 1;
        tracing::trace!(frame = self.frame, steps = self.simulator.steps_taken(), "frame");
        true
    }

    /// Tick `frames` times, calling `observer` after each frame with the
    /// frame number (starting at 1) and the simulator
    pub fn run<F>(&mut self, frames: u64, mut observer: F)
    where
        F: FnMut(u64, &S),
    {
        tracing::info!(
            frames,
            steps_per_frame = self.steps_per_frame,
            side = self.simulator.side(),
            "running simulation"
        );
        for _ in 0..frames {
            if self.tick() {
                observer(self.frame, &self.simulator);
            }
        }
    }

    /// Stop stepping until [`resume`](Self::resume) is called
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Frames completed so far
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn steps_per_frame(&self) -> u32 {
        self.steps_per_frame
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    /// Tear the driver down, keeping the simulator
    pub fn into_inner(self) -> S {
        self.simulator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initial::reference_sweep;
    use crate::params::SimulationParams;
    use crate::simulator::Simulator;

    fn small_sim() -> Simulator {
        Simulator::new(4, SimulationParams::default(), reference_sweep(4)).unwrap()
    }

    #[test]
    fn tick_steps_once_by_default() {
        let mut driver = FrameDriver::new(small_sim());
        assert!(driver.tick());
        assert_eq!(driver.frame(), 1);
        assert_eq!(driver.simulator().steps_taken(), 1);
    }

    #[test]
    fn multiple_steps_per_frame() {
        let mut driver = FrameDriver::with_steps_per_frame(small_sim(), 2);
        driver.tick();
        driver.tick();
        assert_eq!(driver.frame(), 2);
        assert_eq!(driver.simulator().steps_taken(), 4);
    }

    #[test]
    fn zero_steps_per_frame_is_raised_to_one() {
        let driver = FrameDriver::with_steps_per_frame(small_sim(), 0);
        assert_eq!(driver.steps_per_frame(), 1);
    }

    #[test]
    fn paused_driver_does_not_step() {
        let mut driver = FrameDriver::new(small_sim());
        driver.tick();
        let before = driver.simulator().current_state().to_vec();

        driver.pause();
        assert!(driver.is_paused());
        assert!(!driver.tick());
        assert_eq!(driver.frame(), 1);
        assert_eq!(driver.simulator().current_state().cells(), before.as_slice());

        driver.resume();
        assert!(driver.tick());
        assert_eq!(driver.simulator().steps_taken(), 2);
    }

    #[test]
    fn run_reports_each_frame() {
        let mut driver = FrameDriver::with_steps_per_frame(small_sim(), 3);
        let mut seen = Vec::new();
        driver.run(4, |frame, sim| seen.push((frame, sim.steps_taken())));
        assert_eq!(seen, vec![(1, 3), (2, 6), (3, 9), (4, 12)]);
    }

    #[test]
    fn stepping_per_frame_matches_stepping_directly() {
        let mut driver = FrameDriver::with_steps_per_frame(small_sim(), 2);
        driver.run(5, |_, _| {});

        let mut direct = small_sim();
        for _ in 0..10 {
            direct.step();
        }

        let driven = driver.into_inner();
        assert_eq!(driven.current_state().cells(), direct.current_state().cells());
    }
}
