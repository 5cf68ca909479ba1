//! Initial conditions for a pendulum grid
//!
//! The reference layout sweeps both angles through a full turn: `angle1`
//! across columns and `angle2` across rows, every pendulum at rest.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

/// Starting angles for one cell; velocities always start at zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InitialAngles {
    pub angle1: f64,
    pub angle2: f64,
}

impl InitialAngles {
    pub fn new(angle1: f64, angle2: f64) -> Self {
        Self { angle1, angle2 }
    }
}

/// Configurable initial condition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitialCondition {
    /// Linear sweep of `angle1` over columns and `angle2` over rows.
    ///
    /// Column `c` gets `center1 - span/2 + (c/N)*span`. The defaults give
    /// `(c/N)*2π - π`.
    Sweep {
        #[serde(default)]
        center1: f64,
        #[serde(default)]
        center2: f64,
        #[serde(default = "full_turn")]
        span: f64,
    },
    /// Every cell starts at the same angles
    Uniform { angle1: f64, angle2: f64 },
}

fn full_turn() -> f64 {
    TAU
}

impl Default for InitialCondition {
    fn default() -> Self {
        Self::Sweep {
            center1: 0.0,
            center2: 0.0,
            span: TAU,
        }
    }
}

impl InitialCondition {
    /// Angles for `(row, col)` in a grid of side `side`
    pub fn angles(&self, side: usize, row: usize, col: usize) -> InitialAngles {
        match *self {
            Self::Sweep {
                center1,
                center2,
                span,
            } => InitialAngles {
                angle1: sweep(center1, span, col, side),
                angle2: sweep(center2, span, row, side),
            },
            Self::Uniform { angle1, angle2 } => InitialAngles { angle1, angle2 },
        }
    }

    /// Bind to a grid side, giving the `(row, col)` closure the simulator takes
    pub fn for_side(self, side: usize) -> impl Fn(usize, usize) -> InitialAngles {
        move |row, col| self.angles(side, row, col)
    }
}

fn sweep(center: f64, span: f64, index: usize, side: usize) -> f64 {
    (index as f64 / side as f64) * span + (center - span / 2.0)
}

/// The reference full-turn sweep for a grid of side `side`
pub fn reference_sweep(side: usize) -> impl Fn(usize, usize) -> InitialAngles {
    InitialCondition::default().for_side(side)
}
