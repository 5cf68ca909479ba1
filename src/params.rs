//! Simulation parameters shared by every cell of the grid

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Default gravitational constant
pub const DEFAULT_G: f64 = 1.0;

/// Default integration time step
pub const DEFAULT_DT: f64 = 0.1;

/// Default angular velocity clamp magnitude
pub const DEFAULT_V_MAX: f64 = 5.0;

/// Default arm length (both arms)
pub const DEFAULT_LENGTH: f64 = 1.0;

/// Default bob mass (both bobs)
pub const DEFAULT_MASS: f64 = 1.0;

/// Process-wide constants of a simulation, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Gravitational constant
    pub g: f64,
    /// Integration time step
    pub dt: f64,
    /// Angular velocity clamp magnitude
    pub v_max: f64,
    /// Length of the first arm
    pub l1: f64,
    /// Length of the second arm
    pub l2: f64,
    /// Mass of the first bob
    pub m1: f64,
    /// Mass of the second bob
    pub m2: f64,
    /// Minimum magnitude for the acceleration denominators.
    ///
    /// `None` lets a vanishing denominator produce infinities or NaN, which
    /// then propagate through that cell. Setting a floor keeps every cell
    /// finite at the cost of changing the dynamics near the singularity.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denominator_floor: Option<f64>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            g: DEFAULT_G,
            dt: DEFAULT_DT,
            v_max: DEFAULT_V_MAX,
            l1: DEFAULT_LENGTH,
            l2: DEFAULT_LENGTH,
            m1: DEFAULT_MASS,
            m2: DEFAULT_MASS,
            denominator_floor: None,
        }
    }
}

impl SimulationParams {
    /// Create parameters with the given gravity, time step and clamp,
    /// keeping unit arm lengths and masses
    pub fn new(g: f64, dt: f64, v_max: f64) -> Self {
        Self {
            g,
            dt,
            v_max,
            ..Self::default()
        }
    }

    /// Set both arm lengths
    pub fn with_lengths(mut self, l1: f64, l2: f64) -> Self {
        self.l1 = l1;
        self.l2 = l2;
        self
    }

    /// Set both bob masses
    pub fn with_masses(mut self, m1: f64, m2: f64) -> Self {
        self.m1 = m1;
        self.m2 = m2;
        self
    }

    /// Floor the acceleration denominators at `floor`
    pub fn with_denominator_floor(mut self, floor: f64) -> Self {
        self.denominator_floor = Some(floor);
        self
    }

    /// Check every field, reporting the first offending one.
    ///
    /// `g = 0` is accepted (a gravity-free grid is a valid, if static,
    /// simulation); negative gravity is not.
    pub fn validate(&self) -> SimResult<()> {
        let fields = [
            ("g", self.g),
            ("dt", self.dt),
            ("v_max", self.v_max),
            ("l1", self.l1),
            ("l2", self.l2),
            ("m1", self.m1),
            ("m2", self.m2),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(SimError::NonFinite { name, value });
            }
        }

        require(self.g >= 0.0, "g", "non-negative", self.g)?;
        require(self.dt > 0.0, "dt", "greater than zero", self.dt)?;
        require(self.v_max >= 0.0, "v_max", "non-negative", self.v_max)?;
        require(self.l1 > 0.0, "l1", "greater than zero", self.l1)?;
        require(self.l2 > 0.0, "l2", "greater than zero", self.l2)?;
        require(self.m1 >= 0.0, "m1", "non-negative", self.m1)?;
        require(self.m2 >= 0.0, "m2", "non-negative", self.m2)?;

        if let Some(floor) = self.denominator_floor {
            if !floor.is_finite() {
                return Err(SimError::NonFinite {
                    name: "denominator_floor",
                    value: floor,
                });
            }
            require(floor > 0.0, "denominator_floor", "greater than zero", floor)?;
        }

        Ok(())
    }
}

fn require(ok: bool, name: &'static str, requirement: &'static str, value: f64) -> SimResult<()> {
    if ok {
        Ok(())
    } else {
        Err(SimError::OutOfRange {
            name,
            requirement,
            value,
        })
    }
}
