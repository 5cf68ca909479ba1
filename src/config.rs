//! Simulation configuration files
//!
//! Configurations are read from YAML or JSON, chosen by file extension.
//! Every field has a default, so a file only needs the values it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::initial::InitialCondition;
use crate::params::SimulationParams;
use crate::simulator::{Execution, GridSimulator, Simulator, checked_cell_count};

/// Default grid side length (256 × 256 = 65,536 pendulums)
pub const DEFAULT_GRID_SIZE: usize = 256;

/// Where the step runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    /// Single-threaded CPU loop
    #[default]
    Cpu,
    /// CPU rows spread over a thread pool
    Parallel,
    /// wgpu compute shader (requires the `gpu` feature)
    Gpu,
}

impl std::str::FromStr for Backend {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "parallel" => Ok(Self::Parallel),
            "gpu" => Ok(Self::Gpu),
            other => Err(SimError::Parse(format!("unknown backend: {other}"))),
        }
    }
}

/// Everything needed to build and drive a simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Grid side length
    pub grid_size: usize,
    /// Physical and numerical constants
    pub params: SimulationParams,
    /// Starting angles
    pub initial: InitialCondition,
    /// Steps taken per driver frame
    pub steps_per_frame: u32,
    /// Compute substrate
    pub backend: Backend,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            params: SimulationParams::default(),
            initial: InitialCondition::default(),
            steps_per_frame: 1,
            backend: Backend::default(),
        }
    }
}

impl SimulationConfig {
    /// Load a configuration from a `.yaml`, `.yml` or `.json` file
    pub fn load(path: &Path) -> SimResult<Self> {
        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path)?;
        let config = format.parse(&content)?;
        tracing::debug!(path = %path.display(), ?format, "loaded configuration");
        Ok(config)
    }

    /// Write this configuration to a `.yaml`, `.yml` or `.json` file
    pub fn save(&self, path: &Path) -> SimResult<()> {
        let format = ConfigFormat::from_path(path)?;
        fs::write(path, format.render(self)?)?;
        Ok(())
    }

    /// Check grid size, parameters, and frame stepping
    pub fn validate(&self) -> SimResult<()> {
        checked_cell_count(self.grid_size)?;
        self.params.validate()?;
        if self.steps_per_frame == 0 {
            return Err(SimError::OutOfRange {
                name: "steps_per_frame",
                requirement: "at least 1",
                value: 0.0,
            });
        }
        Ok(())
    }

    /// CPU simulator for this configuration, ignoring `backend`
    pub fn build_cpu(&self, execution: Execution) -> SimResult<Simulator> {
        self.validate()?;
        let initial = self.initial.for_side(self.grid_size);
        Ok(Simulator::new(self.grid_size, self.params, initial)?.with_execution(execution))
    }

    /// Simulator for the configured backend
    pub fn build(&self) -> SimResult<Box<dyn GridSimulator>> {
        match self.backend {
            Backend::Cpu => Ok(Box::new(self.build_cpu(Execution::Serial)?)),
            Backend::Parallel => Ok(Box::new(self.build_cpu(Execution::Parallel)?)),
            Backend::Gpu => self.build_gpu(),
        }
    }

    #[cfg(feature = "gpu")]
    fn build_gpu(&self) -> SimResult<Box<dyn GridSimulator>> {
        self.validate()?;
        let initial = self.initial.for_side(self.grid_size);
        let sim = crate::gpu::GpuSimulation::new(self.grid_size, self.params, initial)?;
        Ok(Box::new(sim))
    }

    #[cfg(not(feature = "gpu"))]
    fn build_gpu(&self) -> SimResult<Box<dyn GridSimulator>> {
        Err(SimError::GpuUnavailable(
            "built without the `gpu` feature".to_string(),
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> SimResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| SimError::UnsupportedFormat(path.display().to_string()))?;
        match ext.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            _ => Err(SimError::UnsupportedFormat(ext.to_string())),
        }
    }

    fn parse(self, content: &str) -> SimResult<SimulationConfig> {
        match self {
            Self::Yaml => serde_yaml::from_str(content).map_err(|e| SimError::Parse(e.to_string())),
            Self::Json => serde_json::from_str(content).map_err(|e| SimError::Parse(e.to_string())),
        }
    }

    fn render(self, config: &SimulationConfig) -> SimResult<String> {
        match self {
            Self::Yaml => serde_yaml::to_string(config).map_err(|e| SimError::Write(e.to_string())),
            Self::Json => {
                serde_json::to_string_pretty(config).map_err(|e| SimError::Write(e.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn default_config_is_valid() {
        let config = SimulationConfig::default();
        assert_eq!(config.grid_size, 256);
        assert_eq!(config.steps_per_frame, 1);
        assert_eq!(config.backend, Backend::Cpu);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn loads_partial_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sim.yaml");
        fs::write(
            &path,
            "grid_size: 32\nparams:\n  g: 9.81\n  dt: 0.02\ninitial:\n  kind: uniform\n  angle1: 1.0\n  angle2: 0.5\nbackend: parallel\n",
        )
        .unwrap();

        let config = SimulationConfig::load(&path).unwrap();
        assert_eq!(config.grid_size, 32);
        assert_eq!(config.params.g, 9.81);
        assert_eq!(config.params.dt, 0.02);
        assert_eq!(config.params.v_max, 5.0);
        assert_eq!(
            config.initial,
            InitialCondition::Uniform {
                angle1: 1.0,
                angle2: 0.5
            }
        );
        assert_eq!(config.backend, Backend::Parallel);
        assert_eq!(config.steps_per_frame, 1);
    }

    #[test]
    fn loads_json_with_uppercase_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sim.JSON");
        fs::write(&path, r#"{"grid_size": 8, "steps_per_frame": 2}"#).unwrap();

        let config = SimulationConfig::load(&path).unwrap();
        assert_eq!(config.grid_size, 8);
        assert_eq!(config.steps_per_frame, 2);
    }

    #[test]
    fn save_then_load_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sim.yml");
        let config = SimulationConfig {
            grid_size: 64,
            steps_per_frame: 2,
            ..SimulationConfig::default()
        };

        config.save(&path).unwrap();
        assert_eq!(SimulationConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn rejects_unknown_extension() {
        let path = PathBuf::from("sim.toml");
        assert!(matches!(
            SimulationConfig::load(&path),
            Err(SimError::UnsupportedFormat(ext)) if ext == "toml"
        ));
        assert!(matches!(
            SimulationConfig::load(Path::new("noextension")),
            Err(SimError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn reports_parse_errors() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "grid_size: [not, a, number]\n").unwrap();

        assert!(matches!(
            SimulationConfig::load(&path),
            Err(SimError::Parse(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_steps_per_frame() {
        let config = SimulationConfig {
            steps_per_frame: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::OutOfRange {
                name: "steps_per_frame",
                ..
            })
        ));
    }

    #[test]
    fn validate_rejects_zero_grid() {
        let config = SimulationConfig {
            grid_size: 0,
            ..SimulationConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidGridSize(0))
        ));
    }

    #[test]
    fn builds_cpu_backends() {
        let config = SimulationConfig {
            grid_size: 4,
            backend: Backend::Parallel,
            ..SimulationConfig::default()
        };
        let mut sim = config.build().unwrap();
        sim.step();
        assert_eq!(sim.side(), 4);
        assert_eq!(sim.steps_taken(), 1);
    }

    #[cfg(not(feature = "gpu"))]
    #[test]
    fn gpu_backend_requires_feature() {
        let config = SimulationConfig {
            grid_size: 4,
            backend: Backend::Gpu,
            ..SimulationConfig::default()
        };
        assert!(matches!(config.build(), Err(SimError::GpuUnavailable(_))));
    }

    #[test]
    fn backend_parses_from_str() {
        assert_eq!("cpu".parse::<Backend>().unwrap(), Backend::Cpu);
        assert_eq!("Parallel".parse::<Backend>().unwrap(), Backend::Parallel);
        assert_eq!("GPU".parse::<Backend>().unwrap(), Backend::Gpu);
        assert!("tpu".parse::<Backend>().is_err());
    }
}
