use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use pendulum_grid::Backend;

/// Simulate a grid of double pendulums and write what it looks like.
#[derive(Parser, Debug)]
#[command(name = "pendulum-grid")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a simulation and write snapshots
    Run(RunArgs),
    /// Write the default configuration to a file
    Init {
        /// Output file (.yaml, .yml or .json)
        #[arg(short, long, default_value = "pendulum-grid.yaml")]
        output: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Configuration file (.yaml, .yml or .json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Grid side length (overrides the config file)
    #[arg(short, long)]
    pub size: Option<usize>,

    /// Number of frames to run
    #[arg(short, long, default_value_t = 100)]
    pub frames: u64,

    /// Steps per frame (overrides the config file)
    #[arg(long)]
    pub steps_per_frame: Option<u32>,

    /// Compute backend: cpu, parallel or gpu (overrides the config file)
    #[arg(short, long)]
    pub backend: Option<Backend>,

    /// Directory to write snapshots into
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Also write a PNG every N frames
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub every: Option<u64>,

    /// Final snapshot formats
    #[arg(long = "format", default_values_t = [String::from("png"), String::from("json")])]
    pub formats: Vec<String>,
}
