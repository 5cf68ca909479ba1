use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pendulum_grid::snapshot::{SnapshotWriter, WriterRegistry};
use pendulum_grid::{FrameDriver, GridSimulator, GridView, SimulationConfig};

mod cli;

use cli::{Cli, Commands, RunArgs};

/// Merge the config file (if any) with command-line overrides
fn resolve_config(args: &RunArgs) -> anyhow::Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => SimulationConfig::default(),
    };
    if let Some(size) = args.size {
        config.grid_size = size;
    }
    if let Some(steps_per_frame) = args.steps_per_frame {
        config.steps_per_frame = steps_per_frame;
    }
    if let Some(backend) = args.backend {
        config.backend = backend;
    }
    config.validate()?;
    Ok(config)
}

fn write_snapshot<S: GridSimulator>(
    writer: &dyn SnapshotWriter,
    sim: &S,
    path: &Path,
) -> anyhow::Result<()> {
    let cells = sim.snapshot()?;
    writer.write(GridView::new(sim.side(), &cells), sim.steps_taken(), path)?;
    tracing::debug!(path = %path.display(), "wrote snapshot");
    Ok(())
}

fn run(args: &RunArgs) -> anyhow::Result<()> {
    let config = resolve_config(args)?;

    let registry = WriterRegistry::with_defaults();
    let writers = args
        .formats
        .iter()
        .map(|format| registry.writer_for_format(format))
        .collect::<Result<Vec<_>, _>>()?;
    let frame_writer = registry.writer_for_format("png")?;

    let simulator = config.build()?;
    let mut driver = FrameDriver::with_steps_per_frame(simulator, config.steps_per_frame);

    let mut frame_error = None;
    driver.run(args.frames, |frame, sim| {
        let Some(every) = args.every else {
            return;
        };
        if frame_error.is_some() || frame % every != 0 {
            return;
        }
        let path = args.output.join(format!("frame_{frame:06}.png"));
        if let Err(e) = write_snapshot(frame_writer, sim, &path) {
            frame_error = Some(e);
        }
    });
    if let Some(e) = frame_error {
        return Err(e);
    }

    let sim = driver.simulator();
    let cells = sim.snapshot()?;
    let view = GridView::new(sim.side(), &cells);

    let degenerate = view.non_finite_count();
    if degenerate > 0 {
        tracing::warn!(degenerate, "cells reached a non-finite state");
    }

    for writer in writers {
        let path = args.output.join(format!("final.{}", writer.extension()));
        writer.write(view, sim.steps_taken(), &path)?;
        tracing::info!(path = %path.display(), "wrote final snapshot");
    }

    println!(
        "Simulated {} frames ({} steps) of a {}x{} grid in {}",
        driver.frame(),
        sim.steps_taken(),
        config.grid_size,
        config.grid_size,
        args.output.display()
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run(args) => run(&args)?,
        Commands::Init { output } => {
            SimulationConfig::default().save(&output)?;
            println!("Wrote default configuration to {}", output.display());
        }
    }

    Ok(())
}
