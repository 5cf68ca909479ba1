//! Snapshot writers and format dispatch
//!
//! A writer turns the current grid state into a file. Writers are looked up
//! by format id through a [`WriterRegistry`].

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::color::render_image;
use crate::error::{SimError, SimResult};
use crate::state::{CellState, GridView};

/// Writes a grid state to a specific output format
pub trait SnapshotWriter {
    /// Write `view` to `output`; `steps` is the number of steps taken so far
    fn write(&self, view: GridView<'_>, steps: u64, output: &Path) -> SimResult<()>;

    /// Identifier for this output format (e.g., "png", "json")
    fn format_id(&self) -> &str;

    /// File extension for files produced by this writer
    fn extension(&self) -> &str {
        self.format_id()
    }
}

/// One pixel per cell, colored by the angle mapping
pub struct PngWriter;

impl PngWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PngWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotWriter for PngWriter {
    fn write(&self, view: GridView<'_>, _steps: u64, output: &Path) -> SimResult<()> {
        ensure_parent(output)?;
        render_image(view)
            .save(output)
            .map_err(|e| SimError::Write(e.to_string()))
    }

    fn format_id(&self) -> &str {
        "png"
    }
}

/// Serialized form of a grid state
#[derive(Debug, Serialize)]
struct StateDump<'a> {
    side: usize,
    steps: u64,
    non_finite_cells: usize,
    cells: &'a [CellState],
}

/// Full state dump as JSON. NaN and infinite values are written as `null`.
pub struct JsonWriter {
    pretty: bool,
}

impl JsonWriter {
    pub fn new() -> Self {
        Self { pretty: false }
    }

    /// Indent the output
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Render a state dump to a string
    pub fn to_json(&self, view: GridView<'_>, steps: u64) -> SimResult<String> {
        let dump = StateDump {
            side: view.side(),
            steps,
            non_finite_cells: view.non_finite_count(),
            cells: view.cells(),
        };
        let result = if self.pretty {
            serde_json::to_string_pretty(&dump)
        } else {
            serde_json::to_string(&dump)
        };
        result.map_err(|e| SimError::Write(e.to_string()))
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotWriter for JsonWriter {
    fn write(&self, view: GridView<'_>, steps: u64, output: &Path) -> SimResult<()> {
        let json = self.to_json(view, steps)?;
        ensure_parent(output)?;
        fs::write(output, json)?;
        Ok(())
    }

    fn format_id(&self) -> &str {
        "json"
    }
}

fn ensure_parent(output: &Path) -> SimResult<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Registry of available snapshot writers
pub struct WriterRegistry {
    writers: Vec<Box<dyn SnapshotWriter>>,
}

impl Default for WriterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl WriterRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            writers: Vec::new(),
        }
    }

    /// Create a registry with `PngWriter` (png) and `JsonWriter` (json)
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(PngWriter::new()));
        registry.register(Box::new(JsonWriter::new()));
        registry
    }

    /// Register a writer
    pub fn register(&mut self, writer: Box<dyn SnapshotWriter>) {
        self.writers.push(writer);
    }

    /// Find a writer by format ID (case-insensitive)
    pub fn writer_for_format(&self, format_id: &str) -> SimResult<&dyn SnapshotWriter> {
        self.writers
            .iter()
            .find(|w| w.format_id().eq_ignore_ascii_case(format_id))
            .map(|w| w.as_ref())
            .ok_or_else(|| SimError::UnsupportedFormat(format_id.to_string()))
    }

    /// Format IDs of all registered writers
    pub fn formats(&self) -> Vec<&str> {
        self.writers.iter().map(|w| w.format_id()).collect()
    }
}
