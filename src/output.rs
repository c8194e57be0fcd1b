//! The module responsible for recording enrichment events and writing them to
//! disk.
use anyhow::{Context, Result};
use log::error;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "centrifuge_results";

/// The output file name for enrichment events
const ENRICHMENTS_FILE_NAME: &str = "enrichments.csv";

/// One executed enrichment: the time step it happened in, the natural uranium
/// consumed and the separative work expended.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentEvent {
    /// Time step of the enrichment
    pub time: u32,
    /// Natural uranium consumed (kg)
    pub natural_u: f64,
    /// Separative work consumed (kg SWU)
    pub swu: f64,
}

/// A sink for enrichment events.
///
/// Injected into the facility at construction so the core stays testable
/// without a live recorder.
pub trait EnrichmentRecorder {
    /// Append one event to the sink.
    fn record(&mut self, event: EnrichmentEvent);
}

/// A recorder that appends events to a shared in-memory list.
///
/// Cloned handles observe the same list, so tests can keep one handle while
/// the facility owns another.
#[derive(Clone, Debug, Default)]
pub struct MemoryRecorder(Rc<RefCell<Vec<EnrichmentEvent>>>);

impl MemoryRecorder {
    /// A snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<EnrichmentEvent> {
        self.0.borrow().clone()
    }
}

impl EnrichmentRecorder for MemoryRecorder {
    fn record(&mut self, event: EnrichmentEvent) {
        self.0.borrow_mut().push(event);
    }
}

/// A recorder that streams events to a CSV file in the output directory.
pub struct CsvRecorder {
    writer: csv::Writer<File>,
}

impl CsvRecorder {
    /// Create the enrichments CSV file in `output_dir`.
    pub fn create(output_dir: &Path) -> Result<Self> {
        let file_path = output_dir.join(ENRICHMENTS_FILE_NAME);
        let writer = csv::Writer::from_path(&file_path)
            .with_context(|| format!("Could not create {}", file_path.to_string_lossy()))?;
        Ok(Self { writer })
    }
}

impl EnrichmentRecorder for CsvRecorder {
    fn record(&mut self, event: EnrichmentEvent) {
        // The recording contract is append-only and infallible for the
        // facility; I/O problems are reported, not propagated
        if let Err(err) = self
            .writer
            .serialize(&event)
            .and_then(|()| Ok(self.writer.flush()?))
        {
            error!("Failed to write enrichment event: {err}");
        }
    }
}

/// Get the default output directory for the model in the specified directory
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Canonicalise in case the user has specified "."
    let model_dir = model_dir
        .canonicalize()
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create the output directory for the model, if not already present.
pub fn create_output_directory(output_dir: &Path) -> Result<()> {
    if output_dir.is_dir() {
        // already exists
        return Ok(());
    }

    fs::create_dir_all(output_dir)?;

    Ok(())
}
