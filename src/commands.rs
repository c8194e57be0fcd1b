//! The commands that can be executed by the program.
use crate::model::Model;
use crate::output::{create_output_directory, get_output_dir, CsvRecorder};
use crate::simulation;
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

/// Handle the `run` command: load the model, set up output and logging, and
/// run the simulation.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
/// * `output_dir` - Folder to write output to (default location if `None`)
pub fn handle_run_command(model_dir: &Path, output_dir: Option<&Path>) -> Result<()> {
    let model = Model::from_path(model_dir)
        .with_context(|| format!("Could not load model from {}", model_dir.to_string_lossy()))?;

    let output_dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => get_output_dir(model_dir)?,
    };
    create_output_directory(&output_dir).context("Failed to create output directory.")?;

    crate::log::init().context("Failed to initialise logging.")?;
    info!("Output folder: {}", output_dir.to_string_lossy());

    let recorder = CsvRecorder::create(&output_dir)?;
    simulation::run(&model, Box::new(recorder))?;
    info!("Simulation complete");

    Ok(())
}
