//! Code for loading simulation models.
use crate::facility::FacilityParams;
use crate::id::{CommodityID, RecipeID};
use crate::input::read_toml;
use crate::material::{Composition, Nuclide};
use anyhow::{ensure, Context, Result};
use indexmap::IndexMap;
use itertools::Itertools;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// The file name of the model definition
const MODEL_FILE_NAME: &str = "model.toml";

/// One consumer demand entry, replayed every time step by the driver.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DemandEntry {
    /// Commodity being demanded (the facility's product or tails commodity)
    pub commodity: CommodityID,
    /// Recipe for the demanded composition
    pub recipe: RecipeID,
    /// Quantity demanded per time step (kg)
    pub quantity: f64,
}

/// Model definition
pub struct Model {
    /// Number of time steps to simulate
    pub steps: u32,
    /// The enrichment facility's configuration
    pub facility: FacilityParams,
    /// Named isotopic compositions, keyed by recipe ID
    pub recipes: IndexMap<RecipeID, Composition>,
    /// Per-step consumer demand
    pub demand: Vec<DemandEntry>,
}

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize)]
struct ModelFile {
    simulation: SimulationSection,
    facility: FacilityParams,
    recipes: HashMap<String, HashMap<String, f64>>,
    #[serde(default)]
    demand: Vec<DemandEntry>,
}

/// Represents the "simulation" section of the model file.
#[derive(Debug, Deserialize)]
struct SimulationSection {
    steps: u32,
}

/// Parse the recipe table into compositions, sorted by recipe ID.
fn read_recipes(raw: HashMap<String, HashMap<String, f64>>) -> Result<IndexMap<RecipeID, Composition>> {
    raw.into_iter()
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
        .map(|(id, fractions)| {
            let fractions = fractions
                .into_iter()
                .map(|(name, frac)| Ok((Nuclide::from_name(&name)?, frac)))
                .collect::<Result<Vec<_>>>()?;
            let composition =
                Composition::new(fractions).with_context(|| format!("Invalid recipe {id}"))?;
            Ok((RecipeID::from(id), composition))
        })
        .collect()
}

impl Model {
    /// Read a model from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
        let file_path = model_dir.as_ref().join(MODEL_FILE_NAME);
        let model_file: ModelFile = read_toml(&file_path)?;
        ensure!(
            model_file.simulation.steps > 0,
            "Simulation must run for at least one step"
        );

        let recipes = read_recipes(model_file.recipes)?;
        let facility = model_file.facility;
        ensure!(
            recipes.contains_key(&facility.in_recipe),
            "Unknown input recipe {}",
            facility.in_recipe
        );

        for entry in &model_file.demand {
            ensure!(
                recipes.contains_key(&entry.recipe),
                "Unknown demand recipe {}",
                entry.recipe
            );
            ensure!(
                entry.commodity == facility.out_commodity
                    || entry.commodity == facility.tails_commodity,
                "Demand commodity {} is not supplied by the facility",
                entry.commodity
            );
            ensure!(
                entry.quantity > 0.0,
                "Demand quantity must be positive (commodity {})",
                entry.commodity
            );
        }

        Ok(Model {
            steps: model_file.simulation.steps,
            facility,
            recipes,
            demand: model_file.demand,
        })
    }
}
