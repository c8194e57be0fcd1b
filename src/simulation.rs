//! Functionality for driving a facility through the exchange phases.
//!
//! The driver here is the simplest possible exchange: one supplier with
//! unlimited stock of the input recipe and the model's demand schedule as
//! consumers. Requests are cleared one at a time so each bid is sized against
//! the state the preceding trade left behind. The facility itself never
//! assumes this shape; any host implementing the [`Trader`] contract works.
use crate::exchange::{Offer, Request, RequestsByCommodity, Trade, Trader, EXCLUDE_PREF};
use crate::facility::EnrichmentFacility;
use crate::material::Material;
use crate::model::Model;
use crate::output::EnrichmentRecorder;
use crate::units::Mass;
use anyhow::{Context, Result};
use log::{debug, info};

/// Run the simulation.
///
/// # Arguments:
///
/// * `model` - The model to run
/// * `recorder` - Sink for enrichment event records
pub fn run(model: &Model, recorder: Box<dyn EnrichmentRecorder>) -> Result<()> {
    let feed_recipe = model
        .recipes
        .get(&model.facility.in_recipe)
        .with_context(|| format!("Unknown input recipe {}", model.facility.in_recipe))?;
    let mut facility =
        EnrichmentFacility::new(model.facility.clone(), feed_recipe.clone(), recorder)?;
    info!("{facility}");

    for time in 0..model.steps {
        facility.tick(time);

        // Request phase: the feed supplier answers every request in full at
        // the input recipe composition; the facility ranks before accepting
        let mut deliveries = Vec::new();
        for request in facility.material_requests() {
            let mut offers = vec![Offer {
                material: Material::new(feed_recipe.clone(), request.material.quantity),
                preference: 0.0,
            }];
            facility.adjust_material_prefs(&mut offers);
            deliveries.extend(
                offers
                    .into_iter()
                    .filter(|offer| offer.preference > EXCLUDE_PREF)
                    .map(|offer| offer.material),
            );
        }
        facility.accept_material_trades(deliveries)?;

        // Bid and trade phases, one consumer request at a time
        for entry in &model.demand {
            let recipe = &model.recipes[&entry.recipe];
            let request = Request {
                commodity: entry.commodity.clone(),
                material: Material::new(recipe.clone(), Mass(entry.quantity)),
            };
            let mut requests = RequestsByCommodity::new();
            requests
                .entry(entry.commodity.clone())
                .or_default()
                .push(request);

            let trades: Vec<_> = facility
                .material_bids(&requests)
                .into_iter()
                .map(|bid| Trade {
                    commodity: bid.commodity,
                    material: bid.offer,
                })
                .collect();
            if trades.is_empty() {
                debug!(
                    "[t={time}] no supply for {} kg of {}",
                    entry.quantity, entry.commodity
                );
                continue;
            }

            for (trade, delivered) in facility.execute_trades(&trades)? {
                info!(
                    "[t={time}] delivered {:.3} kg of {} at assay {:.4}",
                    delivered.quantity.value(),
                    trade.commodity,
                    delivered.uranium_assay()
                );
            }
        }

        facility.tock();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facility::FacilityParams;
    use crate::fixture::{facility_params, natural_u, product_5pct};
    use crate::id::RecipeID;
    use crate::material::Composition;
    use crate::model::DemandEntry;
    use crate::output::MemoryRecorder;
    use float_cmp::assert_approx_eq;
    use indexmap::IndexMap;
    use rstest::rstest;

    fn test_model(
        facility: FacilityParams,
        steps: u32,
        demand: Vec<DemandEntry>,
        natural_u: Composition,
        product_5pct: Composition,
    ) -> Model {
        let mut recipes = IndexMap::new();
        recipes.insert(RecipeID::from("natural_uranium"), natural_u);
        recipes.insert(RecipeID::from("leu_5"), product_5pct);
        Model {
            steps,
            facility,
            recipes,
            demand,
        }
    }

    #[rstest]
    fn test_run_records_one_enrichment_per_step(
        natural_u: Composition,
        product_5pct: Composition,
    ) {
        let mut params = facility_params();
        params.max_inventory = 1000.0;
        let demand = vec![DemandEntry {
            commodity: "leu".into(),
            recipe: "leu_5".into(),
            quantity: 5.0,
        }];
        let model = test_model(params, 3, demand, natural_u, product_5pct);

        let recorder = MemoryRecorder::default();
        run(&model, Box::new(recorder.clone())).unwrap();

        // Feed is plentiful: demand is met in full every step
        let events = recorder.events();
        assert_eq!(events.len(), 3);
        for (time, event) in events.iter().enumerate() {
            assert_eq!(event.time, time as u32);
            assert_approx_eq!(f64, event.natural_u, 5.0 * 11.463414634146341, epsilon = 1e-6);
        }
    }

    #[rstest]
    fn test_run_swu_limited(natural_u: Composition, product_5pct: Composition) {
        let mut params = facility_params();
        params.max_inventory = 1000.0;
        params.swu_capacity = 10.0;
        let demand = vec![DemandEntry {
            commodity: "leu".into(),
            recipe: "leu_5".into(),
            quantity: 5.0,
        }];
        let model = test_model(params, 2, demand, natural_u, product_5pct);

        let recorder = MemoryRecorder::default();
        run(&model, Box::new(recorder.clone())).unwrap();

        // Each step delivers only what 10 SWU supports, never breaching
        for event in recorder.events() {
            assert_approx_eq!(f64, event.swu, 10.0, epsilon = 1e-6);
        }
    }

    #[rstest]
    fn test_run_without_demand(natural_u: Composition, product_5pct: Composition) {
        let model = test_model(facility_params(), 2, Vec::new(), natural_u, product_5pct);
        let recorder = MemoryRecorder::default();
        run(&model, Box::new(recorder.clone())).unwrap();
        assert!(recorder.events().is_empty());
    }
}
