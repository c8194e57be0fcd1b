//! The enrichment facility agent: requests feed, bids product and tails
//! against incoming requests, and executes cleared trades.
use crate::enrichment::{
    max_product_from_feed, max_product_from_swu, Assays, NatUConverter, SwuConverter,
};
use crate::exchange::{Bid, Offer, Request, RequestsByCommodity, Trade, Trader, EXCLUDE_PREF};
use crate::id::{CommodityID, RecipeID};
use crate::input::deserialise_proportion;
use crate::inventory::MaterialBuffer;
use crate::material::{Composition, Material, Nuclide, U235, U238};
use crate::output::{EnrichmentEvent, EnrichmentRecorder};
use crate::units::{Mass, Swu};
use anyhow::{ensure, Context, Result};
use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// Relative tolerance for capacity checks, so a trade sized exactly at a bid
/// ceiling does not trip a breach when its requirements are recomputed
const CAPACITY_EPS: f64 = 1e-9;

/// Stand-in for an unbounded capacity (mirrors no configured limit)
const UNBOUNDED: f64 = 1e299;

fn default_tails_assay() -> f64 {
    0.03
}

fn default_unbounded() -> f64 {
    UNBOUNDED
}

fn default_max_enrich() -> f64 {
    1.0
}

/// Configuration for an [`EnrichmentFacility`].
///
/// Fixed at construction; the only mutation paths afterwards are the explicit
/// setters on the facility, which also propagate derived state.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct FacilityParams {
    /// Commodity the facility accepts as feed
    pub in_commodity: CommodityID,
    /// Commodity the facility supplies as enriched product
    pub out_commodity: CommodityID,
    /// Commodity under which depleted tails are offered
    pub tails_commodity: CommodityID,
    /// Recipe for the facility's input commodity
    pub in_recipe: RecipeID,
    /// Tails assay from the enrichment process
    #[serde(default = "default_tails_assay")]
    pub tails_assay: f64,
    /// Separative work capacity per time step (kg SWU)
    #[serde(default = "default_unbounded")]
    pub swu_capacity: f64,
    /// Maximum total feedstock inventory (kg)
    #[serde(default = "default_unbounded")]
    pub max_inventory: f64,
    /// Maximum allowed U-235 weight fraction in product
    #[serde(default = "default_max_enrich", deserialize_with = "deserialise_proportion")]
    pub max_enrich: f64,
    /// Feedstock stored at the facility at the start of the simulation (kg)
    #[serde(default)]
    pub initial_reserves: f64,
}

/// Errors raised while merging feed or fulfilling confirmed trades.
#[derive(Debug, Error, PartialEq)]
pub enum FacilityError {
    /// A confirmed trade needs more of a resource than the facility holds.
    ///
    /// This is an internal consistency violation: bid sizing must prevent it,
    /// so it aborts the trade rather than truncating the delivered quantity.
    #[error("trade requires {required:.6} of {resource} but only {available:.6} is available")]
    CapacityBreach {
        /// Which resource is short ("feed", "SWU" or "tails")
        resource: &'static str,
        /// Quantity the trade requires
        required: f64,
        /// Quantity currently available
        available: f64,
    },
    /// Delivered feed does not match the configured input recipe.
    #[error("delivered feed does not match input recipe {recipe}")]
    CompositionMismatch {
        /// The expected recipe
        recipe: String,
    },
}

/// Whether `required` exceeds `available` beyond floating-point tolerance.
fn exceeds(required: f64, available: f64) -> bool {
    required > available * (1.0 + CAPACITY_EPS) + f64::EPSILON
}

/// A facility that converts a feed commodity (nominally natural uranium) into
/// an enriched product plus depleted tails, bounded by a feedstock inventory
/// limit and a per-step separative work budget.
pub struct EnrichmentFacility {
    params: FacilityParams,
    feed_recipe: Composition,
    inventory: MaterialBuffer,
    tails: MaterialBuffer,
    current_swu: Swu,
    time: u32,
    entered: bool,
    recorder: Box<dyn EnrichmentRecorder>,
}

impl EnrichmentFacility {
    /// Create a facility from its configuration and input recipe composition.
    ///
    /// The recorder receives one event per executed enrichment; inject a
    /// no-op or in-memory recorder when running without a live sink.
    pub fn new(
        params: FacilityParams,
        feed_recipe: Composition,
        recorder: Box<dyn EnrichmentRecorder>,
    ) -> Result<Self> {
        ensure!(
            (0.0..1.0).contains(&params.tails_assay),
            "Tails assay must be in [0, 1)"
        );
        let feed_assay = feed_recipe.uranium_assay();
        ensure!(
            feed_assay > 0.0,
            "Input recipe {} contains no U-235",
            params.in_recipe
        );
        ensure!(
            params.initial_reserves <= params.max_inventory,
            "Initial reserves ({} kg) exceed the inventory limit ({} kg)",
            params.initial_reserves,
            params.max_inventory
        );
        if feed_assay <= params.tails_assay {
            warn!(
                "Input recipe {} assay {feed_assay} is not above the tails assay {}; \
                 no product can be enriched",
                params.in_recipe, params.tails_assay
            );
        }

        Ok(Self {
            inventory: MaterialBuffer::with_capacity(Mass(params.max_inventory)),
            tails: MaterialBuffer::unbounded(),
            current_swu: Swu(params.swu_capacity),
            time: 0,
            entered: false,
            recorder,
            params,
            feed_recipe,
        })
    }

    /// The facility's configuration.
    pub fn params(&self) -> &FacilityParams {
        &self.params
    }

    /// The U-235 assay of the feed the facility enriches.
    pub fn feed_assay(&self) -> f64 {
        self.feed_recipe.uranium_assay()
    }

    /// Feedstock currently held.
    pub fn inventory_quantity(&self) -> Mass {
        self.inventory.quantity()
    }

    /// Depleted tails currently held.
    pub fn tails_quantity(&self) -> Mass {
        self.tails.quantity()
    }

    /// Separative work remaining in the current time step.
    pub fn remaining_swu(&self) -> Swu {
        self.current_swu
    }

    /// Change the inventory limit, resizing the live buffer's capacity.
    pub fn set_max_inventory_size(&mut self, size: Mass) -> Result<()> {
        self.inventory
            .set_capacity(size)
            .context("Cannot resize feedstock inventory")?;
        self.params.max_inventory = size.value();
        Ok(())
    }

    /// Change the separative work capacity, resetting the current budget.
    pub fn set_swu_capacity(&mut self, capacity: Swu) {
        self.params.swu_capacity = capacity.value();
        self.current_swu = capacity;
    }

    /// Begin-of-step housekeeping: reset the separative work budget and, on
    /// the very first step, inject the configured initial reserves at the
    /// input recipe composition without consuming any work.
    pub fn tick(&mut self, time: u32) {
        self.time = time;
        self.current_swu = Swu(self.params.swu_capacity);

        if !self.entered {
            self.entered = true;
            if self.params.initial_reserves > 0.0 {
                let reserve =
                    Material::new(self.feed_recipe.clone(), Mass(self.params.initial_reserves));
                match self.inventory.push(reserve) {
                    Ok(()) => info!(
                        "[t={time}] seeded {} kg of initial reserves",
                        self.params.initial_reserves
                    ),
                    Err(err) => warn!("[t={time}] initial reserves discarded: {err}"),
                }
            }
        }
    }

    /// End-of-step housekeeping.
    pub fn tock(&self) {
        info!(
            "[t={}] inventory: {:.3} kg, tails: {:.3} kg, unused SWU: {:.3}",
            self.time,
            self.inventory.quantity().value(),
            self.tails.quantity().value(),
            self.current_swu.value()
        );
    }

    /// The assay triple for enriching facility feed to the given product assay.
    fn assays_for(&self, product_assay: f64) -> Assays {
        Assays::new(self.feed_assay(), product_assay, self.params.tails_assay)
    }

    /// Whether a requested product material is one the facility can respond
    /// to: it must contain U-238 and its implied assay must sit above the
    /// tails assay, at or above the feed assay (the facility enriches, it
    /// does not down-blend) and at or below the enrichment cap.
    fn valid_req(&self, mat: &Material) -> bool {
        let assay = mat.uranium_assay();
        mat.composition.mass_frac(U238).0 > 0.0
            && assay > self.params.tails_assay
            && assay >= self.feed_assay()
            && assay <= self.params.max_enrich
    }

    /// The quantity ceiling for one product request, or `None` for no bid.
    fn product_bid_qty(&self, req: &Request) -> Option<Mass> {
        if self.inventory.is_empty() {
            return None;
        }
        if !self.valid_req(&req.material) {
            warn!(
                "[t={}] ignoring request for {} kg of {}: not enrichable from {}",
                self.time,
                req.material.quantity.value(),
                req.commodity,
                self.params.in_recipe
            );
            return None;
        }

        let assays = self.assays_for(req.material.uranium_assay());
        let from_swu = max_product_from_swu(self.current_swu, &assays);
        // Invert the NatU requirement: only the uranium share of the feed
        // participates in the mass balance
        let uranium_frac = req.material.composition.multi_mass_frac(&[U235, U238]);
        let from_feed = max_product_from_feed(self.inventory.quantity() * uranium_frac, &assays);

        let qty = req.material.quantity.min(from_swu).min(from_feed);
        (qty.value() > 0.0).then_some(qty)
    }

    /// Perform the feed -> product + tails split for one committed trade.
    ///
    /// Debits feedstock inventory and the separative work budget, pushes the
    /// tails stream, records the enrichment and returns the product stream.
    fn enrich(&mut self, target: &Material) -> Result<Material> {
        // A product assay below the feed assay would invert the mass balance
        // (more product out than feed in, negative separative work)
        ensure!(
            target.uranium_assay() >= self.feed_assay(),
            "Product assay {} is below the feed assay {}",
            target.uranium_assay(),
            self.feed_assay()
        );
        let swu_conv = SwuConverter {
            feed_assay: self.feed_assay(),
            tails_assay: self.params.tails_assay,
        };
        let natu_conv = NatUConverter {
            feed_assay: self.feed_assay(),
            tails_assay: self.params.tails_assay,
        };
        let swu_req = swu_conv.convert(target);
        let natu_req = natu_conv.convert(target);

        let feed_held = self.inventory.quantity();
        if exceeds(natu_req.value(), feed_held.value()) {
            return Err(FacilityError::CapacityBreach {
                resource: "feed",
                required: natu_req.value(),
                available: feed_held.value(),
            }
            .into());
        }
        if exceeds(swu_req.value(), self.current_swu.value()) {
            return Err(FacilityError::CapacityBreach {
                resource: "SWU",
                required: swu_req.value(),
                available: self.current_swu.value(),
            }
            .into());
        }

        let feed = self.inventory.pop(natu_req.min(feed_held))?;

        // Partition the feed's nuclide masses between product and tails so
        // that every nuclide's mass is conserved across the split
        let mut tails_masses: IndexMap<Nuclide, f64> = feed
            .composition
            .iter()
            .map(|(nuc, frac)| (nuc, feed.quantity.value() * frac))
            .collect();
        for (nuc, frac) in target.composition.iter() {
            let mass = tails_masses.entry(nuc).or_insert(0.0);
            *mass = (*mass - target.quantity.value() * frac).max(0.0);
        }

        let tails_qty: f64 = tails_masses.values().sum();
        if tails_qty > 0.0 {
            let tails_stream = Material::new(Composition::new(tails_masses)?, Mass(tails_qty));
            self.tails.push(tails_stream)?;
        }

        self.current_swu = (self.current_swu - swu_req).max(Swu(0.0));
        self.recorder.record(EnrichmentEvent {
            time: self.time,
            natural_u: natu_req.value(),
            swu: swu_req.value(),
        });
        debug!(
            "[t={}] enriched {:.3} kg to assay {:.4} using {:.3} kg of feed and {:.3} SWU",
            self.time,
            target.quantity.value(),
            target.uranium_assay(),
            natu_req.value(),
            swu_req.value()
        );

        Ok(Material::new(target.composition.clone(), target.quantity))
    }

    /// Deliver a committed quantity of depleted tails.
    fn pop_tails(&mut self, qty: Mass) -> Result<Material> {
        let held = self.tails.quantity();
        if exceeds(qty.value(), held.value()) {
            return Err(FacilityError::CapacityBreach {
                resource: "tails",
                required: qty.value(),
                available: held.value(),
            }
            .into());
        }
        Ok(self.tails.pop(qty.min(held))?)
    }
}

impl Trader for EnrichmentFacility {
    /// One feedstock request sized to the inventory headroom, or none if full.
    fn material_requests(&self) -> Vec<Request> {
        let headroom = self.inventory.space();
        if headroom.value() <= 0.0 {
            return Vec::new();
        }
        vec![Request {
            commodity: self.params.in_commodity.clone(),
            material: Material::new(self.feed_recipe.clone(), headroom),
        }]
    }

    /// Prefer offers by assay: richer feed is strictly better, but offers with
    /// no fissile content or already at/above the enrichment cap are excluded.
    fn adjust_material_prefs(&self, offers: &mut [Offer]) {
        for offer in offers {
            let assay = offer.material.uranium_assay();
            offer.preference = if assay <= 0.0 || assay >= self.params.max_enrich {
                EXCLUDE_PREF
            } else {
                assay
            };
        }
    }

    /// Merge accepted feed into the inventory, rejecting material that does
    /// not match the input recipe.
    fn accept_material_trades(&mut self, materials: Vec<Material>) -> Result<()> {
        for mat in materials {
            if !mat.composition.matches(&self.feed_recipe) {
                return Err(FacilityError::CompositionMismatch {
                    recipe: self.params.in_recipe.to_string(),
                }
                .into());
            }
            let qty = mat.quantity;
            self.inventory
                .push(mat)
                .context("Cannot merge accepted feed into inventory")?;
            info!(
                "[t={}] received {:.3} kg of {}",
                self.time,
                qty.value(),
                self.params.in_commodity
            );
        }
        Ok(())
    }

    /// Bid on requests for the product and tails commodities.
    ///
    /// Product bids are capped by the request quantity, the remaining
    /// separative work and the feedstock inventory; tails bids by the tails
    /// held. Read-only: nothing is committed until trades execute.
    fn material_bids(&self, requests: &RequestsByCommodity) -> Vec<Bid> {
        let mut bids = Vec::new();

        if let Some(reqs) = requests.get(&self.params.tails_commodity) {
            let held = self.tails.quantity();
            if let Some(composition) = self.tails.blended_composition() {
                for req in reqs {
                    let qty = req.material.quantity.min(held);
                    if qty.value() > 0.0 {
                        bids.push(Bid {
                            commodity: self.params.tails_commodity.clone(),
                            offer: Material::new(composition.clone(), qty),
                        });
                    }
                }
            }
        }

        if let Some(reqs) = requests.get(&self.params.out_commodity) {
            for req in reqs {
                if let Some(qty) = self.product_bid_qty(req) {
                    // The bid hits the requested composition exactly
                    bids.push(Bid {
                        commodity: self.params.out_commodity.clone(),
                        offer: Material::new(req.material.composition.clone(), qty),
                    });
                }
            }
        }

        bids
    }

    /// Fulfil each confirmed trade in order, applying it against the state
    /// the preceding trades left behind.
    fn execute_trades(&mut self, trades: &[Trade]) -> Result<Vec<(Trade, Material)>> {
        let mut responses = Vec::with_capacity(trades.len());
        for trade in trades {
            let delivered = if trade.commodity == self.params.tails_commodity {
                self.pop_tails(trade.material.quantity)?
            } else {
                self.enrich(&trade.material)?
            };
            responses.push((trade.clone(), delivered));
        }
        Ok(responses)
    }
}

impl fmt::Display for EnrichmentFacility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "enrichment facility [feed: {}, product: {}, tails: {}] \
             swu capacity: {}, tails assay: {}, inventory: {:.3}/{} kg",
            self.params.in_commodity,
            self.params.out_commodity,
            self.params.tails_commodity,
            self.params.swu_capacity,
            self.params.tails_assay,
            self.inventory.quantity().value(),
            self.params.max_inventory
        )
    }
}
