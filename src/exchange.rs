//! The request/bid/trade protocol between a facility and the exchange market.
//!
//! The market itself lives outside this crate; these are the portfolio types
//! it moves around and the capability trait a facility implements in order to
//! participate. Bid generation is read-only by contract: facility state may
//! only change when trades are executed.
use crate::id::CommodityID;
use crate::material::Material;
use anyhow::Result;
use indexmap::IndexMap;

/// The preference value marking an offer the trader cannot use.
///
/// Admissible offers are scored in [0, 1], so any negative value excludes.
pub const EXCLUDE_PREF: f64 = -1.0;

/// A request for some quantity of a commodity at a target composition.
#[derive(Clone, Debug)]
pub struct Request {
    /// The commodity being requested
    pub commodity: CommodityID,
    /// Hypothetical material describing the desired quantity and composition
    pub material: Material,
}

/// A candidate material offered against a request, carrying the preference
/// the requester assigns to it.
#[derive(Clone, Debug)]
pub struct Offer {
    /// The offered material
    pub material: Material,
    /// Requester's preference for this offer (higher clears first)
    pub preference: f64,
}

/// A supplier's answer to a request: a quantity ceiling at the requested
/// composition.
#[derive(Clone, Debug)]
pub struct Bid {
    /// The commodity being supplied
    pub commodity: CommodityID,
    /// The offered material (quantity is the most the supplier will deliver)
    pub offer: Material,
}

/// A cleared trade: a committed quantity of the bid composition.
#[derive(Clone, Debug)]
pub struct Trade {
    /// The commodity being delivered
    pub commodity: CommodityID,
    /// The committed material (quantity and target composition)
    pub material: Material,
}

/// Requests outstanding in one step, grouped by commodity.
pub type RequestsByCommodity = IndexMap<CommodityID, Vec<Request>>;

/// The capability set a facility exposes to the exchange market.
pub trait Trader {
    /// The requests this trader issues for the current time step.
    fn material_requests(&self) -> Vec<Request>;

    /// Rank the offers received against this trader's outstanding request by
    /// writing a preference into each.
    fn adjust_material_prefs(&self, offers: &mut [Offer]);

    /// Merge accepted feed materials into internal state.
    fn accept_material_trades(&mut self, materials: Vec<Material>) -> Result<()>;

    /// Quantity-ceiling bids against the requests addressed to this trader's
    /// output commodities. Must not mutate trader state.
    fn material_bids(&self, requests: &RequestsByCommodity) -> Vec<Bid>;

    /// Fulfil cleared trades in the order presented, returning the delivered
    /// material for each. Trades apply sequentially against updated state.
    fn execute_trades(&mut self, trades: &[Trade]) -> Result<Vec<(Trade, Material)>>;
}
