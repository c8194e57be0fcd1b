//! The separative-work and mass-balance mathematics of enrichment.
//!
//! Everything here is a pure function of assays and quantities. The functions
//! are total over quantity >= 0 and assays in [0, 1]: degenerate assay
//! combinations yield degenerate (possibly infinite) results rather than
//! errors, and admissibility is enforced by the facility, not here.
use crate::material::{Material, U235, U238};
use crate::units::{Mass, Swu, SwuPerMass};

/// Feed, product and tails assays defining one enrichment operation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Assays {
    /// U-235 assay of the feed stream
    pub feed: f64,
    /// U-235 assay of the product stream
    pub product: f64,
    /// U-235 assay of the tails stream
    pub tails: f64,
}

impl Assays {
    /// Create an assay triple.
    pub fn new(feed: f64, product: f64, tails: f64) -> Self {
        Self {
            feed,
            product,
            tails,
        }
    }
}

/// The enrichment value function `V(x) = (2x - 1) ln(x / (1 - x))`.
pub fn value_function(assay: f64) -> f64 {
    (2.0 * assay - 1.0) * (assay / (1.0 - assay)).ln()
}

/// Feed mass per unit product mass, from the two-stream mass balance.
fn feed_per_product(assays: &Assays) -> f64 {
    (assays.product - assays.tails) / (assays.feed - assays.tails)
}

/// Feed quantity required to produce `product_qty` of product.
pub fn feed_required(product_qty: Mass, assays: &Assays) -> Mass {
    Mass(product_qty.value() * feed_per_product(assays))
}

/// Tails quantity produced alongside `product_qty` of product.
pub fn tails_produced(product_qty: Mass, assays: &Assays) -> Mass {
    feed_required(product_qty, assays) - product_qty
}

/// Separative work per unit product mass.
pub fn swu_per_product(assays: &Assays) -> SwuPerMass {
    let feed = feed_per_product(assays);
    let tails = feed - 1.0;
    SwuPerMass(
        value_function(assays.product) + tails * value_function(assays.tails)
            - feed * value_function(assays.feed),
    )
}

/// Separative work required to produce `product_qty` of product.
pub fn swu_required(product_qty: Mass, assays: &Assays) -> Swu {
    swu_per_product(assays) * product_qty
}

/// The largest product quantity obtainable from the given separative work.
///
/// Unbounded when the operation needs no work (degenerate assay triples).
pub fn max_product_from_swu(swu: Swu, assays: &Assays) -> Mass {
    let per_product = swu_per_product(assays);
    if per_product.value() <= 0.0 {
        return Mass(f64::INFINITY);
    }
    swu / per_product
}

/// The largest product quantity obtainable from the given feed quantity.
pub fn max_product_from_feed(feed_qty: Mass, assays: &Assays) -> Mass {
    let per_product = feed_per_product(assays);
    if per_product <= 0.0 {
        return Mass(f64::INFINITY);
    }
    Mass(feed_qty.value() / per_product)
}

/// Converts a proposed product material into the separative work needed to
/// produce it from feed at `feed_assay` down to tails at `tails_assay`.
///
/// Two converters compare equal iff their feed and tails assays match.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SwuConverter {
    /// U-235 assay of the feed the facility enriches
    pub feed_assay: f64,
    /// U-235 assay of the depleted stream
    pub tails_assay: f64,
}

impl SwuConverter {
    /// The separative work required to produce `mat` at its own assay.
    pub fn convert(&self, mat: &Material) -> Swu {
        let assays = Assays::new(self.feed_assay, mat.uranium_assay(), self.tails_assay);
        swu_required(mat.quantity, &assays)
    }
}

/// Converts a proposed product material into the total feed mass needed to
/// produce it, accounting for non-uranium content diluting the feed.
///
/// Two converters compare equal iff their feed and tails assays match.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NatUConverter {
    /// U-235 assay of the feed the facility enriches
    pub feed_assay: f64,
    /// U-235 assay of the depleted stream
    pub tails_assay: f64,
}

impl NatUConverter {
    /// The total feed mass required to produce `mat` at its own assay.
    ///
    /// The uranium mass balance gives the uranium feed requirement; dividing
    /// by the material's U-235 + U-238 mass fraction recovers the total mass.
    pub fn convert(&self, mat: &Material) -> Mass {
        let assays = Assays::new(self.feed_assay, mat.uranium_assay(), self.tails_assay);
        let uranium_frac = mat.composition.multi_mass_frac(&[U235, U238]);
        feed_required(mat.quantity, &assays) / uranium_frac
    }
}
