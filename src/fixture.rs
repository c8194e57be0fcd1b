//! Fixtures for tests
use crate::facility::{EnrichmentFacility, FacilityParams};
use crate::material::{Composition, Nuclide, U235, U238};
use crate::output::MemoryRecorder;
use rstest::fixture;

/// Natural uranium as a two-isotope composition
#[fixture]
pub fn natural_u() -> Composition {
    Composition::new([(U235, 0.0071), (U238, 0.9929)]).unwrap()
}

/// Low-enriched uranium at 5% U-235
#[fixture]
pub fn product_5pct() -> Composition {
    Composition::new([(U235, 0.05), (U238, 0.95)]).unwrap()
}

/// Natural uranium diluted with the given fraction of a non-uranium nuclide
pub fn natural_u_with_trace(trace_frac: f64) -> Composition {
    let uranium = 1.0 - trace_frac;
    Composition::new([
        (U235, 0.0071 * uranium),
        (U238, 0.9929 * uranium),
        // O-16, standing in for any untracked content
        (Nuclide(80_160_000), trace_frac),
    ])
    .unwrap()
}

/// Facility configuration shared by most tests: natural uranium feed, 5%-cap
/// free, 1000 SWU per step, 100 kg of inventory space
#[fixture]
pub fn facility_params() -> FacilityParams {
    FacilityParams {
        in_commodity: "natl_u".into(),
        out_commodity: "leu".into(),
        tails_commodity: "tails".into(),
        in_recipe: "natural_uranium".into(),
        tails_assay: 0.003,
        swu_capacity: 1000.0,
        max_inventory: 100.0,
        max_enrich: 1.0,
        initial_reserves: 0.0,
    }
}

/// A facility built from [`facility_params`] with an in-memory recorder
#[fixture]
pub fn facility() -> (EnrichmentFacility, MemoryRecorder) {
    test_facility(|_| {})
}

/// A facility built from [`facility_params`] after applying `adjust` to them
pub fn test_facility(
    adjust: impl FnOnce(&mut FacilityParams),
) -> (EnrichmentFacility, MemoryRecorder) {
    let mut params = facility_params();
    adjust(&mut params);
    let recorder = MemoryRecorder::default();
    let facility = EnrichmentFacility::new(params, natural_u(), Box::new(recorder.clone()))
        .expect("valid test facility config");
    (facility, recorder)
}
