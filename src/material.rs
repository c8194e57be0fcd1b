//! Materials: isotopic compositions and the massed quantities that carry them.
use crate::units::{Dimensionless, Mass};
use anyhow::{ensure, Context, Result};
use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt;

/// Tolerance used when comparing two compositions nuclide by nuclide
const COMPOSITION_TOL: f64 = 1e-9;

/// A nuclide identifier in ZZZAAAMMMM form (e.g. 922350000 for U-235).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Nuclide(pub u32);

/// The fissile isotope tracked by the enrichment maths
pub const U235: Nuclide = Nuclide(922_350_000);
/// The fertile isotope tracked by the enrichment maths
pub const U238: Nuclide = Nuclide(922_380_000);

impl Nuclide {
    /// Parse a nuclide from a name such as `"U235"` or a raw numeric identifier.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "U235" | "u235" => Ok(U235),
            "U238" | "u238" => Ok(U238),
            other => {
                let id = other
                    .parse()
                    .with_context(|| format!("Unknown nuclide: {other}"))?;
                Ok(Nuclide(id))
            }
        }
    }
}

impl fmt::Display for Nuclide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            U235 => write!(f, "U235"),
            U238 => write!(f, "U238"),
            Nuclide(id) => write!(f, "{id}"),
        }
    }
}

/// Mass fractions by nuclide, normalised so that fractions sum to one.
///
/// Iteration order is deterministic (sorted by nuclide identifier).
#[derive(Clone, Debug, PartialEq)]
pub struct Composition(IndexMap<Nuclide, f64>);

impl Composition {
    /// Build a composition from (nuclide, mass) pairs or unnormalised fractions.
    ///
    /// Duplicate nuclides are summed. Fails if any entry is negative or the
    /// total is not positive.
    pub fn new<I>(fractions: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Nuclide, f64)>,
    {
        let mut map = IndexMap::new();
        for (nuc, frac) in fractions {
            ensure!(
                frac >= 0.0,
                "Negative mass fraction {frac} for nuclide {nuc}"
            );
            *map.entry(nuc).or_insert(0.0) += frac;
        }
        let total: f64 = map.values().sum();
        ensure!(total > 0.0, "Composition has no mass");

        map.sort_keys();
        for frac in map.values_mut() {
            *frac /= total;
        }
        Ok(Self(map))
    }

    /// The mass fraction of a single nuclide (zero if absent).
    pub fn mass_frac(&self, nuc: Nuclide) -> Dimensionless {
        Dimensionless(self.0.get(&nuc).copied().unwrap_or(0.0))
    }

    /// The summed mass fraction of a set of nuclides.
    pub fn multi_mass_frac(&self, nucs: &[Nuclide]) -> Dimensionless {
        Dimensionless(nucs.iter().map(|nuc| self.mass_frac(*nuc).0).sum())
    }

    /// The U-235 mass fraction relative to the U-235 + U-238 content.
    ///
    /// This is *not* the fraction relative to total mass: trace isotopes do
    /// not dilute the assay. Zero if the composition holds no uranium.
    pub fn uranium_assay(&self) -> f64 {
        let u235 = self.mass_frac(U235).0;
        let uranium = u235 + self.mass_frac(U238).0;
        if uranium > 0.0 {
            u235 / uranium
        } else {
            0.0
        }
    }

    /// Whether two compositions agree on every nuclide within tolerance.
    pub fn matches(&self, other: &Composition) -> bool {
        self.0
            .keys()
            .chain(other.0.keys())
            .unique()
            .all(|nuc| (self.mass_frac(*nuc).0 - other.mass_frac(*nuc).0).abs() <= COMPOSITION_TOL)
    }

    /// Iterate over (nuclide, mass fraction) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Nuclide, f64)> + '_ {
        self.0.iter().map(|(nuc, frac)| (*nuc, *frac))
    }
}

/// A quantity of matter at a fixed isotopic composition.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Isotopic composition of the material
    pub composition: Composition,
    /// Total mass of the material
    pub quantity: Mass,
}

impl Material {
    /// Create a material from a composition and a quantity.
    pub fn new(composition: Composition, quantity: Mass) -> Self {
        Self {
            composition,
            quantity,
        }
    }

    /// The mass of a single nuclide within this material.
    pub fn nuclide_mass(&self, nuc: Nuclide) -> Mass {
        self.quantity * self.composition.mass_frac(nuc)
    }

    /// The U-235 assay of this material (see [`Composition::uranium_assay`]).
    pub fn uranium_assay(&self) -> f64 {
        self.composition.uranium_assay()
    }
}

/// Combine several materials into one, with mass-weighted composition.
///
/// Returns `None` if the materials carry no mass between them.
pub fn blend<'a, I>(materials: I) -> Option<Material>
where
    I: IntoIterator<Item = &'a Material>,
{
    let mut masses: IndexMap<Nuclide, f64> = IndexMap::new();
    let mut total = Mass(0.0);
    for mat in materials {
        for (nuc, frac) in mat.composition.iter() {
            *masses.entry(nuc).or_insert(0.0) += mat.quantity.value() * frac;
        }
        total += mat.quantity;
    }
    let composition = Composition::new(masses).ok()?;
    Some(Material::new(composition, total))
}
