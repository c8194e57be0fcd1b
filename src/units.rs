#![allow(missing_docs)]

//! Newtypes for the physical quantities the enrichment maths works in.
//!
//! Assays and mass fractions are plain `f64`s in `[0, 1]`; only quantities
//! with units (mass, separative work) get a newtype so they cannot be mixed.

/// Represents a dimensionless quantity (a ratio or mass fraction).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, derive_more::Add, derive_more::Sub)]
pub struct Dimensionless(pub f64);

impl From<f64> for Dimensionless {
    fn from(val: f64) -> Self {
        Self(val)
    }
}

impl From<Dimensionless> for f64 {
    fn from(val: Dimensionless) -> Self {
        val.0
    }
}

macro_rules! unit_struct {
    ($name:ident) => {
        /// Represents a type of quantity.
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, derive_more::Add, derive_more::Sub)]
        pub struct $name(pub f64);

        impl $name {
            /// Returns the value of the unit type as a f64.
            pub fn value(self) -> f64 {
                self.0
            }

            /// The smaller of two quantities.
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }

            /// The larger of two quantities.
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }
        }

        impl std::ops::AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl std::ops::SubAssign for $name {
            fn sub_assign(&mut self, rhs: Self) {
                self.0 -= rhs.0;
            }
        }

        impl std::ops::Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Mul<$name> for Dimensionless {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
            }
        }

        impl std::ops::Div for $name {
            type Output = Dimensionless;
            fn div(self, rhs: $name) -> Dimensionless {
                Dimensionless(self.0 / rhs.0)
            }
        }
    };
}

// Base quantities
unit_struct!(Mass);
unit_struct!(Swu);

// Derived quantities
unit_struct!(SwuPerMass);

impl std::ops::Mul<Mass> for SwuPerMass {
    type Output = Swu;
    fn mul(self, rhs: Mass) -> Swu {
        Swu(self.0 * rhs.0)
    }
}

impl std::ops::Div<SwuPerMass> for Swu {
    type Output = Mass;
    fn div(self, rhs: SwuPerMass) -> Mass {
        Mass(self.0 / rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_mass_arithmetic() {
        let mut total = Mass(1.5) + Mass(2.5);
        total -= Mass(1.0);
        assert_approx_eq!(f64, total.value(), 3.0);
        assert_eq!(Mass(4.0).min(Mass(3.0)), Mass(3.0));
        assert!(Mass(1.0) < Mass(2.0));
    }

    #[test]
    fn test_swu_per_mass() {
        let swu = SwuPerMass(7.0) * Mass(2.0);
        assert_approx_eq!(f64, swu.value(), 14.0);
        let product = swu / SwuPerMass(7.0);
        assert_approx_eq!(f64, product.value(), 2.0);
    }
}
