//! FIFO-layered buffers of material lots.
use crate::material::{blend, Composition, Material};
use crate::units::Mass;
use std::collections::VecDeque;
use thiserror::Error;

/// Relative tolerance applied to capacity and quantity checks
const QTY_EPS: f64 = 1e-9;

/// Errors raised by [`MaterialBuffer`] operations.
#[derive(Debug, Error, PartialEq)]
pub enum BufferError {
    /// Pushing the material would exceed the buffer's capacity
    #[error("pushing {pushed} kg would exceed remaining buffer space of {space} kg")]
    CapacityExceeded {
        /// Quantity being pushed
        pushed: f64,
        /// Remaining space in the buffer
        space: f64,
    },
    /// The buffer holds less than the requested quantity
    #[error("requested {requested} kg but buffer holds only {available} kg")]
    InsufficientQuantity {
        /// Quantity requested
        requested: f64,
        /// Quantity available
        available: f64,
    },
    /// The new capacity is below the currently held quantity
    #[error("cannot set capacity to {capacity} kg below current quantity of {quantity} kg")]
    CapacityBelowQuantity {
        /// Requested capacity
        capacity: f64,
        /// Currently held quantity
        quantity: f64,
    },
}

/// An ordered, capacity-bounded collection of material lots.
///
/// Lots are immutable once stored and are drawn front to back; a pop whose
/// boundary falls mid-lot splits that lot rather than mutating it in place.
#[derive(Clone, Debug)]
pub struct MaterialBuffer {
    lots: VecDeque<Material>,
    capacity: Mass,
}

impl MaterialBuffer {
    /// An empty buffer with the given capacity ceiling.
    pub fn with_capacity(capacity: Mass) -> Self {
        Self {
            lots: VecDeque::new(),
            capacity,
        }
    }

    /// An empty buffer with no capacity ceiling.
    pub fn unbounded() -> Self {
        Self::with_capacity(Mass(f64::INFINITY))
    }

    /// Total mass currently held across all lots.
    pub fn quantity(&self) -> Mass {
        Mass(self.lots.iter().map(|lot| lot.quantity.value()).sum())
    }

    /// The capacity ceiling.
    pub fn capacity(&self) -> Mass {
        self.capacity
    }

    /// Remaining headroom below the capacity ceiling.
    pub fn space(&self) -> Mass {
        (self.capacity - self.quantity()).max(Mass(0.0))
    }

    /// Whether the buffer holds no material.
    pub fn is_empty(&self) -> bool {
        self.quantity().value() <= 0.0
    }

    /// Number of stored lots.
    pub fn lot_count(&self) -> usize {
        self.lots.len()
    }

    /// Change the capacity ceiling. Fails if the buffer already holds more.
    pub fn set_capacity(&mut self, capacity: Mass) -> Result<(), BufferError> {
        let quantity = self.quantity();
        if capacity.value() < quantity.value() * (1.0 - QTY_EPS) {
            return Err(BufferError::CapacityBelowQuantity {
                capacity: capacity.value(),
                quantity: quantity.value(),
            });
        }
        self.capacity = capacity;
        Ok(())
    }

    /// Append a lot to the back of the buffer.
    pub fn push(&mut self, mat: Material) -> Result<(), BufferError> {
        let space = self.space();
        if mat.quantity.value() > space.value() * (1.0 + QTY_EPS) {
            return Err(BufferError::CapacityExceeded {
                pushed: mat.quantity.value(),
                space: space.value(),
            });
        }
        self.lots.push_back(mat);
        Ok(())
    }

    /// Draw `qty` from the front of the buffer, splitting the oldest lot if
    /// the boundary falls mid-lot, and blend the drawn lots into one material.
    pub fn pop(&mut self, qty: Mass) -> Result<Material, BufferError> {
        let available = self.quantity();
        if qty.value() <= 0.0 || qty.value() > available.value() * (1.0 + QTY_EPS) {
            return Err(BufferError::InsufficientQuantity {
                requested: qty.value(),
                available: available.value(),
            });
        }

        let mut drawn = Vec::new();
        let mut remaining = qty.min(available).value();
        while remaining > 0.0 {
            let Some(lot) = self.lots.pop_front() else {
                break;
            };
            if lot.quantity.value() <= remaining {
                remaining -= lot.quantity.value();
                drawn.push(lot);
            } else {
                // Split the lot at the boundary; the unpopped remainder keeps
                // its place at the front
                drawn.push(Material::new(lot.composition.clone(), Mass(remaining)));
                self.lots.push_front(Material::new(
                    lot.composition,
                    Mass(lot.quantity.value() - remaining),
                ));
                remaining = 0.0;
            }
        }

        blend(&drawn).ok_or(BufferError::InsufficientQuantity {
            requested: qty.value(),
            available: available.value(),
        })
    }

    /// The mass-weighted composition of all held lots, if any mass is held.
    pub fn blended_composition(&self) -> Option<Composition> {
        blend(&self.lots).map(|mat| mat.composition)
    }
}
