//! Domain models for the orders API.
//!
//! Each entity has a stored form (`User`, `Product`, `Order`) that is read
//! straight from its table, plus validated inputs for create (`New*`) and
//! update (`*Changes`). Inputs are only produced by [`crate::validation`].

pub mod order;
pub mod product;
pub mod user;

pub use order::{NewOrder, Order, OrderChanges};
pub use product::{NewProduct, Product, ProductChanges};
pub use user::{NewUser, User, UserChanges};

/// A field in a partial update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Field absent from the request; keep the stored value.
    #[default]
    Keep,
    /// Replace the stored value.
    Set(T),
}

impl<T> Patch<T> {
    /// Returns the new value, if any.
    #[must_use]
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Keep => None,
            Self::Set(value) => Some(value),
        }
    }

    /// Borrow the new value, if any.
    #[must_use]
    pub const fn as_ref(&self) -> Patch<&T> {
        match self {
            Self::Keep => Patch::Keep,
            Self::Set(value) => Patch::Set(value),
        }
    }

    /// Whether this patch replaces the stored value.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        matches!(self, Self::Set(_))
    }
}
