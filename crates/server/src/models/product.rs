//! Product domain types.

use serde::Serialize;

use orders_api_core::{Price, ProductId};

use super::Patch;

/// A product that can be added to orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Product name.
    pub name: String,
    /// Unit price, always positive.
    pub price: Price,
    /// Optional long description.
    pub description: Option<String>,
}

/// Validated input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub description: Option<String>,
}

/// Validated partial update for a product.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Patch<String>,
    pub price: Patch<Price>,
    pub description: Patch<Option<String>>,
}
