//! Orders API Core - Shared domain types.
//!
//! This crate provides the types shared by the orders API components:
//! - `server` - HTTP API over users, products, orders and their links
//! - `cli` - Operator tooling (table creation, connectivity checks)
//!
//! # Architecture
//!
//! The core crate contains only types and their parsing rules - no I/O, no
//! database access, no HTTP. Values that carry an invariant (a well-formed
//! email, a positive price) can only be built through their `parse`
//! constructors, so the rest of the workspace never re-checks them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices and emails

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
