//! Stocktake Core - Shared types library.
//!
//! This crate provides common types used across all Stocktake components:
//! - `engine` - Count-sheet reconciliation engine
//! - `client` - HTTP client for the warehouse backend API
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no date
//! arithmetic beyond what the types themselves carry. This keeps it
//! lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs plus status and
//!   classification enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
