//! Stocktake Client - warehouse backend API access.
//!
//! This crate provides the [`WarehouseClient`], a JSON/REST
//! implementation of the engine's `CountBackend` collaborator trait,
//! plus the environment-based [`config::StocktakeConfig`] it is built
//! from.
//!
//! # Example
//!
//! ```rust,ignore
//! use stocktake_client::{StocktakeConfig, WarehouseClient};
//! use stocktake_engine::CountService;
//!
//! let config = StocktakeConfig::from_env()?;
//! let service = CountService::new(WarehouseClient::new(&config), config.local_offset);
//! let sheets = service.refresh_sheets().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
mod http;

pub use config::{ConfigError, StocktakeConfig};
pub use http::WarehouseClient;
