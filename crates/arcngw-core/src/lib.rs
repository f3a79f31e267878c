//! arcngw Core - Domain models, error taxonomy, and configuration
//!
//! This crate contains the types shared by the geometry engine, the backend
//! client and the ArcGIS-facing API.

pub mod config;
pub mod error;
pub mod models;

pub use error::{NgwError, Result};
