//! Dealdesk - real-estate deal listings, ROI analysis and AI advisory API

pub mod config;
pub mod error;
pub mod types;

pub mod analysis;
pub mod store;
pub mod ai;
pub mod api;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
