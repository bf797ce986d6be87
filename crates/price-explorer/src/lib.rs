//! Explore pre-computed listing price predictions by neighbourhood and price.
//!
//! Datasets are read through [`explorer::DatasetCache`], validated, filtered and
//! turned into summary metrics plus map and table views on every pass.

pub mod config;
pub mod error;
pub mod explorer;
pub mod telemetry;
