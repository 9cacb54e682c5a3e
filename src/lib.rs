//! Two-stage scraper for the Ayna bus map API.
//!
//! Lists every bus, fetches each one's stops and route geometry, and writes
//! the lot to a single JSON document.

pub mod config;
pub mod error;
pub mod fetch;
pub mod infra;
pub mod model;
pub mod output;
pub mod persist;
pub mod scrape;
pub mod services;
pub mod stats;
pub mod validate;
