//! TrendAcquire - keyword trend acquisition and analysis.
//!
//! Collects trend signals for keywords across online platforms and produces
//! aggregate statistics per keyword/platform. Browser-backed sources are
//! driven through a shared engine with session reuse, human pacing, and a
//! layered extraction chain that degrades to deterministic simulated data
//! instead of failing.

pub mod analyzer;
pub mod browser;
pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod output;
pub mod scrapers;
pub mod store;
