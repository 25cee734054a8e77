#![doc(test(attr(deny(warnings))))]

//! Daily Budget derives a daily wallet from declared spending habits and
//! gates each transaction against category limits, an 80% spending
//! threshold, a manual lock, and a justified buffer.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Daily Budget tracing initialized.");
    });
}
