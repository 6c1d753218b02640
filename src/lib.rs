#![doc(test(attr(deny(warnings))))]

//! Scenario Core projects recurring cost and revenue line items over month
//! windows and derives burn, runway and growth metrics for comparing startup
//! financial scenarios.
//!
//! ```
//! use rust_decimal_macros::dec;
//! use scenario_core::domain::{ItemDraft, ScenarioIdentity, ScenarioSnapshot};
//! use scenario_core::engine::PortfolioAggregator;
//!
//! let hire = ItemDraft::cost("Engineer", dec!(180000), 3).validate().unwrap();
//! let plan = ScenarioSnapshot::from_items(ScenarioIdentity::new("Seed"), None, vec![hire]).unwrap();
//! let metrics = PortfolioAggregator::aggregate_snapshot(&plan, Default::default()).unwrap();
//! assert_eq!(metrics.total_costs, dec!(150000));
//! ```

pub mod cli;
pub mod config;
pub mod currency;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod narrative;
pub mod storage;
pub mod utils;

pub use errors::{EngineError, EngineResult, ValidationError};

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    init_with_directive(None);
}

/// Like [`init`], with an extra filter directive such as `scenario_core=debug`.
pub fn init_with_directive(directive: Option<&str>) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(directive);
        tracing::info!(
            version = utils::build_info::CLI_VERSION,
            "Scenario Core tracing initialized."
        );
    });
}
