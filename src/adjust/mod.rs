//! Comparable-sales adjustment engine.
//!
//! Responsibilities:
//!
//! - listing timeline (days on market / until withdrawn / until expired)
//! - market-condition adjustment from trend and sale-to-list ratio
//! - weighted characteristic adjustments against a subject property
//! - batch orchestration (schema check, notices, parallel row mapping)

pub mod engine;
pub mod features;
pub mod market;

pub use engine::*;
pub use features::*;
pub use market::*;
