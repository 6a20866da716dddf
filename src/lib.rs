//! `comp-adjust` library crate.
//!
//! The binary (`comps`) is a thin wrapper around this library so that:
//!
//! - the adjustment engine is testable without spawning processes
//! - the engine can be called from other tools with an in-memory batch
//! - code stays easy to navigate as the project grows

pub mod adjust;
pub mod app;
pub mod cli;
pub mod domain;
pub mod error;
pub mod io;
pub mod plot;
pub mod report;
