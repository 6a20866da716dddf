//! Input/output helpers.
//!
//! - CSV ingest + validation (`ingest`)
//! - row filters (`filter`)
//! - subject/weight JSON (`subject`)
//! - adjusted CSV export (`export`)
//! - summary JSON export (`summary`)

pub mod export;
pub mod filter;
pub mod ingest;
pub mod subject;
pub mod summary;

pub use export::*;
pub use filter::*;
pub use ingest::*;
pub use subject::*;
pub use summary::*;
