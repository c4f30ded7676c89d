//! Core types for workboard list controllers
//!
//! This crate contains the pure data side of the list/query controller:
//! query state, pagination metadata, the record contract, and the URL
//! parameter round-trip. It has no I/O and no runtime dependencies.

mod constants;
mod page;
pub mod params;
mod query;
mod record;

pub use constants::*;
pub use page::*;
pub use query::*;
pub use record::*;
