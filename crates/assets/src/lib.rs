//! `AssetLocator` implementations.
//!
//! `PgAssetLocator` serves production from the Postgres scene catalog;
//! `MemoryAssetLocator` is a seedable fixture for tests and local runs.

pub mod memory;
pub mod pg;

pub use memory::MemoryAssetLocator;
pub use pg::PgAssetLocator;
