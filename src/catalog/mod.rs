//! Catalog pipeline - source adapters, normalization, and filtering

pub mod filter;
pub mod normalize;
pub mod sources;
pub mod types;
pub mod utils;

pub use filter::FilterSpec;
pub use sources::{ListingSource, MockCatalog, RawListing, SaleApi};
pub use types::*;
