//! nestview - property catalog normalization and filtering engine
//!
//! Raw listings flow from source adapters through the normalizer into one
//! canonical shape, the filter engine evaluates the session's constraints
//! over it, and the view coordinator reconciles both with the favorites
//! store into a renderable result sequence.

pub mod catalog;
pub mod coordinator;
pub mod error;
pub mod favorites;
pub mod storage;

pub use catalog::{FilterSpec, ListingSource, MockCatalog, Property, SaleApi, ViewMode};
pub use coordinator::{CatalogState, ViewCoordinator};
pub use error::CatalogError;
pub use favorites::FavoritesStore;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
