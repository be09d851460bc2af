//! Error taxonomy for the catalog core
//!
//! None of these are fatal to a browsing session; every failure mode has a
//! local recovery path (empty sequence, defaulted field, retained in-memory
//! state) and the error value exists so callers can log or surface a retry.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// A source adapter could not produce records (transport failure or
    /// non-2xx response). Recovered as an empty sequence at the adapter
    /// boundary; the coordinator surfaces it as a retryable failed load.
    #[error("source '{source_name}' unavailable: {reason}")]
    SourceUnavailable {
        source_name: &'static str,
        reason: String,
    },

    /// A raw record failed schema expectations for specific fields.
    /// Recovered per-field via defaulting; never aborts a batch.
    #[error("malformed record {id}: {field}: {reason}")]
    MalformedRecord {
        id: String,
        field: &'static str,
        reason: String,
    },

    /// Durable client storage read or write failed. Reads recover as
    /// empty; writes are logged and the in-memory effect stands.
    #[error("storage unavailable for key '{key}': {reason}")]
    StorageUnavailable { key: String, reason: String },

    /// A user-entered filter bound did not parse. Recovered by
    /// substituting the nearest valid default.
    #[error("invalid filter input '{input}' for {field}")]
    InvalidFilterInput { field: &'static str, input: String },
}
