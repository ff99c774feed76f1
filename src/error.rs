//! Error types for gridstate.
//!
//! Errors here describe failures of the external collaborators the core talks
//! to: key/value storage, the row request function, and the viewport source.
//!
//! # Error Recovery Strategy
//!
//! No condition in the pipelines is fatal. Collaborator failures are logged
//! through `tracing` and degraded to a safe default:
//!
//! - [`StorageError`] on read: persisted overrides are treated as empty
//! - [`StorageError`] on write: the stored key is removed
//! - [`FetchError`]: the previous rows are kept
//! - [`BreakpointError`]: limits are resolved once with an empty breakpoint set
//!
//! Only configuration loading and logging setup return errors to the caller.

use thiserror::Error;

/// Failures reported by a [`Storage`](crate::persist::Storage) backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The value does not fit in the remaining quota.
    #[error("storage quota exceeded writing {key:?} ({needed} bytes, {available} available)")]
    QuotaExceeded {
        /// Key that was being written.
        key: String,
        /// Bytes the write needed.
        needed: usize,
        /// Bytes still available.
        available: usize,
    },

    /// The backend is not reachable in this environment.
    #[error("storage backend unavailable")]
    Unavailable,

    /// Any other backend-specific failure.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Failures reported by a [`RowRequest`](crate::data::RowRequest).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request itself failed (transport, server error, ...).
    #[error("request failed: {0}")]
    Request(String),

    /// The response could not be turned into a row page.
    #[error("malformed response: {0}")]
    Decode(String),
}

/// Failures reported by a [`ViewportSource`](crate::breakpoint::ViewportSource).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BreakpointError {
    /// No viewport media-query capability (headless or non-browser context).
    #[error("viewport media queries unavailable")]
    Unavailable,
}
