//! gridstate
//!
//! Reactive state core of a data-grid widget: column derivation with
//! persisted user overrides, the row fetch lifecycle, selection
//! reconciliation across pages, and responsive search-form limits.
//!
//! Everything here is single-threaded and driven by its owner. Values shared
//! with consumers are `Rc`s, and "unchanged" means the same `Rc` pointer.
//! Time is passed in explicitly where debouncing is involved.

pub mod breakpoint;
pub mod cache;
pub mod column;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod path;
pub mod persist;
pub mod search;
pub mod selection;

pub use error::{BreakpointError, FetchError, StorageError};
