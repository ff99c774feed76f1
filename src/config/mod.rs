//! Configuration module.
//!
//! [`ResolvedConfig`] holds crate-wide defaults; the builders here turn it
//! into the option structs the pipelines take.

pub mod loader;

pub use loader::{
    apply_env_overrides, default_config_path, default_log_path, load_config_file,
    load_config_with_precedence, merge_config, resolve, ConfigError, ConfigFile, ResolvedConfig,
};

use crate::breakpoint::{BreakpointObserver, ViewportSource};
use crate::cache::CacheOption;
use crate::column::ColumnPipelineOptions;
use crate::data::{DataPipelineOptions, PageInfo};
use crate::path::PathAccessor;

impl ResolvedConfig {
    /// Column pipeline options with the configured cache and debounce.
    pub fn column_options(&self) -> ColumnPipelineOptions {
        ColumnPipelineOptions {
            cache: CacheOption::Flag(self.columns_cache),
            debounce: self.persistence_debounce,
            ..ColumnPipelineOptions::default()
        }
    }

    /// Data pipeline options with the configured cache, page size, and
    /// stale response policy.
    pub fn data_options(&self) -> DataPipelineOptions {
        DataPipelineOptions {
            data_cache: CacheOption::Flag(self.data_cache),
            page: PageInfo {
                current: 1,
                page_size: self.default_page_size,
            },
            stale_responses: self.stale_responses,
            ..DataPipelineOptions::default()
        }
    }

    /// Path accessor with the configured cache bound.
    pub fn path_accessor(&self) -> PathAccessor {
        PathAccessor::with_capacity(self.path_cache_capacity)
    }

    /// Breakpoint observer over `source` with the configured thresholds.
    pub fn breakpoint_observer(&self, source: impl ViewportSource + 'static) -> BreakpointObserver {
        BreakpointObserver::with_thresholds(source, self.breakpoints)
    }
}
