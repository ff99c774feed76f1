//! Live column derivation with persisted user overrides.
//!
//! Every input change re-runs the same chain:
//!
//! declarations → records (`table_columns`) → overrides applied (`columns`)
//!
//! Both outputs pass through an [`EqualityGatedCache`] configured by the
//! `cache` option. Override changes are written back to storage on a
//! trailing-edge debounce; the owner drives the clock through
//! [`ColumnPipeline::tick`].

use super::declaration::{ColumnDeclaration, TableType};
use super::overrides::{
    loop_filter, parse_overrides, serialize_overrides, ColumnOverrideMap, ColumnState,
};
use super::record::{gen_columns, ColumnEmptyText, ColumnRecord, GenContext};
use crate::cache::{CacheOption, EqualityGatedCache};
use crate::persist::{Debouncer, PersistenceConfig, StorageBackends};
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Cache option applied to both column lists.
pub type ColumnsCache = CacheOption<Vec<ColumnRecord>>;

/// Construction options for a [`ColumnPipeline`].
#[derive(Debug, Clone)]
pub struct ColumnPipelineOptions {
    /// Grid mode.
    pub table_type: TableType,
    /// Empty-cell placeholder.
    pub empty_text: ColumnEmptyText,
    /// Gating for both column lists.
    pub cache: ColumnsCache,
    /// Where overrides are persisted.
    pub persistence: PersistenceConfig,
    /// Write-back delay.
    pub debounce: Duration,
}

impl Default for ColumnPipelineOptions {
    fn default() -> Self {
        Self {
            table_type: TableType::default(),
            empty_text: ColumnEmptyText::default(),
            cache: CacheOption::Unset,
            persistence: PersistenceConfig::default(),
            debounce: crate::persist::debounce::DEFAULT_DEBOUNCE,
        }
    }
}

type PendingWrite = (PersistenceConfig, ColumnOverrideMap);

/// Derives render-ready columns from declarations and user overrides.
pub struct ColumnPipeline {
    declarations: Vec<ColumnDeclaration>,
    context: GenContext,
    cache: ColumnsCache,
    overrides: ColumnOverrideMap,
    persistence: PersistenceConfig,
    backends: StorageBackends,
    table_columns: EqualityGatedCache<Vec<ColumnRecord>>,
    columns: EqualityGatedCache<Vec<ColumnRecord>>,
    writer: Debouncer<PendingWrite>,
}

impl ColumnPipeline {
    /// Mount a pipeline: load persisted overrides and derive both lists.
    pub fn new(
        declarations: Vec<ColumnDeclaration>,
        options: ColumnPipelineOptions,
        backends: StorageBackends,
    ) -> Self {
        let overrides = load_overrides(&options.persistence, &backends);
        let mut pipeline = Self {
            declarations,
            context: GenContext {
                table_type: options.table_type,
                empty_text: options.empty_text,
            },
            table_columns: EqualityGatedCache::new(Vec::new(), &options.cache),
            columns: EqualityGatedCache::new(Vec::new(), &options.cache),
            cache: options.cache,
            overrides,
            persistence: options.persistence,
            backends,
            writer: Debouncer::new(options.debounce),
        };
        pipeline.recompute();
        pipeline
    }

    /// Records before overrides are applied.
    pub fn table_columns(&self) -> Rc<Vec<ColumnRecord>> {
        self.table_columns.current()
    }

    /// Records after overrides are applied.
    pub fn columns(&self) -> Rc<Vec<ColumnRecord>> {
        self.columns.current()
    }

    /// Current override map.
    pub fn columns_map(&self) -> &ColumnOverrideMap {
        &self.overrides
    }

    /// Current cache option.
    pub fn cache(&self) -> &ColumnsCache {
        &self.cache
    }

    /// Current persistence configuration.
    pub fn persistence(&self) -> &PersistenceConfig {
        &self.persistence
    }

    /// Whether a storage write is waiting for the debounce window.
    pub fn has_pending_write(&self) -> bool {
        self.writer.is_pending()
    }

    /// Replace the column declarations.
    pub fn set_declarations(&mut self, declarations: Vec<ColumnDeclaration>) {
        self.declarations = declarations;
        self.recompute();
    }

    /// Change the grid mode.
    pub fn set_table_type(&mut self, table_type: TableType) {
        if self.context.table_type != table_type {
            self.context.table_type = table_type;
            self.recompute();
        }
    }

    /// Change the empty-cell placeholder.
    pub fn set_empty_text(&mut self, empty_text: ColumnEmptyText) {
        if self.context.empty_text != empty_text {
            self.context.empty_text = empty_text;
            self.recompute();
        }
    }

    /// Change the cache option; both lists are re-gated.
    pub fn set_cache(&mut self, cache: ColumnsCache) {
        self.table_columns.reconfigure(&cache);
        self.columns.reconfigure(&cache);
        self.cache = cache;
    }

    /// Change where overrides are persisted.
    ///
    /// Overrides are reloaded from the new location (or cleared when
    /// persistence is now disabled) and a write-back is scheduled.
    pub fn set_persistence(&mut self, persistence: PersistenceConfig, now: Instant) {
        if self.persistence == persistence {
            return;
        }
        self.overrides = load_overrides(&persistence, &self.backends);
        self.persistence = persistence;
        self.recompute();
        self.schedule_write(now);
    }

    /// Replace the whole override map.
    pub fn set_columns_map(&mut self, overrides: ColumnOverrideMap, now: Instant) {
        if self.overrides == overrides {
            return;
        }
        self.overrides = overrides;
        self.recompute();
        self.schedule_write(now);
    }

    /// Set the override for one column.
    pub fn set_column_state(&mut self, key: &str, state: ColumnState, now: Instant) {
        let mut overrides = self.overrides.clone();
        overrides.insert(key.to_owned(), state);
        self.set_columns_map(overrides, now);
    }

    /// Flip the visibility of one column.
    pub fn toggle_visibility(&mut self, key: &str, now: Instant) {
        let mut state = self.overrides.get(key).copied().unwrap_or_default();
        state.show = Some(!state.is_shown());
        self.set_column_state(key, state, now);
    }

    /// Drop every override.
    pub fn reset_columns_map(&mut self, now: Instant) {
        self.set_columns_map(ColumnOverrideMap::new(), now);
    }

    /// Perform the pending write once the debounce window has elapsed.
    ///
    /// Returns whether a write was attempted.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.writer.poll(now) {
            Some((persistence, overrides)) => {
                persist_overrides(&persistence, &overrides, &self.backends);
                true
            }
            None => false,
        }
    }

    /// Perform the pending write immediately.
    pub fn flush(&mut self) -> bool {
        match self.writer.flush() {
            Some((persistence, overrides)) => {
                persist_overrides(&persistence, &overrides, &self.backends);
                true
            }
            None => false,
        }
    }

    /// Teardown: cancel any pending write.
    pub fn dispose(&mut self) {
        if self.writer.cancel() {
            tracing::debug!("cancelled pending column override write");
        }
    }

    fn schedule_write(&mut self, now: Instant) {
        self.writer
            .schedule(now, (self.persistence.clone(), self.overrides.clone()));
    }

    fn recompute(&mut self) {
        let table = Rc::new(gen_columns(&self.declarations, &self.context));
        let live = if self.overrides.is_empty() {
            Rc::clone(&table)
        } else {
            Rc::new(loop_filter(&table, &self.overrides))
        };
        self.table_columns.offer_shared(table);
        self.columns.offer_shared(live);
    }
}

impl Drop for ColumnPipeline {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Read the override map from storage.
///
/// No persistence target, a missing backend, an empty value, a read failure,
/// or malformed JSON all yield an empty map.
pub fn load_overrides(persistence: &PersistenceConfig, backends: &StorageBackends) -> ColumnOverrideMap {
    let Some((key, kind)) = persistence.target() else {
        return ColumnOverrideMap::new();
    };
    let Some(storage) = backends.get(kind) else {
        return ColumnOverrideMap::new();
    };

    let raw = match storage.get_item(key) {
        Ok(Some(raw)) if !raw.is_empty() => raw,
        Ok(_) => return ColumnOverrideMap::new(),
        Err(err) => {
            tracing::warn!(key, error = %err, "failed to read column overrides");
            return ColumnOverrideMap::new();
        }
    };

    parse_overrides(&raw).unwrap_or_else(|err| {
        tracing::warn!(key, error = %err, "ignoring malformed column overrides");
        ColumnOverrideMap::new()
    })
}

/// Write the override map to storage.
///
/// On any failure the key is removed instead of leaving a partial value.
pub fn persist_overrides(
    persistence: &PersistenceConfig,
    overrides: &ColumnOverrideMap,
    backends: &StorageBackends,
) {
    let Some((key, kind)) = persistence.target() else {
        return;
    };
    let Some(storage) = backends.get(kind) else {
        return;
    };

    let result = serialize_overrides(overrides)
        .map_err(|err| err.to_string())
        .and_then(|json| storage.set_item(key, &json).map_err(|err| err.to_string()));

    if let Err(error) = result {
        tracing::warn!(key, %error, "failed to persist column overrides, removing key");
        storage.remove_item(key);
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
