//! Selected-row reconciliation across data changes.
//!
//! The selection is driven by keys. Row objects are recovered from, in order:
//! the reconciler's own cache, the current data (children flattened), and
//! the previously published selection. A row that scrolls off the current
//! page therefore stays selected as the object last seen for its key.

use crate::cache::{CacheOption, EqualityGatedCache};
use crate::data::Row;
use crate::path::PathAccessor;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// Field holding nested child rows.
pub const CHILDREN_FIELD: &str = "children";

/// Stringified row identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowKey(String);

impl RowKey {
    /// Key from a field value. Only strings and numbers identify rows.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// The map-key form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RowKey {
    fn from(key: &str) -> Self {
        Self(key.to_owned())
    }
}

impl From<String> for RowKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<i64> for RowKey {
    fn from(key: i64) -> Self {
        Self(key.to_string())
    }
}

impl From<u64> for RowKey {
    fn from(key: u64) -> Self {
        Self(key.to_string())
    }
}

/// Index rows and all their descendants by key.
///
/// Rows whose key field is missing or not a string/number are skipped, but
/// their children are still visited.
pub fn flatten_children(rows: &[Row], row_key: &str, paths: &PathAccessor) -> HashMap<RowKey, Row> {
    let mut map = HashMap::new();
    collect(rows.iter().cloned(), row_key, paths, &mut map);
    map
}

fn collect(
    rows: impl Iterator<Item = Row>,
    row_key: &str,
    paths: &PathAccessor,
    map: &mut HashMap<RowKey, Row>,
) {
    for row in rows {
        let children: Vec<Row> = match row.get(CHILDREN_FIELD) {
            Some(Value::Array(children)) => children.iter().cloned().map(Rc::new).collect(),
            _ => Vec::new(),
        };
        let key = paths.get(&row, row_key).and_then(RowKey::from_value);
        if let Some(key) = key {
            map.entry(key).or_insert(row);
        }
        collect(children.into_iter(), row_key, paths, map);
    }
}

/// Inputs of one reconciliation pass.
#[derive(Debug, Clone, Copy)]
pub struct SelectionInput<'a> {
    /// Selected keys, in selection order.
    pub keys: &'a [RowKey],
    /// Current data source.
    pub data: &'a [Row],
    /// Row selection turned off for the grid.
    pub disabled: bool,
    /// A fetch is in flight.
    pub loading: bool,
}

/// Keeps `selected_rows` aligned with the selected keys.
pub struct SelectionReconciler {
    row_key: String,
    paths: Rc<PathAccessor>,
    cache: HashMap<RowKey, Row>,
    last_keys: Vec<RowKey>,
    selected_rows: EqualityGatedCache<Vec<Row>>,
}

impl SelectionReconciler {
    /// Reconciler identifying rows by the field at `row_key`.
    pub fn new(row_key: impl Into<String>, paths: Rc<PathAccessor>) -> Self {
        Self {
            row_key: row_key.into(),
            paths,
            cache: HashMap::new(),
            last_keys: Vec::new(),
            selected_rows: EqualityGatedCache::new(Vec::new(), &CacheOption::Flag(true)),
        }
    }

    /// Published selected rows, in key order.
    pub fn selected_rows(&self) -> Rc<Vec<Row>> {
        self.selected_rows.current()
    }

    /// Number of cached row objects.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Field path identifying rows.
    pub fn row_key(&self) -> &str {
        &self.row_key
    }

    /// Change the field path identifying rows.
    pub fn set_row_key(&mut self, row_key: impl Into<String>) {
        self.row_key = row_key.into();
    }

    /// Seed the selected rows from outside (controlled selection).
    pub fn set_selected_rows(&mut self, rows: Vec<Row>) -> bool {
        self.selected_rows.offer(rows)
    }

    /// Re-derive the selected rows. Returns whether the published array
    /// changed.
    pub fn reconcile(&mut self, input: SelectionInput<'_>) -> bool {
        if input.loading || input.disabled {
            return false;
        }

        if input.keys.is_empty() {
            self.last_keys.clear();
            self.cache.clear();
            if self.selected_rows.current().is_empty() {
                return false;
            }
            return self.selected_rows.offer(Vec::new());
        }

        let data_map = flatten_children(input.data, &self.row_key, &self.paths);
        let previous = self.selected_rows.current();
        let previous_map = flatten_children(&previous, &self.row_key, &self.paths);

        let last: HashSet<&RowKey> = self.last_keys.iter().collect();
        for key in input.keys.iter().filter(|key| !last.contains(key)) {
            if let Some(row) = data_map.get(key).or_else(|| previous_map.get(key)) {
                self.cache.insert(key.clone(), Rc::clone(row));
            }
        }

        let next: HashSet<&RowKey> = input.keys.iter().collect();
        for key in self.last_keys.iter().filter(|key| !next.contains(key)) {
            self.cache.remove(key);
        }

        let mut rows = Vec::with_capacity(input.keys.len());
        for key in input.keys {
            let found = self
                .cache
                .get(key)
                .or_else(|| data_map.get(key))
                .or_else(|| previous_map.get(key))
                .cloned();
            if let Some(row) = found {
                self.cache.insert(key.clone(), Rc::clone(&row));
                rows.push(row);
            }
        }

        self.last_keys = input.keys.to_vec();
        let changed = self.selected_rows.offer(rows);
        if changed {
            tracing::debug!(
                keys = input.keys.len(),
                rows = self.selected_rows.current().len(),
                "selection rows updated"
            );
        }
        changed
    }
}

impl fmt::Debug for SelectionReconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectionReconciler")
            .field("row_key", &self.row_key)
            .field("last_keys", &self.last_keys)
            .field("cached", &self.cache.len())
            .finish()
    }
}
