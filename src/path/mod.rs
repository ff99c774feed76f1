//! Dotted/bracketed property paths into nested JSON values.
//!
//! A path such as `a.b[0].c` is normalized to the segment list
//! `["a", "b", "0", "c"]`. Normalization is memoized per raw path string in a
//! bounded [`PathCache`] that is cleared wholesale once it grows past its
//! capacity.
//!
//! Both [`PathAccessor::get`] and [`PathAccessor::set`] fail softly: a missing
//! branch, a non-container intermediate, or an empty segment yields `None`
//! (for `get`) or leaves the root untouched (for `set`). `set` never creates
//! missing branches.

use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Default number of normalized paths kept before the cache is reset.
pub const DEFAULT_PATH_CACHE_CAPACITY: usize = 1000;

/// Normalize a raw path into its segments.
///
/// `[word]` groups (ASCII alphanumerics and `_`) are rewritten to `.word`,
/// then the string is split on `.`. Empty segments are kept; traversal
/// rejects them.
pub fn normalize_path(raw: &str) -> Vec<String> {
    let mut flat = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(open) = rest.find('[') {
        flat.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(']') {
            Some(close) if close > 0 && after[..close].chars().all(is_word_char) => {
                flat.push('.');
                flat.push_str(&after[..close]);
                rest = &after[close + 1..];
            }
            _ => {
                flat.push('[');
                rest = after;
            }
        }
    }
    flat.push_str(rest);

    flat.split('.').map(str::to_owned).collect()
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Single-segment paths skip normalization and the cache.
fn is_simple(path: &str) -> bool {
    !path.contains('.') && !path.contains('[')
}

// ===== PathCache =====

/// Memo of normalized paths.
///
/// Cleared entirely (not LRU-evicted) when an insertion pushes it past
/// `capacity`, so `len()` never exceeds `capacity` between calls.
#[derive(Debug, Clone)]
pub struct PathCache {
    entries: HashMap<String, Rc<[String]>>,
    capacity: usize,
}

impl PathCache {
    /// Create an empty cache holding at most `capacity` paths.
    ///
    /// A capacity of 0 uses [`DEFAULT_PATH_CACHE_CAPACITY`].
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_PATH_CACHE_CAPACITY
        } else {
            capacity
        };
        Self {
            entries: HashMap::new(),
            capacity,
        }
    }

    /// Return the cached segments for `raw`, normalizing on a miss.
    pub fn segments(&mut self, raw: &str) -> Rc<[String]> {
        if let Some(hit) = self.entries.get(raw) {
            return Rc::clone(hit);
        }

        let segments: Rc<[String]> = normalize_path(raw).into();
        self.entries.insert(raw.to_owned(), Rc::clone(&segments));
        if self.entries.len() > self.capacity {
            tracing::trace!(capacity = self.capacity, "path cache full, clearing");
            self.entries.clear();
        }
        segments
    }

    /// Number of memoized paths.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no paths are memoized.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of memoized paths.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every memoized path.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new(DEFAULT_PATH_CACHE_CAPACITY)
    }
}

// ===== PathAccessor =====

/// Reads and writes nested values by path.
///
/// One accessor is meant to be shared (behind an `Rc`) by every pipeline of a
/// grid so they share a single normalization cache. Tests build a fresh one.
#[derive(Debug, Default)]
pub struct PathAccessor {
    cache: RefCell<PathCache>,
}

impl PathAccessor {
    /// Accessor with the default cache capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accessor whose cache holds at most `capacity` paths.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cache: RefCell::new(PathCache::new(capacity)),
        }
    }

    /// Number of paths currently memoized.
    pub fn cached_paths(&self) -> usize {
        self.cache.borrow().len()
    }

    /// Read the value at `path`.
    ///
    /// Returns `None` for a null root, an empty path, a missing branch, a
    /// scalar intermediate, or an empty segment. The final value is returned
    /// as is and may itself be a container.
    pub fn get<'a>(&self, root: &'a Value, path: &str) -> Option<&'a Value> {
        if root.is_null() || path.is_empty() {
            return None;
        }
        if is_simple(path) {
            return child(root, path);
        }

        let segments = self.cache.borrow_mut().segments(path);
        let mut cursor = root;
        for segment in segments.iter() {
            if segment.is_empty() {
                return None;
            }
            cursor = child(cursor, segment)?;
        }
        Some(cursor)
    }

    /// Write `value` at `path`.
    ///
    /// Every intermediate segment must already resolve to an object or array;
    /// otherwise nothing is written. Missing branches are never created.
    pub fn set(&self, root: &mut Value, path: &str, value: Value) {
        if root.is_null() || path.is_empty() {
            return;
        }

        let segments = if is_simple(path) {
            Rc::from(vec![path.to_owned()])
        } else {
            self.cache.borrow_mut().segments(path)
        };
        if segments.iter().any(String::is_empty) {
            return;
        }
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut cursor = root;
        for segment in parents {
            match child_mut(cursor, segment) {
                Some(next) => cursor = next,
                None => return,
            }
        }
        assign(cursor, last, value);
    }
}

fn child<'a>(container: &'a Value, segment: &str) -> Option<&'a Value> {
    match container {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn child_mut<'a>(container: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match container {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(move |i| items.get_mut(i)),
        _ => None,
    }
}

fn assign(container: &mut Value, segment: &str, value: Value) {
    match container {
        Value::Object(map) => {
            map.insert(segment.to_owned(), value);
        }
        Value::Array(items) => match segment.parse::<usize>() {
            Ok(i) if i < items.len() => items[i] = value,
            Ok(i) if i == items.len() => items.push(value),
            _ => {}
        },
        _ => {}
    }
}

/// Copy of `object` without the listed top-level keys.
pub fn omit(object: &Map<String, Value>, keys: &[&str]) -> Map<String, Value> {
    object
        .iter()
        .filter(|(key, _)| !keys.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
