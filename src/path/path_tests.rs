//! Tests for path normalization and the path accessor.

use super::*;
use serde_json::json;

// ===== normalize_path =====

#[test]
fn normalize_rewrites_brackets_to_dots() {
    assert_eq!(normalize_path("a.b[0].c"), vec!["a", "b", "0", "c"]);
}

#[test]
fn normalize_keeps_non_word_brackets() {
    assert_eq!(normalize_path("a[b-c]"), vec!["a[b-c]"]);
}

#[test]
fn normalize_nested_brackets_rewrites_inner_only() {
    assert_eq!(normalize_path("[[0]]"), vec!["[", "0]"]);
}

#[test]
fn normalize_leading_bracket_yields_empty_first_segment() {
    assert_eq!(normalize_path("[0]"), vec!["", "0"]);
}

// ===== get =====

#[test]
fn get_reads_nested_object_and_array() {
    let accessor = PathAccessor::new();
    let root = json!({"a": {"b": [{"c": 7}]}});
    assert_eq!(accessor.get(&root, "a.b[0].c"), Some(&json!(7)));
}

#[test]
fn get_simple_path_skips_cache() {
    let accessor = PathAccessor::new();
    let root = json!({"name": "x"});
    assert_eq!(accessor.get(&root, "name"), Some(&json!("x")));
    assert_eq!(accessor.cached_paths(), 0);
}

#[test]
fn get_complex_path_populates_cache_once() {
    let accessor = PathAccessor::new();
    let root = json!({"a": {"b": 1}});
    accessor.get(&root, "a.b");
    accessor.get(&root, "a.b");
    assert_eq!(accessor.cached_paths(), 1);
}

#[test]
fn get_returns_container_at_final_segment() {
    let accessor = PathAccessor::new();
    let root = json!({"a": {"b": {"c": 1}}});
    assert_eq!(accessor.get(&root, "a.b"), Some(&json!({"c": 1})));
}

#[test]
fn get_fails_softly_on_scalar_intermediate() {
    let accessor = PathAccessor::new();
    let root = json!({"a": 3});
    assert_eq!(accessor.get(&root, "a.b"), None);
}

#[test]
fn get_fails_softly_on_missing_branch() {
    let accessor = PathAccessor::new();
    let root = json!({"a": {}});
    assert_eq!(accessor.get(&root, "a.x.y"), None);
}

#[test]
fn get_rejects_empty_segment() {
    let accessor = PathAccessor::new();
    let root = json!({"a": {"": {"b": 1}}});
    assert_eq!(accessor.get(&root, "a..b"), None);
}

#[test]
fn get_rejects_null_root_and_empty_path() {
    let accessor = PathAccessor::new();
    assert_eq!(accessor.get(&Value::Null, "a.b"), None);
    assert_eq!(accessor.get(&json!({"": 1}), ""), None);
}

#[test]
fn get_array_with_non_numeric_segment_is_none() {
    let accessor = PathAccessor::new();
    let root = json!({"list": [1, 2]});
    assert_eq!(accessor.get(&root, "list.length"), None);
}

// ===== set =====

#[test]
fn set_then_get_round_trips() {
    let accessor = PathAccessor::new();
    let mut root = json!({"a": {"b": [{"c": 1}]}});
    accessor.set(&mut root, "a.b[0].c", json!("new"));
    assert_eq!(accessor.get(&root, "a.b[0].c"), Some(&json!("new")));
}

#[test]
fn set_adds_leaf_key_on_existing_container() {
    let accessor = PathAccessor::new();
    let mut root = json!({"a": {}});
    accessor.set(&mut root, "a.fresh", json!(true));
    assert_eq!(root, json!({"a": {"fresh": true}}));
}

#[test]
fn set_into_missing_branch_is_noop() {
    let accessor = PathAccessor::new();
    let mut root = json!({"a": {}});
    let before = root.clone();
    accessor.set(&mut root, "a.missing.leaf", json!(1));
    assert_eq!(root, before, "set must not create missing branches");
}

#[test]
fn set_through_scalar_is_noop() {
    let accessor = PathAccessor::new();
    let mut root = json!({"a": 5});
    accessor.set(&mut root, "a.b", json!(1));
    assert_eq!(root, json!({"a": 5}));
}

#[test]
fn set_array_appends_at_len_only() {
    let accessor = PathAccessor::new();
    let mut root = json!({"xs": [1]});
    accessor.set(&mut root, "xs[1]", json!(2));
    accessor.set(&mut root, "xs[5]", json!(9));
    assert_eq!(root, json!({"xs": [1, 2]}));
}

// ===== PathCache =====

#[test]
fn cache_clears_wholesale_past_capacity() {
    let mut cache = PathCache::new(3);
    for i in 0..3 {
        cache.segments(&format!("p.{i}"));
    }
    assert_eq!(cache.len(), 3);

    cache.segments("p.3");
    assert_eq!(cache.len(), 0, "exceeding capacity resets the cache");
}

#[test]
fn cache_zero_capacity_uses_default() {
    assert_eq!(PathCache::new(0).capacity(), DEFAULT_PATH_CACHE_CAPACITY);
}

#[test]
fn lookups_stay_correct_after_reset() {
    let accessor = PathAccessor::with_capacity(2);
    let root = json!({"a": {"b": 1, "c": 2, "d": 3}});
    assert_eq!(accessor.get(&root, "a.b"), Some(&json!(1)));
    assert_eq!(accessor.get(&root, "a.c"), Some(&json!(2)));
    assert_eq!(accessor.get(&root, "a.d"), Some(&json!(3)));
    assert_eq!(accessor.get(&root, "a.b"), Some(&json!(1)));
    assert!(accessor.cached_paths() <= 2);
}

// ===== omit =====

#[test]
fn omit_drops_listed_keys() {
    let object = json!({"rules": [], "disabled": true, "layout": "inline"});
    let Value::Object(map) = object else {
        unreachable!()
    };
    let kept = omit(&map, &["rules", "disabled"]);
    assert_eq!(Value::Object(kept), json!({"layout": "inline"}));
}
