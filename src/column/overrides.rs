//! User column overrides (visibility, order, pinning) and their JSON form.

use super::declaration::Fixed;
use super::record::ColumnRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Override for one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnState {
    /// `Some(false)` hides the column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show: Option<bool>,
    /// Position among siblings; lower comes first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Pinned side replacing the declared one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed: Option<Fixed>,
}

impl ColumnState {
    /// State that only sets visibility.
    pub fn visible(show: bool) -> Self {
        Self {
            show: Some(show),
            ..Self::default()
        }
    }

    /// Whether the column is shown (visible unless explicitly hidden).
    pub fn is_shown(&self) -> bool {
        self.show != Some(false)
    }
}

/// Overrides keyed by column identity key.
pub type ColumnOverrideMap = BTreeMap<String, ColumnState>;

/// Parse a persisted override map.
pub fn parse_overrides(raw: &str) -> Result<ColumnOverrideMap, serde_json::Error> {
    serde_json::from_str(raw)
}

/// Serialize an override map for storage.
pub fn serialize_overrides(overrides: &ColumnOverrideMap) -> Result<String, serde_json::Error> {
    serde_json::to_string(overrides)
}

/// Apply overrides to a column tree.
///
/// Hidden columns are removed, pinning is replaced, and siblings are stably
/// sorted by their override order (columns without one use their index).
pub fn loop_filter(columns: &[ColumnRecord], overrides: &ColumnOverrideMap) -> Vec<ColumnRecord> {
    let mut kept: Vec<(i64, ColumnRecord)> = columns
        .iter()
        .filter_map(|column| {
            let state = overrides.get(&column.key).copied().unwrap_or_default();
            if !state.is_shown() {
                return None;
            }

            let mut column = column.clone();
            if state.fixed.is_some() {
                column.fixed = state.fixed;
            }
            if !column.children.is_empty() {
                column.children = loop_filter(&column.children, overrides);
            }
            let rank = state.order.unwrap_or(column.index as i64);
            Some((rank, column))
        })
        .collect();

    kept.sort_by_key(|(rank, _)| *rank);
    kept.into_iter().map(|(_, column)| column).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::declaration::ColumnDeclaration;
    use crate::column::record::{gen_columns, GenContext};

    fn records() -> Vec<ColumnRecord> {
        gen_columns(
            &[
                ColumnDeclaration::new("id"),
                ColumnDeclaration::new("name"),
                ColumnDeclaration::keyed("group").with_children(vec![
                    ColumnDeclaration::new("city"),
                    ColumnDeclaration::new("zip"),
                ]),
            ],
            &GenContext::default(),
        )
    }

    fn keys(columns: &[ColumnRecord]) -> Vec<&str> {
        columns.iter().map(|c| c.key.as_str()).collect()
    }

    #[test]
    fn hidden_columns_are_removed_at_any_depth() {
        let mut overrides = ColumnOverrideMap::new();
        overrides.insert("name".into(), ColumnState::visible(false));
        overrides.insert("zip".into(), ColumnState::visible(false));

        let filtered = loop_filter(&records(), &overrides);
        assert_eq!(keys(&filtered), vec!["id", "group"]);
        assert_eq!(keys(&filtered[1].children), vec!["city"]);
    }

    #[test]
    fn order_override_reorders_siblings() {
        let mut overrides = ColumnOverrideMap::new();
        overrides.insert(
            "group".into(),
            ColumnState {
                order: Some(-1),
                ..ColumnState::default()
            },
        );

        let filtered = loop_filter(&records(), &overrides);
        assert_eq!(keys(&filtered), vec!["group", "id", "name"]);
    }

    #[test]
    fn fixed_override_replaces_declared_side() {
        let mut overrides = ColumnOverrideMap::new();
        overrides.insert(
            "id".into(),
            ColumnState {
                fixed: Some(Fixed::Left),
                ..ColumnState::default()
            },
        );
        let filtered = loop_filter(&records(), &overrides);
        assert_eq!(filtered[0].fixed, Some(Fixed::Left));
    }

    #[test]
    fn serialized_map_omits_unset_fields() {
        let mut overrides = ColumnOverrideMap::new();
        overrides.insert("age".into(), ColumnState::visible(false));
        let json = serialize_overrides(&overrides).unwrap();
        insta::assert_snapshot!(json, @r#"{"age":{"show":false}}"#);
    }

    #[test]
    fn parse_rejects_malformed_json() {
        assert!(parse_overrides("{not json").is_err());
        assert_eq!(parse_overrides("{}").unwrap(), ColumnOverrideMap::new());
    }
}
