//! Internal column records derived from declarations.

use super::declaration::{
    ColumnDeclaration, ColumnTitle, FilterOption, FilterSpec, Fixed, TableType, ValueTypeSpec,
};
use super::value_enum::ValueEnum;
use serde_json::{Map, Value};

/// Width given to pinned columns that declare none.
pub const FIXED_COLUMN_WIDTH: u32 = 200;

/// Placeholder rendered for empty cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnEmptyText {
    /// Show this text.
    Text(String),
    /// Leave empty cells blank.
    Disabled,
}

impl Default for ColumnEmptyText {
    fn default() -> Self {
        ColumnEmptyText::Text("-".to_owned())
    }
}

/// Inputs shared by every record of one generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GenContext {
    /// Grid mode.
    pub table_type: TableType,
    /// Empty-cell placeholder.
    pub empty_text: ColumnEmptyText,
}

/// Render-ready column.
///
/// Titles and value types stay unevaluated; renderers resolve them per cell.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRecord {
    /// Identity key used by the override map.
    pub key: String,
    /// Position among its siblings after `hide_in_table` filtering.
    pub index: usize,
    /// Path of the cell value.
    pub data_index: Option<String>,
    /// Unevaluated title.
    pub title: Option<ColumnTitle>,
    /// Unevaluated value type.
    pub value_type: ValueTypeSpec,
    /// Enumerated values.
    pub value_enum: Option<ValueEnum>,
    /// Header filter choices.
    pub filters: Vec<FilterOption>,
    /// Pinned side.
    pub fixed: Option<Fixed>,
    /// Width in pixels.
    pub width: Option<u32>,
    /// Truncate long text.
    pub ellipsis: bool,
    /// Copy affordance.
    pub copyable: bool,
    /// Search-form ordering weight.
    pub order: Option<i64>,
    /// Empty-cell placeholder.
    pub empty_text: ColumnEmptyText,
    /// Free-form renderer props.
    pub field_props: Map<String, Value>,
    /// Nested records.
    pub children: Vec<ColumnRecord>,
}

/// Identity key of the column at `index`.
///
/// Explicit key, else data index, else the position (prefixed by the parent
/// key for nested columns).
pub fn column_key(declaration: &ColumnDeclaration, index: usize, parent: Option<&str>) -> String {
    match (declaration.identity(), parent) {
        (Some(identity), _) => identity.to_owned(),
        (None, Some(parent)) => format!("{parent}-{index}"),
        (None, None) => index.to_string(),
    }
}

/// Expand declarations into records, dropping `hide_in_table` columns.
pub fn gen_columns(declarations: &[ColumnDeclaration], context: &GenContext) -> Vec<ColumnRecord> {
    gen_level(declarations, context, None)
}

fn gen_level(
    declarations: &[ColumnDeclaration],
    context: &GenContext,
    parent: Option<&str>,
) -> Vec<ColumnRecord> {
    declarations
        .iter()
        .filter(|declaration| !declaration.hide_in_table)
        .enumerate()
        .map(|(index, declaration)| gen_record(declaration, index, context, parent))
        .collect()
}

fn gen_record(
    declaration: &ColumnDeclaration,
    index: usize,
    context: &GenContext,
    parent: Option<&str>,
) -> ColumnRecord {
    let key = column_key(declaration, index, parent);

    let filters = match &declaration.filters {
        FilterSpec::None => Vec::new(),
        FilterSpec::Auto => declaration
            .value_enum
            .as_ref()
            .map(ValueEnum::to_filter_options)
            .unwrap_or_default(),
        FilterSpec::Options(options) => options.clone(),
    };

    let width = declaration
        .width
        .or(declaration.fixed.map(|_| FIXED_COLUMN_WIDTH));

    let children = gen_level(&declaration.children, context, Some(&key));

    ColumnRecord {
        index,
        data_index: declaration.data_index.clone(),
        title: declaration.title.clone(),
        value_type: declaration.value_type.clone().unwrap_or_default(),
        value_enum: declaration.value_enum.clone(),
        filters,
        fixed: declaration.fixed,
        width,
        ellipsis: declaration.ellipsis,
        copyable: declaration.copyable,
        order: declaration.order,
        empty_text: context.empty_text.clone(),
        field_props: declaration.field_props.clone(),
        children,
        key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::value_enum::{ValueEnum, ValueEnumEntry};

    #[test]
    fn key_prefers_explicit_key_then_data_index_then_position() {
        let keyed = ColumnDeclaration::new("name").with_key("k");
        let indexed = ColumnDeclaration::new("name");
        let bare = ColumnDeclaration::default();

        assert_eq!(column_key(&keyed, 0, None), "k");
        assert_eq!(column_key(&indexed, 0, None), "name");
        assert_eq!(column_key(&bare, 3, None), "3");
        assert_eq!(column_key(&bare, 1, Some("group")), "group-1");
    }

    #[test]
    fn hidden_in_table_columns_are_dropped_and_indexes_compacted() {
        let records = gen_columns(
            &[
                ColumnDeclaration::new("a").hidden_in_table(),
                ColumnDeclaration::new("b"),
            ],
            &GenContext::default(),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].key, "b");
        assert_eq!(records[0].index, 0);
    }

    #[test]
    fn fixed_column_gets_default_width() {
        let records = gen_columns(
            &[
                ColumnDeclaration::new("a").with_fixed(Fixed::Left),
                ColumnDeclaration::new("b")
                    .with_fixed(Fixed::Right)
                    .with_width(80),
            ],
            &GenContext::default(),
        );
        assert_eq!(records[0].width, Some(FIXED_COLUMN_WIDTH));
        assert_eq!(records[1].width, Some(80));
    }

    #[test]
    fn auto_filters_come_from_value_enum() {
        let value_enum = ValueEnum::from_pairs([
            ("all", ValueEnumEntry::text("All")),
            ("on", ValueEnumEntry::text("On")),
        ]);
        let records = gen_columns(
            &[ColumnDeclaration::new("state")
                .with_value_enum(value_enum)
                .with_filters(FilterSpec::Auto)],
            &GenContext::default(),
        );
        assert_eq!(
            records[0].filters,
            vec![FilterOption {
                text: "On".into(),
                value: "on".into()
            }]
        );
    }

    #[test]
    fn children_are_expanded_with_parent_prefixed_keys() {
        let records = gen_columns(
            &[ColumnDeclaration::keyed("group").with_children(vec![
                ColumnDeclaration::default(),
                ColumnDeclaration::new("leaf"),
            ])],
            &GenContext::default(),
        );
        let keys: Vec<_> = records[0].children.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["group-0", "leaf"]);
    }

    #[test]
    fn records_carry_empty_text_from_context() {
        let context = GenContext {
            empty_text: ColumnEmptyText::Disabled,
            ..GenContext::default()
        };
        let records = gen_columns(&[ColumnDeclaration::new("a")], &context);
        assert_eq!(records[0].empty_text, ColumnEmptyText::Disabled);
    }
}
