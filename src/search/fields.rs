//! Search form fields, grid descriptor, and form value helpers.

use super::limits::SearchLayout;
use crate::column::{ColumnDeclaration, TableType};
use crate::path::omit;
use serde::Serialize;
use serde_json::{Map, Value};
use std::cmp::Reverse;

/// Form props that only apply in form mode.
pub const FORM_ONLY_PROPS: [&str; 2] = ["rules", "disabled"];

/// Columns that become search (or form) fields, highest `order` first.
///
/// Hidden columns for the mode, index columns, and columns without any
/// identity are left out. Columns with equal order keep declaration order.
pub fn search_columns(declarations: &[ColumnDeclaration], table_type: TableType) -> Vec<&ColumnDeclaration> {
    let is_form = table_type == TableType::Form;
    let mut fields: Vec<&ColumnDeclaration> = declarations
        .iter()
        .filter(|column| !(column.hide_in_search && !is_form))
        .filter(|column| !(column.hide_in_form && is_form))
        .filter(|column| !column.static_value_type().is_index())
        .filter(|column| column.identity().is_some())
        .collect();
    fields.sort_by_key(|column| Reverse(column.order.unwrap_or(0)));
    fields
}

/// Column count of the search grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GridCols {
    /// Same count at every width.
    Fixed(u32),
    /// Count per breakpoint.
    Responsive {
        /// Extra-small viewports.
        xs: u32,
        /// Small viewports.
        sm: u32,
        /// Medium and larger viewports.
        md: u32,
    },
}

/// Layout descriptor handed to the grid renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GridProps {
    /// Column count.
    pub cols: GridCols,
    /// Whether fields beyond the limit are collapsed.
    pub collapsed: bool,
}

/// Grid descriptor for the explicit `layout` and the table mode.
pub fn grid_props(layout: Option<SearchLayout>, table_type: TableType, collapsed: bool) -> GridProps {
    if layout == Some(SearchLayout::Vertical) {
        return GridProps {
            cols: GridCols::Fixed(1),
            collapsed,
        };
    }
    match table_type {
        TableType::Form => GridProps {
            cols: GridCols::Fixed(1),
            collapsed: false,
        },
        TableType::Table | TableType::List => GridProps {
            cols: GridCols::Responsive { xs: 1, sm: 2, md: 3 },
            collapsed,
        },
    }
}

/// Form props for the mode; validation props are dropped outside form mode.
pub fn form_props(props: &Map<String, Value>, table_type: TableType) -> Map<String, Value> {
    if table_type == TableType::Form {
        props.clone()
    } else {
        omit(props, &FORM_ONLY_PROPS)
    }
}

/// Number of fields holding a value: truthy scalars, non-empty arrays, and
/// non-empty objects.
pub fn active_filter_count(values: &Map<String, Value>) -> usize {
    values.values().filter(|value| has_value(value)).count()
}

fn has_value(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}
