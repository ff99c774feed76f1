//! Collapse limits of the search form as a function of the viewport.
//!
//! A limit is the number of search fields shown before the rest collapse
//! behind an "expand" toggle. Every function here is pure.

use crate::breakpoint::{Breakpoint, BreakpointSet};
use crate::column::TableType;
use serde::{Deserialize, Serialize};

/// Search form layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchLayout {
    /// Fields in one row.
    Inline,
    /// Label beside field, responsive grid.
    Horizontal,
    /// Label above field, single column.
    Vertical,
}

/// Limit for the inline layout.
pub fn inline_limit(screens: &BreakpointSet) -> usize {
    use Breakpoint::*;
    if screens.is_active(Xxl) {
        5
    } else if screens.is_active(Xl) {
        4
    } else if screens.is_active(Lg) || screens.is_active(Md) {
        3
    } else if screens.is_active(Sm) {
        2
    } else {
        0
    }
}

/// Limit for the grid layouts.
pub fn grid_limit(screens: &BreakpointSet, layout: SearchLayout) -> usize {
    use Breakpoint::*;
    let any = |set: &[Breakpoint]| set.iter().any(|bp| screens.is_active(*bp));

    if layout == SearchLayout::Vertical {
        return usize::from(any(&[Xxl, Xl, Lg, Md, Sm]));
    }
    if any(&[Xxl, Xl, Lg, Md]) {
        2
    } else if screens.is_active(Sm) {
        1
    } else {
        0
    }
}

/// Explicit layout, else vertical in form mode and horizontal otherwise.
pub fn resolved_layout(layout: Option<SearchLayout>, table_type: TableType) -> SearchLayout {
    layout.unwrap_or(match table_type {
        TableType::Form => SearchLayout::Vertical,
        TableType::Table | TableType::List => SearchLayout::Horizontal,
    })
}

/// Whether limits depend on the viewport for this layout and mode.
pub fn should_observe(layout: SearchLayout, table_type: TableType) -> bool {
    match layout {
        SearchLayout::Inline => true,
        SearchLayout::Horizontal => table_type != TableType::Form,
        SearchLayout::Vertical => false,
    }
}
