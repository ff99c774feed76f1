//! Search form layout: responsive collapse limits, field list, grid
//! descriptor, and observe lifecycle.

pub mod fields;
pub mod limits;
pub mod responsive;
pub mod state;

pub use fields::{
    active_filter_count, form_props, grid_props, search_columns, GridCols, GridProps,
    FORM_ONLY_PROPS,
};
pub use limits::{grid_limit, inline_limit, resolved_layout, should_observe, SearchLayout};
pub use responsive::{ResponsiveState, ResponsiveValue};
pub use state::{SearchConfig, SearchFormState};
