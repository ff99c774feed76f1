//! Column declarations, records, user overrides, and the column pipeline.

pub mod declaration;
pub mod overrides;
pub mod pipeline;
pub mod record;
pub mod value_enum;

pub use declaration::{
    ColumnDeclaration, ColumnTitle, FilterOption, FilterSpec, Fixed, TableType, TitleContext,
    ValueType, ValueTypeSpec,
};
pub use overrides::{loop_filter, ColumnOverrideMap, ColumnState};
pub use pipeline::{ColumnPipeline, ColumnPipelineOptions, ColumnsCache};
pub use record::{column_key, gen_columns, ColumnEmptyText, ColumnRecord, GenContext};
pub use value_enum::{parsing_text, ParsedText, Status, ValueEnum, ValueEnumEntry, ValueEnumSource};
