//! Remote or static row data.

pub mod pipeline;
pub mod request;

pub use pipeline::{
    DataCache, DataPipeline, DataPipelineOptions, FetchOutcome, PendingFetch, Row,
    StaleResponsePolicy,
};
pub use request::{
    FetchRequest, FetchState, Filters, PageInfo, RequestFn, RowPage, RowRequest, SortOrder,
    Sorters, DEFAULT_PAGE_SIZE, TIMESTAMP_FIELD,
};
