//! Fetch state, request composition, and the request collaborator.

use crate::error::FetchError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::future::Future;

/// Client-side bookkeeping field stripped before every request.
pub const TIMESTAMP_FIELD: &str = "_timestamp";

/// Default page size.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Smallest first.
    Ascend,
    /// Largest first.
    Descend,
}

/// Active sort per field.
pub type Sorters = BTreeMap<String, SortOrder>;

/// Selected filter values per field.
pub type Filters = BTreeMap<String, Vec<String>>;

/// Pagination descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based page number.
    pub current: u64,
    /// Rows per page.
    pub page_size: u64,
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            current: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Every input that triggers a fetch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FetchState {
    /// Pagination.
    pub page: PageInfo,
    /// Static query params supplied by the embedding application.
    pub params: Map<String, Value>,
    /// Submitted search form values.
    pub form_search: Map<String, Value>,
    /// Sorting.
    pub sorters: Sorters,
    /// Header filters.
    pub filters: Filters,
}

impl FetchState {
    /// Build the request from the latest value of every trigger.
    ///
    /// Page params are overlaid by form values, then by static params.
    /// [`TIMESTAMP_FIELD`] never reaches the request.
    pub fn compose(&self) -> FetchRequest {
        let mut params = Map::new();
        params.insert("current".to_owned(), Value::from(self.page.current));
        params.insert("pageSize".to_owned(), Value::from(self.page.page_size));
        for (key, value) in self.form_search.iter().chain(self.params.iter()) {
            params.insert(key.clone(), value.clone());
        }
        params.remove(TIMESTAMP_FIELD);

        FetchRequest {
            params,
            sorters: self.sorters.clone(),
            filters: self.filters.clone(),
        }
    }
}

/// Arguments handed to the request function.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FetchRequest {
    /// Merged query params.
    pub params: Map<String, Value>,
    /// Sorting.
    pub sorters: Sorters,
    /// Header filters.
    pub filters: Filters,
}

/// One page of rows as returned by the request function.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RowPage {
    /// Rows of the page.
    #[serde(default)]
    pub data: Vec<Value>,
    /// Total row count across pages.
    #[serde(default)]
    pub total: Option<u64>,
    /// `Some(false)` marks a failed response whose rows must be ignored.
    #[serde(default)]
    pub success: Option<bool>,
}

impl RowPage {
    /// Successful page.
    pub fn new(data: Vec<Value>) -> Self {
        Self {
            data,
            total: None,
            success: Some(true),
        }
    }

    /// Set the total row count.
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Decode a JSON response body.
    pub fn from_json(body: &str) -> Result<Self, FetchError> {
        serde_json::from_str(body).map_err(|err| FetchError::Decode(err.to_string()))
    }
}

/// Asynchronous row source supplied by the embedding application.
#[async_trait(?Send)]
pub trait RowRequest {
    /// Fetch one page for `request`.
    async fn request(&self, request: FetchRequest) -> Result<RowPage, FetchError>;
}

/// Adapts an async closure into a [`RowRequest`].
pub struct RequestFn<F>(pub F);

#[async_trait(?Send)]
impl<F, Fut> RowRequest for RequestFn<F>
where
    F: Fn(FetchRequest) -> Fut,
    Fut: Future<Output = Result<RowPage, FetchError>> + 'static,
{
    async fn request(&self, request: FetchRequest) -> Result<RowPage, FetchError> {
        (self.0)(request).await
    }
}
