//! Fetch lifecycle and the equality-stabilized row array.
//!
//! Trigger changes only *schedule* fetches; the owner decides when to run
//! them. A fetch is split in two halves so that an external scheduler can
//! interleave them freely:
//!
//! 1. [`DataPipeline::begin_fetch`] composes the request from the latest
//!    trigger values and tags it with a generation number.
//! 2. [`DataPipeline::complete_fetch`] applies the response.
//!
//! [`DataPipeline::fetch`] runs both halves around the request collaborator.

use super::request::{FetchRequest, FetchState, Filters, PageInfo, RowPage, RowRequest, Sorters};
use crate::cache::{CacheOption, EqualityGatedCache};
use crate::error::FetchError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::rc::Rc;

/// A row object. Identity is the `Rc` pointer.
pub type Row = Rc<Value>;

/// Cache option for the row array (`dataCache`).
pub type DataCache = CacheOption<Vec<Row>>;

/// What to do with a response older than one already applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleResponsePolicy {
    /// Apply every response in arrival order.
    #[default]
    Apply,
    /// Discard responses overtaken by a newer one.
    Drop,
}

/// Construction options for a [`DataPipeline`].
#[derive(Debug, Clone, Default)]
pub struct DataPipelineOptions {
    /// Gating for the row array.
    pub data_cache: DataCache,
    /// Initial pagination.
    pub page: PageInfo,
    /// Initial static params.
    pub params: Map<String, Value>,
    /// Out-of-order response handling.
    pub stale_responses: StaleResponsePolicy,
}

/// A composed request waiting for its response.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingFetch {
    /// Monotonic tag, starting at 1.
    pub generation: u64,
    /// Request arguments.
    pub request: FetchRequest,
}

/// Result of applying one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Rows were applied (the published array may still be unchanged if
    /// gating found them equal).
    Applied,
    /// The response reported `success: false`; previous rows kept.
    Rejected,
    /// The request failed; previous rows kept.
    Failed,
    /// Overtaken by a newer response and dropped.
    Stale,
}

/// Orchestrates fetches and exposes the row array.
pub struct DataPipeline {
    request: Option<Rc<dyn RowRequest>>,
    state: FetchState,
    scheduled: usize,
    issued: u64,
    applied: u64,
    in_flight: usize,
    total: u64,
    stale_responses: StaleResponsePolicy,
    last_error: Option<FetchError>,
    rows: EqualityGatedCache<Vec<Row>>,
}

impl DataPipeline {
    /// Pipeline backed by a request function. The initial load is scheduled.
    pub fn with_request(request: Rc<dyn RowRequest>, options: DataPipelineOptions) -> Self {
        let mut pipeline = Self::build(Some(request), Vec::new(), options);
        pipeline.scheduled = 1;
        pipeline
    }

    /// Pipeline over caller-supplied rows with no fetch lifecycle.
    pub fn with_static(rows: Vec<Value>, options: DataPipelineOptions) -> Self {
        Self::build(None, rows, options)
    }

    fn build(
        request: Option<Rc<dyn RowRequest>>,
        rows: Vec<Value>,
        options: DataPipelineOptions,
    ) -> Self {
        let total = rows.len() as u64;
        let rows = rows.into_iter().map(Rc::new).collect();
        Self {
            request,
            state: FetchState {
                page: options.page,
                params: options.params,
                ..FetchState::default()
            },
            scheduled: 0,
            issued: 0,
            applied: 0,
            in_flight: 0,
            total,
            stale_responses: options.stale_responses,
            last_error: None,
            rows: EqualityGatedCache::new(rows, &options.data_cache),
        }
    }

    /// Published row array.
    pub fn data_source(&self) -> Rc<Vec<Row>> {
        self.rows.current()
    }

    /// Whether a request function drives this pipeline.
    pub fn is_remote(&self) -> bool {
        self.request.is_some()
    }

    /// Whether any fetch is in flight.
    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Total row count reported by the last applied page.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Current trigger values.
    pub fn state(&self) -> &FetchState {
        &self.state
    }

    /// Current pagination.
    pub fn page_info(&self) -> PageInfo {
        self.state.page
    }

    /// Fetches scheduled but not yet begun.
    pub fn scheduled_fetches(&self) -> usize {
        self.scheduled
    }

    /// Error of the most recent failed fetch, cleared by the next success.
    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    // ===== Triggers =====

    /// Change the static params.
    pub fn set_params(&mut self, params: Map<String, Value>) -> bool {
        let changed = self.state.params != params;
        self.state.params = params;
        self.trigger(changed)
    }

    /// Change the submitted search values without touching pagination.
    pub fn set_form_search(&mut self, values: Map<String, Value>) -> bool {
        let changed = self.state.form_search != values;
        self.state.form_search = values;
        self.trigger(changed)
    }

    /// Submit the search form: store the values, return to the first page,
    /// and always schedule one fetch.
    pub fn submit(&mut self, values: Map<String, Value>) {
        self.state.form_search = values;
        self.state.page.current = 1;
        self.trigger(true);
    }

    /// Replace every sorter.
    pub fn set_sorters(&mut self, sorters: Sorters) -> bool {
        let changed = self.state.sorters != sorters;
        self.state.sorters = sorters;
        self.trigger(changed)
    }

    /// Replace every header filter.
    pub fn set_filters(&mut self, filters: Filters) -> bool {
        let changed = self.state.filters != filters;
        self.state.filters = filters;
        self.trigger(changed)
    }

    /// Move to another page.
    pub fn set_current(&mut self, current: u64) -> bool {
        let current = current.max(1);
        let changed = self.state.page.current != current;
        self.state.page.current = current;
        self.trigger(changed)
    }

    /// Change the page size.
    pub fn set_page_size(&mut self, page_size: u64) -> bool {
        let changed = self.state.page.page_size != page_size;
        self.state.page.page_size = page_size;
        self.trigger(changed)
    }

    /// Schedule a fetch with unchanged triggers.
    pub fn reload(&mut self) {
        self.trigger(true);
    }

    /// Replace the static rows. Ignored by remote pipelines.
    pub fn set_static_rows(&mut self, rows: Vec<Value>) -> bool {
        if self.is_remote() {
            return false;
        }
        self.total = rows.len() as u64;
        self.rows.offer(rows.into_iter().map(Rc::new).collect())
    }

    /// Change the `dataCache` option.
    pub fn set_data_cache(&mut self, option: &DataCache) -> bool {
        self.rows.reconfigure(option)
    }

    /// Change the stale response policy.
    pub fn set_stale_responses(&mut self, policy: StaleResponsePolicy) {
        self.stale_responses = policy;
    }

    fn trigger(&mut self, changed: bool) -> bool {
        if changed && self.is_remote() {
            self.scheduled += 1;
        }
        changed
    }

    // ===== Fetch lifecycle =====

    /// Consume one scheduled fetch (if any) and compose its request.
    ///
    /// Returns `None` for static pipelines.
    pub fn begin_fetch(&mut self) -> Option<PendingFetch> {
        self.request.as_ref()?;
        self.scheduled = self.scheduled.saturating_sub(1);
        self.issued += 1;
        self.in_flight += 1;
        Some(PendingFetch {
            generation: self.issued,
            request: self.state.compose(),
        })
    }

    /// Apply the response for `generation`.
    pub fn complete_fetch(
        &mut self,
        generation: u64,
        response: Result<RowPage, FetchError>,
    ) -> FetchOutcome {
        self.in_flight = self.in_flight.saturating_sub(1);

        if self.stale_responses == StaleResponsePolicy::Drop && generation < self.applied {
            tracing::debug!(generation, applied = self.applied, "dropping stale response");
            return FetchOutcome::Stale;
        }

        let page = match response {
            Ok(page) => page,
            Err(err) => {
                tracing::error!(generation, error = %err, "row request failed");
                self.last_error = Some(err);
                return FetchOutcome::Failed;
            }
        };

        if page.success == Some(false) {
            tracing::warn!(generation, "row request reported failure, keeping rows");
            return FetchOutcome::Rejected;
        }

        self.applied = self.applied.max(generation);
        self.last_error = None;
        self.total = page.total.unwrap_or(page.data.len() as u64);
        let rows = page.data.into_iter().map(Rc::new).collect();
        self.rows.offer(rows);
        FetchOutcome::Applied
    }

    /// Run one fetch end to end.
    pub async fn fetch(&mut self) -> Option<FetchOutcome> {
        let request = self.request.clone()?;
        let pending = self.begin_fetch()?;
        let response = request.request(pending.request).await;
        Some(self.complete_fetch(pending.generation, response))
    }

    /// Run fetches until none are scheduled. Returns how many ran.
    pub async fn run_scheduled(&mut self) -> usize {
        let mut ran = 0;
        while self.scheduled > 0 && self.fetch().await.is_some() {
            ran += 1;
        }
        ran
    }
}

impl std::fmt::Debug for DataPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataPipeline")
            .field("remote", &self.is_remote())
            .field("state", &self.state)
            .field("scheduled", &self.scheduled)
            .field("in_flight", &self.in_flight)
            .field("rows", &self.rows.current().len())
            .finish()
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
