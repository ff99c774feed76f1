//! End-to-end scenarios wiring the pipelines together the way a grid
//! component does: config → columns / data → selection / search.

use gridstate::breakpoint::{BreakpointObserver, ViewportSource};
use gridstate::column::{ColumnDeclaration, ColumnPipeline, TableType};
use gridstate::config::{merge_config, ConfigFile, ResolvedConfig};
use gridstate::data::{DataPipeline, FetchRequest, RequestFn, RowPage, RowRequest};
use gridstate::error::{BreakpointError, FetchError};
use gridstate::persist::{MemoryStorage, PersistenceConfig, PersistenceType, StorageBackends};
use gridstate::search::{SearchConfig, SearchFormState, SearchLayout};
use gridstate::selection::{RowKey, SelectionInput, SelectionReconciler};
use serde_json::{json, Map, Value};
use std::rc::Rc;
use std::time::{Duration, Instant};

struct Window(u32);

impl ViewportSource for Window {
    fn start(&mut self) -> Result<u32, BreakpointError> {
        Ok(self.0)
    }
    fn stop(&mut self) {}
}

/// Server with 5 rows, paged by `current` / `pageSize`.
fn paged_server() -> Rc<dyn RowRequest> {
    Rc::new(RequestFn(|request: FetchRequest| {
        let current = request.params["current"].as_u64().unwrap_or(1);
        let size = request.params["pageSize"].as_u64().unwrap_or(20);
        let start = (current - 1) * size;
        let rows: Vec<Value> = (start..(start + size).min(5))
            .map(|id| json!({"id": id + 1, "name": format!("user-{}", id + 1)}))
            .collect();
        async move { Ok::<_, FetchError>(RowPage::new(rows).with_total(5)) }
    }))
}

fn keys(ids: &[i64]) -> Vec<RowKey> {
    ids.iter().copied().map(RowKey::from).collect()
}

fn selected_ids(reconciler: &SelectionReconciler) -> Vec<i64> {
    reconciler
        .selected_rows()
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect()
}

fn reconcile(reconciler: &mut SelectionReconciler, ids: &[i64], data: &DataPipeline) {
    let keys = keys(ids);
    let rows = data.data_source();
    reconciler.reconcile(SelectionInput {
        keys: &keys,
        data: &rows,
        disabled: false,
        loading: data.loading(),
    });
}

#[tokio::test]
async fn selection_survives_paging_through_remote_data() {
    let config = merge_config(Some(ConfigFile {
        default_page_size: Some(3),
        ..ConfigFile::default()
    }));
    let mut data = DataPipeline::with_request(paged_server(), config.data_options());
    let mut selection = SelectionReconciler::new("id", Rc::new(config.path_accessor()));

    data.run_scheduled().await;
    reconcile(&mut selection, &[1, 2, 3], &data);
    assert_eq!(selected_ids(&selection), vec![1, 2, 3]);

    data.set_current(2);
    data.run_scheduled().await;
    assert_eq!(data.data_source().len(), 2, "page 2 holds rows 4 and 5");
    reconcile(&mut selection, &[1, 2, 3], &data);
    assert_eq!(selected_ids(&selection), vec![1, 2, 3]);

    reconcile(&mut selection, &[1, 3], &data);
    assert_eq!(selected_ids(&selection), vec![1, 3]);
}

#[tokio::test]
async fn selection_is_frozen_while_a_fetch_is_in_flight() {
    let mut data = DataPipeline::with_request(paged_server(), ResolvedConfig::default().data_options());
    let mut selection = SelectionReconciler::new("id", Rc::new(Default::default()));
    data.run_scheduled().await;
    reconcile(&mut selection, &[2], &data);

    let pending = data.begin_fetch().expect("remote pipeline");
    reconcile(&mut selection, &[], &data);
    assert_eq!(selected_ids(&selection), vec![2], "loading suppresses the clear");

    data.complete_fetch(pending.generation, Ok(RowPage::new(vec![])));
    reconcile(&mut selection, &[], &data);
    assert!(selection.selected_rows().is_empty());
}

#[tokio::test]
async fn identical_refetch_keeps_every_downstream_reference() {
    let config = merge_config(Some(ConfigFile {
        data_cache: Some(true),
        ..ConfigFile::default()
    }));
    let mut data = DataPipeline::with_request(paged_server(), config.data_options());
    let mut selection = SelectionReconciler::new("id", Rc::new(config.path_accessor()));

    data.run_scheduled().await;
    reconcile(&mut selection, &[1, 2], &data);
    let rows_before = data.data_source();
    let selected_before = selection.selected_rows();

    data.reload();
    data.run_scheduled().await;
    reconcile(&mut selection, &[1, 2], &data);

    assert!(Rc::ptr_eq(&rows_before, &data.data_source()));
    assert!(Rc::ptr_eq(&selected_before, &selection.selected_rows()));
}

#[test]
fn column_overrides_persist_across_remounts() {
    let config = ResolvedConfig::default();
    let storage = MemoryStorage::new();
    let backends = StorageBackends::none().with_session(storage.clone());
    let declarations = || {
        vec![
            ColumnDeclaration::new("id"),
            ColumnDeclaration::new("name"),
            ColumnDeclaration::new("email"),
        ]
    };
    let options = || {
        let mut options = config.column_options();
        options.persistence = PersistenceConfig::new("users", PersistenceType::SessionStorage);
        options
    };

    let start = Instant::now();
    let mut first = ColumnPipeline::new(declarations(), options(), backends.clone());
    first.toggle_visibility("email", start);
    first.tick(start + config.persistence_debounce + Duration::from_millis(1));
    drop(first);

    let second = ColumnPipeline::new(declarations(), options(), backends);
    let shown: Vec<String> = second.columns().iter().map(|c| c.key.clone()).collect();
    assert_eq!(shown, vec!["id", "name"]);
    assert!(storage.peek("users").is_some());
}

#[test]
fn search_form_limits_follow_viewport_resizes() {
    let config = ResolvedConfig::default();
    let observer = config.breakpoint_observer(Window(1300)).into_shared();
    let search = SearchFormState::new(
        TableType::Table,
        SearchConfig {
            layout: Some(SearchLayout::Inline),
            ..SearchConfig::default()
        },
        Map::new(),
        Rc::clone(&observer),
    );
    assert_eq!(search.inline_collapsed_limit(), 4);

    observer.borrow_mut().viewport_changed(500);
    assert_eq!(search.inline_collapsed_limit(), 0);

    drop(search);
    assert!(!observer.borrow().is_watching());
}

#[test]
fn headless_search_form_collapses_everything() {
    let search = SearchFormState::new(
        TableType::Table,
        SearchConfig::default(),
        Map::new(),
        BreakpointObserver::headless().into_shared(),
    );
    assert_eq!(search.inline_collapsed_limit(), 0);
    assert_eq!(search.grid_collapsed_limit(), 0);
}
