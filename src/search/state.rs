//! Search form state bound to the breakpoint observer.
//!
//! The state subscribes to the shared [`BreakpointObserver`] only while its
//! layout needs viewport-dependent limits, and releases the subscription
//! when the layout stops needing it or the state is dropped.
//!
//! [`BreakpointObserver`]: crate::breakpoint::BreakpointObserver

use super::fields::{form_props, grid_props, search_columns, GridProps};
use super::limits::{grid_limit, inline_limit, resolved_layout, should_observe, SearchLayout};
use crate::breakpoint::{BreakpointSet, SharedObserver, SubscriptionToken};
use crate::column::{ColumnDeclaration, TableType};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Caller-supplied search form configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchConfig {
    /// Explicit layout.
    pub layout: Option<SearchLayout>,
    /// Initial collapsed state; collapsed when unset.
    pub collapsed: Option<bool>,
    /// Props forwarded to the form.
    pub form_props: Map<String, Value>,
}

/// Live state of one search form.
pub struct SearchFormState {
    table_type: TableType,
    config: SearchConfig,
    observer: SharedObserver,
    screens: Rc<Cell<BreakpointSet>>,
    token: Option<SubscriptionToken>,
    collapsed: bool,
    defaults: Map<String, Value>,
    values: Map<String, Value>,
}

impl SearchFormState {
    /// Mount a search form. Starts observing when the layout requires it.
    pub fn new(
        table_type: TableType,
        config: SearchConfig,
        defaults: Map<String, Value>,
        observer: SharedObserver,
    ) -> Self {
        let mut state = Self {
            table_type,
            collapsed: config.collapsed.unwrap_or(true),
            config,
            observer,
            screens: Rc::new(Cell::new(BreakpointSet::empty())),
            token: None,
            values: defaults.clone(),
            defaults,
        };
        state.sync_observation();
        state
    }

    /// Effective layout.
    pub fn layout(&self) -> SearchLayout {
        resolved_layout(self.config.layout, self.table_type)
    }

    /// Whether a breakpoint subscription is held.
    pub fn is_observing(&self) -> bool {
        self.token.is_some()
    }

    /// Fields shown before collapsing, inline layout.
    pub fn inline_collapsed_limit(&self) -> usize {
        inline_limit(&self.screens.get())
    }

    /// Fields shown before collapsing, grid layouts.
    pub fn grid_collapsed_limit(&self) -> usize {
        grid_limit(&self.screens.get(), self.layout())
    }

    /// Whether fields beyond the limit are hidden.
    pub fn collapsed(&self) -> bool {
        self.collapsed
    }

    /// Flip the collapsed state.
    pub fn toggle_collapsed(&mut self) {
        self.collapsed = !self.collapsed;
    }

    /// Grid descriptor.
    pub fn grid_props(&self) -> GridProps {
        grid_props(self.config.layout, self.table_type, self.collapsed)
    }

    /// Form props for the current mode.
    pub fn form_props(&self) -> Map<String, Value> {
        form_props(&self.config.form_props, self.table_type)
    }

    /// Fields of `declarations` this form renders.
    pub fn columns<'a>(&self, declarations: &'a [ColumnDeclaration]) -> Vec<&'a ColumnDeclaration> {
        search_columns(declarations, self.table_type)
    }

    /// Current form values.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Set one field.
    pub fn set_field(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Restore the default values and return them.
    pub fn reset(&mut self) -> &Map<String, Value> {
        self.values = self.defaults.clone();
        &self.values
    }

    /// Values to submit.
    pub fn submit(&self) -> Map<String, Value> {
        self.values.clone()
    }

    /// Change the explicit layout.
    pub fn set_layout(&mut self, layout: Option<SearchLayout>) {
        if self.config.layout != layout {
            self.config.layout = layout;
            self.sync_observation();
        }
    }

    /// Change the grid mode.
    pub fn set_table_type(&mut self, table_type: TableType) {
        if self.table_type != table_type {
            self.table_type = table_type;
            self.sync_observation();
        }
    }

    /// Release the breakpoint subscription.
    pub fn unmount(&mut self) {
        self.stop_observe();
    }

    fn sync_observation(&mut self) {
        if should_observe(self.layout(), self.table_type) {
            self.start_observe();
        } else {
            self.stop_observe();
        }
    }

    fn start_observe(&mut self) {
        if self.token.is_some() {
            return;
        }
        let screens = Rc::clone(&self.screens);
        let subscribed = self
            .observer
            .borrow_mut()
            .subscribe(move |next| screens.set(*next));
        match subscribed {
            Ok(token) => self.token = Some(token),
            Err(err) => {
                tracing::debug!(error = %err, "search limits resolved without viewport");
                self.screens.set(BreakpointSet::empty());
            }
        }
    }

    fn stop_observe(&mut self) {
        let Some(token) = self.token.take() else {
            return;
        };
        // Unobserved limits resolve against nothing, whatever was seen before.
        self.screens.set(BreakpointSet::empty());
        match self.observer.try_borrow_mut() {
            Ok(mut observer) => observer.unsubscribe(token),
            Err(_) => tracing::warn!("breakpoint observer busy, subscription leaked"),
        }
    }
}

impl Drop for SearchFormState {
    fn drop(&mut self) {
        self.stop_observe();
    }
}

impl fmt::Debug for SearchFormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchFormState")
            .field("table_type", &self.table_type)
            .field("layout", &self.layout())
            .field("observing", &self.is_observing())
            .field("collapsed", &self.collapsed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoint::{BreakpointObserver, ViewportSource};
    use crate::error::BreakpointError;
    use serde_json::json;

    struct Window(u32);

    impl ViewportSource for Window {
        fn start(&mut self) -> Result<u32, BreakpointError> {
            Ok(self.0)
        }
        fn stop(&mut self) {}
    }

    fn observer(width: u32) -> SharedObserver {
        BreakpointObserver::new(Window(width)).into_shared()
    }

    fn inline() -> SearchConfig {
        SearchConfig {
            layout: Some(SearchLayout::Inline),
            ..SearchConfig::default()
        }
    }

    #[test]
    fn inline_layout_follows_viewport() {
        let observer = observer(1700);
        let state = SearchFormState::new(TableType::Table, inline(), Map::new(), Rc::clone(&observer));
        assert!(state.is_observing());
        assert_eq!(state.inline_collapsed_limit(), 5);

        observer.borrow_mut().viewport_changed(600);
        assert_eq!(state.inline_collapsed_limit(), 2);
    }

    #[test]
    fn form_mode_vertical_layout_does_not_observe() {
        let observer = observer(1700);
        let state = SearchFormState::new(
            TableType::Form,
            SearchConfig::default(),
            Map::new(),
            Rc::clone(&observer),
        );
        assert_eq!(state.layout(), SearchLayout::Vertical);
        assert!(!state.is_observing());
        assert_eq!(observer.borrow().subscriber_count(), 0);
        assert_eq!(state.grid_collapsed_limit(), 0);
    }

    #[test]
    fn switching_to_vertical_stops_observing() {
        let observer = observer(1000);
        let mut state =
            SearchFormState::new(TableType::Table, SearchConfig::default(), Map::new(), Rc::clone(&observer));
        assert!(state.is_observing());
        assert_eq!(state.grid_collapsed_limit(), 2);

        state.set_layout(Some(SearchLayout::Vertical));
        assert!(!state.is_observing());
        assert!(!observer.borrow().is_watching(), "last subscriber left");
        assert_eq!(state.grid_collapsed_limit(), 0);
    }

    #[test]
    fn grid_limit_does_not_depend_on_layout_history() {
        let vertical = SearchConfig {
            layout: Some(SearchLayout::Vertical),
            ..SearchConfig::default()
        };
        let fresh = SearchFormState::new(TableType::Table, vertical, Map::new(), observer(1000));

        let mut switched =
            SearchFormState::new(TableType::Table, SearchConfig::default(), Map::new(), observer(1000));
        switched.set_layout(Some(SearchLayout::Vertical));

        assert_eq!(fresh.grid_collapsed_limit(), switched.grid_collapsed_limit());
        assert_eq!(switched.grid_collapsed_limit(), 0);
    }

    #[test]
    fn switching_back_to_observed_layout_picks_up_current_viewport() {
        let observer = observer(1000);
        let mut state =
            SearchFormState::new(TableType::Table, SearchConfig::default(), Map::new(), Rc::clone(&observer));
        state.set_layout(Some(SearchLayout::Vertical));
        state.set_layout(Some(SearchLayout::Horizontal));

        assert!(state.is_observing());
        assert_eq!(state.grid_collapsed_limit(), 2);
    }

    #[test]
    fn headless_resolves_once_with_nothing_active() {
        let observer = BreakpointObserver::headless().into_shared();
        let state = SearchFormState::new(TableType::Table, inline(), Map::new(), observer);
        assert!(!state.is_observing());
        assert_eq!(state.inline_collapsed_limit(), 0);
        assert_eq!(state.grid_collapsed_limit(), 0);
    }

    #[test]
    fn drop_releases_subscription() {
        let observer = observer(800);
        let state = SearchFormState::new(TableType::Table, inline(), Map::new(), Rc::clone(&observer));
        assert_eq!(observer.borrow().subscriber_count(), 1);
        drop(state);
        assert_eq!(observer.borrow().subscriber_count(), 0);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut defaults = Map::new();
        defaults.insert("status".into(), json!("open"));
        let mut state = SearchFormState::new(
            TableType::Table,
            SearchConfig::default(),
            defaults.clone(),
            observer(800),
        );
        state.set_field("status", json!("closed"));
        state.set_field("name", json!("x"));
        assert_eq!(state.reset(), &defaults);
    }

    #[test]
    fn collapsed_defaults_to_true_and_toggles() {
        let mut state =
            SearchFormState::new(TableType::Table, SearchConfig::default(), Map::new(), observer(800));
        assert!(state.collapsed());
        state.toggle_collapsed();
        assert!(!state.grid_props().collapsed);
    }

    #[test]
    fn config_deserializes_from_camel_case() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"layout":"inline","collapsed":false,"formProps":{"size":"small"}}"#)
                .unwrap();
        assert_eq!(config.layout, Some(SearchLayout::Inline));
        assert_eq!(config.collapsed, Some(false));
        assert_eq!(config.form_props["size"], json!("small"));
    }
}
