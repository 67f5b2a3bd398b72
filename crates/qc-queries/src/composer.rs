//! Query Composer
//!
//! Holds the configured filters and sorts plus the submitted state (filter
//! values, search text, sort selection, pagination) and applies them to an
//! externally owned query object.

use qc_core::{ComposerConfig, PaginationParams, SortDirection, DEFAULT_MAX_PER_PAGE};
use serde::Serialize;
use serde_json::Value;

use crate::filters::{Filter, FilterDescription};
use crate::sorts::{Sort, SortDescription};
use crate::target::QueryTarget;
use crate::values::FilterValues;

/// Search hook invoked with the query and a non-empty search string
pub type SearchHook<Q> = Box<dyn Fn(&mut Q, &str) + Send + Sync>;

/// Composes filters, search, and ordering onto a query object
pub struct QueryComposer<Q> {
    filters: Vec<Filter<Q>>,
    sorts: Vec<Sort>,
    filter_values: FilterValues,
    search: Option<String>,
    sort_column: Option<String>,
    sort_direction: SortDirection,
    default_direction: SortDirection,
    per_page: i64,
    max_per_page: i64,
    paginated: bool,
    search_hook: Option<SearchHook<Q>>,
}

impl<Q> Default for QueryComposer<Q> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Q> QueryComposer<Q> {
    /// Create a composer with the built-in defaults
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            sorts: Vec::new(),
            filter_values: FilterValues::new(),
            search: None,
            sort_column: None,
            sort_direction: SortDirection::Asc,
            default_direction: SortDirection::Asc,
            per_page: 15,
            max_per_page: DEFAULT_MAX_PER_PAGE,
            paginated: true,
            search_hook: None,
        }
    }

    /// Create a composer seeded from configuration
    pub fn with_config(config: &ComposerConfig) -> Self {
        Self {
            sort_direction: config.sort_direction,
            default_direction: config.sort_direction,
            per_page: config.per_page,
            max_per_page: config.max_per_page,
            paginated: config.paginated,
            ..Self::new()
        }
    }

    // Configuration

    /// Replace the filter definitions
    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter<Q>>) -> Self {
        self.filters = filters.into_iter().collect();
        self
    }

    /// Append a filter definition
    pub fn add_filter(mut self, filter: Filter<Q>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Replace the sort definitions
    pub fn sorts(mut self, sorts: impl IntoIterator<Item = Sort>) -> Self {
        self.sorts = sorts.into_iter().collect();
        self
    }

    /// Append a sort definition
    pub fn add_sort(mut self, sort: Sort) -> Self {
        self.sorts.push(sort);
        self
    }

    /// Install the search hook
    pub fn search_using<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Q, &str) + Send + Sync + 'static,
    {
        self.search_hook = Some(Box::new(hook));
        self
    }

    // Submitted state

    /// Replace the submitted values (no merging)
    pub fn apply_filters(mut self, values: impl Into<FilterValues>) -> Self {
        self.filter_values = values.into();
        self
    }

    /// Set the search text
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Clear the search text
    pub fn clear_search(mut self) -> Self {
        self.search = None;
        self
    }

    /// Order by `column` in `direction`
    pub fn sort_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_column = Some(column.into());
        self.sort_direction = direction;
        self
    }

    /// Order by `column` in the default direction
    pub fn sort_by_column(self, column: impl Into<String>) -> Self {
        let direction = self.default_direction;
        self.sort_by(column, direction)
    }

    /// Sort selection as submitted by a client: a missing column clears the
    /// ordering, an unrecognised direction falls back to the default
    pub fn sort_by_param(mut self, column: Option<&str>, direction: Option<&str>) -> Self {
        self.sort_column = column.filter(|c| !c.is_empty()).map(str::to_string);
        self.sort_direction = direction
            .and_then(SortDirection::from_str)
            .unwrap_or(self.default_direction);
        self
    }

    /// Remove the ordering
    pub fn clear_sort(mut self) -> Self {
        self.sort_column = None;
        self.sort_direction = self.default_direction;
        self
    }

    /// Set the page size
    pub fn per_page(mut self, per_page: i64) -> Self {
        self.per_page = per_page;
        self
    }

    /// Enable or disable pagination
    pub fn paginated(mut self, paginated: bool) -> Self {
        self.paginated = paginated;
        self
    }

    // Accessors

    pub fn configured_filters(&self) -> &[Filter<Q>] {
        &self.filters
    }

    pub fn configured_sorts(&self) -> &[Sort] {
        &self.sorts
    }

    /// Find a configured filter by name
    pub fn find_filter(&self, name: &str) -> Option<&Filter<Q>> {
        self.filters.iter().find(|f| f.name() == name)
    }

    /// Find a configured sort by name
    pub fn find_sort(&self, name: &str) -> Option<&Sort> {
        self.sorts.iter().find(|s| s.name() == name)
    }

    pub fn filter_values(&self) -> &FilterValues {
        &self.filter_values
    }

    pub fn get_search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn get_sort_column(&self) -> Option<&str> {
        self.sort_column.as_deref()
    }

    pub fn get_sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn get_per_page(&self) -> i64 {
        self.per_page
    }

    pub fn is_paginated(&self) -> bool {
        self.paginated
    }

    /// Limit/offset for `page`, or `None` when pagination is off
    pub fn pagination(&self, page: i64) -> Option<PaginationParams> {
        self.paginated
            .then(|| PaginationParams::bounded(page, self.per_page, self.max_per_page))
    }

    /// Describe the composer for a client
    pub fn describe(&self) -> ComposerDescription {
        ComposerDescription {
            filters: self.filters.iter().map(Filter::describe).collect(),
            sorts: self.sorts.iter().map(Sort::describe).collect(),
            filter_values: self.filter_values.clone(),
            search: self.search.clone(),
            sort_by: self.sort_column.clone(),
            sort_direction: self.sort_direction,
            per_page: self.per_page,
            paginated: self.paginated,
        }
    }

    /// [`describe`](Self::describe) as a JSON value
    pub fn describe_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self.describe())
    }
}

impl<Q: QueryTarget> QueryComposer<Q> {
    /// Apply filters, search, and ordering to `query`, in that order.
    ///
    /// Filters run in configuration order. A filter is skipped when its
    /// submitted value is missing, `null`, or `""`; submitted names without a
    /// configured filter are ignored.
    pub fn apply<'q>(&self, query: &'q mut Q) -> &'q mut Q {
        let _span = tracing::debug_span!(
            "compose_query",
            filters = self.filters.len(),
            submitted = self.filter_values.len()
        )
        .entered();

        for filter in &self.filters {
            match self.filter_values.submitted(filter.name()) {
                Some(value) => {
                    tracing::debug!(
                        filter = filter.name(),
                        kind = filter.kind().type_name(),
                        custom = filter.has_custom_predicate(),
                        "Applying filter"
                    );
                    filter.apply(query, value);
                }
                None => tracing::trace!(filter = filter.name(), "No value submitted, skipping"),
            }
        }

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            match &self.search_hook {
                Some(hook) => {
                    tracing::debug!(search, "Applying search");
                    hook(query, search);
                }
                None => tracing::trace!(search, "No search hook installed"),
            }
        }

        if let Some(column) = &self.sort_column {
            tracing::debug!(column = %column, direction = %self.sort_direction, "Applying sort");
            query.order_by(column, self.sort_direction);
        }

        query
    }
}

impl<Q> std::fmt::Debug for QueryComposer<Q> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryComposer")
            .field("filters", &self.filters)
            .field("sorts", &self.sorts)
            .field("filter_values", &self.filter_values)
            .field("search", &self.search)
            .field("sort_column", &self.sort_column)
            .field("sort_direction", &self.sort_direction)
            .field("per_page", &self.per_page)
            .field("paginated", &self.paginated)
            .field("search_hook", &self.search_hook.is_some())
            .finish()
    }
}

/// Client-facing description of a composer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposerDescription {
    pub filters: Vec<FilterDescription>,
    pub sorts: Vec<SortDescription>,
    pub filter_values: FilterValues,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: SortDirection,
    pub per_page: i64,
    pub paginated: bool,
}
