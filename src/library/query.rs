//! Filtering, searching and pagination over a catalog snapshot.
//!
//! The free functions are pure. `QuerySession` holds the user's current
//! category, search text, level filter and page, and resets the page to 1
//! whenever any of those (or the snapshot) changes.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::catalog::Catalog;
use crate::domain::Resource;

/// Default number of rows per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Level filter options, in menu order
pub const LEVEL_OPTIONS: [&str; 4] = ["all", "beginner", "intermediate", "advanced"];

/// Secondary filter on difficulty
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelFilter {
    #[default]
    All,
    /// Lowercased level text to match exactly
    Only(String),
}

impl LevelFilter {
    /// Parse a menu value; `all` (any case) or empty means no filter
    pub fn parse(value: &str) -> Self {
        let lowered = value.trim().to_lowercase();
        if lowered.is_empty() || lowered == "all" {
            LevelFilter::All
        } else {
            LevelFilter::Only(lowered)
        }
    }

    pub fn matches(&self, resource: &Resource) -> bool {
        match self {
            LevelFilter::All => true,
            LevelFilter::Only(level) => resource.level.as_str().to_lowercase() == *level,
        }
    }

    /// Menu label ("All Levels", "Beginner", ...)
    pub fn label(&self) -> String {
        match self {
            LevelFilter::All => "All Levels".to_string(),
            LevelFilter::Only(level) => super::taxonomy::capitalize(level),
        }
    }
}

/// Does the resource's title or description contain the query?
/// Case-insensitive substring match; an empty query matches everything.
pub fn matches_search(resource: &Resource, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let query_lower = query.to_lowercase();
    resource.title.to_lowercase().contains(&query_lower)
        || resource.description.to_lowercase().contains(&query_lower)
}

/// Resources in `category` matching `search`, in source order
pub fn filter<'a>(resources: &'a [Resource], category: &str, search: &str) -> Vec<&'a Resource> {
    resources
        .iter()
        .filter(|r| r.category == category && matches_search(r, search))
        .collect()
}

/// Apply a level filter to an already-filtered sequence
pub fn filter_by_level<'a>(resources: &[&'a Resource], level: &LevelFilter) -> Vec<&'a Resource> {
    resources
        .iter()
        .copied()
        .filter(|r| level.matches(r))
        .collect()
}

/// Number of pages for `count` items; never less than one
pub fn total_pages(count: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    count.div_ceil(page_size).max(1)
}

/// One page of a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginated<'a, T> {
    pub items: &'a [T],
    pub page: usize,
    pub total_pages: usize,
}

/// Slice out 1-indexed `page`. Page 0 is read as page 1; pages past the
/// end are empty.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> Paginated<'_, T> {
    let page = page.max(1);
    let total = total_pages(items.len(), page_size);

    let start = (page - 1).saturating_mul(page_size).min(items.len());
    let end = start.saturating_add(page_size).min(items.len());

    Paginated {
        items: &items[start..end],
        page,
        total_pages: total,
    }
}

/// A page of query results, as handed to the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage<'a> {
    pub items: Vec<&'a Resource>,
    pub page: usize,
    pub total_pages: usize,
    /// Size of the full filtered sequence
    pub total_items: usize,
}

impl ResultPage<'_> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// User-facing query state over one catalog snapshot
#[derive(Debug, Clone)]
pub struct QuerySession {
    catalog: Arc<Catalog>,
    category: String,
    search: String,
    level: LevelFilter,
    page: usize,
    page_size: usize,
}

impl QuerySession {
    pub fn new(catalog: Arc<Catalog>, page_size: usize) -> Self {
        Self {
            catalog,
            category: crate::domain::HOME_ID.to_string(),
            search: String::new(),
            level: LevelFilter::All,
            page: 1,
            page_size,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn level(&self) -> &LevelFilter {
        &self.level
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Replace the snapshot (after a re-fetch)
    pub fn set_catalog(&mut self, catalog: Arc<Catalog>) {
        self.catalog = catalog;
        self.page = 1;
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
        self.page = 1;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn clear_search(&mut self) {
        self.set_search(String::new());
    }

    pub fn set_level(&mut self, level: LevelFilter) {
        self.level = level;
        self.page = 1;
    }

    /// Every resource matching the current filters
    pub fn results(&self) -> Vec<&Resource> {
        let by_category = filter(&self.catalog.resources, &self.category, &self.search);
        filter_by_level(&by_category, &self.level)
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.results().len(), self.page_size)
    }

    /// Jump to a page, clamped into `[1, total_pages]`
    pub fn set_page(&mut self, page: usize) {
        self.page = page.clamp(1, self.total_pages());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.page.saturating_add(1));
    }

    pub fn previous_page(&mut self) {
        self.set_page(self.page.saturating_sub(1));
    }

    /// The current page of results
    pub fn current_page(&self) -> ResultPage<'_> {
        let results = self.results();
        let paged = paginate(&results, self.page, self.page_size);

        ResultPage {
            items: paged.items.to_vec(),
            page: paged.page,
            total_pages: paged.total_pages,
            total_items: results.len(),
        }
    }
}
