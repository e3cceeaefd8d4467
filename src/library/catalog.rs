//! Catalog snapshots and the store that loads them.
//!
//! A `Catalog` is immutable once built. Re-fetching builds a new one and
//! swaps it in wholesale.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::normalize::Normalizer;
use super::taxonomy::build_nav;
use crate::adapters::{CatalogError, CatalogSource};
use crate::domain::{NavItem, Resource, ResourceId};

/// Message shown when the catalog could not be loaded
pub const FETCH_FAILURE_MESSAGE: &str = "Failed to load lessons. Please try again later.";

/// One fetch/normalize cycle's output
#[derive(Debug, Clone)]
pub struct Catalog {
    /// Normalized lessons, in source order
    pub resources: Vec<Resource>,

    /// Home entry plus one entry per distinct category
    pub nav: Vec<NavItem>,

    /// When the snapshot was built
    pub fetched_at: DateTime<Utc>,
}

impl Catalog {
    /// Build a snapshot from raw records
    pub fn from_records(records: &[Value], normalizer: &Normalizer) -> Self {
        Self::from_resources(normalizer.normalize(records))
    }

    pub fn from_resources(resources: Vec<Resource>) -> Self {
        let nav = build_nav(&resources);
        Self {
            resources,
            nav,
            fetched_at: Utc::now(),
        }
    }

    /// An empty snapshot (home entry only)
    pub fn empty() -> Self {
        Self::from_resources(Vec::new())
    }

    /// Get a resource by ID
    pub fn get(&self, id: &ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| &r.id == id)
    }

    /// Nav entry for a category key
    pub fn nav_item(&self, id: &str) -> Option<&NavItem> {
        self.nav.iter().find(|n| n.id == id)
    }

    /// Distinct category keys, in nav order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.nav.iter().filter(|n| !n.is_home()).map(|n| n.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Load state visible to the presentation layer
#[derive(Debug, Clone)]
pub enum CatalogState {
    /// Fetch in flight
    Loading,

    /// Snapshot available
    Ready(Arc<Catalog>),

    /// Fetch failed; the collection is empty
    Failed { message: String },
}

/// Proof that a fetch was started; only the newest ticket may complete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// Owns the current catalog state and serializes fetches
#[derive(Debug)]
pub struct CatalogStore {
    normalizer: Normalizer,
    state: CatalogState,
    /// Settled state to fall back to if the outstanding fetch is abandoned
    settled: Option<CatalogState>,
    generation: u64,
    pending: bool,
}

impl CatalogStore {
    pub fn new(normalizer: Normalizer) -> Self {
        Self {
            normalizer,
            state: CatalogState::Loading,
            settled: None,
            generation: 0,
            pending: false,
        }
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, CatalogState::Loading)
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// The current snapshot; empty when loading or failed
    pub fn catalog(&self) -> Arc<Catalog> {
        match &self.state {
            CatalogState::Ready(catalog) => Arc::clone(catalog),
            _ => Arc::new(Catalog::empty()),
        }
    }

    /// The user-visible error, if the last fetch failed
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            CatalogState::Failed { message } => Some(message),
            _ => None,
        }
    }

    /// Start a fetch. Returns `None` if one is already outstanding.
    pub fn begin_fetch(&mut self) -> Option<FetchTicket> {
        if self.pending {
            return None;
        }
        self.pending = true;
        self.generation += 1;
        let previous = std::mem::replace(&mut self.state, CatalogState::Loading);
        self.settled = match previous {
            CatalogState::Loading => None,
            settled => Some(settled),
        };
        Some(FetchTicket {
            generation: self.generation,
        })
    }

    /// Abandon any outstanding fetch; its result will be discarded. The
    /// previous snapshot comes back, or an empty one if there was none.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        if self.pending {
            self.pending = false;
            self.state = self
                .settled
                .take()
                .unwrap_or_else(|| CatalogState::Ready(Arc::new(Catalog::empty())));
            debug!("Outstanding catalog fetch abandoned");
        }
    }

    /// Apply a fetch result. Returns false if the ticket is stale.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Value>, CatalogError>,
    ) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.pending = false;
        self.settled = None;

        match result {
            Ok(records) => {
                let catalog = Catalog::from_records(&records, &self.normalizer);
                info!(
                    resources = catalog.len(),
                    categories = catalog.nav.len() - 1,
                    "Catalog loaded"
                );
                self.state = CatalogState::Ready(Arc::new(catalog));
            }
            Err(e) => {
                warn!("Failed to fetch catalog: {}", e);
                self.state = CatalogState::Failed {
                    message: FETCH_FAILURE_MESSAGE.to_string(),
                };
            }
        }

        true
    }

    /// Fetch from `source` and apply the result
    pub async fn refresh(&mut self, source: &dyn CatalogSource) -> &CatalogState {
        if let Some(ticket) = self.begin_fetch() {
            let result = source.fetch().await;
            self.finish_fetch(ticket, result);
        }
        &self.state
    }
}
