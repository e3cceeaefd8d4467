//! Lesson catalog: normalization, taxonomy and queries.
//!
//! # Flow
//!
//! ```text
//! raw JSON records ──▶ Normalizer ──▶ Vec<Resource> ──▶ build_nav ──▶ Vec<NavItem>
//!                                          │
//!                                          ▼
//!                                   QuerySession (category, search, level, page)
//! ```
//!
//! Snapshots are immutable; a re-fetch produces a new `Catalog`.

pub mod catalog;
pub mod normalize;
pub mod query;
pub mod taxonomy;
pub mod thumbnail;

pub use catalog::{Catalog, CatalogState, CatalogStore, FetchTicket, FETCH_FAILURE_MESSAGE};
pub use normalize::{CategoryRewrites, Normalizer};
pub use query::{filter, filter_by_level, paginate, LevelFilter, Paginated, QuerySession, ResultPage};
pub use taxonomy::build_nav;
pub use thumbnail::Thumbnail;
