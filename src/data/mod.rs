//! Resource data access.
//!
//! `provider.rs` is what list and detail views call; `cursor.rs` keeps the
//! page → cursor tables that let a page-numbered grid walk a cursor-only API.

pub mod cursor;
pub mod provider;
pub mod types;

pub use cursor::{CursorKey, CursorLease, CursorTable};
pub use provider::DataProvider;
pub use types::{Filter, ListParams, ListResponse, Pagination, SortOrder, Sorter};
