//! Page-number to cursor bookkeeping.
//!
//! The backend only hands out an opaque `nextCursor` with each page, so the
//! cursor for page N+1 becomes known once page N has been fetched. One
//! independent sequence exists per query shape (resource, page size, sorters,
//! filters); changing any of them starts over at page 1.
//!
//! # Concurrent fetches
//! Every fetch takes a generation number for its key when it starts. Its
//! `nextCursor` is recorded only if no later fetch for the same key started
//! in the meantime, so a slow, superseded response cannot clobber the table.

use std::collections::HashMap;

use dashmap::DashMap;

use crate::data::types::ListParams;

/// Identifies one pagination sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CursorKey {
    resource: String,
    composite: String,
}

impl CursorKey {
    pub fn new(resource: &str, params: &ListParams) -> Self {
        let sorters: Vec<(&str, &str)> = params
            .sorters
            .iter()
            .map(|s| (s.field.as_str(), s.order.as_str()))
            .collect();
        let sort_key = serde_json::to_string(&sorters).unwrap_or_default();
        let filter_key = serde_json::to_string(&params.filters).unwrap_or_default();

        Self {
            resource: resource.to_string(),
            composite: format!(
                "{resource}::ps={}::sort={sort_key}::filter={filter_key}",
                params.pagination.page_size
            ),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn as_str(&self) -> &str {
        &self.composite
    }
}

impl std::fmt::Display for CursorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.composite)
    }
}

#[derive(Debug)]
struct Sequence {
    /// Page number → cursor; `None` fetches from the start.
    cursors: HashMap<u32, Option<String>>,
    generation: u64,
}

impl Sequence {
    fn new() -> Self {
        Self {
            cursors: HashMap::from([(1, None)]),
            generation: 0,
        }
    }
}

/// A resolved cursor for one in-flight page fetch.
#[derive(Debug, Clone)]
pub struct CursorLease {
    key: CursorKey,
    page: u32,
    cursor: Option<String>,
    known: bool,
    generation: u64,
}

impl CursorLease {
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// False when the request is served from the start instead of the
    /// page asked for: no cursor was recorded, or the page lies past the end.
    pub fn is_known(&self) -> bool {
        self.known
    }
}

/// Cursor tables for every pagination sequence seen so far.
#[derive(Debug, Default)]
pub struct CursorTable {
    sequences: DashMap<CursorKey, Sequence>,
}

impl CursorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the cursor for `page` and register a new fetch for `key`.
    pub fn begin(&self, key: &CursorKey, page: u32) -> CursorLease {
        let mut sequence = self
            .sequences
            .entry(key.clone())
            .or_insert_with(Sequence::new);

        sequence.generation += 1;
        // Only page 1 starts from a null cursor. A null recorded past the
        // last page is a fallback like an unknown page.
        let (cursor, known) = match sequence.cursors.get(&page) {
            Some(Some(cursor)) => (Some(cursor.clone()), true),
            Some(None) => (None, page == 1),
            None => (None, false),
        };

        CursorLease {
            key: key.clone(),
            page,
            cursor,
            known,
            generation: sequence.generation,
        }
    }

    /// Record the cursor of the page after `lease.page()`.
    ///
    /// Returns false without recording when a later fetch for the same key
    /// superseded this one, when the lease fell back to the start (its data
    /// is page 1, not `lease.page()`), or when `lease.page()` has no
    /// successor page number.
    pub fn record(&self, lease: &CursorLease, next_cursor: Option<String>) -> bool {
        if !lease.known {
            return false;
        }
        let Some(next_page) = lease.page.checked_add(1) else {
            return false;
        };
        let Some(mut sequence) = self.sequences.get_mut(&lease.key) else {
            // Discarded while the fetch was in flight.
            return false;
        };
        if sequence.generation != lease.generation {
            return false;
        }
        sequence.cursors.insert(next_page, next_cursor);
        true
    }

    /// Recorded cursor for `page`: `None` if unknown, `Some(None)` for "from the start".
    pub fn cursor_for(&self, key: &CursorKey, page: u32) -> Option<Option<String>> {
        self.sequences
            .get(key)
            .and_then(|sequence| sequence.cursors.get(&page).cloned())
    }

    /// Highest page reachable without falling back to the start.
    ///
    /// Page 1 is always reachable; page N > 1 only once the backend returned a
    /// cursor for it.
    pub fn highest_known_page(&self, key: &CursorKey) -> u32 {
        self.sequences
            .get(key)
            .and_then(|sequence| {
                sequence
                    .cursors
                    .iter()
                    .filter(|(_, cursor)| cursor.is_some())
                    .map(|(page, _)| *page)
                    .max()
            })
            .unwrap_or(1)
    }

    /// Drop every sequence of one resource.
    pub fn discard(&self, resource: &str) {
        self.sequences.retain(|key, _| key.resource != resource);
    }

    /// Drop every sequence.
    pub fn reset(&self) {
        self.sequences.clear();
    }

    /// Number of sequences tracked.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }
}
