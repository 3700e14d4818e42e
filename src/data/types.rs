//! List request and response shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default page size when a list request names none.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sorter {
    pub field: String,
    pub order: SortOrder,
}

/// A grid filter. Only the first filter carrying a value reaches the backend,
/// as the free-text `search` parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operator: String,
    pub value: Value,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: Value) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value,
        }
    }

    /// The free-text filter list views send.
    pub fn search(text: impl Into<String>) -> Self {
        Self::new("q", "contains", Value::String(text.into()))
    }

    /// Text form of the value, `None` when null or blank.
    pub fn text(&self) -> Option<String> {
        match &self.value {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            // Arrays and objects have no free-text meaning.
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number.
    pub current_page: u32,
    pub page_size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Parameters of [`DataProvider::get_list`](crate::data::DataProvider::get_list).
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    pub pagination: Pagination,
    pub sorters: Vec<Sorter>,
    pub filters: Vec<Filter>,
    /// Extra request headers.
    pub headers: Vec<(String, String)>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page numbers below 1 are clamped to 1.
    pub fn page(mut self, page: u32) -> Self {
        self.pagination.current_page = page.max(1);
        self
    }

    /// Page sizes below 1 are clamped to 1.
    pub fn page_size(mut self, size: u32) -> Self {
        self.pagination.page_size = size.max(1);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sorters.push(Sorter {
            field: field.into(),
            order,
        });
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// The honored sorter: the first one with a field name.
    pub fn primary_sorter(&self) -> Option<&Sorter> {
        self.sorters.first().filter(|s| !s.field.is_empty())
    }

    /// The honored filter value, mapped to `search`.
    pub fn search_text(&self) -> Option<String> {
        self.filters.iter().find_map(Filter::text)
    }
}

/// Normalized list page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListResponse {
    pub total: u64,
    pub data: Vec<Value>,
}
