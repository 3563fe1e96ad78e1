//! Paged queries and paged responses
//!
//! Listing endpoints accept `page`, `size`, `sort` and `search` query
//! parameters and answer with a [`Page`]. Sort fields are checked against a
//! per-resource whitelist before they ever reach a directory, so adapters can
//! splice the column name into SQL.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Page size used when the client does not ask for one
pub const DEFAULT_PAGE_SIZE: u32 = 20;
/// Largest page a client may request
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error("cannot sort by '{field}', allowed fields: {allowed}")]
    UnknownSortField { field: String, allowed: String },
    #[error("invalid sort direction '{0}', expected asc or desc")]
    InvalidDirection(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A validated sort specification, e.g. `name,asc`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    field: &'static str,
    direction: SortDirection,
}

impl Sort {
    pub fn asc(field: &'static str) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    /// Parse `field[,asc|desc]`, accepting only fields listed in `allowed`
    pub fn parse(raw: &str, allowed: &[&'static str]) -> Result<Self, PaginationError> {
        let mut parts = raw.splitn(2, ',');
        let requested = parts.next().unwrap_or_default().trim();

        let field = allowed
            .iter()
            .copied()
            .find(|candidate| candidate.eq_ignore_ascii_case(requested))
            .ok_or_else(|| PaginationError::UnknownSortField {
                field: requested.to_string(),
                allowed: allowed.join(", "),
            })?;

        let direction = match parts.next().map(|d| d.trim().to_ascii_lowercase()) {
            None => SortDirection::Asc,
            Some(d) if d.is_empty() || d == "asc" => SortDirection::Asc,
            Some(d) if d == "desc" => SortDirection::Desc,
            Some(d) => return Err(PaginationError::InvalidDirection(d)),
        };

        Ok(Self { field, direction })
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{},{}", self.field, direction)
    }
}

/// Raw paging parameters as they arrive on the query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
    pub search: Option<String>,
}

impl PageQuery {
    /// Validate the query into a [`PageRequest`]
    ///
    /// Missing `sort` falls back to `default_sort` ascending. A blank
    /// `search` is treated as no search.
    pub fn into_request(
        self,
        allowed_sort: &[&'static str],
        default_sort: &'static str,
    ) -> Result<PageRequest, PaginationError> {
        let sort = match self.sort.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Sort::parse(raw, allowed_sort)?,
            _ => Sort::asc(default_sort),
        };

        Ok(PageRequest {
            page: self.page.unwrap_or(0),
            size: self
                .size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
            sort,
            search: self
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        })
    }
}

/// A validated page request handed to directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Zero-based page index
    pub page: u32,
    pub size: u32,
    pub sort: Sort,
    pub search: Option<String>,
}

impl PageRequest {
    pub fn new(page: u32, size: u32, sort: Sort) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
            sort,
            search: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page) * i64::from(self.size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub number: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

/// One page of a listing plus the numbers needed to fetch the others
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: PageMetadata,
    pub sort: String,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size);
        Self {
            items,
            page: PageMetadata {
                number: request.page,
                size: request.size,
                total_elements,
                total_pages: total_elements.div_ceil(size),
            },
            sort: request.sort.to_string(),
        }
    }

    /// Convert the items while keeping the paging metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            sort: self.sort,
        }
    }
}
