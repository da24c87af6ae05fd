//! Offset pagination types
//!
//! A [`PageRequest`] names a zero-based page, a page size and a sort order.
//! A [`Page`] carries the items of one page plus the total number of matching
//! items, which is enough to derive the page count.

use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Sort direction for ORDER BY clauses.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SortDirection {
    /// Ascending order (A-Z, 1-9)
    #[default]
    Asc,
    /// Descending order (Z-A, 9-1)
    Desc,
}

impl SortDirection {
    /// Convert to SQL order string
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// Columns a search may be ordered by.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum SortField {
    #[default]
    Id,
    Title,
    Servings,
}

impl SortField {
    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::Servings => "servings",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "id" => Some(SortField::Id),
            "title" => Some(SortField::Title),
            "servings" => Some(SortField::Servings),
            _ => None,
        }
    }
}

/// Sort order: one field plus a direction. Ties are always broken by
/// ascending id so that pages are stable.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn by_id() -> Self {
        Self::default()
    }

    /// Parse a `field[,direction]` specification such as `title,desc`.
    pub fn parse(value: &str) -> Option<Self> {
        let mut parts = value.splitn(2, ',');
        let field = SortField::parse(parts.next()?)?;
        let direction = match parts.next() {
            Some(dir) => SortDirection::parse(dir)?,
            None => SortDirection::Asc,
        };
        Some(Self { field, direction })
    }

    /// ORDER BY fragment, e.g. `title DESC, id ASC`
    pub fn to_sql_order(&self) -> String {
        match self.field {
            SortField::Id => format!("id {}", self.direction.to_sql()),
            field => format!("{} {}, id ASC", field.column(), self.direction.to_sql()),
        }
    }
}

/// Request for one page of results.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Sort,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: Sort::by_id(),
        }
    }
}

impl PageRequest {
    /// Create a request sorted by id ascending. A size of zero is raised to one.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.max(1),
            sort: Sort::by_id(),
        }
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> Sort {
        self.sort
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// Rows to skip. Saturates at `i64::MAX` for pages far past any real data.
    pub fn offset(&self) -> i64 {
        i64::from(self.page).saturating_mul(i64::from(self.size))
    }
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: u64) -> Self {
        Self {
            content,
            page: request.page(),
            size: request.size(),
            total_elements,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(u64::from(self.size))
    }

    pub fn is_first(&self) -> bool {
        self.page == 0
    }

    pub fn is_last(&self) -> bool {
        u64::from(self.page) + 1 >= self.total_pages()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Convert the items while keeping the page metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Page", 8)?;
        state.serialize_field("content", &self.content)?;
        state.serialize_field("page", &self.page)?;
        state.serialize_field("size", &self.size)?;
        state.serialize_field("totalElements", &self.total_elements)?;
        state.serialize_field("totalPages", &self.total_pages())?;
        state.serialize_field("first", &self.is_first())?;
        state.serialize_field("last", &self.is_last())?;
        state.serialize_field("empty", &self.is_empty())?;
        state.end()
    }
}
