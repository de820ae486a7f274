use serde::Serialize;

use crate::utils::contains_ignore_case;

/// Rows per page in list views unless the caller asks otherwise.
pub const DEFAULT_PER_PAGE: usize = 10;

/// A record that list views can filter with a free-text search box.
pub trait Searchable {
    /// Text fields a search term is matched against.
    fn search_fields(&self) -> Vec<&str>;
}

/// Filter and pagination state of a list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based page number
    pub page: usize,
    pub per_page: usize,
    pub search: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            search: None,
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    pub fn matches<R: Searchable>(&self, item: &R) -> bool {
        match self.search_term() {
            Some(term) => item
                .search_fields()
                .iter()
                .any(|field| contains_ignore_case(field, term)),
            None => true,
        }
    }

    /// Filter `items` by the search term, then cut out the requested page.
    pub fn apply<R: Searchable + Clone>(&self, items: &[R]) -> Page<R> {
        let per_page = self.per_page.max(1);
        let page = self.page.max(1);

        let matching: Vec<&R> = items.iter().filter(|item| self.matches(*item)).collect();
        let total_items = matching.len();
        let total_pages = total_items.div_ceil(per_page).max(1);

        let items = matching
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .cloned()
            .collect();

        Page {
            items,
            page,
            per_page,
            total_items,
            total_pages,
        }
    }
}

/// One page of a filtered collection.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total_items: usize,
    /// Never less than 1, so an empty list still reads "page 1 of 1"
    pub total_pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}
