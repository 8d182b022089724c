//! crates/arsipku_core/src/listing.rs
//!
//! Pagination, sorting and filtering state shared by every list view
//! (public documents, my documents, annotations, appliances, verifier queue).
//!
//! A list holds at most one active filter. Choosing a new filter replaces the
//! previous one and sends the view back to the first page.

use crate::domain::{Document, Visibility};
use serde::{Deserialize, Serialize};
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_path(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

/// The single column/value filter a list may carry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ListFilter {
    #[default]
    None,
    /// Title search.
    Search(String),
    Visibility(Visibility),
    /// `true` for fully verified documents.
    Verified(bool),
}

impl ListFilter {
    /// A search for blank text is no filter at all.
    pub fn search(term: &str) -> Self {
        let term = term.trim();
        if term.is_empty() {
            ListFilter::None
        } else {
            ListFilter::Search(term.to_string())
        }
    }

    /// The `(column, value)` pair sent as query parameters.
    pub fn column_value(&self) -> Option<(&'static str, String)> {
        match self {
            ListFilter::None => None,
            ListFilter::Search(term) => Some(("title", term.clone())),
            ListFilter::Visibility(v) => Some(("visibility", v.as_filter_value().to_string())),
            ListFilter::Verified(v) => Some(("verified", v.to_string())),
        }
    }

    /// Client-side check used by views that filter an already fetched page.
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            ListFilter::None => true,
            ListFilter::Search(term) => document
                .title
                .to_lowercase()
                .contains(&term.to_lowercase()),
            ListFilter::Visibility(v) => document.visibility == *v,
            ListFilter::Verified(v) => document.verified_all == *v,
        }
    }
}

/// What a list view sends to the server for one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequest {
    pub page: u32,
    pub size: u32,
    pub sort: SortDirection,
    pub sort_by: String,
    pub filter: Option<(String, String)>,
}

/// Per-view list state. Pages are 0-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    page: u32,
    total_pages: u32,
    page_size: u32,
    sort: SortDirection,
    sort_by: String,
    filter: ListFilter,
}

impl ListQuery {
    pub fn new(sort_by: &str, page_size: u32) -> Self {
        Self {
            page: 0,
            total_pages: 0,
            page_size: page_size.max(1),
            sort: SortDirection::Asc,
            sort_by: sort_by.to_string(),
            filter: ListFilter::None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn sort(&self) -> SortDirection {
        self.sort
    }

    pub fn filter(&self) -> &ListFilter {
        &self.filter
    }

    /// Moves to page `page` if it exists. Returns whether the page changed.
    pub fn select_page(&mut self, page: u32) -> bool {
        if page >= self.total_pages.max(1) || page == self.page {
            return false;
        }
        self.page = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.select_page(self.page + 1)
    }

    pub fn previous_page(&mut self) -> bool {
        match self.page.checked_sub(1) {
            Some(page) => self.select_page(page),
            None => false,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        self.page + 1 < self.total_pages
    }

    /// Page buttons to render.
    pub fn page_numbers(&self) -> Range<u32> {
        0..self.total_pages
    }

    /// Replaces the active filter and returns to the first page.
    pub fn set_filter(&mut self, filter: ListFilter) {
        self.filter = filter;
        self.page = 0;
    }

    pub fn clear_filter(&mut self) {
        self.set_filter(ListFilter::None);
    }

    pub fn set_sort(&mut self, sort: SortDirection) {
        self.sort = sort;
    }

    /// Records the page count reported by the server, pulling the current page
    /// back inside the range if the list shrank.
    pub fn apply_total_pages(&mut self, total_pages: u32) {
        self.total_pages = total_pages;
        if total_pages > 0 && self.page >= total_pages {
            self.page = total_pages - 1;
        }
    }

    pub fn request(&self) -> ListRequest {
        ListRequest {
            page: self.page,
            size: self.page_size,
            sort: self.sort,
            sort_by: self.sort_by.clone(),
            filter: self
                .filter
                .column_value()
                .map(|(column, value)| (column.to_string(), value)),
        }
    }
}
