//! Single owner of the directory's UI state. Collaborators never poke at the
//! fields directly; they dispatch an [`Action`] and read derived views back.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::models::{Company, SortOption, ViewMode};
use crate::query::{self, LocationFilter, QuerySpec, ViewResult};

/// Progress of the most recent load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed(String),
}

/// Why the current page has nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// No companies exist at all.
    DirectoryEmpty,
    /// Companies exist but none match the search and filters.
    NoMatches { filters_active: bool },
}

/// State transitions.
#[derive(Debug, Clone)]
pub enum Action {
    LoadStarted,
    LoadSucceeded(Vec<Company>),
    LoadFailed(String),
    SetSearch(String),
    SetLocation(LocationFilter),
    ToggleIndustry(String),
    SetIndustries(BTreeSet<String>),
    SetSort(SortOption),
    ClearFilters,
    SetPage(usize),
    Saved(Company),
    SetViewMode(ViewMode),
}

#[derive(Debug, Clone)]
pub struct DirectoryState {
    companies: Vec<Company>,
    query: QuerySpec,
    status: LoadStatus,
    view_mode: ViewMode,
}

impl DirectoryState {
    pub fn new(page_size: usize) -> Self {
        Self {
            companies: Vec::new(),
            query: QuerySpec::with_page_size(page_size.max(1)),
            status: LoadStatus::Loading,
            view_mode: ViewMode::default(),
        }
    }

    /// Apply one transition. Any change to search, location, industries or
    /// sort sends the user back to the first page.
    pub fn reduce(&mut self, action: Action) {
        debug!(?action, "reduce");
        match action {
            Action::LoadStarted => {
                self.status = LoadStatus::Loading;
            }
            Action::LoadSucceeded(companies) => {
                self.companies = companies;
                self.status = LoadStatus::Ready;
                self.clamp_page();
            }
            Action::LoadFailed(message) => {
                warn!(%message, "load failed");
                self.status = LoadStatus::Failed(message);
            }
            Action::SetSearch(term) => {
                if self.query.search_term != term {
                    self.query.search_term = term;
                    self.query.page = 1;
                }
            }
            Action::SetLocation(location) => {
                if self.query.location != location {
                    self.query.location = location;
                    self.query.page = 1;
                }
            }
            Action::ToggleIndustry(industry) => {
                if !self.query.industries.remove(&industry) {
                    self.query.industries.insert(industry);
                }
                self.query.page = 1;
            }
            Action::SetIndustries(industries) => {
                if self.query.industries != industries {
                    self.query.industries = industries;
                    self.query.page = 1;
                }
            }
            Action::SetSort(sort) => {
                if self.query.sort != sort {
                    self.query.sort = sort;
                    self.query.page = 1;
                }
            }
            Action::ClearFilters => {
                self.query = QuerySpec::with_page_size(self.query.page_size);
            }
            Action::SetPage(page) => {
                self.query.page = page;
                self.clamp_page();
            }
            Action::Saved(company) => {
                if let Some(existing) = self.companies.iter_mut().find(|c| c.id == company.id) {
                    *existing = company;
                } else {
                    self.companies.insert(0, company);
                }
            }
            Action::SetViewMode(mode) => {
                self.view_mode = mode;
            }
        }
    }

    /// The page currently on screen.
    pub fn view(&self) -> ViewResult {
        query::apply(&self.companies, &self.query)
    }

    pub fn query(&self) -> &QuerySpec {
        &self.query
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn company(&self, id: i64) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// True when search, location or industries narrow the result. Sort order
    /// alone does not count.
    pub fn has_active_filters(&self) -> bool {
        !self.query.search_term.is_empty()
            || self.query.location != LocationFilter::All
            || !self.query.industries.is_empty()
    }

    /// `Some` when the current page is empty, explaining why.
    pub fn empty_reason(&self) -> Option<EmptyReason> {
        if self.companies.is_empty() {
            return Some(EmptyReason::DirectoryEmpty);
        }
        if self.view().items.is_empty() {
            return Some(EmptyReason::NoMatches {
                filters_active: self.has_active_filters(),
            });
        }
        None
    }

    fn clamp_page(&mut self) {
        let total = query::total_pages(
            query::filter_and_sort(&self.companies, &self.query).len(),
            self.query.page_size,
        );
        self.query.page = self.query.page.clamp(1, total.max(1));
    }
}
