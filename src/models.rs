//! Domain models shared by the store, the query engine and the TUI. These stay
//! plain data holders; filtering and persistence live elsewhere.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single company entry in the directory.
pub struct Company {
    /// Unique for the lifetime of the session and never changed after creation.
    pub id: i64,
    pub name: String,
    /// Open set of labels ("Technology", "Finance", ...).
    pub industry: String,
    pub description: String,
    pub location: String,
    pub employees: u32,
    pub founded_year: i32,
    /// URI of the company logo.
    pub logo: String,
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Payload for the save flow. A draft with an `id` updates that record, a draft
/// without one becomes a brand new company.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyDraft {
    pub id: Option<i64>,
    pub name: String,
    pub industry: String,
    pub description: String,
    pub location: String,
    pub employees: u32,
    pub founded_year: i32,
    pub logo: String,
}

impl CompanyDraft {
    /// Materialize the draft under the given id.
    pub fn into_company(self, id: i64) -> Company {
        Company {
            id,
            name: self.name,
            industry: self.industry,
            description: self.description,
            location: self.location,
            employees: self.employees,
            founded_year: self.founded_year,
            logo: self.logo,
        }
    }
}

impl From<&Company> for CompanyDraft {
    fn from(company: &Company) -> Self {
        Self {
            id: Some(company.id),
            name: company.name.clone(),
            industry: company.industry.clone(),
            description: company.description.clone(),
            location: company.location.clone(),
            employees: company.employees,
            founded_year: company.founded_year,
            logo: company.logo.clone(),
        }
    }
}

/// Field a result list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Name,
    Employees,
    FoundedYear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Sort key plus direction, e.g. "employees, high to low".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortOption {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortOption {
    /// Every option in the order the sort picker cycles through them.
    pub const ALL: [SortOption; 6] = [
        SortOption::new(SortKey::Name, SortDirection::Asc),
        SortOption::new(SortKey::Name, SortDirection::Desc),
        SortOption::new(SortKey::Employees, SortDirection::Asc),
        SortOption::new(SortKey::Employees, SortDirection::Desc),
        SortOption::new(SortKey::FoundedYear, SortDirection::Asc),
        SortOption::new(SortKey::FoundedYear, SortDirection::Desc),
    ];

    pub const fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// The option that follows this one in [`SortOption::ALL`], wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|o| *o == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn label(&self) -> &'static str {
        match (self.key, self.direction) {
            (SortKey::Name, SortDirection::Asc) => "Name (A-Z)",
            (SortKey::Name, SortDirection::Desc) => "Name (Z-A)",
            (SortKey::Employees, SortDirection::Asc) => "Employees (Low-High)",
            (SortKey::Employees, SortDirection::Desc) => "Employees (High-Low)",
            (SortKey::FoundedYear, SortDirection::Asc) => "Founded (Oldest)",
            (SortKey::FoundedYear, SortDirection::Desc) => "Founded (Newest)",
        }
    }
}

impl Default for SortOption {
    fn default() -> Self {
        SortOption::new(SortKey::Name, SortDirection::Asc)
    }
}

/// Layout of the directory listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Card,
    Table,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Card => ViewMode::Table,
            ViewMode::Table => ViewMode::Card,
        }
    }
}
