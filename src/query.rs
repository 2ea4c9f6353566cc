//! Pure filter/sort/paginate pipeline behind the directory listing. Nothing in
//! here touches the store or mutates its input; the state owner re-runs it on
//! every change.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::models::{Company, SortDirection, SortKey, SortOption};

/// Number of companies shown per page unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: usize = 9;

/// Location constraint of a query.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LocationFilter {
    #[default]
    All,
    Exact(String),
}

impl LocationFilter {
    fn matches(&self, location: &str) -> bool {
        match self {
            LocationFilter::All => true,
            LocationFilter::Exact(wanted) => wanted == location,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            LocationFilter::All => "All Locations",
            LocationFilter::Exact(location) => location,
        }
    }
}

/// Combined filter, sort and page parameters driving one view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub search_term: String,
    pub location: LocationFilter,
    pub industries: BTreeSet<String>,
    pub sort: SortOption,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            location: LocationFilter::All,
            industries: BTreeSet::new(),
            sort: SortOption::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QuerySpec {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size,
            ..Self::default()
        }
    }
}

/// One page of filtered, sorted companies.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewResult {
    pub items: Vec<Company>,
    pub total_pages: usize,
    /// Matches across all pages.
    pub total_matches: usize,
}

/// Run the full pipeline and cut out the requested page.
pub fn apply(records: &[Company], spec: &QuerySpec) -> ViewResult {
    let matches = filter_and_sort(records, spec);
    let page_size = spec.page_size.max(1);
    let total_matches = matches.len();
    let start = spec.page.saturating_sub(1).saturating_mul(page_size);

    let items = if start >= total_matches {
        Vec::new()
    } else {
        let end = (start + page_size).min(total_matches);
        matches[start..end].to_vec()
    };

    ViewResult {
        items,
        total_pages: total_pages(total_matches, page_size),
        total_matches,
    }
}

/// Filter and sort without paginating.
pub fn filter_and_sort(records: &[Company], spec: &QuerySpec) -> Vec<Company> {
    let term = spec.search_term.to_lowercase();

    let mut matches: Vec<Company> = records
        .iter()
        .filter(|c| term.is_empty() || c.name.to_lowercase().contains(&term))
        .filter(|c| spec.location.matches(&c.location))
        .filter(|c| spec.industries.is_empty() || spec.industries.contains(&c.industry))
        .cloned()
        .collect();

    // `sort_by` is stable, so equal keys keep their filtered order.
    matches.sort_by(|a, b| compare(a, b, spec.sort));
    matches
}

/// `ceil(count / page_size)`, zero for an empty result.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1))
}

fn compare(a: &Company, b: &Company, sort: SortOption) -> Ordering {
    let ordering = match sort.key {
        SortKey::Name => collate(&a.name, &b.name),
        SortKey::Employees => a.employees.cmp(&b.employees),
        SortKey::FoundedYear => a.founded_year.cmp(&b.founded_year),
    };
    match sort.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Dictionary-style comparison: accents and case are ignored first, then
/// accents break ties, then case, then the raw text.
fn collate(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| case_folded(a).cmp(case_folded(b)))
        .then_with(|| a.cmp(b))
}

/// Lowercased letters with combining marks stripped, so `É` sorts with `e`.
fn base_letters(text: &str) -> impl Iterator<Item = char> + '_ {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

fn case_folded(text: &str) -> impl Iterator<Item = char> + '_ {
    text.nfd().flat_map(char::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(id: i64, name: &str, industry: &str, location: &str, employees: u32) -> Company {
        Company {
            id,
            name: name.to_string(),
            industry: industry.to_string(),
            description: String::new(),
            location: location.to_string(),
            employees,
            founded_year: 2000 + id as i32,
            logo: String::new(),
        }
    }

    fn sample() -> Vec<Company> {
        vec![
            company(1, "Innovate Inc.", "Technology", "Bangalore", 1200),
            company(2, "Healthful Goods", "Healthcare", "Mumbai", 850),
            company(3, "Quantum Finance", "Finance", "Delhi", 2500),
            company(4, "ConnectSphere", "Technology", "Bangalore", 1800),
            company(5, "CapitalTrust", "Finance", "Mumbai", 4000),
            company(6, "NanoHealth", "Healthcare", "Hyderabad", 400),
            company(7, "NextGen AI", "Technology", "Pune", 550),
            company(8, "CyberDefend", "Technology", "Bangalore", 450),
            company(9, "CryptoVault", "Finance", "Mumbai", 80),
            company(10, "BioGenetics", "Healthcare", "Hyderabad", 600),
            company(11, "ShopSmart", "Retail", "Bangalore", 200),
        ]
    }

    fn ids(items: &[Company]) -> Vec<i64> {
        items.iter().map(|c| c.id).collect()
    }

    #[test]
    fn search_is_case_insensitive() {
        let records = vec![company(1, "Innovate Inc.", "Technology", "Bangalore", 10)];
        let spec = QuerySpec {
            search_term: "innovate".into(),
            ..QuerySpec::default()
        };
        let view = apply(&records, &spec);
        assert_eq!(ids(&view.items), vec![1]);
    }

    #[test]
    fn industry_set_excludes_other_industries() {
        let records = vec![
            company(1, "A", "Technology", "X", 1),
            company(2, "B", "Finance", "X", 1),
            company(3, "C", "Healthcare", "X", 1),
        ];
        let spec = QuerySpec {
            industries: ["Technology", "Finance"].iter().map(|s| s.to_string()).collect(),
            ..QuerySpec::default()
        };
        let view = apply(&records, &spec);
        assert_eq!(ids(&view.items), vec![1, 2]);
        assert_eq!(view.total_matches, 2);
    }

    #[test]
    fn location_filter_is_exact() {
        let spec = QuerySpec {
            location: LocationFilter::Exact("Mumbai".into()),
            ..QuerySpec::default()
        };
        let view = apply(&sample(), &spec);
        assert!(view.items.iter().all(|c| c.location == "Mumbai"));
        assert_eq!(view.total_matches, 3);

        let spec = QuerySpec {
            location: LocationFilter::Exact("mumbai".into()),
            ..QuerySpec::default()
        };
        assert_eq!(apply(&sample(), &spec).total_matches, 0);
    }

    #[test]
    fn filters_compose_conjunctively() {
        let spec = QuerySpec {
            search_term: "c".into(),
            location: LocationFilter::Exact("Bangalore".into()),
            industries: ["Technology".to_string()].into_iter().collect(),
            ..QuerySpec::default()
        };
        let view = apply(&sample(), &spec);
        // Innovate Inc., ConnectSphere, CyberDefend
        assert_eq!(ids(&view.items), vec![4, 8, 1]);
    }

    #[test]
    fn employees_desc_keeps_ties_in_source_order() {
        let records = vec![
            company(1, "A", "T", "X", 10),
            company(2, "B", "T", "X", 500),
            company(3, "C", "T", "X", 10),
        ];
        let spec = QuerySpec {
            sort: SortOption::new(SortKey::Employees, SortDirection::Desc),
            ..QuerySpec::default()
        };
        let view = apply(&records, &spec);
        assert_eq!(ids(&view.items), vec![2, 1, 3]);
    }

    #[test]
    fn toggling_direction_twice_restores_tie_order() {
        let records = vec![
            company(1, "Same", "T", "X", 5),
            company(2, "Other", "T", "X", 7),
            company(3, "Same", "T", "X", 5),
            company(4, "Same", "T", "X", 5),
        ];
        let mut spec = QuerySpec {
            sort: SortOption::new(SortKey::Employees, SortDirection::Asc),
            ..QuerySpec::default()
        };
        let first = ids(&filter_and_sort(&records, &spec));
        spec.sort.direction = spec.sort.direction.flipped();
        let flipped = ids(&filter_and_sort(&records, &spec));
        spec.sort.direction = spec.sort.direction.flipped();
        let again = ids(&filter_and_sort(&records, &spec));

        assert_eq!(first, vec![1, 3, 4, 2]);
        assert_eq!(flipped, vec![2, 1, 3, 4]);
        assert_eq!(first, again);
    }

    #[test]
    fn accented_names_sort_with_their_base_letter() {
        let records = vec![
            company(1, "Zeta", "T", "X", 1),
            company(2, "Émile Corp", "T", "X", 1),
            company(3, "Alpha", "T", "X", 1),
            company(4, "Emile Corp", "T", "X", 1),
        ];
        let spec = QuerySpec::default();
        let names: Vec<String> = filter_and_sort(&records, &spec)
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Emile Corp", "Émile Corp", "Zeta"]);
    }

    #[test]
    fn name_sort_ignores_case() {
        let records = vec![
            company(1, "beta", "T", "X", 1),
            company(2, "Alpha", "T", "X", 1),
            company(3, "Gamma", "T", "X", 1),
        ];
        let spec = QuerySpec::default();
        assert_eq!(ids(&apply(&records, &spec).items), vec![2, 1, 3]);

        let spec = QuerySpec {
            sort: SortOption::new(SortKey::Name, SortDirection::Desc),
            ..QuerySpec::default()
        };
        assert_eq!(ids(&apply(&records, &spec).items), vec![3, 1, 2]);
    }

    #[test]
    fn founded_year_sorts_numerically() {
        let spec = QuerySpec {
            sort: SortOption::new(SortKey::FoundedYear, SortDirection::Desc),
            page_size: 100,
            ..QuerySpec::default()
        };
        let view = apply(&sample(), &spec);
        let years: Vec<i32> = view.items.iter().map(|c| c.founded_year).collect();
        let mut expected = years.clone();
        expected.sort_by(|a, b| b.cmp(a));
        assert_eq!(years, expected);
    }

    #[test]
    fn pages_never_exceed_page_size() {
        let records = sample();
        for page_size in 1..=records.len() + 2 {
            for page in 1..=records.len() + 2 {
                let spec = QuerySpec {
                    page,
                    page_size,
                    ..QuerySpec::default()
                };
                let view = apply(&records, &spec);
                assert!(view.items.len() <= page_size);
                assert_eq!(view.total_pages, records.len().div_ceil(page_size));
            }
        }
    }

    #[test]
    fn pages_partition_the_sorted_matches() {
        let records = sample();
        let spec = QuerySpec::with_page_size(4);
        let all = filter_and_sort(&records, &spec);
        let mut stitched = Vec::new();
        for page in 1..=3 {
            let view = apply(&records, &QuerySpec { page, ..spec.clone() });
            stitched.extend(view.items);
        }
        assert_eq!(stitched, all);
        assert_eq!(apply(&records, &spec).total_pages, 3);
    }

    #[test]
    fn empty_result_has_no_pages_and_no_error() {
        let spec = QuerySpec {
            search_term: "does not exist".into(),
            ..QuerySpec::default()
        };
        let view = apply(&sample(), &spec);
        assert!(view.items.is_empty());
        assert_eq!(view.total_pages, 0);

        let view = apply(&[], &QuerySpec::default());
        assert!(view.items.is_empty());
        assert_eq!(view.total_pages, 0);
    }

    #[test]
    fn zero_page_size_behaves_like_one() {
        let spec = QuerySpec {
            page_size: 0,
            ..QuerySpec::default()
        };
        let view = apply(&sample(), &spec);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.total_pages, sample().len());
    }

    #[test]
    fn refiltering_filtered_data_is_a_no_op() {
        let spec = QuerySpec {
            search_term: "e".into(),
            industries: ["Technology".to_string(), "Finance".to_string()]
                .into_iter()
                .collect(),
            ..QuerySpec::default()
        };
        let once = filter_and_sort(&sample(), &spec);
        let twice = filter_and_sort(&once, &spec);
        assert_eq!(once, twice);
    }

    #[test]
    fn input_is_left_untouched() {
        let records = sample();
        let before = records.clone();
        let spec = QuerySpec {
            sort: SortOption::new(SortKey::Employees, SortDirection::Desc),
            ..QuerySpec::default()
        };
        let _ = apply(&records, &spec);
        assert_eq!(records, before);
    }
}
