//! Mock directory backend. Loads and saves go through the in-memory store, but
//! loads can be delayed and made to fail so the UI's loading and error states
//! get exercised the same way a flaky network would exercise them.

use std::time::{Duration, Instant};

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;
use tracing::{debug, error, info};

use crate::db::{
    fetch_companies, fetch_company, fetch_industries, fetch_locations, insert_company,
    max_company_id, update_company,
};
use crate::error::DirectoryError;
use crate::models::{Company, CompanyDraft};

/// Failure probability of a load when nothing else is configured.
pub const DEFAULT_FAILURE_RATE: f64 = 0.2;
/// Simulated round-trip time of a load.
pub const DEFAULT_LOAD_DELAY: Duration = Duration::from_millis(1500);

const NETWORK_ERROR_MESSAGE: &str =
    "Failed to connect to the server. Please check your connection and try again.";

/// Decides whether a simulated request fails. Seeding makes the sequence of
/// outcomes reproducible.
pub struct FaultInjector {
    failure_rate: f64,
    rng: StdRng,
}

impl FaultInjector {
    pub fn new(failure_rate: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            failure_rate: clamp_rate(failure_rate),
            rng,
        }
    }

    /// Every request succeeds.
    pub fn never() -> Self {
        Self::new(0.0, Some(0))
    }

    /// Every request fails.
    pub fn always() -> Self {
        Self::new(1.0, Some(0))
    }

    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    /// Roll for the next request.
    pub fn should_fail(&mut self) -> bool {
        self.rng.gen_bool(self.failure_rate)
    }
}

fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}

/// Source of ids for newly added companies.
pub trait IdGenerator {
    fn next_id(&mut self) -> i64;
}

/// Monotonic counter. Seed it with the largest id in use and it never hands out
/// a duplicate.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: i64,
}

impl SequentialIds {
    pub fn starting_after(last: i64) -> Self {
        Self {
            next: last.max(0) + 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// A load that was requested and completes once `ready_at` has passed. There
/// is no cancellation; requesting another load simply replaces this one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingLoad {
    ready_at: Instant,
}

impl PendingLoad {
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.ready_at
    }
}

/// The backend the UI talks to.
pub struct DirectoryService {
    conn: Connection,
    faults: FaultInjector,
    ids: Box<dyn IdGenerator>,
    load_delay: Duration,
}

impl DirectoryService {
    /// Wrap a prepared store. The id generator continues after the largest id
    /// already stored.
    pub fn new(
        conn: Connection,
        faults: FaultInjector,
        load_delay: Duration,
    ) -> anyhow::Result<Self> {
        let last = max_company_id(&conn)?;
        Ok(Self::with_id_generator(
            conn,
            faults,
            load_delay,
            Box::new(SequentialIds::starting_after(last)),
        ))
    }

    pub fn with_id_generator(
        conn: Connection,
        faults: FaultInjector,
        load_delay: Duration,
        ids: Box<dyn IdGenerator>,
    ) -> Self {
        Self {
            conn,
            faults,
            ids,
            load_delay,
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &Connection {
        &self.conn
    }

    /// Start a load at `now`; it becomes due after the configured delay.
    pub fn begin_load(&self, now: Instant) -> PendingLoad {
        debug!(delay_ms = self.load_delay.as_millis() as u64, "load requested");
        PendingLoad {
            ready_at: now + self.load_delay,
        }
    }

    /// Fetch the full record set, or fail with a simulated network error.
    pub fn fetch_all(&mut self) -> Result<Vec<Company>, DirectoryError> {
        if self.faults.should_fail() {
            error!("API error: failed to fetch companies");
            return Err(DirectoryError::Network(NETWORK_ERROR_MESSAGE.to_string()));
        }
        let companies = fetch_companies(&self.conn)?;
        info!(count = companies.len(), "fetched companies");
        Ok(companies)
    }

    /// Update by id when the draft carries one, otherwise insert a new company
    /// ahead of the existing ones. Returns the stored record.
    pub fn save(&mut self, mut draft: CompanyDraft) -> Result<Company, DirectoryError> {
        for (value, label) in [
            (&draft.name, "Name"),
            (&draft.industry, "Industry"),
            (&draft.location, "Location"),
        ] {
            if value.trim().is_empty() {
                return Err(DirectoryError::Validation(format!("{label} is required.")));
            }
        }
        if draft.logo.trim().is_empty() {
            draft.logo = placeholder_logo(&draft.name);
        }

        match draft.id {
            Some(id) => {
                if fetch_company(&self.conn, id)?.is_none() {
                    return Err(DirectoryError::NotFound(id));
                }
                let company = update_company(&self.conn, id, &draft)?;
                info!(id, name = %company.name, "updated company");
                Ok(company)
            }
            None => {
                let id = self.fresh_id()?;
                let company = insert_company(&self.conn, id, &draft)?;
                info!(id, name = %company.name, "added company");
                Ok(company)
            }
        }
    }

    /// Distinct locations currently present in the store.
    pub fn locations(&self) -> Result<Vec<String>, DirectoryError> {
        Ok(fetch_locations(&self.conn)?)
    }

    /// Distinct industries currently present in the store.
    pub fn industries(&self) -> Result<Vec<String>, DirectoryError> {
        Ok(fetch_industries(&self.conn)?)
    }

    fn fresh_id(&mut self) -> Result<i64, DirectoryError> {
        loop {
            let id = self.ids.next_id();
            if fetch_company(&self.conn, id)?.is_none() {
                return Ok(id);
            }
            debug!(id, "generated id already taken, skipping");
        }
    }
}

/// Image shown for companies saved without a logo.
pub fn placeholder_logo(name: &str) -> String {
    format!("https://picsum.photos/seed/{}/100/100", encode_component(name))
}

/// Characters `encodeURIComponent` escapes: everything except ASCII
/// alphanumerics and `-_.!~*'()`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{open_store, seed_companies};
    use std::collections::HashSet;

    fn service(faults: FaultInjector) -> DirectoryService {
        let conn = open_store().unwrap();
        seed_companies(&conn).unwrap();
        DirectoryService::new(conn, faults, Duration::ZERO).unwrap()
    }

    fn draft(name: &str) -> CompanyDraft {
        CompanyDraft {
            id: None,
            name: name.into(),
            industry: "Technology".into(),
            description: "Something new.".into(),
            location: "Pune".into(),
            employees: 5,
            founded_year: 2024,
            logo: String::new(),
        }
    }

    struct FixedIds(Vec<i64>);

    impl IdGenerator for FixedIds {
        fn next_id(&mut self) -> i64 {
            self.0.remove(0)
        }
    }

    #[test]
    fn fetch_all_returns_seeded_companies() {
        let mut svc = service(FaultInjector::never());
        assert_eq!(svc.fetch_all().unwrap().len(), 32);
    }

    #[test]
    fn fetch_all_fails_with_network_error() {
        let mut svc = service(FaultInjector::always());
        let err = svc.fetch_all().unwrap_err();
        assert!(err.is_transient());
        assert_eq!(err.to_string(), NETWORK_ERROR_MESSAGE);
    }

    #[test]
    fn seeded_injector_is_reproducible() {
        let mut a = FaultInjector::new(0.5, Some(42));
        let mut b = FaultInjector::new(0.5, Some(42));
        let left: Vec<bool> = (0..64).map(|_| a.should_fail()).collect();
        let right: Vec<bool> = (0..64).map(|_| b.should_fail()).collect();
        assert_eq!(left, right);
        assert!(left.iter().any(|f| *f));
        assert!(left.iter().any(|f| !*f));
    }

    #[test]
    fn failure_rate_is_clamped() {
        assert_eq!(FaultInjector::new(3.0, Some(1)).failure_rate(), 1.0);
        assert_eq!(FaultInjector::new(-1.0, Some(1)).failure_rate(), 0.0);
        assert_eq!(FaultInjector::new(f64::NAN, Some(1)).failure_rate(), 0.0);
    }

    #[test]
    fn save_without_id_prepends_with_unique_id() {
        let mut svc = service(FaultInjector::never());
        let before = svc.fetch_all().unwrap();
        let existing: HashSet<i64> = before.iter().map(|c| c.id).collect();

        let saved = svc.save(draft("Fresh Start")).unwrap();
        let after = svc.fetch_all().unwrap();

        assert_eq!(after.len(), before.len() + 1);
        assert_eq!(after[0], saved);
        assert!(!existing.contains(&saved.id));
    }

    #[test]
    fn save_with_id_merges_in_place() {
        let mut svc = service(FaultInjector::never());
        let original = svc.fetch_all().unwrap()[2].clone();
        let mut edit = CompanyDraft::from(&original);
        edit.employees = 9999;

        let saved = svc.save(edit).unwrap();
        assert_eq!(saved.id, original.id);

        let after = svc.fetch_all().unwrap();
        assert_eq!(after.len(), 32);
        assert_eq!(after[2].employees, 9999);
        assert_eq!(after[2].name, original.name);
    }

    #[test]
    fn save_unknown_id_is_not_found() {
        let mut svc = service(FaultInjector::never());
        let mut edit = draft("Ghost");
        edit.id = Some(404);
        assert!(matches!(svc.save(edit), Err(DirectoryError::NotFound(404))));
    }

    #[test]
    fn save_requires_name_industry_and_location() {
        let mut svc = service(FaultInjector::never());
        let mut missing = draft("  ");
        assert!(matches!(
            svc.save(missing.clone()),
            Err(DirectoryError::Validation(msg)) if msg == "Name is required."
        ));
        missing.name = "Named".into();
        missing.location.clear();
        assert!(matches!(
            svc.save(missing),
            Err(DirectoryError::Validation(msg)) if msg == "Location is required."
        ));
        assert_eq!(svc.fetch_all().unwrap().len(), 32);
    }

    #[test]
    fn colliding_ids_are_skipped() {
        let conn = open_store().unwrap();
        seed_companies(&conn).unwrap();
        let mut svc = DirectoryService::with_id_generator(
            conn,
            FaultInjector::never(),
            Duration::ZERO,
            Box::new(FixedIds(vec![3, 7, 500])),
        );
        assert_eq!(svc.save(draft("Collider")).unwrap().id, 500);
    }

    #[test]
    fn blank_logo_gets_placeholder() {
        let mut svc = service(FaultInjector::never());
        let saved = svc.save(draft("Food & Co")).unwrap();
        assert_eq!(saved.logo, "https://picsum.photos/seed/Food%20%26%20Co/100/100");
    }

    #[test]
    fn placeholder_logo_matches_uri_component_encoding() {
        assert_eq!(
            placeholder_logo("Ben & Jerry's (UK)!"),
            "https://picsum.photos/seed/Ben%20%26%20Jerry's%20(UK)!/100/100"
        );
        assert_eq!(
            placeholder_logo("Café*"),
            "https://picsum.photos/seed/Caf%C3%A9*/100/100"
        );
    }

    #[test]
    fn pending_load_becomes_due_after_delay() {
        let conn = open_store().unwrap();
        let svc =
            DirectoryService::new(conn, FaultInjector::never(), Duration::from_millis(1500)).unwrap();
        let start = Instant::now();
        let pending = svc.begin_load(start);
        assert!(!pending.is_due(start));
        assert!(pending.is_due(start + Duration::from_millis(1500)));
    }

    #[test]
    fn sequential_ids_start_after_last() {
        let mut ids = SequentialIds::starting_after(32);
        assert_eq!(ids.next_id(), 33);
        assert_eq!(ids.next_id(), 34);
        assert_eq!(SequentialIds::starting_after(-5).next_id(), 1);
    }
}
