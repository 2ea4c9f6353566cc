//! Persistence helpers around the in-memory SQLite store that stands in for the
//! directory backend.

mod companies;
mod connection;
mod seed;

pub use companies::{
    fetch_companies, fetch_company, fetch_industries, fetch_locations, insert_company,
    max_company_id, update_company,
};
pub use connection::{ensure_schema, open_store};
pub use seed::seed_companies;
