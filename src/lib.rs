//! Core library surface for the company directory TUI.
//!
//! The query engine and state reducer are plain functions over in-memory
//! records, so they can be reused without the terminal front-end.
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod query;
pub mod route;
pub mod service;
pub mod state;
pub mod ui;

pub use config::Config;
pub use error::DirectoryError;
pub use models::{Company, CompanyDraft, SortOption, ViewMode};
pub use query::{apply, LocationFilter, QuerySpec, ViewResult};
pub use route::{Navigator, Route};
pub use service::{DirectoryService, FaultInjector};
pub use state::{Action, DirectoryState};

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
