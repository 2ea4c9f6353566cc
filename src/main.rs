//! Binary entry point: bring up logging and the mock backend, then drive the
//! Ratatui event loop until the user exits.
use std::time::Instant;

use clap::Parser;
use tracing::info;

use company_directory::db::{open_store, seed_companies};
use company_directory::logging::init_logging;
use company_directory::{run_app, App, Config, DirectoryService, FaultInjector, Route};

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    let log_path = init_logging(config.log_file.as_deref())?;
    info!(log = %log_path.display(), "starting company directory");

    let conn = open_store()?;
    if !config.no_seed_data {
        let inserted = seed_companies(&conn)?;
        info!(inserted, "seeded demo companies");
    }

    let faults = FaultInjector::new(config.failure_rate, config.seed);
    let service = DirectoryService::new(conn, faults, config.load_delay())?;
    let route = config
        .open
        .as_deref()
        .map(Route::parse)
        .unwrap_or_default();

    let mut app = App::new(service, config.page_size(), route);
    app.request_load(Instant::now());
    let result = run_app(&mut app);
    info!("company directory closed");
    result
}
