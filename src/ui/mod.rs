//! Ratatui front-end for the company directory: a card/table listing with
//! search, filters and paging, a detail view per company, and an add/edit form.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
