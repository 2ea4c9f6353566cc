use std::mem;
use std::time::Instant;

use anyhow::Result;
use chrono::Datelike;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState,
    Wrap,
};
use ratatui::Frame;
use tracing::{error, info, warn};

use crate::error::DirectoryError;
use crate::models::{Company, CompanyDraft, ViewMode};
use crate::query::ViewResult;
use crate::route::{Navigator, Route};
use crate::service::{DirectoryService, PendingLoad};
use crate::state::{Action, DirectoryState, EmptyReason, LoadStatus};

use super::forms::{CompanyField, CompanyForm};
use super::helpers::{
    build_company_card_lines, centered_rect, format_count, page_markers, skeleton_lines,
    surface_error, PageMarker,
};
use super::screens::{grid_move, IndustryPicker, LocationPicker};

/// Number of company cards per row in the card layout.
const GRID_COLUMNS: usize = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Title bar with the search field.
const HEADER_HEIGHT: u16 = 3;
/// Summary of the active filters.
const FILTER_BAR_HEIGHT: u16 = 3;
/// Height allocation per card row.
const CARD_HEIGHT: u16 = 6;

/// Fine-grained modes layered over the current route.
enum Mode {
    Normal,
    Searching(SearchState),
    PickingLocation(LocationPicker),
    PickingIndustries(IndustryPicker),
    Editing(CompanyForm),
}

/// State for the live search input.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state for the TUI. The directory data itself lives in
/// [`DirectoryState`]; this struct adds the interaction layer on top.
pub struct App {
    service: DirectoryService,
    state: DirectoryState,
    navigator: Navigator,
    pending: Option<PendingLoad>,
    /// Cursor within the current page.
    selected: usize,
    mode: Mode,
    status: Option<StatusMessage>,
    locations: Vec<String>,
    industries: Vec<String>,
    current_year: i32,
}

impl App {
    pub fn new(service: DirectoryService, page_size: usize, initial_route: Route) -> Self {
        let mut navigator = Navigator::new(initial_route);
        navigator.subscribe(|route| info!(route = %route, "route changed"));

        Self {
            service,
            state: DirectoryState::new(page_size),
            navigator,
            pending: None,
            selected: 0,
            mode: Mode::Normal,
            status: None,
            locations: Vec::new(),
            industries: Vec::new(),
            current_year: chrono::Local::now().year(),
        }
    }

    /// Ask the service for the full record set. The result arrives on a later
    /// [`App::tick`] once the simulated latency has passed.
    pub fn request_load(&mut self, now: Instant) {
        self.state.reduce(Action::LoadStarted);
        self.pending = Some(self.service.begin_load(now));
    }

    /// Complete a pending load when it is due.
    pub fn tick(&mut self, now: Instant) {
        let Some(pending) = self.pending else {
            return;
        };
        if !pending.is_due(now) {
            return;
        }
        self.pending = None;

        match self.service.fetch_all() {
            Ok(companies) => {
                self.state.reduce(Action::LoadSucceeded(companies));
                self.refresh_facets();
                self.clamp_selection();
            }
            Err(err) => {
                if !err.is_transient() {
                    error!(error = %err, "load failed with a storage error");
                }
                self.state.reduce(Action::LoadFailed(surface_error(&err)));
            }
        }
    }

    pub fn state(&self) -> &DirectoryState {
        &self.state
    }

    pub fn route(&self) -> Route {
        self.navigator.current()
    }

    pub fn is_load_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Dispatch a key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => match self.navigator.current() {
                Route::List => self.handle_directory_key(code, &mut exit)?,
                Route::Company(id) => self.handle_detail_key(code, id, &mut exit)?,
            },
            Mode::Searching(state) => self.handle_search(code, state),
            Mode::PickingLocation(picker) => self.handle_location_picker(code, picker),
            Mode::PickingIndustries(picker) => self.handle_industry_picker(code, picker),
            Mode::Editing(form) => self.handle_form(code, form)?,
        };

        Ok(exit)
    }

    fn handle_directory_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        let card_layout = self.state.view_mode() == ViewMode::Card;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Left if card_layout => self.move_cursor(-1, 0),
            KeyCode::Right if card_layout => self.move_cursor(1, 0),
            KeyCode::Up if card_layout => self.move_cursor(0, -1),
            KeyCode::Down if card_layout => self.move_cursor(0, 1),
            KeyCode::Up => self.move_cursor(-1, 0),
            KeyCode::Down => self.move_cursor(1, 0),
            KeyCode::Left | KeyCode::PageUp | KeyCode::Char('[') => self.change_page(-1),
            KeyCode::Right | KeyCode::PageDown | KeyCode::Char(']') => self.change_page(1),
            KeyCode::Home => self.go_to_page(1),
            KeyCode::End => self.go_to_page(usize::MAX),
            KeyCode::Enter => {
                if let Some(company) = self.current_company() {
                    self.clear_status();
                    self.navigator.navigate(Route::Company(company.id));
                } else {
                    self.set_status("No company selected.", StatusKind::Error);
                }
            }
            KeyCode::Char('f') | KeyCode::Char('/') => {
                self.clear_status();
                return Ok(Mode::Searching(SearchState {
                    query: self.state.query().search_term.clone(),
                }));
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                self.clear_status();
                return Ok(Mode::PickingLocation(LocationPicker::new(
                    self.locations.clone(),
                    &self.state.query().location,
                )));
            }
            KeyCode::Char('i') | KeyCode::Char('I') => {
                if self.industries.is_empty() {
                    self.set_status("No industries to filter by yet.", StatusKind::Error);
                } else {
                    self.clear_status();
                    return Ok(Mode::PickingIndustries(IndustryPicker::new(
                        self.industries.clone(),
                        self.state.query().industries.clone(),
                    )));
                }
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                let sort = self.state.query().sort.next();
                self.dispatch(Action::SetSort(sort));
                self.set_status(format!("Sorted by {}.", sort.label()), StatusKind::Info);
            }
            KeyCode::Char('v') | KeyCode::Char('V') => {
                let mode = self.state.view_mode().toggled();
                self.state.reduce(Action::SetViewMode(mode));
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.dispatch(Action::ClearFilters);
                self.set_status("Filters cleared.", StatusKind::Info);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.clear_status();
                self.request_load(Instant::now());
            }
            KeyCode::Char('+') | KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                return Ok(Mode::Editing(CompanyForm::new(self.current_year)));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(company) = self.current_company() {
                    self.clear_status();
                    return Ok(Mode::Editing(CompanyForm::from_company(&company)));
                } else {
                    self.set_status("No company selected to edit.", StatusKind::Error);
                }
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_detail_key(&mut self, code: KeyCode, id: i64, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') => {
                *exit = true;
            }
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('b') | KeyCode::Char('B') => {
                self.clear_status();
                self.navigator.back();
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(company) = self.state.company(id).cloned() {
                    self.clear_status();
                    return Ok(Mode::Editing(CompanyForm::from_company(&company)));
                }
                self.set_status("Company not found.", StatusKind::Error);
            }
            KeyCode::Char('o') | KeyCode::Char('O') => {
                let logo = self
                    .state
                    .company(id)
                    .map(|c| c.logo.trim().to_string())
                    .unwrap_or_default();
                if logo.is_empty() {
                    self.set_status("This company does not have a logo.", StatusKind::Error);
                } else if let Err(err) = open_link(&logo) {
                    self.set_status(format!("Failed to open logo: {err}"), StatusKind::Error);
                } else {
                    self.set_status("Opened logo.", StatusKind::Info);
                }
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.clear_status();
                self.request_load(Instant::now());
            }
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        match code {
            KeyCode::Esc => {
                self.dispatch(Action::SetSearch(String::new()));
                return Mode::Normal;
            }
            KeyCode::Enter => return Mode::Normal,
            KeyCode::Up => self.move_cursor(0, -1),
            KeyCode::Down => self.move_cursor(0, 1),
            KeyCode::PageUp => self.change_page(-1),
            KeyCode::PageDown => self.change_page(1),
            KeyCode::Backspace => {
                state.query.pop();
                self.dispatch(Action::SetSearch(state.query.clone()));
            }
            KeyCode::Char(ch) if !ch.is_control() => {
                state.query.push(ch);
                self.dispatch(Action::SetSearch(state.query.clone()));
            }
            _ => {}
        }
        Mode::Searching(state)
    }

    fn handle_location_picker(&mut self, code: KeyCode, mut picker: LocationPicker) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Up => picker.move_selection(-1),
            KeyCode::Down => picker.move_selection(1),
            KeyCode::PageUp => picker.move_selection(-5),
            KeyCode::PageDown => picker.move_selection(5),
            KeyCode::Home => picker.select_first(),
            KeyCode::End => picker.select_last(),
            KeyCode::Enter => {
                let location = picker.current();
                self.set_status(format!("Location: {}.", location.label()), StatusKind::Info);
                self.dispatch(Action::SetLocation(location));
                return Mode::Normal;
            }
            _ => {}
        }
        Mode::PickingLocation(picker)
    }

    fn handle_industry_picker(&mut self, code: KeyCode, mut picker: IndustryPicker) -> Mode {
        match code {
            KeyCode::Esc => return Mode::Normal,
            KeyCode::Up => picker.move_selection(-1),
            KeyCode::Down => picker.move_selection(1),
            KeyCode::PageUp => picker.move_selection(-5),
            KeyCode::PageDown => picker.move_selection(5),
            KeyCode::Home => picker.select_first(),
            KeyCode::End => picker.select_last(),
            KeyCode::Char(' ') => picker.toggle_current(),
            KeyCode::Char('x') | KeyCode::Char('X') => picker.clear(),
            KeyCode::Enter => {
                let count = picker.checked.len();
                self.dispatch(Action::SetIndustries(picker.checked));
                if count == 0 {
                    self.set_status("Showing all industries.", StatusKind::Info);
                } else {
                    self.set_status(format!("{count} industries selected."), StatusKind::Info);
                }
                return Mode::Normal;
            }
            _ => {}
        }
        Mode::PickingIndustries(picker)
    }

    fn handle_form(&mut self, code: KeyCode, mut form: CompanyForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                let message = if form.is_edit() {
                    "Edit cancelled."
                } else {
                    "Add company cancelled."
                };
                self.set_status(message, StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab => {
                if !form.accept_suggestion() {
                    form.next_field();
                }
            }
            KeyCode::BackTab => form.previous_field(),
            KeyCode::Up => form.previous_field(),
            KeyCode::Down => form.next_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_inputs() {
                Err(err) => {
                    let message = err.to_string();
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
                Ok(draft) => match self.save_draft(draft) {
                    Ok(()) => keep_open = false,
                    Err(err) => {
                        error!(error = %err, "failed to save company");
                        let message = surface_error(&err);
                        form.error = Some(message.clone());
                        self.set_status(message, StatusKind::Error);
                    }
                },
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            form.update_suggestion(&self.industries);
            Ok(Mode::Editing(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn save_draft(&mut self, draft: CompanyDraft) -> Result<(), DirectoryError> {
        let editing = draft.id.is_some();
        let company = self.service.save(draft)?;
        let message = if editing {
            format!("Updated {}.", company.name)
        } else {
            format!("Added {}.", company.name)
        };
        self.state.reduce(Action::Saved(company));
        self.clamp_selection();
        self.set_status(message, StatusKind::Info);
        self.refresh_facets();
        Ok(())
    }

    /// Reload the picker options. On failure the previous options stay and
    /// the error goes to the footer.
    fn refresh_facets(&mut self) {
        let facets = self
            .service
            .locations()
            .and_then(|locations| Ok((locations, self.service.industries()?)));
        match facets {
            Ok((locations, industries)) => {
                self.locations = locations;
                self.industries = industries;
            }
            Err(err) => {
                warn!(error = %err, "failed to refresh filter options");
                self.set_status(
                    format!("Could not refresh filters: {}", surface_error(&err)),
                    StatusKind::Error,
                );
            }
        }
    }

    /// Reduce and keep the cursor on the first card of the new result.
    fn dispatch(&mut self, action: Action) {
        self.state.reduce(action);
        self.selected = 0;
    }

    fn current_company(&self) -> Option<Company> {
        self.state.view().items.get(self.selected).cloned()
    }

    fn move_cursor(&mut self, dx: isize, dy: isize) {
        let len = self.state.view().items.len();
        self.selected = grid_move(self.selected, len, GRID_COLUMNS, dx, dy);
    }

    fn change_page(&mut self, delta: isize) {
        let page = self.state.query().page as isize + delta;
        self.go_to_page(page.max(1) as usize);
    }

    fn go_to_page(&mut self, page: usize) {
        let before = self.state.query().page;
        self.state.reduce(Action::SetPage(page));
        if self.state.query().page != before {
            self.selected = 0;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.state.view().items.len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        match self.navigator.current() {
            Route::List => self.draw_directory(frame, content_area),
            Route::Company(id) => self.draw_detail(frame, content_area, id),
        }

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::PickingLocation(picker) => self.draw_location_picker(frame, area, picker),
            Mode::PickingIndustries(picker) => self.draw_industry_picker(frame, area, picker),
            Mode::Editing(form) => self.draw_company_form(frame, area, form),
            Mode::Normal => {}
        }
    }

    fn draw_directory(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(HEADER_HEIGHT),
                Constraint::Length(FILTER_BAR_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let view = self.state.view();
        self.draw_header(frame, chunks[0], &view);
        self.draw_filter_bar(frame, chunks[1]);

        match self.state.status() {
            LoadStatus::Loading => self.draw_skeleton(frame, chunks[2]),
            LoadStatus::Failed(message) => self.draw_load_error(frame, chunks[2], message),
            LoadStatus::Ready => match self.state.empty_reason() {
                Some(reason) => self.draw_empty_state(frame, chunks[2], reason),
                None => {
                    match self.state.view_mode() {
                        ViewMode::Card => self.draw_card_grid(frame, chunks[2], &view.items),
                        ViewMode::Table => self.draw_table(frame, chunks[2], &view.items),
                    }
                    self.draw_pagination(frame, chunks[3], &view);
                }
            },
        }
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect, view: &ViewResult) {
        let term = &self.state.query().search_term;
        let search = if term.is_empty() {
            Span::styled("Press [/] to search by name", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(format!("Search: {term}"), Style::default().fg(Color::Yellow))
        };
        let count = if self.state.is_loading() {
            String::from("loading…")
        } else {
            format!(
                "{} of {} companies",
                view.total_matches,
                self.state.companies().len()
            )
        };

        let header = Paragraph::new(Line::from(vec![
            search,
            Span::raw("   "),
            Span::styled(count, Style::default().fg(Color::Gray)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(
                    "Company Directory",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
        );
        frame.render_widget(header, area);
    }

    fn draw_filter_bar(&self, frame: &mut Frame, area: Rect) {
        let query = self.state.query();
        let label_style = Style::default().fg(Color::Gray);
        let value_style = Style::default().add_modifier(Modifier::BOLD);

        let industries = if query.industries.is_empty() {
            String::from("All Industries")
        } else {
            format!("{} Selected", query.industries.len())
        };
        let view_mode = match self.state.view_mode() {
            ViewMode::Card => "Cards",
            ViewMode::Table => "Table",
        };

        let mut spans = vec![
            Span::styled("Location: ", label_style),
            Span::styled(query.location.label().to_string(), value_style),
            Span::raw("  │  "),
            Span::styled("Industries: ", label_style),
            Span::styled(industries, value_style),
            Span::raw("  │  "),
            Span::styled("Sort: ", label_style),
            Span::styled(query.sort.label(), value_style),
            Span::raw("  │  "),
            Span::styled("View: ", label_style),
            Span::styled(view_mode, value_style),
        ];
        if self.state.has_active_filters() {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                "[c] Clear",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }

        let bar = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(bar, area);
    }

    fn draw_skeleton(&self, frame: &mut Frame, area: Rect) {
        let page_size = self.state.query().page_size;
        let rows = self.split_rows(area, page_size);
        for (row_idx, row_chunk) in rows.into_iter().enumerate() {
            for (col_idx, cell) in self.split_columns(row_chunk).into_iter().enumerate() {
                if row_idx * GRID_COLUMNS + col_idx >= page_size {
                    break;
                }
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray));
                let inner = block.inner(cell);
                let card = Paragraph::new(skeleton_lines(inner.width, inner.height)).block(block);
                frame.render_widget(card, cell);
            }
        }
    }

    fn draw_load_error(&self, frame: &mut Frame, area: Rect, message: &str) {
        let lines = vec![
            Line::from(Span::styled(
                "Oops! Something went wrong.",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(message.to_string()),
            Line::from(""),
            Line::from(Span::styled(
                "Press [r] to try again.",
                Style::default().fg(Color::Cyan),
            )),
        ];
        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, area);
    }

    fn draw_empty_state(&self, frame: &mut Frame, area: Rect, reason: EmptyReason) {
        let (title, hint) = match reason {
            EmptyReason::DirectoryEmpty => (
                "The directory is empty.",
                "Press '+' to add the first company.",
            ),
            EmptyReason::NoMatches {
                filters_active: true,
            } => (
                "No companies found.",
                "Try adjusting your criteria or press 'c' to clear all filters.",
            ),
            EmptyReason::NoMatches {
                filters_active: false,
            } => (
                "No companies found.",
                "Your search and filter combination did not return any results.",
            ),
        };
        let paragraph = Paragraph::new(vec![
            Line::from(Span::styled(
                title,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(hint, Style::default().fg(Color::Gray))),
        ])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(paragraph, area);
    }

    fn draw_card_grid(&self, frame: &mut Frame, area: Rect, items: &[Company]) {
        if items.is_empty() || area.height == 0 {
            return;
        }

        let total_rows = items.len().div_ceil(GRID_COLUMNS);
        let capacity = ((area.height / CARD_HEIGHT) as usize).max(1);
        let selected_row = self.selected / GRID_COLUMNS;
        let first_row = if selected_row >= capacity {
            selected_row + 1 - capacity
        } else {
            0
        };
        let visible_rows = capacity.min(total_rows - first_row);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
            .split(area);

        for (offset, row_chunk) in rows.iter().enumerate() {
            let row_idx = first_row + offset;
            for (col_idx, cell) in self.split_columns(*row_chunk).into_iter().enumerate() {
                let index = row_idx * GRID_COLUMNS + col_idx;
                let Some(company) = items.get(index) else {
                    break;
                };
                let is_selected = index == self.selected;
                let mut block = Block::default().borders(Borders::ALL);
                if is_selected {
                    block = block.border_style(Style::default().fg(Color::Yellow));
                }
                let inner = block.inner(cell);
                let lines =
                    build_company_card_lines(company, inner.width, inner.height, is_selected);
                let card = Paragraph::new(lines).block(block);
                frame.render_widget(card, cell);
            }
        }
    }

    fn draw_table(&self, frame: &mut Frame, area: Rect, items: &[Company]) {
        let header = Row::new(["Name", "Industry", "Location", "Employees", "Founded"])
            .style(Style::default().add_modifier(Modifier::BOLD))
            .bottom_margin(1);
        let rows = items.iter().map(|company| {
            Row::new(vec![
                Cell::from(company.name.clone()),
                Cell::from(company.industry.clone()),
                Cell::from(company.location.clone()),
                Cell::from(Text::from(format_count(company.employees)).alignment(Alignment::Right)),
                Cell::from(company.founded_year.to_string()),
            ])
        });
        let widths = [
            Constraint::Percentage(30),
            Constraint::Percentage(22),
            Constraint::Percentage(20),
            Constraint::Percentage(14),
            Constraint::Percentage(14),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL))
            .row_highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut table_state = TableState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(table, area, &mut table_state);
    }

    fn draw_pagination(&self, frame: &mut Frame, area: Rect, view: &ViewResult) {
        if view.total_pages <= 1 {
            return;
        }
        let page = self.state.query().page;
        let enabled = Style::default().fg(Color::Cyan);
        let disabled = Style::default().fg(Color::DarkGray);

        let mut spans = vec![Span::styled(
            "◀ Prev ",
            if page > 1 { enabled } else { disabled },
        )];
        for marker in page_markers(page, view.total_pages) {
            match marker {
                PageMarker::Page(n) if n == page => spans.push(Span::styled(
                    format!(" [{n}] "),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
                PageMarker::Page(n) => spans.push(Span::raw(format!(" {n} "))),
                PageMarker::Gap => spans.push(Span::styled(" … ", disabled)),
            }
        }
        spans.push(Span::styled(
            " Next ▶",
            if page < view.total_pages {
                enabled
            } else {
                disabled
            },
        ));

        frame.render_widget(
            Paragraph::new(Line::from(spans)).alignment(Alignment::Center),
            area,
        );
    }

    fn draw_detail(&self, frame: &mut Frame, area: Rect, id: i64) {
        let panel = centered_rect(80, 90, area);
        let block = Block::default().borders(Borders::ALL);

        let Some(company) = self.state.company(id) else {
            let text = if self.state.is_loading() {
                "Loading company…"
            } else {
                "Company not found. Press [Esc] to return to the directory."
            };
            let paragraph = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(block.title("Company"));
            frame.render_widget(paragraph, panel);
            return;
        };

        let label = Style::default().fg(Color::Gray);
        let lines = vec![
            Line::from(Span::styled(
                company.industry.clone(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(company.description.clone()),
            Line::from(""),
            Line::from(vec![
                Span::styled("Location:  ", label),
                Span::raw(company.location.clone()),
            ]),
            Line::from(vec![
                Span::styled("Employees: ", label),
                Span::raw(format_count(company.employees)),
            ]),
            Line::from(vec![
                Span::styled("Founded:   ", label),
                Span::raw(company.founded_year.to_string()),
            ]),
            Line::from(vec![
                Span::styled("Logo:      ", label),
                Span::styled(company.logo.clone(), Style::default().fg(Color::Cyan)),
            ]),
        ];

        let title = Span::styled(
            format!(" {} ", company.name),
            Style::default().add_modifier(Modifier::BOLD),
        );
        let paragraph = Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(block.title(title));
        frame.render_widget(paragraph, panel);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&'static str, &'static str)] = match (&self.mode, self.navigator.current()) {
            (Mode::Editing(_), _) => &[
                ("[Tab]", " Next/Accept   "),
                ("[Shift+Tab]", " Previous   "),
                ("[Enter]", " Save   "),
                ("[Esc]", " Cancel"),
            ],
            (Mode::Searching(_), _) => &[
                ("[type]", " Filter by name   "),
                ("[↑↓]", " Move   "),
                ("[Enter]", " Keep   "),
                ("[Esc]", " Clear"),
            ],
            (Mode::PickingLocation(_), _) => &[
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Apply   "),
                ("[Esc]", " Cancel"),
            ],
            (Mode::PickingIndustries(_), _) => &[
                ("[↑↓]", " Navigate   "),
                ("[Space]", " Toggle   "),
                ("[x]", " Clear   "),
                ("[Enter]", " Apply   "),
                ("[Esc]", " Cancel"),
            ],
            (Mode::Normal, Route::Company(_)) => &[
                ("[Esc]", " Back   "),
                ("[e]", " Edit   "),
                ("[o]", " Open Logo   "),
                ("[r]", " Refresh   "),
                ("[q]", " Quit"),
            ],
            (Mode::Normal, Route::List) => &[
                ("[←↑↓→]", " Move   "),
                ("[Enter]", " Open   "),
                ("[/]", " Search   "),
                ("[l]", " Location   "),
                ("[i]", " Industries   "),
                ("[s]", " Sort   "),
                ("[v]", " View   "),
                ("[[ ]]", " Page   "),
                ("[+]", " Add   "),
                ("[e]", " Edit   "),
                ("[r]", " Refresh   "),
                ("[q]", " Quit"),
            ],
        };

        Line::from(
            hints
                .iter()
                .flat_map(|(key, text)| [Span::styled(*key, key_style), Span::raw(*text)])
                .collect::<Vec<_>>(),
        )
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_location_picker(&self, frame: &mut Frame, area: Rect, picker: &LocationPicker) {
        let popup_area = centered_rect(40, 60, area);
        frame.render_widget(Clear, popup_area);

        let items: Vec<ListItem> = picker
            .options
            .iter()
            .map(|option| ListItem::new(option.label().to_string()))
            .collect();
        let list = List::new(items)
            .block(Block::default().title("Location").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(picker.selected));
        frame.render_stateful_widget(list, popup_area, &mut list_state);
    }

    fn draw_industry_picker(&self, frame: &mut Frame, area: Rect, picker: &IndustryPicker) {
        let popup_area = centered_rect(40, 60, area);
        frame.render_widget(Clear, popup_area);

        let items: Vec<ListItem> = picker
            .options
            .iter()
            .enumerate()
            .map(|(index, industry)| {
                let checkbox = if picker.is_checked(index) {
                    "[x]"
                } else {
                    "[ ]"
                };
                ListItem::new(format!("{checkbox} {industry}"))
            })
            .collect();
        let list = List::new(items)
            .block(Block::default().title("Industries").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(picker.selected));
        frame.render_stateful_widget(list, popup_area, &mut list_state);
    }

    fn draw_company_form(&self, frame: &mut Frame, area: Rect, form: &CompanyForm) {
        let popup_area = centered_rect(70, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(form.title()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines: Vec<Line> = CompanyField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to accept/switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines);
        frame.render_widget(paragraph, inner);

        let row = CompanyField::ALL
            .iter()
            .position(|field| *field == form.active)
            .unwrap_or(0) as u16;
        let cursor_x = inner.x + form.cursor_offset(form.active) as u16;
        frame.set_cursor_position((cursor_x.min(inner.right().saturating_sub(1)), inner.y + row));
    }

    fn split_rows(&self, area: Rect, items: usize) -> Vec<Rect> {
        let row_count = items.div_ceil(GRID_COLUMNS).max(1);
        let capacity = ((area.height / CARD_HEIGHT) as usize).max(1);
        let rows = row_count.min(capacity);
        Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(CARD_HEIGHT); rows])
            .split(area)
            .to_vec()
    }

    fn split_columns(&self, area: Rect) -> Vec<Rect> {
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, GRID_COLUMNS as u32); GRID_COLUMNS])
            .split(area)
            .to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{open_store, seed_companies};
    use crate::query::LocationFilter;
    use crate::service::FaultInjector;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::Duration;

    fn app_with(faults: FaultInjector, seeded: bool) -> App {
        let conn = open_store().unwrap();
        if seeded {
            seed_companies(&conn).unwrap();
        }
        let service = DirectoryService::new(conn, faults, Duration::ZERO).unwrap();
        App::new(service, 9, Route::List)
    }

    fn loaded_app() -> App {
        let mut app = app_with(FaultInjector::never(), true);
        let now = Instant::now();
        app.request_load(now);
        app.tick(now);
        app
    }

    fn press(app: &mut App, keys: &[KeyCode]) {
        for key in keys {
            assert!(!app.handle_key(*key).unwrap());
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    /// Draw one frame and return the screen as text, one line per row.
    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn load_completes_on_tick() {
        let mut app = app_with(FaultInjector::never(), true);
        let now = Instant::now();
        app.request_load(now);
        assert!(app.state().is_loading());
        render(&app);

        app.tick(now);
        assert!(!app.is_load_pending());
        assert_eq!(app.state().status(), &LoadStatus::Ready);
        assert_eq!(app.state().view().items.len(), 9);
        assert_eq!(app.state().view().total_pages, 4);
        render(&app);
    }

    #[test]
    fn failed_load_can_be_retried() {
        let mut app = app_with(FaultInjector::always(), true);
        let now = Instant::now();
        app.request_load(now);
        app.tick(now);
        assert!(matches!(app.state().status(), LoadStatus::Failed(_)));
        let screen = render(&app);
        assert!(screen.contains("Oops! Something went wrong."));
        assert!(screen.contains("Failed to connect to the server."));
        assert!(screen.contains("Press [r] to try again."));

        press(&mut app, &[KeyCode::Char('r')]);
        assert!(app.state().is_loading());
        assert!(app.is_load_pending());
    }

    #[test]
    fn search_filters_and_resets_page() {
        let mut app = loaded_app();
        press(&mut app, &[KeyCode::Char(']')]);
        assert_eq!(app.state().query().page, 2);

        press(&mut app, &[KeyCode::Char('/')]);
        type_text(&mut app, "innov");
        assert_eq!(app.state().query().page, 1);
        let names: Vec<String> = app
            .state()
            .view()
            .items
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Innovate Inc.".to_string()]);
        render(&app);

        press(&mut app, &[KeyCode::Esc]);
        assert!(app.state().query().search_term.is_empty());
    }

    #[test]
    fn enter_opens_detail_and_escape_returns() {
        let mut app = loaded_app();
        let first = app.state().view().items[0].clone();
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.route(), Route::Company(first.id));
        render(&app);

        press(&mut app, &[KeyCode::Esc]);
        assert_eq!(app.route(), Route::List);
    }

    #[test]
    fn unknown_company_route_renders_not_found() {
        let conn = open_store().unwrap();
        seed_companies(&conn).unwrap();
        let service = DirectoryService::new(conn, FaultInjector::never(), Duration::ZERO).unwrap();
        let mut app = App::new(service, 9, Route::parse("#/company/999"));
        let now = Instant::now();
        app.request_load(now);
        assert!(render(&app).contains("Loading company…"));
        app.tick(now);
        assert_eq!(app.route(), Route::Company(999));
        let screen = render(&app);
        assert!(screen.contains("Company not found."));
        assert!(!screen.contains("Loading company"));
        press(&mut app, &[KeyCode::Char('e')]);
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn adding_a_company_prepends_it() {
        let mut app = loaded_app();
        press(&mut app, &[KeyCode::Char('+')]);
        type_text(&mut app, "Zeta Labs");
        press(&mut app, &[KeyCode::Tab]);
        type_text(&mut app, "Research");
        press(&mut app, &[KeyCode::Tab]);
        type_text(&mut app, "Goa");
        render(&app);
        press(&mut app, &[KeyCode::Enter]);

        assert!(matches!(app.mode, Mode::Normal));
        let companies = app.state().companies();
        assert_eq!(companies.len(), 33);
        assert_eq!(companies[0].name, "Zeta Labs");
        assert_eq!(companies[0].id, 33);
        assert!(app.industries.contains(&"Research".to_string()));
    }

    #[test]
    fn invalid_form_stays_open() {
        let mut app = loaded_app();
        press(&mut app, &[KeyCode::Char('+')]);
        type_text(&mut app, "Nameless Industry");
        press(&mut app, &[KeyCode::Enter]);

        match &app.mode {
            Mode::Editing(form) => {
                assert_eq!(form.error.as_deref(), Some("Industry is required."));
                assert_eq!(form.name, "Nameless Industry");
            }
            _ => panic!("form should still be open"),
        }
        assert_eq!(app.state().companies().len(), 32);
    }

    #[test]
    fn editing_from_detail_updates_in_place() {
        let mut app = loaded_app();
        press(&mut app, &[KeyCode::Enter]);
        let Route::Company(id) = app.route() else {
            panic!("expected detail route");
        };
        press(&mut app, &[KeyCode::Char('e')]);
        for _ in 0..40 {
            press(&mut app, &[KeyCode::Backspace]);
        }
        type_text(&mut app, "Renamed Co");
        press(&mut app, &[KeyCode::Enter]);

        assert_eq!(app.route(), Route::Company(id));
        assert_eq!(app.state().company(id).unwrap().name, "Renamed Co");
        assert_eq!(app.state().companies().len(), 32);
    }

    #[test]
    fn industry_picker_applies_selection() {
        let mut app = loaded_app();
        press(&mut app, &[KeyCode::Char('i'), KeyCode::Char(' ')]);
        render(&app);
        press(&mut app, &[KeyCode::Enter]);

        let first_industry = app.industries[0].clone();
        assert!(app.state().query().industries.contains(&first_industry));
        assert!(app
            .state()
            .view()
            .items
            .iter()
            .all(|c| c.industry == first_industry));

        press(&mut app, &[KeyCode::Char('c')]);
        assert!(!app.state().has_active_filters());
    }

    #[test]
    fn location_picker_applies_selection() {
        let mut app = loaded_app();
        press(&mut app, &[KeyCode::Char('l'), KeyCode::Down]);
        render(&app);
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(
            app.state().query().location,
            LocationFilter::Exact("Bangalore".into())
        );
        assert_eq!(app.state().view().total_matches, 6);
    }

    #[test]
    fn sort_and_view_toggles() {
        let mut app = loaded_app();
        press(&mut app, &[KeyCode::Char('s'), KeyCode::Char('v')]);
        assert_eq!(app.state().view().items[0].name, "VirtualSpaces");
        assert_eq!(app.state().view_mode(), ViewMode::Table);
        render(&app);
        press(&mut app, &[KeyCode::Down, KeyCode::Down]);
        assert_eq!(app.selected, 2);
    }

    #[test]
    fn empty_directory_renders_empty_state() {
        let mut app = app_with(FaultInjector::never(), false);
        let now = Instant::now();
        app.request_load(now);
        app.tick(now);
        assert_eq!(app.state().empty_reason(), Some(EmptyReason::DirectoryEmpty));
        let screen = render(&app);
        assert!(screen.contains("The directory is empty."));
        assert!(screen.contains("Press '+' to add the first company."));
        press(&mut app, &[KeyCode::Enter]);
        assert_eq!(app.route(), Route::List);
    }

    #[test]
    fn filters_that_match_nothing_suggest_clearing() {
        let mut app = loaded_app();
        press(&mut app, &[KeyCode::Char('/')]);
        type_text(&mut app, "no such company");
        press(&mut app, &[KeyCode::Enter]);
        let screen = render(&app);
        assert!(screen.contains("No companies found."));
        assert!(screen.contains("press 'c' to clear all filters"));
    }

    #[test]
    fn facet_refresh_failure_keeps_app_running_and_closes_form() {
        let mut app = loaded_app();
        let industries_before = app.industries.clone();
        // Every insert also stores a row whose location is not text, which
        // breaks the facet queries without touching the saved company.
        app.service
            .store()
            .execute_batch(
                "CREATE TEMP TRIGGER bad_location AFTER INSERT ON companies
                 WHEN NEW.id < 1000
                 BEGIN
                     INSERT INTO companies (id, ordinal, name, industry, location, founded_year)
                     VALUES (NEW.id + 1000, NEW.ordinal, 'Broken', 'Broken', X'00', 2000);
                 END;",
            )
            .unwrap();

        press(&mut app, &[KeyCode::Char('+')]);
        type_text(&mut app, "Zeta Labs");
        press(&mut app, &[KeyCode::Tab]);
        type_text(&mut app, "Research");
        press(&mut app, &[KeyCode::Tab]);
        type_text(&mut app, "Goa");
        press(&mut app, &[KeyCode::Enter]);

        assert!(matches!(app.mode, Mode::Normal));
        let saved = app
            .state()
            .companies()
            .iter()
            .filter(|c| c.name == "Zeta Labs")
            .count();
        assert_eq!(saved, 1);
        assert_eq!(app.industries, industries_before);
        let status = app.status.as_ref().unwrap();
        assert!(matches!(status.kind, StatusKind::Error));
        assert!(status.text.starts_with("Could not refresh filters:"));

        // The broken row also breaks the record query, so a reload ends in
        // the error state instead of aborting.
        let now = Instant::now();
        app.request_load(now);
        app.tick(now);
        assert!(matches!(app.state().status(), LoadStatus::Failed(_)));
        render(&app);
    }

    #[test]
    fn quit_exits() {
        let mut app = loaded_app();
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }
}
