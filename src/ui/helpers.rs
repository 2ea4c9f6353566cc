use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::models::Company;

/// Group digits in threes: `12500` becomes `12,500`.
pub(crate) fn format_count(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Cut `text` to `width` characters, marking the cut with an ellipsis.
pub(crate) fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut cut: String = text.chars().take(width - 1).collect();
    cut.push('…');
    cut
}

/// One slot of the pagination strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PageMarker {
    Page(usize),
    Gap,
}

/// Page numbers to show around `current`: everything for five pages or fewer,
/// otherwise the first and last page plus a window around the current one.
pub(crate) fn page_markers(current: usize, total: usize) -> Vec<PageMarker> {
    use PageMarker::{Gap, Page};

    if total <= 5 {
        return (1..=total).map(Page).collect();
    }
    if current <= 3 {
        vec![Page(1), Page(2), Page(3), Page(4), Gap, Page(total)]
    } else if current > total - 3 {
        vec![
            Page(1),
            Gap,
            Page(total - 3),
            Page(total - 2),
            Page(total - 1),
            Page(total),
        ]
    } else {
        vec![
            Page(1),
            Gap,
            Page(current - 1),
            Page(current),
            Page(current + 1),
            Gap,
            Page(total),
        ]
    }
}

/// Text of a company card: name, industry, location, headcount and the
/// start of the description, clipped to the card's inner size.
pub(crate) fn build_company_card_lines(
    company: &Company,
    inner_width: u16,
    inner_height: u16,
    selected: bool,
) -> Vec<Line<'static>> {
    let width = inner_width as usize;
    let height = inner_height as usize;
    if width == 0 || height == 0 {
        return vec![Line::from("")];
    }

    let name = if selected {
        format!("▶ {}", company.name)
    } else {
        company.name.clone()
    };
    let mut lines = vec![
        Line::from(Span::styled(
            truncate(&name, width),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate(&company.industry, width),
            Style::default().fg(Color::Cyan),
        )),
        Line::from(Span::styled(
            truncate(
                &format!(
                    "{} • {} staff • est. {}",
                    company.location,
                    format_count(company.employees),
                    company.founded_year
                ),
                width,
            ),
            Style::default().fg(Color::Gray),
        )),
    ];

    if height > lines.len() && !company.description.is_empty() {
        lines.push(Line::from(truncate(&company.description, width)));
    }

    lines.truncate(height);
    lines
}

/// Placeholder card body shown while a load is in flight.
pub(crate) fn skeleton_lines(inner_width: u16, inner_height: u16) -> Vec<Line<'static>> {
    let width = inner_width as usize;
    let style = Style::default().fg(Color::DarkGray);
    let bars = [width * 2 / 3, width / 2, width * 3 / 4];
    (0..inner_height as usize)
        .map(|row| Line::from(Span::styled("░".repeat(bars[row % bars.len()]), style)))
        .collect()
}

/// Produce a rectangle centered within `area` that spans the requested percent
/// of the width and height. Used for modal dialogs.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(area);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(horizontal[1]);

    vertical[1]
}

/// Extract the most relevant error message from a chained error.
pub(crate) fn surface_error(err: &(dyn std::error::Error + 'static)) -> String {
    let mut cause = err;
    while let Some(source) = cause.source() {
        cause = source;
    }
    cause.to_string()
}
