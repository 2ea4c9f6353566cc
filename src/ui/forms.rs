use anyhow::{anyhow, Context, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::{Company, CompanyDraft};

/// Fields of the company form, in focus order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) enum CompanyField {
    #[default]
    Name,
    Industry,
    Location,
    Description,
    Employees,
    FoundedYear,
    Logo,
}

impl CompanyField {
    pub(crate) const ALL: [CompanyField; 7] = [
        CompanyField::Name,
        CompanyField::Industry,
        CompanyField::Location,
        CompanyField::Description,
        CompanyField::Employees,
        CompanyField::FoundedYear,
        CompanyField::Logo,
    ];

    pub(crate) fn label(self) -> &'static str {
        match self {
            CompanyField::Name => "Name",
            CompanyField::Industry => "Industry",
            CompanyField::Location => "Location",
            CompanyField::Description => "Description",
            CompanyField::Employees => "Employees",
            CompanyField::FoundedYear => "Founded",
            CompanyField::Logo => "Logo URL",
        }
    }

    fn is_required(self) -> bool {
        matches!(
            self,
            CompanyField::Name | CompanyField::Industry | CompanyField::Location
        )
    }

    fn is_numeric(self) -> bool {
        matches!(self, CompanyField::Employees | CompanyField::FoundedYear)
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }
}

/// Add/edit form state, including industry autocomplete tracking.
#[derive(Default, Clone, Debug)]
pub(crate) struct CompanyForm {
    /// Present when editing an existing company.
    pub(crate) id: Option<i64>,
    pub(crate) name: String,
    pub(crate) industry: String,
    pub(crate) location: String,
    pub(crate) description: String,
    pub(crate) employees: String,
    pub(crate) founded_year: String,
    pub(crate) logo: String,
    pub(crate) active: CompanyField,
    pub(crate) error: Option<String>,
    pub(crate) suggestion: Option<String>,
    pub(crate) autocomplete_disabled: bool,
}

impl CompanyForm {
    /// Blank form for a new company, founded "this year" by default.
    pub(crate) fn new(current_year: i32) -> Self {
        Self {
            employees: "0".to_string(),
            founded_year: current_year.to_string(),
            ..Self::default()
        }
    }

    /// Pre-fill the form from an existing company when editing.
    pub(crate) fn from_company(company: &Company) -> Self {
        Self {
            id: Some(company.id),
            name: company.name.clone(),
            industry: company.industry.clone(),
            location: company.location.clone(),
            description: company.description.clone(),
            employees: company.employees.to_string(),
            founded_year: company.founded_year.to_string(),
            logo: company.logo.clone(),
            ..Self::default()
        }
    }

    pub(crate) fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    pub(crate) fn title(&self) -> &'static str {
        if self.is_edit() {
            "Edit Company"
        } else {
            "Add Company"
        }
    }

    pub(crate) fn focus(&mut self, field: CompanyField) {
        self.active = field;
        if field != CompanyField::Industry {
            self.suggestion = None;
        }
    }

    /// Move focus to the next field, wrapping around.
    pub(crate) fn next_field(&mut self) {
        let next = (self.active.index() + 1) % CompanyField::ALL.len();
        self.focus(CompanyField::ALL[next]);
    }

    /// Move focus to the previous field, wrapping around.
    pub(crate) fn previous_field(&mut self) {
        let len = CompanyField::ALL.len();
        let previous = (self.active.index() + len - 1) % len;
        self.focus(CompanyField::ALL[previous]);
    }

    fn value(&self, field: CompanyField) -> &String {
        match field {
            CompanyField::Name => &self.name,
            CompanyField::Industry => &self.industry,
            CompanyField::Location => &self.location,
            CompanyField::Description => &self.description,
            CompanyField::Employees => &self.employees,
            CompanyField::FoundedYear => &self.founded_year,
            CompanyField::Logo => &self.logo,
        }
    }

    fn value_mut(&mut self, field: CompanyField) -> &mut String {
        match field {
            CompanyField::Name => &mut self.name,
            CompanyField::Industry => &mut self.industry,
            CompanyField::Location => &mut self.location,
            CompanyField::Description => &mut self.description,
            CompanyField::Employees => &mut self.employees,
            CompanyField::FoundedYear => &mut self.founded_year,
            CompanyField::Logo => &mut self.logo,
        }
    }

    /// Append a character to the active field. Numeric fields only take
    /// digits. Returns whether the input was accepted.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        let field = self.active;
        if field.is_numeric() && !ch.is_ascii_digit() {
            return false;
        }
        if field == CompanyField::Industry {
            self.autocomplete_disabled = false;
        }
        self.value_mut(field).push(ch);
        true
    }

    /// Remove the last character of the active field.
    pub(crate) fn backspace(&mut self) {
        let field = self.active;
        self.value_mut(field).pop();
        if field == CompanyField::Industry {
            self.autocomplete_disabled = false;
        }
    }

    /// Check required fields and convert the text inputs into a draft ready
    /// for the service.
    pub(crate) fn parse_inputs(&self) -> Result<CompanyDraft> {
        for field in CompanyField::ALL {
            if field.is_required() && self.value(field).trim().is_empty() {
                return Err(anyhow!("{} is required.", field.label()));
            }
        }

        let employees_raw = self.employees.trim();
        let employees = if employees_raw.is_empty() {
            0
        } else {
            employees_raw
                .parse::<u32>()
                .context("Employees must be a whole number.")?
        };

        let founded_raw = self.founded_year.trim();
        if founded_raw.is_empty() {
            return Err(anyhow!("Founded year is required."));
        }
        let founded_year = founded_raw
            .parse::<i32>()
            .context("Founded year must be a whole number.")?;

        Ok(CompanyDraft {
            id: self.id,
            name: self.name.trim().to_string(),
            industry: self.industry.trim().to_string(),
            description: self.description.trim().to_string(),
            location: self.location.trim().to_string(),
            employees,
            founded_year,
            logo: self.logo.trim().to_string(),
        })
    }

    /// Refresh the industry suggestion from the known industries.
    pub(crate) fn update_suggestion(&mut self, industries: &[String]) {
        if self.active != CompanyField::Industry
            || self.autocomplete_disabled
            || self.industry.is_empty()
        {
            self.suggestion = None;
            return;
        }

        let current_lower = self.industry.to_lowercase();
        self.suggestion = industries
            .iter()
            .find(|candidate| candidate.to_lowercase().starts_with(&current_lower))
            .filter(|candidate| candidate.to_lowercase() != current_lower)
            .cloned();
    }

    /// Take the suggested industry. Returns false when nothing was suggested.
    pub(crate) fn accept_suggestion(&mut self) -> bool {
        match self.suggestion.take() {
            Some(candidate) if self.active == CompanyField::Industry => {
                self.industry = candidate;
                self.autocomplete_disabled = true;
                true
            }
            _ => false,
        }
    }

    /// Remaining characters of the suggestion, shown as a ghost hint.
    pub(crate) fn suggestion_suffix(&self) -> Option<String> {
        let candidate = self.suggestion.as_ref()?;
        let suffix: String = candidate
            .chars()
            .skip(self.industry.chars().count())
            .collect();
        if suffix.is_empty() {
            None
        } else {
            Some(suffix)
        }
    }

    /// Render one form row.
    pub(crate) fn build_line(&self, field: CompanyField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let placeholder = if field.is_required() {
            "<required>"
        } else {
            "<optional>"
        };
        let display = if value.is_empty() {
            placeholder.to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        let mut spans = vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ];
        if field == CompanyField::Industry && is_active && !value.is_empty() {
            if let Some(suffix) = self.suggestion_suffix() {
                spans.push(Span::styled(suffix, Style::default().fg(Color::DarkGray)));
            }
        }

        Line::from(spans)
    }

    /// Prefix width plus value length, for cursor placement.
    pub(crate) fn cursor_offset(&self, field: CompanyField) -> usize {
        field.label().len() + 2 + self.value(field).chars().count()
    }
}
