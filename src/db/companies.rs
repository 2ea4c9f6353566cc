use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::models::{Company, CompanyDraft};

const COMPANY_COLUMNS: &str =
    "id, name, industry, description, location, employees, founded_year, logo";

fn company_from_row(row: &Row<'_>) -> rusqlite::Result<Company> {
    Ok(Company {
        id: row.get(0)?,
        name: row.get(1)?,
        industry: row.get(2)?,
        description: row.get(3)?,
        location: row.get(4)?,
        employees: row.get(5)?,
        founded_year: row.get(6)?,
        logo: row.get(7)?,
    })
}

/// Every company in source order: most recently added first, seed data after.
pub fn fetch_companies(conn: &Connection) -> Result<Vec<Company>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies ORDER BY ordinal, id"
        ))
        .context("failed to prepare company query")?;

    let companies = stmt
        .query_map([], company_from_row)
        .context("failed to load companies")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect companies")?;

    Ok(companies)
}

/// Look up a single company by id.
pub fn fetch_company(conn: &Connection, id: i64) -> Result<Option<Company>> {
    conn.query_row(
        &format!("SELECT {COMPANY_COLUMNS} FROM companies WHERE id = ?1"),
        params![id],
        company_from_row,
    )
    .optional()
    .context("failed to load company")
}

/// Insert a company under `id` ahead of every existing row.
pub fn insert_company(conn: &Connection, id: i64, draft: &CompanyDraft) -> Result<Company> {
    let ordinal: i64 = conn
        .query_row(
            "SELECT COALESCE(MIN(ordinal), 1) - 1 FROM companies",
            [],
            |row| row.get(0),
        )
        .context("failed to compute insert position")?;

    conn.execute(
        "INSERT INTO companies
            (id, ordinal, name, industry, description, location, employees, founded_year, logo)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            id,
            ordinal,
            draft.name,
            draft.industry,
            draft.description,
            draft.location,
            draft.employees,
            draft.founded_year,
            draft.logo,
        ],
    )
    .context("failed to insert company")?;

    Ok(draft.clone().into_company(id))
}

/// Overwrite the editable fields of an existing company. The id and its
/// position in source order stay as they were.
pub fn update_company(conn: &Connection, id: i64, draft: &CompanyDraft) -> Result<Company> {
    let updated = conn
        .execute(
            "UPDATE companies
             SET name = ?1, industry = ?2, description = ?3, location = ?4,
                 employees = ?5, founded_year = ?6, logo = ?7
             WHERE id = ?8",
            params![
                draft.name,
                draft.industry,
                draft.description,
                draft.location,
                draft.employees,
                draft.founded_year,
                draft.logo,
                id,
            ],
        )
        .context("failed to update company")?;

    if updated == 0 {
        Err(anyhow!("Company not found"))
    } else {
        Ok(draft.clone().into_company(id))
    }
}

/// Highest id currently stored, or 0 for an empty table.
pub fn max_company_id(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COALESCE(MAX(id), 0) FROM companies", [], |row| {
        row.get(0)
    })
    .context("failed to read highest company id")
}

/// Distinct locations for the location picker, sorted case-insensitively.
pub fn fetch_locations(conn: &Connection) -> Result<Vec<String>> {
    fetch_distinct(conn, "location")
}

/// Distinct industries for the industry picker and the form's autocomplete.
pub fn fetch_industries(conn: &Connection) -> Result<Vec<String>> {
    fetch_distinct(conn, "industry")
}

fn fetch_distinct(conn: &Connection, column: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT DISTINCT {column} FROM companies
             WHERE {column} <> ''
             ORDER BY LOWER({column}), {column}"
        ))
        .with_context(|| format!("failed to prepare {column} query"))?;

    let mut rows = stmt
        .query([])
        .with_context(|| format!("failed to execute {column} query"))?;

    let mut values = Vec::new();
    while let Some(row) = rows.next().context("failed to fetch facet row")? {
        let value: String = row.get(0).context("failed to read facet value")?;
        values.push(value);
    }

    Ok(values)
}
