use crate::model::{DutyBook, DutyRole, Person, StatusKind, StatusPeriod};
use anyhow::{bail, Context};
use chrono::{DateTime, NaiveDate, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use std::fs;
use std::path::Path;

/// Import de personnes depuis CSV :
/// header `handle,display_name[,roles][,base_status][,statuses]`.
///
/// `roles` : tags séparés par `|` (ex. `leader|duty_officer`).
/// `statuses` : périodes `kind:YYYY-MM-DD..YYYY-MM-DD[:motif]` séparées par `;`.
pub fn import_people_csv<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<Person>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_path(path)?;
    let mut out = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let handle = rec.get(0).context("missing handle")?.trim();
        let display = rec.get(1).context("missing display_name")?.trim();
        if handle.is_empty() || display.is_empty() {
            bail!("invalid people row (empty)");
        }
        let mut person = Person::new(handle.to_string(), display.to_string());
        if let Some(roles) = rec.get(2) {
            let roles = roles.trim();
            if !roles.is_empty() {
                person.roles = parse_roles(roles)
                    .with_context(|| format!("invalid roles value for handle {handle}"))?;
            }
        }
        if let Some(base) = rec.get(3) {
            let base = base.trim();
            if !base.is_empty() {
                person.base_status = StatusKind::parse(base)
                    .with_context(|| format!("invalid base_status value for handle {handle}"))?;
            }
        }
        if let Some(periods) = rec.get(4) {
            let periods = periods.trim();
            if !periods.is_empty() {
                person.statuses = parse_status_periods(periods)
                    .with_context(|| format!("invalid statuses value for handle {handle}"))?;
            }
        }
        out.push(person);
    }
    Ok(out)
}

fn parse_roles(raw: &str) -> anyhow::Result<Vec<DutyRole>> {
    raw.split('|')
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| {
            DutyRole::parse(chunk).with_context(|| format!("unknown role tag: {chunk}"))
        })
        .collect()
}

fn parse_status_periods(raw: &str) -> anyhow::Result<Vec<StatusPeriod>> {
    raw.split(';')
        .filter(|chunk| !chunk.trim().is_empty())
        .map(|chunk| parse_status_chunk(chunk.trim()))
        .collect()
}

/// Un morceau `kind:start..end[:motif]`.
fn parse_status_chunk(chunk: &str) -> anyhow::Result<StatusPeriod> {
    let (kind_raw, rest) = chunk
        .split_once(':')
        .with_context(|| format!("expected kind:start..end, got {chunk}"))?;
    let kind =
        StatusKind::parse(kind_raw).with_context(|| format!("unknown status kind: {kind_raw}"))?;
    let (range_raw, reason) = match rest.split_once(':') {
        Some((range, reason)) => (range, Some(reason.trim().to_string())),
        None => (rest, None),
    };
    let (start_raw, end_raw) = range_raw
        .split_once("..")
        .with_context(|| format!("expected start..end, got {range_raw}"))?;
    let start = parse_day(start_raw.trim())?;
    let end = parse_day(end_raw.trim())?;
    StatusPeriod::new(kind, start, end, reason).map_err(anyhow::Error::msg)
}

/// Date calendaire, ou instant RFC3339 tronqué au jour.
fn parse_day(raw: &str) -> anyhow::Result<NaiveDate> {
    if let Ok(dt) = raw.parse::<DateTime<Utc>>() {
        return Ok(dt.date_naive());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("invalid date/datetime: {raw}"))
}

/// Export JSON du tableau de service (jolie mise en forme)
pub fn export_book_json<P: AsRef<Path>>(path: P, book: &DutyBook) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(book)?;
    fs::write(path, s)?;
    Ok(())
}

/// Export CSV des affectations :
/// header `date,role,assigned_handles,continuous,substituted`
pub fn export_assignments_csv<P: AsRef<Path>>(path: P, book: &DutyBook) -> anyhow::Result<()> {
    let mut w = WriterBuilder::new().has_headers(true).from_path(path)?;
    w.write_record(["date", "role", "assigned_handles", "continuous", "substituted"])?;
    let mut records: Vec<_> = book.assignments.iter().collect();
    records.sort_by_key(|a| (a.date, a.role.as_str()));
    for a in records {
        let handles = a
            .people
            .iter()
            .map(|pid| {
                book.find_person_by_id(pid)
                    .map(|p| p.handle.as_str())
                    .unwrap_or("?")
            })
            .collect::<Vec<_>>()
            .join("|");
        let date = a.date.to_string();
        w.write_record([
            date.as_str(),
            a.role.as_str(),
            handles.as_str(),
            if a.continuous { "true" } else { "false" },
            if a.substituted { "true" } else { "false" },
        ])?;
    }
    w.flush()?;
    Ok(())
}
