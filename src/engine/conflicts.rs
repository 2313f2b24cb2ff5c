use super::types::ConflictFilter;
use super::Planner;
use crate::availability;
use crate::model::{AssignmentId, ConflictRecord, DutyRole, PersonId};
use chrono::NaiveDate;

/// Re-vérifie chaque affectation contre les statuts connus aujourd'hui et
/// ouvre un conflit pour toute personne devenue indisponible à sa date de
/// service. Idempotent : un couple (affectation, personne) déjà couvert par
/// un conflit ouvert n'est pas dupliqué.
pub(super) fn detect(planner: &mut Planner) -> Vec<ConflictRecord> {
    let mut found: Vec<(AssignmentId, NaiveDate, DutyRole, PersonId, String)> = Vec::new();

    for record in &planner.book.assignments {
        for person in &record.people {
            let Some(reason) = availability::unavailability_reason(&planner.book, person, record.date)
            else {
                continue;
            };
            if planner.book.has_pending_conflict(&record.id, person) {
                continue;
            }
            found.push((record.id.clone(), record.date, record.role, person.clone(), reason));
        }
    }

    let mut created = Vec::with_capacity(found.len());
    for (assignment, date, role, person, reason) in found {
        let conflict = ConflictRecord::new(assignment, date, role, person, reason);
        #[cfg(feature = "logging")]
        tracing::info!(date = %date, role = %role, "conflict opened");
        planner.book.save_conflict(conflict.clone());
        created.push(conflict);
    }
    created
}

pub(super) fn list<'a>(planner: &'a Planner, filter: ConflictFilter) -> Vec<&'a ConflictRecord> {
    planner
        .book
        .conflicts
        .iter()
        .filter(|c| filter.status.map_or(true, |s| c.status == s))
        .filter(|c| filter.from.map_or(true, |d| c.date >= d))
        .filter(|c| filter.to.map_or(true, |d| c.date <= d))
        .collect()
}
