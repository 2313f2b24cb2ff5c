use super::types::PlanError;
use super::Planner;
use crate::availability;
use crate::model::{ConflictId, ConflictStatus, PersonId, SubstitutionRecord};
use chrono::{DateTime, Utc};

/// Remplace la personne en conflit par `substitute` sur la seule affectation
/// concernée, marque le conflit résolu et archive le remplacement.
///
/// Les préconditions sont re-validées ici, jamais héritées de l'appelant :
/// un second appel sur le même conflit observe l'état `Resolved` et échoue,
/// c'est le point de sérialisation entre deux résolutions concurrentes.
pub(super) fn resolve(
    planner: &mut Planner,
    conflict_id: &ConflictId,
    substitute: &PersonId,
    reason: &str,
    now: DateTime<Utc>,
) -> Result<SubstitutionRecord, PlanError> {
    let Some(pos) = planner
        .book
        .conflicts
        .iter()
        .position(|c| &c.id == conflict_id)
    else {
        return Err(PlanError::UnknownConflict(conflict_id.as_str().to_string()));
    };

    let (assignment_id, date, original) = {
        let conflict = &planner.book.conflicts[pos];
        if conflict.status == ConflictStatus::Resolved {
            return Err(PlanError::ConflictAlreadyResolved(
                conflict_id.as_str().to_string(),
            ));
        }
        (conflict.assignment.clone(), conflict.date, conflict.person.clone())
    };

    if planner.book.find_person_by_id(substitute).is_none() {
        return Err(PlanError::UnknownPerson(substitute.as_str().to_string()));
    }
    if !availability::is_available(&planner.book, substitute, date) {
        return Err(PlanError::SubstituteUnavailable(
            substitute.as_str().to_string(),
        ));
    }

    let Some(record) = planner.book.find_assignment_mut(&assignment_id) else {
        return Err(PlanError::Other(anyhow::anyhow!(
            "conflict {} references a missing assignment",
            conflict_id.as_str()
        )));
    };
    // Dans un binôme, seul le membre en conflit est remplacé.
    let Some(slot) = record.people.iter_mut().find(|p| **p == original) else {
        return Err(PlanError::Other(anyhow::anyhow!(
            "conflicted person is no longer on assignment {}",
            assignment_id.as_str()
        )));
    };
    *slot = substitute.clone();
    record.substituted = true;
    record.original = Some(original.clone());

    let substitution =
        SubstitutionRecord::new(assignment_id, original, substitute.clone(), reason, now);
    planner.book.conflicts[pos].status = ConflictStatus::Resolved;
    planner.book.conflicts[pos].resolution = Some(substitution.id.clone());
    planner.book.save_substitution(substitution.clone());

    Ok(substitution)
}
