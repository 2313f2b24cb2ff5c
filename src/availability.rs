//! Résolution de disponibilité : une personne peut-elle prendre le service
//! un jour donné ?
//!
//! Toutes les comparaisons se font en jours calendaires entiers
//! (`NaiveDate`) ; aucune composante horaire n'entre en jeu.

use crate::model::{DutyBook, Person, PersonId, StatusPeriod};
use chrono::NaiveDate;

/// Une personne inconnue est traitée comme indisponible : le moteur doit
/// pouvoir l'ignorer sans interrompre une génération.
pub fn is_available(book: &DutyBook, person: &PersonId, date: NaiveDate) -> bool {
    let Some(p) = book.find_person_by_id(person) else {
        return false;
    };
    match covering_period(p, date) {
        Some(period) => period.kind.allows_duty(),
        None => p.base_status.allows_duty(),
    }
}

/// Motif d'indisponibilité lisible, composé du statut et de ses bornes.
/// `None` si la personne est disponible ce jour-là.
pub fn unavailability_reason(
    book: &DutyBook,
    person: &PersonId,
    date: NaiveDate,
) -> Option<String> {
    let Some(p) = book.find_person_by_id(person) else {
        return Some(format!("unknown person: {}", person.as_str()));
    };
    match covering_period(p, date) {
        Some(period) if !period.kind.allows_duty() => {
            let mut reason = format!("{} {}..{}", period.kind.as_str(), period.start, period.end);
            if let Some(text) = &period.reason {
                reason.push_str(" (");
                reason.push_str(text);
                reason.push(')');
            }
            Some(reason)
        }
        Some(_) => None,
        None if !p.base_status.allows_duty() => Some(p.base_status.as_str().to_string()),
        None => None,
    }
}

/// Période couvrant `date`. En cas de chevauchement, la période saisie en
/// dernier l'emporte.
fn covering_period(person: &Person, date: NaiveDate) -> Option<&StatusPeriod> {
    person.statuses.iter().rev().find(|s| s.contains(date))
}
