use std::collections::HashMap;

use super::cursor::RotationCursor;
use super::types::{GenerateOptions, GenerationOutcome, PlanError};
use super::{pattern, util, Planner};
use crate::availability;
use crate::model::{AssignmentRecord, DutyBook, PersonId};
use crate::rules::{RotationRule, RuleKind, RuleSet};
use chrono::NaiveDate;

pub(super) fn generate(
    planner: &mut Planner,
    set: &mut RuleSet,
    start: NaiveDate,
    end: NaiveDate,
    opts: GenerateOptions,
) -> Result<GenerationOutcome, PlanError> {
    if end < start {
        return Err(PlanError::InvalidDateRange);
    }
    set.validate()?;

    if opts.clear_existing {
        planner.book.clear_assignments_between(start, end);
    }

    let mut out = GenerationOutcome::default();
    // Les curseurs ne sont réécrits dans les règles qu'une fois la plage
    // entière acceptée : une génération refusée ne consomme aucun pas.
    let mut cursors: Vec<u32> = set.rules.iter().map(|r| r.cursor).collect();
    // Candidat hebdomadaire déjà tiré pendant cette course, par (règle, ancre).
    let mut week_marks: HashMap<(usize, NaiveDate), PersonId> = HashMap::new();

    for date in util::days_inclusive(start, end) {
        for (idx, rule) in set.rules.iter().enumerate() {
            if !rule.days.applies_on(date) {
                continue;
            }
            if planner.book.assignment_for(date, rule.role).is_some()
                || out
                    .assignments
                    .iter()
                    .any(|a| a.date == date && a.role == rule.role)
            {
                return Err(PlanError::DuplicateAssignment {
                    date,
                    role: rule.role,
                });
            }

            let slot = match rule.kind {
                RuleKind::FixedPairWeekly => Ok(pattern::active_group(&set.groups, date)
                    .map(|group| (group.members.to_vec(), false))),
                RuleKind::DailySingle => {
                    assign_daily(&planner.book, rule, &mut cursors[idx], date)
                        .map(|slot| slot.map(|person| (vec![person], false)))
                }
                RuleKind::WeeklySingle => {
                    let anchor = pattern::week_anchor(&rule.days, date);
                    assign_recurring(
                        &planner.book,
                        rule,
                        &mut cursors[idx],
                        date,
                        anchor,
                        idx,
                        &mut week_marks,
                    )
                    .map(|slot| slot.map(|person| (vec![person], false)))
                }
                RuleKind::ContinuousBlock { days } => {
                    let anchor = pattern::block_anchor(&rule.days, days, date);
                    assign_recurring(
                        &planner.book,
                        rule,
                        &mut cursors[idx],
                        date,
                        anchor,
                        idx,
                        &mut week_marks,
                    )
                    .map(|slot| slot.map(|person| (vec![person], true)))
                }
            };

            let slot = match slot {
                Ok(slot) => slot,
                // Liste de rotation vide : le créneau reste sans titulaire,
                // la course continue.
                Err(PlanError::PoolExhausted(_)) => None,
                Err(err) => return Err(err),
            };

            match slot {
                Some((people, continuous)) => {
                    out.assignments.push(AssignmentRecord::new(
                        date,
                        rule.role,
                        people,
                        rule.id.clone(),
                        continuous,
                    ));
                }
                None => {
                    // Personne de disponible : attendu, pas une erreur.
                    #[cfg(feature = "logging")]
                    tracing::debug!(date = %date, role = %rule.role, "slot left unassigned");
                    out.skipped.push((date, rule.role));
                }
            }
        }
    }

    for (rule, cursor) in set.rules.iter_mut().zip(cursors) {
        rule.cursor = cursor;
    }
    out.created = out.assignments.len();
    for record in &out.assignments {
        planner
            .book
            .save_assignment(record.clone())
            .map_err(|_| PlanError::DuplicateAssignment {
                date: record.date,
                role: record.role,
            })?;
    }
    Ok(out)
}

/// Un pas de curseur, puis jusqu'à `len - 1` sondes en avant pour trouver
/// quelqu'un de disponible ce jour-là. Les sondes n'avancent pas le curseur.
fn assign_daily(
    book: &DutyBook,
    rule: &RotationRule,
    cursor: &mut u32,
    date: NaiveDate,
) -> Result<Option<PersonId>, PlanError> {
    let mut cur = RotationCursor::new(&rule.pool, cursor);
    let Some((_, candidate)) = cur.next() else {
        return Err(PlanError::PoolExhausted(rule.id.as_str().to_string()));
    };
    if availability::is_available(book, candidate, date) {
        return Ok(Some(candidate.clone()));
    }
    Ok((1..cur.len()).find_map(|k| {
        let probe = cur.probe(k)?;
        availability::is_available(book, probe, date).then(|| probe.clone())
    }))
}

/// Candidat de la semaine pour une règle hebdomadaire ou en bloc continu.
///
/// Le pas de curseur est consommé au jour d'ancrage ; les jours suivants
/// retrouvent le même candidat, soit via la marque posée pendant la course,
/// soit en rederivant depuis le curseur persisté quand la plage démarre au
/// milieu d'un bloc déjà entamé.
fn assign_recurring(
    book: &DutyBook,
    rule: &RotationRule,
    cursor: &mut u32,
    date: NaiveDate,
    anchor: NaiveDate,
    rule_index: usize,
    week_marks: &mut HashMap<(usize, NaiveDate), PersonId>,
) -> Result<Option<PersonId>, PlanError> {
    if rule.pool.is_empty() {
        return Err(PlanError::PoolExhausted(rule.id.as_str().to_string()));
    }
    let len = rule.pool.len();

    let week_person = if let Some(marked) = week_marks.get(&(rule_index, anchor)) {
        marked.clone()
    } else if anchor < date && pulled_in_prior_run(book, rule, anchor, date) {
        // Le pas de cette semaine a déjà été consommé par une exécution
        // précédente : le candidat est le dernier rendu par le curseur.
        rule.pool[(cursor.wrapping_sub(1) as usize) % len].clone()
    } else {
        let pos = (*cursor as usize) % len;
        *cursor = cursor.wrapping_add(1);
        rule.pool[pos].clone()
    };
    week_marks.insert((rule_index, anchor), week_person.clone());

    let base = rule
        .pool
        .iter()
        .position(|p| *p == week_person)
        .unwrap_or(0);
    Ok(first_available(book, &rule.pool, base, date))
}

/// Premier membre disponible en partant de `base`, sondes comprises
/// (au plus un tour complet de la liste).
fn first_available(
    book: &DutyBook,
    pool: &[PersonId],
    base: usize,
    date: NaiveDate,
) -> Option<PersonId> {
    (0..pool.len())
        .map(|k| &pool[(base + k) % pool.len()])
        .find(|p| availability::is_available(book, p, date))
        .cloned()
}

/// Une exécution antérieure a-t-elle déjà posé une affectation pour cette
/// règle entre l'ancre et `date` (exclue) ?
fn pulled_in_prior_run(
    book: &DutyBook,
    rule: &RotationRule,
    anchor: NaiveDate,
    date: NaiveDate,
) -> bool {
    util::days_inclusive(anchor, date)
        .take_while(|d| *d < date)
        .any(|d| rule.days.applies_on(d) && book.assignment_for(d, rule.role).is_some())
}
