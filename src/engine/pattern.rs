//! Sélection des règles applicables à une date et arithmétique de semaines.

use crate::model::SupervisorGroup;
use crate::rules::{DayPattern, RotationRule, RuleSet};
use chrono::{Datelike, Duration, NaiveDate};

/// Origine du comptage de semaines pour les rotations hebdomadaires
/// (binômes de supervision, ancrage des blocs en mode `Everyday`).
///
/// Constante de conception, volontairement non configurable : un lundi fixe,
/// commun à tous les jeux de règles.
pub fn rotation_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).expect("epoch is a valid date")
}

/// Nombre de semaines entières écoulées depuis l'origine.
/// Arithmétique entière sur des comptes de jours, euclidienne : le résultat
/// reste cohérent avant l'origine.
pub fn week_index(date: NaiveDate) -> i64 {
    date.signed_duration_since(rotation_epoch())
        .num_days()
        .div_euclid(7)
}

/// Indice du binôme actif pour la semaine de `date` (modulo non négatif).
pub fn active_group_index(date: NaiveDate, group_count: usize) -> usize {
    week_index(date).rem_euclid(group_count as i64) as usize
}

/// Binôme de supervision actif la semaine de `date`, dans l'ordre de rotation
/// déclaré par `order`.
pub fn active_group(groups: &[SupervisorGroup], date: NaiveDate) -> Option<&SupervisorGroup> {
    if groups.is_empty() {
        return None;
    }
    let mut ordered: Vec<&SupervisorGroup> = groups.iter().collect();
    ordered.sort_by_key(|g| g.order);
    Some(ordered[active_group_index(date, ordered.len())])
}

/// Règles applicables à `date`, dans l'ordre de déclaration.
pub fn applicable_rules<'a>(set: &'a RuleSet, date: NaiveDate) -> Vec<&'a RotationRule> {
    set.rules
        .iter()
        .filter(|r| r.days.applies_on(date))
        .collect()
}

/// Premier jour du bloc continu auquel `date` appartient.
///
/// L'ancre ne dépend que de la date (et de l'état persisté du curseur),
/// jamais d'une variable de session : regénérer la même plage redonne
/// exactement le même découpage.
pub fn block_anchor(days: &DayPattern, block_len: u8, date: NaiveDate) -> NaiveDate {
    let len = i64::from(block_len.max(1));
    match days {
        // Blocs alignés sur l'origine : jour 0..len-1, len..2*len-1, etc.
        DayPattern::Everyday => {
            let offset = date
                .signed_duration_since(rotation_epoch())
                .num_days()
                .rem_euclid(len);
            date - Duration::days(offset)
        }
        // Blocs hebdomadaires : on remonte tant que la veille est applicable,
        // au plus len-1 pas (Fri-Sun : dimanche remonte au vendredi).
        DayPattern::Weekdays(_) => {
            let mut anchor = date;
            for _ in 1..len {
                let Some(prev) = anchor.pred_opt() else { break };
                if !days.applies_on(prev) {
                    break;
                }
                anchor = prev;
            }
            anchor
        }
    }
}

/// Premier jour applicable de la semaine civile (lundi-alignée) de `date`.
/// Ancre des règles `WeeklySingle`.
pub fn week_anchor(days: &DayPattern, date: NaiveDate) -> NaiveDate {
    let monday = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    (0..7)
        .map(|k| monday + Duration::days(k))
        .find(|d| days.applies_on(*d))
        .unwrap_or(date)
}
