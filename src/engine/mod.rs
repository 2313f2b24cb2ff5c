mod conflicts;
mod cursor;
mod generate;
mod pattern;
mod substitute;
mod types;
mod util;

pub use cursor::RotationCursor;
pub use pattern::{
    active_group, active_group_index, applicable_rules, block_anchor, rotation_epoch, week_anchor,
    week_index,
};
pub use types::{ConflictFilter, GenerateOptions, GenerationOutcome, PlanError};

use crate::model::{ConflictId, ConflictRecord, DutyBook, Person, PersonId, SubstitutionRecord};
use crate::rules::RuleSet;
use chrono::{DateTime, NaiveDate, Utc};

/// Planificateur : encapsule le tableau de service en cours de construction.
///
/// Modèle mono-écrivain : toute mutation passe par `&mut self`, puis
/// l'appelant persiste l'agrégat d'un bloc (voir [`crate::storage`]).
#[derive(Debug, Default)]
pub struct Planner {
    book: DutyBook,
}

impl Planner {
    pub fn new() -> Self {
        Self {
            book: DutyBook::default(),
        }
    }

    pub fn book(&self) -> &DutyBook {
        &self.book
    }
    pub fn book_mut(&mut self) -> &mut DutyBook {
        &mut self.book
    }

    pub fn add_people(&mut self, people: Vec<Person>) {
        self.book.people.extend(people);
    }

    /// Génère les affectations de la plage inclusive [start, end] selon
    /// `set`. Les curseurs de rotation de `set` sont avancés en place.
    pub fn generate(
        &mut self,
        set: &mut RuleSet,
        start: NaiveDate,
        end: NaiveDate,
        opts: GenerateOptions,
    ) -> Result<GenerationOutcome, PlanError> {
        generate::generate(self, set, start, end, opts)
    }

    /// Rouvre les affectations existantes face aux statuts courants et rend
    /// les conflits nouvellement créés.
    pub fn detect_conflicts(&mut self) -> Vec<ConflictRecord> {
        conflicts::detect(self)
    }

    pub fn list_conflicts(&self, filter: ConflictFilter) -> Vec<&ConflictRecord> {
        conflicts::list(self, filter)
    }

    pub fn resolve_conflict(
        &mut self,
        conflict_id: &ConflictId,
        substitute: &PersonId,
        reason: &str,
        now: DateTime<Utc>,
    ) -> Result<SubstitutionRecord, PlanError> {
        substitute::resolve(self, conflict_id, substitute, reason, now)
    }
}
