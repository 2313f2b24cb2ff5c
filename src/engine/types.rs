use crate::model::{AssignmentRecord, ConflictStatus, DutyRole};
use chrono::NaiveDate;
use thiserror::Error;

/// Options de génération.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenerateOptions {
    /// Purge d'abord les affectations de la plage au lieu de refuser
    /// une plage déjà peuplée.
    pub clear_existing: bool,
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("invalid date range: end must not precede start")]
    InvalidDateRange,
    #[error("assignment already exists for {date} / {role}")]
    DuplicateAssignment { date: NaiveDate, role: DutyRole },
    #[error("rotation pool is empty for rule {0}")]
    PoolExhausted(String),
    #[error("substitute unavailable on the conflict date: {0}")]
    SubstituteUnavailable(String),
    #[error("conflict already resolved: {0}")]
    ConflictAlreadyResolved(String),
    #[error("unknown person: {0}")]
    UnknownPerson(String),
    #[error("unknown conflict: {0}")]
    UnknownConflict(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Résultat d'une génération.
#[derive(Debug, Clone, Default)]
pub struct GenerationOutcome {
    pub created: usize,
    pub assignments: Vec<AssignmentRecord>,
    /// Créneaux restés vides faute de candidat disponible. Attendu, pas une
    /// erreur : le créneau est simplement laissé sans titulaire.
    pub skipped: Vec<(NaiveDate, DutyRole)>,
}

/// Filtre de consultation des conflits.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictFilter {
    pub status: Option<ConflictStatus>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}
