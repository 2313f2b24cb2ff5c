#![forbid(unsafe_code)]
//! Permanence — bibliothèque de génération de tableaux de service (sans BD).
//!
//! - Rotation par curseurs persistés : quotidienne, hebdomadaire, blocs
//!   continus multi-jours, binômes fixes.
//! - Détection de conflits (personne affectée devenue indisponible) et
//!   remplacements tracés.
//! - Stockage fichiers (JSON/CSV) ; tout en jours calendaires.

pub mod availability;
pub mod engine;
pub mod io;
pub mod model;
pub mod rules;
pub mod storage;

pub use engine::{
    ConflictFilter, GenerateOptions, GenerationOutcome, PlanError, Planner, RotationCursor,
};
pub use model::{
    AssignmentRecord, ConflictRecord, ConflictStatus, DutyBook, DutyRole, Person, PersonId,
    StatusKind, StatusPeriod, SubstitutionRecord, SupervisorGroup,
};
pub use rules::{
    load_rule_set_from_file, DayPattern, RotationRule, RuleKind, RuleSet, RuleSetInfo,
    RuleSetStore,
};
pub use storage::{JsonStorage, Storage};
