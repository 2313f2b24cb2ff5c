use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifiant fort pour Person
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PersonId(String);

impl PersonId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour RotationRule
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleId(String);

impl RuleId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour AssignmentRecord
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssignmentId(String);

impl AssignmentId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour ConflictRecord
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConflictId(String);

impl ConflictId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifiant fort pour SubstitutionRecord
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubstitutionId(String);

impl SubstitutionId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Rôle tenu dans le tableau de service.
///
/// Enum fermée : un nouveau rôle est un ajout vérifié par le compilateur,
/// jamais une chaîne libre comparée à la volée.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyRole {
    Leader,
    DutyOfficer,
    AttendanceSupervisor,
}

impl DutyRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Leader => "leader",
            Self::DutyOfficer => "duty_officer",
            Self::AttendanceSupervisor => "attendance_supervisor",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "leader" => Some(Self::Leader),
            "duty_officer" => Some(Self::DutyOfficer),
            "attendance_supervisor" => Some(Self::AttendanceSupervisor),
            _ => None,
        }
    }
}

impl std::fmt::Display for DutyRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Nature d'un statut administratif.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    OnDuty,
    Leave,
    BusinessTrip,
    SickLeave,
    Detached,
}

impl StatusKind {
    /// Ce statut autorise-t-il la prise de service ?
    pub fn allows_duty(self) -> bool {
        matches!(self, Self::OnDuty)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnDuty => "on_duty",
            Self::Leave => "leave",
            Self::BusinessTrip => "business_trip",
            Self::SickLeave => "sick_leave",
            Self::Detached => "detached",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "on_duty" => Some(Self::OnDuty),
            "leave" => Some(Self::Leave),
            "business_trip" => Some(Self::BusinessTrip),
            "sick_leave" => Some(Self::SickLeave),
            "detached" => Some(Self::Detached),
            _ => None,
        }
    }
}

impl Default for StatusKind {
    fn default() -> Self {
        Self::OnDuty
    }
}

/// Période de statut d'une personne (jours calendaires inclusifs [start, end]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPeriod {
    pub kind: StatusKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl StatusPeriod {
    pub fn new(
        kind: StatusKind,
        start: NaiveDate,
        end: NaiveDate,
        reason: Option<String>,
    ) -> Result<Self, String> {
        if end < start {
            return Err("status period end must not precede start".to_string());
        }
        Ok(Self {
            kind,
            start,
            end,
            reason,
        })
    }

    /// Bornes incluses.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Personne (membre du tableau de service)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    pub handle: String,
    pub display_name: String,
    #[serde(default)]
    pub roles: Vec<DutyRole>,
    #[serde(default)]
    pub base_status: StatusKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statuses: Vec<StatusPeriod>,
}

impl Person {
    pub fn new<H: Into<String>, D: Into<String>>(handle: H, display_name: D) -> Self {
        Self {
            id: PersonId::random(),
            handle: handle.into(),
            display_name: display_name.into(),
            roles: Vec::new(),
            base_status: StatusKind::OnDuty,
            statuses: Vec::new(),
        }
    }

    pub fn has_role(&self, role: DutyRole) -> bool {
        self.roles.contains(&role)
    }
}

/// Binôme de supervision : exactement deux personnes, qui tournent en bloc.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupervisorGroup {
    pub members: [PersonId; 2],
    /// Rang dans l'ordre de rotation hebdomadaire.
    pub order: u32,
}

/// Affectation d'un rôle à une date (une personne, ou un binôme complet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub id: AssignmentId,
    pub date: NaiveDate,
    pub role: DutyRole,
    pub people: Vec<PersonId>,
    pub rule: RuleId,
    /// Jour appartenant à un bloc continu multi-jours.
    #[serde(default)]
    pub continuous: bool,
    #[serde(default)]
    pub substituted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<PersonId>,
}

impl AssignmentRecord {
    pub fn new(
        date: NaiveDate,
        role: DutyRole,
        people: Vec<PersonId>,
        rule: RuleId,
        continuous: bool,
    ) -> Self {
        Self {
            id: AssignmentId::random(),
            date,
            role,
            people,
            rule,
            continuous,
            substituted: false,
            original: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictStatus {
    Pending,
    Resolved,
}

/// Conflit détecté : une personne affectée devenue indisponible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRecord {
    pub id: ConflictId,
    pub assignment: AssignmentId,
    pub date: NaiveDate,
    pub role: DutyRole,
    pub person: PersonId,
    pub reason: String,
    pub status: ConflictStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<SubstitutionId>,
}

impl ConflictRecord {
    pub fn new(
        assignment: AssignmentId,
        date: NaiveDate,
        role: DutyRole,
        person: PersonId,
        reason: String,
    ) -> Self {
        Self {
            id: ConflictId::random(),
            assignment,
            date,
            role,
            person,
            reason,
            status: ConflictStatus::Pending,
            resolution: None,
        }
    }
}

/// Trace d'un remplacement. Immuable une fois créée : la résolution d'un
/// conflit n'efface jamais l'affectation d'origine, elle archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionRecord {
    pub id: SubstitutionId,
    pub assignment: AssignmentId,
    pub original: PersonId,
    pub substitute: PersonId,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

impl SubstitutionRecord {
    pub fn new(
        assignment: AssignmentId,
        original: PersonId,
        substitute: PersonId,
        reason: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: SubstitutionId::random(),
            assignment,
            original,
            substitute,
            reason: reason.into(),
            created_at,
        }
    }
}

/// Tableau de service complet : personnes, binômes et enregistrements dérivés.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DutyBook {
    pub people: Vec<Person>,
    #[serde(default)]
    pub groups: Vec<SupervisorGroup>,
    #[serde(default)]
    pub assignments: Vec<AssignmentRecord>,
    #[serde(default)]
    pub conflicts: Vec<ConflictRecord>,
    #[serde(default)]
    pub substitutions: Vec<SubstitutionRecord>,
}

impl DutyBook {
    pub fn find_person_by_handle<'a>(&'a self, handle: &str) -> Option<&'a Person> {
        self.people.iter().find(|p| p.handle == handle)
    }
    pub fn find_person_by_id<'a>(&'a self, id: &PersonId) -> Option<&'a Person> {
        self.people.iter().find(|p| &p.id == id)
    }
    pub fn find_person_mut_by_id(&mut self, id: &PersonId) -> Option<&mut Person> {
        self.people.iter_mut().find(|p| &p.id == id)
    }

    /// Périodes de statut d'une personne (vide si inconnue).
    pub fn status_periods(&self, id: &PersonId) -> &[StatusPeriod] {
        self.find_person_by_id(id)
            .map(|p| p.statuses.as_slice())
            .unwrap_or(&[])
    }

    pub fn assignment_for(&self, date: NaiveDate, role: DutyRole) -> Option<&AssignmentRecord> {
        self.assignments
            .iter()
            .find(|a| a.date == date && a.role == role)
    }

    pub fn find_assignment_mut(&mut self, id: &AssignmentId) -> Option<&mut AssignmentRecord> {
        self.assignments.iter_mut().find(|a| &a.id == id)
    }

    pub fn assignments_between(&self, start: NaiveDate, end: NaiveDate) -> Vec<&AssignmentRecord> {
        self.assignments
            .iter()
            .filter(|a| start <= a.date && a.date <= end)
            .collect()
    }

    /// Insère une affectation. Une seule par couple (date, rôle) : le doublon
    /// est refusé, jamais écrasé en silence.
    pub fn save_assignment(&mut self, record: AssignmentRecord) -> Result<(), String> {
        if self.assignment_for(record.date, record.role).is_some() {
            return Err(format!(
                "assignment already exists for {} / {}",
                record.date, record.role
            ));
        }
        self.assignments.push(record);
        Ok(())
    }

    pub fn find_conflict(&self, id: &ConflictId) -> Option<&ConflictRecord> {
        self.conflicts.iter().find(|c| &c.id == id)
    }

    pub fn find_conflict_mut(&mut self, id: &ConflictId) -> Option<&mut ConflictRecord> {
        self.conflicts.iter_mut().find(|c| &c.id == id)
    }

    /// Un conflit encore ouvert référence-t-il déjà ce couple (affectation, personne) ?
    pub fn has_pending_conflict(&self, assignment: &AssignmentId, person: &PersonId) -> bool {
        self.conflicts.iter().any(|c| {
            c.status == ConflictStatus::Pending
                && &c.assignment == assignment
                && &c.person == person
        })
    }

    pub fn save_conflict(&mut self, record: ConflictRecord) {
        self.conflicts.push(record);
    }

    pub fn save_substitution(&mut self, record: SubstitutionRecord) {
        self.substitutions.push(record);
    }

    /// Purge les affectations de la plage [start, end] et les conflits qui les
    /// référencent. Les remplacements restent : ce sont des archives.
    pub fn clear_assignments_between(&mut self, start: NaiveDate, end: NaiveDate) -> usize {
        let before = self.assignments.len();
        let removed: Vec<AssignmentId> = self
            .assignments
            .iter()
            .filter(|a| start <= a.date && a.date <= end)
            .map(|a| a.id.clone())
            .collect();
        self.assignments
            .retain(|a| !(start <= a.date && a.date <= end));
        self.conflicts.retain(|c| !removed.contains(&c.assignment));
        before - self.assignments.len()
    }
}
