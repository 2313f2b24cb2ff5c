use crate::model::{DutyRole, PersonId, RuleId, SupervisorGroup};
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Mode de rotation d'une règle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum RuleKind {
    /// Un candidat différent chaque jour applicable.
    DailySingle,
    /// Le même candidat sur tous les jours applicables d'une semaine civile.
    WeeklySingle,
    /// Le même candidat sur un bloc de `days` jours consécutifs ;
    /// le curseur n'avance qu'une fois par bloc.
    ContinuousBlock { days: u8 },
    /// Un binôme fixe par semaine, choisi par `semaine mod nombre_de_binômes`.
    FixedPairWeekly,
}

/// Jours d'application d'une règle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPattern {
    Everyday,
    Weekdays(Vec<Weekday>),
}

impl DayPattern {
    pub fn applies_on(&self, date: NaiveDate) -> bool {
        match self {
            Self::Everyday => true,
            Self::Weekdays(days) => days.contains(&date.weekday()),
        }
    }

    fn covered_weekdays(&self) -> Vec<Weekday> {
        match self {
            Self::Everyday => vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
            Self::Weekdays(days) => days.clone(),
        }
    }
}

/// Règle de rotation pour un rôle.
///
/// Le champ `cursor` est l'état de rotation lui-même, persisté avec la règle :
/// une exécution interrompue reprend exactement où elle s'était arrêtée, et
/// un instantané du jeu de règles suffit à rejouer une génération.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RotationRule {
    pub id: RuleId,
    pub role: DutyRole,
    pub kind: RuleKind,
    /// Ordre significatif : c'est la seule clé de rotation.
    pub pool: Vec<PersonId>,
    pub days: DayPattern,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_hours: Option<(NaiveTime, NaiveTime)>,
    #[serde(default)]
    pub cursor: u32,
}

impl RotationRule {
    fn validate(&self) -> Result<()> {
        if let RuleKind::ContinuousBlock { days } = self.kind {
            if days == 0 {
                bail!("continuous block rule {} must span at least one day", self.id.as_str());
            }
        }
        if let Some((start, end)) = self.work_hours {
            if start == end {
                bail!("rule {} work hours cannot be empty", self.id.as_str());
            }
        }
        Ok(())
    }
}

/// Jeu de règles complet, persistable sur disque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rules: Vec<RotationRule>,
    #[serde(default)]
    pub groups: Vec<SupervisorGroup>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl RuleSet {
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            bail!("rule set id cannot be empty");
        }
        if self.name.trim().is_empty() {
            bail!("rule set name cannot be empty");
        }
        if self.rules.is_empty() {
            bail!("rule set must contain at least one rule");
        }
        for rule in &self.rules {
            rule.validate()?;
            if rule.kind == RuleKind::FixedPairWeekly && self.groups.is_empty() {
                bail!(
                    "rule {} rotates supervisor pairs but the set defines no group",
                    rule.id.as_str()
                );
            }
        }
        validate_role_overlaps(&self.rules)?;
        Ok(())
    }

    pub fn find_rule(&self, id: &RuleId) -> Option<&RotationRule> {
        self.rules.iter().find(|r| &r.id == id)
    }

    pub fn find_rule_mut(&mut self, id: &RuleId) -> Option<&mut RotationRule> {
        self.rules.iter_mut().find(|r| &r.id == id)
    }

    /// Remet tous les curseurs à zéro (rejeu depuis un état vierge).
    pub fn reset_cursors(&mut self) {
        for rule in &mut self.rules {
            rule.cursor = 0;
        }
    }
}

/// Deux règles visant le même rôle le même jour produiraient deux
/// affectations pour un seul créneau (date, rôle).
fn validate_role_overlaps(rules: &[RotationRule]) -> Result<()> {
    for (i, rule_a) in rules.iter().enumerate() {
        for rule_b in rules.iter().skip(i + 1) {
            if rule_a.role != rule_b.role {
                continue;
            }
            let days_a = rule_a.days.covered_weekdays();
            if rule_b
                .days
                .covered_weekdays()
                .iter()
                .any(|d| days_a.contains(d))
            {
                bail!(
                    "rules {} and {} both cover role {} on the same weekday",
                    rule_a.id.as_str(),
                    rule_b.id.as_str(),
                    rule_a.role
                );
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct RuleSetInfo {
    pub rule_set: RuleSet,
    pub path: PathBuf,
    pub modified: Option<DateTime<Utc>>,
}

/// Gestion simple des jeux de règles persistés sur disque.
#[derive(Debug, Clone)]
pub struct RuleSetStore {
    base_dir: PathBuf,
}

impl RuleSetStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            base_dir: dir.as_ref().to_path_buf(),
        }
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("creating rule set directory {}", self.base_dir.display()))
    }

    pub fn save(&self, rule_set: &RuleSet) -> Result<PathBuf> {
        rule_set.validate()?;
        self.ensure_dir()?;
        let path = self.base_dir.join(format!("{}.json", rule_set.id));
        let json = serde_json::to_string_pretty(rule_set)?;
        fs::write(&path, json).with_context(|| format!("writing rule set {}", path.display()))?;
        Ok(path)
    }

    pub fn load(&self, id: &str) -> Result<RuleSet> {
        let path = self.base_dir.join(format!("{}.json", id));
        let data =
            fs::read(&path).with_context(|| format!("reading rule set {}", path.display()))?;
        let rule_set: RuleSet = serde_json::from_slice(&data)
            .with_context(|| format!("parsing rule set {}", path.display()))?;
        rule_set.validate()?;
        Ok(rule_set)
    }

    pub fn list(&self) -> Result<Vec<RuleSetInfo>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }
        let mut infos = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let data = fs::read(&path)?;
            let rule_set: RuleSet = match serde_json::from_slice(&data) {
                Ok(r) => r,
                Err(err) => {
                    eprintln!("Warning: could not parse rule set {}: {err}", path.display());
                    continue;
                }
            };
            let modified = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .ok()
                .map(DateTime::<Utc>::from);
            infos.push(RuleSetInfo {
                rule_set,
                path,
                modified,
            });
        }
        infos.sort_by(|a, b| a.rule_set.id.cmp(&b.rule_set.id));
        Ok(infos)
    }
}

pub fn load_rule_set_from_file<P: AsRef<Path>>(path: P) -> Result<RuleSet> {
    let data = fs::read(&path)?;
    let rule_set: RuleSet = serde_json::from_slice(&data)?;
    rule_set.validate()?;
    Ok(rule_set)
}

pub fn export_rule_set_json<P: AsRef<Path>>(path: P, rule_set: &RuleSet) -> Result<()> {
    let json = serde_json::to_string_pretty(rule_set)?;
    fs::write(path, json)?;
    Ok(())
}
