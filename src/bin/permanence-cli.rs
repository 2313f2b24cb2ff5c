#![forbid(unsafe_code)]
use anyhow::{bail, Result};
use chrono::{NaiveDate, Utc, Weekday};
use clap::{Parser, Subcommand};
use permanence::{
    io,
    model::{ConflictId, ConflictStatus, DutyBook, DutyRole, PersonId, RuleId, SupervisorGroup},
    rules::{DayPattern, RotationRule, RuleKind, RuleSet, RuleSetStore},
    storage::{JsonStorage, Storage},
    ConflictFilter, GenerateOptions, Planner,
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI minimaliste de tableaux de service (sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON du tableau de service
    #[arg(long, global = true, default_value = "dutybook.json")]
    book: String,

    /// Répertoire des jeux de règles
    #[arg(long, global = true, default_value = "rules")]
    rules_dir: String,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Importer des personnes depuis un CSV
    ImportPeople {
        #[arg(long)]
        csv: String,
    },

    /// Déclarer un binôme de supervision
    AddGroup {
        #[arg(long)]
        member_a: String,
        #[arg(long)]
        member_b: String,
        /// Rang dans l'ordre de rotation hebdomadaire
        #[arg(long, default_value_t = 0)]
        order: u32,
    },

    /// Écrire un jeu de règles de départ construit sur les rôles connus
    InitRules {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
    },

    /// Lister les jeux de règles disponibles
    Rules,

    /// Générer les affectations d'une plage de dates
    Generate {
        /// Identifiant du jeu de règles
        #[arg(long)]
        rules: String,
        /// Premier jour (YYYY-MM-DD)
        #[arg(long)]
        from: String,
        /// Dernier jour inclus (YYYY-MM-DD)
        #[arg(long)]
        to: String,
        /// Purge d'abord la plage au lieu de refuser les doublons
        #[arg(long)]
        clear: bool,
    },

    /// Lister et optionnellement exporter les affectations
    List {
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Re-scanner les affectations contre les statuts courants
    Check {
        /// Export CSV des conflits ouverts (optionnel)
        #[arg(long)]
        report: Option<String>,
    },

    /// Résoudre un conflit en désignant un remplaçant
    Resolve {
        #[arg(long)]
        conflict_id: String,
        #[arg(long)]
        with: String,
        #[arg(long, default_value = "substitution")]
        reason: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let storage = JsonStorage::open(&cli.book)?;
    let store = RuleSetStore::new(&cli.rules_dir);
    let mut planner = Planner::new();
    *planner.book_mut() = storage.load_or_default();

    let code = match cli.cmd {
        Commands::ImportPeople { csv } => {
            let people = io::import_people_csv(csv)?;
            planner.add_people(people);
            storage.save(planner.book())?;
            0
        }
        Commands::AddGroup {
            member_a,
            member_b,
            order,
        } => {
            let a = person_id_by_handle(planner.book(), &member_a)?;
            let b = person_id_by_handle(planner.book(), &member_b)?;
            planner
                .book_mut()
                .groups
                .push(SupervisorGroup {
                    members: [a, b],
                    order,
                });
            storage.save(planner.book())?;
            0
        }
        Commands::InitRules { id, name } => {
            let rule_set = starter_rule_set(&id, &name, planner.book());
            let path = store.save(&rule_set)?;
            println!("Rule set written to {}", path.display());
            0
        }
        Commands::Rules => {
            for info in store.list()? {
                println!(
                    "{} | {} | {} rule(s)",
                    info.rule_set.id,
                    info.rule_set.name,
                    info.rule_set.rules.len()
                );
            }
            0
        }
        Commands::Generate {
            rules,
            from,
            to,
            clear,
        } => {
            let mut rule_set = store.load(&rules)?;
            let start = parse_date(&from)?;
            let end = parse_date(&to)?;
            let outcome = planner.generate(
                &mut rule_set,
                start,
                end,
                GenerateOptions {
                    clear_existing: clear,
                },
            )?;
            storage.save(planner.book())?;
            // Les curseurs ont avancé : le jeu de règles repart d'ici.
            store.save(&rule_set)?;
            println!(
                "{} assignment(s) created, {} slot(s) left empty",
                outcome.created,
                outcome.skipped.len()
            );
            0
        }
        Commands::List { out_json, out_csv } => {
            if let Some(path) = out_json {
                io::export_book_json(path, planner.book())?;
            }
            if let Some(path) = out_csv {
                io::export_assignments_csv(path, planner.book())?;
            }
            // impression compacte
            let mut records: Vec<_> = planner.book().assignments.iter().collect();
            records.sort_by_key(|a| (a.date, a.role.as_str()));
            for a in records {
                let handles = a
                    .people
                    .iter()
                    .map(|pid| {
                        planner
                            .book()
                            .find_person_by_id(pid)
                            .map(|p| p.handle.as_str())
                            .unwrap_or("-")
                    })
                    .collect::<Vec<_>>()
                    .join("|");
                println!("{} | {} | {}", a.date, a.role, handles);
            }
            0
        }
        Commands::Check { report } => {
            let created = planner.detect_conflicts();
            storage.save(planner.book())?;
            let pending = planner.list_conflicts(ConflictFilter {
                status: Some(ConflictStatus::Pending),
                ..ConflictFilter::default()
            });
            if pending.is_empty() {
                println!("OK: no pending conflict");
                0
            } else {
                eprintln!(
                    "{} pending conflict(s) ({} new)",
                    pending.len(),
                    created.len()
                );
                if let Some(path) = report {
                    // CSV simple
                    let mut w = csv::Writer::from_path(path)?;
                    w.write_record(["conflict_id", "date", "role", "person", "reason"])?;
                    for c in &pending {
                        let date = c.date.to_string();
                        w.write_record([
                            c.id.as_str(),
                            date.as_str(),
                            c.role.as_str(),
                            c.person.as_str(),
                            c.reason.as_str(),
                        ])?;
                    }
                    w.flush()?;
                }
                // Code 2 = WARNING/INCOMPLETE
                2
            }
        }
        Commands::Resolve {
            conflict_id,
            with,
            reason,
        } => {
            let substitute = person_id_by_handle(planner.book(), &with)?;
            let cid = ConflictId::new(conflict_id);
            let substitution =
                planner.resolve_conflict(&cid, &substitute, &reason, Utc::now())?;
            storage.save(planner.book())?;
            println!(
                "Substitution {} recorded: {} replaces {}",
                substitution.id.as_str(),
                substitution.substitute.as_str(),
                substitution.original.as_str()
            );
            0
        }
    };

    std::process::exit(code);
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("invalid date (expected YYYY-MM-DD): {raw}"))
}

fn person_id_by_handle(book: &DutyBook, handle: &str) -> Result<PersonId> {
    match book.find_person_by_handle(handle) {
        Some(p) => Ok(p.id.clone()),
        None => bail!("unknown person: {handle}"),
    }
}

/// Jeu de règles de départ : rotation quotidienne des chefs de service,
/// officiers de semaine Lun-Jeu, bloc continu Ven-Dim, binômes Lun-Ven.
fn starter_rule_set(id: &str, name: &str, book: &DutyBook) -> RuleSet {
    let pool_for = |role: DutyRole| -> Vec<PersonId> {
        book.people
            .iter()
            .filter(|p| p.has_role(role))
            .map(|p| p.id.clone())
            .collect()
    };

    let mut rules = vec![
        RotationRule {
            id: RuleId::new("leader-daily"),
            role: DutyRole::Leader,
            kind: RuleKind::DailySingle,
            pool: pool_for(DutyRole::Leader),
            days: DayPattern::Everyday,
            work_hours: None,
            cursor: 0,
        },
        RotationRule {
            id: RuleId::new("officer-weekdays"),
            role: DutyRole::DutyOfficer,
            kind: RuleKind::DailySingle,
            pool: pool_for(DutyRole::DutyOfficer),
            days: DayPattern::Weekdays(vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
            ]),
            work_hours: None,
            cursor: 0,
        },
        RotationRule {
            id: RuleId::new("officer-weekend"),
            role: DutyRole::DutyOfficer,
            kind: RuleKind::ContinuousBlock { days: 3 },
            pool: pool_for(DutyRole::DutyOfficer),
            days: DayPattern::Weekdays(vec![Weekday::Fri, Weekday::Sat, Weekday::Sun]),
            work_hours: None,
            cursor: 0,
        },
    ];
    if !book.groups.is_empty() {
        rules.push(RotationRule {
            id: RuleId::new("supervision-pairs"),
            role: DutyRole::AttendanceSupervisor,
            kind: RuleKind::FixedPairWeekly,
            pool: Vec::new(),
            days: DayPattern::Weekdays(vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ]),
            work_hours: None,
            cursor: 0,
        });
    }

    RuleSet {
        id: id.to_string(),
        name: name.to_string(),
        description: Some("Jeu de règles de départ, à ajuster avant génération.".to_string()),
        rules,
        groups: book.groups.clone(),
        metadata: None,
    }
}
