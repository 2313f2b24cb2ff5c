#![forbid(unsafe_code)]
use chrono::{NaiveDate, Weekday};
use permanence::model::RuleId;
use permanence::rules::{DayPattern, RotationRule, RuleKind, RuleSet};
use permanence::{
    DutyRole, GenerateOptions, Person, PersonId, Planner, RotationCursor, SupervisorGroup,
};

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn with_role(handle: &str, role: DutyRole) -> Person {
    let mut p = Person::new(handle, handle.to_uppercase());
    p.roles = vec![role];
    p
}

fn single_rule_set(rule: RotationRule, groups: Vec<SupervisorGroup>) -> RuleSet {
    RuleSet {
        id: "test".into(),
        name: "test".into(),
        description: None,
        rules: vec![rule],
        groups,
        metadata: None,
    }
}

#[test]
fn cursor_visits_every_member_twice_in_order() {
    let pool: Vec<PersonId> = (0..3).map(|_| PersonId::random()).collect();
    let mut index = 0u32;
    let mut cursor = RotationCursor::new(&pool, &mut index);

    let seen: Vec<PersonId> = (0..6)
        .map(|_| cursor.next().unwrap().1.clone())
        .collect();
    let expected: Vec<PersonId> = pool.iter().chain(pool.iter()).cloned().collect();
    assert_eq!(seen, expected);
    assert_eq!(index, 6);
}

#[test]
fn empty_pool_cursor_yields_nothing() {
    let pool: Vec<PersonId> = Vec::new();
    let mut index = 0u32;
    let mut cursor = RotationCursor::new(&pool, &mut index);
    assert!(cursor.next().is_none());
    assert_eq!(index, 0);
}

#[test]
fn weekend_block_keeps_one_person_and_advances_weekly() {
    let a = with_role("alice", DutyRole::DutyOfficer);
    let b = with_role("bruno", DutyRole::DutyOfficer);
    let mut set = single_rule_set(
        RotationRule {
            id: RuleId::new("officer-weekend"),
            role: DutyRole::DutyOfficer,
            kind: RuleKind::ContinuousBlock { days: 3 },
            pool: vec![a.id.clone(), b.id.clone()],
            days: DayPattern::Weekdays(vec![Weekday::Fri, Weekday::Sat, Weekday::Sun]),
            work_hours: None,
            cursor: 0,
        },
        Vec::new(),
    );

    let mut planner = Planner::new();
    planner.add_people(vec![a.clone(), b.clone()]);

    // Deux semaines pleines : 2024-06-10 (lundi) au 2024-06-23 (dimanche).
    let outcome = planner
        .generate(
            &mut set,
            day(2024, 6, 10),
            day(2024, 6, 23),
            GenerateOptions::default(),
        )
        .unwrap();

    assert_eq!(outcome.created, 6);
    for rec in &outcome.assignments {
        assert!(rec.continuous);
    }
    let week1: Vec<_> = outcome.assignments[..3]
        .iter()
        .map(|r| r.people[0].clone())
        .collect();
    let week2: Vec<_> = outcome.assignments[3..]
        .iter()
        .map(|r| r.people[0].clone())
        .collect();
    assert_eq!(week1, vec![a.id.clone(), a.id.clone(), a.id.clone()]);
    assert_eq!(week2, vec![b.id.clone(), b.id.clone(), b.id]);
    // Un seul pas de curseur par bloc hebdomadaire.
    assert_eq!(set.rules[0].cursor, 2);
}

#[test]
fn block_started_midway_reuses_the_stored_anchor() {
    let a = with_role("alice", DutyRole::DutyOfficer);
    let b = with_role("bruno", DutyRole::DutyOfficer);
    let rule = RotationRule {
        id: RuleId::new("officer-weekend"),
        role: DutyRole::DutyOfficer,
        kind: RuleKind::ContinuousBlock { days: 3 },
        pool: vec![a.id.clone(), b.id.clone()],
        days: DayPattern::Weekdays(vec![Weekday::Fri, Weekday::Sat, Weekday::Sun]),
        work_hours: None,
        cursor: 0,
    };
    let mut set = single_rule_set(rule, Vec::new());

    let mut planner = Planner::new();
    planner.add_people(vec![a.clone(), b]);

    // Vendredi seul, puis reprise samedi-dimanche : même titulaire, le pas
    // de la semaine ayant déjà été consommé au vendredi.
    planner
        .generate(
            &mut set,
            day(2024, 6, 14),
            day(2024, 6, 14),
            GenerateOptions::default(),
        )
        .unwrap();
    assert_eq!(set.rules[0].cursor, 1);

    let outcome = planner
        .generate(
            &mut set,
            day(2024, 6, 15),
            day(2024, 6, 16),
            GenerateOptions::default(),
        )
        .unwrap();

    assert_eq!(outcome.created, 2);
    for rec in &outcome.assignments {
        assert_eq!(rec.people, vec![a.id.clone()]);
    }
    assert_eq!(set.rules[0].cursor, 1);
}

#[test]
fn weekly_single_holds_for_the_whole_week() {
    let a = with_role("alice", DutyRole::Leader);
    let b = with_role("bruno", DutyRole::Leader);
    let mut set = single_rule_set(
        RotationRule {
            id: RuleId::new("leader-weekly"),
            role: DutyRole::Leader,
            kind: RuleKind::WeeklySingle,
            pool: vec![a.id.clone(), b.id.clone()],
            days: DayPattern::Weekdays(vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ]),
            work_hours: None,
            cursor: 0,
        },
        Vec::new(),
    );

    let mut planner = Planner::new();
    planner.add_people(vec![a.clone(), b.clone()]);

    let outcome = planner
        .generate(
            &mut set,
            day(2024, 6, 10),
            day(2024, 6, 21),
            GenerateOptions::default(),
        )
        .unwrap();

    assert_eq!(outcome.created, 10);
    for rec in &outcome.assignments[..5] {
        assert_eq!(rec.people, vec![a.id.clone()]);
    }
    for rec in &outcome.assignments[5..] {
        assert_eq!(rec.people, vec![b.id.clone()]);
    }
    assert_eq!(set.rules[0].cursor, 2);
}

#[test]
fn supervisor_pairs_alternate_by_week_parity() {
    let p1 = with_role("p1", DutyRole::AttendanceSupervisor);
    let p2 = with_role("p2", DutyRole::AttendanceSupervisor);
    let p3 = with_role("p3", DutyRole::AttendanceSupervisor);
    let p4 = with_role("p4", DutyRole::AttendanceSupervisor);
    let groups = vec![
        SupervisorGroup {
            members: [p1.id.clone(), p2.id.clone()],
            order: 0,
        },
        SupervisorGroup {
            members: [p3.id.clone(), p4.id.clone()],
            order: 1,
        },
    ];
    let mut set = single_rule_set(
        RotationRule {
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
        },
        groups,
    );

    let mut planner = Planner::new();
    planner.add_people(vec![p1.clone(), p2.clone(), p3.clone(), p4.clone()]);

    // La semaine 0 de l'origine (2024-01-01) revient au premier binôme.
    let outcome = planner
        .generate(
            &mut set,
            day(2024, 1, 1),
            day(2024, 1, 14),
            GenerateOptions::default(),
        )
        .unwrap();

    // Cinq jours ouvrés par semaine, pas d'affectation le week-end.
    assert_eq!(outcome.created, 10);
    for rec in &outcome.assignments {
        assert!(rec.date != day(2024, 1, 6) && rec.date != day(2024, 1, 7));
        assert!(rec.date != day(2024, 1, 13) && rec.date != day(2024, 1, 14));
    }
    for rec in &outcome.assignments[..5] {
        assert_eq!(rec.people, vec![p1.id.clone(), p2.id.clone()]);
    }
    for rec in &outcome.assignments[5..] {
        assert_eq!(rec.people, vec![p3.id.clone(), p4.id.clone()]);
    }
}

#[test]
fn block_rule_with_empty_pool_leaves_slots_empty() {
    let mut set = single_rule_set(
        RotationRule {
            id: RuleId::new("officer-weekend"),
            role: DutyRole::DutyOfficer,
            kind: RuleKind::ContinuousBlock { days: 3 },
            pool: Vec::new(),
            days: DayPattern::Weekdays(vec![Weekday::Fri, Weekday::Sat, Weekday::Sun]),
            work_hours: None,
            cursor: 0,
        },
        Vec::new(),
    );

    let mut planner = Planner::new();
    let outcome = planner
        .generate(
            &mut set,
            day(2024, 6, 14),
            day(2024, 6, 16),
            GenerateOptions::default(),
        )
        .unwrap();

    assert_eq!(outcome.created, 0);
    assert_eq!(outcome.skipped.len(), 3);
    assert_eq!(set.rules[0].cursor, 0);
}
