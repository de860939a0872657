use std::sync::Arc;

use super::common::*;
use crate::substitution::domain::{AbsenceRecord, ClassId, ProxyAssignment, SchoolDay};
use crate::substitution::evaluation::ProxyPolicy;
use crate::substitution::memory::InMemorySchoolStore;
use crate::substitution::repository::RepositoryError;
use crate::substitution::service::{SubstitutionService, SubstitutionServiceError};

#[test]
fn plan_day_leaves_the_ledger_untouched() {
    let (service, store) = build_service(four_subject_day_roster());

    let report = service
        .plan_day(monday(), &tid("T"))
        .expect("plan succeeds");

    assert!(!report.committed);
    assert_eq!(report.day, Some(SchoolDay::Monday));
    assert_eq!(report.lessons_requiring_cover, 4);
    assert_eq!(report.assignments.len(), 4);
    assert!(report.is_fully_covered());
    assert_eq!(report.summary(), "4 of 4 lesson(s) covered on Monday 2025-09-22");

    let roster = store.snapshot().expect("snapshot");
    assert!(roster.proxies.is_empty());
    assert!(roster.absences.is_empty());
}

#[test]
fn commit_day_records_absence_and_every_assignment() {
    let (service, store) = build_service(four_subject_day_roster());

    let report = service
        .commit_day(monday(), &tid("T"))
        .expect("commit succeeds");
    assert!(report.committed);

    let stored = service.proxies_on(monday()).expect("proxies load");
    let covers: Vec<(&str, &str, &str)> = stored
        .iter()
        .map(|proxy| {
            (
                proxy.period_id.0.as_str(),
                proxy.class_id.0.as_str(),
                proxy.assigned_teacher_id.0.as_str(),
            )
        })
        .collect();
    assert_eq!(
        covers,
        vec![
            ("P1", "7A", "A"),
            ("P2", "7B", "B"),
            ("P3", "8A", "C"),
            ("P4", "8B", "A"),
        ]
    );
    assert!(stored
        .iter()
        .all(|proxy| proxy.absent_teacher_id == tid("T")));

    let roster = store.snapshot().expect("snapshot");
    assert_eq!(
        roster.absences,
        vec![AbsenceRecord {
            teacher_id: tid("T"),
            date: monday(),
        }]
    );
    assert!(service.proxies_on(tuesday()).expect("tuesday").is_empty());
}

#[test]
fn second_commit_skips_lessons_already_covered() {
    let (service, store) = build_service(four_subject_day_roster());
    service
        .commit_day(monday(), &tid("T"))
        .expect("first commit succeeds");

    let again = service
        .commit_day(monday(), &tid("T"))
        .expect("second commit succeeds");

    assert_eq!(again.already_covered, 4);
    assert_eq!(again.lessons_requiring_cover, 0);
    assert!(again.assignments.is_empty());
    assert_eq!(again.summary(), "nothing to cover on Monday 2025-09-22");

    let roster = store.snapshot().expect("snapshot");
    assert_eq!(roster.proxies.len(), 4);
    assert_eq!(roster.absences.len(), 1, "absence recording is idempotent");
}

#[test]
fn lessons_without_eligible_cover_are_reported() {
    let mut roster = roster_with(
        standard_periods(),
        vec![teacher("T", "Tara", &["MATH"]), teacher("A", "Arun", &["MATH"])],
    );
    add_lesson(&mut roster, "T", SchoolDay::Monday, "P1", "7A", "MATH");
    add_lesson(&mut roster, "T", SchoolDay::Monday, "P2", "7B", "MATH");
    busy_monday(&mut roster, "A", &["P1"]);
    let (service, _store) = build_service(roster);

    let report = service
        .plan_day(monday(), &tid("T"))
        .expect("plan succeeds");

    assert!(!report.is_fully_covered());
    assert_eq!(report.assignments.len(), 1);
    assert_eq!(report.uncovered.len(), 1);
    let gap = &report.uncovered[0];
    assert_eq!(gap.period_id, pid("P1"));
    assert_eq!(gap.class_name, "Class 7A");
    assert_eq!(gap.subject_name, "Subject MATH");
    assert_eq!(report.summary(), "1 of 2 lesson(s) covered on Monday 2025-09-22");
}

#[test]
fn sunday_and_empty_days_produce_empty_reports() {
    let (service, store) = build_service(four_subject_day_roster());

    let sunday_report = service
        .commit_day(sunday(), &tid("T"))
        .expect("sunday commit succeeds");
    assert_eq!(sunday_report.day, None);
    assert!(sunday_report.assignments.is_empty());
    assert_eq!(sunday_report.summary(), "no school on 2025-09-21");

    // the absence itself is still on record
    let roster = store.snapshot().expect("snapshot");
    assert_eq!(roster.absences.len(), 1);

    let tuesday_report = service
        .plan_day(tuesday(), &tid("T"))
        .expect("tuesday plan succeeds");
    assert_eq!(tuesday_report.summary(), "nothing to cover on Tuesday 2025-09-23");
}

#[test]
fn find_available_delegates_to_the_evaluator() {
    let mut roster = four_subject_day_roster();
    add_absence(&mut roster, "B", monday());
    let (service, _store) = build_service(roster);

    let candidates = service
        .find_available(&request(monday(), "P2", "ENG", "T"))
        .expect("evaluation succeeds");

    assert_eq!(ids(&candidates), vec!["A", "C"]);
    assert_eq!(service.policy(), &ProxyPolicy::default());
}

#[test]
fn class_already_covered_by_another_absence_conflicts_on_commit() {
    let mut roster = four_subject_day_roster();
    roster.proxies.push(ProxyAssignment {
        date: monday(),
        period_id: pid("P1"),
        class_id: ClassId("7A".to_string()),
        subject_id: sid("MATH"),
        absent_teacher_id: tid("SOMEONE-ELSE"),
        assigned_teacher_id: tid("VISITOR"),
    });
    let (service, store) = build_service(roster);

    match service.commit_day(monday(), &tid("T")) {
        Err(SubstitutionServiceError::Repository(RepositoryError::Conflict(message))) => {
            assert!(message.contains("7A"), "unexpected message: {message}");
        }
        other => panic!("expected conflict, got {other:?}"),
    }

    // no rollback: the absence written before the clash stays
    let roster = store.snapshot().expect("snapshot");
    assert_eq!(roster.absences.len(), 1);
    assert_eq!(roster.proxies.len(), 1);
}

#[test]
fn ledger_write_failures_surface_from_commit() {
    let store = Arc::new(InMemorySchoolStore::new(four_subject_day_roster()));
    let service = SubstitutionService::new(store, Arc::new(ReadOnlyLedger), ProxyPolicy::default());

    let plan = service
        .plan_day(monday(), &tid("T"))
        .expect("reads still work");
    assert_eq!(plan.assignments.len(), 4);

    match service.commit_day(monday(), &tid("T")) {
        Err(SubstitutionServiceError::Repository(RepositoryError::Unavailable(reason))) => {
            assert_eq!(reason, "read only");
        }
        other => panic!("expected unavailable ledger, got {other:?}"),
    }
}

#[test]
fn store_failures_surface_from_every_operation() {
    let service = SubstitutionService::new(
        Arc::new(UnavailableStore),
        Arc::new(UnavailableStore),
        ProxyPolicy::default(),
    );

    assert!(service
        .find_available(&request(monday(), "P1", "MATH", "T"))
        .is_err());
    assert!(service.plan_day(monday(), &tid("T")).is_err());
    assert!(service.commit_day(monday(), &tid("T")).is_err());
    assert!(service.proxies_on(monday()).is_err());
}
