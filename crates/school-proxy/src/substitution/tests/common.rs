use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};

use crate::roster::{SchoolRoster, TimetableRow};
use crate::substitution::domain::{
    AbsenceRecord, ClassId, LessonSlot, Period, PeriodId, PeriodKind, ProxyAssignment,
    SchoolDay, SubjectId, Teacher, TeacherId, TeacherSnapshot, TimetableEntry,
};
use crate::substitution::evaluation::{AvailabilityRequest, ProxyPolicy};
use crate::substitution::memory::InMemorySchoolStore;
use crate::substitution::repository::{ProxyLedger, RepositoryError, ScheduleRepository};
use crate::substitution::service::SubstitutionService;

pub(super) fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 22).expect("valid date")
}

pub(super) fn tuesday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 23).expect("valid date")
}

pub(super) fn sunday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 21).expect("valid date")
}

pub(super) fn tid(id: &str) -> TeacherId {
    TeacherId(id.to_string())
}

pub(super) fn pid(id: &str) -> PeriodId {
    PeriodId(id.to_string())
}

pub(super) fn sid(id: &str) -> SubjectId {
    SubjectId(id.to_string())
}

pub(super) fn period(id: &str, period_no: u8, kind: PeriodKind) -> Period {
    let start = NaiveTime::from_hms_opt(7, 30, 0).expect("valid time")
        + chrono::Duration::minutes(45 * i64::from(period_no));
    Period {
        id: pid(id),
        period_no,
        kind,
        starts_at: start,
        ends_at: start + chrono::Duration::minutes(45),
    }
}

/// P1 P2 | recess | P3 P4 | lunch | P5 P6, listed out of order to exercise sorting.
pub(super) fn standard_periods() -> Vec<Period> {
    vec![
        period("P3", 4, PeriodKind::Class),
        period("P1", 1, PeriodKind::Class),
        period("P2", 2, PeriodKind::Class),
        period("RECESS", 3, PeriodKind::Recess),
        period("P4", 5, PeriodKind::Class),
        period("LUNCH", 6, PeriodKind::Lunch),
        period("P5", 7, PeriodKind::Class),
        period("P6", 8, PeriodKind::Class),
    ]
}

pub(super) fn teacher(id: &str, name: &str, subjects: &[&str]) -> Teacher {
    Teacher {
        id: tid(id),
        name: name.to_string(),
        active: true,
        subjects: subjects.iter().map(|subject| sid(subject)).collect::<BTreeSet<_>>(),
    }
}

pub(super) fn roster_with(periods: Vec<Period>, teachers: Vec<Teacher>) -> SchoolRoster {
    SchoolRoster {
        periods,
        teachers,
        ..SchoolRoster::default()
    }
}

pub(super) fn add_lesson(
    roster: &mut SchoolRoster,
    teacher: &str,
    day: SchoolDay,
    period: &str,
    class: &str,
    subject: &str,
) {
    roster.timetable.push(TimetableRow {
        entry: TimetableEntry {
            teacher_id: tid(teacher),
            day,
            period_id: pid(period),
            class_id: ClassId(class.to_string()),
            subject_id: sid(subject),
        },
        class_name: format!("Class {class}"),
        subject_name: format!("Subject {subject}"),
    });
}

/// Fill `periods` on Monday with filler lessons for `teacher`.
pub(super) fn busy_monday(roster: &mut SchoolRoster, teacher: &str, periods: &[&str]) {
    for period in periods {
        add_lesson(
            roster,
            teacher,
            SchoolDay::Monday,
            period,
            &format!("{teacher}-{period}"),
            "FILLER",
        );
    }
}

pub(super) fn add_proxy(roster: &mut SchoolRoster, date: NaiveDate, period: &str, assigned: &str) {
    roster.proxies.push(ProxyAssignment {
        date,
        period_id: pid(period),
        class_id: ClassId(format!("cover-{period}-{assigned}")),
        subject_id: sid("FILLER"),
        absent_teacher_id: tid("ELSEWHERE"),
        assigned_teacher_id: tid(assigned),
    });
}

pub(super) fn add_absence(roster: &mut SchoolRoster, teacher: &str, date: NaiveDate) {
    roster.absences.push(AbsenceRecord {
        teacher_id: tid(teacher),
        date,
    });
}

pub(super) fn request(
    date: NaiveDate,
    period: &str,
    subject: &str,
    absent: &str,
) -> AvailabilityRequest {
    AvailabilityRequest {
        date,
        period_id: pid(period),
        subject_id: sid(subject),
        absent_teacher_id: tid(absent),
    }
}

pub(super) fn ids(candidates: &[crate::substitution::Candidate]) -> Vec<&str> {
    candidates
        .iter()
        .map(|candidate| candidate.id.0.as_str())
        .collect()
}

/// Absent teacher `T` teaches Monday periods 1, 2, 4 and 5 of the class sequence
/// (`P1 P2 P3 P4`, recess sits between P2 and P3) in four different subjects.
/// `A` is qualified in MATH and HIST, `B` in ENG, `C` in SCI; none teach on Monday.
pub(super) fn four_subject_day_roster() -> SchoolRoster {
    let periods = vec![
        period("P1", 1, PeriodKind::Class),
        period("P2", 2, PeriodKind::Class),
        period("RECESS", 3, PeriodKind::Recess),
        period("P3", 4, PeriodKind::Class),
        period("P4", 5, PeriodKind::Class),
        period("LUNCH", 6, PeriodKind::Lunch),
    ];
    let mut roster = roster_with(
        periods,
        vec![
            teacher("T", "Tara Absent", &["MATH", "ENG", "SCI", "HIST"]),
            teacher("A", "Arun", &["MATH", "HIST"]),
            teacher("B", "Bela", &["ENG"]),
            teacher("C", "Chidi", &["SCI"]),
        ],
    );
    add_lesson(&mut roster, "T", SchoolDay::Monday, "P1", "7A", "MATH");
    add_lesson(&mut roster, "T", SchoolDay::Monday, "P2", "7B", "ENG");
    add_lesson(&mut roster, "T", SchoolDay::Monday, "P3", "8A", "SCI");
    add_lesson(&mut roster, "T", SchoolDay::Monday, "P4", "8B", "HIST");
    roster
}

pub(super) fn store(roster: SchoolRoster) -> InMemorySchoolStore {
    InMemorySchoolStore::new(roster)
}

pub(super) fn build_service(
    roster: SchoolRoster,
) -> (
    SubstitutionService<InMemorySchoolStore, InMemorySchoolStore>,
    Arc<InMemorySchoolStore>,
) {
    let store = Arc::new(store(roster));
    let service = SubstitutionService::new(store.clone(), store.clone(), ProxyPolicy::default());
    (service, store)
}

/// Store that fails every call, standing in for an offline database.
pub(super) struct UnavailableStore;

impl ScheduleRepository for UnavailableStore {
    fn list_active_teachers(
        &self,
        _excluding: &TeacherId,
        _day: SchoolDay,
        _date: NaiveDate,
    ) -> Result<Vec<TeacherSnapshot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn get_period(&self, _id: &PeriodId) -> Result<Option<Period>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_class_periods(&self) -> Result<Vec<Period>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_timetable_for_teacher(
        &self,
        _teacher: &TeacherId,
        _day: SchoolDay,
    ) -> Result<Vec<LessonSlot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

impl ProxyLedger for UnavailableStore {
    fn record_absence(&self, _absence: AbsenceRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn record_proxy(&self, _proxy: ProxyAssignment) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn proxies_on(&self, _date: NaiveDate) -> Result<Vec<ProxyAssignment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Ledger that accepts reads but refuses writes, as a read-only replica would.
pub(super) struct ReadOnlyLedger;

impl ProxyLedger for ReadOnlyLedger {
    fn record_absence(&self, _absence: AbsenceRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn record_proxy(&self, _proxy: ProxyAssignment) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn proxies_on(&self, _date: NaiveDate) -> Result<Vec<ProxyAssignment>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
