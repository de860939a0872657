use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::assignment::{Assignment, DayAutoAssigner};
use super::domain::{
    AbsenceRecord, ClassId, LessonSlot, PeriodId, ProxyAssignment, SchoolDay, SubjectId,
    TeacherId,
};
use super::evaluation::{AvailabilityEvaluator, AvailabilityRequest, Candidate, ProxyPolicy};
use super::repository::{ProxyLedger, RepositoryError, ScheduleRepository};

/// Service composing the store, the availability evaluator and the day assigner.
pub struct SubstitutionService<R, L> {
    repository: Arc<R>,
    ledger: Arc<L>,
    assigner: DayAutoAssigner,
}

impl<R, L> SubstitutionService<R, L>
where
    R: ScheduleRepository + 'static,
    L: ProxyLedger + 'static,
{
    pub fn new(repository: Arc<R>, ledger: Arc<L>, policy: ProxyPolicy) -> Self {
        Self {
            repository,
            ledger,
            assigner: DayAutoAssigner::new(policy),
        }
    }

    pub fn policy(&self) -> &ProxyPolicy {
        self.evaluator().policy()
    }

    fn evaluator(&self) -> &AvailabilityEvaluator {
        self.assigner.evaluator()
    }

    /// Ranked substitutes for a single slot.
    pub fn find_available(
        &self,
        request: &AvailabilityRequest,
    ) -> Result<Vec<Candidate>, SubstitutionServiceError> {
        let candidates = self
            .evaluator()
            .find_available(self.repository.as_ref(), request)?;
        Ok(candidates)
    }

    /// Plan cover for every class lesson of the absent teacher without persisting anything.
    ///
    /// Lessons already covered by a stored proxy row for this absence are skipped.
    pub fn plan_day(
        &self,
        date: NaiveDate,
        absent_teacher_id: &TeacherId,
    ) -> Result<CoverageReport, SubstitutionServiceError> {
        let day = SchoolDay::for_date(date);
        let Some(school_day) = day else {
            return Ok(CoverageReport::empty(date, absent_teacher_id.clone()));
        };

        let existing = self.ledger.proxies_on(date)?;
        let lessons: Vec<LessonSlot> = self
            .repository
            .list_timetable_for_teacher(absent_teacher_id, school_day)?
            .into_iter()
            .filter(|lesson| lesson.period.is_class())
            .collect();

        let (covered, open): (Vec<LessonSlot>, Vec<LessonSlot>) =
            lessons.into_iter().partition(|lesson| {
                existing.iter().any(|proxy| {
                    &proxy.absent_teacher_id == absent_teacher_id
                        && proxy.period_id == lesson.entry.period_id
                        && proxy.class_id == lesson.entry.class_id
                })
            });

        let assignments = self.assigner.assign_lessons(
            self.repository.as_ref(),
            date,
            absent_teacher_id,
            &open,
        )?;

        let uncovered: Vec<UncoveredLesson> = open
            .iter()
            .filter(|lesson| {
                !assignments
                    .iter()
                    .any(|assignment| assignment.period_id == lesson.entry.period_id)
            })
            .map(UncoveredLesson::from)
            .collect();

        if !uncovered.is_empty() {
            warn!(
                %date,
                absent = %absent_teacher_id,
                uncovered = uncovered.len(),
                "auto-assign left lessons without cover"
            );
        }

        Ok(CoverageReport {
            date,
            day,
            absent_teacher_id: absent_teacher_id.clone(),
            lessons_requiring_cover: open.len(),
            already_covered: covered.len(),
            assignments,
            uncovered,
            committed: false,
        })
    }

    /// Plan the day, then record the absence and every assignment through the ledger.
    ///
    /// The first ledger failure is returned as-is; rows written before it are left in place.
    pub fn commit_day(
        &self,
        date: NaiveDate,
        absent_teacher_id: &TeacherId,
    ) -> Result<CoverageReport, SubstitutionServiceError> {
        let mut report = self.plan_day(date, absent_teacher_id)?;

        self.ledger.record_absence(AbsenceRecord {
            teacher_id: absent_teacher_id.clone(),
            date,
        })?;

        for assignment in &report.assignments {
            self.ledger
                .record_proxy(assignment.to_proxy_record(date, absent_teacher_id))?;
        }

        report.committed = true;
        info!(
            %date,
            absent = %absent_teacher_id,
            assigned = report.assignments.len(),
            uncovered = report.uncovered.len(),
            "proxy cover committed"
        );

        Ok(report)
    }

    pub fn proxies_on(
        &self,
        date: NaiveDate,
    ) -> Result<Vec<ProxyAssignment>, SubstitutionServiceError> {
        Ok(self.ledger.proxies_on(date)?)
    }
}

/// Lesson of the absent teacher that no eligible substitute could take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncoveredLesson {
    pub period_id: PeriodId,
    pub period_no: u8,
    pub class_id: ClassId,
    pub class_name: String,
    pub subject_id: SubjectId,
    pub subject_name: String,
}

impl From<&LessonSlot> for UncoveredLesson {
    fn from(lesson: &LessonSlot) -> Self {
        Self {
            period_id: lesson.entry.period_id.clone(),
            period_no: lesson.period.period_no,
            class_id: lesson.entry.class_id.clone(),
            class_name: lesson.class_name.clone(),
            subject_id: lesson.entry.subject_id.clone(),
            subject_name: lesson.subject_name.clone(),
        }
    }
}

/// Outcome of a day plan, including the gaps the assigner could not fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub date: NaiveDate,
    pub day: Option<SchoolDay>,
    pub absent_teacher_id: TeacherId,
    pub lessons_requiring_cover: usize,
    pub already_covered: usize,
    pub assignments: Vec<Assignment>,
    pub uncovered: Vec<UncoveredLesson>,
    pub committed: bool,
}

impl CoverageReport {
    fn empty(date: NaiveDate, absent_teacher_id: TeacherId) -> Self {
        Self {
            date,
            day: None,
            absent_teacher_id,
            lessons_requiring_cover: 0,
            already_covered: 0,
            assignments: Vec::new(),
            uncovered: Vec::new(),
            committed: false,
        }
    }

    pub fn is_fully_covered(&self) -> bool {
        self.uncovered.is_empty()
    }

    pub fn summary(&self) -> String {
        match self.day {
            None => format!("no school on {}", self.date),
            Some(day) if self.lessons_requiring_cover == 0 => {
                format!("nothing to cover on {} {}", day.label(), self.date)
            }
            Some(day) => format!(
                "{} of {} lesson(s) covered on {} {}",
                self.assignments.len(),
                self.lessons_requiring_cover,
                day.label(),
                self.date
            ),
        }
    }
}

/// Error raised by the substitution service.
#[derive(Debug, thiserror::Error)]
pub enum SubstitutionServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
