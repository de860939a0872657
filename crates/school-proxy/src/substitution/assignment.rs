use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::{
    ClassId, LessonSlot, PeriodId, ProxyAssignment, SchoolDay, SubjectId, TeacherId,
};
use super::evaluation::{
    AvailabilityEvaluator, AvailabilityRequest, ProxyPolicy, TentativeAssignments,
};
use super::repository::{RepositoryError, ScheduleRepository};

/// Cover chosen for one lesson of the absent teacher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub period_id: PeriodId,
    pub period_no: u8,
    pub class_id: ClassId,
    pub class_name: String,
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub assigned_teacher_id: TeacherId,
    pub assigned_teacher_name: String,
    pub score: i32,
}

impl Assignment {
    /// Row to persist once the caller commits the plan.
    pub fn to_proxy_record(
        &self,
        date: NaiveDate,
        absent_teacher_id: &TeacherId,
    ) -> ProxyAssignment {
        ProxyAssignment {
            date,
            period_id: self.period_id.clone(),
            class_id: self.class_id.clone(),
            subject_id: self.subject_id.clone(),
            absent_teacher_id: absent_teacher_id.clone(),
            assigned_teacher_id: self.assigned_teacher_id.clone(),
        }
    }
}

/// Greedy single pass over an absent teacher's day.
///
/// Lessons are visited in period order and each pick is added to a run-local
/// [`TentativeAssignments`] overlay before the next lesson is evaluated. Nothing is persisted
/// and no earlier pick is revisited.
#[derive(Debug, Clone, Default)]
pub struct DayAutoAssigner {
    evaluator: AvailabilityEvaluator,
}

impl DayAutoAssigner {
    pub fn new(policy: ProxyPolicy) -> Self {
        Self {
            evaluator: AvailabilityEvaluator::new(policy),
        }
    }

    pub fn evaluator(&self) -> &AvailabilityEvaluator {
        &self.evaluator
    }

    /// Lessons left uncovered are simply absent from the result.
    pub fn auto_assign<R>(
        &self,
        repository: &R,
        date: NaiveDate,
        absent_teacher_id: &TeacherId,
    ) -> Result<Vec<Assignment>, RepositoryError>
    where
        R: ScheduleRepository + ?Sized,
    {
        let Some(day) = SchoolDay::for_date(date) else {
            debug!(%date, "no school on date");
            return Ok(Vec::new());
        };

        let lessons = repository.list_timetable_for_teacher(absent_teacher_id, day)?;
        self.assign_lessons(repository, date, absent_teacher_id, &lessons)
    }

    pub(crate) fn assign_lessons<R>(
        &self,
        repository: &R,
        date: NaiveDate,
        absent_teacher_id: &TeacherId,
        lessons: &[LessonSlot],
    ) -> Result<Vec<Assignment>, RepositoryError>
    where
        R: ScheduleRepository + ?Sized,
    {
        let mut ordered: Vec<&LessonSlot> = lessons.iter().collect();
        ordered.sort_by_key(|lesson| lesson.period.period_no);

        let mut tentative = TentativeAssignments::new();
        let mut assignments = Vec::new();

        for lesson in ordered.into_iter().filter(|lesson| lesson.period.is_class()) {
            let request = AvailabilityRequest {
                date,
                period_id: lesson.entry.period_id.clone(),
                subject_id: lesson.entry.subject_id.clone(),
                absent_teacher_id: absent_teacher_id.clone(),
            };

            let ranked = self
                .evaluator
                .find_available_with(repository, &request, &tentative)?;

            let Some(best) = ranked.into_iter().next() else {
                info!(
                    %date,
                    absent = %absent_teacher_id,
                    period = %lesson.entry.period_id,
                    class = %lesson.entry.class_id,
                    "no substitute available"
                );
                continue;
            };

            let assignment = Assignment {
                period_id: lesson.entry.period_id.clone(),
                period_no: lesson.period.period_no,
                class_id: lesson.entry.class_id.clone(),
                class_name: lesson.class_name.clone(),
                subject_id: lesson.entry.subject_id.clone(),
                subject_name: lesson.subject_name.clone(),
                assigned_teacher_id: best.id,
                assigned_teacher_name: best.name,
                score: best.score,
            };

            debug!(
                period = %assignment.period_id,
                teacher = %assignment.assigned_teacher_id,
                score = assignment.score,
                "substitute selected"
            );

            tentative.push(assignment.to_proxy_record(date, absent_teacher_id));
            assignments.push(assignment);
        }

        Ok(assignments)
    }
}
