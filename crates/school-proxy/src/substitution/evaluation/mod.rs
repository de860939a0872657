mod config;
mod overlay;
mod rules;

pub use config::{
    ProxyPolicy, DEFAULT_ADJACENT_FREE_BONUS, DEFAULT_MAX_LOAD, DEFAULT_SUBJECT_MATCH_BONUS,
};
pub use overlay::TentativeAssignments;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{PeriodId, SchoolDay, SubjectId, TeacherId};
use super::repository::{RepositoryError, ScheduleRepository};
use rules::{assess, neighbours, SlotContext};

/// Single-slot cover question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub date: NaiveDate,
    pub period_id: PeriodId,
    pub subject_id: SubjectId,
    pub absent_teacher_id: TeacherId,
}

/// Stateless evaluator ranking substitute teachers for one slot.
#[derive(Debug, Clone, Default)]
pub struct AvailabilityEvaluator {
    policy: ProxyPolicy,
}

impl AvailabilityEvaluator {
    pub fn new(policy: ProxyPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ProxyPolicy {
        &self.policy
    }

    /// Rank eligible substitutes, best (lowest score) first.
    ///
    /// Sundays, unknown periods and non-class periods yield an empty list rather than an error.
    pub fn find_available<R>(
        &self,
        repository: &R,
        request: &AvailabilityRequest,
    ) -> Result<Vec<Candidate>, RepositoryError>
    where
        R: ScheduleRepository + ?Sized,
    {
        self.find_available_with(repository, request, &TentativeAssignments::default())
    }

    /// Same as [`find_available`](Self::find_available), counting `tentative` rows as if they
    /// were already stored.
    pub fn find_available_with<R>(
        &self,
        repository: &R,
        request: &AvailabilityRequest,
        tentative: &TentativeAssignments,
    ) -> Result<Vec<Candidate>, RepositoryError>
    where
        R: ScheduleRepository + ?Sized,
    {
        let Some(day) = SchoolDay::for_date(request.date) else {
            debug!(date = %request.date, "no school on date");
            return Ok(Vec::new());
        };

        let period = match repository.get_period(&request.period_id)? {
            Some(period) if period.is_class() => period,
            Some(period) => {
                debug!(period = %period.id, kind = period.kind.label(), "period needs no cover");
                return Ok(Vec::new());
            }
            None => {
                debug!(period = %request.period_id, "unknown period");
                return Ok(Vec::new());
            }
        };

        let teachers =
            repository.list_active_teachers(&request.absent_teacher_id, day, request.date)?;
        let class_periods = repository.list_class_periods()?;

        let slot = SlotContext {
            period: &period.id,
            subject: &request.subject_id,
            neighbours: neighbours(&class_periods, &period.id),
            policy: &self.policy,
        };

        let mut candidates = Vec::with_capacity(teachers.len());
        for snapshot in &teachers {
            // the store is expected to filter this already
            if snapshot.teacher.id == request.absent_teacher_id {
                continue;
            }

            let pending = tentative.for_teacher(&snapshot.teacher.id, request.date);
            match assess(snapshot, &pending, &slot) {
                Ok(candidate) => candidates.push(candidate),
                Err(reason) => {
                    debug!(teacher = %snapshot.teacher.id, %reason, "teacher excluded");
                }
            }
        }

        candidates.sort_by_key(|candidate| candidate.score);

        debug!(
            date = %request.date,
            period = %period.id,
            subject = %request.subject_id,
            considered = teachers.len(),
            eligible = candidates.len(),
            "availability evaluated"
        );

        Ok(candidates)
    }
}

/// Contribution to a candidate score, kept for transparent review of rankings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    Load,
    SubjectMatch,
    AdjacentFree,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub factor: ScoreFactor,
    pub score: i32,
    pub notes: String,
}

/// Eligible substitute with the signals behind its rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: TeacherId,
    pub name: String,
    pub current_periods: u32,
    pub proxy_count: u32,
    pub total_load: u32,
    pub subject_match: bool,
    pub adjacent_free: bool,
    /// Lower is better.
    pub score: i32,
    pub components: Vec<ScoreComponent>,
}
