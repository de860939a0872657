//! Substitute-teacher cover: availability scoring for a single slot and greedy day assignment.

pub mod assignment;
pub mod domain;
pub mod evaluation;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use assignment::{Assignment, DayAutoAssigner};
pub use domain::{
    AbsenceRecord, ClassId, LessonSlot, Period, PeriodId, PeriodKind, ProxyAssignment,
    SchoolDay, SubjectId, Teacher, TeacherId, TeacherSnapshot, TimetableEntry,
};
pub use evaluation::{
    AvailabilityEvaluator, AvailabilityRequest, Candidate, ProxyPolicy, ScoreComponent,
    ScoreFactor, TentativeAssignments,
};
pub use memory::InMemorySchoolStore;
pub use repository::{ProxyLedger, RepositoryError, ScheduleRepository};
pub use router::substitution_router;
pub use service::{CoverageReport, SubstitutionService, SubstitutionServiceError, UncoveredLesson};
