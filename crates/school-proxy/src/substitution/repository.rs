use chrono::NaiveDate;

use super::domain::{
    AbsenceRecord, LessonSlot, Period, PeriodId, ProxyAssignment, SchoolDay, TeacherId,
    TeacherSnapshot,
};

/// Read side of the school store consumed by the evaluator and assigner.
pub trait ScheduleRepository: Send + Sync {
    /// Active teachers other than `excluding`, joined with the `day` timetable and the
    /// `date` proxy and absence rows.
    fn list_active_teachers(
        &self,
        excluding: &TeacherId,
        day: SchoolDay,
        date: NaiveDate,
    ) -> Result<Vec<TeacherSnapshot>, RepositoryError>;

    fn get_period(&self, id: &PeriodId) -> Result<Option<Period>, RepositoryError>;

    /// Class periods ordered by `period_no`.
    fn list_class_periods(&self) -> Result<Vec<Period>, RepositoryError>;

    /// Lessons ordered by period ordinal.
    fn list_timetable_for_teacher(
        &self,
        teacher: &TeacherId,
        day: SchoolDay,
    ) -> Result<Vec<LessonSlot>, RepositoryError>;
}

/// Write side used by the calling layer to persist committed cover.
pub trait ProxyLedger: Send + Sync {
    fn record_absence(&self, absence: AbsenceRecord) -> Result<(), RepositoryError>;
    fn record_proxy(&self, proxy: ProxyAssignment) -> Result<(), RepositoryError>;
    fn proxies_on(&self, date: NaiveDate) -> Result<Vec<ProxyAssignment>, RepositoryError>;
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record conflicts with an existing row: {0}")]
    Conflict(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
