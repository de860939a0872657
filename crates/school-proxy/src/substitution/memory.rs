use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDate;

use super::domain::{
    AbsenceRecord, LessonSlot, Period, PeriodId, ProxyAssignment, SchoolDay, TeacherId,
    TeacherSnapshot,
};
use super::repository::{ProxyLedger, RepositoryError, ScheduleRepository};
use crate::roster::SchoolRoster;

/// Reference store backed by a roster snapshot, serving both the read and write contracts.
///
/// Writes are serialised behind a mutex and enforce the one-slot-per-teacher and
/// one-cover-per-class rules that a relational store would carry as unique keys.
#[derive(Debug, Clone, Default)]
pub struct InMemorySchoolStore {
    roster: Arc<Mutex<SchoolRoster>>,
}

impl InMemorySchoolStore {
    pub fn new(roster: SchoolRoster) -> Self {
        Self {
            roster: Arc::new(Mutex::new(roster)),
        }
    }

    pub fn snapshot(&self) -> Result<SchoolRoster, RepositoryError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, SchoolRoster>, RepositoryError> {
        self.roster
            .lock()
            .map_err(|_| RepositoryError::Unavailable("roster lock poisoned".to_string()))
    }
}

impl ScheduleRepository for InMemorySchoolStore {
    fn list_active_teachers(
        &self,
        excluding: &TeacherId,
        day: SchoolDay,
        date: NaiveDate,
    ) -> Result<Vec<TeacherSnapshot>, RepositoryError> {
        let roster = self.lock()?;
        let snapshots = roster
            .teachers
            .iter()
            .filter(|teacher| teacher.active && &teacher.id != excluding)
            .map(|teacher| TeacherSnapshot {
                teacher: teacher.clone(),
                timetable: roster
                    .timetable
                    .iter()
                    .filter(|row| row.entry.teacher_id == teacher.id && row.entry.day == day)
                    .map(|row| row.entry.clone())
                    .collect(),
                proxies: roster
                    .proxies
                    .iter()
                    .filter(|proxy| proxy.assigned_teacher_id == teacher.id && proxy.date == date)
                    .cloned()
                    .collect(),
                absence: roster
                    .absences
                    .iter()
                    .find(|absence| absence.teacher_id == teacher.id && absence.date == date)
                    .cloned(),
            })
            .collect();

        Ok(snapshots)
    }

    fn get_period(&self, id: &PeriodId) -> Result<Option<Period>, RepositoryError> {
        Ok(self.lock()?.period(id).cloned())
    }

    fn list_class_periods(&self) -> Result<Vec<Period>, RepositoryError> {
        let roster = self.lock()?;
        let mut periods: Vec<Period> = roster
            .periods
            .iter()
            .filter(|period| period.is_class())
            .cloned()
            .collect();
        periods.sort_by_key(|period| period.period_no);
        Ok(periods)
    }

    fn list_timetable_for_teacher(
        &self,
        teacher: &TeacherId,
        day: SchoolDay,
    ) -> Result<Vec<LessonSlot>, RepositoryError> {
        let roster = self.lock()?;
        let mut lessons: Vec<LessonSlot> = roster
            .timetable
            .iter()
            .filter(|row| &row.entry.teacher_id == teacher && row.entry.day == day)
            .filter_map(|row| {
                roster.period(&row.entry.period_id).map(|period| LessonSlot {
                    entry: row.entry.clone(),
                    period: period.clone(),
                    class_name: row.class_name.clone(),
                    subject_name: row.subject_name.clone(),
                })
            })
            .collect();
        lessons.sort_by_key(|lesson| lesson.period.period_no);
        Ok(lessons)
    }
}

impl ProxyLedger for InMemorySchoolStore {
    fn record_absence(&self, absence: AbsenceRecord) -> Result<(), RepositoryError> {
        let mut roster = self.lock()?;
        if !roster.absences.contains(&absence) {
            roster.absences.push(absence);
        }
        Ok(())
    }

    fn record_proxy(&self, proxy: ProxyAssignment) -> Result<(), RepositoryError> {
        let mut roster = self.lock()?;
        let clash = roster.proxies.iter().find(|existing| {
            existing.date == proxy.date
                && existing.period_id == proxy.period_id
                && (existing.assigned_teacher_id == proxy.assigned_teacher_id
                    || existing.class_id == proxy.class_id)
        });

        if let Some(existing) = clash {
            return Err(RepositoryError::Conflict(format!(
                "{} already has cover in period {} on {}",
                if existing.class_id == proxy.class_id {
                    existing.class_id.to_string()
                } else {
                    existing.assigned_teacher_id.to_string()
                },
                proxy.period_id,
                proxy.date
            )));
        }

        roster.proxies.push(proxy);
        Ok(())
    }

    fn proxies_on(&self, date: NaiveDate) -> Result<Vec<ProxyAssignment>, RepositoryError> {
        Ok(self
            .lock()?
            .proxies
            .iter()
            .filter(|proxy| proxy.date == date)
            .cloned()
            .collect())
    }
}
