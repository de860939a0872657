//! School roster snapshots and their CSV import.
//!
//! A roster directory holds `periods.csv`, `teachers.csv` and `timetable.csv`, plus optional
//! `absences.csv` and `proxies.csv` for cover that was arranged before the import.

mod parser;

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::substitution::domain::{
    AbsenceRecord, Period, PeriodId, ProxyAssignment, Teacher, TeacherId, TimetableEntry,
};

/// Timetable entry with the display names the store joins for reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableRow {
    pub entry: TimetableEntry,
    pub class_name: String,
    pub subject_name: String,
}

/// Everything the reference store holds, in enumeration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolRoster {
    pub periods: Vec<Period>,
    pub teachers: Vec<Teacher>,
    pub timetable: Vec<TimetableRow>,
    pub absences: Vec<AbsenceRecord>,
    pub proxies: Vec<ProxyAssignment>,
}

impl SchoolRoster {
    pub fn teacher(&self, id: &TeacherId) -> Option<&Teacher> {
        self.teachers.iter().find(|teacher| &teacher.id == id)
    }

    pub fn period(&self, id: &PeriodId) -> Option<&Period> {
        self.periods.iter().find(|period| &period.id == id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RosterImportError {
    #[error("failed to read roster file {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid CSV data in {file}: {source}")]
    Csv {
        file: &'static str,
        #[source]
        source: csv::Error,
    },
    #[error("{file} line {line}: {message}")]
    Invalid {
        file: &'static str,
        line: usize,
        message: String,
    },
}

impl RosterImportError {
    pub(crate) fn invalid(file: &'static str, line: usize, message: impl Into<String>) -> Self {
        Self::Invalid {
            file,
            line,
            message: message.into(),
        }
    }
}

pub struct RosterImporter;

impl RosterImporter {
    /// Load a roster directory. Missing optional files are skipped.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<SchoolRoster, RosterImportError> {
        let dir = dir.as_ref();
        let open = |name: &str| {
            let path = dir.join(name);
            std::fs::File::open(&path).map_err(|source| RosterImportError::Io {
                file: path.display().to_string(),
                source,
            })
        };

        let mut roster = Self::from_readers(
            open(parser::PERIODS_FILE)?,
            open(parser::TEACHERS_FILE)?,
            open(parser::TIMETABLE_FILE)?,
        )?;

        if dir.join(parser::ABSENCES_FILE).is_file() {
            Self::apply_absences(&mut roster, open(parser::ABSENCES_FILE)?)?;
        }
        if dir.join(parser::PROXIES_FILE).is_file() {
            Self::apply_proxies(&mut roster, open(parser::PROXIES_FILE)?)?;
        }

        Ok(roster)
    }

    pub fn from_readers<P, T, L>(
        periods: P,
        teachers: T,
        timetable: L,
    ) -> Result<SchoolRoster, RosterImportError>
    where
        P: Read,
        T: Read,
        L: Read,
    {
        let periods = parser::parse_periods(periods)?;
        let teachers = parser::parse_teachers(teachers)?;

        let period_ids: HashSet<&PeriodId> = periods.iter().map(|period| &period.id).collect();
        let teacher_ids: HashSet<&TeacherId> =
            teachers.iter().map(|teacher| &teacher.id).collect();

        let mut booked = HashSet::new();
        let mut rows = Vec::new();
        for (line, row) in parser::parse_timetable(timetable)? {
            if !teacher_ids.contains(&row.entry.teacher_id) {
                return Err(RosterImportError::invalid(
                    parser::TIMETABLE_FILE,
                    line,
                    format!("unknown teacher '{}'", row.entry.teacher_id),
                ));
            }
            if !period_ids.contains(&row.entry.period_id) {
                return Err(RosterImportError::invalid(
                    parser::TIMETABLE_FILE,
                    line,
                    format!("unknown period '{}'", row.entry.period_id),
                ));
            }
            let slot = (
                row.entry.teacher_id.clone(),
                row.entry.day,
                row.entry.period_id.clone(),
            );
            if !booked.insert(slot) {
                return Err(RosterImportError::invalid(
                    parser::TIMETABLE_FILE,
                    line,
                    format!(
                        "{} is already timetabled in period {} on {}",
                        row.entry.teacher_id,
                        row.entry.period_id,
                        row.entry.day.label()
                    ),
                ));
            }
            rows.push(row);
        }

        Ok(SchoolRoster {
            periods,
            teachers,
            timetable: rows,
            absences: Vec::new(),
            proxies: Vec::new(),
        })
    }

    pub fn apply_absences<R: Read>(
        roster: &mut SchoolRoster,
        reader: R,
    ) -> Result<(), RosterImportError> {
        roster.absences.extend(parser::parse_absences(reader)?);
        Ok(())
    }

    /// Append recorded cover. A row that gives a teacher or a class two covers in the same
    /// (date, period) is rejected, as the ledger would reject it.
    pub fn apply_proxies<R: Read>(
        roster: &mut SchoolRoster,
        reader: R,
    ) -> Result<(), RosterImportError> {
        for (line, proxy) in parser::parse_proxies(reader)? {
            let clash = roster.proxies.iter().find(|existing| {
                existing.date == proxy.date
                    && existing.period_id == proxy.period_id
                    && (existing.assigned_teacher_id == proxy.assigned_teacher_id
                        || existing.class_id == proxy.class_id)
            });
            if let Some(existing) = clash {
                let holder = if existing.class_id == proxy.class_id {
                    existing.class_id.to_string()
                } else {
                    existing.assigned_teacher_id.to_string()
                };
                return Err(RosterImportError::invalid(
                    parser::PROXIES_FILE,
                    line,
                    format!(
                        "{holder} already has cover in period {} on {}",
                        proxy.period_id, proxy.date
                    ),
                ));
            }
            roster.proxies.push(proxy);
        }
        Ok(())
    }
}

/// Writes recorded cover back next to the roster it was planned from.
pub struct RosterExporter;

impl RosterExporter {
    /// Rewrite `absences.csv` and `proxies.csv` in `dir` from the roster's current rows.
    pub fn write_cover<P: AsRef<Path>>(
        dir: P,
        roster: &SchoolRoster,
    ) -> Result<(), RosterImportError> {
        let dir = dir.as_ref();
        let create = |name: &str| {
            let path = dir.join(name);
            std::fs::File::create(&path).map_err(|source| RosterImportError::Io {
                file: path.display().to_string(),
                source,
            })
        };

        parser::write_absences(create(parser::ABSENCES_FILE)?, &roster.absences)?;
        parser::write_proxies(create(parser::PROXIES_FILE)?, &roster.proxies)?;
        Ok(())
    }

    pub fn cover_to_writers<A: Write, W: Write>(
        roster: &SchoolRoster,
        absences: A,
        proxies: W,
    ) -> Result<(), RosterImportError> {
        parser::write_absences(absences, &roster.absences)?;
        parser::write_proxies(proxies, &roster.proxies)
    }
}
