use std::collections::{BTreeSet, HashSet};
use std::io::{Read, Write};

use chrono::{NaiveDate, NaiveTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::substitution::domain::{
    AbsenceRecord, ClassId, Period, PeriodId, PeriodKind, ProxyAssignment, SchoolDay,
    SubjectId, Teacher, TeacherId, TimetableEntry,
};

use super::{RosterImportError, TimetableRow};

pub(crate) const PERIODS_FILE: &str = "periods.csv";
pub(crate) const TEACHERS_FILE: &str = "teachers.csv";
pub(crate) const TIMETABLE_FILE: &str = "timetable.csv";
pub(crate) const ABSENCES_FILE: &str = "absences.csv";
pub(crate) const PROXIES_FILE: &str = "proxies.csv";

/// Deserialize every row of `reader`, pairing each with the 1-based line it starts on.
fn read_rows<R, T>(
    mut reader: R,
    file: &'static str,
) -> Result<Vec<(usize, T)>, RosterImportError>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut raw = Vec::new();
    reader
        .read_to_end(&mut raw)
        .map_err(|source| RosterImportError::Io {
            file: file.to_string(),
            source,
        })?;

    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(raw.as_slice());
    let headers = csv_reader
        .headers()
        .map_err(|source| RosterImportError::Csv { file, source })?
        .clone();
    let mut rows = Vec::new();

    for record in csv_reader.records() {
        let record = record.map_err(|source| RosterImportError::Csv { file, source })?;
        let line = record
            .position()
            .map(|position| record_line(&raw, position))
            .unwrap_or_default();
        let row = record
            .deserialize(Some(&headers))
            .map_err(|source| RosterImportError::Csv { file, source })?;
        rows.push((line, row));
    }

    Ok(rows)
}

/// A record's position sits just past the previous record, ahead of any empty lines the
/// reader skipped.
fn record_line(raw: &[u8], position: &csv::Position) -> usize {
    let skipped = raw
        .iter()
        .copied()
        .skip(position.byte() as usize)
        .take_while(|&byte| byte == b'\r' || byte == b'\n')
        .filter(|&byte| byte == b'\n')
        .count();
    position.line() as usize + skipped
}

fn ensure_unique(
    seen: &mut HashSet<String>,
    id: &str,
    file: &'static str,
    line: usize,
) -> Result<(), RosterImportError> {
    if seen.insert(id.to_string()) {
        Ok(())
    } else {
        Err(RosterImportError::invalid(file, line, format!("duplicate id '{id}'")))
    }
}

#[derive(Debug, Deserialize)]
struct PeriodRow {
    id: String,
    period_no: u8,
    kind: String,
    starts_at: String,
    ends_at: String,
}

pub(crate) fn parse_periods<R: Read>(reader: R) -> Result<Vec<Period>, RosterImportError> {
    let mut seen = HashSet::new();
    read_rows::<_, PeriodRow>(reader, PERIODS_FILE)?
        .into_iter()
        .map(|(line, row)| {
            ensure_unique(&mut seen, &row.id, PERIODS_FILE, line)?;
            let kind = PeriodKind::parse(&row.kind).ok_or_else(|| {
                RosterImportError::invalid(
                    PERIODS_FILE,
                    line,
                    format!("unknown kind '{}'", row.kind),
                )
            })?;
            Ok(Period {
                id: PeriodId(row.id),
                period_no: row.period_no,
                kind,
                starts_at: parse_time(&row.starts_at, PERIODS_FILE, line)?,
                ends_at: parse_time(&row.ends_at, PERIODS_FILE, line)?,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct TeacherRow {
    id: String,
    name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    active: Option<String>,
    #[serde(default)]
    subjects: String,
}

pub(crate) fn parse_teachers<R: Read>(reader: R) -> Result<Vec<Teacher>, RosterImportError> {
    let mut seen = HashSet::new();
    read_rows::<_, TeacherRow>(reader, TEACHERS_FILE)?
        .into_iter()
        .map(|(line, row)| {
            ensure_unique(&mut seen, &row.id, TEACHERS_FILE, line)?;
            let active = match row.active.as_deref() {
                None => true,
                Some(flag) => parse_flag(flag).ok_or_else(|| {
                    RosterImportError::invalid(
                        TEACHERS_FILE,
                        line,
                        format!("active must be true/false, found '{flag}'"),
                    )
                })?,
            };
            let subjects: BTreeSet<SubjectId> = row
                .subjects
                .split(';')
                .map(str::trim)
                .filter(|subject| !subject.is_empty())
                .map(|subject| SubjectId(subject.to_string()))
                .collect();

            Ok(Teacher {
                id: TeacherId(row.id),
                name: row.name,
                active,
                subjects,
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct TimetableCsvRow {
    teacher_id: String,
    day: String,
    period_id: String,
    class_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    class_name: Option<String>,
    subject_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    subject_name: Option<String>,
}

pub(crate) fn parse_timetable<R: Read>(
    reader: R,
) -> Result<Vec<(usize, TimetableRow)>, RosterImportError> {
    read_rows::<_, TimetableCsvRow>(reader, TIMETABLE_FILE)?
        .into_iter()
        .map(|(line, row)| {
            let day = SchoolDay::parse(&row.day).ok_or_else(|| {
                RosterImportError::invalid(
                    TIMETABLE_FILE,
                    line,
                    format!("'{}' is not a school day", row.day),
                )
            })?;
            let class_name = row.class_name.unwrap_or_else(|| row.class_id.clone());
            let subject_name = row.subject_name.unwrap_or_else(|| row.subject_id.clone());

            Ok((
                line,
                TimetableRow {
                    entry: TimetableEntry {
                        teacher_id: TeacherId(row.teacher_id),
                        day,
                        period_id: PeriodId(row.period_id),
                        class_id: ClassId(row.class_id),
                        subject_id: SubjectId(row.subject_id),
                    },
                    class_name,
                    subject_name,
                },
            ))
        })
        .collect()
}

#[derive(Debug, Serialize, Deserialize)]
struct AbsenceRow {
    teacher_id: String,
    date: String,
}

pub(crate) fn parse_absences<R: Read>(reader: R) -> Result<Vec<AbsenceRecord>, RosterImportError> {
    read_rows::<_, AbsenceRow>(reader, ABSENCES_FILE)?
        .into_iter()
        .map(|(line, row)| {
            Ok(AbsenceRecord {
                teacher_id: TeacherId(row.teacher_id),
                date: parse_date(&row.date, ABSENCES_FILE, line)?,
            })
        })
        .collect()
}

#[derive(Debug, Serialize, Deserialize)]
struct ProxyRow {
    date: String,
    period_id: String,
    class_id: String,
    subject_id: String,
    absent_teacher_id: String,
    assigned_teacher_id: String,
}

pub(crate) fn parse_proxies<R: Read>(
    reader: R,
) -> Result<Vec<(usize, ProxyAssignment)>, RosterImportError> {
    read_rows::<_, ProxyRow>(reader, PROXIES_FILE)?
        .into_iter()
        .map(|(line, row)| {
            let proxy = ProxyAssignment {
                date: parse_date(&row.date, PROXIES_FILE, line)?,
                period_id: PeriodId(row.period_id),
                class_id: ClassId(row.class_id),
                subject_id: SubjectId(row.subject_id),
                absent_teacher_id: TeacherId(row.absent_teacher_id),
                assigned_teacher_id: TeacherId(row.assigned_teacher_id),
            };
            Ok((line, proxy))
        })
        .collect()
}

fn write_rows<W, T>(writer: W, file: &'static str, rows: Vec<T>) -> Result<(), RosterImportError>
where
    W: Write,
    T: Serialize,
{
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer
            .serialize(row)
            .map_err(|source| RosterImportError::Csv { file, source })?;
    }
    csv_writer.flush().map_err(|source| RosterImportError::Io {
        file: file.to_string(),
        source,
    })
}

pub(crate) fn write_absences<W: Write>(
    writer: W,
    absences: &[AbsenceRecord],
) -> Result<(), RosterImportError> {
    let rows = absences
        .iter()
        .map(|absence| AbsenceRow {
            teacher_id: absence.teacher_id.0.clone(),
            date: absence.date.to_string(),
        })
        .collect();
    write_rows(writer, ABSENCES_FILE, rows)
}

pub(crate) fn write_proxies<W: Write>(
    writer: W,
    proxies: &[ProxyAssignment],
) -> Result<(), RosterImportError> {
    let rows = proxies
        .iter()
        .map(|proxy| ProxyRow {
            date: proxy.date.to_string(),
            period_id: proxy.period_id.0.clone(),
            class_id: proxy.class_id.0.clone(),
            subject_id: proxy.subject_id.0.clone(),
            absent_teacher_id: proxy.absent_teacher_id.0.clone(),
            assigned_teacher_id: proxy.assigned_teacher_id.0.clone(),
        })
        .collect();
    write_rows(writer, PROXIES_FILE, rows)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Some(true),
        "false" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

fn parse_time(
    value: &str,
    file: &'static str,
    line: usize,
) -> Result<NaiveTime, RosterImportError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map_err(|_| RosterImportError::invalid(file, line, format!("invalid time '{value}'")))
}

fn parse_date(
    value: &str,
    file: &'static str,
    line: usize,
) -> Result<NaiveDate, RosterImportError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        RosterImportError::invalid(
            file,
            line,
            format!("invalid date '{value}', expected YYYY-MM-DD"),
        )
    })
}

#[cfg(test)]
pub(crate) fn parse_flag_for_tests(value: &str) -> Option<bool> {
    parse_flag(value)
}
