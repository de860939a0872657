use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for teachers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeacherId(pub String);

/// Identifier wrapper for daily time slots.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PeriodId(pub String);

/// Identifier wrapper for classes (sections of students).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ClassId(pub String);

/// Identifier wrapper for subjects.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubjectId(pub String);

macro_rules! display_id {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        })*
    };
}

display_id!(TeacherId, PeriodId, ClassId, SubjectId);

/// The six teaching days of the school week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchoolDay {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl SchoolDay {
    pub const ALL: [SchoolDay; 6] = [
        SchoolDay::Monday,
        SchoolDay::Tuesday,
        SchoolDay::Wednesday,
        SchoolDay::Thursday,
        SchoolDay::Friday,
        SchoolDay::Saturday,
    ];

    /// Map a calendar date onto the teaching week. Sundays have no periods.
    pub fn for_date(date: NaiveDate) -> Option<Self> {
        Self::from_weekday(date.weekday())
    }

    pub fn from_weekday(weekday: Weekday) -> Option<Self> {
        match weekday {
            Weekday::Mon => Some(SchoolDay::Monday),
            Weekday::Tue => Some(SchoolDay::Tuesday),
            Weekday::Wed => Some(SchoolDay::Wednesday),
            Weekday::Thu => Some(SchoolDay::Thursday),
            Weekday::Fri => Some(SchoolDay::Friday),
            Weekday::Sat => Some(SchoolDay::Saturday),
            Weekday::Sun => None,
        }
    }

    /// Accepts full names and three letter abbreviations in any case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "monday" | "mon" => Some(SchoolDay::Monday),
            "tuesday" | "tue" => Some(SchoolDay::Tuesday),
            "wednesday" | "wed" => Some(SchoolDay::Wednesday),
            "thursday" | "thu" => Some(SchoolDay::Thursday),
            "friday" | "fri" => Some(SchoolDay::Friday),
            "saturday" | "sat" => Some(SchoolDay::Saturday),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            SchoolDay::Monday => "Monday",
            SchoolDay::Tuesday => "Tuesday",
            SchoolDay::Wednesday => "Wednesday",
            SchoolDay::Thursday => "Thursday",
            SchoolDay::Friday => "Friday",
            SchoolDay::Saturday => "Saturday",
        }
    }
}

/// Slot classification. Only `Class` slots are ever covered by a proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PeriodKind {
    Class,
    Recess,
    Lunch,
    Other,
}

impl PeriodKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "class" => Some(PeriodKind::Class),
            "recess" | "break" => Some(PeriodKind::Recess),
            "lunch" => Some(PeriodKind::Lunch),
            "other" => Some(PeriodKind::Other),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            PeriodKind::Class => "class",
            PeriodKind::Recess => "recess",
            PeriodKind::Lunch => "lunch",
            PeriodKind::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    pub id: PeriodId,
    pub period_no: u8,
    pub kind: PeriodKind,
    pub starts_at: NaiveTime,
    pub ends_at: NaiveTime,
}

impl Period {
    pub fn is_class(&self) -> bool {
        self.kind == PeriodKind::Class
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub id: TeacherId,
    pub name: String,
    pub active: bool,
    pub subjects: BTreeSet<SubjectId>,
}

impl Teacher {
    pub fn teaches(&self, subject: &SubjectId) -> bool {
        self.subjects.contains(subject)
    }
}

/// Recurring weekly lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimetableEntry {
    pub teacher_id: TeacherId,
    pub day: SchoolDay,
    pub period_id: PeriodId,
    pub class_id: ClassId,
    pub subject_id: SubjectId,
}

/// Cover already arranged for a specific calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyAssignment {
    pub date: NaiveDate,
    pub period_id: PeriodId,
    pub class_id: ClassId,
    pub subject_id: SubjectId,
    pub absent_teacher_id: TeacherId,
    pub assigned_teacher_id: TeacherId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceRecord {
    pub teacher_id: TeacherId,
    pub date: NaiveDate,
}

/// A teacher pre-joined with everything the evaluator needs for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeacherSnapshot {
    pub teacher: Teacher,
    /// Timetable rows for the evaluated weekday.
    pub timetable: Vec<TimetableEntry>,
    /// Proxy rows for the evaluated date.
    pub proxies: Vec<ProxyAssignment>,
    pub absence: Option<AbsenceRecord>,
}

impl TeacherSnapshot {
    pub fn teaches_in(&self, period: &PeriodId) -> bool {
        self.timetable.iter().any(|entry| &entry.period_id == period)
    }
}

/// Timetable row joined with its period and display names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonSlot {
    pub entry: TimetableEntry,
    pub period: Period,
    pub class_name: String,
    pub subject_name: String,
}
