use crate::infra::{build_service, load_roster};
use chrono::{Local, NaiveDate};
use clap::Args;
use school_proxy::config::AppConfig;
use school_proxy::error::AppError;
use school_proxy::roster::{RosterExporter, RosterImportError, RosterImporter, SchoolRoster};
use school_proxy::substitution::{
    AvailabilityRequest, Candidate, CoverageReport, PeriodId, SchoolDay, SubjectId, TeacherId,
};
use std::fmt::Write as _;
use std::path::PathBuf;

const SAMPLE_PERIODS: &str = "id,period_no,kind,starts_at,ends_at
P1,1,class,08:00,08:45
P2,2,class,08:45,09:30
P3,3,class,09:30,10:15
RECESS,4,recess,10:15,10:35
P4,5,class,10:35,11:20
P5,6,class,11:20,12:05
LUNCH,7,lunch,12:05,12:45
P6,8,class,12:45,13:30
";

const SAMPLE_TEACHERS: &str = "id,name,active,subjects
T01,Asha Rao,true,MATH
T02,Ben Ortiz,true,ENG
T03,Chen Li,true,SCI
T04,Dana Kim,true,HIST
T05,Eli Moss,true,GEO
T06,Fatima Noor,true,ART
T07,Gus Patel,true,ENG;HIST
T08,Hana Sato,false,MATH
";

const SAMPLE_SUBJECTS: [(&str, &str, &str); 6] = [
    ("T01", "MATH", "Mathematics"),
    ("T02", "ENG", "English"),
    ("T03", "SCI", "Science"),
    ("T04", "HIST", "History"),
    ("T05", "GEO", "Geography"),
    ("T06", "ART", "Art"),
];

const SAMPLE_CLASSES: [(&str, &str); 4] = [
    ("6A", "Grade 6A"),
    ("6B", "Grade 6B"),
    ("7A", "Grade 7A"),
    ("7B", "Grade 7B"),
];

const SAMPLE_CLASS_PERIODS: [&str; 6] = ["P1", "P2", "P3", "P4", "P5", "P6"];

/// A six-day timetable where every subject teacher takes four of the six class periods.
///
/// The subject taught to class `c` in period `p` on day `d` rotates as `(p + c + d) % 6`,
/// so no teacher is ever booked twice in one slot. `T07` has no lessons and `T08` is inactive.
pub(crate) fn sample_school() -> Result<SchoolRoster, RosterImportError> {
    let mut timetable =
        String::from("teacher_id,day,period_id,class_id,class_name,subject_id,subject_name\n");
    for (day_index, day) in SchoolDay::ALL.iter().enumerate() {
        for (period_index, period) in SAMPLE_CLASS_PERIODS.iter().enumerate() {
            for (class_index, (class_id, class_name)) in SAMPLE_CLASSES.iter().enumerate() {
                let slot = (period_index + class_index + day_index) % SAMPLE_SUBJECTS.len();
                let (teacher, subject_id, subject_name) = SAMPLE_SUBJECTS[slot];
                let _ = writeln!(
                    timetable,
                    "{teacher},{},{period},{class_id},{class_name},{subject_id},{subject_name}",
                    day.label()
                );
            }
        }
    }

    RosterImporter::from_readers(
        SAMPLE_PERIODS.as_bytes(),
        SAMPLE_TEACHERS.as_bytes(),
        timetable.as_bytes(),
    )
}

#[derive(Args, Debug)]
pub(crate) struct AvailableArgs {
    /// Roster directory (periods.csv, teachers.csv, timetable.csv).
    /// Falls back to SCHOOL_ROSTER_DIR, then the sample school.
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Date of the absence (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: NaiveDate,
    /// Period that needs cover
    #[arg(long)]
    pub(crate) period: String,
    /// Subject taught in that period
    #[arg(long)]
    pub(crate) subject: String,
    /// Teacher who is away
    #[arg(long)]
    pub(crate) absent: String,
    /// Print JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct AssignArgs {
    /// Roster directory. Falls back to SCHOOL_ROSTER_DIR, then the sample school.
    #[arg(long)]
    pub(crate) roster: Option<PathBuf>,
    /// Date of the absence (YYYY-MM-DD)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: NaiveDate,
    /// Teacher who is away
    #[arg(long)]
    pub(crate) absent: String,
    /// Record the absence and the assignments.
    /// With a roster directory they are written to absences.csv and proxies.csv.
    #[arg(long)]
    pub(crate) commit: bool,
    /// Print JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Day to plan (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) date: Option<NaiveDate>,
    /// Sample teacher to mark absent
    #[arg(long, default_value = "T01")]
    pub(crate) absent: String,
}

pub(crate) fn run_available(args: AvailableArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let roster_dir = args.roster.or(config.roster_dir);
    let (service, _store) = build_service(load_roster(roster_dir.as_deref())?, config.policy);
    let request = AvailabilityRequest {
        date: args.date,
        period_id: PeriodId(args.period),
        subject_id: SubjectId(args.subject),
        absent_teacher_id: TeacherId(args.absent),
    };

    let candidates = service.find_available(&request)?;
    if args.json {
        println!("{}", to_json(&candidates)?);
    } else {
        print!("{}", render_candidates(&request, &candidates));
    }
    Ok(())
}

pub(crate) fn run_assign(args: AssignArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let roster_dir = args.roster.or(config.roster_dir);
    let (service, store) = build_service(load_roster(roster_dir.as_deref())?, config.policy);
    let absent = TeacherId(args.absent);

    let report = if args.commit {
        service.commit_day(args.date, &absent)?
    } else {
        service.plan_day(args.date, &absent)?
    };

    if let (true, Some(dir)) = (args.commit, roster_dir.as_deref()) {
        RosterExporter::write_cover(dir, &store.snapshot()?)?;
    }

    if args.json {
        println!("{}", to_json(&report)?);
    } else {
        print!("{}", render_report(&report));
    }
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let roster = sample_school()?;
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let absent = TeacherId(args.absent);

    println!("Substitute cover demo");
    println!(
        "Sample school: {} teachers, {} periods, {} lessons a week",
        roster.teachers.len(),
        roster.periods.len(),
        roster.timetable.len()
    );

    let first_lesson = SchoolDay::for_date(date).and_then(|day| {
        roster
            .timetable
            .iter()
            .find(|row| row.entry.teacher_id == absent && row.entry.day == day)
            .map(|row| row.entry.clone())
    });

    let (service, _store) = build_service(roster, config.policy);

    if let Some(lesson) = first_lesson {
        let request = AvailabilityRequest {
            date,
            period_id: lesson.period_id,
            subject_id: lesson.subject_id,
            absent_teacher_id: absent.clone(),
        };
        let candidates = service.find_available(&request)?;
        println!();
        print!("{}", render_candidates(&request, &candidates));
    }

    let plan = service.plan_day(date, &absent)?;
    println!();
    print!("{}", render_report(&plan));

    let committed = service.commit_day(date, &absent)?;
    let stored = service.proxies_on(date)?;
    println!(
        "\nCommitted {} proxy row(s); {} on record for {}",
        committed.assignments.len(),
        stored.len(),
        date
    );

    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string_pretty(value)
        .map_err(|err| AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, err)))
}

pub(crate) fn render_candidates(request: &AvailabilityRequest, candidates: &[Candidate]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Cover for {} ({}) on {}, {} away",
        request.period_id, request.subject_id, request.date, request.absent_teacher_id
    );

    if candidates.is_empty() {
        let _ = writeln!(out, "  no eligible substitutes");
        return out;
    }

    for (rank, candidate) in candidates.iter().enumerate() {
        let mut flags = Vec::new();
        if candidate.subject_match {
            flags.push("subject");
        }
        if candidate.adjacent_free {
            flags.push("adjacent-free");
        }
        let _ = writeln!(
            out,
            "  {:>2}. {:<6} {:<14} load {} ({} lessons + {} cover)  score {:>3}  {}",
            rank + 1,
            candidate.id,
            candidate.name,
            candidate.total_load,
            candidate.current_periods,
            candidate.proxy_count,
            candidate.score,
            flags.join(", ")
        );
    }
    out
}

pub(crate) fn render_report(report: &CoverageReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", report.summary());

    if report.already_covered > 0 {
        let _ = writeln!(out, "  {} lesson(s) already had cover", report.already_covered);
    }
    for assignment in &report.assignments {
        let _ = writeln!(
            out,
            "  period {} {:<10} {:<12} -> {} (score {})",
            assignment.period_no,
            assignment.class_name,
            assignment.subject_name,
            assignment.assigned_teacher_name,
            assignment.score
        );
    }
    for lesson in &report.uncovered {
        let _ = writeln!(
            out,
            "  period {} {:<10} {:<12} -> UNCOVERED",
            lesson.period_no, lesson.class_name, lesson.subject_name
        );
    }
    if report.committed {
        let _ = writeln!(out, "  recorded");
    }
    out
}
