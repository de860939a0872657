use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use school_proxy::roster::{RosterExporter, RosterImportError, RosterImporter};
use school_proxy::substitution::{PeriodKind, SchoolDay, TeacherId};

fn roster_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("school-proxy-{name}-{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("temp roster dir");
    fs::write(
        dir.join("periods.csv"),
        " id , period_no , kind , starts_at , ends_at \n\
         P1 , 1 , class , 08:00 , 08:45 \n\
         BRK , 2 , break , 08:45 , 09:00 \n\
         P2 , 3 , class , 09:00 , 09:45 \n",
    )
    .expect("periods written");
    fs::write(
        dir.join("teachers.csv"),
        "id,name,active,subjects\nT1,Asha Rao,,MATH; PHY\nT2,Ben Ortiz,false,ENG\n",
    )
    .expect("teachers written");
    fs::write(
        dir.join("timetable.csv"),
        "teacher_id,day,period_id,class_id,class_name,subject_id,subject_name\n\
         T1,sat,P2,C7A,,MATH,\n",
    )
    .expect("timetable written");
    dir
}

#[test]
fn directory_import_trims_cells_and_defaults_optional_columns() {
    let dir = roster_dir("trim");

    let roster = RosterImporter::from_dir(&dir).expect("roster imports");

    assert_eq!(roster.periods[1].kind, PeriodKind::Recess);
    assert_eq!(roster.periods[2].period_no, 3);
    let asha = roster
        .teacher(&TeacherId("T1".to_string()))
        .expect("T1 present");
    assert!(asha.active);
    assert_eq!(asha.subjects.len(), 2);
    assert_eq!(roster.timetable[0].entry.day, SchoolDay::Saturday);
    assert_eq!(roster.timetable[0].class_name, "C7A");
    assert!(roster.absences.is_empty());
    assert!(roster.proxies.is_empty());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn written_cover_is_picked_up_on_the_next_import() {
    let dir = roster_dir("cover");
    fs::write(dir.join("absences.csv"), "teacher_id,date\nT2,2025-09-27\n").expect("absences");

    let mut roster = RosterImporter::from_dir(&dir).expect("roster imports");
    assert_eq!(roster.absences.len(), 1);

    roster.absences.push(school_proxy::substitution::AbsenceRecord {
        teacher_id: TeacherId("T1".to_string()),
        date: NaiveDate::from_ymd_opt(2025, 9, 27).expect("valid date"),
    });
    RosterExporter::write_cover(&dir, &roster).expect("cover written");

    let reloaded = RosterImporter::from_dir(&dir).expect("roster re-imports");
    assert_eq!(reloaded.absences, roster.absences);
    assert!(dir.join("proxies.csv").is_file());

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn unknown_teacher_in_timetable_names_file_and_line() {
    let dir = roster_dir("unknown");
    fs::write(
        dir.join("timetable.csv"),
        "teacher_id,day,period_id,class_id,class_name,subject_id,subject_name\n\
         T1,Mon,P1,C7A,Grade 7A,MATH,Maths\n\
         T9,Mon,P2,C7B,Grade 7B,ENG,English\n",
    )
    .expect("timetable written");

    match RosterImporter::from_dir(&dir) {
        Err(RosterImportError::Invalid {
            file,
            line,
            message,
        }) => {
            assert_eq!(file, "timetable.csv");
            assert_eq!(line, 3);
            assert!(message.contains("T9"));
        }
        other => panic!("expected invalid timetable row, got {other:?}"),
    }

    let _ = fs::remove_dir_all(dir);
}

fn expect_invalid(dir: &Path) -> (&'static str, usize, String) {
    match RosterImporter::from_dir(dir) {
        Err(RosterImportError::Invalid {
            file,
            line,
            message,
        }) => (file, line, message),
        other => panic!("expected invalid roster row, got {other:?}"),
    }
}

#[test]
fn duplicate_teacher_ids_are_rejected() {
    let dir = roster_dir("dup-teacher");
    fs::write(
        dir.join("teachers.csv"),
        "id,name,active,subjects\nT1,Asha Rao,,MATH\nT2,Ben Ortiz,,ENG\nT1,Asha Again,,PHY\n",
    )
    .expect("teachers written");

    let (file, line, message) = expect_invalid(&dir);
    assert_eq!(file, "teachers.csv");
    assert_eq!(line, 4);
    assert!(message.contains("duplicate id 'T1'"), "{message}");

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn duplicate_period_ids_are_rejected() {
    let dir = roster_dir("dup-period");
    fs::write(
        dir.join("periods.csv"),
        "id,period_no,kind,starts_at,ends_at\n\
         P1,1,class,08:00,08:45\n\
         P1,2,class,08:45,09:30\n",
    )
    .expect("periods written");

    let (file, line, message) = expect_invalid(&dir);
    assert_eq!(file, "periods.csv");
    assert_eq!(line, 3);
    assert!(message.contains("duplicate id 'P1'"), "{message}");

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn teacher_booked_twice_in_one_slot_is_rejected() {
    let dir = roster_dir("double-booked");
    fs::write(
        dir.join("timetable.csv"),
        "teacher_id,day,period_id,class_id,class_name,subject_id,subject_name\n\
         T1,Mon,P2,C7A,Grade 7A,MATH,Maths\n\
         T1,Tue,P2,C7A,Grade 7A,MATH,Maths\n\
         T1,MONDAY,P2,C8B,Grade 8B,PHY,Physics\n",
    )
    .expect("timetable written");

    let (file, line, message) = expect_invalid(&dir);
    assert_eq!(file, "timetable.csv");
    assert_eq!(line, 4);
    assert!(
        message.contains("T1 is already timetabled in period P2 on Monday"),
        "{message}"
    );

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn proxies_that_double_cover_a_teacher_or_class_are_rejected() {
    let header = "date,period_id,class_id,subject_id,absent_teacher_id,assigned_teacher_id\n";
    let cases = [
        (
            "proxy-teacher",
            "2025-09-27,P2,C7A,MATH,T2,T1\n2025-09-27,P2,C8B,ENG,T3,T1\n",
            "T1 already has cover in period P2",
        ),
        (
            "proxy-class",
            "2025-09-27,P2,C7A,MATH,T2,T1\n2025-09-27,P2,C7A,MATH,T2,T4\n",
            "C7A already has cover in period P2",
        ),
    ];

    for (name, rows, expected) in cases {
        let dir = roster_dir(name);
        fs::write(dir.join("proxies.csv"), format!("{header}{rows}")).expect("proxies written");

        let (file, line, message) = expect_invalid(&dir);
        assert_eq!(file, "proxies.csv");
        assert_eq!(line, 3);
        assert!(message.contains(expected), "{message}");

        let _ = fs::remove_dir_all(dir);
    }
}

#[test]
fn proxies_for_other_slots_import_side_by_side() {
    let dir = roster_dir("proxy-ok");
    fs::write(
        dir.join("proxies.csv"),
        "date,period_id,class_id,subject_id,absent_teacher_id,assigned_teacher_id\n\
         2025-09-27,P2,C7A,MATH,T2,T1\n\
         2025-09-27,P1,C7A,MATH,T2,T1\n\
         2025-09-29,P2,C7A,MATH,T2,T1\n",
    )
    .expect("proxies written");

    let roster = RosterImporter::from_dir(&dir).expect("roster imports");
    assert_eq!(roster.proxies.len(), 3);

    let _ = fs::remove_dir_all(dir);
}

#[test]
fn reported_lines_count_blank_lines() {
    let dir = roster_dir("blank-lines");
    fs::write(
        dir.join("teachers.csv"),
        "id,name,active,subjects\nT1,Asha Rao,,MATH\n\n\nT2,Ben Ortiz,sometimes,ENG\n",
    )
    .expect("teachers written");

    let (file, line, message) = expect_invalid(&dir);
    assert_eq!(file, "teachers.csv");
    assert_eq!(line, 5);
    assert!(message.contains("'sometimes'"), "{message}");

    let _ = fs::remove_dir_all(dir);
}
