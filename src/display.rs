//! Terminal tables for the `show-*` commands.

use crate::daily::DailyRow;
use crate::error::Result;
use crate::gateway::{ReportData, ReportMode, ReportRequest};
use crate::manager::AttendanceManager;
use crate::render::MISSING;
use crate::rollup::{RollupSummary, StudentStat};
use chrono::NaiveDate;
use tabled::{Table, Tabled, settings::Style};

#[derive(Tabled)]
struct DailyLine<'a> {
    #[tabled(rename = "NIS")]
    nis: &'a str,
    #[tabled(rename = "Nama")]
    name: &'a str,
    #[tabled(rename = "L/P")]
    gender: &'a str,
    #[tabled(rename = "Status")]
    status: &'a str,
    #[tabled(rename = "Mapel")]
    subject: &'a str,
    #[tabled(rename = "Guru")]
    teacher: &'a str,
}

impl<'a> From<&'a DailyRow> for DailyLine<'a> {
    fn from(row: &'a DailyRow) -> Self {
        DailyLine {
            nis: &row.nis,
            name: &row.name,
            gender: row.gender.as_str(),
            status: row.status.map_or(MISSING, |status| status.code()),
            subject: row.subject_name.as_deref().unwrap_or(MISSING),
            teacher: row.teacher_name.as_deref().unwrap_or(MISSING),
        }
    }
}

#[derive(Tabled)]
struct SemesterLine<'a> {
    #[tabled(rename = "NIS")]
    nis: &'a str,
    #[tabled(rename = "Nama")]
    name: &'a str,
    #[tabled(rename = "Total")]
    total: u32,
    #[tabled(rename = "H")]
    hadir: u32,
    #[tabled(rename = "S")]
    sakit: u32,
    #[tabled(rename = "I")]
    izin: u32,
    #[tabled(rename = "A")]
    alfa: u32,
    #[tabled(rename = "%")]
    percentage: String,
}

impl<'a> From<&'a StudentStat> for SemesterLine<'a> {
    fn from(stat: &'a StudentStat) -> Self {
        SemesterLine {
            nis: &stat.nis,
            name: &stat.name,
            total: stat.total,
            hadir: stat.hadir,
            sakit: stat.sakit,
            izin: stat.izin,
            alfa: stat.alfa,
            percentage: format!("{:.2}", stat.percentage),
        }
    }
}

/// Pretty prints the students of a class.
pub fn show_roster(manager: &mut AttendanceManager, class_id: i32, verbose: bool) -> Result<()> {
    let roster = manager.class_roster(class_id)?;

    let mut table = if verbose {
        #[derive(Tabled)]
        struct FullStudent {
            id: i32,
            nis: String,
            name: String,
            gender: String,
            class_room_id: i32,
        }

        Table::new(roster.into_iter().map(|student| FullStudent {
            id: student.id,
            nis: student.nis,
            name: student.name,
            gender: student.gender.to_string(),
            class_room_id: student.class_room_id,
        }))
    } else {
        #[derive(Tabled)]
        struct SimpleStudent {
            nis: String,
            name: String,
        }

        Table::new(roster.into_iter().map(|student| SimpleStudent {
            nis: student.nis,
            name: student.name,
        }))
    };

    table.with(Style::modern());
    println!("Class {class_id} roster:\n{table}");

    Ok(())
}

/// Pretty prints the daily sheet of a class, with one-letter status codes.
pub fn show_daily(
    manager: &mut AttendanceManager,
    class_id: i32,
    date: NaiveDate,
    subject_id: Option<i32>,
) -> Result<()> {
    let request = ReportRequest {
        class_id: Some(class_id),
        mode: ReportMode::Daily,
        date: Some(date),
        subject_id,
        ..Default::default()
    };

    if let ReportData::Daily {
        class_name, rows, ..
    } = manager.report_data(&request)?
    {
        let mut table = Table::new(rows.iter().map(DailyLine::from));
        table.with(Style::modern());

        println!("{class_name}, {date}:\n{table}");
    }

    Ok(())
}

/// Pretty prints the semester rollup of a class followed by its summary.
pub fn show_semester(
    manager: &mut AttendanceManager,
    class_id: i32,
    semester: u8,
    year: String,
) -> Result<()> {
    let request = ReportRequest {
        class_id: Some(class_id),
        mode: ReportMode::Semester,
        semester: Some(semester),
        year: Some(year),
        ..Default::default()
    };

    if let ReportData::Semester {
        class_name,
        range,
        stats,
    } = manager.report_data(&request)?
    {
        let summary = RollupSummary::from_stats(&stats);

        let mut table = Table::new(stats.iter().map(SemesterLine::from));
        table.with(Style::modern());

        println!("{class_name}, {}:\n{table}", range.label());
        println!(
            "{} records, {} present, average attendance {:.2}%",
            summary.total_records, summary.total_hadir, summary.average_percentage
        );
    }

    Ok(())
}

/// Pretty prints the timetable of a class.
pub fn show_schedule(manager: &mut AttendanceManager, class_id: i32) -> Result<()> {
    #[derive(Tabled)]
    struct Lesson {
        id: i32,
        weekday: i32,
        time_slot: String,
        subject_id: i32,
        teacher_id: i32,
    }

    let lessons = manager
        .class_schedule(class_id)?
        .into_iter()
        .map(|schedule| Lesson {
            id: schedule.id,
            weekday: schedule.weekday,
            time_slot: schedule.time_slot,
            subject_id: schedule.subject_id,
            teacher_id: schedule.teacher_id,
        });

    let mut table = Table::new(lessons);
    table.with(Style::modern());
    println!("Class {class_id} schedule:\n{table}");

    Ok(())
}

/// Pretty prints the lessons a teacher gives on one weekday.
pub fn show_teacher_day(
    manager: &mut AttendanceManager,
    teacher_id: i32,
    weekday: i32,
) -> Result<()> {
    #[derive(Tabled)]
    struct Lesson {
        #[tabled(rename = "Jam")]
        time_slot: String,
        #[tabled(rename = "Kelas")]
        class_name: String,
        #[tabled(rename = "Mapel")]
        subject_name: String,
        class_id: i32,
        subject_id: i32,
    }

    let lessons = manager.teacher_schedule(teacher_id, weekday)?;
    if lessons.is_empty() {
        println!("Teacher {teacher_id} has no lessons on weekday {weekday}.");
        return Ok(());
    }

    let mut table = Table::new(lessons.into_iter().map(|lesson| Lesson {
        time_slot: lesson.schedule.time_slot,
        class_name: lesson.class_name,
        subject_name: lesson.subject_name,
        class_id: lesson.schedule.class_room_id,
        subject_id: lesson.schedule.subject_id,
    }));
    table.with(Style::modern());
    println!("Teacher {teacher_id}, weekday {weekday}:\n{table}");

    Ok(())
}

/// Pretty prints the academic years and the classes opened in them.
pub fn show_years(manager: &mut AttendanceManager) -> Result<()> {
    #[derive(Tabled)]
    struct Year {
        id: i32,
        name: String,
        active: bool,
    }

    let years = manager.academic_years()?.into_iter().map(|year| Year {
        id: year.id,
        name: year.name,
        active: year.is_active,
    });

    let mut table = Table::new(years);
    table.with(Style::modern());
    println!("Academic years:\n{table}");

    Ok(())
}

pub fn show_classes(manager: &mut AttendanceManager) -> Result<()> {
    #[derive(Tabled)]
    struct Class {
        id: i32,
        name: String,
        grade: i32,
        year_id: i32,
    }

    let classes = manager.class_rooms()?.into_iter().map(|class| Class {
        id: class.id,
        name: class.name,
        grade: class.grade_level,
        year_id: class.academic_year_id,
    });

    let mut table = Table::new(classes);
    table.with(Style::modern());
    println!("Classes:\n{table}");

    Ok(())
}
