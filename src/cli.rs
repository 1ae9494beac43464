//! This module contains the command-line interface [`Cli`] parser for recording school attendance
//! and exporting reports.

use crate::gateway::ReportMode;
use crate::models::{Gender, NewSchedule, Status};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// The command line configuration struct, where the command-line interface parser is automatically
/// derived by [`clap::Parser`].
#[derive(Parser, Debug)]
#[command(name = "absensi", version, about)]
pub struct Cli {
    /// The different commands available for managing attendance records.
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database tables.
    InitDb,

    /// Add an academic year, e.g. `2025/2026 2025 2026`.
    AddYear {
        name: String,
        start_year: i32,
        end_year: i32,
        /// Also make it the active year.
        #[arg(long)]
        activate: bool,
    },

    /// Make an academic year the only active one.
    ActivateYear { name: String },

    /// List academic years.
    ListYears,

    /// Add a study program such as MIPA or IPS.
    AddProgram {
        code: String,
        name: String,
        short_name: String,
        /// The lowest grade the program is offered in.
        #[arg(long, default_value_t = 10)]
        min_grade: i32,
    },

    /// Remove a study program with all of its classes.
    RemoveProgram { id: i32 },

    /// Add a subject.
    AddSubject { code: String, name: String },

    /// Add a teacher.
    AddTeacher { name: String },

    /// Open a class in an academic year.
    AddClass(ClassArgs),

    /// List classes.
    ListClasses,

    /// Add a single student to a class.
    AddStudent {
        nis: String,
        name: String,
        /// M or F.
        gender: Gender,
        #[arg(long)]
        class: i32,
    },

    /// Remove a student together with their attendance.
    RemoveStudent { nis: String },

    /// Add the students of a `nis,name,gender` CSV file to a class.
    ImportStudents {
        #[arg(long)]
        class: i32,
        file_path: PathBuf,
    },

    /// Display the students of a class.
    ShowRoster {
        #[arg(long)]
        class: i32,
        /// Show every column.
        #[arg(short, long)]
        verbose: bool,
    },

    /// Assign a teacher to a subject in a class.
    Assign {
        #[arg(long)]
        teacher: i32,
        #[arg(long)]
        subject: i32,
        #[arg(long)]
        class: i32,
    },

    /// Add a lesson to the timetable.
    AddSchedule(ScheduleArgs),

    /// Change a lesson in the timetable.
    UpdateSchedule {
        id: i32,
        #[command(flatten)]
        schedule: ScheduleArgs,
    },

    /// Display the timetable of a class.
    ShowSchedule {
        #[arg(long)]
        class: i32,
    },

    /// Display the lessons a teacher gives today.
    Today {
        #[arg(long)]
        teacher: i32,
        /// 1 (Monday) to 7 (Sunday), defaults to today.
        #[arg(long)]
        weekday: Option<i32>,
    },

    /// Record the attendance of a class for one subject from an `nis,status` CSV file.
    Record(RecordArgs),

    /// Change the recorded status of one student.
    Correct {
        #[arg(long)]
        class: i32,
        #[arg(long)]
        subject: i32,
        #[arg(long)]
        date: NaiveDate,
        nis: String,
        /// HADIR, SAKIT, IZIN or ALFA (or H, S, I, A).
        status: Status,
    },

    /// Display the daily sheet of a class.
    ShowDaily {
        #[arg(long)]
        class: i32,
        /// Defaults to today.
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        subject: Option<i32>,
    },

    /// Display the semester rollup of a class.
    ShowSemester {
        #[arg(long)]
        class: i32,
        #[arg(long)]
        semester: u8,
        /// Defaults to the active academic year.
        #[arg(long)]
        year: Option<String>,
    },

    /// Export a daily sheet, a semester rollup or a teacher's matrix as CSV.
    Report(ReportArgs),
}

#[derive(Args, Debug)]
pub struct ClassArgs {
    /// 10, 11 or 12.
    pub grade: i32,
    #[arg(long)]
    pub year_id: i32,
    #[arg(long)]
    pub program: Option<i32>,
    /// e.g. A or 1.
    #[arg(long)]
    pub section: Option<String>,
    /// Derived from grade, program and section when omitted.
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    #[arg(long)]
    pub class: i32,
    #[arg(long)]
    pub subject: i32,
    #[arg(long)]
    pub teacher: i32,
    /// 1 (Monday) to 7 (Sunday).
    #[arg(long)]
    pub weekday: i32,
    /// e.g. 07:00-08:30.
    #[arg(long)]
    pub time_slot: String,
}

impl From<ScheduleArgs> for NewSchedule {
    fn from(args: ScheduleArgs) -> Self {
        NewSchedule {
            class_room_id: args.class,
            subject_id: args.subject,
            teacher_id: args.teacher,
            weekday: args.weekday,
            time_slot: args.time_slot,
        }
    }
}

#[derive(Args, Debug)]
pub struct RecordArgs {
    #[arg(long)]
    pub class: i32,
    #[arg(long)]
    pub subject: i32,
    #[arg(long)]
    pub teacher: i32,
    /// Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Who is entering the record.
    #[arg(long)]
    pub recorded_by: String,
    /// Status for students of the class that the file does not list. Without it they are left
    /// unrecorded.
    #[arg(long)]
    pub default_status: Option<Status>,
    pub file_path: PathBuf,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// daily, semester or teacher.
    pub mode: ReportMode,
    #[arg(long)]
    pub class: i32,
    /// Daily only, defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Daily and teacher only.
    #[arg(long)]
    pub subject: Option<i32>,
    /// Teacher only.
    #[arg(long)]
    pub teacher: Option<i32>,
    /// Semester only, 1 or 2.
    #[arg(long)]
    pub semester: Option<u8>,
    /// Semester only, defaults to the active academic year.
    #[arg(long)]
    pub year: Option<String>,
    /// Directory to write into instead of the configured one.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Print the CSV instead of writing a file.
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,
}
