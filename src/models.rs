use crate::schema::{
    academic_years, attendances, class_rooms, programs, schedules, students, subjects, teachers,
    teaching_assignments,
};
use chrono::NaiveDate;
use diesel::backend::Backend;
use diesel::deserialize::{self, FromSql, FromSqlRow};
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::serialize::{self, IsNull, Output, ToSql};
use diesel::sql_types::Text;
use diesel::sqlite::Sqlite;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// The attendance status of a student for one class-subject-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow, Deserialize)]
#[diesel(sql_type = Text)]
#[serde(try_from = "String")]
pub enum Status {
    /// Present.
    Hadir,
    /// Absent with a sick note.
    Sakit,
    /// Absent with permission.
    Izin,
    /// Absent without excuse.
    Alfa,
}

impl Status {
    pub const ALL: [Status; 4] = [Status::Hadir, Status::Sakit, Status::Izin, Status::Alfa];

    /// The value stored in the database and written to exports.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Hadir => "HADIR",
            Status::Sakit => "SAKIT",
            Status::Izin => "IZIN",
            Status::Alfa => "ALFA",
        }
    }

    /// The one-letter code used on printed attendance sheets.
    pub fn code(self) -> &'static str {
        match self {
            Status::Hadir => "H",
            Status::Sakit => "S",
            Status::Izin => "I",
            Status::Alfa => "A",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HADIR" | "H" => Ok(Status::Hadir),
            "SAKIT" | "S" => Ok(Status::Sakit),
            "IZIN" | "I" => Ok(Status::Izin),
            "ALFA" | "A" => Ok(Status::Alfa),
            _ => Err(format!(
                "unknown attendance status '{s}', expected one of HADIR, SAKIT, IZIN, ALFA"
            )),
        }
    }
}

impl TryFrom<String> for Status {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl ToSql<Text, Sqlite> for Status {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for Status {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let value = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        value.parse::<Status>().map_err(Into::into)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsExpression, FromSqlRow, Deserialize)]
#[diesel(sql_type = Text)]
#[serde(try_from = "String")]
pub enum Gender {
    M,
    F,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::F => "F",
        }
    }

    /// The label used on reports.
    pub fn label(self) -> &'static str {
        match self {
            Gender::M => "Laki-laki",
            Gender::F => "Perempuan",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "M" | "L" | "LAKI-LAKI" => Ok(Gender::M),
            "F" | "P" | "PEREMPUAN" => Ok(Gender::F),
            _ => Err(format!("unknown gender '{s}', expected M or F")),
        }
    }
}

impl TryFrom<String> for Gender {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl ToSql<Text, Sqlite> for Gender {
    fn to_sql<'b>(&'b self, out: &mut Output<'b, '_, Sqlite>) -> serialize::Result {
        out.set_value(self.as_str());
        Ok(IsNull::No)
    }
}

impl FromSql<Text, Sqlite> for Gender {
    fn from_sql(bytes: <Sqlite as Backend>::RawValue<'_>) -> deserialize::Result<Self> {
        let value = <String as FromSql<Text, Sqlite>>::from_sql(bytes)?;
        value.parse::<Gender>().map_err(Into::into)
    }
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = academic_years)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AcademicYear {
    pub id: i32,
    /// For example `2025/2026`.
    pub name: String,
    pub start_year: i32,
    pub end_year: i32,
    pub is_active: bool,
}

#[derive(Insertable)]
#[diesel(table_name = academic_years)]
pub struct NewAcademicYear<'a> {
    pub name: &'a str,
    pub start_year: i32,
    pub end_year: i32,
}

/// A study program such as MIPA or IPS.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = programs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Program {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub short_name: String,
    pub min_grade_level: i32,
    pub is_active: bool,
}

#[derive(Insertable)]
#[diesel(table_name = programs)]
pub struct NewProgram<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub short_name: &'a str,
    pub min_grade_level: i32,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = class_rooms)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ClassRoom {
    pub id: i32,
    pub name: String,
    pub grade_level: i32,
    pub academic_year_id: i32,
    pub program_id: Option<i32>,
    /// The section label (rombel), e.g. `A`.
    pub section: Option<String>,
}

impl ClassRoom {
    /// Builds the display name of a class out of its grade, program and section, e.g. `10 MIPA A`.
    /// Missing parts are left out.
    pub fn full_name(grade_level: i32, program: Option<&Program>, section: Option<&str>) -> String {
        let mut parts = vec![grade_level.to_string()];

        if let Some(program) = program {
            parts.push(program.short_name.clone());
        }

        if let Some(section) = section.map(str::trim).filter(|s| !s.is_empty()) {
            parts.push(section.to_string());
        }

        parts.join(" ")
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = class_rooms)]
pub struct NewClassRoom {
    pub name: String,
    pub grade_level: i32,
    pub academic_year_id: i32,
    pub program_id: Option<i32>,
    pub section: Option<String>,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = students)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Student {
    pub id: i32,
    pub nis: String,
    pub name: String,
    pub gender: Gender,
    pub class_room_id: i32,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = students)]
pub struct NewStudent {
    pub nis: String,
    pub name: String,
    pub gender: Gender,
    pub class_room_id: i32,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = teachers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Teacher {
    pub id: i32,
    pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = teachers)]
pub struct NewTeacher<'a> {
    pub name: &'a str,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = subjects)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Subject {
    pub id: i32,
    pub code: String,
    pub name: String,
}

#[derive(Insertable)]
#[diesel(table_name = subjects)]
pub struct NewSubject<'a> {
    pub code: &'a str,
    pub name: &'a str,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, Copy, PartialEq)]
#[diesel(table_name = teaching_assignments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TeachingAssignment {
    pub id: i32,
    pub teacher_id: i32,
    pub subject_id: i32,
    pub class_room_id: i32,
}

#[derive(Insertable, Debug, Clone, Copy, PartialEq)]
#[diesel(table_name = teaching_assignments)]
pub struct NewTeachingAssignment {
    pub teacher_id: i32,
    pub subject_id: i32,
    pub class_room_id: i32,
}

#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = schedules)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Schedule {
    pub id: i32,
    pub class_room_id: i32,
    pub subject_id: i32,
    pub teacher_id: i32,
    /// ISO weekday, Monday is 1.
    pub weekday: i32,
    /// `HH:MM-HH:MM`.
    pub time_slot: String,
}

#[derive(Insertable, AsChangeset, Debug, Clone, PartialEq)]
#[diesel(table_name = schedules)]
pub struct NewSchedule {
    pub class_room_id: i32,
    pub subject_id: i32,
    pub teacher_id: i32,
    pub weekday: i32,
    pub time_slot: String,
}

impl NewSchedule {
    pub fn assignment(&self) -> NewTeachingAssignment {
        NewTeachingAssignment {
            teacher_id: self.teacher_id,
            subject_id: self.subject_id,
            class_room_id: self.class_room_id,
        }
    }
}

/// A [`Schedule`] joined with the names of its class and subject.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledLesson {
    pub schedule: Schedule,
    pub class_name: String,
    pub subject_name: String,
}

/// One attendance record: the status of one student for one class-subject-day.
#[derive(Queryable, Selectable, Identifiable, Debug, Clone, PartialEq)]
#[diesel(table_name = attendances)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Attendance {
    pub id: i32,
    pub date: NaiveDate,
    pub class_room_id: i32,
    pub subject_id: i32,
    pub teacher_id: i32,
    pub student_id: i32,
    pub status: Status,
    pub recorded_by: String,
}

#[derive(Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = attendances)]
pub struct NewAttendance {
    pub date: NaiveDate,
    pub class_room_id: i32,
    pub subject_id: i32,
    pub teacher_id: i32,
    pub student_id: i32,
    pub status: Status,
    pub recorded_by: String,
}

/// An [`Attendance`] joined with the names of its subject and teacher.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceDetail {
    pub attendance: Attendance,
    pub subject_name: String,
    pub teacher_name: String,
}
