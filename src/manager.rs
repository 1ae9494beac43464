use crate::error::{Error, Result};
use crate::gateway::{Report, ReportData, ReportGateway, ReportRequest};
use crate::models::{
    AcademicYear, Attendance, ClassRoom, Gender, NewAcademicYear, NewAttendance, NewClassRoom,
    NewProgram, NewSchedule, NewStudent, NewSubject, NewTeacher, NewTeachingAssignment, Program,
    Schedule, ScheduledLesson, Status, Student, Subject, Teacher, TeachingAssignment,
};
use crate::schema;
use crate::settings::Settings;
use crate::store::AttendanceStore;
use chrono::{NaiveDate, NaiveTime};
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::io::Read;
use tracing::{debug, info, warn};

/// The schema, applied by [`AttendanceManager::migrate`].
const SCHEMA: &str = include_str!("../migrations/2025-11-08-000000_create_school/up.sql");

/// A teacher may teach at most this many distinct subjects, across all classes.
pub const MAX_SUBJECTS_PER_TEACHER: usize = 3;

/// The manager for recording, correcting and reporting attendance, and for the school data the
/// attendance refers to.
pub struct AttendanceManager {
    db: SqliteConnection,
}

/// The fields needed to open a class.
#[derive(Debug, Clone, Default)]
pub struct ClassRoomForm {
    pub grade_level: i32,
    pub academic_year_id: i32,
    pub program_id: Option<i32>,
    pub section: Option<String>,
    /// Derived from grade, program and section when left empty.
    pub name: Option<String>,
}

/// One row of a student roster file: `nis,name,gender`.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentRow {
    pub nis: String,
    pub name: String,
    pub gender: Gender,
}

/// One row of an attendance file: `nis,status`.
#[derive(Debug, Clone, Deserialize)]
struct AttendanceRow {
    nis: String,
    status: Status,
}

#[derive(Debug, Default, PartialEq)]
pub struct ImportSummary {
    pub inserted: usize,
    /// One message per skipped row.
    pub skipped: Vec<String>,
}

#[derive(Debug, Default, PartialEq)]
pub struct RosterDiff {
    pub added: Vec<Student>,
    pub dropped: Vec<Student>,
}

/// The attendance of a whole class for one subject on one day, recorded in one go.
#[derive(Debug, Clone)]
pub struct AttendanceSession {
    pub date: NaiveDate,
    pub class_room_id: i32,
    pub subject_id: i32,
    pub teacher_id: i32,
    pub recorded_by: String,
    /// `(student id, status)` pairs.
    pub entries: Vec<(i32, Status)>,
}

/// Reads CSV rows, collecting the ones that fail to parse as skip messages.
///
/// Failing to read the input at all is an error, so a truncated file is never taken for a short
/// one.
fn read_rows<T, R>(reader: R, skipped: &mut Vec<String>) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = vec![];

    for (i, result) in rdr.deserialize::<T>().enumerate() {
        match result {
            Ok(row) => rows.push(row),
            Err(err) if matches!(err.kind(), csv::ErrorKind::Io(_)) => return Err(err.into()),
            // Line 1 is the header.
            Err(err) => skipped.push(format!("line {}: {err}", i + 2)),
        }
    }

    Ok(rows)
}

/// Checks a `HH:MM-HH:MM` time slot whose start comes before its end.
pub fn validate_time_slot(slot: &str) -> Result<()> {
    let invalid = || Error::validation(format!("time slot '{slot}' must look like 07:00-08:30"));

    let (start, end) = slot.split_once('-').ok_or_else(invalid)?;
    let start = NaiveTime::parse_from_str(start.trim(), "%H:%M").map_err(|_| invalid())?;
    let end = NaiveTime::parse_from_str(end.trim(), "%H:%M").map_err(|_| invalid())?;

    if start >= end {
        return Err(Error::validation(format!(
            "time slot '{slot}' must start before it ends"
        )));
    }

    Ok(())
}

fn validate_weekday(weekday: i32) -> Result<()> {
    if !(1..=7).contains(&weekday) {
        return Err(Error::validation(format!(
            "weekday must be between 1 (Monday) and 7 (Sunday), got {weekday}"
        )));
    }

    Ok(())
}

fn validate_schedule(schedule: &NewSchedule) -> Result<()> {
    validate_weekday(schedule.weekday)?;
    validate_time_slot(&schedule.time_slot)
}

/// Returns the assignment for the triple, creating it if the teacher still has room for another
/// subject. Runs on the caller's connection so it can join the caller's transaction.
fn ensure_assignment_in(
    conn: &mut SqliteConnection,
    assignment: NewTeachingAssignment,
) -> Result<TeachingAssignment> {
    use schema::teaching_assignments::dsl::*;

    let existing = teaching_assignments
        .filter(teacher_id.eq(assignment.teacher_id))
        .filter(subject_id.eq(assignment.subject_id))
        .filter(class_room_id.eq(assignment.class_room_id))
        .select(TeachingAssignment::as_select())
        .first(conn)
        .optional()?;

    if let Some(existing) = existing {
        return Ok(existing);
    }

    let taught: Vec<i32> = teaching_assignments
        .filter(teacher_id.eq(assignment.teacher_id))
        .select(subject_id)
        .distinct()
        .load(conn)?;

    if !taught.contains(&assignment.subject_id) && taught.len() >= MAX_SUBJECTS_PER_TEACHER {
        return Err(Error::conflict(format!(
            "teacher {} already teaches {} subjects, the maximum is {MAX_SUBJECTS_PER_TEACHER}",
            assignment.teacher_id,
            taught.len()
        )));
    }

    let created = diesel::insert_into(teaching_assignments)
        .values(assignment)
        .returning(TeachingAssignment::as_returning())
        .get_result(conn)?;

    debug!(
        teacher_id = created.teacher_id,
        subject_id = created.subject_id,
        class_room_id = created.class_room_id,
        "created teaching assignment"
    );

    Ok(created)
}

impl AttendanceManager {
    /// Connects to the database named by the configuration, see [`Settings`].
    pub fn connect() -> Result<Self> {
        let settings = Settings::load()?;
        Self::open(&settings.database_url)
    }

    /// Opens the SQLite database at `database_url` with foreign keys enforced.
    pub fn open(database_url: &str) -> Result<Self> {
        let mut db = SqliteConnection::establish(database_url)?;
        db.batch_execute("PRAGMA foreign_keys = ON;")?;

        debug!(database_url, "connected");

        Ok(Self { db })
    }

    /// A fresh in-memory database with the schema applied.
    pub fn in_memory() -> Result<Self> {
        let mut manager = Self::open(":memory:")?;
        manager.migrate()?;
        Ok(manager)
    }

    /// Creates every table that does not exist yet.
    pub fn migrate(&mut self) -> Result<()> {
        self.db.batch_execute(SCHEMA)?;
        info!("database schema is up to date");
        Ok(())
    }

    pub fn create_academic_year(
        &mut self,
        name: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<AcademicYear> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("an academic year needs a name"));
        }

        if end_year != start_year + 1 {
            return Err(Error::validation(format!(
                "academic year {name} must end the year after it starts ({start_year}/{end_year})"
            )));
        }

        let year = diesel::insert_into(schema::academic_years::table)
            .values(NewAcademicYear {
                name,
                start_year,
                end_year,
            })
            .returning(AcademicYear::as_returning())
            .get_result(&mut self.db)?;

        Ok(year)
    }

    /// Makes `name` the only active academic year.
    pub fn activate_academic_year(&mut self, name: &str) -> Result<AcademicYear> {
        use schema::academic_years::dsl;

        self.db.immediate_transaction::<_, Error, _>(|conn| {
            diesel::update(dsl::academic_years)
                .set(dsl::is_active.eq(false))
                .execute(conn)?;

            let activated = diesel::update(dsl::academic_years.filter(dsl::name.eq(name)))
                .set(dsl::is_active.eq(true))
                .returning(AcademicYear::as_returning())
                .get_result(conn)
                .optional()?;

            // Rolling back also restores the previously active year.
            activated.ok_or_else(|| Error::not_found(format!("academic year {name}")))
        })
    }

    pub fn active_academic_year(&mut self) -> Result<Option<AcademicYear>> {
        use schema::academic_years::dsl::*;

        Ok(academic_years
            .filter(is_active.eq(true))
            .select(AcademicYear::as_select())
            .first(&mut self.db)
            .optional()?)
    }

    /// All academic years, latest first.
    pub fn academic_years(&mut self) -> Result<Vec<AcademicYear>> {
        use schema::academic_years::dsl::*;

        Ok(academic_years
            .order(start_year.desc())
            .select(AcademicYear::as_select())
            .load(&mut self.db)?)
    }

    pub fn create_program(
        &mut self,
        code: &str,
        name: &str,
        short_name: &str,
        min_grade_level: i32,
    ) -> Result<Program> {
        Ok(diesel::insert_into(schema::programs::table)
            .values(NewProgram {
                code,
                name,
                short_name,
                min_grade_level,
            })
            .returning(Program::as_returning())
            .get_result(&mut self.db)?)
    }

    pub fn programs(&mut self) -> Result<Vec<Program>> {
        use schema::programs::dsl::*;

        Ok(programs
            .order(code.asc())
            .select(Program::as_select())
            .load(&mut self.db)?)
    }

    /// Removes a program together with its classes and everything recorded for them.
    pub fn delete_program(&mut self, program_id: i32) -> Result<Program> {
        let program = diesel::delete(schema::programs::table.find(program_id))
            .returning(Program::as_returning())
            .get_result(&mut self.db)
            .optional()?
            .ok_or_else(|| Error::not_found(format!("program {program_id}")))?;

        info!(program_id, code = %program.code, "deleted program and its classes");

        Ok(program)
    }

    pub fn create_subject(&mut self, code: &str, name: &str) -> Result<Subject> {
        Ok(diesel::insert_into(schema::subjects::table)
            .values(NewSubject { code, name })
            .returning(Subject::as_returning())
            .get_result(&mut self.db)?)
    }

    pub fn subjects(&mut self) -> Result<Vec<Subject>> {
        use schema::subjects::dsl::*;

        Ok(subjects
            .order(name.asc())
            .select(Subject::as_select())
            .load(&mut self.db)?)
    }

    pub fn create_teacher(&mut self, name: &str) -> Result<Teacher> {
        Ok(diesel::insert_into(schema::teachers::table)
            .values(NewTeacher { name })
            .returning(Teacher::as_returning())
            .get_result(&mut self.db)?)
    }

    pub fn teachers(&mut self) -> Result<Vec<Teacher>> {
        use schema::teachers::dsl::*;

        Ok(teachers
            .order(name.asc())
            .select(Teacher::as_select())
            .load(&mut self.db)?)
    }

    /// Opens a class for grade 10, 11 or 12 in an existing academic year.
    pub fn create_class_room(&mut self, form: ClassRoomForm) -> Result<ClassRoom> {
        if !(10..=12).contains(&form.grade_level) {
            return Err(Error::validation(format!(
                "grade level must be 10, 11 or 12, got {}",
                form.grade_level
            )));
        }

        self.db.immediate_transaction::<_, Error, _>(|conn| {
            let year_exists = diesel::select(diesel::dsl::exists(
                schema::academic_years::table.find(form.academic_year_id),
            ))
            .get_result::<bool>(conn)?;
            if !year_exists {
                return Err(Error::not_found(format!(
                    "academic year {}",
                    form.academic_year_id
                )));
            }

            let program = match form.program_id {
                Some(id) => Some(
                    schema::programs::table
                        .find(id)
                        .select(Program::as_select())
                        .first(conn)
                        .optional()?
                        .ok_or_else(|| Error::not_found(format!("program {id}")))?,
                ),
                None => None,
            };

            let name = form
                .name
                .as_deref()
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| {
                    ClassRoom::full_name(form.grade_level, program.as_ref(), form.section.as_deref())
                });

            let class = diesel::insert_into(schema::class_rooms::table)
                .values(NewClassRoom {
                    name,
                    grade_level: form.grade_level,
                    academic_year_id: form.academic_year_id,
                    program_id: form.program_id,
                    section: form.section.clone(),
                })
                .returning(ClassRoom::as_returning())
                .get_result(conn)?;

            info!(class_id = class.id, name = %class.name, "created class");

            Ok(class)
        })
    }

    pub fn class_rooms(&mut self) -> Result<Vec<ClassRoom>> {
        use schema::class_rooms::dsl::*;

        Ok(class_rooms
            .order((grade_level.asc(), name.asc()))
            .select(ClassRoom::as_select())
            .load(&mut self.db)?)
    }

    /// Inserts students, returning how many were written.
    pub fn insert_students(&mut self, new_students: &[NewStudent]) -> Result<usize> {
        let inserted = diesel::insert_into(schema::students::table)
            .values(new_students)
            .execute(&mut self.db)?;

        Ok(inserted)
    }

    /// Adds the students of a `nis,name,gender` CSV file to a class.
    ///
    /// Rows that do not parse, or whose NIS is already registered, are skipped and reported.
    pub fn import_students<R: Read>(&mut self, class_id: i32, reader: R) -> Result<ImportSummary> {
        let mut summary = ImportSummary::default();
        let rows: Vec<StudentRow> = read_rows(reader, &mut summary.skipped)?;

        self.db.immediate_transaction::<_, Error, _>(|conn| {
            if conn.find_class_room(class_id)?.is_none() {
                return Err(Error::not_found(format!("class {class_id}")));
            }

            let mut known: HashSet<String> = schema::students::table
                .select(schema::students::nis)
                .load::<String>(conn)?
                .into_iter()
                .collect();

            let mut new_students = vec![];
            for row in rows {
                if !known.insert(row.nis.clone()) {
                    summary
                        .skipped
                        .push(format!("{}: NIS {} is already registered", row.name, row.nis));
                    continue;
                }

                new_students.push(NewStudent {
                    nis: row.nis,
                    name: row.name,
                    gender: row.gender,
                    class_room_id: class_id,
                });
            }

            if !new_students.is_empty() {
                summary.inserted = diesel::insert_into(schema::students::table)
                    .values(&new_students)
                    .execute(conn)?;
            }

            Ok(())
        })?;

        info!(
            class_id,
            inserted = summary.inserted,
            skipped = summary.skipped.len(),
            "imported students"
        );

        Ok(summary)
    }

    /// Makes the roster of a class match a `nis,name,gender` CSV file: students missing from the
    /// file are removed (with their attendance), new NIS values are added.
    pub fn sync_class_roster<R: Read>(&mut self, class_id: i32, reader: R) -> Result<RosterDiff> {
        let mut unreadable = vec![];
        let rows: Vec<StudentRow> = read_rows(reader, &mut unreadable)?;
        if let Some(first) = unreadable.first() {
            // A partially read file would drop students that are merely unreadable.
            return Err(Error::validation(format!("roster file is malformed, {first}")));
        }

        self.db.immediate_transaction::<_, Error, _>(|conn| {
            if conn.find_class_room(class_id)?.is_none() {
                return Err(Error::not_found(format!("class {class_id}")));
            }

            let current = conn.class_roster(class_id)?;
            let wanted: HashSet<&str> = rows.iter().map(|row| row.nis.as_str()).collect();
            let present: HashSet<&str> = current.iter().map(|s| s.nis.as_str()).collect();

            let dropped: Vec<Student> = current
                .iter()
                .filter(|student| !wanted.contains(student.nis.as_str()))
                .cloned()
                .collect();

            for student in &dropped {
                diesel::delete(schema::students::table.find(student.id)).execute(conn)?;
            }

            let added: Vec<NewStudent> = rows
                .iter()
                .filter(|row| !present.contains(row.nis.as_str()))
                .map(|row| NewStudent {
                    nis: row.nis.clone(),
                    name: row.name.clone(),
                    gender: row.gender,
                    class_room_id: class_id,
                })
                .collect();

            let added = if added.is_empty() {
                vec![]
            } else {
                diesel::insert_into(schema::students::table)
                    .values(&added)
                    .returning(Student::as_returning())
                    .get_results(conn)?
            };

            Ok(RosterDiff { added, dropped })
        })
    }

    pub fn class_roster(&mut self, class_id: i32) -> Result<Vec<Student>> {
        Ok(self.db.class_roster(class_id)?)
    }

    pub fn find_student(&mut self, nis: &str) -> Result<Option<Student>> {
        use schema::students::dsl;

        Ok(dsl::students
            .filter(dsl::nis.eq(nis))
            .select(Student::as_select())
            .first(&mut self.db)
            .optional()?)
    }

    /// Removes and returns a student. Their attendance goes with them.
    pub fn delete_student(&mut self, nis: &str) -> Result<Student> {
        use schema::students::dsl;

        diesel::delete(dsl::students.filter(dsl::nis.eq(nis)))
            .returning(Student::as_returning())
            .get_result(&mut self.db)
            .optional()?
            .ok_or_else(|| Error::not_found(format!("student with NIS {nis}")))
    }

    /// Assigns a teacher to teach a subject in a class, unless the assignment already exists.
    ///
    /// Fails with [`Error::Conflict`] if this would give the teacher more than
    /// [`MAX_SUBJECTS_PER_TEACHER`] distinct subjects.
    pub fn ensure_assignment(
        &mut self,
        assignment: NewTeachingAssignment,
    ) -> Result<TeachingAssignment> {
        self.db
            .immediate_transaction::<_, Error, _>(|conn| ensure_assignment_in(conn, assignment))
    }

    pub fn teacher_assignments(&mut self, teacher: i32) -> Result<Vec<TeachingAssignment>> {
        use schema::teaching_assignments::dsl::*;

        Ok(teaching_assignments
            .filter(teacher_id.eq(teacher))
            .order(id.asc())
            .select(TeachingAssignment::as_select())
            .load(&mut self.db)?)
    }

    /// Creates a schedule entry together with the teaching assignment it implies.
    pub fn create_schedule(&mut self, schedule: NewSchedule) -> Result<Schedule> {
        validate_schedule(&schedule)?;

        self.db.immediate_transaction::<_, Error, _>(|conn| {
            ensure_assignment_in(conn, schedule.assignment())?;

            Ok(diesel::insert_into(schema::schedules::table)
                .values(&schedule)
                .returning(Schedule::as_returning())
                .get_result(conn)?)
        })
    }

    /// Rewrites a schedule entry, creating the teaching assignment for its new triple if needed.
    pub fn update_schedule(&mut self, schedule_id: i32, schedule: NewSchedule) -> Result<Schedule> {
        validate_schedule(&schedule)?;

        self.db.immediate_transaction::<_, Error, _>(|conn| {
            ensure_assignment_in(conn, schedule.assignment())?;

            diesel::update(schema::schedules::table.find(schedule_id))
                .set(&schedule)
                .returning(Schedule::as_returning())
                .get_result(conn)
                .optional()?
                .ok_or_else(|| Error::not_found(format!("schedule {schedule_id}")))
        })
    }

    /// The schedule of a class ordered by weekday and time.
    pub fn class_schedule(&mut self, class_id: i32) -> Result<Vec<Schedule>> {
        use schema::schedules::dsl::*;

        Ok(schedules
            .filter(class_room_id.eq(class_id))
            .order((weekday.asc(), time_slot.asc()))
            .select(Schedule::as_select())
            .load(&mut self.db)?)
    }

    /// The lessons a teacher gives on one ISO weekday, earliest first.
    pub fn teacher_schedule(
        &mut self,
        teacher: i32,
        weekday: i32,
    ) -> Result<Vec<ScheduledLesson>> {
        use schema::{class_rooms, schedules, subjects};

        validate_weekday(weekday)?;

        let rows = schedules::table
            .inner_join(class_rooms::table)
            .inner_join(subjects::table)
            .filter(schedules::teacher_id.eq(teacher))
            .filter(schedules::weekday.eq(weekday))
            .order((schedules::time_slot.asc(), schedules::id.asc()))
            .select((Schedule::as_select(), class_rooms::name, subjects::name))
            .load::<(Schedule, String, String)>(&mut self.db)?;

        Ok(rows
            .into_iter()
            .map(|(schedule, class_name, subject_name)| ScheduledLesson {
                schedule,
                class_name,
                subject_name,
            })
            .collect())
    }

    /// Records the attendance of one class-subject-day.
    ///
    /// A session can only be recorded once; later changes go through
    /// [`correct_attendance`](Self::correct_attendance). Every entry must name a distinct student of
    /// the class. Returns the number of records written.
    pub fn record_attendance(&mut self, session: &AttendanceSession) -> Result<usize> {
        if session.entries.is_empty() {
            return Err(Error::validation("an attendance session needs at least one student"));
        }

        if session.recorded_by.trim().is_empty() {
            return Err(Error::validation("an attendance session needs a recorder"));
        }

        let mut seen = HashSet::new();
        if let Some((student, _)) = session.entries.iter().find(|(id, _)| !seen.insert(*id)) {
            return Err(Error::validation(format!(
                "student {student} appears twice in the session"
            )));
        }

        self.db.immediate_transaction::<_, Error, _>(|conn| {
            use schema::attendances::dsl;

            let already_recorded = diesel::select(diesel::dsl::exists(
                dsl::attendances
                    .filter(dsl::date.eq(session.date))
                    .filter(dsl::class_room_id.eq(session.class_room_id))
                    .filter(dsl::subject_id.eq(session.subject_id)),
            ))
            .get_result::<bool>(conn)?;

            if already_recorded {
                return Err(Error::conflict(format!(
                    "attendance for class {} subject {} on {} is already recorded",
                    session.class_room_id, session.subject_id, session.date
                )));
            }

            let roster: HashSet<i32> = schema::students::table
                .filter(schema::students::class_room_id.eq(session.class_room_id))
                .select(schema::students::id)
                .load::<i32>(conn)?
                .into_iter()
                .collect();

            if let Some((student, _)) = session.entries.iter().find(|(id, _)| !roster.contains(id)) {
                return Err(Error::validation(format!(
                    "student {student} is not in class {}",
                    session.class_room_id
                )));
            }

            let records: Vec<NewAttendance> = session
                .entries
                .iter()
                .map(|&(student_id, status)| NewAttendance {
                    date: session.date,
                    class_room_id: session.class_room_id,
                    subject_id: session.subject_id,
                    teacher_id: session.teacher_id,
                    student_id,
                    status,
                    recorded_by: session.recorded_by.clone(),
                })
                .collect();

            let inserted = diesel::insert_into(dsl::attendances)
                .values(&records)
                .execute(conn)?;

            info!(
                class_id = session.class_room_id,
                subject_id = session.subject_id,
                date = %session.date,
                inserted,
                "recorded attendance"
            );

            Ok(inserted)
        })
    }

    /// Builds session entries for a class from an `nis,status` CSV file.
    ///
    /// Unknown NIS values are logged and ignored. Students of the class missing from the file get
    /// `default_status`, or are left out when it is `None`.
    pub fn read_session_entries<R: Read>(
        &mut self,
        class_id: i32,
        reader: R,
        default_status: Option<Status>,
    ) -> Result<Vec<(i32, Status)>> {
        let mut unreadable = vec![];
        let rows: Vec<AttendanceRow> = read_rows(reader, &mut unreadable)?;
        if let Some(first) = unreadable.first() {
            return Err(Error::validation(format!("attendance file is malformed, {first}")));
        }

        let roster = self.db.class_roster(class_id)?;
        let by_nis: HashMap<&str, i32> = roster.iter().map(|s| (s.nis.as_str(), s.id)).collect();

        let mut marked: HashMap<i32, Status> = HashMap::new();
        for row in rows {
            match by_nis.get(row.nis.as_str()) {
                Some(&id) => {
                    marked.insert(id, row.status);
                }
                None => warn!(nis = %row.nis, status = %row.status, "tried to mark an unknown student"),
            }
        }

        Ok(roster
            .iter()
            .filter_map(|student| {
                marked
                    .get(&student.id)
                    .copied()
                    .or(default_status)
                    .map(|status| (student.id, status))
            })
            .collect())
    }

    /// The records of one class-subject-day, oldest first.
    pub fn attendance_session(
        &mut self,
        date: NaiveDate,
        class_id: i32,
        subject: i32,
    ) -> Result<Vec<Attendance>> {
        use schema::attendances::dsl;

        Ok(dsl::attendances
            .filter(dsl::date.eq(date))
            .filter(dsl::class_room_id.eq(class_id))
            .filter(dsl::subject_id.eq(subject))
            .order(dsl::id.asc())
            .select(Attendance::as_select())
            .load(&mut self.db)?)
    }

    /// Changes the status of one existing record.
    pub fn correct_attendance(
        &mut self,
        date: NaiveDate,
        class_id: i32,
        subject: i32,
        student: i32,
        status: Status,
    ) -> Result<Attendance> {
        use schema::attendances::dsl;

        let corrected = diesel::update(
            dsl::attendances
                .filter(dsl::date.eq(date))
                .filter(dsl::class_room_id.eq(class_id))
                .filter(dsl::subject_id.eq(subject))
                .filter(dsl::student_id.eq(student)),
        )
        .set(dsl::status.eq(status))
        .returning(Attendance::as_returning())
        .get_result(&mut self.db)
        .optional()?
        .ok_or_else(|| {
            Error::not_found(format!(
                "attendance of student {student} in class {class_id} subject {subject} on {date}"
            ))
        })?;

        info!(
            attendance_id = corrected.id,
            status = %corrected.status,
            "corrected attendance"
        );

        Ok(corrected)
    }

    /// Reads everything a report needs inside one transaction, so the report sees a single
    /// snapshot even while attendance is being recorded.
    pub fn report_data(&mut self, request: &ReportRequest) -> Result<ReportData> {
        self.db
            .transaction::<_, Error, _>(|conn| ReportGateway::new(conn).collect(request))
    }

    /// Like [`report_data`](Self::report_data), rendered to CSV.
    pub fn generate_report(&mut self, request: &ReportRequest) -> Result<Report> {
        self.db
            .transaction::<_, Error, _>(|conn| ReportGateway::new(conn).generate(request))
    }
}
