//! The read side of the database that report generation depends on.

use crate::models::{
    AcademicYear, Attendance, AttendanceDetail, ClassRoom, Program, Student, Teacher,
};
use crate::schema::{
    academic_years, attendances, class_rooms, programs, students, subjects, teachers,
    teaching_assignments,
};
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::result::QueryResult;

/// Lookups used by [`ReportGateway`](crate::gateway::ReportGateway).
///
/// Every method is a single query. Implemented for [`SqliteConnection`] so that a connection
/// borrowed inside a transaction can be handed to the gateway directly.
pub trait AttendanceStore {
    fn find_class_room(&mut self, class_id: i32) -> QueryResult<Option<ClassRoom>>;

    fn find_academic_year(&mut self, name: &str) -> QueryResult<Option<AcademicYear>>;

    fn find_academic_year_by_id(&mut self, year_id: i32) -> QueryResult<Option<AcademicYear>>;

    fn find_program(&mut self, program_id: i32) -> QueryResult<Option<Program>>;

    fn find_teacher(&mut self, teacher_id: i32) -> QueryResult<Option<Teacher>>;

    /// Whether the teacher holds any teaching assignment in the class.
    fn teaches_class(&mut self, teacher_id: i32, class_id: i32) -> QueryResult<bool>;

    /// The students of a class ordered by name, then NIS.
    fn class_roster(&mut self, class_id: i32) -> QueryResult<Vec<Student>>;

    /// All attendance records of a class with `start <= date <= end`.
    fn attendance_between(
        &mut self,
        class_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> QueryResult<Vec<Attendance>>;

    /// All attendance records of a class on one date, oldest record first.
    fn attendance_on(&mut self, class_id: i32, date: NaiveDate)
    -> QueryResult<Vec<AttendanceDetail>>;

    /// All attendance records a teacher took in a class, ordered by date, then record.
    fn attendance_by_teacher(&mut self, class_id: i32, teacher_id: i32)
    -> QueryResult<Vec<Attendance>>;
}

impl AttendanceStore for SqliteConnection {
    fn find_class_room(&mut self, class_id: i32) -> QueryResult<Option<ClassRoom>> {
        class_rooms::table
            .find(class_id)
            .select(ClassRoom::as_select())
            .first(self)
            .optional()
    }

    fn find_academic_year(&mut self, name: &str) -> QueryResult<Option<AcademicYear>> {
        academic_years::table
            .filter(academic_years::name.eq(name))
            .select(AcademicYear::as_select())
            .first(self)
            .optional()
    }

    fn find_academic_year_by_id(&mut self, year_id: i32) -> QueryResult<Option<AcademicYear>> {
        academic_years::table
            .find(year_id)
            .select(AcademicYear::as_select())
            .first(self)
            .optional()
    }

    fn find_program(&mut self, program_id: i32) -> QueryResult<Option<Program>> {
        programs::table
            .find(program_id)
            .select(Program::as_select())
            .first(self)
            .optional()
    }

    fn find_teacher(&mut self, teacher_id: i32) -> QueryResult<Option<Teacher>> {
        teachers::table
            .find(teacher_id)
            .select(Teacher::as_select())
            .first(self)
            .optional()
    }

    fn teaches_class(&mut self, teacher_id: i32, class_id: i32) -> QueryResult<bool> {
        diesel::select(diesel::dsl::exists(
            teaching_assignments::table
                .filter(teaching_assignments::teacher_id.eq(teacher_id))
                .filter(teaching_assignments::class_room_id.eq(class_id)),
        ))
        .get_result(self)
    }

    fn class_roster(&mut self, class_id: i32) -> QueryResult<Vec<Student>> {
        students::table
            .filter(students::class_room_id.eq(class_id))
            .order((students::name.asc(), students::nis.asc()))
            .select(Student::as_select())
            .load(self)
    }

    fn attendance_between(
        &mut self,
        class_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> QueryResult<Vec<Attendance>> {
        attendances::table
            .filter(attendances::class_room_id.eq(class_id))
            .filter(attendances::date.between(start, end))
            .order(attendances::id.asc())
            .select(Attendance::as_select())
            .load(self)
    }

    fn attendance_on(
        &mut self,
        class_id: i32,
        date: NaiveDate,
    ) -> QueryResult<Vec<AttendanceDetail>> {
        let rows = attendances::table
            .inner_join(subjects::table)
            .inner_join(teachers::table)
            .filter(attendances::class_room_id.eq(class_id))
            .filter(attendances::date.eq(date))
            .order(attendances::id.asc())
            .select((Attendance::as_select(), subjects::name, teachers::name))
            .load::<(Attendance, String, String)>(self)?;

        Ok(rows
            .into_iter()
            .map(|(attendance, subject_name, teacher_name)| AttendanceDetail {
                attendance,
                subject_name,
                teacher_name,
            })
            .collect())
    }

    fn attendance_by_teacher(
        &mut self,
        class_id: i32,
        teacher_id: i32,
    ) -> QueryResult<Vec<Attendance>> {
        attendances::table
            .filter(attendances::class_room_id.eq(class_id))
            .filter(attendances::teacher_id.eq(teacher_id))
            .order((attendances::date.asc(), attendances::id.asc()))
            .select(Attendance::as_select())
            .load(self)
    }
}
