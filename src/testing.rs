//! An in-memory [`AttendanceStore`] for unit tests.

use crate::models::{
    AcademicYear, Attendance, AttendanceDetail, ClassRoom, Gender, Program, Status, Student,
    Teacher, TeachingAssignment,
};
use crate::store::AttendanceStore;
use chrono::NaiveDate;
use diesel::result::QueryResult;

#[derive(Default)]
pub struct MemoryStore {
    pub years: Vec<AcademicYear>,
    pub classes: Vec<ClassRoom>,
    pub students: Vec<Student>,
    pub records: Vec<AttendanceDetail>,
    pub programs: Vec<Program>,
    pub teachers: Vec<Teacher>,
    pub assignments: Vec<TeachingAssignment>,
    /// Number of lookups served so far.
    pub queries: usize,
}

impl MemoryStore {
    pub fn add_year(&mut self, name: &str, start_year: i32, end_year: i32) {
        self.years.push(AcademicYear {
            id: self.years.len() as i32 + 1,
            name: name.to_string(),
            start_year,
            end_year,
            is_active: self.years.is_empty(),
        });
    }

    pub fn add_class(&mut self, id: i32, name: &str) {
        self.classes.push(ClassRoom {
            id,
            name: name.to_string(),
            grade_level: 10,
            academic_year_id: 1,
            program_id: None,
            section: None,
        });
    }

    pub fn add_student(&mut self, id: i32, nis: &str, name: &str, gender: Gender, class_id: i32) {
        self.students.push(Student {
            id,
            nis: nis.to_string(),
            name: name.to_string(),
            gender,
            class_room_id: class_id,
        });
    }

    pub fn add_program(&mut self, id: i32, short_name: &str) {
        self.programs.push(Program {
            id,
            code: short_name.to_string(),
            name: short_name.to_string(),
            short_name: short_name.to_string(),
            min_grade_level: 10,
            is_active: true,
        });
    }

    pub fn add_teacher(&mut self, id: i32, name: &str) {
        self.teachers.push(Teacher {
            id,
            name: name.to_string(),
        });
    }

    pub fn assign(&mut self, teacher_id: i32, subject_id: i32, class_id: i32) {
        self.assignments.push(TeachingAssignment {
            id: self.assignments.len() as i32 + 1,
            teacher_id,
            subject_id,
            class_room_id: class_id,
        });
    }

    /// Records one status for a student of class 1, subject 1.
    pub fn add_attendance(&mut self, student_id: i32, date: NaiveDate, status: Status) {
        self.add_lesson_attendance(student_id, date, 1, 1, status);
    }

    /// Records one status for a student of class 1, taken by `teacher_id` in `subject_id`.
    pub fn add_lesson_attendance(
        &mut self,
        student_id: i32,
        date: NaiveDate,
        subject_id: i32,
        teacher_id: i32,
        status: Status,
    ) {
        self.records.push(AttendanceDetail {
            attendance: Attendance {
                id: self.records.len() as i32 + 1,
                date,
                class_room_id: 1,
                subject_id,
                teacher_id,
                student_id,
                status,
                recorded_by: "guru".to_string(),
            },
            subject_name: "Matematika".to_string(),
            teacher_name: "Bu Sari".to_string(),
        });
    }
}

impl AttendanceStore for MemoryStore {
    fn find_class_room(&mut self, class_id: i32) -> QueryResult<Option<ClassRoom>> {
        self.queries += 1;
        Ok(self.classes.iter().find(|c| c.id == class_id).cloned())
    }

    fn find_academic_year(&mut self, name: &str) -> QueryResult<Option<AcademicYear>> {
        self.queries += 1;
        Ok(self.years.iter().find(|y| y.name == name).cloned())
    }

    fn find_academic_year_by_id(&mut self, year_id: i32) -> QueryResult<Option<AcademicYear>> {
        self.queries += 1;
        Ok(self.years.iter().find(|y| y.id == year_id).cloned())
    }

    fn find_program(&mut self, program_id: i32) -> QueryResult<Option<Program>> {
        self.queries += 1;
        Ok(self.programs.iter().find(|p| p.id == program_id).cloned())
    }

    fn find_teacher(&mut self, teacher_id: i32) -> QueryResult<Option<Teacher>> {
        self.queries += 1;
        Ok(self.teachers.iter().find(|t| t.id == teacher_id).cloned())
    }

    fn teaches_class(&mut self, teacher_id: i32, class_id: i32) -> QueryResult<bool> {
        self.queries += 1;
        Ok(self
            .assignments
            .iter()
            .any(|a| a.teacher_id == teacher_id && a.class_room_id == class_id))
    }

    fn class_roster(&mut self, class_id: i32) -> QueryResult<Vec<Student>> {
        self.queries += 1;
        let mut roster: Vec<Student> = self
            .students
            .iter()
            .filter(|s| s.class_room_id == class_id)
            .cloned()
            .collect();
        roster.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.nis.cmp(&b.nis)));
        Ok(roster)
    }

    fn attendance_between(
        &mut self,
        class_id: i32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> QueryResult<Vec<Attendance>> {
        self.queries += 1;
        Ok(self
            .records
            .iter()
            .map(|d| &d.attendance)
            .filter(|a| a.class_room_id == class_id && start <= a.date && a.date <= end)
            .cloned()
            .collect())
    }

    fn attendance_on(
        &mut self,
        class_id: i32,
        date: NaiveDate,
    ) -> QueryResult<Vec<AttendanceDetail>> {
        self.queries += 1;
        Ok(self
            .records
            .iter()
            .filter(|d| d.attendance.class_room_id == class_id && d.attendance.date == date)
            .cloned()
            .collect())
    }

    fn attendance_by_teacher(
        &mut self,
        class_id: i32,
        teacher_id: i32,
    ) -> QueryResult<Vec<Attendance>> {
        self.queries += 1;
        let mut records: Vec<Attendance> = self
            .records
            .iter()
            .map(|d| &d.attendance)
            .filter(|a| a.class_room_id == class_id && a.teacher_id == teacher_id)
            .cloned()
            .collect();
        records.sort_by_key(|a| (a.date, a.id));
        Ok(records)
    }
}
