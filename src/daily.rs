//! The attendance sheet of one class on one day.

use crate::models::{AttendanceDetail, Gender, Status, Student};
use std::collections::HashMap;

/// One line of the daily sheet. The attendance fields are `None` when nothing was recorded for the
/// student on that day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyRow {
    pub student_id: i32,
    pub nis: String,
    pub name: String,
    pub gender: Gender,
    pub status: Option<Status>,
    pub subject_name: Option<String>,
    pub teacher_name: Option<String>,
}

/// Joins the roster with the attendance recorded for the class on one date.
///
/// A class can be taught several subjects on the same day. `subject_id` narrows the sheet to one of
/// them; without it the most recently recorded entry of each student wins. Records of students
/// not on the roster are ignored. Rows keep roster order.
pub fn build_daily_sheet(
    roster: &[Student],
    records: &[AttendanceDetail],
    subject_id: Option<i32>,
) -> Vec<DailyRow> {
    let mut latest: HashMap<i32, &AttendanceDetail> = HashMap::new();

    for detail in records {
        let attendance = &detail.attendance;
        if subject_id.is_some_and(|id| id != attendance.subject_id) {
            continue;
        }

        latest
            .entry(attendance.student_id)
            .and_modify(|current| {
                if attendance.id > current.attendance.id {
                    *current = detail;
                }
            })
            .or_insert(detail);
    }

    roster
        .iter()
        .map(|student| {
            let detail = latest.get(&student.id);
            DailyRow {
                student_id: student.id,
                nis: student.nis.clone(),
                name: student.name.clone(),
                gender: student.gender,
                status: detail.map(|d| d.attendance.status),
                subject_name: detail.map(|d| d.subject_name.clone()),
                teacher_name: detail.map(|d| d.teacher_name.clone()),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Attendance;
    use chrono::NaiveDate;

    fn student(id: i32, name: &str, gender: Gender) -> Student {
        Student {
            id,
            nis: format!("{id:03}"),
            name: name.to_string(),
            gender,
            class_room_id: 1,
        }
    }

    fn detail(id: i32, student_id: i32, subject_id: i32, status: Status) -> AttendanceDetail {
        AttendanceDetail {
            attendance: Attendance {
                id,
                date: NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
                class_room_id: 1,
                subject_id,
                teacher_id: subject_id,
                student_id,
                status,
                recorded_by: "guru".to_string(),
            },
            subject_name: format!("Subject {subject_id}"),
            teacher_name: format!("Teacher {subject_id}"),
        }
    }

    #[test]
    fn students_without_records_have_no_status() {
        let roster = [student(1, "Budi", Gender::M), student(2, "Citra", Gender::F)];
        let rows = build_daily_sheet(&roster, &[], None);

        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.status.is_none()
            && row.subject_name.is_none()
            && row.teacher_name.is_none()));
    }

    #[test]
    fn joins_subject_and_teacher_names() {
        let roster = [student(1, "Budi", Gender::M), student(2, "Citra", Gender::F)];
        let records = [detail(10, 2, 3, Status::Izin)];

        let rows = build_daily_sheet(&roster, &records, None);

        assert_eq!(rows[0].status, None);
        assert_eq!(rows[1].status, Some(Status::Izin));
        assert_eq!(rows[1].subject_name.as_deref(), Some("Subject 3"));
        assert_eq!(rows[1].teacher_name.as_deref(), Some("Teacher 3"));
    }

    #[test]
    fn latest_record_wins_across_subjects() {
        let roster = [student(1, "Budi", Gender::M)];
        let records = [
            detail(11, 1, 2, Status::Alfa),
            detail(10, 1, 1, Status::Hadir),
        ];

        let rows = build_daily_sheet(&roster, &records, None);
        assert_eq!(rows[0].status, Some(Status::Alfa));
        assert_eq!(rows[0].subject_name.as_deref(), Some("Subject 2"));
    }

    #[test]
    fn subject_filter_selects_one_context() {
        let roster = [student(1, "Budi", Gender::M), student(2, "Citra", Gender::F)];
        let records = [
            detail(10, 1, 1, Status::Hadir),
            detail(11, 1, 2, Status::Alfa),
            detail(12, 2, 2, Status::Sakit),
        ];

        let rows = build_daily_sheet(&roster, &records, Some(1));
        assert_eq!(rows[0].status, Some(Status::Hadir));
        assert_eq!(rows[1].status, None);
    }
}
