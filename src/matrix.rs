//! The attendance matrix a teacher keeps for one class: one row per student, one column per day
//! the teacher recorded attendance.

use crate::models::{Attendance, Status, Student};
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct MatrixRow {
    /// 1-based position in the roster.
    pub number: usize,
    pub student_id: i32,
    pub name: String,
    /// One cell per entry of [`AttendanceMatrix::dates`].
    pub cells: Vec<Option<Status>>,
    pub hadir: u32,
    pub sakit: u32,
    pub izin: u32,
    pub alfa: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceMatrix {
    /// Every date with at least one record, oldest first.
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<MatrixRow>,
}

/// Lays `records` out as a roster-by-date grid.
///
/// `records` are expected to belong to one class and one teacher. `subject_id` narrows them to one
/// subject; without it a student with several records on one day shows the latest one. Totals
/// count the cells of the row.
pub fn build_matrix(
    roster: &[Student],
    records: &[Attendance],
    subject_id: Option<i32>,
) -> AttendanceMatrix {
    let records: Vec<&Attendance> = records
        .iter()
        .filter(|record| subject_id.is_none_or(|id| id == record.subject_id))
        .collect();

    let dates: Vec<NaiveDate> = records
        .iter()
        .map(|record| record.date)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut cells: HashMap<(i32, NaiveDate), &Attendance> = HashMap::new();
    for &record in &records {
        cells
            .entry((record.student_id, record.date))
            .and_modify(|current| {
                if record.id > current.id {
                    *current = record;
                }
            })
            .or_insert(record);
    }

    let rows = roster
        .iter()
        .enumerate()
        .map(|(i, student)| {
            let statuses: Vec<Option<Status>> = dates
                .iter()
                .map(|&date| cells.get(&(student.id, date)).map(|record| record.status))
                .collect();
            let total = |status: Status| {
                statuses.iter().filter(|&&cell| cell == Some(status)).count() as u32
            };
            let [hadir, sakit, izin, alfa] = Status::ALL.map(total);

            MatrixRow {
                number: i + 1,
                student_id: student.id,
                name: student.name.clone(),
                cells: statuses,
                hadir,
                sakit,
                izin,
                alfa,
            }
        })
        .collect();

    AttendanceMatrix { dates, rows }
}
