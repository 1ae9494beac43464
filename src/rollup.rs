//! Per-student attendance counts over a date range.

use crate::models::{Attendance, Gender, Status, Student};
use crate::period::SemesterRange;
use std::collections::HashMap;

/// The attendance counts of one student over a semester.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentStat {
    pub student_id: i32,
    pub nis: String,
    pub name: String,
    pub gender: Gender,
    pub total: u32,
    pub hadir: u32,
    pub sakit: u32,
    pub izin: u32,
    pub alfa: u32,
    /// `hadir / total * 100` rounded to two decimals, or `0.0` when there are no records.
    pub percentage: f64,
}

impl StudentStat {
    fn new(student: &Student) -> Self {
        Self {
            student_id: student.id,
            nis: student.nis.clone(),
            name: student.name.clone(),
            gender: student.gender,
            total: 0,
            hadir: 0,
            sakit: 0,
            izin: 0,
            alfa: 0,
            percentage: 0.0,
        }
    }

    fn count(&mut self, status: Status) {
        match status {
            Status::Hadir => self.hadir += 1,
            Status::Sakit => self.sakit += 1,
            Status::Izin => self.izin += 1,
            Status::Alfa => self.alfa += 1,
        }
        self.total += 1;
    }

    pub fn count_of(&self, status: Status) -> u32 {
        match status {
            Status::Hadir => self.hadir,
            Status::Sakit => self.sakit,
            Status::Izin => self.izin,
            Status::Alfa => self.alfa,
        }
    }
}

/// `numerator / denominator` rounded half up.
fn div_round(numerator: u64, denominator: u64) -> u64 {
    (2 * numerator + denominator) / (2 * denominator)
}

/// Share of `part` in `total` in hundredths of a percent, rounded half up. Zero when `total` is
/// zero.
pub fn basis_points(part: u32, total: u32) -> u64 {
    if total == 0 {
        return 0;
    }

    div_round(u64::from(part) * 10_000, u64::from(total))
}

/// Share of `part` in `total` as a percentage with two decimals. Zero when `total` is zero.
///
/// Rounded in integers so that exact half hundredths such as 23/160 round up.
pub fn percentage(part: u32, total: u32) -> f64 {
    basis_points(part, total) as f64 / 100.0
}

/// Counts every status per student of `roster`.
///
/// Only records of `class_id` that fall inside `range` and belong to a student on the roster are
/// counted. The output has one entry per roster student, in roster order, including students
/// without any record.
pub fn compute_rollup(
    class_id: i32,
    range: &SemesterRange,
    roster: &[Student],
    records: &[Attendance],
) -> Vec<StudentStat> {
    let mut stats: Vec<StudentStat> = roster.iter().map(StudentStat::new).collect();
    let index: HashMap<i32, usize> = roster
        .iter()
        .enumerate()
        .map(|(i, student)| (student.id, i))
        .collect();

    for record in records {
        if record.class_room_id != class_id || !range.contains(record.date) {
            continue;
        }

        if let Some(&i) = index.get(&record.student_id) {
            stats[i].count(record.status);
        }
    }

    for stat in &mut stats {
        stat.percentage = percentage(stat.hadir, stat.total);
    }

    stats
}

/// Class-wide figures printed above the semester table.
#[derive(Debug, Clone, PartialEq)]
pub struct RollupSummary {
    pub total_records: u32,
    pub total_hadir: u32,
    /// Mean of the per-student percentages, two decimals. Zero for an empty class.
    pub average_percentage: f64,
}

impl RollupSummary {
    pub fn from_stats(stats: &[StudentStat]) -> Self {
        let total_records = stats.iter().map(|s| s.total).sum();
        let total_hadir = stats.iter().map(|s| s.hadir).sum();
        let average_percentage = if stats.is_empty() {
            0.0
        } else {
            // Percentages carry two decimals, so they convert back to basis points exactly.
            let sum: u64 = stats
                .iter()
                .map(|s| (s.percentage * 100.0).round() as u64)
                .sum();
            div_round(sum, stats.len() as u64) as f64 / 100.0
        };

        Self {
            total_records,
            total_hadir,
            average_percentage,
        }
    }
}
