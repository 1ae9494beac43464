//! CSV rendering of daily sheets, semester rollups and teacher matrices.
//!
//! Free-text columns (student, subject and teacher names) are always wrapped in double quotes.
//! Every other column is written bare unless it contains a delimiter, a quote or a line break.
//! Lines end with `\n` and percentages always carry two decimals, so the same input renders to
//! the same bytes.

use crate::daily::DailyRow;
use crate::matrix::AttendanceMatrix;
use crate::period::SemesterRange;
use crate::rollup::{RollupSummary, StudentStat};
use std::borrow::Cow;
use std::io::{self, Write};

pub const CONTENT_TYPE: &str = "text/csv";

/// Printed for attendance fields that have no record.
pub const MISSING: &str = "-";

const DAILY_HEADER: [&str; 6] = [
    "NIS",
    "Nama Siswa",
    "Jenis Kelamin",
    "Status",
    "Mata Pelajaran",
    "Guru",
];

const SEMESTER_HEADER: [&str; 9] = [
    "NIS",
    "Nama Siswa",
    "Jenis Kelamin",
    "Total Hari",
    "Hadir (H)",
    "Sakit (S)",
    "Izin (I)",
    "Alfa (A)",
    "Persentase Kehadiran",
];

const MATRIX_TOTALS: [&str; 4] = ["Total Hadir", "Total Sakit", "Total Izin", "Total Alfa"];

enum Field<'a> {
    /// Always quoted.
    Text(&'a str),
    /// Quoted only when it has to be.
    Plain(Cow<'a, str>),
}

impl<'a> Field<'a> {
    fn plain(value: impl Into<Cow<'a, str>>) -> Self {
        Field::Plain(value.into())
    }
}

fn needs_quotes(value: &str) -> bool {
    value.contains([',', '"', '\n', '\r'])
}

fn write_quoted<W: Write>(out: &mut W, value: &str) -> io::Result<()> {
    write!(out, "\"{}\"", value.replace('"', "\"\""))
}

fn write_record<W: Write>(out: &mut W, fields: &[Field<'_>]) -> io::Result<()> {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.write_all(b",")?;
        }

        match field {
            Field::Text(value) => write_quoted(out, value)?,
            Field::Plain(value) if needs_quotes(value) => write_quoted(out, value)?,
            Field::Plain(value) => out.write_all(value.as_bytes())?,
        }
    }

    out.write_all(b"\n")
}

fn write_header<W: Write>(out: &mut W, header: &[&str]) -> io::Result<()> {
    let fields: Vec<Field<'_>> = header.iter().map(|&h| Field::plain(h)).collect();
    write_record(out, &fields)
}

fn format_percentage(value: f64) -> String {
    format!("{value:.2}%")
}

/// Writes the daily sheet: one header line and one line per student.
pub fn render_daily<W: Write>(rows: &[DailyRow], mut out: W) -> io::Result<()> {
    write_header(&mut out, &DAILY_HEADER)?;

    for row in rows {
        let status = row.status.map_or(MISSING, |status| status.as_str());
        write_record(
            &mut out,
            &[
                Field::plain(row.nis.as_str()),
                Field::Text(&row.name),
                Field::plain(row.gender.label()),
                Field::plain(status),
                Field::Text(row.subject_name.as_deref().unwrap_or(MISSING)),
                Field::Text(row.teacher_name.as_deref().unwrap_or(MISSING)),
            ],
        )?;
    }

    out.flush()
}

/// The context printed above a semester table.
#[derive(Debug, Clone, Copy)]
pub struct SemesterHeader<'a> {
    pub class_name: &'a str,
    pub range: &'a SemesterRange,
}

/// Writes the semester rollup: summary lines, a blank line, the header and one line per student.
pub fn render_semester<W: Write>(
    stats: &[StudentStat],
    header: SemesterHeader<'_>,
    mut out: W,
) -> io::Result<()> {
    let summary = RollupSummary::from_stats(stats);

    writeln!(out, "REKAP ABSENSI {}", header.range.label())?;
    writeln!(out, "Kelas: {}", header.class_name)?;
    writeln!(
        out,
        "Periode: {} s/d {}",
        header.range.start.format("%Y-%m-%d"),
        header.range.end.format("%Y-%m-%d")
    )?;
    writeln!(out, "Total Rekaman Absensi: {}", summary.total_records)?;
    writeln!(out, "Total Kehadiran: {}", summary.total_hadir)?;
    writeln!(
        out,
        "Rata-rata Kehadiran: {}",
        format_percentage(summary.average_percentage)
    )?;
    writeln!(out)?;

    write_header(&mut out, &SEMESTER_HEADER)?;

    for stat in stats {
        write_record(
            &mut out,
            &[
                Field::plain(stat.nis.as_str()),
                Field::Text(&stat.name),
                Field::plain(stat.gender.label()),
                Field::plain(stat.total.to_string()),
                Field::plain(stat.hadir.to_string()),
                Field::plain(stat.sakit.to_string()),
                Field::plain(stat.izin.to_string()),
                Field::plain(stat.alfa.to_string()),
                Field::plain(format_percentage(stat.percentage)),
            ],
        )?;
    }

    out.flush()
}

/// The context printed above a teacher's attendance matrix.
#[derive(Debug, Clone, Copy)]
pub struct MatrixHeader<'a> {
    pub class_name: &'a str,
    /// Short name of the class's program, if it has one.
    pub program: Option<&'a str>,
    pub academic_year: &'a str,
    pub teacher_name: &'a str,
}

/// Writes a teacher's matrix: title and context lines, a blank line, a header with one column per
/// recorded date (`dd/mm/YYYY`) and one numbered line per student ending in the four totals.
pub fn render_matrix<W: Write>(
    matrix: &AttendanceMatrix,
    header: MatrixHeader<'_>,
    mut out: W,
) -> io::Result<()> {
    write_record(&mut out, &[Field::plain("Rekap Kehadiran Siswa")])?;
    write_record(&mut out, &[Field::plain("Kelas"), Field::Text(header.class_name)])?;
    write_record(
        &mut out,
        &[
            Field::plain("Program"),
            Field::Text(header.program.unwrap_or(MISSING)),
        ],
    )?;
    write_record(
        &mut out,
        &[Field::plain("Tahun Akademik"), Field::plain(header.academic_year)],
    )?;
    write_record(&mut out, &[Field::plain("Guru"), Field::Text(header.teacher_name)])?;
    writeln!(out)?;

    let mut columns = vec![Field::plain("No"), Field::plain("Nama Siswa")];
    columns.extend(
        matrix
            .dates
            .iter()
            .map(|date| Field::plain(date.format("%d/%m/%Y").to_string())),
    );
    columns.extend(MATRIX_TOTALS.iter().map(|&total| Field::plain(total)));
    write_record(&mut out, &columns)?;

    for row in &matrix.rows {
        let mut fields = vec![Field::plain(row.number.to_string()), Field::Text(&row.name)];
        fields.extend(
            row.cells
                .iter()
                .map(|cell| Field::plain(cell.map_or(MISSING, |status| status.as_str()))),
        );
        fields.extend(
            [row.hadir, row.sakit, row.izin, row.alfa]
                .into_iter()
                .map(|total| Field::plain(total.to_string())),
        );
        write_record(&mut out, &fields)?;
    }

    out.flush()
}
