//! Turns a report request into a named CSV file.

use crate::daily::{DailyRow, build_daily_sheet};
use crate::error::{Error, Result};
use crate::matrix::{AttendanceMatrix, build_matrix};
use crate::period::{Semester, SemesterRange};
use crate::render::{self, MatrixHeader, SemesterHeader};
use crate::rollup::{StudentStat, compute_rollup};
use crate::store::AttendanceStore;
use chrono::NaiveDate;
use std::fmt;
use std::io::{self, Write};
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    /// The attendance of one class on one date.
    #[default]
    Daily,
    /// Per-student counts over one semester.
    Semester,
    /// Every day one teacher recorded in one class, one column per day.
    Teacher,
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportMode::Daily => f.write_str("daily"),
            ReportMode::Semester => f.write_str("semester"),
            ReportMode::Teacher => f.write_str("teacher"),
        }
    }
}

impl FromStr for ReportMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "harian" => Ok(ReportMode::Daily),
            "semester" => Ok(ReportMode::Semester),
            "teacher" | "guru" => Ok(ReportMode::Teacher),
            _ => Err(format!(
                "unknown report mode '{s}', expected daily, semester or teacher"
            )),
        }
    }
}

/// The selections made by whoever asks for a report. Which fields are required depends on
/// [`ReportMode`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportRequest {
    pub class_id: Option<i32>,
    pub mode: ReportMode,
    /// Required for [`ReportMode::Daily`].
    pub date: Option<NaiveDate>,
    /// Narrows a daily sheet or a teacher matrix to one subject.
    pub subject_id: Option<i32>,
    /// `1` or `2`, required for [`ReportMode::Semester`].
    pub semester: Option<u8>,
    /// Academic year name such as `2025/2026`, required for [`ReportMode::Semester`].
    pub year: Option<String>,
    /// Required for [`ReportMode::Teacher`].
    pub teacher_id: Option<i32>,
}

/// A generated CSV file.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

/// What a request resolves to once its inputs are checked.
enum Target<'r> {
    Daily {
        class_id: i32,
        date: NaiveDate,
        subject_id: Option<i32>,
    },
    Semester {
        class_id: i32,
        semester: Semester,
        year: &'r str,
    },
    Teacher {
        class_id: i32,
        teacher_id: i32,
        subject_id: Option<i32>,
    },
}

impl ReportRequest {
    /// Checks that every input the mode needs is present, without touching the store.
    fn target(&self) -> Result<Target<'_>> {
        let class_id = self
            .class_id
            .ok_or_else(|| Error::validation("a class must be selected"))?;

        match self.mode {
            ReportMode::Daily => {
                let date = self
                    .date
                    .ok_or_else(|| Error::validation("a date must be selected for a daily report"))?;

                Ok(Target::Daily {
                    class_id,
                    date,
                    subject_id: self.subject_id,
                })
            }
            ReportMode::Semester => {
                let semester = self
                    .semester
                    .ok_or_else(|| Error::validation("a semester must be selected"))?;
                let semester = Semester::try_from(semester).map_err(Error::Validation)?;
                let year = self
                    .year
                    .as_deref()
                    .map(str::trim)
                    .filter(|year| !year.is_empty())
                    .ok_or_else(|| Error::validation("an academic year must be selected"))?;

                Ok(Target::Semester {
                    class_id,
                    semester,
                    year,
                })
            }
            ReportMode::Teacher => {
                let teacher_id = self
                    .teacher_id
                    .ok_or_else(|| Error::validation("a teacher must be selected"))?;

                Ok(Target::Teacher {
                    class_id,
                    teacher_id,
                    subject_id: self.subject_id,
                })
            }
        }
    }
}

/// Replaces characters that cannot appear in a file name.
pub fn sanitize_filename(name: &str) -> String {
    name.replace(['/', '\\'], "-")
}

/// The data behind one report, before it is rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportData {
    Daily {
        class_name: String,
        date: NaiveDate,
        rows: Vec<DailyRow>,
    },
    Semester {
        class_name: String,
        range: SemesterRange,
        stats: Vec<StudentStat>,
    },
    Teacher {
        class_name: String,
        /// Short name of the class's program.
        program: Option<String>,
        academic_year: String,
        teacher_name: String,
        matrix: AttendanceMatrix,
    },
}

impl ReportData {
    /// `absensi_harian_{class}_{date}.csv`, `absensi_semester_{class}_semester{n}_{year}.csv` or
    /// `absensi_guru_{class}_{teacher}.csv`, with slashes replaced.
    pub fn filename(&self) -> String {
        let name = match self {
            ReportData::Daily {
                class_name, date, ..
            } => format!(
                "absensi_harian_{class_name}_{}.csv",
                date.format("%Y-%m-%d")
            ),
            ReportData::Semester {
                class_name, range, ..
            } => format!(
                "absensi_semester_{class_name}_semester{}_{}.csv",
                range.semester.number(),
                range.academic_year
            ),
            ReportData::Teacher {
                class_name,
                teacher_name,
                ..
            } => format!("absensi_guru_{class_name}_{teacher_name}.csv"),
        };

        sanitize_filename(&name)
    }

    pub fn render<W: Write>(&self, out: W) -> io::Result<()> {
        match self {
            ReportData::Daily { rows, .. } => render::render_daily(rows, out),
            ReportData::Semester {
                class_name,
                range,
                stats,
            } => render::render_semester(stats, SemesterHeader { class_name, range }, out),
            ReportData::Teacher {
                class_name,
                program,
                academic_year,
                teacher_name,
                matrix,
            } => render::render_matrix(
                matrix,
                MatrixHeader {
                    class_name,
                    program: program.as_deref(),
                    academic_year,
                    teacher_name,
                },
                out,
            ),
        }
    }
}

/// Generates attendance reports from an [`AttendanceStore`].
pub struct ReportGateway<'a, S: ?Sized> {
    store: &'a mut S,
}

impl<'a, S: AttendanceStore + ?Sized> ReportGateway<'a, S> {
    pub fn new(store: &'a mut S) -> Self {
        Self { store }
    }

    /// Validates the request and renders the report it describes as CSV.
    pub fn generate(&mut self, request: &ReportRequest) -> Result<Report> {
        let data = self.collect(request)?;

        let mut body = Vec::new();
        data.render(&mut body)?;

        Ok(Report {
            filename: data.filename(),
            content_type: render::CONTENT_TYPE,
            body,
        })
    }

    /// Validates the request and reads the roster and attendance it needs.
    ///
    /// Missing selections fail with [`Error::Validation`] before any query runs. An unknown class,
    /// academic year or teacher fails with [`Error::NotFound`], and a teacher with no assignment
    /// in the class fails with [`Error::Validation`].
    pub fn collect(&mut self, request: &ReportRequest) -> Result<ReportData> {
        let target = request.target()?;
        info!(mode = %request.mode, class_id = ?request.class_id, "generating attendance report");

        match target {
            Target::Daily {
                class_id,
                date,
                subject_id,
            } => self.daily(class_id, date, subject_id),
            Target::Semester {
                class_id,
                semester,
                year,
            } => self.semester(class_id, semester, year),
            Target::Teacher {
                class_id,
                teacher_id,
                subject_id,
            } => self.teacher(class_id, teacher_id, subject_id),
        }
    }

    fn class_name(&mut self, class_id: i32) -> Result<String> {
        self.store
            .find_class_room(class_id)?
            .map(|class| class.name)
            .ok_or_else(|| Error::not_found(format!("class {class_id}")))
    }

    fn daily(
        &mut self,
        class_id: i32,
        date: NaiveDate,
        subject_id: Option<i32>,
    ) -> Result<ReportData> {
        let class_name = self.class_name(class_id)?;
        let roster = self.store.class_roster(class_id)?;
        let records = self.store.attendance_on(class_id, date)?;
        debug!(students = roster.len(), records = records.len(), %date, "loaded daily attendance");

        Ok(ReportData::Daily {
            class_name,
            date,
            rows: build_daily_sheet(&roster, &records, subject_id),
        })
    }

    fn semester(&mut self, class_id: i32, semester: Semester, year: &str) -> Result<ReportData> {
        let class_name = self.class_name(class_id)?;
        let academic_year = self
            .store
            .find_academic_year(year)?
            .ok_or_else(|| Error::not_found(format!("academic year {year}")))?;
        let range = SemesterRange::for_year(&academic_year, semester).ok_or_else(|| {
            Error::validation(format!("academic year {year} is outside the supported calendar"))
        })?;

        let roster = self.store.class_roster(class_id)?;
        let records = self
            .store
            .attendance_between(class_id, range.start, range.end)?;
        debug!(
            students = roster.len(),
            records = records.len(),
            start = %range.start,
            end = %range.end,
            "loaded semester attendance"
        );

        let stats = compute_rollup(class_id, &range, &roster, &records);

        Ok(ReportData::Semester {
            class_name,
            range,
            stats,
        })
    }

    fn teacher(
        &mut self,
        class_id: i32,
        teacher_id: i32,
        subject_id: Option<i32>,
    ) -> Result<ReportData> {
        let class = self
            .store
            .find_class_room(class_id)?
            .ok_or_else(|| Error::not_found(format!("class {class_id}")))?;
        let teacher = self
            .store
            .find_teacher(teacher_id)?
            .ok_or_else(|| Error::not_found(format!("teacher {teacher_id}")))?;
        if !self.store.teaches_class(teacher_id, class_id)? {
            return Err(Error::validation(format!(
                "{} does not teach {}",
                teacher.name, class.name
            )));
        }

        let program = match class.program_id {
            Some(program_id) => self
                .store
                .find_program(program_id)?
                .map(|program| program.short_name),
            None => None,
        };
        let academic_year = self
            .store
            .find_academic_year_by_id(class.academic_year_id)?
            .map_or_else(|| render::MISSING.to_string(), |year| year.name);

        let roster = self.store.class_roster(class_id)?;
        let records = self.store.attendance_by_teacher(class_id, teacher_id)?;
        debug!(
            students = roster.len(),
            records = records.len(),
            teacher_id,
            "loaded teacher attendance"
        );

        Ok(ReportData::Teacher {
            class_name: class.name,
            program,
            academic_year,
            teacher_name: teacher.name,
            matrix: build_matrix(&roster, &records, subject_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, Status};
    use crate::testing::MemoryStore;

    fn store() -> MemoryStore {
        let mut store = MemoryStore::default();
        store.add_year("2025/2026", 2025, 2026);
        store.add_class(1, "10 MIPA A");
        store.add_student(1, "001", "Budi", Gender::M, 1);
        store.add_student(2, "002", "Ani", Gender::F, 1);
        store
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn missing_class_is_rejected_before_any_query() {
        let mut store = store();
        let request = ReportRequest {
            date: Some(date(2025, 9, 1)),
            ..Default::default()
        };

        let err = ReportGateway::new(&mut store).generate(&request).unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.queries, 0);
    }

    #[test]
    fn each_mode_requires_its_own_inputs() {
        let mut store = store();
        let daily = ReportRequest {
            class_id: Some(1),
            ..Default::default()
        };
        let semester = ReportRequest {
            class_id: Some(1),
            mode: ReportMode::Semester,
            semester: Some(3),
            year: Some("2025/2026".to_string()),
            ..Default::default()
        };
        let no_year = ReportRequest {
            class_id: Some(1),
            mode: ReportMode::Semester,
            semester: Some(1),
            year: Some("  ".to_string()),
            ..Default::default()
        };

        let mut gateway = ReportGateway::new(&mut store);
        for request in [daily, semester, no_year] {
            assert!(matches!(
                gateway.generate(&request),
                Err(Error::Validation(_))
            ));
        }
        assert_eq!(store.queries, 0);
    }

    #[test]
    fn unknown_class_or_year_is_not_found() {
        let mut store = store();
        let unknown_class = ReportRequest {
            class_id: Some(9),
            date: Some(date(2025, 9, 1)),
            ..Default::default()
        };
        let unknown_year = ReportRequest {
            class_id: Some(1),
            mode: ReportMode::Semester,
            semester: Some(1),
            year: Some("2030/2031".to_string()),
            ..Default::default()
        };

        let mut gateway = ReportGateway::new(&mut store);
        assert!(matches!(
            gateway.generate(&unknown_class),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            gateway.generate(&unknown_year),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn daily_report_without_records_prints_dashes() {
        let mut store = store();
        let request = ReportRequest {
            class_id: Some(1),
            date: Some(date(2025, 9, 1)),
            ..Default::default()
        };

        let report = ReportGateway::new(&mut store).generate(&request).unwrap();

        assert_eq!(report.filename, "absensi_harian_10 MIPA A_2025-09-01.csv");
        assert_eq!(report.content_type, "text/csv");
        assert_eq!(
            String::from_utf8(report.body).unwrap(),
            "NIS,Nama Siswa,Jenis Kelamin,Status,Mata Pelajaran,Guru\n\
             002,\"Ani\",Perempuan,-,\"-\",\"-\"\n\
             001,\"Budi\",Laki-laki,-,\"-\",\"-\"\n"
        );
    }

    #[test]
    fn semester_report_rolls_up_the_semester_only() {
        let mut store = store();
        store.add_attendance(1, date(2025, 8, 1), Status::Hadir);
        store.add_attendance(1, date(2025, 8, 2), Status::Hadir);
        store.add_attendance(1, date(2025, 8, 3), Status::Sakit);
        // Second semester, must not be counted.
        store.add_attendance(1, date(2026, 2, 3), Status::Alfa);

        let request = ReportRequest {
            class_id: Some(1),
            mode: ReportMode::Semester,
            semester: Some(1),
            year: Some("2025/2026".to_string()),
            ..Default::default()
        };

        let report = ReportGateway::new(&mut store).generate(&request).unwrap();
        let body = String::from_utf8(report.body).unwrap();

        assert_eq!(
            report.filename,
            "absensi_semester_10 MIPA A_semester1_2025-2026.csv"
        );
        assert!(body.starts_with("REKAP ABSENSI Semester 1 (2025/2026)\n"));
        assert!(body.contains("Periode: 2025-07-01 s/d 2025-12-31\n"));
        assert!(body.contains("\n002,\"Ani\",Perempuan,0,0,0,0,0,0.00%\n"));
        assert!(body.ends_with("\n001,\"Budi\",Laki-laki,3,2,1,0,0,66.67%\n"));
    }

    #[test]
    fn filenames_never_contain_slashes() {
        assert_eq!(sanitize_filename("a/b\\c"), "a-b-c");
    }

    fn teacher_store() -> MemoryStore {
        let mut store = store();
        store.add_program(1, "MIPA");
        store.classes[0].program_id = Some(1);
        store.add_teacher(7, "Sari, S.Pd");
        store.add_teacher(8, "Joko");
        store.assign(7, 1, 1);
        store
    }

    fn teacher_request(teacher_id: Option<i32>) -> ReportRequest {
        ReportRequest {
            class_id: Some(1),
            mode: ReportMode::Teacher,
            teacher_id,
            ..Default::default()
        }
    }

    #[test]
    fn teacher_matrix_needs_a_teacher_of_the_class() {
        let mut store = teacher_store();

        let mut gateway = ReportGateway::new(&mut store);
        assert!(matches!(
            gateway.generate(&teacher_request(None)),
            Err(Error::Validation(_))
        ));
        assert_eq!(gateway.store.queries, 0);

        assert!(matches!(
            gateway.generate(&teacher_request(Some(99))),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            gateway.generate(&teacher_request(Some(8))),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn teacher_matrix_shows_only_that_teachers_days() {
        let mut store = teacher_store();
        store.add_lesson_attendance(1, date(2025, 8, 11), 1, 7, Status::Hadir);
        store.add_lesson_attendance(2, date(2025, 8, 11), 1, 7, Status::Izin);
        store.add_lesson_attendance(1, date(2025, 8, 4), 1, 7, Status::Alfa);
        // Someone else's lesson.
        store.add_lesson_attendance(1, date(2025, 8, 5), 2, 8, Status::Sakit);

        let report = ReportGateway::new(&mut store)
            .generate(&teacher_request(Some(7)))
            .unwrap();

        assert_eq!(report.filename, "absensi_guru_10 MIPA A_Sari, S.Pd.csv");
        assert_eq!(
            String::from_utf8(report.body).unwrap(),
            "Rekap Kehadiran Siswa\n\
             Kelas,\"10 MIPA A\"\n\
             Program,\"MIPA\"\n\
             Tahun Akademik,2025/2026\n\
             Guru,\"Sari, S.Pd\"\n\
             \n\
             No,Nama Siswa,04/08/2025,11/08/2025,Total Hadir,Total Sakit,Total Izin,Total Alfa\n\
             1,\"Ani\",-,IZIN,0,0,1,0\n\
             2,\"Budi\",ALFA,HADIR,1,0,0,1\n"
        );
    }

    #[test]
    fn report_modes_parse_in_both_languages() {
        assert_eq!("guru".parse::<ReportMode>(), Ok(ReportMode::Teacher));
        assert_eq!("Harian".parse::<ReportMode>(), Ok(ReportMode::Daily));
        assert_eq!(ReportMode::Teacher.to_string(), "teacher");
        assert!("weekly".parse::<ReportMode>().is_err());
    }
}
