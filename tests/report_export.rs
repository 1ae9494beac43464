use absensi::Error;
use absensi::gateway::{ReportMode, ReportRequest};
use absensi::manager::{AttendanceManager, AttendanceSession, ClassRoomForm};
use absensi::models::{NewStudent, NewTeachingAssignment, Status};
use chrono::NaiveDate;

struct Fixture {
    manager: AttendanceManager,
    class_id: i32,
    math: i32,
    physics: i32,
    teacher_id: i32,
    budi: i32,
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn fixture() -> Fixture {
    let mut manager = AttendanceManager::in_memory().unwrap();

    let year = manager.create_academic_year("2025/2026", 2025, 2026).unwrap();
    manager.activate_academic_year("2025/2026").unwrap();
    let class = manager
        .create_class_room(ClassRoomForm {
            grade_level: 11,
            academic_year_id: year.id,
            name: Some("XI IPA/1".to_string()),
            ..Default::default()
        })
        .unwrap();
    let teacher = manager.create_teacher("Sari, S.Pd").unwrap();
    let math = manager.create_subject("MTK", "Matematika").unwrap();
    let physics = manager.create_subject("FIS", "Fisika").unwrap();

    manager
        .insert_students(&[NewStudent {
            nis: "001".to_string(),
            name: "Budi".to_string(),
            gender: "M".parse().unwrap(),
            class_room_id: class.id,
        }])
        .unwrap();
    let budi = manager.find_student("001").unwrap().unwrap().id;

    Fixture {
        manager,
        class_id: class.id,
        math: math.id,
        physics: physics.id,
        teacher_id: teacher.id,
        budi,
    }
}

impl Fixture {
    fn record(&mut self, day: NaiveDate, subject_id: i32, status: Status) {
        let session = AttendanceSession {
            date: day,
            class_room_id: self.class_id,
            subject_id,
            teacher_id: self.teacher_id,
            recorded_by: "sari".to_string(),
            entries: vec![(self.budi, status)],
        };
        self.manager.record_attendance(&session).unwrap();
    }

    fn daily(&mut self, day: NaiveDate, subject_id: Option<i32>) -> (String, String) {
        let report = self
            .manager
            .generate_report(&ReportRequest {
                class_id: Some(self.class_id),
                mode: ReportMode::Daily,
                date: Some(day),
                subject_id,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(report.content_type, "text/csv");
        (report.filename, String::from_utf8(report.body).unwrap())
    }

    fn semester(&mut self, semester: u8) -> absensi::Result<(String, String)> {
        let report = self.manager.generate_report(&ReportRequest {
            class_id: Some(self.class_id),
            mode: ReportMode::Semester,
            semester: Some(semester),
            year: Some("2025/2026".to_string()),
            ..Default::default()
        })?;

        Ok((report.filename, String::from_utf8(report.body).unwrap()))
    }
}

#[test]
fn semester_rollup_counts_statuses_in_range() {
    let mut fixture = fixture();
    fixture.record(date(2025, 7, 1), fixture.math, Status::Hadir);
    fixture.record(date(2025, 9, 15), fixture.math, Status::Hadir);
    fixture.record(date(2025, 12, 31), fixture.math, Status::Sakit);
    // Second semester.
    fixture.record(date(2026, 1, 5), fixture.math, Status::Alfa);

    let (filename, body) = fixture.semester(1).unwrap();

    assert_eq!(filename, "absensi_semester_XI IPA-1_semester1_2025-2026.csv");
    assert_eq!(
        body,
        "REKAP ABSENSI Semester 1 (2025/2026)\n\
         Kelas: XI IPA/1\n\
         Periode: 2025-07-01 s/d 2025-12-31\n\
         Total Rekaman Absensi: 3\n\
         Total Kehadiran: 2\n\
         Rata-rata Kehadiran: 66.67%\n\
         \n\
         NIS,Nama Siswa,Jenis Kelamin,Total Hari,Hadir (H),Sakit (S),Izin (I),Alfa (A),Persentase Kehadiran\n\
         001,\"Budi\",Laki-laki,3,2,1,0,0,66.67%\n"
    );

    let (_, second) = fixture.semester(2).unwrap();
    assert!(second.contains("Periode: 2026-01-01 s/d 2026-06-30\n"));
    assert!(second.ends_with("001,\"Budi\",Laki-laki,1,0,0,0,1,0.00%\n"));
}

#[test]
fn students_without_records_get_zero_percent() {
    let mut fixture = fixture();

    let (_, body) = fixture.semester(2).unwrap();

    assert!(body.contains("Rata-rata Kehadiran: 0.00%\n"));
    assert!(body.ends_with("001,\"Budi\",Laki-laki,0,0,0,0,0,0.00%\n"));
}

#[test]
fn daily_sheet_without_records_shows_dashes() {
    let mut fixture = fixture();

    let (filename, body) = fixture.daily(date(2025, 8, 17), None);

    assert_eq!(filename, "absensi_harian_XI IPA-1_2025-08-17.csv");
    assert_eq!(
        body,
        "NIS,Nama Siswa,Jenis Kelamin,Status,Mata Pelajaran,Guru\n\
         001,\"Budi\",Laki-laki,-,\"-\",\"-\"\n"
    );
}

#[test]
fn daily_sheet_follows_corrections_and_subject_filter() {
    let mut fixture = fixture();
    let day = date(2025, 8, 18);
    fixture.record(day, fixture.math, Status::Hadir);
    fixture.record(day, fixture.physics, Status::Alfa);

    let (_, latest) = fixture.daily(day, None);
    assert!(latest.ends_with("001,\"Budi\",Laki-laki,ALFA,\"Fisika\",\"Sari, S.Pd\"\n"));

    let (math, physics, budi) = (fixture.math, fixture.physics, fixture.budi);
    fixture
        .manager
        .correct_attendance(day, fixture.class_id, physics, budi, Status::Izin)
        .unwrap();

    let (_, corrected) = fixture.daily(day, Some(physics));
    assert!(corrected.ends_with(",IZIN,\"Fisika\",\"Sari, S.Pd\"\n"));

    let (_, filtered) = fixture.daily(day, Some(math));
    assert!(filtered.ends_with(",HADIR,\"Matematika\",\"Sari, S.Pd\"\n"));
}

#[test]
fn incomplete_or_unknown_selections_are_errors() {
    let mut fixture = fixture();

    let no_class = fixture.manager.generate_report(&ReportRequest {
        date: Some(date(2025, 8, 18)),
        ..Default::default()
    });
    assert!(matches!(no_class, Err(Error::Validation(_))));

    let unknown_class = fixture.manager.generate_report(&ReportRequest {
        class_id: Some(404),
        date: Some(date(2025, 8, 18)),
        ..Default::default()
    });
    assert!(matches!(unknown_class, Err(Error::NotFound(_))));

    let unknown_year = fixture.manager.generate_report(&ReportRequest {
        class_id: Some(fixture.class_id),
        mode: ReportMode::Semester,
        semester: Some(1),
        year: Some("2030/2031".to_string()),
        ..Default::default()
    });
    assert!(matches!(unknown_year, Err(Error::NotFound(_))));

    assert!(matches!(fixture.semester(3), Err(Error::Validation(_))));
}

#[test]
fn teacher_matrix_lists_only_that_teachers_days() {
    let mut fixture = fixture();
    let (class_id, math, physics, budi) =
        (fixture.class_id, fixture.math, fixture.physics, fixture.budi);
    fixture
        .manager
        .ensure_assignment(NewTeachingAssignment {
            teacher_id: fixture.teacher_id,
            subject_id: math,
            class_room_id: class_id,
        })
        .unwrap();
    fixture.record(date(2025, 8, 18), math, Status::Hadir);
    fixture.record(date(2025, 8, 11), math, Status::Sakit);

    let joko = fixture.manager.create_teacher("Joko").unwrap();
    let other_lesson = AttendanceSession {
        date: date(2025, 8, 12),
        class_room_id: class_id,
        subject_id: physics,
        teacher_id: joko.id,
        recorded_by: "joko".to_string(),
        entries: vec![(budi, Status::Alfa)],
    };
    fixture.manager.record_attendance(&other_lesson).unwrap();

    let request = ReportRequest {
        class_id: Some(class_id),
        mode: ReportMode::Teacher,
        teacher_id: Some(fixture.teacher_id),
        ..Default::default()
    };
    let report = fixture.manager.generate_report(&request).unwrap();

    assert_eq!(report.filename, "absensi_guru_XI IPA-1_Sari, S.Pd.csv");
    assert_eq!(
        String::from_utf8(report.body).unwrap(),
        "Rekap Kehadiran Siswa\n\
         Kelas,\"XI IPA/1\"\n\
         Program,\"-\"\n\
         Tahun Akademik,2025/2026\n\
         Guru,\"Sari, S.Pd\"\n\
         \n\
         No,Nama Siswa,11/08/2025,18/08/2025,Total Hadir,Total Sakit,Total Izin,Total Alfa\n\
         1,\"Budi\",SAKIT,HADIR,1,1,0,0\n"
    );

    // Joko recorded a lesson but was never assigned to the class.
    let unassigned = fixture.manager.generate_report(&ReportRequest {
        teacher_id: Some(joko.id),
        ..request
    });
    assert!(matches!(unassigned, Err(Error::Validation(_))));
}
