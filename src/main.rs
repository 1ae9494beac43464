use absensi::cli::{Cli, Command, RecordArgs, ReportArgs};
use absensi::gateway::{ReportMode, ReportRequest};
use absensi::manager::{AttendanceManager, AttendanceSession, ClassRoomForm};
use absensi::models::{NewStudent, NewTeachingAssignment};
use absensi::settings::Settings;
use absensi::{Error, display};
use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local, NaiveDate};
use clap::Parser;
use std::fs::{self, File};
use std::io::{self, Write};

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The name of the active academic year, for commands that default to it.
fn active_year(manager: &mut AttendanceManager) -> Result<String> {
    match manager.active_academic_year()? {
        Some(year) => Ok(year.name),
        None => bail!("no academic year is active, pass --year or run `absensi activate-year`"),
    }
}

fn record(manager: &mut AttendanceManager, args: RecordArgs) -> Result<()> {
    let file = File::open(&args.file_path)
        .with_context(|| format!("cannot open {}", args.file_path.display()))?;
    let entries = manager.read_session_entries(args.class, file, args.default_status)?;

    let session = AttendanceSession {
        date: args.date.unwrap_or_else(today),
        class_room_id: args.class,
        subject_id: args.subject,
        teacher_id: args.teacher,
        recorded_by: args.recorded_by,
        entries,
    };

    let inserted = manager.record_attendance(&session)?;
    println!("Recorded attendance of {inserted} students on {}.", session.date);

    Ok(())
}

fn report(manager: &mut AttendanceManager, settings: &Settings, args: ReportArgs) -> Result<()> {
    let year = match args.year {
        Some(year) => Some(year),
        None if args.mode == ReportMode::Semester => Some(active_year(manager)?),
        None => None,
    };

    let request = ReportRequest {
        class_id: Some(args.class),
        mode: args.mode,
        date: Some(args.date.unwrap_or_else(today)),
        subject_id: args.subject,
        semester: args.semester,
        year,
        teacher_id: args.teacher,
    };

    let report = manager.generate_report(&request)?;

    if args.stdout {
        io::stdout().write_all(&report.body)?;
        return Ok(());
    }

    let dir = args.output.unwrap_or_else(|| settings.output_dir.clone());
    fs::create_dir_all(&dir).with_context(|| format!("cannot create {}", dir.display()))?;

    let path = dir.join(&report.filename);
    fs::write(&path, &report.body).with_context(|| format!("cannot write {}", path.display()))?;
    println!("Wrote {} ({})", path.display(), report.content_type);

    Ok(())
}

fn run(manager: &mut AttendanceManager, settings: &Settings, command: Command) -> Result<()> {
    match command {
        Command::InitDb => manager.migrate()?,
        Command::AddYear {
            name,
            start_year,
            end_year,
            activate,
        } => {
            let year = manager.create_academic_year(&name, start_year, end_year)?;
            println!("Added academic year {} with id {}.", year.name, year.id);
            if activate {
                manager.activate_academic_year(&year.name)?;
            }
        }
        Command::ActivateYear { name } => {
            let year = manager.activate_academic_year(&name)?;
            println!("Academic year {} is now active.", year.name);
        }
        Command::ListYears => display::show_years(manager)?,
        Command::AddProgram {
            code,
            name,
            short_name,
            min_grade,
        } => {
            let program = manager.create_program(&code, &name, &short_name, min_grade)?;
            println!("Added program {} with id {}.", program.code, program.id);
        }
        Command::RemoveProgram { id } => {
            let program = manager.delete_program(id)?;
            println!("Removed program {} and its classes.", program.code);
        }
        Command::AddSubject { code, name } => {
            let subject = manager.create_subject(&code, &name)?;
            println!("Added subject {} with id {}.", subject.name, subject.id);
        }
        Command::AddTeacher { name } => {
            let teacher = manager.create_teacher(&name)?;
            println!("Added teacher {} with id {}.", teacher.name, teacher.id);
        }
        Command::AddClass(args) => {
            let class = manager.create_class_room(ClassRoomForm {
                grade_level: args.grade,
                academic_year_id: args.year_id,
                program_id: args.program,
                section: args.section,
                name: args.name,
            })?;
            println!("Added class {} with id {}.", class.name, class.id);
        }
        Command::ListClasses => display::show_classes(manager)?,
        Command::AddStudent {
            nis,
            name,
            gender,
            class,
        } => {
            manager.insert_students(&[NewStudent {
                nis,
                name,
                gender,
                class_room_id: class,
            }])?;
        }
        Command::RemoveStudent { nis } => {
            let student = manager.delete_student(&nis)?;
            println!("Removed {} ({}).", student.name, student.nis);
        }
        Command::ImportStudents { class, file_path } => {
            let file = File::open(&file_path)
                .with_context(|| format!("cannot open {}", file_path.display()))?;
            let summary = manager.import_students(class, file)?;

            println!("Imported {} students.", summary.inserted);
            for skipped in summary.skipped {
                eprintln!("Skipped {skipped}");
            }
        }
        Command::ShowRoster { class, verbose } => display::show_roster(manager, class, verbose)?,
        Command::Assign {
            teacher,
            subject,
            class,
        } => {
            manager.ensure_assignment(NewTeachingAssignment {
                teacher_id: teacher,
                subject_id: subject,
                class_room_id: class,
            })?;
        }
        Command::AddSchedule(args) => {
            let schedule = manager.create_schedule(args.into())?;
            println!("Added lesson with id {}.", schedule.id);
        }
        Command::UpdateSchedule { id, schedule } => {
            manager.update_schedule(id, schedule.into())?;
        }
        Command::ShowSchedule { class } => display::show_schedule(manager, class)?,
        Command::Today { teacher, weekday } => {
            let weekday = weekday.unwrap_or_else(|| today().weekday().number_from_monday() as i32);
            display::show_teacher_day(manager, teacher, weekday)?
        }
        Command::Record(args) => record(manager, args)?,
        Command::Correct {
            class,
            subject,
            date,
            nis,
            status,
        } => {
            let student = manager
                .find_student(&nis)?
                .ok_or_else(|| Error::not_found(format!("student with NIS {nis}")))?;
            manager.correct_attendance(date, class, subject, student.id, status)?;
        }
        Command::ShowDaily {
            class,
            date,
            subject,
        } => display::show_daily(manager, class, date.unwrap_or_else(today), subject)?,
        Command::ShowSemester {
            class,
            semester,
            year,
        } => {
            let year = match year {
                Some(year) => year,
                None => active_year(manager)?,
            };
            display::show_semester(manager, class, semester, year)?
        }
        Command::Report(args) => report(manager, settings, args)?,
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (settings, mut manager) = absensi::create_default_manager()?;

    run(&mut manager, &settings, cli.command)
}
