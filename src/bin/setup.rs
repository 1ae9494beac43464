//! Creates the tables of the configured database and, when given a `nis,name,gender` CSV file and a
//! class id, fills that class with its first roster.
//!
//! Usage: `setup [<class id> <roster.csv>]`

use absensi::manager::AttendanceManager;
use anyhow::{Context, Result, bail};
use std::env;
use std::fs::File;

pub fn main() -> Result<()> {
    let (_settings, mut manager) = absensi::create_default_manager()?;
    manager.migrate()?;

    let args: Vec<String> = env::args().skip(1).collect();
    match args.as_slice() {
        [] => Ok(()),
        [class_id, roster_path] => {
            let class_id: i32 = class_id
                .parse()
                .with_context(|| format!("'{class_id}' is not a class id"))?;
            let file = File::open(roster_path).with_context(|| format!("cannot open {roster_path}"))?;

            import_roster(&mut manager, class_id, file)
        }
        _ => bail!("usage: setup [<class id> <roster.csv>]"),
    }
}

fn import_roster(manager: &mut AttendanceManager, class_id: i32, file: File) -> Result<()> {
    let summary = manager.import_students(class_id, file)?;

    for skipped in &summary.skipped {
        eprintln!("Skipped {skipped}");
    }

    let roster = manager.class_roster(class_id)?;
    println!("{} students imported, class {class_id} now has:", summary.inserted);
    println!("{:#?}", roster);

    Ok(())
}
