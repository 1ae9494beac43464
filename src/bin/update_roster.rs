//! Updates the roster of a class.
//!
//! This binary reads a `nis,name,gender` CSV roster and diffs it against the students of the class
//! stored in the database. Students missing from the file are removed along with their attendance,
//! students new to the file are added.
//!
//! Usage: `update_roster <class id> <roster.csv>`

use anyhow::{Context, Result, bail};
use std::env;
use std::fs::File;

pub fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let [class_id, roster_path] = args.as_slice() else {
        bail!("usage: update_roster <class id> <roster.csv>");
    };

    let class_id: i32 = class_id
        .parse()
        .with_context(|| format!("'{class_id}' is not a class id"))?;
    let file = File::open(roster_path).with_context(|| format!("cannot open {roster_path}"))?;

    let (_settings, mut manager) = absensi::create_default_manager()?;
    let diff = manager.sync_class_roster(class_id, file)?;

    println!("Students dropped: {:#?}", diff.dropped);
    println!("Students added: {:#?}", diff.added);

    Ok(())
}
