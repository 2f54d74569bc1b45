use stringsfile::operations::import_strings;

use crate::strings_file::{open_strings, save_strings};
use crate::validation::validate_file_path;

/// Run the import command: take translations from a `.po` or `.strings` file.
///
/// Keys not yet in the strings file are only added with `add` (`-a`).
pub fn run_import_command(strings_file: &str, input: &str, add: bool) -> Result<(), String> {
    validate_file_path(input)?;
    let strings = open_strings(strings_file, false)?;
    let report = import_strings(&strings, input, add).map_err(|e| e.to_string())?;

    if report.added + report.modified > 0 {
        save_strings(&strings, strings_file)?;
    }
    println!(
        "Imported {}: {} added, {} modified",
        input, report.added, report.modified
    );
    Ok(())
}
