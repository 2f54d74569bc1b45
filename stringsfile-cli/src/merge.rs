use stringsfile::operations::merge_file;

use crate::strings_file::{open_strings, save_strings};
use crate::validation::validate_file_path;

/// Run the merge command: add the strings another file has and this one lacks.
///
/// With `clean` (`-c`), strings the other file no longer has are removed.
pub fn run_merge_command(strings_file: &str, input: &str, clean: bool) -> Result<(), String> {
    validate_file_path(input)?;
    let strings = open_strings(strings_file, false)?;
    let report = merge_file(&strings, input, clean).map_err(|e| e.to_string())?;

    if report.added + report.removed > 0 {
        save_strings(&strings, strings_file)?;
    }
    println!(
        "Merged {}: {} added, {} removed",
        input, report.added, report.removed
    );
    Ok(())
}
