use stringsfile::operations::scan_files;

use crate::path_glob::expand_source_globs;
use crate::strings_file::{open_strings, save_strings};
use crate::validation::{validate_file_path, validate_function_name};

/// Run the scan command: collect `function("...")` literals from source files.
pub fn run_scan_command(
    strings_file: &str,
    sources: &[String],
    function: &str,
) -> Result<(), String> {
    if sources.is_empty() {
        return Err("At least one source file is required".to_string());
    }
    validate_function_name(function)?;

    let paths = expand_source_globs(sources)?;
    for path in &paths {
        validate_file_path(&path.to_string_lossy())?;
    }

    let strings = open_strings(strings_file, false)?;
    let report = scan_files(&strings, &paths, function).map_err(|e| e.to_string())?;

    if report.added > 0 || !std::path::Path::new(strings_file).exists() {
        save_strings(&strings, strings_file)?;
    }
    println!(
        "Scanned {} files: {} new strings ({} total)",
        report.files,
        report.added,
        strings.len()
    );
    Ok(())
}
