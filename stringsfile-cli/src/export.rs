use stringsfile::operations::export_strings;

use crate::strings_file::open_strings;
use crate::validation::validate_output_path;

/// Run the export command: write the strings file as `.po`, `.h` or `.strings`.
pub fn run_export_command(strings_file: &str, output: &str) -> Result<(), String> {
    validate_output_path(output)?;
    let strings = open_strings(strings_file, true)?;
    let format = export_strings(&strings, output).map_err(|e| e.to_string())?;
    println!(
        "Exported {} strings to {} ({})",
        strings.len(),
        output,
        format
    );
    Ok(())
}
