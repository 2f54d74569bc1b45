use stringsfile::operations::{Report, report_strings};

use crate::strings_file::open_strings;

/// Run the report command: print the translation status of the strings file,
/// optionally against a reference file holding the current keys.
///
/// With `strict`, an incomplete translation is reported as an error after the
/// report is printed.
pub fn run_report_command(
    strings_file: &str,
    reference: Option<&str>,
    json_output: bool,
    strict: bool,
) -> Result<(), String> {
    let strings = open_strings(strings_file, true)?;
    let reference = reference
        .map(|path| open_strings(path, true))
        .transpose()?;

    let report = report_strings(&strings, reference.as_ref());
    if json_output {
        println!("{}", report.to_json().map_err(|e| e.to_string())?);
    } else {
        print!("{}", render_report(strings_file, &report));
    }

    if strict && !report.is_complete() {
        return Err(format!("{} is incomplete", strings_file));
    }
    Ok(())
}

/// Human-readable report text.
pub fn render_report(name: &str, report: &Report) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {} ===\n", name));
    out.push_str(&format!("  Total: {}\n", report.summary.total));
    out.push_str(&format!(
        "  Translated: {} ({:.2}%)\n",
        report.summary.translated,
        report.percent_translated()
    ));

    for (label, keys) in [
        ("Untranslated", &report.untranslated),
        ("Mismatched format", &report.mismatched_format),
        ("Missing", &report.missing),
        ("Old", &report.old),
    ] {
        out.push_str(&format!("  {}: {}\n", label, keys.len()));
        for key in keys {
            out.push_str(&format!("    \"{}\"\n", key.escape_debug()));
        }
    }
    out
}
