//! High-level operations on strings files (export, import, merge, report,
//! scan) reusable by the CLI and library users.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    Error,
    formats::{CHeaderFormat, FormatType, PoFormat, StringsFormat},
    placeholder::placeholders_match,
    scan::extract_strings,
    store::{StringsFile, non_empty_path},
    traits::{Decoder, Encoder},
};

/// Reads a `.strings` or `.po` file into a new store.
pub fn read_strings(path: impl AsRef<Path>) -> Result<StringsFile, Error> {
    let path = non_empty_path(path.as_ref())?;
    let format = FormatType::from_path(path)?;
    if !format.can_decode() {
        return Err(Error::UnsupportedFormat(path.display().to_string()));
    }

    let strings = StringsFile::new();
    match format {
        FormatType::Po => PoFormat.read_from(path, &strings)?,
        _ => StringsFormat.read_from(path, &strings)?,
    };
    Ok(strings)
}

/// Writes `strings` to `path` in the format its extension names.
pub fn export_strings(strings: &StringsFile, path: impl AsRef<Path>) -> Result<FormatType, Error> {
    let path = non_empty_path(path.as_ref())?;
    let format = FormatType::from_path(path)?;
    match format {
        FormatType::Strings => StringsFormat.write_to(strings, path)?,
        FormatType::Po => PoFormat.write_to(strings, path)?,
        FormatType::CHeader => CHeaderFormat::for_path(path).write_to(strings, path)?,
    }
    info!(path = %path.display(), pairs = strings.len(), %format, "exported strings");
    Ok(format)
}

/// Counters from [`import_strings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub added: usize,
    pub modified: usize,
}

/// Updates `strings` from the translations in `incoming`.
///
/// Existing pairs take the incoming text when it differs. Pairs missing from
/// `strings` are added only when `add` is set.
pub fn import_from(strings: &StringsFile, incoming: &StringsFile, add: bool) -> ImportReport {
    let mut report = ImportReport::default();
    for pair in incoming.pairs() {
        match strings.get_pair(&pair.key) {
            Some(existing) if existing.text != pair.text => {
                if strings.set_text(&pair.key, &pair.text) {
                    report.modified += 1;
                }
            }
            Some(_) => {}
            None if add => {
                if strings.add_string(&pair.key, &pair.text, pair.comment.as_deref()) {
                    report.added += 1;
                }
            }
            None => {}
        }
    }
    report
}

/// Imports translations from a `.po` or `.strings` file.
pub fn import_strings(
    strings: &StringsFile,
    path: impl AsRef<Path>,
    add: bool,
) -> Result<ImportReport, Error> {
    let path = path.as_ref();
    let incoming = read_strings(path)?;
    let report = import_from(strings, &incoming, add);
    info!(
        path = %path.display(),
        added = report.added,
        modified = report.modified,
        "imported strings"
    );
    Ok(report)
}

/// Counters from [`merge_strings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MergeReport {
    pub added: usize,
    pub removed: usize,
}

/// Adds the pairs of `other` that `strings` lacks, comments included.
///
/// With `clean`, pairs whose key is not in `other` are removed.
pub fn merge_strings(
    strings: &StringsFile,
    other: &StringsFile,
    clean: bool,
) -> Result<MergeReport, Error> {
    let mut report = MergeReport {
        added: strings.copy_from(other, false)?,
        removed: 0,
    };

    if clean {
        for key in strings.keys() {
            if !other.has_string(&key) && strings.remove_string(&key) {
                report.removed += 1;
            }
        }
    }

    info!(added = report.added, removed = report.removed, "merged strings");
    Ok(report)
}

/// [`merge_strings`] with the other side read from a file.
pub fn merge_file(
    strings: &StringsFile,
    path: impl AsRef<Path>,
    clean: bool,
) -> Result<MergeReport, Error> {
    let other = read_strings(path)?;
    merge_strings(strings, &other, clean)
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub translated: usize,
    pub untranslated: usize,
    pub missing: usize,
    pub old: usize,
    pub mismatched_format: usize,
}

/// Translation status of a strings file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Report {
    pub summary: ReportSummary,
    /// Keys whose text is still the key itself.
    pub untranslated: Vec<String>,
    /// Keys in the reference file but not in this one.
    pub missing: Vec<String>,
    /// Keys in this file but no longer in the reference.
    pub old: Vec<String>,
    /// Translated keys whose format specifiers differ from the key's.
    pub mismatched_format: Vec<String>,
}

impl Report {
    /// Share of pairs that are translated, in percent.
    pub fn percent_translated(&self) -> f64 {
        if self.summary.total == 0 {
            return 100.0;
        }
        self.summary.translated as f64 * 100.0 / self.summary.total as f64
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Whether every pair is translated, present in the reference and
    /// format-compatible.
    pub fn is_complete(&self) -> bool {
        self.summary.untranslated == 0
            && self.summary.missing == 0
            && self.summary.mismatched_format == 0
    }
}

/// Classifies the pairs of `strings`, optionally against a `reference` file
/// holding the current set of keys.
pub fn report_strings(strings: &StringsFile, reference: Option<&StringsFile>) -> Report {
    let mut report = Report::default();

    for pair in strings.pairs() {
        report.summary.total += 1;
        if pair.is_untranslated() {
            report.untranslated.push(pair.key.clone());
        } else {
            report.summary.translated += 1;
            if !placeholders_match(&pair.key, &pair.text) {
                report.mismatched_format.push(pair.key.clone());
            }
        }
        if let Some(reference) = reference
            && !reference.has_string(&pair.key)
        {
            report.old.push(pair.key.clone());
        }
    }

    if let Some(reference) = reference {
        report.missing = reference
            .keys()
            .into_iter()
            .filter(|key| !strings.has_string(key))
            .collect();
    }

    report.summary.untranslated = report.untranslated.len();
    report.summary.missing = report.missing.len();
    report.summary.old = report.old.len();
    report.summary.mismatched_format = report.mismatched_format.len();
    report
}

/// Adds each new literal passed to `function` in `source`, with the text set
/// to the key. Returns the number of pairs added.
pub fn scan_source(strings: &StringsFile, source: &str, function: &str) -> usize {
    extract_strings(source, function)
        .into_iter()
        .filter(|found| strings.add_string(&found.text, &found.text, found.comment.as_deref()))
        .count()
}

/// Counters from [`scan_files`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub files: usize,
    pub added: usize,
}

/// Runs [`scan_source`] over each file, in order.
pub fn scan_files<P: AsRef<Path>>(
    strings: &StringsFile,
    paths: &[P],
    function: &str,
) -> Result<ScanReport, Error> {
    if function.is_empty() {
        return Err(Error::InvalidArgument("empty function name".to_string()));
    }

    let mut report = ScanReport::default();
    for path in paths {
        let path = non_empty_path(path.as_ref())?;
        let bytes = fs::read(path).map_err(|e| {
            Error::io(format!("Unable to open '{}': {}", path.display(), e), e)
        })?;
        let source = String::from_utf8_lossy(&bytes);
        let added = scan_source(strings, &source, function);
        debug!(path = %path.display(), added, "scanned source file");
        report.files += 1;
        report.added += added;
    }
    info!(files = report.files, added = report.added, "scan complete");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn store(pairs: &[(&str, &str)]) -> StringsFile {
        let strings = StringsFile::new();
        for (key, text) in pairs {
            strings.add_string(key, text, None);
        }
        strings
    }

    #[test]
    fn test_import_modifies_and_optionally_adds() {
        let strings = store(&[("Yes", "Yes"), ("No", "Nein")]);
        let incoming = store(&[("Yes", "Ja"), ("No", "Nein"), ("Maybe", "Vielleicht")]);

        let report = import_from(&strings, &incoming, false);
        assert_eq!(report, ImportReport { added: 0, modified: 1 });
        assert!(!strings.has_string("Maybe"));

        let report = import_from(&strings, &incoming, true);
        assert_eq!(report, ImportReport { added: 1, modified: 0 });
        assert_eq!(strings.get_string("Maybe"), "Vielleicht");
    }

    #[test]
    fn test_import_po_file() {
        let dir = tempfile::tempdir().unwrap();
        let po = dir.path().join("de.po");
        fs::write(
            &po,
            "msgid \"\"\nmsgstr \"\"\n\nmsgid \"Open\"\nmsgstr \"Öffnen\"\n\nmsgid \"Close\"\nmsgstr \"\"\n",
        )
        .unwrap();

        let strings = store(&[("Open", "Open"), ("Close", "Close")]);
        let report = import_strings(&strings, &po, false).unwrap();
        assert_eq!(report.modified, 1);
        assert_eq!(strings.get_string("Open"), "Öffnen");
        assert_eq!(strings.get_string("Close"), "Close");
    }

    #[test]
    fn test_merge_with_and_without_clean() {
        let strings = store(&[("a", "1"), ("stale", "x")]);
        let other = StringsFile::new();
        other.add_string("a", "changed", None);
        other.add_string("b", "2", Some("new entry"));

        let report = merge_strings(&strings, &other, false).unwrap();
        assert_eq!(report, MergeReport { added: 1, removed: 0 });
        assert_eq!(strings.get_string("a"), "1");
        assert_eq!(strings.get_pair("b").unwrap().comment.as_deref(), Some("new entry"));

        let report = merge_strings(&strings, &other, true).unwrap();
        assert_eq!(report, MergeReport { added: 0, removed: 1 });
        assert_eq!(strings.keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_report_classifies_pairs() {
        let strings = store(&[
            ("Hello", "Hallo"),
            ("Quit", "Quit"),
            ("%d files", "%s Dateien"),
            ("Gone", "Weg"),
        ]);
        let reference = store(&[("Hello", "Hello"), ("Quit", "Quit"), ("%d files", "%d files"), ("New", "New")]);

        let report = report_strings(&strings, Some(&reference));
        assert_eq!(report.summary.total, 4);
        assert_eq!(report.summary.translated, 3);
        assert_eq!(report.untranslated, vec!["Quit"]);
        assert_eq!(report.mismatched_format, vec!["%d files"]);
        assert_eq!(report.missing, vec!["New"]);
        assert_eq!(report.old, vec!["Gone"]);
        assert!(!report.is_complete());
        assert!((report.percent_translated() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_report_serializes() {
        let report = report_strings(&store(&[("a", "a")]), None);
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["summary"]["untranslated"], 1);
        assert_eq!(json["untranslated"][0], "a");
    }

    #[test]
    fn test_scan_source_adds_new_strings_only() {
        let strings = store(&[("Cancel", "Abbrechen")]);
        let source = r#"_("Cancel"); _(/* button */ "OK"); _("OK");"#;
        assert_eq!(scan_source(&strings, source, "_"), 1);
        let ok = strings.get_pair("OK").unwrap();
        assert_eq!(ok.text, "OK");
        assert_eq!(ok.comment.as_deref(), Some("button"));
        assert_eq!(strings.get_string("Cancel"), "Abbrechen");
    }

    #[test]
    fn test_scan_files_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("a.c");
        fs::write(&present, "_(\"one\");").unwrap();
        let absent = dir.path().join("b.c");

        let strings = StringsFile::new();
        let err = scan_files(&strings, &[present.clone(), absent], "_").unwrap_err();
        assert!(err.to_string().starts_with("Unable to open"));

        let report = scan_files(&strings, &[present], "_").unwrap();
        assert_eq!(report, ScanReport { files: 1, added: 0 });
    }

    #[test]
    fn test_empty_arguments_are_rejected() {
        let strings = store(&[("Yes", "Oui")]);
        assert!(matches!(read_strings(""), Err(Error::InvalidArgument(_))));
        assert!(matches!(export_strings(&strings, ""), Err(Error::InvalidArgument(_))));
        assert!(matches!(scan_files(&strings, &[""], "_"), Err(Error::InvalidArgument(_))));
        assert!(matches!(scan_files(&strings, &["main.c"], ""), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_read_rejects_write_only_format() {
        let dir = tempfile::tempdir().unwrap();
        let header = dir.path().join("fr.h");
        fs::write(&header, "static const char *fr_strings = \"\";\n").unwrap();
        assert!(matches!(read_strings(&header), Err(Error::UnsupportedFormat(_))));
    }

    #[test]
    fn test_export_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let strings = store(&[("Yes", "Oui")]);

        assert_eq!(export_strings(&strings, dir.path().join("fr.po")).unwrap(), FormatType::Po);
        assert_eq!(export_strings(&strings, dir.path().join("fr.h")).unwrap(), FormatType::CHeader);
        assert_eq!(
            export_strings(&strings, dir.path().join("copy.strings")).unwrap(),
            FormatType::Strings
        );
        assert!(matches!(
            export_strings(&strings, dir.path().join("fr.xliff")),
            Err(Error::UnsupportedFormat(_))
        ));

        let header = fs::read_to_string(dir.path().join("fr.h")).unwrap();
        assert!(header.starts_with("static const char *fr_strings = "));

        let reread = read_strings(dir.path().join("fr.po")).unwrap();
        assert_eq!(reread.get_string("Yes"), "Oui");
    }
}
