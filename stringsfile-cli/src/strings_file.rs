use std::path::Path;

use stringsfile::StringsFile;
use stringsfile::formats::StringsFormat;
use stringsfile::traits::Encoder;
use tracing::debug;

use crate::validation::{validate_file_path, validate_output_path};

/// Loads the `-f` strings file.
///
/// Commands that build the file up (`scan`, `merge`, `import`) start from an
/// empty store when it does not exist yet; the others pass `must_exist`.
pub fn open_strings(path: &str, must_exist: bool) -> Result<StringsFile, String> {
    let strings = StringsFile::new();
    if !must_exist && !Path::new(path).exists() {
        debug!(path, "strings file does not exist yet, starting empty");
        return Ok(strings);
    }

    validate_file_path(path)?;
    strings.load_from_file(path).map_err(|e| e.to_string())?;
    Ok(strings)
}

/// Writes `strings` back to `path` in `.strings` format.
pub fn save_strings(strings: &StringsFile, path: &str) -> Result<(), String> {
    validate_output_path(path)?;
    StringsFormat
        .write_to(strings, path)
        .map_err(|e| e.to_string())?;
    debug!(path, pairs = strings.len(), "saved strings file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("new.strings");
        let path = path.to_str().unwrap();

        assert!(open_strings(path, false).unwrap().is_empty());
        assert!(open_strings(path, true).unwrap_err().contains("does not exist"));
    }

    #[test]
    fn test_save_then_open() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("de.strings");
        let path = path.to_str().unwrap();

        let strings = StringsFile::new();
        strings.add_string("Yes", "Ja", Some("Button"));
        save_strings(&strings, path).unwrap();

        let reloaded = open_strings(path, true).unwrap();
        assert_eq!(reloaded.pairs(), strings.pairs());
    }

    #[test]
    fn test_open_reports_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.strings");
        std::fs::write(&path, "\"a\" = \"1\"").unwrap();

        let err = open_strings(path.to_str().unwrap(), true).unwrap_err();
        assert_eq!(err, "Missing terminator on line 1.");
    }
}
