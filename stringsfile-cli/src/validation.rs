use std::path::Path;

use unic_langid::LanguageIdentifier;

/// Validate file path exists and is readable
pub fn validate_file_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        return Err(format!("File does not exist: {}", path));
    }

    if !path_obj.is_file() {
        return Err(format!("Path is not a file: {}", path));
    }

    if !path_obj.metadata().map(|m| m.is_file()).unwrap_or(false) {
        return Err(format!("Cannot read file: {}", path));
    }

    Ok(())
}

/// Validate output directory exists or can be created
pub fn validate_output_path(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("Output path cannot be empty".to_string());
    }

    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Cannot create output directory: {}", e))?;
    }

    Ok(())
}

/// Validate a translation target language and return it in `ll-CC` form.
///
/// POSIX spellings such as `de_DE` or `pt_BR.UTF-8` are accepted.
pub fn validate_language_code(lang: &str) -> Result<String, String> {
    let trimmed = lang.split('.').next().unwrap_or(lang).trim();
    if trimmed.is_empty() {
        return Err("Language code cannot be empty".to_string());
    }

    let candidate = trimmed.replace('_', "-");
    match candidate.parse::<LanguageIdentifier>() {
        Ok(lang_id) if lang_id.language.as_str() != "und" => Ok(lang_id.to_string()),
        _ => Err(format!(
            "Invalid language code format: {}. Expected a language such as 'de' or 'pt_BR'",
            lang
        )),
    }
}

/// Validate the localization function name used by `scan`
pub fn validate_function_name(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(format!(
            "Invalid function name: '{}'. Expected a C identifier",
            name
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_file_path() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("de.strings");
        std::fs::write(&file, "").unwrap();

        assert!(validate_file_path(file.to_str().unwrap()).is_ok());
        assert!(
            validate_file_path(temp_dir.path().to_str().unwrap())
                .unwrap_err()
                .contains("not a file")
        );
        assert!(
            validate_file_path("/no/such/file.strings")
                .unwrap_err()
                .contains("does not exist")
        );
    }

    #[test]
    fn test_validate_output_path_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("nested/dir/out.po");

        assert!(validate_output_path(output.to_str().unwrap()).is_ok());
        assert!(output.parent().unwrap().is_dir());
        assert!(validate_output_path("out.po").is_ok());
        assert!(validate_output_path("").is_err());
    }

    #[test]
    fn test_validate_language_code() {
        assert_eq!(validate_language_code("de").unwrap(), "de");
        assert_eq!(validate_language_code("de_DE").unwrap(), "de-DE");
        assert_eq!(validate_language_code("pt_BR.UTF-8").unwrap(), "pt-BR");
        assert_eq!(validate_language_code("zh-Hans").unwrap(), "zh-Hans");
        assert!(validate_language_code("").is_err());
        assert!(validate_language_code("not a language").is_err());
        assert!(validate_language_code("123").is_err());
    }

    #[test]
    fn test_validate_function_name() {
        assert!(validate_function_name("_").is_ok());
        assert!(validate_function_name("SFSTR").is_ok());
        assert!(validate_function_name("gettext_noop").is_ok());
        assert!(validate_function_name("").is_err());
        assert!(validate_function_name("1st").is_err());
        assert!(validate_function_name("a-b").is_err());
    }
}
