//! Machine translation of untranslated strings through a LibreTranslate
//! compatible HTTP service.

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use stringsfile::StringsFile;
use stringsfile::catalog::FALLBACK_LOCALE;
use stringsfile::placeholder::{mask_placeholders, unmask_placeholders};
use tracing::{debug, info, warn};

use crate::strings_file::{open_strings, save_strings};
use crate::validation::validate_language_code;

#[derive(Debug, Clone)]
pub struct TranslateOptions {
    pub strings_file: String,
    pub url: String,
    pub api_key: Option<String>,
    pub language: Option<String>,
}

/// A service that translates one text from the base language.
pub trait TranslationService {
    fn translate(&self, text: &str) -> Result<String, String>;
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
    error: Option<String>,
}

/// Client for `POST {url}/translate`.
pub struct HttpTranslator {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    target: String,
}

impl HttpTranslator {
    pub fn new(url: &str, api_key: Option<String>, target: &str) -> Result<Self, String> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| format!("Unable to create HTTP client: {}", e))?;

        Ok(Self {
            client,
            endpoint: format!("{}/translate", url.trim_end_matches('/')),
            api_key,
            target: target.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn request_body(&self, text: &str) -> Value {
        let mut body = json!({
            "q": text,
            "source": FALLBACK_LOCALE,
            "target": self.target,
            "format": "text",
        });
        if let Some(key) = &self.api_key {
            body["api_key"] = json!(key);
        }
        body
    }
}

impl TranslationService for HttpTranslator {
    fn translate(&self, text: &str) -> Result<String, String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&self.request_body(text))
            .send()
            .map_err(|e| format!("Request to {} failed: {}", self.endpoint, e))?;

        let status = response.status();
        let body: TranslateResponse = response
            .json()
            .map_err(|e| format!("Invalid response from {}: {}", self.endpoint, e))?;

        match (status.is_success(), body.translated_text, body.error) {
            (true, Some(text), _) => Ok(text),
            (_, _, Some(error)) => Err(format!("{} ({})", error, status)),
            _ => Err(format!("No translation in response ({})", status)),
        }
    }
}

/// Counters from [`translate_strings`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslateSummary {
    pub translated: usize,
    pub failed: usize,
}

/// Translates every pair whose text is still its key.
///
/// Format specifiers are masked before the text is sent and restored in the
/// answer. A failed request, or an answer that lost a specifier, leaves the
/// pair untouched and is counted in `failed`.
pub fn translate_strings(
    strings: &StringsFile,
    service: &impl TranslationService,
) -> TranslateSummary {
    let mut summary = TranslateSummary::default();

    for pair in strings.pairs().into_iter().filter(|p| p.is_untranslated()) {
        let (masked, originals) = mask_placeholders(&pair.text);
        let result = service.translate(&masked).and_then(|answer| {
            unmask_placeholders(&answer, &originals)
                .ok_or_else(|| format!("Translation lost a format specifier: {:?}", answer))
        });

        match result {
            Ok(text) if !text.is_empty() => {
                debug!(key = %pair.key, "translated");
                if strings.set_text(&pair.key, &text) {
                    summary.translated += 1;
                }
            }
            Ok(_) => {
                warn!(key = %pair.key, "empty translation");
                summary.failed += 1;
            }
            Err(error) => {
                warn!(key = %pair.key, %error, "translation failed");
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Target language from `-l`, else the strings file stem (`po/de.strings`).
pub fn target_language(strings_file: &str, language: Option<&str>) -> Result<String, String> {
    let raw = match language {
        Some(lang) => lang.to_string(),
        None => Path::new(strings_file)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .ok_or_else(|| format!("Cannot derive a language from '{}'", strings_file))?,
    };
    validate_language_code(&raw)
}

/// Run the translate command.
pub fn run_translate_command(opts: TranslateOptions) -> Result<(), String> {
    let target = target_language(&opts.strings_file, opts.language.as_deref())?;
    if target == FALLBACK_LOCALE {
        return Err(format!(
            "Target language '{}' is the source language",
            target
        ));
    }

    let strings = open_strings(&opts.strings_file, true)?;
    let translator = HttpTranslator::new(&opts.url, opts.api_key, &target)?;
    info!(endpoint = translator.endpoint(), %target, "translating strings");

    let summary = translate_strings(&strings, &translator);
    if summary.translated > 0 {
        save_strings(&strings, &opts.strings_file)?;
    }
    println!(
        "Translated {} strings to {} ({} failed)",
        summary.translated, target, summary.failed
    );

    if summary.failed > 0 {
        return Err(format!("{} translations failed", summary.failed));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct Bracketing {
        seen: RefCell<Vec<String>>,
    }

    impl TranslationService for Bracketing {
        fn translate(&self, text: &str) -> Result<String, String> {
            self.seen.borrow_mut().push(text.to_string());
            if text.contains("fail") {
                return Err("service unavailable".to_string());
            }
            if text.contains("drop") {
                return Ok("dropped".to_string());
            }
            Ok(format!("[{}]", text.replace("__PH0__", "__ph0__")))
        }
    }

    #[test]
    fn test_translate_untranslated_pairs_only() {
        let strings = StringsFile::new();
        strings.add_string("%d files", "%d files", None);
        strings.add_string("Open", "Öffnen", None);
        strings.add_string("fail me", "fail me", None);
        strings.add_string("drop %s", "drop %s", None);

        let service = Bracketing {
            seen: RefCell::new(Vec::new()),
        };
        let summary = translate_strings(&strings, &service);

        assert_eq!(
            summary,
            TranslateSummary {
                translated: 1,
                failed: 2
            }
        );
        assert_eq!(strings.get_string("%d files"), "[%d files]");
        assert_eq!(strings.get_string("Open"), "Öffnen");
        assert_eq!(strings.get_string("fail me"), "fail me");
        assert_eq!(strings.get_string("drop %s"), "drop %s");
        assert_eq!(
            *service.seen.borrow(),
            vec!["__PH0__ files", "drop __PH0__", "fail me"]
        );
    }

    #[test]
    fn test_request_body() {
        let translator =
            HttpTranslator::new("http://localhost:5000/", Some("secret".into()), "de").unwrap();
        assert_eq!(translator.endpoint(), "http://localhost:5000/translate");
        assert_eq!(
            translator.request_body("__PH0__ files"),
            json!({
                "q": "__PH0__ files",
                "source": "en",
                "target": "de",
                "format": "text",
                "api_key": "secret",
            })
        );

        let anonymous = HttpTranslator::new("http://localhost:5000", None, "fr").unwrap();
        assert!(anonymous.request_body("x").get("api_key").is_none());
    }

    #[test]
    fn test_target_language() {
        assert_eq!(target_language("po/de.strings", None).unwrap(), "de");
        assert_eq!(target_language("po/pt_BR.strings", None).unwrap(), "pt-BR");
        assert_eq!(target_language("po/de.strings", Some("fr")).unwrap(), "fr");
        assert!(target_language("po/app_v2.strings", None).is_err());
    }
}
