//! Message catalogs for localizing a program's own output.
//!
//! A [`Catalog`] pairs a [`StringsFile`] with the locale it was built for.
//! Programs usually install one process-wide catalog with [`set_locale`],
//! register their translations, and then print through [`puts`] and
//! [`printf`]:
//!
//! ```no_run
//! use stringsfile::catalog;
//!
//! catalog::set_locale();
//! catalog::register_directory("/usr/share/myapp/strings");
//! catalog::puts(&mut std::io::stdout(), "Hello").unwrap();
//! ```

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::Path;
use std::sync::OnceLock;

use tracing::debug;

use crate::printf::{self, FormatArg};
use crate::store::StringsFile;

/// Locale used when the environment names none, or names a non-UTF-8 one.
pub const FALLBACK_LOCALE: &str = "en";

/// Longest locale name kept, in bytes (`ll_CC` plus room for a script).
const MAX_LOCALE_LEN: usize = 7;

static DEFAULT: OnceLock<Catalog> = OnceLock::new();

#[derive(Debug)]
pub struct Catalog {
    locale: String,
    strings: StringsFile,
}

impl Catalog {
    /// Creates an empty catalog for `locale`, normalized as with
    /// [`normalize_locale`].
    pub fn new(locale: &str) -> Self {
        Catalog {
            locale: normalize_locale(Some(locale)),
            strings: StringsFile::new(),
        }
    }

    /// Creates an empty catalog for the locale named by `LC_ALL`,
    /// `LC_MESSAGES` or `LANG`.
    pub fn from_env() -> Self {
        let raw = resolve_locale(|name| std::env::var(name).ok());
        Catalog {
            locale: normalize_locale(raw.as_deref()),
            strings: StringsFile::new(),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn strings(&self) -> &StringsFile {
        &self.strings
    }

    /// Makes this the process-wide catalog.
    ///
    /// Only the first installation takes effect; otherwise `self` is handed
    /// back.
    pub fn install(self) -> Result<&'static Catalog, Catalog> {
        DEFAULT.set(self)?;
        Ok(set_locale())
    }

    /// Loads `<dir>/<locale>.strings`, falling back to the two-letter
    /// language file (`de.strings` for `de_AT`).
    ///
    /// Returns `true` if either file loaded cleanly.
    pub fn register_directory(&self, dir: impl AsRef<Path>) -> bool {
        let dir = dir.as_ref();
        let full = dir.join(format!("{}.strings", self.locale));
        if self.strings.load_from_file(&full).is_ok() {
            debug!(path = %full.display(), "registered strings");
            return true;
        }

        match self.locale.get(..2).filter(|lang| *lang != self.locale) {
            Some(lang) => {
                let short = dir.join(format!("{}.strings", lang));
                let loaded = self.strings.load_from_file(&short).is_ok();
                if loaded {
                    debug!(path = %short.display(), "registered strings");
                }
                loaded
            }
            None => false,
        }
    }

    /// Loads compiled-in `.strings` data if `locale` is the catalog's locale
    /// or its two-letter language.
    pub fn register_string(&self, locale: &str, data: &str) -> bool {
        let matches = locale == self.locale
            || (locale.len() == 2 && self.locale.starts_with(locale));
        matches && self.strings.load_from_str(data).is_ok()
    }

    pub fn get_string<'a>(&self, key: &'a str) -> Cow<'a, str> {
        self.strings.get_string(key)
    }

    /// Writes the localized `message` and a newline.
    pub fn puts(&self, out: &mut impl Write, message: &str) -> io::Result<()> {
        writeln!(out, "{}", self.get_string(message))
    }

    /// Writes the localized `message`, formatted with `args`, and a newline.
    pub fn printf(&self, out: &mut impl Write, message: &str, args: &[FormatArg]) -> io::Result<()> {
        let formatted = printf::sprintf(&self.get_string(message), args)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
        writeln!(out, "{}", formatted)
    }
}

/// First non-empty value of `LC_ALL`, `LC_MESSAGES` and `LANG`.
pub fn resolve_locale(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .into_iter()
        .filter_map(lookup)
        .find(|value| !value.is_empty())
}

/// Reduces a POSIX locale name to the form used for `.strings` file names.
///
/// `de_DE.UTF-8@euro` becomes `de_DE`. The C/POSIX locales, missing names and
/// names with a charset other than UTF-8 become [`FALLBACK_LOCALE`].
pub fn normalize_locale(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return FALLBACK_LOCALE.to_string();
    };
    if raw.starts_with("C/") {
        return FALLBACK_LOCALE.to_string();
    }

    let name = raw.split_once('@').map_or(raw, |(before, _)| before);
    let base = match name.split_once('.') {
        Some((base, charset)) => {
            let utf8 = charset.eq_ignore_ascii_case("UTF-8") || charset.eq_ignore_ascii_case("utf8");
            if !utf8 {
                return FALLBACK_LOCALE.to_string();
            }
            base
        }
        None => name,
    };

    if base.is_empty() || base == "C" || base == "POSIX" {
        return FALLBACK_LOCALE.to_string();
    }

    let mut locale = base.to_string();
    crate::store::truncate_at_boundary(&mut locale, MAX_LOCALE_LEN);
    locale
}

/// The installed process-wide catalog, if any.
pub fn default_catalog() -> Option<&'static Catalog> {
    DEFAULT.get()
}

/// Installs a catalog for the environment's locale. Later calls return the
/// catalog already installed.
pub fn set_locale() -> &'static Catalog {
    DEFAULT.get_or_init(Catalog::from_env)
}

/// [`Catalog::register_directory`] on the default catalog; `false` before
/// [`set_locale`].
pub fn register_directory(dir: impl AsRef<Path>) -> bool {
    default_catalog().is_some_and(|catalog| catalog.register_directory(dir))
}

/// [`Catalog::register_string`] on the default catalog; `false` before
/// [`set_locale`].
pub fn register_string(locale: &str, data: &str) -> bool {
    default_catalog().is_some_and(|catalog| catalog.register_string(locale, data))
}

/// Looks `key` up in `strings`, or in the default catalog when `strings` is
/// `None`. Falls back to `key`.
pub fn get_string<'a>(strings: Option<&StringsFile>, key: &'a str) -> Cow<'a, str> {
    match strings.or_else(|| default_catalog().map(Catalog::strings)) {
        Some(strings) => strings.get_string(key),
        None => Cow::Borrowed(key),
    }
}

/// [`StringsFile::format_string`] with the same default-catalog fallback as
/// [`get_string`].
pub fn format_string(
    strings: Option<&StringsFile>,
    capacity: usize,
    key: &str,
    args: &[FormatArg],
) -> Option<String> {
    match strings.or_else(|| default_catalog().map(Catalog::strings)) {
        Some(strings) => strings.format_string(capacity, key, args),
        None => {
            // No store at all: format the key itself.
            StringsFile::new().format_string(capacity, key, args)
        }
    }
}

/// Writes the localized `message` through the default catalog.
pub fn puts(out: &mut impl Write, message: &str) -> io::Result<()> {
    match default_catalog() {
        Some(catalog) => catalog.puts(out, message),
        None => writeln!(out, "{}", message),
    }
}

/// Formats and writes the localized `message` through the default catalog.
pub fn printf(out: &mut impl Write, message: &str, args: &[FormatArg]) -> io::Result<()> {
    match default_catalog() {
        Some(catalog) => catalog.printf(out, message, args),
        None => {
            let formatted = printf::sprintf(message, args)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
            writeln!(out, "{}", formatted)
        }
    }
}
