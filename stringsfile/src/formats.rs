//! File formats a [`StringsFile`](crate::StringsFile) can be written to or
//! read from.
//!
//! This module re-exports the codec for each format and provides the
//! [`FormatType`] enum for picking one from a file name.

pub mod c_header;
pub mod po;
pub mod strings;

use std::{
    fmt::{Display, Formatter},
    path::Path,
    str::FromStr,
};

pub use c_header::CHeaderFormat;
pub use po::PoFormat;
pub use strings::StringsFormat;

use crate::Error;

/// Represents all supported file formats for generic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Apple-style `.strings`.
    Strings,
    /// GNU gettext `.po`.
    Po,
    /// C header with the `.strings` data as a string constant (export only).
    CHeader,
}

/// Implements [`std::fmt::Display`] for [`FormatType`].
///
/// # Example
/// ```rust
/// use stringsfile::formats::FormatType;
/// assert_eq!(FormatType::Strings.to_string(), "strings");
/// assert_eq!(FormatType::Po.to_string(), "po");
/// assert_eq!(FormatType::CHeader.to_string(), "h");
/// ```
impl Display for FormatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Accepts `"strings"`, `"po"`/`"gettext"` and `"h"`/`"header"`,
/// case-insensitively.
///
/// # Example
/// ```rust
/// use stringsfile::formats::FormatType;
/// use std::str::FromStr;
/// assert_eq!(FormatType::from_str("PO").unwrap(), FormatType::Po);
/// assert!(FormatType::from_str("xliff").is_err());
/// ```
impl FromStr for FormatType {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        match s.as_str() {
            "strings" => Ok(FormatType::Strings),
            "po" | "gettext" => Ok(FormatType::Po),
            "h" | "header" => Ok(FormatType::CHeader),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }
}

impl FormatType {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Strings => "strings",
            FormatType::Po => "po",
            FormatType::CHeader => "h",
        }
    }

    /// Picks the format from a path's extension.
    ///
    /// # Example
    /// ```rust
    /// use stringsfile::formats::FormatType;
    /// assert_eq!(FormatType::from_path("po/de.po").unwrap(), FormatType::Po);
    /// assert!(FormatType::from_path("de.json").is_err());
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => ext.parse(),
            None => Err(Error::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Whether pairs can be read back from this format.
    pub fn can_decode(&self) -> bool {
        !matches!(self, FormatType::CHeader)
    }
}
