#![forbid(unsafe_code)]
//! Localization strings for Rust programs and the tools that maintain them.
//!
//! A `.strings` file maps source-language text to its translation:
//!
//! ```text
//! /* Main menu */
//! "Open File" = "Datei öffnen";
//! ```
//!
//! [`StringsFile`] parses such files into a sorted, thread-safe store with
//! fast lookup. Missing keys fall back to the key itself, so an untranslated
//! program still prints its own text.
//!
//! # Quick Start
//!
//! ```rust
//! use stringsfile::StringsFile;
//!
//! let strings = StringsFile::new();
//! strings.load_from_str(r#""%d files" = "%d Dateien";"#)?;
//!
//! assert_eq!(strings.get_string("%d files"), "%d Dateien");
//! assert_eq!(
//!     strings.format_string(64, "%d files", &[3.into()]).as_deref(),
//!     Some("3 Dateien")
//! );
//! # Ok::<(), stringsfile::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`catalog`]: process-wide message catalog chosen from the environment's locale
//! - [`formats`]: `.strings`, gettext `.po` and C header codecs
//! - [`operations`]: export, import, merge, report and source scanning
//! - [`printf`]: printf-compatible formatting with positional arguments
//! - [`placeholder`]: format-specifier signatures and masking

pub mod catalog;
pub mod error;
pub mod escape;
pub mod formats;
pub mod operations;
pub mod pair;
mod parser;
pub mod placeholder;
pub mod printf;
pub mod scan;
pub mod store;
pub mod traits;

// Re-export most used types for easy consumption
pub use crate::{
    catalog::Catalog,
    error::Error,
    formats::FormatType,
    pair::Pair,
    parser::MAX_VALUE_LEN,
    printf::{FormatArg, snprintf, sprintf},
    store::StringsFile,
};
