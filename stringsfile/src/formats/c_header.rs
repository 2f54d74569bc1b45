//! C header export: the `.strings` text as a string constant that a program
//! can compile in and hand to `register_string` at startup.

use std::io::Write;
use std::path::Path;

use crate::{
    error::Error,
    escape::{EscapeFormat, encode},
    store::StringsFile,
    traits::Encoder,
};

/// Writes `static const char *NAME_strings = ...;`.
///
/// Each `.strings` line becomes one C literal fragment, so the header stays
/// readable and diffs line by line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CHeaderFormat {
    name: String,
}

impl CHeaderFormat {
    /// Uses `name` as the variable prefix after replacing every character
    /// that is not valid in a C identifier with `_`.
    pub fn new(name: &str) -> Self {
        let mut ident: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        if ident.is_empty() {
            ident.push_str("default");
        } else if ident.starts_with(|c: char| c.is_ascii_digit()) {
            ident.insert(0, '_');
        }
        CHeaderFormat { name: ident }
    }

    /// Names the variable after the file stem (`po/de_DE.h` → `de_DE_strings`).
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        let stem = path
            .as_ref()
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self::new(&stem)
    }

    /// Full C variable name.
    pub fn variable(&self) -> String {
        format!("{}_strings", self.name)
    }
}

impl Encoder for CHeaderFormat {
    fn to_writer<W: Write>(&self, strings: &StringsFile, mut writer: W) -> Result<(), Error> {
        let mut fragments = Vec::new();
        strings.for_each_pair(|pair| {
            for line in pair.to_string().lines() {
                fragments.push(format!("\"{}\\n\"", encode(line, EscapeFormat::CLiteral)));
            }
        });

        let mut content = format!("static const char *{} = ", self.variable());
        if fragments.is_empty() {
            content.push_str("\"\"");
        } else {
            content.push_str(&fragments.join("\n"));
        }
        content.push_str(";\n");

        writer.write_all(content.as_bytes())?;
        Ok(())
    }
}
