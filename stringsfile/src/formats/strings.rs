//! Support for the `.strings` format itself, behind the same
//! [`Encoder`]/[`Decoder`] seam as the other formats.

use std::io::Write;
use std::path::Path;

use crate::{
    error::Error,
    store::StringsFile,
    traits::{Decoder, Encoder},
};

/// `.strings` codec.
///
/// Output is one entry per pair in key order, each preceded by its
/// `/* comment */` line, with a blank line between entries.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringsFormat;

impl Encoder for StringsFormat {
    fn to_writer<W: Write>(&self, strings: &StringsFile, mut writer: W) -> Result<(), Error> {
        let mut content = String::new();
        let mut first = true;
        strings.for_each_pair(|pair| {
            if !first {
                content.push('\n');
            }
            first = false;
            content.push_str(&pair.to_string());
            content.push('\n');
        });

        writer.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Decoder for StringsFormat {
    fn decode_str(&self, s: &str, strings: &StringsFile) -> Result<usize, Error> {
        let before = strings.len();
        strings.load_from_str(s)?;
        Ok(strings.len().saturating_sub(before))
    }

    /// Uses the store's own file loader so BOM-marked UTF-16 files work.
    fn read_from<P: AsRef<Path>>(&self, path: P, strings: &StringsFile) -> Result<usize, Error> {
        let before = strings.len();
        strings.load_from_file(path)?;
        Ok(strings.len().saturating_sub(before))
    }
}
