//! Traits for reading and writing a [`StringsFile`] in other file formats.

use std::{
    fs::File,
    io::{BufWriter, Read, Write},
    path::Path,
};

use crate::{error::Error, store::StringsFile};

/// Serializes the pairs of a store.
///
/// # Example
///
/// ```rust,no_run
/// use stringsfile::{StringsFile, formats::PoFormat, traits::Encoder};
/// let strings = StringsFile::new();
/// strings.load_from_file("de.strings")?;
/// PoFormat.write_to(&strings, "de.po")?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Encoder {
    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, strings: &StringsFile, writer: W) -> Result<(), Error>;

    /// Write to file path.
    fn write_to<P: AsRef<Path>>(&self, strings: &StringsFile, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| {
            Error::io(format!("Unable to create '{}': {}", path.display(), e), e)
        })?;
        let mut writer = BufWriter::new(file);
        self.to_writer(strings, &mut writer)?;
        writer.flush()?;
        Ok(())
    }

    /// Write into a `String`.
    fn encode_to_string(&self, strings: &StringsFile) -> Result<String, Error> {
        let mut buf = Vec::new();
        self.to_writer(strings, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Parses pairs from another format into a store.
///
/// Keys already in the store keep their text, the same as a `.strings` load.
pub trait Decoder {
    /// Parse from a string, returning the number of pairs added.
    fn decode_str(&self, s: &str, strings: &StringsFile) -> Result<usize, Error>;

    /// Parse from any reader.
    fn from_reader<R: Read>(&self, mut reader: R, strings: &StringsFile) -> Result<usize, Error> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        self.decode_str(&content, strings)
    }

    /// Parse from file path.
    fn read_from<P: AsRef<Path>>(&self, path: P, strings: &StringsFile) -> Result<usize, Error> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| Error::io(format!("Unable to open '{}': {}", path.display(), e), e))?;
        self.from_reader(file, strings)
    }
}
