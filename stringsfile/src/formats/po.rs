//! GNU gettext `.po` files.
//!
//! Only the subset needed to move pairs in and out is handled: translator
//! and extracted comments, `msgctxt`, `msgid`, `msgstr` (or `msgstr[0]` for
//! plural entries) and continuation lines. Obsolete `#~` entries are skipped.

use std::io::Write;

use crate::{
    error::Error,
    escape::{EscapeFormat, decode, encode},
    pair::Pair,
    store::StringsFile,
    traits::{Decoder, Encoder},
};

const HEADER: &str = "msgid \"\"\nmsgstr \"\"\n\"Content-Type: text/plain; charset=UTF-8\\n\"\n";

/// A parsed `.po` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoEntry {
    pub context: Option<String>,
    pub msgid: String,
    pub msgstr: String,
    pub comment: Option<String>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Context,
    Id,
    IdPlural,
    Str,
    OtherPluralStr,
}

#[derive(Default)]
struct EntryBuilder {
    entry: PoEntry,
    comments: Vec<String>,
    has_id: bool,
}

impl EntryBuilder {
    fn finish(&mut self, entries: &mut Vec<PoEntry>) {
        let mut builder = std::mem::take(self);
        if !builder.has_id {
            return;
        }
        if !builder.comments.is_empty() {
            builder.entry.comment = Some(builder.comments.join("\n"));
        }
        entries.push(builder.entry);
    }
}

/// Parses `.po` content into entries, including the header entry.
pub fn parse_po(content: &str) -> Result<Vec<PoEntry>, Error> {
    let mut entries = Vec::new();
    let mut current = EntryBuilder::default();
    let mut field: Option<Field> = None;

    for (index, raw_line) in content.lines().enumerate() {
        let line_no = index + 1;
        let line = raw_line.trim();

        if line.is_empty() {
            current.finish(&mut entries);
            field = None;
            continue;
        }

        if let Some(rest) = line.strip_prefix('#') {
            // A comment after msgid/msgstr starts the next entry.
            if field.is_some() {
                current.finish(&mut entries);
                field = None;
            }
            match rest.chars().next() {
                // Translator (`# `) and extracted (`#.`) comments.
                None | Some(' ') | Some('.') => {
                    let text = rest.strip_prefix('.').unwrap_or(rest).trim();
                    if !text.is_empty() {
                        current.comments.push(text.to_string());
                    }
                }
                // References, flags, previous ids and obsolete entries.
                _ => {}
            }
            continue;
        }

        let (keyword, rest) = match line.find(char::is_whitespace) {
            Some(pos) if !line.starts_with('"') => (&line[..pos], line[pos..].trim_start()),
            _ => ("", line),
        };

        let next_field = match keyword {
            "" => None,
            "msgctxt" => Some(Field::Context),
            "msgid" => Some(Field::Id),
            "msgid_plural" => Some(Field::IdPlural),
            "msgstr" | "msgstr[0]" => Some(Field::Str),
            k if k.starts_with("msgstr[") => Some(Field::OtherPluralStr),
            _ => {
                return Err(Error::syntax(
                    line_no,
                    format!("Syntax error on line {}.", line_no),
                ));
            }
        };

        if let Some(next) = next_field {
            // msgctxt or msgid after a msgstr begins a new entry.
            if matches!(next, Field::Context | Field::Id)
                && matches!(field, Some(Field::Str | Field::OtherPluralStr))
            {
                current.finish(&mut entries);
            }
            if next == Field::Id {
                current.has_id = true;
            }
            field = Some(next);
        }

        let value = unquote(rest, line_no)?;
        let entry = &mut current.entry;
        match field {
            Some(Field::Context) => entry.context.get_or_insert_with(String::new).push_str(&value),
            Some(Field::Id) => entry.msgid.push_str(&value),
            Some(Field::Str) => entry.msgstr.push_str(&value),
            Some(Field::IdPlural | Field::OtherPluralStr) => {}
            None => {
                return Err(Error::syntax(
                    line_no,
                    format!("Syntax error on line {}.", line_no),
                ));
            }
        }
    }

    current.finish(&mut entries);
    Ok(entries)
}

fn unquote(s: &str, line_no: usize) -> Result<String, Error> {
    let inner = s
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .ok_or_else(|| {
            Error::syntax(
                line_no,
                format!("Unterminated PO string on line {}.", line_no),
            )
        })?;

    decode(inner).map_err(|_| {
        Error::syntax(
            line_no,
            format!("Invalid escape in PO string on line {}.", line_no),
        )
    })
}

/// gettext `.po` codec.
///
/// Writing emits a UTF-8 header entry followed by one entry per pair.
/// Reading skips the header, untranslated entries (empty `msgstr`) and keys
/// already in the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoFormat;

impl Encoder for PoFormat {
    fn to_writer<W: Write>(&self, strings: &StringsFile, mut writer: W) -> Result<(), Error> {
        let mut content = String::from(HEADER);
        strings.for_each_pair(|pair| {
            content.push('\n');
            if let Some(comment) = &pair.comment {
                for line in comment.lines() {
                    content.push_str("# ");
                    content.push_str(line);
                    content.push('\n');
                }
            }
            content.push_str("msgid \"");
            content.push_str(&encode(&pair.key, EscapeFormat::Po));
            content.push_str("\"\nmsgstr \"");
            content.push_str(&encode(&pair.text, EscapeFormat::Po));
            content.push_str("\"\n");
        });

        writer.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Decoder for PoFormat {
    fn decode_str(&self, s: &str, strings: &StringsFile) -> Result<usize, Error> {
        let pairs = parse_po(s)?
            .into_iter()
            .filter(|entry| !entry.msgid.is_empty() && !entry.msgstr.is_empty())
            .map(|entry| Pair::new(entry.msgid, entry.msgstr, entry.comment));
        strings.add_pairs(pairs)
    }
}
