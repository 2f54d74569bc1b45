//! Scanner for the `.strings` text format.
//!
//! ```text
//! /* optional comment */
//! "key" = "localized text";
//! ```
//!
//! Entries are fed into the store as they are parsed; a syntax error stops
//! the scan but keeps everything added before it.

use tracing::debug;

use crate::error::Error;
use crate::escape::decode_escape;
use crate::store::Inner;

/// Maximum number of bytes kept for a key, text or comment. Longer values are
/// silently truncated.
pub const MAX_VALUE_LEN: usize = 1023;

/// Which quoted string is being read, for error messages.
#[derive(Clone, Copy)]
enum Field {
    Key,
    Text,
}

impl Field {
    fn name(self) -> &'static str {
        match self {
            Field::Key => "key",
            Field::Text => "text",
        }
    }
}

struct Scanner<'a> {
    data: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Scanner<'a> {
    fn new(data: &'a [u8]) -> Self {
        Scanner {
            data,
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    fn starts_with(&self, prefix: &[u8]) -> bool {
        self.data[self.pos..].starts_with(prefix)
    }

    /// Advances one byte, counting newlines.
    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        if b == b'\n' {
            self.line += 1;
        }
        self.pos += 1;
        Some(b)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_space) {
            self.bump();
        }
    }

    /// Reads a block comment; the opening `/*` has already been consumed.
    ///
    /// Returns `None` when the input ends before `*/`.
    fn comment(&mut self) -> Option<String> {
        self.skip_whitespace();

        let mut buf = Vec::new();
        loop {
            if self.starts_with(b"*/") {
                self.pos += 2;
                break;
            }
            let b = self.bump()?;
            if buf.len() < MAX_VALUE_LEN {
                buf.push(b);
            }
        }

        while buf.last().copied().is_some_and(is_space) {
            buf.pop();
        }
        Some(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Reads a quoted string; the opening quote has already been consumed.
    fn quoted(&mut self, field: Field) -> Result<String, Error> {
        let start_line = self.line;
        let mut buf = Vec::new();

        loop {
            let Some(b) = self.bump() else {
                return Err(Error::syntax(
                    start_line,
                    format!(
                        "Unterminated {} string on line {}.",
                        field.name(),
                        start_line
                    ),
                ));
            };

            let ch = match b {
                b'"' => break,
                b'\\' => {
                    let (ch, used) = decode_escape(&self.data[self.pos..]).ok_or_else(|| {
                        self.error(format!(
                            "Invalid escape in {} string on line {}.",
                            field.name(),
                            self.line
                        ))
                    })?;
                    self.pos += used;
                    ch
                }
                other => other,
            };

            if buf.len() < MAX_VALUE_LEN {
                buf.push(ch);
            }
        }

        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    fn error(&self, message: String) -> Error {
        Error::syntax(self.line, message)
    }
}

/// C `isspace`: ASCII whitespace plus vertical tab.
fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0b
}

/// Parses `data` into `inner`, skipping keys that already exist.
///
/// Returns the number of pairs added. On error, pairs added before the
/// failure point stay in `inner`. Entries with an empty key or empty text are
/// skipped.
pub(crate) fn parse(data: &[u8], inner: &mut Inner) -> Result<usize, Error> {
    let before = inner.len();
    let result = parse_entries(data, inner);
    inner.sort_if_needed();
    result.map(|()| inner.len() - before)
}

fn parse_entries(data: &[u8], inner: &mut Inner) -> Result<(), Error> {
    let mut scanner = Scanner::new(data);
    let mut comment: Option<String> = None;

    loop {
        scanner.skip_whitespace();

        let Some(b) = scanner.peek() else {
            break;
        };

        if scanner.starts_with(b"/*") {
            scanner.pos += 2;
            match scanner.comment() {
                Some(text) => comment = Some(text),
                // An unterminated trailing comment ends the data.
                None => break,
            }
            continue;
        }

        if b != b'"' {
            return Err(scanner.error(format!("Syntax error on line {}.", scanner.line)));
        }
        scanner.pos += 1;
        let key = scanner.quoted(Field::Key)?;

        scanner.skip_whitespace();
        if scanner.peek() != Some(b'=') {
            let saw = match scanner.peek() {
                Some(c) => format!("'{}'", c.escape_ascii()),
                None => "end of data".to_string(),
            };
            return Err(scanner.error(format!(
                "Missing separator on line {} (saw {} at offset {}).",
                scanner.line, saw, scanner.pos
            )));
        }
        scanner.pos += 1;

        scanner.skip_whitespace();
        if scanner.peek() != Some(b'"') {
            return Err(scanner.error(format!("Missing text string on line {}.", scanner.line)));
        }
        scanner.pos += 1;
        let text = scanner.quoted(Field::Text)?;

        if scanner.peek() != Some(b';') {
            return Err(scanner.error(format!("Missing terminator on line {}.", scanner.line)));
        }
        scanner.pos += 1;

        let entry_comment = comment.take();
        if key.is_empty() || text.is_empty() {
            debug!(line = scanner.line, "skipping entry with empty key or text");
            continue;
        }
        inner.add_pair(key, text, entry_comment)?;
    }

    Ok(())
}
