//! Extraction of translatable literals from C-family source.
//!
//! A call such as `_("Hello")` or `_(/* menu item */ "Open " "file")` marks
//! a translatable string. The scan is textual: it skips comments, string and
//! character literals, and matches the function name only as a whole
//! identifier.

use tracing::warn;

use crate::escape::decode;

/// Localization function recognized when none is given.
pub const DEFAULT_FUNCTION: &str = "_";

/// One literal found in a call to the localization function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedString {
    /// Decoded text with adjacent literals concatenated.
    pub text: String,
    /// A `/* ... */` comment just inside the call's parenthesis.
    pub comment: Option<String>,
    /// 1-based line of the call.
    pub line: usize,
}

struct Cursor<'a> {
    src: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn starts_with(&self, prefix: &[u8]) -> bool {
        self.src[self.pos..].starts_with(prefix)
    }

    fn bump(&mut self) {
        if self.peek() == Some(b'\n') {
            self.line += 1;
        }
        self.pos += 1;
    }

    fn skip_line_comment(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.bump();
        }
    }

    /// Skips a block comment starting at `/*` and returns its trimmed text.
    fn block_comment(&mut self) -> &'a str {
        self.pos += 2;
        let start = self.pos;
        while self.peek().is_some() && !self.starts_with(b"*/") {
            self.bump();
        }
        let end = self.pos;
        self.pos = (self.pos + 2).min(self.src.len());
        let src = self.src;
        std::str::from_utf8(&src[start..end])
            .unwrap_or_default()
            .trim()
    }

    /// Skips a quoted literal starting at `quote` and returns its raw body.
    ///
    /// An unescaped newline ends the literal, as in C.
    fn quoted(&mut self, quote: u8) -> &'a [u8] {
        self.pos += 1;
        let start = self.pos;
        while let Some(b) = self.peek() {
            match b {
                b'\\' => {
                    self.bump();
                    if self.peek().is_some() {
                        self.bump();
                    }
                }
                b'\n' => break,
                _ if b == quote => break,
                _ => self.bump(),
            }
        }
        let end = self.pos;
        if self.peek() == Some(quote) {
            self.pos += 1;
        }
        let src = self.src;
        &src[start..end]
    }

    /// Skips whitespace and comments, returning the last block comment seen.
    fn skip_trivia(&mut self) -> Option<&'a str> {
        let mut comment = None;
        loop {
            match self.peek() {
                Some(b) if b.is_ascii_whitespace() => self.bump(),
                Some(b'/') if self.starts_with(b"//") => self.skip_line_comment(),
                Some(b'/') if self.starts_with(b"/*") => comment = Some(self.block_comment()),
                _ => return comment,
            }
        }
    }

    fn identifier(&mut self) -> &'a [u8] {
        let start = self.pos;
        while self.peek().is_some_and(is_ident) {
            self.pos += 1;
        }
        let src = self.src;
        &src[start..self.pos]
    }
}

fn is_ident(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Finds every `function("literal")` call in `source`.
pub fn extract_strings(source: &str, function: &str) -> Vec<ScannedString> {
    let mut cursor = Cursor {
        src: source.as_bytes(),
        pos: 0,
        line: 1,
    };
    let mut found = Vec::new();

    while let Some(b) = cursor.peek() {
        match b {
            b'/' if cursor.starts_with(b"//") => cursor.skip_line_comment(),
            b'/' if cursor.starts_with(b"/*") => {
                cursor.block_comment();
            }
            b'"' | b'\'' => {
                cursor.quoted(b);
            }
            _ if is_ident(b) => {
                let line = cursor.line;
                if cursor.identifier() == function.as_bytes()
                    && let Some(scanned) = call_argument(&mut cursor, line)
                {
                    found.push(scanned);
                }
            }
            _ => cursor.bump(),
        }
    }

    found
}

/// Parses the literal argument after a matched function name.
fn call_argument(cursor: &mut Cursor<'_>, line: usize) -> Option<ScannedString> {
    cursor.skip_trivia();
    if cursor.peek() != Some(b'(') {
        return None;
    }
    cursor.pos += 1;

    let comment = cursor.skip_trivia();
    let mut raw = Vec::new();
    while cursor.peek() == Some(b'"') {
        raw.extend_from_slice(cursor.quoted(b'"'));
        cursor.skip_trivia();
    }
    if raw.is_empty() {
        return None;
    }

    let raw = String::from_utf8_lossy(&raw);
    match decode(&raw) {
        Ok(text) => Some(ScannedString {
            text,
            comment: comment.filter(|c| !c.is_empty()).map(str::to_string),
            line,
        }),
        Err(_) => {
            warn!(line, "skipping literal with unsupported escape");
            None
        }
    }
}
