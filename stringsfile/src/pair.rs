//! The key/text/comment triple stored in a [`StringsFile`](crate::StringsFile).

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::escape::{EscapeFormat, encode};

/// A single localization entry.
///
/// Pairs order by `key` only, compared byte-wise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pair {
    /// The lookup key, usually the source-language text.
    pub key: String,
    /// The localized text.
    pub text: String,
    /// Optional translator comment. Empty comments are stored as `None`;
    /// comments set through the store are trimmed and never contain `*/`.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub comment: Option<String>,
}

impl Pair {
    pub fn new(
        key: impl Into<String>,
        text: impl Into<String>,
        comment: Option<impl Into<String>>,
    ) -> Self {
        Pair {
            key: key.into(),
            text: text.into(),
            comment: normalize_comment(comment.map(Into::into)),
        }
    }

    /// Returns `true` when the text is byte-identical to the key.
    pub fn is_untranslated(&self) -> bool {
        self.key == self.text
    }

    pub(crate) fn cmp_key(&self, key: &str) -> Ordering {
        self.key.as_bytes().cmp(key.as_bytes())
    }
}

/// Puts a comment in the form a write-then-load cycle gives back: outer
/// whitespace trimmed, `*/` broken up, and empty comments dropped.
pub(crate) fn normalize_comment(comment: Option<String>) -> Option<String> {
    let comment = comment?;
    let trimmed = comment.trim_matches(|c: char| c.is_ascii_whitespace() || c == '\x0b');
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.replace("*/", "* /"))
}

impl PartialOrd for Pair {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pair {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.as_bytes().cmp(other.key.as_bytes())
    }
}

/// Writes the pair in `.strings` syntax, with its comment on the line above.
impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(comment) = &self.comment {
            // "*/" inside a comment would end it early.
            writeln!(f, "/* {} */", comment.replace("*/", "* /"))?;
        }
        write!(
            f,
            "\"{}\" = \"{}\";",
            encode(&self.key, EscapeFormat::Strings),
            encode(&self.text, EscapeFormat::Strings)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_comment_is_absent() {
        let pair = Pair::new("key", "text", Some(""));
        assert_eq!(pair.comment, None);
    }

    #[test]
    fn test_comment_is_normalized() {
        let pair = Pair::new("key", "text", Some("  \t spaced out \n"));
        assert_eq!(pair.comment.as_deref(), Some("spaced out"));
        let pair = Pair::new("key", "text", Some("ends */ early"));
        assert_eq!(pair.comment.as_deref(), Some("ends * / early"));
        assert_eq!(Pair::new("key", "text", Some(" \n ")).comment, None);
    }

    #[test]
    fn test_ordering_is_bytewise() {
        let upper = Pair::new("Zebra", "z", None::<String>);
        let lower = Pair::new("apple", "a", None::<String>);
        assert!(upper < lower);
    }

    #[test]
    fn test_display_escapes_and_comments() {
        let pair = Pair::new("say \"hi\"", "sag \"hallo\"\n", Some("greeting"));
        assert_eq!(
            pair.to_string(),
            "/* greeting */\n\"say \\\"hi\\\"\" = \"sag \\\"hallo\\\"\\n\";"
        );
    }

    #[test]
    fn test_untranslated() {
        assert!(Pair::new("Open", "Open", None::<String>).is_untranslated());
        assert!(!Pair::new("Open", "Öffnen", None::<String>).is_untranslated());
    }
}
