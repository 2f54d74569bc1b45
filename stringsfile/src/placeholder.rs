//! Format-specifier utilities.
//!
//! - Extract a placeholder signature so a translation can be checked against
//!   the arguments its key expects.
//! - Mask specifiers before text is sent to a machine translator and restore
//!   them afterwards.

use lazy_static::lazy_static;
use regex::Regex;

use crate::printf::{Count, Segment, segments};

lazy_static! {
    static ref SPECIFIER_REGEX: Regex = Regex::new(
        r"%(?:\d+\$)?[-+ 0#']*(?:\d+|\*(?:\d+\$)?)?(?:\.(?:\d+|\*(?:\d+\$)?)?)?(?:hh|h|ll|l|j|z|t|L|q)?[diouxXcs@fFeEgGp%]"
    )
    .unwrap();
    static ref MASK_REGEX: Regex = Regex::new(r"(?i)__\s*PH\s*(\d+)\s*__").unwrap();
}

/// One argument consumed by a format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderToken {
    /// 1-based argument position, after resolving sequential conversions.
    pub index: usize,
    /// Canonical argument class: `d` signed, `u` unsigned, `f` floating,
    /// `s` string/object, `c` character, `p` pointer.
    pub kind: char,
}

impl PlaceholderToken {
    pub fn to_signature(&self) -> String {
        format!("{}${}", self.index, self.kind)
    }
}

/// Extracts the arguments `input` consumes, in occurrence order.
///
/// `%%` and stray `%` signs are ignored; `*` widths and precisions count as
/// integer arguments.
pub fn extract_placeholders(input: &str) -> Vec<PlaceholderToken> {
    let mut next = 1;
    let mut out = Vec::new();

    for segment in segments(input) {
        let Segment::Spec(spec) = segment else {
            continue;
        };
        for count in [spec.width, spec.precision] {
            match count {
                Some(Count::Next) => {
                    out.push(PlaceholderToken { index: next, kind: 'd' });
                    next += 1;
                }
                Some(Count::Arg(n)) => out.push(PlaceholderToken { index: n, kind: 'd' }),
                _ => {}
            }
        }
        let index = spec.position.unwrap_or_else(|| {
            next += 1;
            next - 1
        });
        out.push(PlaceholderToken {
            index,
            kind: canonical_kind_char(spec.conversion),
        });
    }

    out
}

/// Builds a normalized signature: one `n$kind` entry per argument, sorted by
/// position, so `%s %d` and `%2$d %1$s` compare equal.
pub fn signature(input: &str) -> Vec<String> {
    let mut tokens = extract_placeholders(input);
    tokens.sort_by_key(|t| t.index);
    tokens.dedup();
    tokens.iter().map(PlaceholderToken::to_signature).collect()
}

/// Returns `true` when both strings consume the same arguments.
pub fn placeholders_match(a: &str, b: &str) -> bool {
    signature(a) == signature(b)
}

fn canonical_kind_char(ch: char) -> char {
    match ch {
        'd' | 'i' => 'd',
        'u' | 'o' | 'x' | 'X' => 'u',
        'f' | 'F' | 'e' | 'E' | 'g' | 'G' => 'f',
        '@' | 's' => 's',
        c => c,
    }
}

/// Replaces every format specifier with a `__PHn__` token.
///
/// Returns the masked text and the original specifiers, indexed by `n`.
pub fn mask_placeholders(input: &str) -> (String, Vec<String>) {
    let mut originals = Vec::new();
    let masked = SPECIFIER_REGEX.replace_all(input, |caps: &regex::Captures| {
        originals.push(caps[0].to_string());
        format!("__PH{}__", originals.len() - 1)
    });
    (masked.into_owned(), originals)
}

/// Restores the specifiers hidden by [`mask_placeholders`].
///
/// Tolerates the case and spacing changes translators tend to introduce.
/// Returns `None` when a token is missing or unknown, since the translated
/// text can no longer be formatted safely.
pub fn unmask_placeholders(input: &str, originals: &[String]) -> Option<String> {
    let mut seen = vec![false; originals.len()];
    let mut unknown = false;

    let restored = MASK_REGEX.replace_all(input, |caps: &regex::Captures| {
        match caps[1].parse::<usize>().ok().filter(|&n| n < originals.len()) {
            Some(n) => {
                seen[n] = true;
                originals[n].clone()
            }
            None => {
                unknown = true;
                caps[0].to_string()
            }
        }
    });

    (!unknown && seen.iter().all(|&s| s)).then(|| restored.into_owned())
}
