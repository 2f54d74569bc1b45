//! printf-style formatting over a typed argument list.
//!
//! Localized strings keep their C format specifiers, so translated text can
//! reorder arguments with positional conversions (`%2$s %1$s`). Supported:
//! flags `-+ 0#'`, width and precision (literal, `*` or `*n$`), length
//! modifiers (parsed and ignored), and the conversions
//! `d i u o x X c s @ f F e E g G p %`.

use std::fmt::Write as _;

use crate::error::Error;

/// One argument for [`sprintf`].
#[derive(Debug, Clone, PartialEq)]
pub enum FormatArg {
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    Char(char),
}

macro_rules! impl_from_arg {
    ($variant:ident as $target:ty: $($source:ty),*) => {
        $(impl From<$source> for FormatArg {
            fn from(value: $source) -> Self {
                FormatArg::$variant(value as $target)
            }
        })*
    };
}

impl_from_arg!(Int as i64: i8, i16, i32, i64, isize);
impl_from_arg!(UInt as u64: u8, u16, u32, u64, usize);
impl_from_arg!(Float as f64: f32, f64);

impl From<char> for FormatArg {
    fn from(value: char) -> Self {
        FormatArg::Char(value)
    }
}

impl From<&str> for FormatArg {
    fn from(value: &str) -> Self {
        FormatArg::Str(value.to_string())
    }
}

impl From<String> for FormatArg {
    fn from(value: String) -> Self {
        FormatArg::Str(value)
    }
}

/// Width or precision given as a literal or taken from an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    Literal(usize),
    /// `*`: next sequential argument.
    Next,
    /// `*n$`: argument `n` (1-based).
    Arg(usize),
}

/// A parsed conversion specification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spec {
    /// 1-based `n$` position, if given.
    pub position: Option<usize>,
    pub left: bool,
    pub plus: bool,
    pub space: bool,
    pub zero: bool,
    pub alt: bool,
    pub width: Option<Count>,
    pub precision: Option<Count>,
    pub conversion: char,
}

/// Piece of a parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Percent,
    Spec(Spec),
}

const CONVERSIONS: &[u8] = b"diuoxXcs@fFeEgGp";

/// Parses the specification starting at `bytes[start]`, which must be `%`.
///
/// Returns the spec and the index just past it, or `None` if the text is not
/// a complete conversion.
pub fn parse_spec(bytes: &[u8], start: usize) -> Option<(Segment<'static>, usize)> {
    let mut i = start + 1;
    if bytes.get(i) == Some(&b'%') {
        return Some((Segment::Percent, i + 1));
    }

    let mut spec = Spec {
        position: None,
        left: false,
        plus: false,
        space: false,
        zero: false,
        alt: false,
        width: None,
        precision: None,
        conversion: ' ',
    };

    if let Some((n, next)) = digits(bytes, i)
        && bytes.get(next) == Some(&b'$')
        && n > 0
    {
        spec.position = Some(n);
        i = next + 1;
    }

    while let Some(&b) = bytes.get(i) {
        match b {
            b'-' => spec.left = true,
            b'+' => spec.plus = true,
            b' ' => spec.space = true,
            b'0' => spec.zero = true,
            b'#' => spec.alt = true,
            b'\'' => {}
            _ => break,
        }
        i += 1;
    }

    let (width, next) = count(bytes, i)?;
    spec.width = width;
    i = next;

    if bytes.get(i) == Some(&b'.') {
        let (precision, next) = count(bytes, i + 1)?;
        spec.precision = Some(precision.unwrap_or(Count::Literal(0)));
        i = next;
    }

    while let Some(&b) = bytes.get(i) {
        if matches!(b, b'h' | b'l' | b'j' | b'z' | b't' | b'L' | b'q') {
            i += 1;
        } else {
            break;
        }
    }

    let conversion = *bytes.get(i)?;
    if !CONVERSIONS.contains(&conversion) {
        return None;
    }
    spec.conversion = conversion as char;
    Some((Segment::Spec(spec), i + 1))
}

fn digits(bytes: &[u8], start: usize) -> Option<(usize, usize)> {
    let mut end = start;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if end == start {
        return None;
    }
    let value = std::str::from_utf8(&bytes[start..end]).ok()?.parse().ok()?;
    Some((value, end))
}

/// Parses a width/precision; `Some((None, i))` when absent.
fn count(bytes: &[u8], start: usize) -> Option<(Option<Count>, usize)> {
    if bytes.get(start) == Some(&b'*') {
        if let Some((n, next)) = digits(bytes, start + 1)
            && bytes.get(next) == Some(&b'$')
        {
            return (n > 0).then_some((Some(Count::Arg(n)), next + 1));
        }
        return Some((Some(Count::Next), start + 1));
    }
    match digits(bytes, start) {
        Some((n, next)) => Some((Some(Count::Literal(n)), next)),
        None => Some((None, start)),
    }
}

/// Splits a format string into literal text and conversion specs.
///
/// A `%` that does not start a valid conversion is kept as literal text.
pub fn segments(format: &str) -> Vec<Segment<'_>> {
    let bytes = format.as_bytes();
    let mut out = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        match parse_spec(bytes, i) {
            Some((segment, end)) => {
                if literal_start < i {
                    out.push(Segment::Literal(&format[literal_start..i]));
                }
                out.push(segment);
                i = end;
                literal_start = end;
            }
            None => i += 1,
        }
    }

    if literal_start < bytes.len() {
        out.push(Segment::Literal(&format[literal_start..]));
    }
    out
}

struct Args<'a> {
    args: &'a [FormatArg],
    next: usize,
}

impl<'a> Args<'a> {
    fn take(&mut self, position: Option<usize>) -> Result<&'a FormatArg, Error> {
        let index = match position {
            Some(n) => n - 1,
            None => {
                let index = self.next;
                self.next += 1;
                index
            }
        };
        self.args
            .get(index)
            .ok_or_else(|| Error::Format(format!("missing argument {}", index + 1)))
    }

    fn count(&mut self, count: Option<Count>) -> Result<Option<(usize, bool)>, Error> {
        let arg = match count {
            None => return Ok(None),
            Some(Count::Literal(n)) => return Ok(Some((n, false))),
            Some(Count::Next) => self.take(None)?,
            Some(Count::Arg(n)) => self.take(Some(n))?,
        };
        match arg {
            FormatArg::Int(v) => Ok(Some((v.unsigned_abs() as usize, *v < 0))),
            FormatArg::UInt(v) => Ok(Some((*v as usize, false))),
            other => Err(Error::Format(format!(
                "width/precision argument must be an integer, got {:?}",
                other
            ))),
        }
    }
}

/// Widths and precisions above C's `INT_MAX` are rejected, as `snprintf`
/// fails with `EOVERFLOW` for them.
pub const MAX_FIELD: usize = i32::MAX as usize;

/// Float digits computed exactly; any further requested digits are zeros.
const MAX_FLOAT_DIGITS: usize = 1100;

/// Output buffer that stops growing at `limit` bytes.
struct Output {
    buf: String,
    limit: usize,
    full: bool,
}

impl Output {
    fn new(limit: usize, hint: usize) -> Self {
        Output {
            buf: String::with_capacity(hint.min(limit)),
            limit,
            full: false,
        }
    }

    fn push_str(&mut self, s: &str) {
        if self.full {
            return;
        }
        let room = self.limit - self.buf.len();
        if s.len() <= room {
            self.buf.push_str(s);
            return;
        }
        let mut end = room;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.buf.push_str(&s[..end]);
        self.full = true;
    }

    /// Appends `n` copies of the ASCII byte `c`.
    fn push_repeat(&mut self, c: char, n: usize) {
        if self.full || n == 0 {
            return;
        }
        let room = self.limit - self.buf.len();
        if n > room {
            self.full = true;
        }
        self.buf.extend(std::iter::repeat_n(c, n.min(room)));
    }
}

/// Formats `format` with `args`, C `snprintf` style, without truncation.
pub fn sprintf(format: &str, args: &[FormatArg]) -> Result<String, Error> {
    snprintf(usize::MAX, format, args)
}

/// Formats `format` with `args` into at most `limit` bytes.
///
/// Output past the limit is never produced, so a huge width or precision
/// costs no more than `limit` bytes. The result is cut on a character
/// boundary. Errors are still reported for every conversion.
pub fn snprintf(limit: usize, format: &str, args: &[FormatArg]) -> Result<String, Error> {
    let mut out = Output::new(limit, format.len() + 16);
    let mut args = Args { args, next: 0 };

    for segment in segments(format) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Percent => out.push_str("%"),
            Segment::Spec(mut spec) => {
                // A negative `*` width means left-justify.
                let width = match args.count(spec.width)? {
                    Some((w, negative)) => {
                        spec.left |= negative;
                        field(w, "width")?
                    }
                    None => 0,
                };
                // A negative `*` precision is treated as absent.
                let precision = match args.count(spec.precision)? {
                    Some((_, true)) | None => None,
                    Some((p, false)) => Some(field(p, "precision")?),
                };
                let value = args.take(spec.position)?;
                let body = convert(&spec, precision, value)?;
                pad(&mut out, &spec, width, precision, &body);
            }
        }
    }

    Ok(out.buf)
}

fn field(value: usize, what: &str) -> Result<usize, Error> {
    if value > MAX_FIELD {
        return Err(Error::Format(format!("field {} {} too large", what, value)));
    }
    Ok(value)
}

/// Converted text split into parts so padding can go between them and long
/// zero runs are never materialized.
struct Body {
    /// Sign or radix prefix.
    prefix: String,
    /// Zeros from an integer precision, before `digits`.
    zeros: usize,
    digits: String,
    /// Zeros for float precision beyond the exactly computed digits.
    trailing_zeros: usize,
    /// Exponent of `%e` / `%g`.
    suffix: String,
    numeric: bool,
}

impl Body {
    fn text(prefix: String, digits: String, numeric: bool) -> Self {
        Body {
            prefix,
            zeros: 0,
            digits,
            trailing_zeros: 0,
            suffix: String::new(),
            numeric,
        }
    }

    fn len(&self) -> usize {
        (self.prefix.chars().count() + self.digits.chars().count() + self.suffix.len())
            .saturating_add(self.zeros)
            .saturating_add(self.trailing_zeros)
    }
}

fn convert(spec: &Spec, precision: Option<usize>, value: &FormatArg) -> Result<Body, Error> {
    let mismatch = || {
        Error::Format(format!(
            "argument {:?} does not match %{}",
            value, spec.conversion
        ))
    };

    let body = match spec.conversion {
        'd' | 'i' => {
            let (negative, magnitude) = match value {
                FormatArg::Int(v) => (*v < 0, v.unsigned_abs()),
                FormatArg::UInt(v) => (false, *v),
                FormatArg::Char(c) => (false, *c as u64),
                _ => return Err(mismatch()),
            };
            let (digits, zeros) = with_precision(magnitude.to_string(), magnitude, precision);
            Body {
                zeros,
                ..Body::text(sign(negative, spec).to_string(), digits, true)
            }
        }
        'u' | 'o' | 'x' | 'X' => {
            let v = match value {
                FormatArg::Int(v) => *v as u64,
                FormatArg::UInt(v) => *v,
                FormatArg::Char(c) => *c as u64,
                _ => return Err(mismatch()),
            };
            let raw = match spec.conversion {
                'u' => v.to_string(),
                'o' => format!("{:o}", v),
                'x' => format!("{:x}", v),
                _ => format!("{:X}", v),
            };
            let (mut digits, zeros) = with_precision(raw, v, precision);
            let mut prefix = String::new();
            if spec.alt {
                match spec.conversion {
                    'o' if zeros == 0 && !digits.starts_with('0') => digits.insert(0, '0'),
                    'x' if v != 0 => prefix.push_str("0x"),
                    'X' if v != 0 => prefix.push_str("0X"),
                    _ => {}
                }
            }
            Body {
                zeros,
                ..Body::text(prefix, digits, true)
            }
        }
        'c' => {
            let ch = match value {
                FormatArg::Char(c) => *c,
                FormatArg::Int(v) => u32::try_from(*v)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(mismatch)?,
                FormatArg::UInt(v) => u32::try_from(*v)
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(mismatch)?,
                _ => return Err(mismatch()),
            };
            Body::text(String::new(), ch.to_string(), false)
        }
        's' | '@' => {
            let text = match value {
                FormatArg::Str(s) => s.clone(),
                FormatArg::Int(v) => v.to_string(),
                FormatArg::UInt(v) => v.to_string(),
                FormatArg::Float(v) => v.to_string(),
                FormatArg::Char(c) => c.to_string(),
            };
            let digits = match precision {
                Some(p) => text.chars().take(p).collect(),
                None => text,
            };
            Body::text(String::new(), digits, false)
        }
        'f' | 'F' | 'e' | 'E' | 'g' | 'G' => {
            let v = match value {
                FormatArg::Float(v) => *v,
                FormatArg::Int(v) => *v as f64,
                FormatArg::UInt(v) => *v as f64,
                _ => return Err(mismatch()),
            };
            let negative = v.is_sign_negative() && !v.is_nan();
            let float = format_float(v.abs(), spec.conversion, precision.unwrap_or(6), spec.alt);
            Body {
                prefix: sign(negative, spec).to_string(),
                zeros: 0,
                digits: float.mantissa,
                trailing_zeros: float.trailing_zeros,
                suffix: float.exponent,
                numeric: v.is_finite(),
            }
        }
        'p' => {
            let v = match value {
                FormatArg::UInt(v) => *v,
                FormatArg::Int(v) => *v as u64,
                _ => return Err(mismatch()),
            };
            Body::text("0x".to_string(), format!("{:x}", v), true)
        }
        other => {
            return Err(Error::Format(format!("unsupported conversion %{}", other)));
        }
    };

    Ok(body)
}

fn sign(negative: bool, spec: &Spec) -> &'static str {
    if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    }
}

/// Digits and the number of zeros to put in front of them.
fn with_precision(raw: String, value: u64, precision: Option<usize>) -> (String, usize) {
    match precision {
        Some(0) if value == 0 => (String::new(), 0),
        Some(p) if raw.len() < p => {
            let zeros = p - raw.len();
            (raw, zeros)
        }
        _ => (raw, 0),
    }
}

struct Float {
    mantissa: String,
    trailing_zeros: usize,
    exponent: String,
}

impl Float {
    fn new(text: String, trailing_zeros: usize, upper: bool) -> Self {
        let text = if upper { text.to_ascii_uppercase() } else { text };
        let (mantissa, exponent) = match text.find(['e', 'E']) {
            Some(idx) => {
                let (m, e) = text.split_at(idx);
                (m.to_string(), e.to_string())
            }
            None => (text, String::new()),
        };
        Float {
            mantissa,
            trailing_zeros,
            exponent,
        }
    }
}

fn format_float(v: f64, conversion: char, precision: usize, alt: bool) -> Float {
    let upper = conversion.is_ascii_uppercase();
    if !v.is_finite() {
        let text = if v.is_nan() { "nan" } else { "inf" };
        return Float::new(text.to_string(), 0, upper);
    }

    let exact = precision.min(MAX_FLOAT_DIGITS);
    match conversion.to_ascii_lowercase() {
        'f' => {
            let mut s = format!("{:.*}", exact, v);
            if alt && precision == 0 {
                s.push('.');
            }
            Float::new(s, precision - exact, upper)
        }
        'e' => Float::new(exponential(v, exact, alt), precision - exact, upper),
        _ => {
            let p = precision.max(1);
            let exact = p.min(MAX_FLOAT_DIGITS);
            let exponent = decimal_exponent(v, exact);
            let mut s = if exponent < -4 || exponent >= p as i32 {
                exponential(v, exact - 1, alt)
            } else {
                format!("{:.*}", (exact as i32 - 1 - exponent).max(0) as usize, v)
            };
            if !alt {
                s = strip_trailing_zeros(&s);
            }
            let extra = if alt { p - exact } else { 0 };
            Float::new(s, extra, upper)
        }
    }
}

/// Exponent of `v` after rounding to `significant` digits.
fn decimal_exponent(v: f64, significant: usize) -> i32 {
    if v == 0.0 {
        return 0;
    }
    let formatted = format!("{:.*e}", significant - 1, v);
    formatted
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0)
}

/// C `%e` layout: `d.ddde+XX`.
fn exponential(v: f64, precision: usize, alt: bool) -> String {
    let formatted = format!("{:.*e}", precision, v);
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);

    let mut out = String::with_capacity(formatted.len() + 3);
    out.push_str(mantissa);
    if alt && precision == 0 {
        out.push('.');
    }
    let _ = write!(
        out,
        "e{}{:02}",
        if exponent < 0 { '-' } else { '+' },
        exponent.unsigned_abs()
    );
    out
}

fn strip_trailing_zeros(s: &str) -> String {
    let (mantissa, exponent) = match s.find('e') {
        Some(idx) => s.split_at(idx),
        None => (s, ""),
    };
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    format!("{}{}", mantissa, exponent)
}

fn pad(out: &mut Output, spec: &Spec, width: usize, precision: Option<usize>, body: &Body) {
    let fill = width.saturating_sub(body.len());

    if spec.left {
        push_body(out, body);
        out.push_repeat(' ', fill);
        return;
    }

    let integer = matches!(spec.conversion, 'd' | 'i' | 'u' | 'o' | 'x' | 'X');
    let zero_pad = spec.zero && body.numeric && !(integer && precision.is_some());
    if zero_pad {
        out.push_str(&body.prefix);
        out.push_repeat('0', fill);
    } else {
        out.push_repeat(' ', fill);
        out.push_str(&body.prefix);
    }
    push_digits(out, body);
}

fn push_body(out: &mut Output, body: &Body) {
    out.push_str(&body.prefix);
    push_digits(out, body);
}

fn push_digits(out: &mut Output, body: &Body) {
    out.push_repeat('0', body.zeros);
    out.push_str(&body.digits);
    out.push_repeat('0', body.trailing_zeros);
    out.push_str(&body.suffix);
}
