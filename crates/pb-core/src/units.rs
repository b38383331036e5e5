//! CSS length values for size-like props (`padding`, `gap`, `maxWidth`, ...).
//!
//! Props arrive either as bare numbers (pixels) or as strings such as
//! `"24px"`, `"1.5rem"`, `"50%"` or `"auto"`. Anything the grammar does not
//! recognise is kept verbatim as a raw CSS value.

use serde_json::Value;
use winnow::combinator::{alt, eof, opt};
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::take_while;

/// A parsed length value.
#[derive(Debug, Clone, PartialEq)]
pub enum Length {
    Px(f64),
    Rem(f64),
    Em(f64),
    Percent(f64),
    Vw(f64),
    Vh(f64),
    Auto,
    /// Unrecognised CSS passed through as-is (e.g. `calc(...)`, `none`).
    Raw(String),
}

impl Length {
    /// Read a prop value: numbers are pixels, strings go through the grammar.
    /// `null`, empty strings, and non-scalar values yield `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).map(Length::Px),
            Value::String(s) if !s.trim().is_empty() => Some(Length::parse(s)),
            _ => None,
        }
    }

    /// Parse a length string, falling back to `Raw`.
    pub fn parse(s: &str) -> Self {
        let mut input = s;
        match parse_length.parse_next(&mut input) {
            Ok(len) => len,
            Err(_) => Length::Raw(s.trim().to_string()),
        }
    }

    /// Emit as a CSS value.
    pub fn to_css(&self) -> String {
        match self {
            Length::Px(n) => format!("{}px", format_num(*n)),
            Length::Rem(n) => format!("{}rem", format_num(*n)),
            Length::Em(n) => format!("{}em", format_num(*n)),
            Length::Percent(n) => format!("{}%", format_num(*n)),
            Length::Vw(n) => format!("{}vw", format_num(*n)),
            Length::Vh(n) => format!("{}vh", format_num(*n)),
            Length::Auto => "auto".to_string(),
            Length::Raw(s) => s.clone(),
        }
    }
}

fn parse_length(input: &mut &str) -> ModalResult<Length> {
    skip_space(input);
    let len = alt((
        "auto".value(Length::Auto),
        (parse_number, opt(parse_unit)).map(|(n, unit)| match unit {
            None | Some("px") => Length::Px(n),
            Some("rem") => Length::Rem(n),
            Some("em") => Length::Em(n),
            Some("%") => Length::Percent(n),
            Some("vw") => Length::Vw(n),
            Some(_) => Length::Vh(n),
        }),
    ))
    .parse_next(input)?;
    skip_space(input);
    eof.parse_next(input)?;
    Ok(len)
}

fn parse_unit<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    alt(("px", "rem", "em", "%", "vw", "vh")).parse_next(input)
}

fn parse_number(input: &mut &str) -> ModalResult<f64> {
    let start = *input;
    if input.starts_with('-') {
        *input = &input[1..];
    }
    let _ = take_while(1.., |c: char| c.is_ascii_digit()).parse_next(input)?;
    if input.starts_with('.') {
        *input = &input[1..];
        let _ =
            take_while::<_, _, ContextError>(0.., |c: char| c.is_ascii_digit()).parse_next(input);
    }
    let matched = &start[..start.len() - input.len()];
    matched
        .parse::<f64>()
        .map_err(|_| winnow::error::ErrMode::Backtrack(ContextError::new()))
}

/// Consume optional whitespace (concrete error type avoids inference issues).
fn skip_space(input: &mut &str) {
    use winnow::ascii::space0;
    let _: Result<&str, winnow::error::ErrMode<ContextError>> = space0.parse_next(input);
}

/// Shortest decimal form: `24.0` → `24`, `1.50` → `1.5`.
pub fn format_num(n: f64) -> String {
    if n == n.floor() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n:.3}")
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}
