//! Tokenizer for the values of one trace sample
//!
//! Grammar of a value (InkML 2011, section 3.2.1):
//!
//! ```text
//! value     := qualifier? sign? (decimal | hex) | "T" | "F" | "*" | "?" | "0.."
//! qualifier := "!" | "'" | "\""
//! hex       := "#" [0-9A-F]+
//! ```
//!
//! Values are usually separated by whitespace, but the separator may be
//! dropped where the boundary is unambiguous (`'1'-2`, `-1-2`).

use once_cell::sync::Lazy;
use regex::Regex;

static VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"0\.\.|[*?]|(?:[!'"]\s*)?(?:-\s*)?#[0-9A-Fa-f]+|(?:[!'"]\s*)?(?:-\s*)?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?|[TF]"#,
    )
    .expect("value pattern is valid")
});

/// How a numeric value relates to the previous value of its channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qualifier {
    /// `!` absolute value
    Explicit,
    /// `'` difference from the previous value
    Difference,
    /// `"` difference from the previous first difference
    SecondDifference,
}

impl Qualifier {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '!' => Some(Qualifier::Explicit),
            '\'' => Some(Qualifier::Difference),
            '"' => Some(Qualifier::SecondDifference),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Number {
        qualifier: Option<Qualifier>,
        value: f64,
        /// Source text, for error reports
        text: &'a str,
    },
    Bool(bool),
    /// `*` or `0..`: same value as in the previous sample
    Repeat,
    /// `?`: no value in this sample (intermittent channels only)
    Absent,
}

impl Token<'_> {
    pub fn text(&self) -> &str {
        match self {
            Token::Number { text, .. } => text,
            Token::Bool(true) => "T",
            Token::Bool(false) => "F",
            Token::Repeat => "*",
            Token::Absent => "?",
        }
    }
}

/// Text inside a sample that is not a value
#[derive(Debug, Clone, PartialEq)]
pub struct TokenError<'a> {
    /// Index of the value the stray text would have been
    pub position: usize,
    pub text: &'a str,
}

/// Split one sample into values
pub fn tokenize_sample(sample: &str) -> Result<Vec<Token<'_>>, TokenError<'_>> {
    let mut tokens = Vec::new();
    let mut last_end = 0;

    for m in VALUE_RE.find_iter(sample) {
        check_gap(&sample[last_end..m.start()], tokens.len())?;
        let text = m.as_str();
        let token = parse_token(text).ok_or(TokenError { position: tokens.len(), text })?;
        tokens.push(token);
        last_end = m.end();
    }
    check_gap(&sample[last_end..], tokens.len())?;

    Ok(tokens)
}

fn check_gap(gap: &str, parsed: usize) -> Result<(), TokenError<'_>> {
    let stray = gap.trim();
    if stray.is_empty() {
        return Ok(());
    }

    // Text glued to a value belongs to that value
    let glued = parsed > 0 && !gap.starts_with(char::is_whitespace);
    let position = if glued { parsed - 1 } else { parsed };
    Err(TokenError { position, text: stray })
}

fn parse_token(text: &str) -> Option<Token<'_>> {
    match text {
        "*" | "0.." => return Some(Token::Repeat),
        "?" => return Some(Token::Absent),
        "T" => return Some(Token::Bool(true)),
        "F" => return Some(Token::Bool(false)),
        _ => {}
    }

    let mut rest = text;
    let qualifier = rest.chars().next().and_then(Qualifier::from_char);
    if qualifier.is_some() {
        rest = &rest[1..];
    }

    rest = rest.trim_start();
    let negative = rest.starts_with('-');
    if negative {
        rest = rest[1..].trim_start();
    }

    let magnitude = match rest.strip_prefix('#') {
        Some(hex) => i64::from_str_radix(hex, 16).ok()? as f64,
        None => rest.parse::<f64>().ok()?,
    };
    if !magnitude.is_finite() {
        return None;
    }

    Some(Token::Number {
        qualifier,
        value: if negative { -magnitude } else { magnitude },
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(sample: &str) -> Vec<f64> {
        tokenize_sample(sample)
            .unwrap()
            .into_iter()
            .map(|t| match t {
                Token::Number { value, .. } => value,
                other => panic!("Expected number, got {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_whitespace_separated() {
        assert_eq!(values(" 10 0  -3.5 "), vec![10.0, 0.0, -3.5]);
    }

    #[test]
    fn test_unseparated_values() {
        assert_eq!(values("-1-2"), vec![-1.0, -2.0]);
        assert_eq!(values(".5.25"), vec![0.5, 0.25]);
    }

    #[test]
    fn test_qualifiers() {
        let tokens = tokenize_sample("!10'-2\"1").unwrap();
        let qualifiers: Vec<Option<Qualifier>> = tokens
            .iter()
            .map(|t| match t {
                Token::Number { qualifier, .. } => *qualifier,
                _ => None,
            })
            .collect();
        assert_eq!(
            qualifiers,
            vec![Some(Qualifier::Explicit), Some(Qualifier::Difference), Some(Qualifier::SecondDifference)]
        );
        assert_eq!(values("!10'-2\"1"), vec![10.0, -2.0, 1.0]);
    }

    #[test]
    fn test_hex_and_exponent() {
        assert_eq!(values("#1F 1.5e2"), vec![31.0, 150.0]);
    }

    #[test]
    fn test_markers() {
        let tokens = tokenize_sample("T F * ? 0..").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Bool(true), Token::Bool(false), Token::Repeat, Token::Absent, Token::Repeat]
        );
    }

    #[test]
    fn test_repeat_after_whitespace() {
        let tokens = tokenize_sample(" 0.. 25").unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], Token::Repeat);
        assert_eq!(tokens[1].text(), "25");

        let tokens = tokenize_sample("3 0.. '4").unwrap();
        assert_eq!(tokens[1], Token::Repeat);
        assert_eq!(tokens[2].text(), "'4");
    }

    #[test]
    fn test_token_text_has_no_leading_whitespace() {
        let tokens = tokenize_sample("  1   ' 2  -  3").unwrap();
        let texts: Vec<&str> = tokens.iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["1", "' 2", "-  3"]);
        assert_eq!(values("  1   ' 2  -  3"), vec![1.0, 2.0, -3.0]);
    }

    #[test]
    fn test_stray_text_is_rejected() {
        let err = tokenize_sample("10 abc").unwrap_err();
        assert_eq!(err, TokenError { position: 1, text: "abc" });
    }

    #[test]
    fn test_glued_stray_text_belongs_to_previous_value() {
        let err = tokenize_sample("10abc 0").unwrap_err();
        assert_eq!(err, TokenError { position: 0, text: "abc" });

        let err = tokenize_sample("1 2xyz").unwrap_err();
        assert_eq!(err, TokenError { position: 1, text: "xyz" });
    }

    #[test]
    fn test_overflowing_values_are_rejected() {
        let err = tokenize_sample("1e999 0").unwrap_err();
        assert_eq!(err, TokenError { position: 0, text: "1e999" });

        let err = tokenize_sample("1 -1e400").unwrap_err();
        assert_eq!(err.position, 1);
    }

    #[test]
    fn test_empty_sample() {
        assert!(tokenize_sample("   ").unwrap().is_empty());
    }
}
