//! Number list parser for raw recognizer output
//!
//! Accepts comma or whitespace separated values, optionally wrapped in
//! brackets, so both `0,0,1,3` and `"[0, 0, 1, 3]"` work.

use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Empty value list")]
    EmptyInput,

    #[error("Mismatched brackets in: {input}")]
    MismatchedBrackets { input: String },

    #[error("Invalid value at position {position}: {value}")]
    InvalidValue { position: usize, value: String },
}

/// Parse a list of numbers
pub fn parse_list<T: FromStr>(input: &str) -> Result<Vec<T>, ParseError> {
    let body = strip_brackets(input.trim())?;
    if body.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }

    body.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(position, token)| {
            token.parse().map_err(|_| ParseError::InvalidValue {
                position,
                value: token.to_string(),
            })
        })
        .collect()
}

fn strip_brackets(input: &str) -> Result<&str, ParseError> {
    match (input.starts_with('['), input.ends_with(']')) {
        (true, true) if input.len() >= 2 => Ok(&input[1..input.len() - 1]),
        (false, false) if !input.contains(['[', ']']) => Ok(input),
        _ => Err(ParseError::MismatchedBrackets {
            input: input.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_separated() {
        assert_eq!(parse_list::<i32>("0,0,1,3,3,2").unwrap(), vec![0, 0, 1, 3, 3, 2]);
    }

    #[test]
    fn test_bracketed_with_spaces() {
        assert_eq!(
            parse_list::<f32>("[0.9, 0.5, 0.8]").unwrap(),
            vec![0.9, 0.5, 0.8]
        );
    }

    #[test]
    fn test_whitespace_separated() {
        assert_eq!(parse_list::<i32>("1 2  3").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty() {
        assert!(matches!(parse_list::<i32>("  "), Err(ParseError::EmptyInput)));
        assert!(matches!(parse_list::<i32>("[]"), Err(ParseError::EmptyInput)));
    }

    #[test]
    fn test_mismatched_brackets() {
        assert!(matches!(
            parse_list::<i32>("[1,2"),
            Err(ParseError::MismatchedBrackets { .. })
        ));
        assert!(matches!(
            parse_list::<i32>("1,[2"),
            Err(ParseError::MismatchedBrackets { .. })
        ));
    }

    #[test]
    fn test_invalid_value() {
        match parse_list::<i32>("1,x,3") {
            Err(ParseError::InvalidValue { position, value }) => {
                assert_eq!(position, 1);
                assert_eq!(value, "x");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
