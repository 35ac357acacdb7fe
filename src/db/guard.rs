//! Input hardening for SQL fragments supplied by the client.
//!
//! Table/column names and WHERE conditions arrive as free strings and end up
//! inside SQL text, so they pass through these validators before any
//! statement is prepared. Identifiers must be plain `[A-Za-z_][A-Za-z0-9_]*`
//! words; conditions are checked token by token against a closed set
//! (identifiers, literals, comparison operators, boolean connectives,
//! balanced parentheses). Statement separators and comment introducers are
//! rejected outright.

use crate::types::{Error, Result};

/// Validate a table or column name.
pub fn validate_identifier(name: &str, what: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::validation(format!(
            "Invalid {what} name: '{name}'"
        )))
    }
}

/// Validate a column selection list: `*` or comma-separated identifiers.
pub fn validate_column_list(columns: &str) -> Result<()> {
    let columns = columns.trim();
    if columns == "*" {
        return Ok(());
    }
    if columns.is_empty() {
        return Err(Error::validation("Column list cannot be empty"));
    }
    for column in columns.split(',') {
        validate_identifier(column.trim(), "column")?;
    }
    Ok(())
}

/// Validate a WHERE condition at the token level.
///
/// Accepts bare words (column names and SQL keywords like `AND`, `NOT`,
/// `LIKE`, `IN`), numeric and single-quoted string literals, comparison
/// operators, commas, and balanced parentheses. Anything else, notably `;`,
/// `--` and `/*`, is rejected with the offending token named. Statement
/// stacking and comment smuggling are impossible within this token set.
pub fn validate_condition(condition: &str) -> Result<()> {
    let bytes = condition.as_bytes();
    let mut i = 0;
    let mut depth = 0i32;

    while i < bytes.len() {
        let c = bytes[i] as char;
        match c {
            c if c.is_ascii_whitespace() => i += 1,
            '(' => {
                depth += 1;
                i += 1;
            }
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(Error::validation("Unbalanced parentheses in condition"));
                }
                i += 1;
            }
            ',' => i += 1,
            '\'' => {
                // Single-quoted string literal with '' escaping
                i += 1;
                loop {
                    match bytes.get(i) {
                        Some(b'\'') if bytes.get(i + 1) == Some(&b'\'') => i += 2,
                        Some(b'\'') => {
                            i += 1;
                            break;
                        }
                        Some(_) => i += 1,
                        None => {
                            return Err(Error::validation(
                                "Unterminated string literal in condition",
                            ))
                        }
                    }
                }
            }
            '=' => i += 1,
            '<' | '>' => {
                i += 1;
                if matches!(bytes.get(i), Some(b'=') | Some(b'>')) {
                    i += 1;
                }
            }
            '!' => {
                if bytes.get(i + 1) == Some(&b'=') {
                    i += 2;
                } else {
                    return Err(Error::validation("Invalid token in condition: '!'"));
                }
            }
            '-' => {
                if bytes.get(i + 1) == Some(&b'-') {
                    return Err(Error::validation("Invalid token in condition: '--'"));
                }
                // Unary minus on a numeric literal
                if bytes.get(i + 1).is_some_and(u8::is_ascii_digit) {
                    i += 1;
                } else {
                    return Err(Error::validation("Invalid token in condition: '-'"));
                }
            }
            '/' => {
                let token = if bytes.get(i + 1) == Some(&b'*') { "/*" } else { "/" };
                return Err(Error::validation(format!(
                    "Invalid token in condition: '{token}'"
                )));
            }
            c if c.is_ascii_digit() => {
                i += 1;
                while bytes
                    .get(i)
                    .is_some_and(|b| b.is_ascii_digit() || *b == b'.')
                {
                    i += 1;
                }
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                i += 1;
                while bytes
                    .get(i)
                    .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
                {
                    i += 1;
                }
            }
            other => {
                return Err(Error::validation(format!(
                    "Invalid token in condition: '{other}'"
                )))
            }
        }
    }

    if depth != 0 {
        return Err(Error::validation("Unbalanced parentheses in condition"));
    }
    Ok(())
}
