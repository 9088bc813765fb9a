//! SQL statement validator.
//!
//! Guards the free-form SQL mode against destructive statements. Keyword
//! checks only look at SQL code: string literals, quoted identifiers and
//! comments are blanked out first.

use crate::errors::AppError;

/// Validates SQL statements for security.
pub struct SqlValidator;

/// Keywords that are rejected wherever they appear as a whole word.
const FORBIDDEN_KEYWORDS: [&str; 3] = ["DROP", "TRUNCATE", "ALTER"];

impl SqlValidator {
    /// Validates a SQL statement for forbidden operations.
    ///
    /// # Errors
    /// Returns `AppError::Validation` for blank input or more than one
    /// statement, and `AppError::UnsafeSql` if a forbidden keyword (or
    /// `DELETE FROM`) is found.
    pub fn validate(sql: &str) -> Result<(), AppError> {
        if sql.trim().is_empty() {
            return Err(AppError::Validation("SQL statement is required".into()));
        }

        let code = code_only(sql);
        let words = words(&code);
        for keyword in FORBIDDEN_KEYWORDS {
            if words.iter().any(|w| w == keyword) {
                return Err(AppError::UnsafeSql(format!("forbidden operation: {}", keyword)));
            }
        }
        if words.windows(2).any(|w| w[0] == "DELETE" && w[1] == "FROM") {
            return Err(AppError::UnsafeSql("forbidden operation: DELETE FROM".into()));
        }

        let statements = code.split(';').filter(|s| !s.trim().is_empty()).count();
        if statements > 1 {
            return Err(AppError::Validation(
                "only a single SQL statement can be run at a time".into(),
            ));
        }
        Ok(())
    }

    /// Checks if the SQL is a SELECT query.
    pub fn is_select(sql: &str) -> bool {
        words(&code_only(sql))
            .first()
            .is_some_and(|w| w == "SELECT" || w == "WITH")
    }
}

/// Upper-cased words, split on anything that can't be part of an identifier.
fn words(code: &str) -> Vec<String> {
    code.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .map(str::to_uppercase)
        .collect()
}

/// Replaces `'...'` literals, `"..."` identifiers, `$tag$...$tag$` bodies and
/// `--` / `/* */` comments with a single space each.
fn code_only(sql: &str) -> String {
    let chars: Vec<char> = sql.chars().collect();
    let mut out = String::with_capacity(sql.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        match c {
            // A doubled quote closes and immediately reopens, which skips it too.
            '\'' | '"' => {
                i += 1;
                while i < chars.len() && chars[i] != c {
                    i += 1;
                }
                i += 1;
                out.push(' ');
            }
            '-' if next == Some('-') => {
                while i < chars.len() && chars[i] != '\n' {
                    i += 1;
                }
                out.push(' ');
            }
            '/' if next == Some('*') => {
                i += 2;
                while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                    i += 1;
                }
                i += 2;
                out.push(' ');
            }
            '$' => match dollar_tag_len(&chars[i..]) {
                Some(len) => {
                    let tag = &chars[i..i + len];
                    i += len;
                    while i < chars.len() && !chars[i..].starts_with(tag) {
                        i += 1;
                    }
                    i += len;
                    out.push(' ');
                }
                None => {
                    out.push(c);
                    i += 1;
                }
            },
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

/// Length of a `$tag$` opener at the start of `chars`. Positional parameters
/// such as `$1` are not tags.
fn dollar_tag_len(chars: &[char]) -> Option<usize> {
    let mut j = 1;
    while j < chars.len() && (chars[j].is_alphanumeric() || chars[j] == '_') {
        j += 1;
    }
    let starts_with_digit = chars.get(1).is_some_and(|c| c.is_ascii_digit());
    (j < chars.len() && chars[j] == '$' && !starts_with_digit).then_some(j + 1)
}
