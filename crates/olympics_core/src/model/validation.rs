//! Field constraint checks shared by all write paths.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub const TEAM_CODE_MAX_CHARS: usize = 3;
pub const MEDAL_MAX_CHARS: usize = 6;

/// Caller-supplied field violates a storage constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    BlankField(&'static str),
    TooLong {
        field: &'static str,
        max_chars: usize,
        actual_chars: usize,
    },
    Negative(&'static str),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "`{field}` must not be blank"),
            Self::TooLong {
                field,
                max_chars,
                actual_chars,
            } => write!(
                f,
                "`{field}` allows at most {max_chars} characters, got {actual_chars}"
            ),
            Self::Negative(field) => write!(f, "`{field}` must not be negative"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

pub(crate) fn require_max_chars(
    field: &'static str,
    value: &str,
    max_chars: usize,
) -> Result<(), ValidationError> {
    let actual_chars = value.chars().count();
    if actual_chars > max_chars {
        return Err(ValidationError::TooLong {
            field,
            max_chars,
            actual_chars,
        });
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &'static str, value: i32) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::Negative(field));
    }
    Ok(())
}
