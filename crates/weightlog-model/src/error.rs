// SPDX-License-Identifier: Apache-2.0

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParseError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{0} must be at least {1} characters")]
    TooShort(&'static str, usize),
    #[error("{0} exceeds max length {1}")]
    TooLong(&'static str, usize),
    #[error("{field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl ParseError {
    /// Name of the offending field, as it appears on the wire.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::Empty(field) | Self::TooShort(field, _) | Self::TooLong(field, _) => field,
            Self::Invalid { field, .. } => field,
        }
    }
}
