use thiserror::Error;

/// Malformed recurrence rule parameters, reported by `RuleBuilder::build`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("Invalid rule: count and end bound are mutually exclusive")]
    ConflictingTermination,

    #[error("Invalid rule: interval must be at least 1")]
    ZeroInterval,

    #[error("Invalid rule: {field} value {value} is outside {domain}")]
    FieldOutOfDomain {
        field: &'static str,
        value: i64,
        domain: &'static str,
    },

    #[error("Invalid rule: max year {0} is outside 1..=9999")]
    InvalidHorizon(i32),
}

/// Malformed or unrepresentable calendar offsets.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OffsetError {
    #[error("Invalid offset: {field} value {value} is outside {domain}")]
    InvalidField {
        field: &'static str,
        value: i64,
        domain: &'static str,
    },

    #[error("Offset result is outside the representable calendar")]
    OutOfRange,
}

/// Any error produced by this crate.
#[derive(Error, Debug)]
pub enum RecurError {
    #[error(transparent)]
    Rule(#[from] RuleError),

    #[error(transparent)]
    Offset(#[from] OffsetError),

    #[error(transparent)]
    CoreError(#[from] calends_core::error::CoreError),
}

pub type RuleResult<T> = std::result::Result<T, RuleError>;
pub type OffsetResult<T> = std::result::Result<T, OffsetError>;
pub type RecurResult<T> = std::result::Result<T, RecurError>;
