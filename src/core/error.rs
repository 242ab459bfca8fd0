use super::Weekday;
use thiserror::Error;

/// Malformed or inconsistent scheduling input.
/// Detected before any solving attempt.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ValidationError {
    #[error("schedule must contain at least one person")]
    NoPeople,

    #[error("dutiesPerPerson must be positive, got {0}")]
    NonPositiveDuties(i64),

    #[error("person at index {index} has an empty name")]
    EmptyName { index: usize },

    #[error("person name `{0}` is used more than once")]
    DuplicateName(String),

    #[error("person `{person}` lists hour {hour} on {day}, which is outside operating hours")]
    HourOutOfRange {
        person: String,
        day: Weekday,
        hour: i64,
    },

    #[error("operating hour {hour} on {day} must be within 1..=99")]
    InvalidOperatingHour { day: Weekday, hour: i64 },
}

/// Failure to acquire or release the resources of a solver backend.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("solver `{solver}` failed to acquire its context: {message}")]
pub struct ResourceError {
    pub solver: String,
    pub message: String,
}

impl ResourceError {
    /// Creates a new resource error for the named solver.
    #[must_use]
    pub fn new(solver: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            solver: solver.into(),
            message: message.into(),
        }
    }
}

/// Misuse of the constraint instance builder.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum CspError {
    #[error("variable `{0}` is declared twice")]
    DuplicateVariable(String),

    #[error("constraint references undeclared variable #{0}")]
    UndeclaredVariable(usize),
}

/// Everything that can go wrong while assigning duties.
/// Infeasibility and indeterminacy are outcomes, not errors.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resource(#[from] ResourceError),

    #[error("failed to encode schedule: {0}")]
    Encoding(#[from] CspError),

    #[error("solver returned a model that is not a valid assignment: {0}")]
    InvalidModel(String),
}
