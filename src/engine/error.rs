use thiserror::Error;

/// Structural failures of series arithmetic. Data insufficiency is not an error; operators
/// signal it with `None` instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeriesError {
    #[error("series '{id}' has length {left} but operand has length {right}")]
    LengthMismatch {
        id: String,
        left: usize,
        right: usize,
    },

    #[error("series id '{left}' does not match operand id '{right}'")]
    IdentityMismatch { left: String, right: String },

    #[error("operand dataset has no series '{id}'")]
    MissingSeries { id: String },
}

pub type SeriesResult<T> = Result<T, SeriesError>;
