use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NaError {
    #[error("invalid argument shape: {0}")]
    InvalidArgumentShape(String),
    #[error("invalid argument value: {0}")]
    InvalidArgumentValue(String),
    #[error("cannot resolve column name {0}")]
    UnresolvedColumn(String),
    #[error("to_replace and value lists should be of the same length, got {0} and {1}")]
    LengthMismatch(usize, usize),
}
