use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChorusError {
    #[error("script contains no lines")]
    EmptyScript,
    #[error("voice list is empty")]
    EmptyVoices,
    #[error("endpoint {0} already registered")]
    AlreadyRegistered(String),
}

pub type ChorusResult<T, E = ChorusError> = Result<T, E>;
