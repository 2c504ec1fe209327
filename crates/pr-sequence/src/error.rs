use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("cannot sequence an empty time matrix")]
    EmptyMatrix,

    #[error("depot index {depot} out of range for {n} stops")]
    DepotOutOfRange { depot: usize, n: usize },

    #[error("unknown cluster mode {0:?} (expected fast, efficient, or thorough)")]
    UnknownClusterMode(String),
}

pub type SequenceResult<T> = Result<T, SequenceError>;
