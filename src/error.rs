use std::fmt;

/// Errors surfaced by the training engine.
///
/// Shape and activation errors indicate a misconfigured network and are not
/// recoverable; numeric overflow halts training instead of letting NaNs
/// propagate through subsequent batches. Running out of rows is normally
/// reported through [`BatchStatus::Exhausted`]; the `DataExhausted` variant
/// appears only where an operation has nothing at all to work with (e.g.
/// evaluating an empty dataset).
#[derive(Debug, Clone)]
pub enum Error {
    /// Activation name not found in the registry. Carries the offending name.
    UnknownActivation(String),
    /// NaN or infinity detected in a guarded numeric operation. Carries the
    /// operation name for diagnosis.
    NumericOverflow(String),
    /// Incompatible matrix dimensions. Carries the operation name and a
    /// description of the mismatch.
    ShapeMismatch { operation: String, detail: String },
    /// No rows available for an operation that requires at least one batch.
    DataExhausted,
    /// A data file could not be read or parsed into numeric rows.
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownActivation(name) => write!(f, "unknown activation '{name}'"),
            Error::NumericOverflow(op) => {
                write!(f, "non-finite value detected in {op}")
            }
            Error::ShapeMismatch { operation, detail } => {
                write!(f, "shape mismatch in {operation}: {detail}")
            }
            Error::DataExhausted => write!(f, "no data rows available"),
            Error::InvalidData(msg) => write!(f, "invalid data: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Outcome of advancing the batch cursor.
///
/// Exhaustion is an expected end-of-epoch signal, not an error, so it is a
/// value rather than an `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchStatus {
    /// A full batch was loaded; carries the number of rows consumed.
    Consumed(usize),
    /// Fewer than `batch_size` rows remain; nothing was loaded.
    Exhausted,
}
