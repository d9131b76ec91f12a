use thiserror::Error as ThisError;

use crate::{identity, loader};

/// Terminal failure of one validation pass.
///
/// Every kind maps to a stable, distinct exit code, so a rejection is
/// diagnosable from the process status alone.
#[derive(ThisError, Debug)]
pub enum Error {
    #[error("required cell or argument data is unavailable")]
    DataUnavailable,

    #[error(transparent)]
    Loader(#[from] loader::Error),

    #[error(transparent)]
    Identity(#[from] identity::Error),

    #[error("loaded logic returned status {0}")]
    Logic(i8),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable process status for this failure.
    pub fn exit_code(&self) -> i8 {
        use identity::Error as Identity;
        use loader::Error as Loader;

        match self {
            Error::DataUnavailable => -10,
            Error::Loader(err) => match err {
                Loader::SymbolNotFound(_) => -11,
                Loader::Parsing(_)
                | Loader::MalformedImage(_)
                | Loader::SegmentOutOfBounds(_) => -12,
                Loader::ImageTooLarge { .. } => -13,
                Loader::UnsupportedFormat(_) => -14,
                Loader::RelocationFailure(_) => -15,
                Loader::Io(_) => -18,
            },
            Error::Identity(err) => match err {
                Identity::ArgsTooShort { .. } => -10,
                Identity::Mismatch => -16,
                Identity::TransactionDataUnavailable(_) => -17,
            },
            Error::Logic(status) => *status,
        }
    }
}

/// Process status for a whole validation pass.
pub fn exit_code(result: &Result<()>) -> i8 {
    match result {
        Ok(()) => 0,
        Err(err) => err.exit_code(),
    }
}
