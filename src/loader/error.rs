use thiserror::Error as ThisError;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("elf parse error: {0}")]
    Parsing(#[from] goblin::error::Error),

    #[error("malformed image: {0}")]
    MalformedImage(String),

    #[error("segment out of bounds: {0}")]
    SegmentOutOfBounds(String),

    #[error("image requires {required} bytes but the code buffer holds {capacity}")]
    ImageTooLarge { required: usize, capacity: usize },

    #[error("unsupported format selector: {0}")]
    UnsupportedFormat(u8),

    #[error("relocation failure: {0}")]
    RelocationFailure(String),

    #[error("symbol `{0}` not found")]
    SymbolNotFound(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
