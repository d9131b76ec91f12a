//! Entry orchestration: locate the logic binary in transaction data, map it,
//! and hand control to its exported `validate_tx`.

use crate::constants::{
    CELL_HEADER_LEN, DEFAULT_CODE_CAPACITY, ENTRY_SYMBOL, IDENTITY_ARG_OFFSET, IDENTITY_LEN,
};
use crate::error::{Error, Result};
use crate::loader::{ImageFormat, LoadedModule, WritableCodeBuffer};
use crate::tx::{Source, TransactionView};

/// Index of the dependency cell carrying the logic image.
const LOGIC_DEP_INDEX: usize = 0;

/// Cell data of the entry's own output: the deployment's identity template
/// followed by the format selector of the logic image.
#[derive(Debug, Clone, Copy)]
pub struct CellDataHeader {
    pub identity: [u8; IDENTITY_LEN],
    pub format: ImageFormat,
}

impl CellDataHeader {
    /// Parse the leading 33 bytes of cell data. Shorter data is
    /// `DataUnavailable`; the selector byte must name a supported format.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < CELL_HEADER_LEN {
            return Err(Error::DataUnavailable);
        }
        let mut identity = [0u8; IDENTITY_LEN];
        identity.copy_from_slice(&data[..IDENTITY_LEN]);
        let format = ImageFormat::from_selector(data[IDENTITY_LEN])?;
        Ok(Self { identity, format })
    }
}

/// Run one validation pass with the default code arena capacity.
pub fn validate(tx: &impl TransactionView) -> Result<()> {
    validate_with_capacity(tx, DEFAULT_CODE_CAPACITY)
}

/// Full entry sequence: parse the header from this script group's first
/// output, load the logic image from the first dependency cell, resolve
/// `validate_tx` and invoke it with the deployment's argument offset.
///
/// Every stage is terminal on failure; the status the logic returns is
/// propagated as the overall status.
pub fn validate_with_capacity(tx: &impl TransactionView, capacity: usize) -> Result<()> {
    let header_data = tx
        .cell_data(0, Source::GroupOutput)
        .map_err(|_| Error::DataUnavailable)?;
    let header = CellDataHeader::parse(header_data)?;

    let image = tx
        .cell_data(LOGIC_DEP_INDEX, Source::CellDep)
        .map_err(|_| Error::DataUnavailable)?;

    let buffer = WritableCodeBuffer::new(capacity)?;
    let module = LoadedModule::load(image, header.format, buffer)?;
    let entry = module.resolve(ENTRY_SYMBOL)?;

    // SAFETY: the image was validated and mapped for the host architecture,
    // and the deployment contract fixes the entry signature to
    // `extern "C" fn(usize) -> i32`.
    let status = unsafe { entry.call(IDENTITY_ARG_OFFSET) };
    if status != 0 {
        return Err(Error::Logic(status as i8));
    }
    Ok(())
}
