pub mod mock;

use thiserror::Error as ThisError;

/// Logical grouping a cell is addressed through.
///
/// Group sources select only the cells whose script matches the currently
/// executing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Input,
    Output,
    CellDep,
    GroupInput,
    GroupOutput,
}

#[derive(ThisError, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxError {
    #[error("cell index out of bound")]
    IndexOutOfBound,

    #[error("requested transaction item is missing")]
    ItemMissing,
}

/// Read access to the committed transaction the current script runs under.
///
/// This is the seam to the VM's data surface: everything the entry and the
/// identity check consume goes through it, so the whole validation pass can
/// run against an in-memory view.
pub trait TransactionView {
    /// Data of the cell at `index` within `source`.
    ///
    /// Callers with a minimum size requirement treat shorter data as their
    /// own unavailable-data failure.
    fn cell_data(&self, index: usize, source: Source) -> Result<&[u8], TxError>;

    /// The `args` field of the currently executing script.
    fn script_args(&self) -> &[u8];

    /// Serialized reference of the transaction's first input.
    fn first_input_reference(&self) -> Result<&[u8], TxError>;

    /// Index of the output carrying the currently executing script.
    fn script_output_index(&self) -> Result<u64, TxError>;
}
