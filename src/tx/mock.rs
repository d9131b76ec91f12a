use super::{Source, TransactionView, TxError};

/// In-memory transaction view for tests and the command line.
///
/// Built up field by field; anything left unset reads back as missing, the
/// same way the VM reports absent items.
#[derive(Debug, Default, Clone)]
pub struct MockTransaction {
    inputs: Vec<Vec<u8>>,
    outputs: Vec<Vec<u8>>,
    cell_deps: Vec<Vec<u8>>,
    group_inputs: Vec<Vec<u8>>,
    group_outputs: Vec<Vec<u8>>,
    script_args: Vec<u8>,
    input_references: Vec<Vec<u8>>,
    script_output_index: Option<u64>,
}

impl MockTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cell's data under `source`.
    pub fn with_cell_data(mut self, source: Source, data: impl Into<Vec<u8>>) -> Self {
        self.cells_mut(source).push(data.into());
        self
    }

    pub fn with_script_args(mut self, args: impl Into<Vec<u8>>) -> Self {
        self.script_args = args.into();
        self
    }

    /// Append an input's serialized reference.
    pub fn with_input_reference(mut self, reference: impl Into<Vec<u8>>) -> Self {
        self.input_references.push(reference.into());
        self
    }

    pub fn with_script_output_index(mut self, index: u64) -> Self {
        self.script_output_index = Some(index);
        self
    }

    fn cells(&self, source: Source) -> &[Vec<u8>] {
        match source {
            Source::Input => &self.inputs,
            Source::Output => &self.outputs,
            Source::CellDep => &self.cell_deps,
            Source::GroupInput => &self.group_inputs,
            Source::GroupOutput => &self.group_outputs,
        }
    }

    fn cells_mut(&mut self, source: Source) -> &mut Vec<Vec<u8>> {
        match source {
            Source::Input => &mut self.inputs,
            Source::Output => &mut self.outputs,
            Source::CellDep => &mut self.cell_deps,
            Source::GroupInput => &mut self.group_inputs,
            Source::GroupOutput => &mut self.group_outputs,
        }
    }
}

impl TransactionView for MockTransaction {
    fn cell_data(&self, index: usize, source: Source) -> Result<&[u8], TxError> {
        self.cells(source)
            .get(index)
            .map(Vec::as_slice)
            .ok_or(TxError::IndexOutOfBound)
    }

    fn script_args(&self) -> &[u8] {
        &self.script_args
    }

    fn first_input_reference(&self) -> Result<&[u8], TxError> {
        self.input_references
            .first()
            .map(Vec::as_slice)
            .ok_or(TxError::ItemMissing)
    }

    fn script_output_index(&self) -> Result<u64, TxError> {
        self.script_output_index.ok_or(TxError::ItemMissing)
    }
}
