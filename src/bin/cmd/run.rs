use std::fs;

use clap::Args;

use cellar::tx::Source;
use cellar::tx::mock::MockTransaction;
use cellar::{Result, entry, loader};

use super::{HexBytes, parse_hex};

/// Run the full entry sequence against a described transaction.
///
/// The image executes in this process, so it must be a host-native binary.
/// The exit status is the validation result.
#[derive(Args)]
pub struct Cmd {
    /// Logic image file, placed as dependency cell 0.
    #[arg(short, long)]
    pub image: String,

    /// Cell data of group output 0 (identity template + format selector), hex.
    #[arg(long, value_parser = parse_hex)]
    pub cell_data: HexBytes,

    /// Script args of the running script, hex.
    #[arg(long, value_parser = parse_hex, default_value = "")]
    pub script_args: HexBytes,

    /// Serialized reference of the transaction's first input, hex.
    #[arg(long, value_parser = parse_hex, default_value = "")]
    pub first_input: HexBytes,

    /// Index of the output carrying the current script.
    #[arg(long, default_value_t = 0)]
    pub output_index: u64,

    /// Code arena capacity in bytes.
    #[arg(long, default_value_t = cellar::constants::DEFAULT_CODE_CAPACITY)]
    pub capacity: usize,
}

impl Cmd {
    pub fn execute(&self) -> Result<()> {
        let image = fs::read(&self.image).map_err(loader::Error::from)?;

        let tx = MockTransaction::new()
            .with_cell_data(Source::GroupOutput, self.cell_data.0.clone())
            .with_cell_data(Source::CellDep, image)
            .with_script_args(self.script_args.0.clone())
            .with_input_reference(self.first_input.0.clone())
            .with_script_output_index(self.output_index);

        entry::validate_with_capacity(&tx, self.capacity)
    }
}
