use clap::Args;

use cellar::tx::mock::MockTransaction;
use cellar::{Result, logic};

use super::{HexBytes, parse_hex};

/// Run the native logic directly: extract the expected identity from the
/// script args and verify it against the canonical derivation. Lets a
/// transaction builder diagnose an identity rejection without the binary
/// image.
#[derive(Args)]
pub struct Cmd {
    /// Script args of the running script, hex.
    #[arg(long, value_parser = parse_hex)]
    pub script_args: HexBytes,

    /// Serialized reference of the transaction's first input, hex.
    #[arg(long, value_parser = parse_hex)]
    pub first_input: HexBytes,

    /// Index of the output carrying the current script.
    #[arg(long)]
    pub output_index: u64,

    /// Byte offset of the identity within the script args.
    #[arg(long, default_value_t = cellar::constants::IDENTITY_ARG_OFFSET)]
    pub offset: usize,
}

impl Cmd {
    pub fn execute(&self) -> Result<()> {
        let tx = MockTransaction::new()
            .with_script_args(self.script_args.0.clone())
            .with_input_reference(self.first_input.0.clone())
            .with_script_output_index(self.output_index);

        logic::validate_tx(&tx, self.offset)?;
        Ok(())
    }
}
