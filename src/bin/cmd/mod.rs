pub mod check;
pub mod run;

/// Hex-encoded byte string taken from the command line.
#[derive(Clone, Debug)]
pub struct HexBytes(pub Vec<u8>);

pub fn parse_hex(input: &str) -> Result<HexBytes, hex::FromHexError> {
    let input = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(input).map(HexBytes)
}
