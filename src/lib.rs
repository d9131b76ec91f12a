//! On-chain dynamic loading and type-identity verification for a cell-based
//! ledger VM.
//!
//! An entry script locates a logic binary in transaction data, maps it into a
//! page-aligned code arena and invokes its exported `validate_tx`; the logic
//! proves it occupies its deployment slot by recomputing the slot's type
//! identity from committed transaction structure and comparing it against the
//! value carried in its script args. The sole externally observed result is
//! the exit status.

pub mod constants;
pub mod entry;
pub mod error;
pub mod identity;
pub mod loader;
pub mod logic;
pub mod tx;

pub use error::{Error, Result, exit_code};
