//! Native rendition of the loadable logic.
//!
//! A deployed logic binary exports this behavior under the `validate_tx`
//! symbol; the entry resolves and invokes it with the argument offset of the
//! deployment. The native form backs the `check` command and the
//! verification-path tests.

use crate::identity::{self, Error};
use crate::tx::TransactionView;

/// Read the expected identity at `arg_offset` of the invoking script's args
/// and check it against the canonical identity of this transaction.
pub fn validate_tx(tx: &impl TransactionView, arg_offset: usize) -> Result<(), Error> {
    let candidate = identity::expected_from_args(tx, arg_offset)?;
    identity::verify(tx, &candidate)
}
