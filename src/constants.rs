/// Page size of the execution environment. Code arenas are aligned to this.
pub const PAGE_SIZE: usize = 4096;

/// Default capacity of the code arena handed to the loader.
pub const DEFAULT_CODE_CAPACITY: usize = 128 * 1024;

/// Cell data consumed by the entry: a 32-byte identity template followed by
/// one format-selector byte.
pub const CELL_HEADER_LEN: usize = 33;

/// Length of a type identity.
pub const IDENTITY_LEN: usize = 32;

/// Exported symbol the entry resolves and invokes.
pub const ENTRY_SYMBOL: &str = "validate_tx";

/// Byte offset within script args where this deployment places the expected
/// identity.
pub const IDENTITY_ARG_OFFSET: usize = 2;
