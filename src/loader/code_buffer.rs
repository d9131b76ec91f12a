use memmap2::{Mmap, MmapMut};

use super::error::Result;
use crate::constants::PAGE_SIZE;

/// Fixed-capacity, page-aligned arena the loader maps code into.
///
/// The capacity is the hard resource ceiling for one load; it is rounded up
/// to a whole number of pages at creation and never grows. Anonymous
/// mappings start out zero-filled and page-aligned.
pub struct WritableCodeBuffer {
    mmap: MmapMut,
}

impl WritableCodeBuffer {
    pub fn new(capacity: usize) -> Result<Self> {
        let pages = capacity.div_ceil(PAGE_SIZE).max(1);
        let mmap = MmapMut::map_anon(pages * PAGE_SIZE)?;
        debug_assert_eq!(mmap.as_ptr() as usize % PAGE_SIZE, 0);
        Ok(Self { mmap })
    }

    pub fn capacity(&self) -> usize {
        self.mmap.len()
    }

    pub(crate) fn as_ptr(&self) -> *const u8 {
        self.mmap.as_ptr()
    }

    pub(crate) fn write(&mut self, offset: usize, bytes: &[u8]) {
        self.mmap[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub(crate) fn fill(&mut self, offset: usize, len: usize, byte: u8) {
        self.mmap[offset..offset + len].fill(byte);
    }

    /// Flip the mapping to read + execute.
    ///
    /// The base address does not move, so addresses derived from it stay
    /// valid across finalization.
    pub fn finalize(self) -> Result<ReadonlyCodeBuffer> {
        let mmap = self.mmap.make_exec()?;
        Ok(ReadonlyCodeBuffer { mmap })
    }
}

/// Finalized, executable code region.
#[derive(Debug)]
pub struct ReadonlyCodeBuffer {
    mmap: Mmap,
}

impl ReadonlyCodeBuffer {
    pub fn as_ptr(&self) -> *const u8 {
        self.mmap.as_ptr()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.mmap
    }
}
