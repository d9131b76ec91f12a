use std::marker::PhantomData;
use std::mem;

use super::ImageFormat;
use super::code_buffer::{ReadonlyCodeBuffer, WritableCodeBuffer};
use super::error::{Error, Result};
use super::image::{self, Export};

/// A code image mapped into an executable arena.
///
/// Owns the finalized buffer together with the exported-symbol table and acts
/// as the handle for lookups. Resolved entry points borrow the module, so
/// they cannot outlive the mapping they point into.
#[derive(Debug)]
pub struct LoadedModule {
    code: ReadonlyCodeBuffer,
    consumed_size: usize,
    exports: Vec<Export>,
}

impl LoadedModule {
    /// Validate `image` for `format` and map it into `buffer`.
    ///
    /// Validation completes before the first byte is written, so a failed
    /// load never leaves partially mapped code behind. The buffer is taken by
    /// value: the module and its source arena cannot coexist, and two
    /// overlapping loads into one buffer are unrepresentable.
    pub fn load(image: &[u8], format: ImageFormat, buffer: WritableCodeBuffer) -> Result<Self> {
        let plan = image::plan(image, format, buffer.capacity())?;

        let mut buffer = buffer;
        for seg in &plan.segments {
            buffer.write(
                seg.mem_offset,
                &image[seg.file_offset..seg.file_offset + seg.file_size],
            );
            // zero the remainder of the segment if any
            if seg.mem_size > seg.file_size {
                buffer.fill(seg.mem_offset + seg.file_size, seg.mem_size - seg.file_size, 0);
            }
        }

        // Patch relative relocations against the final mapping address. The
        // slide stays valid because finalization does not move the buffer.
        let slide = (buffer.as_ptr() as u64).wrapping_sub(plan.base_vaddr);
        for entry in &plan.relocations {
            let value = slide.wrapping_add_signed(entry.addend);
            buffer.write(entry.slot, &value.to_le_bytes());
        }

        let code = buffer.finalize()?;
        Ok(Self {
            code,
            consumed_size: plan.consumed_size,
            exports: plan.exports,
        })
    }

    /// Bytes of the buffer actually used by the mapping.
    pub fn consumed_size(&self) -> usize {
        self.consumed_size
    }

    /// The mapped bytes. Primarily used by tests to inspect the result of a
    /// load.
    pub fn code(&self) -> &[u8] {
        &self.code.as_slice()[..self.consumed_size]
    }

    /// Resolve an exported function by exact name match.
    pub fn resolve(&self, name: &str) -> Result<EntryPoint<'_>> {
        let export = self
            .exports
            .iter()
            .find(|export| export.name == name)
            .ok_or_else(|| Error::SymbolNotFound(name.to_string()))?;
        // offset < consumed_size was checked during planning
        let addr = unsafe { self.code.as_ptr().add(export.offset) };
        Ok(EntryPoint {
            addr,
            _module: PhantomData,
        })
    }
}

/// A resolved entry point with the contract signature
/// `extern "C" fn(usize) -> i32`.
///
/// The lifetime ties the address to the module's mapping; the address is a
/// view into the buffer, not independently owned.
#[derive(Debug)]
pub struct EntryPoint<'m> {
    addr: *const u8,
    _module: PhantomData<&'m LoadedModule>,
}

impl EntryPoint<'_> {
    /// Transfer control to the mapped code.
    ///
    /// # Safety
    ///
    /// The module must contain valid machine code for the host at this
    /// symbol, following the C calling convention with the contract
    /// signature. The callee runs with the full authority of this process.
    pub unsafe fn call(&self, arg: usize) -> i32 {
        let entry: extern "C" fn(usize) -> i32 = unsafe { mem::transmute(self.addr) };
        entry(arg)
    }
}
