//! Image validation and load planning.
//!
//! Everything here runs before a single byte reaches the code buffer: the
//! plan either describes a fully checked mapping or the load fails with no
//! side effect.

use goblin::elf::program_header::PT_LOAD;
use goblin::elf::sym::Symtab;
use goblin::elf::{Elf, header, reloc};
use goblin::strtab::Strtab;

use super::ImageFormat;
use super::error::{Error, Result};

#[cfg(target_arch = "x86_64")]
const HOST_MACHINE: u16 = header::EM_X86_64;
#[cfg(target_arch = "aarch64")]
const HOST_MACHINE: u16 = header::EM_AARCH64;

#[cfg(target_arch = "x86_64")]
const RELATIVE_RELOC: u32 = reloc::R_X86_64_RELATIVE;
#[cfg(target_arch = "aarch64")]
const RELATIVE_RELOC: u32 = reloc::R_AARCH64_RELATIVE;

/// One loadable segment, with both ranges already bounds-checked.
pub(crate) struct Segment {
    pub file_offset: usize,
    pub file_size: usize,
    pub mem_offset: usize,
    pub mem_size: usize,
}

/// Pointer-sized slot to patch with `base - base_vaddr + addend`.
pub(crate) struct Relocation {
    pub slot: usize,
    pub addend: i64,
}

#[derive(Debug)]
pub(crate) struct Export {
    pub name: String,
    pub offset: usize,
}

pub(crate) struct LoadPlan {
    pub base_vaddr: u64,
    pub segments: Vec<Segment>,
    pub relocations: Vec<Relocation>,
    pub exports: Vec<Export>,
    pub consumed_size: usize,
}

fn to_usize(value: u64, what: &str) -> Result<usize> {
    usize::try_from(value)
        .map_err(|_| Error::SegmentOutOfBounds(format!("{what} {value:#x} does not fit")))
}

/// Validate `image` for `format` against a buffer of `capacity` bytes.
pub(crate) fn plan(image: &[u8], format: ImageFormat, capacity: usize) -> Result<LoadPlan> {
    let elf = Elf::parse(image)?;

    let expected_type = match format {
        ImageFormat::RawExecutable => header::ET_EXEC,
        ImageFormat::SharedLoadable => header::ET_DYN,
    };
    if elf.header.e_type != expected_type {
        return Err(Error::MalformedImage(format!(
            "object type {:#x} does not match the selected format",
            elf.header.e_type
        )));
    }
    if elf.header.e_machine != HOST_MACHINE {
        return Err(Error::MalformedImage(format!(
            "machine {:#x} is not executable here",
            elf.header.e_machine
        )));
    }

    let base_vaddr = elf
        .program_headers
        .iter()
        .filter(|ph| ph.p_type == PT_LOAD)
        .map(|ph| ph.p_vaddr)
        .min()
        .ok_or_else(|| Error::MalformedImage("no loadable segments".into()))?;

    let mut segments = Vec::new();
    let mut consumed = 0usize;
    for ph in elf.program_headers.iter().filter(|ph| ph.p_type == PT_LOAD) {
        if ph.p_memsz < ph.p_filesz {
            return Err(Error::MalformedImage(format!(
                "segment memsz {:#x} smaller than filesz {:#x}",
                ph.p_memsz, ph.p_filesz
            )));
        }

        let file_offset = to_usize(ph.p_offset, "segment offset")?;
        let file_size = to_usize(ph.p_filesz, "segment filesz")?;
        let file_end = file_offset.checked_add(file_size).ok_or_else(|| {
            Error::SegmentOutOfBounds("segment file range overflows".to_string())
        })?;
        if file_end > image.len() {
            return Err(Error::SegmentOutOfBounds(format!(
                "segment file range {file_offset:#x}..{file_end:#x} exceeds image length {:#x}",
                image.len()
            )));
        }

        let mem_offset = to_usize(ph.p_vaddr - base_vaddr, "segment vaddr")?;
        let mem_size = to_usize(ph.p_memsz, "segment memsz")?;
        let mem_end = mem_offset.checked_add(mem_size).ok_or_else(|| {
            Error::SegmentOutOfBounds("segment memory range overflows".to_string())
        })?;
        if mem_end > capacity {
            return Err(Error::ImageTooLarge {
                required: mem_end,
                capacity,
            });
        }

        consumed = consumed.max(mem_end);
        segments.push(Segment {
            file_offset,
            file_size,
            mem_offset,
            mem_size,
        });
    }

    segments.sort_by_key(|seg| seg.mem_offset);
    for pair in segments.windows(2) {
        if pair[0].mem_offset + pair[0].mem_size > pair[1].mem_offset {
            return Err(Error::MalformedImage("overlapping segments".into()));
        }
    }

    let mut exports = Vec::new();
    collect_exports(&elf.dynsyms, &elf.dynstrtab, base_vaddr, consumed, &mut exports);
    collect_exports(&elf.syms, &elf.strtab, base_vaddr, consumed, &mut exports);

    let relocations = match format {
        ImageFormat::RawExecutable => Vec::new(),
        ImageFormat::SharedLoadable => collect_relocations(&elf, base_vaddr, consumed)?,
    };

    Ok(LoadPlan {
        base_vaddr,
        segments,
        relocations,
        exports,
        consumed_size: consumed,
    })
}

/// Defined function symbols whose mapped address falls inside the module.
/// Dynamic symbols are collected first, so lookups prefer them.
fn collect_exports(
    syms: &Symtab<'_>,
    strtab: &Strtab<'_>,
    base_vaddr: u64,
    consumed: usize,
    exports: &mut Vec<Export>,
) {
    for sym in syms.iter() {
        if !sym.is_function() || sym.st_shndx == 0 {
            continue;
        }
        let Some(name) = strtab.get_at(sym.st_name) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        let Some(offset) = sym
            .st_value
            .checked_sub(base_vaddr)
            .and_then(|off| usize::try_from(off).ok())
        else {
            continue;
        };
        if offset >= consumed {
            continue;
        }
        exports.push(Export {
            name: name.to_string(),
            offset,
        });
    }
}

/// Relative relocations only. Anything that would need a symbol lookup is a
/// dynamic-linking feature the loader does not provide.
fn collect_relocations(elf: &Elf<'_>, base_vaddr: u64, consumed: usize) -> Result<Vec<Relocation>> {
    let mut relocations = Vec::new();

    let dynamic = elf.dynrelas.iter().chain(elf.dynrels.iter());
    let sections = elf
        .shdr_relocs
        .iter()
        .flat_map(|(_, section)| section.iter());

    for entry in dynamic.chain(sections) {
        if entry.r_type != RELATIVE_RELOC {
            return Err(Error::RelocationFailure(format!(
                "unsupported relocation type {}",
                entry.r_type
            )));
        }
        let addend = entry.r_addend.ok_or_else(|| {
            Error::RelocationFailure("relocation without explicit addend".to_string())
        })?;
        let slot = entry
            .r_offset
            .checked_sub(base_vaddr)
            .and_then(|off| usize::try_from(off).ok())
            .ok_or_else(|| {
                Error::RelocationFailure(format!(
                    "relocation slot {:#x} below the image base",
                    entry.r_offset
                ))
            })?;
        let slot_end = slot.checked_add(size_of::<u64>()).filter(|end| *end <= consumed);
        if slot_end.is_none() {
            return Err(Error::RelocationFailure(format!(
                "relocation slot {slot:#x} outside the mapped range"
            )));
        }
        relocations.push(Relocation { slot, addend });
    }

    Ok(relocations)
}
