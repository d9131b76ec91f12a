//! Minimal ELF64 images for loader tests, assembled byte by byte.
//!
//! The layout is fixed: header, program headers, text, then the unloaded
//! tail (rela, symtab, strtab, shstrtab, section headers). Knobs exist only
//! where a test needs to bend the image out of shape.

#![allow(dead_code)]

pub const EHDR_LEN: usize = 64;
pub const PHDR_LEN: usize = 56;
pub const SHDR_LEN: usize = 64;
pub const SYM_LEN: usize = 24;
pub const RELA_LEN: usize = 24;

const ET_EXEC: u16 = 2;
const ET_DYN: u16 = 3;
const PT_LOAD: u32 = 1;
const SHT_PROGBITS: u32 = 1;
const SHT_SYMTAB: u32 = 2;
const SHT_STRTAB: u32 = 3;
const SHT_RELA: u32 = 4;
const SHF_ALLOC: u64 = 0x2;
const SHF_EXECINSTR: u64 = 0x4;
/// GLOBAL bind, FUNC type.
const STI_GLOBAL_FUNC: u8 = 0x12;

#[cfg(target_arch = "x86_64")]
pub const EM_HOST: u16 = 62;
#[cfg(target_arch = "aarch64")]
pub const EM_HOST: u16 = 183;

#[cfg(target_arch = "x86_64")]
pub const R_RELATIVE: u32 = 8;
#[cfg(target_arch = "aarch64")]
pub const R_RELATIVE: u32 = 1027;

/// `mov eax, status; ret`
#[cfg(target_arch = "x86_64")]
pub fn return_status_stub(status: i32) -> Vec<u8> {
    let mut code = vec![0xB8];
    code.extend_from_slice(&status.to_le_bytes());
    code.push(0xC3);
    code
}

/// `mov rax, rdi; ret` — returns its own argument.
#[cfg(target_arch = "x86_64")]
pub fn echo_arg_stub() -> Vec<u8> {
    vec![0x48, 0x89, 0xF8, 0xC3]
}

pub struct ImageBuilder {
    e_type: u16,
    machine: u16,
    base_vaddr: u64,
    text: Vec<u8>,
    symbols: Vec<(String, u64)>,
    relas: Vec<(u64, i64)>,
    rela_type: u32,
    extra_memsz: u64,
    extra_segment: Option<(u64, u64)>,
    load_filesz_override: Option<u64>,
}

impl ImageBuilder {
    pub fn executable() -> Self {
        Self::new(ET_EXEC, 0x40_0000)
    }

    pub fn shared() -> Self {
        Self::new(ET_DYN, 0)
    }

    fn new(e_type: u16, base_vaddr: u64) -> Self {
        Self {
            e_type,
            machine: EM_HOST,
            base_vaddr,
            text: Vec::new(),
            symbols: Vec::new(),
            relas: Vec::new(),
            rela_type: R_RELATIVE,
            extra_memsz: 0,
            extra_segment: None,
            load_filesz_override: None,
        }
    }

    pub fn text(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.text = bytes.into();
        self
    }

    /// Export `name` at `offset` within the text.
    pub fn symbol(mut self, name: &str, offset: u64) -> Self {
        self.symbols.push((name.to_string(), offset));
        self
    }

    /// Add a relative relocation: patch the slot at `mem_offset` within the
    /// mapping with `base + addend`.
    pub fn rela(mut self, mem_offset: u64, addend: i64) -> Self {
        self.relas.push((mem_offset, addend));
        self
    }

    pub fn rela_type(mut self, rela_type: u32) -> Self {
        self.rela_type = rela_type;
        self
    }

    pub fn machine(mut self, machine: u16) -> Self {
        self.machine = machine;
        self
    }

    /// Grow the load segment's memory size beyond its file size.
    pub fn bss(mut self, extra: u64) -> Self {
        self.extra_memsz = extra;
        self
    }

    /// Add a second, file-less load segment at `base + vaddr_delta`.
    pub fn extra_segment(mut self, vaddr_delta: u64, memsz: u64) -> Self {
        self.extra_segment = Some((vaddr_delta, memsz));
        self
    }

    /// Lie about the load segment's file size (memsz is kept consistent).
    pub fn load_filesz_override(mut self, filesz: u64) -> Self {
        self.load_filesz_override = Some(filesz);
        self
    }

    fn phnum(&self) -> usize {
        1 + usize::from(self.extra_segment.is_some())
    }

    /// File (and mapping) offset of the text.
    pub fn text_offset(&self) -> usize {
        EHDR_LEN + self.phnum() * PHDR_LEN
    }

    pub fn build(&self) -> Vec<u8> {
        let phnum = self.phnum();
        let text_off = self.text_offset();
        let load_filesz = (text_off + self.text.len()) as u64;
        let rela_off = load_filesz as usize;
        let rela_size = self.relas.len() * RELA_LEN;
        let sym_off = rela_off + rela_size;
        let sym_count = self.symbols.len() + 1;
        let sym_size = sym_count * SYM_LEN;
        let str_off = sym_off + sym_size;

        let mut strtab = vec![0u8];
        let name_offsets: Vec<u32> = self
            .symbols
            .iter()
            .map(|(name, _)| {
                let offset = strtab.len() as u32;
                strtab.extend_from_slice(name.as_bytes());
                strtab.push(0);
                offset
            })
            .collect();

        let mut shstrtab = vec![0u8];
        let mut shname = |name: &str| {
            let offset = shstrtab.len() as u32;
            shstrtab.extend_from_slice(name.as_bytes());
            shstrtab.push(0);
            offset
        };
        let text_name = shname(".text");
        let symtab_name = shname(".symtab");
        let strtab_name = shname(".strtab");
        let rela_name = if self.relas.is_empty() {
            0
        } else {
            shname(".rela.dyn")
        };
        let shstrtab_name = shname(".shstrtab");

        let shstr_off = str_off + strtab.len();
        let sh_off = (shstr_off + shstrtab.len()).next_multiple_of(8);
        let shnum = if self.relas.is_empty() { 5 } else { 6 };
        let shstrndx = shnum - 1;

        let mut image = Vec::new();

        // ELF header
        image.extend_from_slice(&[0x7F, b'E', b'L', b'F', 2, 1, 1, 0]);
        image.extend_from_slice(&[0u8; 8]);
        push_u16(&mut image, self.e_type);
        push_u16(&mut image, self.machine);
        push_u32(&mut image, 1);
        push_u64(&mut image, self.base_vaddr + text_off as u64); // e_entry
        push_u64(&mut image, EHDR_LEN as u64); // e_phoff
        push_u64(&mut image, sh_off as u64); // e_shoff
        push_u32(&mut image, 0); // e_flags
        push_u16(&mut image, EHDR_LEN as u16);
        push_u16(&mut image, PHDR_LEN as u16);
        push_u16(&mut image, phnum as u16);
        push_u16(&mut image, SHDR_LEN as u16);
        push_u16(&mut image, shnum as u16);
        push_u16(&mut image, shstrndx as u16);
        assert_eq!(image.len(), EHDR_LEN);

        // PT_LOAD covering headers + text
        let filesz = self.load_filesz_override.unwrap_or(load_filesz);
        let memsz = filesz.max(load_filesz) + self.extra_memsz;
        push_phdr(&mut image, 0, self.base_vaddr, filesz, memsz);
        if let Some((vaddr_delta, seg_memsz)) = self.extra_segment {
            push_phdr(&mut image, 0, self.base_vaddr + vaddr_delta, 0, seg_memsz);
        }
        assert_eq!(image.len(), text_off);

        image.extend_from_slice(&self.text);

        // .rela.dyn
        for (mem_offset, addend) in &self.relas {
            push_u64(&mut image, self.base_vaddr + mem_offset);
            push_u64(&mut image, u64::from(self.rela_type)); // r_info, sym index 0
            push_u64(&mut image, *addend as u64);
        }

        // .symtab: null entry, then the exports
        image.extend_from_slice(&[0u8; SYM_LEN]);
        for ((_, offset), name_offset) in self.symbols.iter().zip(&name_offsets) {
            push_u32(&mut image, *name_offset);
            image.push(STI_GLOBAL_FUNC);
            image.push(0);
            push_u16(&mut image, 1); // st_shndx = .text
            push_u64(&mut image, self.base_vaddr + text_off as u64 + offset);
            push_u64(&mut image, 0);
        }

        image.extend_from_slice(&strtab);
        image.extend_from_slice(&shstrtab);
        image.resize(sh_off, 0);

        // section headers: NULL, .text, .symtab, .strtab, [.rela.dyn,] .shstrtab
        image.extend_from_slice(&[0u8; SHDR_LEN]);
        push_shdr(
            &mut image,
            text_name,
            SHT_PROGBITS,
            SHF_ALLOC | SHF_EXECINSTR,
            self.base_vaddr + text_off as u64,
            text_off as u64,
            self.text.len() as u64,
            0,
            0,
            4,
            0,
        );
        push_shdr(
            &mut image,
            symtab_name,
            SHT_SYMTAB,
            0,
            0,
            sym_off as u64,
            sym_size as u64,
            3, // sh_link = .strtab
            1, // first non-local symbol
            8,
            SYM_LEN as u64,
        );
        push_shdr(
            &mut image,
            strtab_name,
            SHT_STRTAB,
            0,
            0,
            str_off as u64,
            strtab.len() as u64,
            0,
            0,
            1,
            0,
        );
        if !self.relas.is_empty() {
            push_shdr(
                &mut image,
                rela_name,
                SHT_RELA,
                SHF_ALLOC,
                self.base_vaddr + rela_off as u64,
                rela_off as u64,
                rela_size as u64,
                2, // sh_link = .symtab
                0,
                8,
                RELA_LEN as u64,
            );
        }
        push_shdr(
            &mut image,
            shstrtab_name,
            SHT_STRTAB,
            0,
            0,
            shstr_off as u64,
            shstrtab.len() as u64,
            0,
            0,
            1,
            0,
        );

        image
    }
}

fn push_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn push_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn push_u64(buf: &mut Vec<u8>, value: u64) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn push_phdr(buf: &mut Vec<u8>, offset: u64, vaddr: u64, filesz: u64, memsz: u64) {
    push_u32(buf, PT_LOAD);
    push_u32(buf, 0x7); // RWX
    push_u64(buf, offset);
    push_u64(buf, vaddr);
    push_u64(buf, vaddr);
    push_u64(buf, filesz);
    push_u64(buf, memsz);
    push_u64(buf, 0x1000);
}

#[allow(clippy::too_many_arguments)]
fn push_shdr(
    buf: &mut Vec<u8>,
    name: u32,
    sh_type: u32,
    flags: u64,
    addr: u64,
    offset: u64,
    size: u64,
    link: u32,
    info: u32,
    addralign: u64,
    entsize: u64,
) {
    push_u32(buf, name);
    push_u32(buf, sh_type);
    push_u64(buf, flags);
    push_u64(buf, addr);
    push_u64(buf, offset);
    push_u64(buf, size);
    push_u32(buf, link);
    push_u32(buf, info);
    push_u64(buf, addralign);
    push_u64(buf, entsize);
}
