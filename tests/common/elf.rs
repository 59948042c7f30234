// tests/common/elf.rs

//! Minimal ELF64 shared-object synthesis.
//!
//! Emits just enough structure for dependency extraction: an ELF
//! header, a `PT_LOAD` mapping the whole file at identical offsets and
//! addresses, a `PT_DYNAMIC` segment, and a string table holding the
//! `DT_NEEDED` and `DT_RUNPATH` entries. No sections, symbols, or code
//! are present; the fixtures exist to be inspected, not executed.

use std::fs;
use std::path::Path;

const EHSIZE: usize = 64;
const PHENTSIZE: usize = 56;

const PT_LOAD: u32 = 1;
const PT_DYNAMIC: u32 = 2;

const DT_NULL: u64 = 0;
const DT_NEEDED: u64 = 1;
const DT_STRTAB: u64 = 5;
const DT_STRSZ: u64 = 10;
const DT_RUNPATH: u64 = 29;

/// Write a synthetic shared object declaring `needed` sonames and,
/// optionally, a `DT_RUNPATH` directive. Parent directories are
/// created as needed.
pub fn write_shared_object(path: &Path, needed: &[&str], runpath: Option<&str>) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, build(needed, runpath)).unwrap();
}

fn build(needed: &[&str], runpath: Option<&str>) -> Vec<u8> {
    // String table: leading NUL, then every name.
    let mut strtab = vec![0u8];
    let mut needed_offsets = Vec::new();
    for name in needed {
        needed_offsets.push(strtab.len() as u64);
        strtab.extend_from_slice(name.as_bytes());
        strtab.push(0);
    }
    let runpath_offset = runpath.map(|dir| {
        let offset = strtab.len() as u64;
        strtab.extend_from_slice(dir.as_bytes());
        strtab.push(0);
        offset
    });

    let strtab_offset = (EHSIZE + 2 * PHENTSIZE) as u64;
    // Dyn entries are 8-byte aligned.
    let dynamic_offset = (strtab_offset + strtab.len() as u64 + 7) & !7;

    let mut dynamic: Vec<(u64, u64)> = needed_offsets
        .iter()
        .map(|offset| (DT_NEEDED, *offset))
        .collect();
    if let Some(offset) = runpath_offset {
        dynamic.push((DT_RUNPATH, offset));
    }
    dynamic.push((DT_STRTAB, strtab_offset));
    dynamic.push((DT_STRSZ, strtab.len() as u64));
    dynamic.push((DT_NULL, 0));

    let dynamic_size = (dynamic.len() * 16) as u64;
    let file_size = dynamic_offset + dynamic_size;

    let mut out = Vec::with_capacity(file_size as usize);

    // ELF header: ET_DYN, EM_X86_64, little endian, no sections.
    out.extend_from_slice(b"\x7fELF");
    out.push(2); // ELFCLASS64
    out.push(1); // ELFDATA2LSB
    out.push(1); // EV_CURRENT
    out.extend_from_slice(&[0u8; 9]); // OS ABI + padding
    out.extend_from_slice(&3u16.to_le_bytes()); // e_type = ET_DYN
    out.extend_from_slice(&62u16.to_le_bytes()); // e_machine = EM_X86_64
    out.extend_from_slice(&1u32.to_le_bytes()); // e_version
    out.extend_from_slice(&0u64.to_le_bytes()); // e_entry
    out.extend_from_slice(&(EHSIZE as u64).to_le_bytes()); // e_phoff
    out.extend_from_slice(&0u64.to_le_bytes()); // e_shoff
    out.extend_from_slice(&0u32.to_le_bytes()); // e_flags
    out.extend_from_slice(&(EHSIZE as u16).to_le_bytes()); // e_ehsize
    out.extend_from_slice(&(PHENTSIZE as u16).to_le_bytes()); // e_phentsize
    out.extend_from_slice(&2u16.to_le_bytes()); // e_phnum
    out.extend_from_slice(&64u16.to_le_bytes()); // e_shentsize
    out.extend_from_slice(&0u16.to_le_bytes()); // e_shnum
    out.extend_from_slice(&0u16.to_le_bytes()); // e_shstrndx

    // PT_LOAD covering the whole file, vaddr == offset.
    push_phdr(&mut out, PT_LOAD, 0, file_size, 0x1000);
    push_phdr(&mut out, PT_DYNAMIC, dynamic_offset, dynamic_size, 8);

    out.extend_from_slice(&strtab);
    while (out.len() as u64) < dynamic_offset {
        out.push(0);
    }
    for (tag, value) in dynamic {
        out.extend_from_slice(&tag.to_le_bytes());
        out.extend_from_slice(&value.to_le_bytes());
    }
    out
}

fn push_phdr(out: &mut Vec<u8>, p_type: u32, offset: u64, size: u64, align: u64) {
    out.extend_from_slice(&p_type.to_le_bytes());
    out.extend_from_slice(&4u32.to_le_bytes()); // p_flags = PF_R
    out.extend_from_slice(&offset.to_le_bytes()); // p_offset
    out.extend_from_slice(&offset.to_le_bytes()); // p_vaddr
    out.extend_from_slice(&offset.to_le_bytes()); // p_paddr
    out.extend_from_slice(&size.to_le_bytes()); // p_filesz
    out.extend_from_slice(&size.to_le_bytes()); // p_memsz
    out.extend_from_slice(&align.to_le_bytes()); // p_align
}
