//! Shared helpers for building payloads and temporary files.

use std::io::Write;
use std::os::unix::fs::MetadataExt;
use std::path::Path;
use tempfile::NamedTempFile;

/// Creates a temporary file with the given content.
///
/// # Panics
///
/// Panics if the temporary file cannot be created or written.
pub fn create_temp_file(content: &[u8]) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

/// Inode behind `path`, following the `/proc/<pid>/fd` symlink.
pub fn inode_of(path: &Path) -> Option<u64> {
    std::fs::metadata(path).ok().map(|m| m.ino())
}

/// Smallest static x86-64 ELF executable that calls `exit(code)`.
///
/// One `PT_LOAD` segment maps the whole file at 0x400000; the entry point
/// is the code right after the program header:
///
/// ```text
/// mov edi, code
/// mov eax, 60     ; SYS_exit
/// syscall
/// ```
pub fn exit_stub_elf(code: u8) -> Vec<u8> {
    const BASE: u64 = 0x40_0000;
    const EHDR_SIZE: u16 = 64;
    const PHDR_SIZE: u16 = 56;

    let text: [u8; 12] = [
        0xbf, code, 0x00, 0x00, 0x00, // mov edi, code
        0xb8, 0x3c, 0x00, 0x00, 0x00, // mov eax, 60
        0x0f, 0x05, // syscall
    ];
    let entry = BASE + u64::from(EHDR_SIZE + PHDR_SIZE);
    let file_size = (EHDR_SIZE + PHDR_SIZE) as u64 + text.len() as u64;

    let mut elf = Vec::with_capacity(file_size as usize);
    // e_ident: magic, ELFCLASS64, little endian, EV_CURRENT, System V ABI
    elf.extend_from_slice(&[0x7f, b'E', b'L', b'F', 2, 1, 1, 0]);
    elf.extend_from_slice(&[0; 8]);
    elf.extend_from_slice(&2u16.to_le_bytes()); // e_type = ET_EXEC
    elf.extend_from_slice(&0x3eu16.to_le_bytes()); // e_machine = x86-64
    elf.extend_from_slice(&1u32.to_le_bytes()); // e_version
    elf.extend_from_slice(&entry.to_le_bytes()); // e_entry
    elf.extend_from_slice(&u64::from(EHDR_SIZE).to_le_bytes()); // e_phoff
    elf.extend_from_slice(&0u64.to_le_bytes()); // e_shoff
    elf.extend_from_slice(&0u32.to_le_bytes()); // e_flags
    elf.extend_from_slice(&EHDR_SIZE.to_le_bytes()); // e_ehsize
    elf.extend_from_slice(&PHDR_SIZE.to_le_bytes()); // e_phentsize
    elf.extend_from_slice(&1u16.to_le_bytes()); // e_phnum
    elf.extend_from_slice(&0u16.to_le_bytes()); // e_shentsize
    elf.extend_from_slice(&0u16.to_le_bytes()); // e_shnum
    elf.extend_from_slice(&0u16.to_le_bytes()); // e_shstrndx
    assert_eq!(elf.len(), EHDR_SIZE as usize);

    elf.extend_from_slice(&1u32.to_le_bytes()); // p_type = PT_LOAD
    elf.extend_from_slice(&5u32.to_le_bytes()); // p_flags = R | X
    elf.extend_from_slice(&0u64.to_le_bytes()); // p_offset
    elf.extend_from_slice(&BASE.to_le_bytes()); // p_vaddr
    elf.extend_from_slice(&BASE.to_le_bytes()); // p_paddr
    elf.extend_from_slice(&file_size.to_le_bytes()); // p_filesz
    elf.extend_from_slice(&file_size.to_le_bytes()); // p_memsz
    elf.extend_from_slice(&0x1000u64.to_le_bytes()); // p_align
    assert_eq!(elf.len(), (EHDR_SIZE + PHDR_SIZE) as usize);

    elf.extend_from_slice(&text);
    elf
}
