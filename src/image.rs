// SPDX-License-Identifier: GPL-3.0-or-later
//! Read-only access to the raw firmware image.
//!
//! All addresses are canonicalized through the address space's mirror before
//! they index the image, so runtime pointers into the DRAM window can be read
//! directly.

use anyhow::{Context, Result};
use byteorder::{BigEndian, ByteOrder};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{self, DecompileError};
use crate::hardware::AddressSpace;

/// Load a whole firmware image from disk.
pub fn load_firmware(path: &Path) -> Result<Vec<u8>> {
    let mut firmware_data = Vec::new();
    File::open(path)
        .with_context(|| format!("Failed to open firmware file {:?}", path))?
        .read_to_end(&mut firmware_data)
        .context("Failed to read firmware file")?;
    Ok(firmware_data)
}

/// Escape bytes for embedding in a C-style string literal (without quotes).
///
/// Control characters and bytes with the high bit set are escaped; the common
/// control characters use their mnemonic escapes, everything else is octal.
pub fn escape_c_string(data: &[u8]) -> String {
    let mut result = String::with_capacity(data.len() * 2);
    for &b in data {
        match b {
            b'\n' => result.push_str("\\n"),
            b'\r' => result.push_str("\\r"),
            b'\t' => result.push_str("\\t"),
            0x0b => result.push_str("\\v"),
            0x0c => result.push_str("\\f"),
            0x07 => result.push_str("\\a"),
            0x08 => result.push_str("\\b"),
            b'\\' => result.push_str("\\\\"),
            b'"' => result.push_str("\\\""),
            0x00..=0x1f | 0x7f..=0xff => result.push_str(&format!("\\{:03o}", b)),
            _ => result.push(b as char),
        }
    }
    result
}

/// The firmware image together with the address space used to validate table
/// entries.
pub struct FirmwareImage<'a> {
    data: Vec<u8>,
    space: &'a AddressSpace,
}

impl<'a> FirmwareImage<'a> {
    pub fn new(data: Vec<u8>, space: &'a AddressSpace) -> Self {
        Self { data, space }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn space(&self) -> &'a AddressSpace {
        self.space
    }

    /// Read a big-endian 32-bit word.
    pub fn read_word(&self, addr: u32) -> error::Result<u32> {
        let offset = self.space.canonical(addr) as usize;
        match self.data.get(offset..offset.saturating_add(4)) {
            Some(bytes) if bytes.len() == 4 => Ok(BigEndian::read_u32(bytes)),
            _ => Err(DecompileError::Bounds {
                addr,
                len: self.data.len(),
            }),
        }
    }

    /// Read a NUL-terminated string. Stops at the end of the image if no NUL is
    /// found; an address past the end yields an empty string.
    pub fn read_cstring(&self, addr: u32) -> &[u8] {
        let offset = self.space.canonical(addr) as usize;
        let tail = self.data.get(offset..).unwrap_or(&[]);
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        &tail[..end]
    }

    /// Read a string and render it as a quoted, escaped literal.
    pub fn read_cstring_formatted(&self, addr: u32) -> String {
        format!("\"{}\"", escape_c_string(self.read_cstring(addr)))
    }

    /// Read a NULL-terminated array of string pointers.
    ///
    /// Stops at the first zero word or the first pointer that does not point
    /// into a data or string range.
    pub fn read_string_table(&self, addr: u32) -> error::Result<Vec<String>> {
        let mut strings = Vec::new();
        let mut cursor = self.space.canonical(addr);
        loop {
            let item = self.read_word(cursor)?;
            if item == 0 || !self.space.is_pointer_target(item) {
                break;
            }
            strings.push(self.read_cstring_formatted(item));
            cursor = cursor.wrapping_add(4);
        }
        Ok(strings)
    }

    /// Read an array of code addresses, stopping at the first word that is not
    /// inside a code or vector range. Entries are returned as stored.
    pub fn read_code_address_table(&self, addr: u32) -> error::Result<Vec<u32>> {
        let mut addresses = Vec::new();
        let mut cursor = self.space.canonical(addr);
        loop {
            let item = self.read_word(cursor)?;
            if !self.space.is_executable(item) {
                break;
            }
            addresses.push(item);
            cursor = cursor.wrapping_add(4);
        }
        Ok(addresses)
    }
}
