// SPDX-License-Identifier: GPL-3.0-or-later
//! Disassembly listing parsing.
//!
//! Each instruction line has the form
//! `<hex address>: <4 hex bytes> <mnemonic> <operand text>`, as produced by
//! `or1k-elf-objdump -D`. Lines that don't match are skipped, as are lines
//! whose address lies outside every code range.

use std::fmt;

use crate::error::{DecompileError, Result};
use crate::hardware::AddressSpace;
use crate::or1k::{Mnemonic, Operands};

/// A listing line split into its fields. Nothing is decoded yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingLine<'a> {
    pub address: u32,
    pub bytes: [u8; 4],
    pub mnemonic: &'a str,
    pub operands: &'a str,
}

/// Split a listing line into address, raw bytes, mnemonic and operand text.
pub fn parse_line(line: &str) -> Option<ListingLine<'_>> {
    let (addr, rest) = line.trim_start().split_once(':')?;
    if addr.is_empty() || !addr.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let address = u32::from_str_radix(addr, 16).ok()?;

    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let mut rest = rest.trim_start();
    let mut bytes = [0u8; 4];
    for (i, byte) in bytes.iter_mut().enumerate() {
        let pair = rest.get(..2)?;
        if !pair.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        *byte = u8::from_str_radix(pair, 16).ok()?;
        rest = &rest[2..];
        if i < 3 {
            rest = rest.strip_prefix(' ')?;
        }
    }

    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = rest.trim_start();
    let (mnemonic, operands) = rest
        .split_once(char::is_whitespace)
        .unwrap_or((rest, ""));
    let suffix = mnemonic.strip_prefix("l.")?;
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_lowercase()) {
        return None;
    }

    Some(ListingLine {
        address,
        bytes,
        mnemonic,
        operands: operands.trim(),
    })
}

/// A decoded instruction.
///
/// `address` starts out equal to `original_address`; delay-slot normalization
/// may move a delay-slot filler to the address of its control instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub address: u32,
    pub original_address: u32,
    pub mnemonic: Mnemonic,
    pub operands: Operands,
    /// Mnemonic and operand text as they appeared in the listing
    pub text: String,
    /// Whether block separators and annotations may be printed before this
    /// instruction. Cleared for a control instruction whose delay-slot filler
    /// was emitted ahead of it at the same address.
    pub opens_block: bool,
    /// Original address of the delay-slot filler once this control
    /// instruction has been paired with it.
    pub delay_slot: Option<u32>,
}

impl Instruction {
    /// Decode a mnemonic and its operand text.
    pub fn decode(address: u32, mnemonic: &str, operands: &str) -> Result<Self> {
        let m = Mnemonic::from_name(mnemonic).ok_or_else(|| DecompileError::UnknownOpcode {
            addr: address,
            mnemonic: mnemonic.to_string(),
        })?;
        let operands = operands.trim();
        Ok(Instruction {
            address,
            original_address: address,
            mnemonic: m,
            operands: Operands::decode(m, operands, address)?,
            text: format!("{} {}", mnemonic, operands).trim_end().to_string(),
            opens_block: true,
            delay_slot: None,
        })
    }

    /// Immediate branch/call/jump target, if any.
    pub fn target(&self) -> Option<u32> {
        self.operands.target()
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}: {}", self.original_address, self.text)
    }
}

/// Decode every instruction line of `listing` that falls inside a code or
/// vector range. Addresses are canonicalized through the mirror.
pub fn parse_listing(listing: &str, space: &AddressSpace) -> Result<Vec<Instruction>> {
    let mut insns = Vec::new();
    for line in listing.lines() {
        let Some(parsed) = parse_line(line) else {
            continue;
        };
        let address = space.canonical(parsed.address);
        if !space.is_executable(address) {
            continue;
        }
        insns.push(Instruction::decode(address, parsed.mnemonic, parsed.operands)?);
    }
    Ok(insns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{MemoryRange, RangeKind};
    use crate::or1k::Reg;

    #[test]
    fn parse_objdump_line() {
        let line = "    4010:\t9c 21 ff f0 \tl.addi r1,r1,-16";
        assert_eq!(
            parse_line(line),
            Some(ListingLine {
                address: 0x4010,
                bytes: [0x9c, 0x21, 0xff, 0xf0],
                mnemonic: "l.addi",
                operands: "r1,r1,-16",
            })
        );
    }

    #[test]
    fn parse_line_without_operands() {
        let parsed = parse_line("4014: 15 00 00 00 l.nop").unwrap();
        assert_eq!(parsed.mnemonic, "l.nop");
        assert_eq!(parsed.operands, "");
    }

    #[test]
    fn non_instruction_lines_are_skipped() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("00004000 <_start>:"), None);
        assert_eq!(parse_line("Disassembly of section .text:"), None);
        assert_eq!(parse_line("4018: 00 00 00 00 .word 0x0"), None);
        assert_eq!(parse_line("4018: 00 00 00 l.nop"), None);
        assert_eq!(parse_line("zz18: 15 00 00 00 l.nop"), None);
    }

    #[test]
    fn unknown_mnemonic_is_fatal() {
        assert_eq!(
            Instruction::decode(0x4000, "l.div", "r3,r4,r5"),
            Err(DecompileError::UnknownOpcode {
                addr: 0x4000,
                mnemonic: "l.div".into()
            })
        );
    }

    #[test]
    fn parse_listing_keeps_code_lines_only() {
        let space = AddressSpace::new(
            vec![
                MemoryRange::new(RangeKind::Code, 0x4000, 0x4fff, "code"),
                MemoryRange::new(RangeKind::Data, 0x5000, 0x5fff, "data"),
            ],
            None,
        );
        let listing = "\
00004000 <_start>:
    4000:\t9c 60 00 05 \tl.addi r3,r0,5
    4004:\t15 00 00 00 \tl.nop 0x0
    5000:\t12 34 56 78 \tl.bogus r1
";
        let insns = parse_listing(listing, &space).unwrap();
        assert_eq!(insns.len(), 2);
        assert_eq!(insns[0].mnemonic, Mnemonic::Addi);
        assert_eq!(
            insns[0].operands,
            Operands::Rri {
                d: Reg::new(3).unwrap(),
                a: Reg::ZERO,
                i: 5
            }
        );
        assert_eq!(insns[0].text, "l.addi r3,r0,5");
        assert_eq!(insns[1].text, "l.nop 0x0");
        assert!(insns.iter().all(|i| i.opens_block));
    }
}
