// SPDX-License-Identifier: GPL-3.0-or-later
//! Operand decoding.
//!
//! The listing's operand text is split on commas and each field is parsed
//! according to the mnemonic's [`OperandFormat`]. The decoded [`Operands`]
//! value carries exactly the fields its format defines.

use super::insn::{Mnemonic, OperandFormat};
use super::regs::Reg;
use crate::error::{DecompileError, Result};

/// Decoded operands. Field names follow the listing convention: `d`
/// destination, `a`/`b` sources, `i` immediate, `k` shifted or SPR immediate,
/// `n` branch target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operands {
    Rrr { d: Reg, a: Reg, b: Reg },
    Rri { d: Reg, a: Reg, i: i32 },
    Shifted { d: Reg, k: i32 },
    Target { n: u32 },
    Register { d: Reg },
    Load { d: Reg, a: Reg, i: i32 },
    Store { d: Reg, a: Reg, i: i32 },
    SprRead { d: Reg, a: Reg, k: i32 },
    SprWrite { a: Reg, b: Reg, k: i32 },
    CompareReg { a: Reg, b: Reg },
    CompareImm { a: Reg, i: i32 },
    None,
}

impl Operands {
    /// Decode `text` for `mnemonic` at `addr` (used for error context only).
    pub fn decode(mnemonic: Mnemonic, text: &str, addr: u32) -> Result<Self> {
        let format = mnemonic.format();
        if format == OperandFormat::NoOperand {
            return Ok(Operands::None);
        }

        let parts = split_operands(text);
        if parts.len() != format.arity() {
            return Err(DecompileError::OperandCountMismatch {
                addr,
                mnemonic: mnemonic.name().to_string(),
                expected: format.arity(),
                found: parts.len(),
            });
        }

        let p = FieldParser { addr };
        Ok(match format {
            OperandFormat::Rrr => Operands::Rrr {
                d: p.reg(parts[0])?,
                a: p.reg(parts[1])?,
                b: p.reg(parts[2])?,
            },
            OperandFormat::Rri => Operands::Rri {
                d: p.reg(parts[0])?,
                a: p.reg(parts[1])?,
                i: p.imm(parts[2])?,
            },
            OperandFormat::Shifted => Operands::Shifted {
                d: p.reg(parts[0])?,
                k: p.imm(parts[1])?,
            },
            OperandFormat::Target => Operands::Target {
                n: p.target(parts[0])?,
            },
            OperandFormat::Register => Operands::Register {
                d: p.reg(parts[0])?,
            },
            OperandFormat::Load => {
                let (i, a) = p.mem(parts[1])?;
                Operands::Load {
                    d: p.reg(parts[0])?,
                    a,
                    i,
                }
            }
            OperandFormat::Store => {
                let (i, d) = p.mem(parts[0])?;
                Operands::Store {
                    d,
                    a: p.reg(parts[1])?,
                    i,
                }
            }
            OperandFormat::SprRead => Operands::SprRead {
                d: p.reg(parts[0])?,
                a: p.reg(parts[1])?,
                k: p.imm(parts[2])?,
            },
            OperandFormat::SprWrite => Operands::SprWrite {
                a: p.reg(parts[0])?,
                b: p.reg(parts[1])?,
                k: p.imm(parts[2])?,
            },
            OperandFormat::CompareReg => Operands::CompareReg {
                a: p.reg(parts[0])?,
                b: p.reg(parts[1])?,
            },
            OperandFormat::CompareImm => Operands::CompareImm {
                a: p.reg(parts[0])?,
                i: p.imm(parts[1])?,
            },
            OperandFormat::NoOperand => Operands::None,
        })
    }

    /// Immediate branch target, if this operand set has one.
    pub fn target(&self) -> Option<u32> {
        match *self {
            Operands::Target { n } => Some(n),
            _ => None,
        }
    }
}

/// Split an operand string into individual comma-separated operands, trimming whitespace.
fn split_operands(op_str: &str) -> Vec<&str> {
    op_str.split(',').map(|s| s.trim()).collect()
}

/// Parse a decimal literal with an optional leading minus sign.
fn parse_decimal(s: &str) -> Option<i32> {
    let digits = s.strip_prefix('-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Per-field parsers; each failure reports the instruction address.
struct FieldParser {
    addr: u32,
}

impl FieldParser {
    fn error(&self, operand: &str, expected: &'static str) -> DecompileError {
        DecompileError::OperandSyntax {
            addr: self.addr,
            operand: operand.to_string(),
            expected,
        }
    }

    fn reg(&self, s: &str) -> Result<Reg> {
        Reg::parse(s).ok_or_else(|| self.error(s, "register"))
    }

    /// Branch targets are bare hex, possibly followed by a symbol such as
    /// `<fn_main>`; only the leading hex digits are used.
    fn target(&self, s: &str) -> Result<u32> {
        let end = s
            .find(|c: char| !c.is_ascii_hexdigit())
            .unwrap_or(s.len());
        if end == 0 {
            return Err(self.error(s, "hex branch target"));
        }
        u32::from_str_radix(&s[..end], 16).map_err(|_| self.error(s, "hex branch target"))
    }

    /// `0x`-prefixed hex or signed decimal.
    fn imm(&self, s: &str) -> Result<i32> {
        let value = match s.strip_prefix("0x") {
            Some(hex) if !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit()) => {
                u32::from_str_radix(hex, 16).ok().map(|v| v as i32)
            }
            Some(_) => None,
            None => parse_decimal(s),
        };
        value.ok_or_else(|| self.error(s, "immediate"))
    }

    /// `imm(reg)` memory operand.
    fn mem(&self, s: &str) -> Result<(i32, Reg)> {
        let parsed = s
            .strip_suffix(')')
            .and_then(|inner| inner.split_once('('))
            .and_then(|(disp, reg)| Some((parse_decimal(disp)?, Reg::parse(reg)?)));
        parsed.ok_or_else(|| self.error(s, "imm(reg)"))
    }
}
