// SPDX-License-Identifier: GPL-3.0-or-later
//! Fatal analysis errors.
//!
//! Every variant carries the address needed to locate the offending listing line
//! or image offset. None of them are recovered from: the listing, image, or
//! configuration has to be fixed and the tool rerun.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompileError {
    #[error("{addr:#010x}: unknown instruction `{mnemonic}`")]
    UnknownOpcode { addr: u32, mnemonic: String },

    #[error("{addr:#010x}: `{mnemonic}` takes {expected} operand(s), found {found}")]
    OperandCountMismatch {
        addr: u32,
        mnemonic: String,
        expected: usize,
        found: usize,
    },

    #[error("{addr:#010x}: invalid operand `{operand}` (expected {expected})")]
    OperandSyntax {
        addr: u32,
        operand: String,
        expected: &'static str,
    },

    #[error("read at {addr:#010x} is outside the {len:#x}-byte image")]
    Bounds { addr: u32, len: usize },

    #[error("{second:#010x}: control transfer in the delay slot of {first:#010x}")]
    DoubleDelay { first: u32, second: u32 },

    #[error("{origin:#010x}: branch target {target:#010x} is a delay slot")]
    JumpToDelaySlot { origin: u32, target: u32 },
}

pub type Result<T> = std::result::Result<T, DecompileError>;
