// SPDX-License-Identifier: GPL-3.0-or-later
//! OpenRISC 1000 instruction set: mnemonics, registers, and operand decoding.

pub mod format;
pub mod insn;
pub mod operands;
pub mod regs;

pub use format::{compare_immediate, displacement, hex32, sign_extend16, spr_selector};
pub use insn::*;
pub use operands::Operands;
pub use regs::*;
