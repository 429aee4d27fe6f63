// SPDX-License-Identifier: GPL-3.0-or-later
//! Per-instruction pseudo-code rendering.
//!
//! Each instruction becomes one line of pseudo-code. Arithmetic folds to a
//! concrete value when every source register is known; otherwise the line
//! shows the expression over register aliases and the destination becomes
//! unknown. The compare flag is never tracked.

use crate::listing::Instruction;
use crate::or1k::{
    Access, Mnemonic, Operands, Reg, compare_immediate, displacement, hex32, sign_extend16,
    spr_selector,
};
use crate::state::SymbolicState;
use crate::symbols::Symbols;

/// Renders instructions while threading the symbolic register state.
pub struct Explainer<'s, 'a> {
    symbols: &'s Symbols<'a>,
    state: SymbolicState,
}

impl<'s, 'a> Explainer<'s, 'a> {
    pub fn new(symbols: &'s Symbols<'a>) -> Self {
        Self {
            symbols,
            state: SymbolicState::new(),
        }
    }

    pub fn state(&self) -> &SymbolicState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SymbolicState {
        &mut self.state
    }

    /// Render one instruction and apply its effect to the register state.
    pub fn explain(&mut self, insn: &Instruction) -> String {
        let m = insn.mnemonic;
        match insn.operands {
            Operands::Rrr { d, a, b } => self.binary(m, d, a, b),
            Operands::Rri { d, a, i } => self.immediate(m, d, a, i),
            Operands::Shifted { d, k } => {
                self.state.set(d, ((k as u32) << 16) as i32);
                if k == 0 {
                    format!("{} = 0", d.alias())
                } else {
                    format!("{} = 0x{:04x}0000", d.alias(), k & 0xffff)
                }
            }
            Operands::Target { n } => {
                let label = self.symbols.label(n);
                match m {
                    Mnemonic::Bf => format!("if (FLAG) goto {}", label),
                    Mnemonic::Bnf => format!("if (!FLAG) goto {}", label),
                    Mnemonic::Jal => format!("call {}", label),
                    _ => format!("goto {}", label),
                }
            }
            Operands::Register { d } => match m {
                Mnemonic::Jalr => format!("call {}", d.alias()),
                _ if d == Reg::LR => "return".to_string(),
                _ => format!("goto {}", d.alias()),
            },
            Operands::Load { d, a, i } => {
                self.state.set_unknown(d);
                let access = m.access().unwrap_or(Access::U32);
                format!("{} = [{} {}{}]", d.alias(), access, a.alias(), displacement(i))
            }
            Operands::Store { d, a, i } => {
                let access = m.access().unwrap_or(Access::U32);
                let value = match self.state.get(a) {
                    Some(v) => self.symbols.format_value(((v as u32) & access.mask()) as i32),
                    None => a.alias(),
                };
                format!("[{} {}{}] = {}", access, d.alias(), displacement(i), value)
            }
            Operands::SprRead { d, a, k } => {
                self.state.set_unknown(d);
                format!("{} = SPR({})", d.alias(), spr_selector(a, k))
            }
            Operands::SprWrite { a, b, k } => {
                let value = if self.state.is_known(b) {
                    self.state.format_register(b, self.symbols)
                } else {
                    b.alias()
                };
                format!("SPR({}) = {}", spr_selector(a, k), value)
            }
            Operands::CompareReg { a, b } => {
                let (kind, op) = comparison(m);
                format!("FLAG = {}{} {} {}", kind, a.alias(), op, b.alias())
            }
            Operands::CompareImm { a, i } => {
                let (kind, op) = comparison(m);
                format!("FLAG = {}{} {} {}", kind, a.alias(), op, compare_immediate(i))
            }
            Operands::None => format!("asm \"{}\"", m),
        }
    }

    /// Assign a folded value and render it.
    fn assign(&mut self, d: Reg, value: i32) -> String {
        self.state.set(d, value);
        format!("{} = {}", d.alias(), self.state.format_register(d, self.symbols))
    }

    fn binary(&mut self, m: Mnemonic, d: Reg, a: Reg, b: Reg) -> String {
        if let (Some(x), Some(y)) = (self.state.get(a), self.state.get(b))
            && let Some(v) = fold_binary(m, x, y)
        {
            return self.assign(d, v);
        }
        self.state.set_unknown(d);

        let (d, a, b) = (d.alias(), a.alias(), b.alias());
        match m {
            Mnemonic::Add if a == "0" => format!("{} = {}", d, b),
            Mnemonic::Sub if a == "0" => format!("{} = -{}", d, b),
            Mnemonic::Add => format!("{} = {} + {}", d, a, b),
            Mnemonic::Sub => format!("{} = {} - {}", d, a, b),
            Mnemonic::And => format!("{} = {} & {}", d, a, b),
            Mnemonic::Xor => format!("{} = {} ^ {}", d, a, b),
            Mnemonic::Or => format!("{} = {} | {}", d, a, b),
            Mnemonic::Mul => format!("{} = {} * {}", d, a, b),
            Mnemonic::Sll => format!("{} = {} << {}", d, a, b),
            Mnemonic::Sra => format!("{} = arith {} >> {}", d, a, b),
            Mnemonic::Srl => format!("{} = logical {} >> {}", d, a, b),
            _ => format!("{} = {} ror {}", d, a, b),
        }
    }

    fn immediate(&mut self, m: Mnemonic, d: Reg, a: Reg, i: i32) -> String {
        if let Some(x) = self.state.get(a)
            && let Some(v) = fold_immediate(m, x, i)
        {
            return self.assign(d, v);
        }
        self.state.set_unknown(d);

        let (d, a) = (d.alias(), a.alias());
        match m {
            Mnemonic::Addi if i < 0 => format!("{} = {} - {}", d, a, -(i as i64)),
            Mnemonic::Addi if i == 0 => format!("{} = {}", d, a),
            Mnemonic::Addi => format!("{} = {} + {}", d, a, i),
            Mnemonic::Andi => format!("{} = {} & {}", d, a, hex32(i & 0xffff)),
            Mnemonic::Xori => format!("{} = {} ^ {}", d, a, hex32(sign_extend16(i))),
            Mnemonic::Ori if i == 0 => format!("{} = {}", d, a),
            Mnemonic::Ori => format!("{} = {} | {}", d, a, hex32(i & 0xffff)),
            Mnemonic::Slli => format!("{} = {} << {}", d, a, i),
            Mnemonic::Srai => format!("{} = arith {} >> {}", d, a, i),
            Mnemonic::Srli => format!("{} = logical {} >> {}", d, a, i),
            _ => format!("{} = {} ror {}", d, a, i),
        }
    }
}

/// Constant folding for register-register arithmetic. Multiply, logical
/// shift right and rotate are never folded.
fn fold_binary(m: Mnemonic, x: i32, y: i32) -> Option<i32> {
    match m {
        Mnemonic::Add => Some(x.wrapping_add(y)),
        Mnemonic::Sub => Some(x.wrapping_sub(y)),
        Mnemonic::And => Some(x & y),
        Mnemonic::Xor => Some(x ^ y),
        Mnemonic::Or => Some(x | y),
        Mnemonic::Sll => Some(x.wrapping_shl(y as u32)),
        Mnemonic::Sra => Some(x.wrapping_shr(y as u32)),
        _ => None,
    }
}

fn fold_immediate(m: Mnemonic, x: i32, i: i32) -> Option<i32> {
    match m {
        Mnemonic::Addi => Some(x.wrapping_add(i)),
        Mnemonic::Andi => Some(x & i),
        Mnemonic::Xori => Some(x ^ i),
        Mnemonic::Ori => Some(x | i),
        Mnemonic::Slli => Some(x.wrapping_shl(i as u32)),
        Mnemonic::Srai => Some(x.wrapping_shr(i as u32)),
        _ => None,
    }
}

/// Signedness prefix and operator of a compare instruction.
fn comparison(m: Mnemonic) -> (&'static str, &'static str) {
    match m {
        Mnemonic::Sfeq | Mnemonic::Sfeqi => ("", "=="),
        Mnemonic::Sfne | Mnemonic::Sfnei => ("", "!="),
        Mnemonic::Sfgtu | Mnemonic::Sfgtui => ("unsigned ", ">"),
        Mnemonic::Sfgeu | Mnemonic::Sfgeui => ("unsigned ", ">="),
        Mnemonic::Sfltu | Mnemonic::Sfltui => ("unsigned ", "<"),
        Mnemonic::Sfleu | Mnemonic::Sfleui => ("unsigned ", "<="),
        Mnemonic::Sfgts | Mnemonic::Sfgtsi => ("signed ", ">"),
        Mnemonic::Sfges | Mnemonic::Sfgesi => ("signed ", ">="),
        Mnemonic::Sflts | Mnemonic::Sfltsi => ("signed ", "<"),
        _ => ("signed ", "<="),
    }
}
