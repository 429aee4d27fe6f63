// SPDX-License-Identifier: GPL-3.0-or-later
//! The supported OpenRISC instruction set.
//!
//! The mnemonic set is closed: every mnemonic maps to exactly one operand
//! format, and a listing containing anything else cannot be processed.

use std::fmt;

/// Operand layout of an instruction, named after the listing syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandFormat {
    /// `d, a, b`
    Rrr,
    /// `d, a, imm`
    Rri,
    /// `d, k` (immediate shifted into the upper half)
    Shifted,
    /// `target`
    Target,
    /// `d`
    Register,
    /// `d, imm(a)`
    Load,
    /// `imm(d), a`
    Store,
    /// `d, a, k`
    SprRead,
    /// `a, b, k`
    SprWrite,
    /// `a, b`
    CompareReg,
    /// `a, imm`
    CompareImm,
    /// Operand text, if any, is ignored
    NoOperand,
}

impl OperandFormat {
    /// Number of comma-separated operands in the listing text.
    pub fn arity(self) -> usize {
        match self {
            OperandFormat::Rrr | OperandFormat::Rri => 3,
            OperandFormat::SprRead | OperandFormat::SprWrite => 3,
            OperandFormat::Shifted
            | OperandFormat::Load
            | OperandFormat::Store
            | OperandFormat::CompareReg
            | OperandFormat::CompareImm => 2,
            OperandFormat::Target | OperandFormat::Register => 1,
            OperandFormat::NoOperand => 0,
        }
    }
}

/// How an instruction transfers control. All of these have a delay slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// Conditional branch to an immediate target
    Branch,
    /// Unconditional jump to an immediate target
    Jump,
    /// Call to an immediate target
    Call,
    /// Call through a register
    CallRegister,
    /// Jump through a register (including returns)
    JumpRegister,
}

impl ControlKind {
    /// Whether the target is encoded in the instruction.
    pub fn has_immediate_target(self) -> bool {
        matches!(
            self,
            ControlKind::Branch | ControlKind::Jump | ControlKind::Call
        )
    }
}

/// Width and signedness of a memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    S8,
    U8,
    S16,
    U16,
    U32,
}

impl Access {
    /// Mask applied to a stored value of this width.
    pub fn mask(self) -> u32 {
        match self {
            Access::S8 | Access::U8 => 0xff,
            Access::S16 | Access::U16 => 0xffff,
            Access::U32 => 0xffff_ffff,
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Access::S8 => "s8",
            Access::U8 => "u8",
            Access::S16 => "s16",
            Access::U16 => "u16",
            Access::U32 => "u32",
        })
    }
}

macro_rules! mnemonics {
    ($($variant:ident => $name:literal, $format:ident;)*) => {
        /// A supported instruction mnemonic.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Mnemonic {
            $($variant,)*
        }

        impl Mnemonic {
            pub const ALL: &'static [Mnemonic] = &[$(Mnemonic::$variant,)*];

            /// Listing spelling, e.g. `l.addi`.
            pub fn name(self) -> &'static str {
                match self {
                    $(Mnemonic::$variant => $name,)*
                }
            }

            pub fn format(self) -> OperandFormat {
                match self {
                    $(Mnemonic::$variant => OperandFormat::$format,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Mnemonic::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

mnemonics! {
    Add => "l.add", Rrr;
    And => "l.and", Rrr;
    Sub => "l.sub", Rrr;
    Xor => "l.xor", Rrr;
    Or => "l.or", Rrr;
    Mul => "l.mul", Rrr;
    Sll => "l.sll", Rrr;
    Sra => "l.sra", Rrr;
    Srl => "l.srl", Rrr;
    Ror => "l.ror", Rrr;

    Addi => "l.addi", Rri;
    Andi => "l.andi", Rri;
    Xori => "l.xori", Rri;
    Ori => "l.ori", Rri;
    Slli => "l.slli", Rri;
    Srai => "l.srai", Rri;
    Srli => "l.srli", Rri;
    Rori => "l.rori", Rri;

    Movhi => "l.movhi", Shifted;

    Bf => "l.bf", Target;
    Bnf => "l.bnf", Target;
    J => "l.j", Target;
    Jal => "l.jal", Target;

    Jalr => "l.jalr", Register;
    Jr => "l.jr", Register;

    Lbs => "l.lbs", Load;
    Lbz => "l.lbz", Load;
    Lhs => "l.lhs", Load;
    Lhz => "l.lhz", Load;
    Lwz => "l.lwz", Load;

    Sb => "l.sb", Store;
    Sh => "l.sh", Store;
    Sw => "l.sw", Store;

    Mfspr => "l.mfspr", SprRead;
    Mtspr => "l.mtspr", SprWrite;

    Sfeq => "l.sfeq", CompareReg;
    Sfne => "l.sfne", CompareReg;
    Sfgtu => "l.sfgtu", CompareReg;
    Sfgeu => "l.sfgeu", CompareReg;
    Sfltu => "l.sfltu", CompareReg;
    Sfleu => "l.sfleu", CompareReg;
    Sfgts => "l.sfgts", CompareReg;
    Sfges => "l.sfges", CompareReg;
    Sflts => "l.sflts", CompareReg;
    Sfles => "l.sfles", CompareReg;

    Sfeqi => "l.sfeqi", CompareImm;
    Sfnei => "l.sfnei", CompareImm;
    Sfgtui => "l.sfgtui", CompareImm;
    Sfgeui => "l.sfgeui", CompareImm;
    Sfltui => "l.sfltui", CompareImm;
    Sfleui => "l.sfleui", CompareImm;
    Sfgtsi => "l.sfgtsi", CompareImm;
    Sfgesi => "l.sfgesi", CompareImm;
    Sfltsi => "l.sfltsi", CompareImm;
    Sflesi => "l.sflesi", CompareImm;

    Nop => "l.nop", NoOperand;
    Csync => "l.csync", NoOperand;
    Msync => "l.msync", NoOperand;
    Psync => "l.psync", NoOperand;
    Rfe => "l.rfe", NoOperand;
}

impl Mnemonic {
    /// Control-transfer class, or `None` for instructions without a delay slot.
    pub fn control_kind(self) -> Option<ControlKind> {
        match self {
            Mnemonic::Bf | Mnemonic::Bnf => Some(ControlKind::Branch),
            Mnemonic::J => Some(ControlKind::Jump),
            Mnemonic::Jal => Some(ControlKind::Call),
            Mnemonic::Jalr => Some(ControlKind::CallRegister),
            Mnemonic::Jr => Some(ControlKind::JumpRegister),
            _ => None,
        }
    }

    pub fn is_control(self) -> bool {
        self.control_kind().is_some()
    }

    pub fn is_nop(self) -> bool {
        self == Mnemonic::Nop
    }

    /// Memory access performed by a load or store.
    pub fn access(self) -> Option<Access> {
        match self {
            Mnemonic::Lbs => Some(Access::S8),
            Mnemonic::Lbz | Mnemonic::Sb => Some(Access::U8),
            Mnemonic::Lhs => Some(Access::S16),
            Mnemonic::Lhz | Mnemonic::Sh => Some(Access::U16),
            Mnemonic::Lwz | Mnemonic::Sw => Some(Access::U32),
            _ => None,
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
