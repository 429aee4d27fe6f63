// SPDX-License-Identifier: GPL-3.0-or-later
//! Branch-delay-slot normalization.
//!
//! OpenRISC executes the instruction after every branch, jump or call before
//! control actually transfers. The listing shows them in memory order; the
//! rendered program shows them in execution order: the filler first, at the
//! control instruction's address, then the control instruction itself.
//! A `l.nop` filler carries no meaning and is dropped.

use std::collections::BTreeSet;

use crate::error::{DecompileError, Result};
use crate::listing::Instruction;

/// The single pending control instruction waiting for its delay slot.
#[derive(Debug)]
pub enum DelaySlot {
    Empty,
    Holding(Instruction),
}

/// Instructions in execution order, plus the original addresses of every
/// delay-slot filler.
#[derive(Debug, Default)]
pub struct Normalized {
    pub program: Vec<Instruction>,
    pub delay_slots: BTreeSet<u32>,
}

impl DelaySlot {
    /// Feed the next listing instruction through the state machine.
    pub fn step(self, insn: Instruction, out: &mut Normalized) -> Result<DelaySlot> {
        match self {
            // already paired on an earlier pass
            DelaySlot::Empty if insn.delay_slot.is_some() => {
                out.program.push(insn);
                Ok(DelaySlot::Empty)
            }
            DelaySlot::Empty if insn.mnemonic.is_control() => Ok(DelaySlot::Holding(insn)),
            DelaySlot::Empty => {
                out.program.push(insn);
                Ok(DelaySlot::Empty)
            }
            DelaySlot::Holding(first) if insn.mnemonic.is_control() => {
                Err(DecompileError::DoubleDelay {
                    first: first.original_address,
                    second: insn.original_address,
                })
            }
            DelaySlot::Holding(mut control) => {
                out.delay_slots.insert(insn.original_address);
                control.delay_slot = Some(insn.original_address);
                if !insn.mnemonic.is_nop() {
                    let mut filler = insn;
                    filler.address = control.address;
                    control.opens_block = false;
                    out.program.push(filler);
                }
                out.program.push(control);
                Ok(DelaySlot::Empty)
            }
        }
    }

    /// End of listing: a control instruction still waiting is emitted as-is.
    pub fn finish(self, out: &mut Normalized) {
        if let DelaySlot::Holding(control) = self {
            out.program.push(control);
        }
    }
}

/// Reorder every control instruction after its delay-slot filler.
///
/// Fails with [`DecompileError::DoubleDelay`] when a control instruction sits
/// in another one's delay slot.
pub fn normalize_delay_slots(insns: impl IntoIterator<Item = Instruction>) -> Result<Normalized> {
    let mut out = Normalized::default();
    let mut slot = DelaySlot::Empty;
    for insn in insns {
        slot = slot.step(insn, &mut out)?;
    }
    slot.finish(&mut out);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insn(addr: u32, mnemonic: &str, ops: &str) -> Instruction {
        Instruction::decode(addr, mnemonic, ops).unwrap()
    }

    fn order(n: &Normalized) -> Vec<(u32, u32, bool)> {
        n.program
            .iter()
            .map(|i| (i.address, i.original_address, i.opens_block))
            .collect()
    }

    #[test]
    fn filler_moves_before_control() {
        let n = normalize_delay_slots(vec![
            insn(0x100, "l.addi", "r3,r0,1"),
            insn(0x104, "l.jal", "200"),
            insn(0x108, "l.addi", "r4,r0,2"),
            insn(0x10c, "l.lwz", "r5,0(r1)"),
        ])
        .unwrap();

        assert_eq!(
            order(&n),
            vec![
                (0x100, 0x100, true),
                (0x104, 0x108, true),
                (0x104, 0x104, false),
                (0x10c, 0x10c, true),
            ]
        );
        assert_eq!(n.program[2].delay_slot, Some(0x108));
        assert_eq!(n.delay_slots, BTreeSet::from([0x108]));
    }

    #[test]
    fn nop_filler_is_dropped() {
        let n = normalize_delay_slots(vec![
            insn(0x100, "l.jr", "r9"),
            insn(0x104, "l.nop", "0x0"),
            insn(0x108, "l.addi", "r3,r0,1"),
        ])
        .unwrap();

        assert_eq!(order(&n), vec![(0x100, 0x100, true), (0x108, 0x108, true)]);
        assert_eq!(n.delay_slots, BTreeSet::from([0x104]));
    }

    #[test]
    fn adjacent_controls_fail() {
        let err = normalize_delay_slots(vec![
            insn(0x100, "l.bf", "200"),
            insn(0x104, "l.j", "300"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            DecompileError::DoubleDelay {
                first: 0x100,
                second: 0x104
            }
        );
    }

    #[test]
    fn pending_control_is_flushed() {
        let n = normalize_delay_slots(vec![
            insn(0x100, "l.addi", "r3,r0,1"),
            insn(0x104, "l.j", "100"),
        ])
        .unwrap();
        assert_eq!(order(&n), vec![(0x100, 0x100, true), (0x104, 0x104, true)]);
        assert!(n.delay_slots.is_empty());
    }

    #[test]
    fn normalization_is_idempotent() {
        let first = normalize_delay_slots(vec![
            insn(0x100, "l.sfeqi", "r3,0"),
            insn(0x104, "l.bf", "110"),
            insn(0x108, "l.addi", "r11,r0,0"),
            insn(0x10c, "l.jr", "r9"),
            insn(0x110, "l.nop", "0x0"),
            insn(0x114, "l.j", "100"),
            insn(0x118, "l.addi", "r11,r0,1"),
        ])
        .unwrap();
        let second = normalize_delay_slots(first.program.clone()).unwrap();
        assert_eq!(second.program, first.program);
        assert!(second.delay_slots.is_empty());
    }
}
