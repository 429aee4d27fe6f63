// SPDX-License-Identifier: GPL-3.0-or-later
//! Control-flow reconstruction.
//!
//! Finds basic-block entries (branch/call/jump targets, jump-table entries,
//! function entries), records who references each target, and puts delay-slot
//! fillers in execution order.

use std::collections::{BTreeMap, BTreeSet};

use crate::annotations::Annotations;
use crate::error::{DecompileError, Result};
use crate::listing::Instruction;
use crate::or1k::{ControlKind, Mnemonic};
use crate::symbols::Symbols;

mod blocks;
mod xrefs;

pub use blocks::{DelaySlot, Normalized, normalize_delay_slots};
pub use xrefs::{TableSlot, Xref, XrefKind};

/// Result of reconstruction, consumed by the renderer.
#[derive(Debug, Default)]
pub struct Reconstruction {
    /// Instructions in execution order
    pub program: Vec<Instruction>,
    /// Canonical addresses that start a basic block
    pub block_starts: BTreeSet<u32>,
    /// Incoming references per canonical target, in listing order
    pub xrefs: BTreeMap<u32, Vec<Xref>>,
    /// Jump-table slots per canonical target, in table order
    pub table_slots: BTreeMap<u32, Vec<TableSlot>>,
    /// Original addresses of delay-slot fillers
    pub delay_slots: BTreeSet<u32>,
}

impl Reconstruction {
    pub fn is_block_start(&self, addr: u32) -> bool {
        self.block_starts.contains(&addr)
    }

    /// Print reconstruction statistics
    pub fn print_stats(&self, symbols: &Symbols<'_>) {
        eprintln!(
            "Reconstructed {} instructions: {} basic blocks, {} functions, {} delay slots",
            self.program.len(),
            self.block_starts.len(),
            symbols.functions().count(),
            self.delay_slots.len()
        );
        let slots: usize = self.table_slots.values().map(Vec::len).sum();
        if slots > 0 {
            eprintln!("Resolved {} jump-table entries", slots);
        }
    }
}

/// Function entries: the hand-identified ones plus every `l.jal` target,
/// all canonical.
pub fn collect_functions(insns: &[Instruction], annotations: &Annotations) -> BTreeSet<u32> {
    let space = &annotations.space;
    let mut functions: BTreeSet<u32> = annotations
        .funcs
        .addresses()
        .map(|a| space.canonical(a))
        .collect();
    functions.extend(
        insns
            .iter()
            .filter(|i| i.mnemonic == Mnemonic::Jal)
            .filter_map(Instruction::target)
            .map(|n| space.canonical(n)),
    );
    functions
}

/// Resolve every configured jump table into block starts and slot annotations.
fn resolve_jump_tables(symbols: &Symbols<'_>, recon: &mut Reconstruction) -> Result<()> {
    let space = symbols.space();
    for seed in symbols.jump_table_seeds() {
        let table = symbols.label(seed);
        for (index, entry) in symbols
            .image()
            .read_code_address_table(seed)?
            .into_iter()
            .enumerate()
        {
            let target = space.canonical(entry);
            recon.block_starts.insert(target);
            recon.table_slots.entry(target).or_default().push(TableSlot {
                table: table.clone(),
                index,
            });
        }
    }
    Ok(())
}

/// Canonical immediate target of a branch, jump or call.
fn immediate_target(insn: &Instruction, symbols: &Symbols<'_>) -> Option<(XrefKind, u32)> {
    let kind = match insn.mnemonic.control_kind()? {
        ControlKind::Call => XrefKind::Call,
        k if k.has_immediate_target() => XrefKind::Jump,
        _ => return None,
    };
    insn.target().map(|n| (kind, symbols.space().canonical(n)))
}

/// Run the whole reconstruction over instructions in listing order.
pub fn reconstruct(insns: Vec<Instruction>, symbols: &Symbols<'_>) -> Result<Reconstruction> {
    let mut recon = Reconstruction {
        block_starts: symbols.functions().collect(),
        ..Default::default()
    };

    resolve_jump_tables(symbols, &mut recon)?;

    for insn in &insns {
        if let Some((kind, target)) = immediate_target(insn, symbols) {
            recon.block_starts.insert(target);
            recon.xrefs.entry(target).or_default().push(Xref {
                kind,
                origin: symbols.label(insn.address),
            });
        }
    }

    let normalized = normalize_delay_slots(insns)?;

    for insn in &normalized.program {
        if let Some((_, target)) = immediate_target(insn, symbols)
            && normalized.delay_slots.contains(&target)
        {
            return Err(DecompileError::JumpToDelaySlot {
                origin: insn.original_address,
                target,
            });
        }
    }

    recon.program = normalized.program;
    recon.delay_slots = normalized.delay_slots;
    Ok(recon)
}
