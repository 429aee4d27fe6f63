// SPDX-License-Identifier: GPL-3.0-or-later
//! Annotated listing generation.

use anyhow::Result;
use std::io::Write;

use crate::annotations::Annotations;
use crate::cfg::{Reconstruction, collect_functions, reconstruct};
use crate::image::FirmwareImage;
use crate::listing::{Instruction, parse_listing};
use crate::or1k::Mnemonic;
use crate::symbols::Symbols;

pub mod explain;
pub mod writer;

pub use explain::Explainer;
pub use writer::ListingWriter;

/// Replays the reconstructed program through the explainer and writes the
/// annotated listing.
pub struct Renderer<'s, 'a> {
    recon: &'s Reconstruction,
    symbols: &'s Symbols<'a>,
    explainer: Explainer<'s, 'a>,
}

impl<'s, 'a> Renderer<'s, 'a> {
    pub fn new(recon: &'s Reconstruction, symbols: &'s Symbols<'a>) -> Self {
        Self {
            recon,
            symbols,
            explainer: Explainer::new(symbols),
        }
    }

    pub fn explainer(&self) -> &Explainer<'s, 'a> {
        &self.explainer
    }

    /// Block, function, xref and jump-table annotations for an instruction
    /// that opens a listing block. Registers are forgotten at block entries.
    fn annotate<W: Write>(&mut self, insn: &Instruction, out: &mut ListingWriter<W>) -> Result<()> {
        let addr = insn.address;
        if self.recon.is_block_start(addr) {
            self.explainer.state_mut().reset_all();
            out.block_separator()?;
        }
        if self.symbols.is_function(addr) {
            out.function_banner()?;
        }
        if let Some(xrefs) = self.recon.xrefs.get(&addr) {
            out.xrefs(xrefs)?;
        }
        for slot in self.recon.table_slots.get(&addr).into_iter().flatten() {
            out.table_slot(slot)?;
        }
        Ok(())
    }

    /// Render one instruction with its annotations.
    pub fn render_instruction<W: Write>(
        &mut self,
        insn: &Instruction,
        out: &mut ListingWriter<W>,
    ) -> Result<()> {
        if insn.opens_block {
            self.annotate(insn, out)?;
        }

        let numeric = self.symbols.numeric_label(insn.address);
        let named = self.symbols.label(insn.address);
        if named != numeric {
            out.label(&named)?;
        }

        let rendering = self.explainer.explain(insn);
        out.instruction(&numeric, &rendering, &insn.text)?;

        // nothing is known about the state at the jump target
        if insn.mnemonic == Mnemonic::J {
            self.explainer.state_mut().reset_all();
        }
        Ok(())
    }

    /// Render the whole program.
    pub fn render<W: Write>(&mut self, out: &mut ListingWriter<W>) -> Result<()> {
        let recon = self.recon;
        for insn in &recon.program {
            self.render_instruction(insn, out)?;
        }
        out.flush()
    }
}

/// Render a reconstructed program as an annotated listing.
pub fn render<W: Write>(
    recon: &Reconstruction,
    symbols: &Symbols<'_>,
    out: &mut ListingWriter<W>,
) -> Result<()> {
    Renderer::new(recon, symbols).render(out)
}

/// Run the whole pipeline: decode the listing, reconstruct control flow and
/// write the annotated listing.
pub fn process_listing<W: Write>(
    listing: &str,
    firmware: Vec<u8>,
    annotations: &Annotations,
    out: &mut ListingWriter<W>,
) -> Result<()> {
    let insns = parse_listing(listing, &annotations.space)?;
    eprintln!("Decoded {} instructions", insns.len());

    let image = FirmwareImage::new(firmware, &annotations.space);
    let functions = collect_functions(&insns, annotations);
    let symbols = Symbols::new(annotations, &image, functions)?;
    let recon = reconstruct(insns, &symbols)?;
    recon.print_stats(&symbols);

    render(&recon, &symbols, out)
}
