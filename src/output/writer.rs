// SPDX-License-Identifier: GPL-3.0-or-later
//! Listing writer abstraction for consistent output formatting.
//!
//! This module provides the `ListingWriter` struct, which encapsulates the
//! line shapes of the annotated listing:
//! - Instruction lines with their numeric label and original text
//! - Named labels
//! - Block separators and function banners
//! - Cross-reference and jump-table slot annotations

use anyhow::Result;
use std::io::Write;

use crate::cfg::{TableSlot, Xref};

/// Width the pseudo-code column is padded to before the original text.
const RENDER_WIDTH: usize = 90;

/// Function entry banner
const FUNCTION_BANNER: &str = "--------------------------------------------------------------";

/// Listing writer that provides a consistent API for emitting the listing.
pub struct ListingWriter<W: Write> {
    writer: W,
}

impl<W: Write> ListingWriter<W> {
    /// Create a new `ListingWriter` wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Emit one rendered instruction.
    ///
    /// Output format: `label:   <rendering padded to 90> // <original text>`
    pub fn instruction(&mut self, label: &str, rendering: &str, original: &str) -> Result<()> {
        writeln!(
            self.writer,
            "{}:   {:<width$} // {}",
            label,
            rendering,
            original,
            width = RENDER_WIDTH
        )?;
        Ok(())
    }

    /// Emit a named label.
    ///
    /// Output format: `label:`
    pub fn label(&mut self, name: &str) -> Result<()> {
        writeln!(self.writer, "{}:", name)?;
        Ok(())
    }

    /// Two blank lines ahead of a basic block.
    pub fn block_separator(&mut self) -> Result<()> {
        write!(self.writer, "\n\n")?;
        Ok(())
    }

    /// Dashed banner followed by two blank lines ahead of a function entry.
    pub fn function_banner(&mut self) -> Result<()> {
        write!(self.writer, "{}\n\n\n", FUNCTION_BANNER)?;
        Ok(())
    }

    /// Output format: `// xrefs from: call:fn_004000 jump:l_004010`
    pub fn xrefs(&mut self, xrefs: &[Xref]) -> Result<()> {
        write!(self.writer, "// xrefs from:")?;
        for xref in xrefs {
            write!(self.writer, " {}", xref)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    /// Output format: `jt_008200[3]:`
    pub fn table_slot(&mut self, slot: &TableSlot) -> Result<()> {
        writeln!(self.writer, "{}:", slot)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
