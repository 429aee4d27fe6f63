// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use or1k_decompiler::{
    annotations::Annotations,
    image::load_firmware,
    output::{ListingWriter, process_listing},
};

#[derive(Parser)]
#[command(name = "or1k-decompiler")]
#[command(about = "Annotate OpenRISC firmware disassembly with pseudo-code")]
struct Args {
    /// Path to the or1k-elf-objdump listing
    listing: PathBuf,

    /// Path to the firmware image
    firmware: PathBuf,

    /// Directory containing annotation JSON files
    #[arg(short, long, default_value = "annotations")]
    annotations: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load annotations from JSON files
    let annotations = Annotations::load_from_dir(&args.annotations)?;
    annotations.print_stats(&args.annotations);

    let firmware_data = load_firmware(&args.firmware)?;
    eprintln!(
        "Loaded firmware: {} bytes ({:#x})",
        firmware_data.len(),
        firmware_data.len()
    );

    let listing = std::fs::read_to_string(&args.listing)
        .with_context(|| format!("Failed to read listing file {:?}", args.listing))?;

    let mut out = ListingWriter::new(BufWriter::new(io::stdout().lock()));
    process_listing(&listing, firmware_data, &annotations, &mut out)
        .with_context(|| format!("Failed to decompile {:?}", args.listing))?;

    eprintln!("Done!");
    Ok(())
}
