// SPDX-License-Identifier: GPL-3.0-or-later
//! Memory map of the target: declared address ranges and the mirrored DRAM window.

pub mod memmap;

pub use memmap::*;
