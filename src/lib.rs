// SPDX-License-Identifier: GPL-3.0-or-later
//! OpenRISC Firmware Decompiler Library
//!
//! This library turns an `or1k-elf-objdump` listing of an OpenRISC 1000
//! firmware image (such as the Allwinner AR100 "arisc" co-processor firmware)
//! into an annotated pseudo-code listing.

pub mod annotations;
pub mod cfg;
pub mod error;
pub mod hardware;
pub mod image;
pub mod listing;
pub mod or1k;
pub mod output;
pub mod state;
pub mod symbols;
