// SPDX-License-Identifier: GPL-3.0-or-later
//! Label resolution and symbolic rendering of 32-bit values.

use std::collections::{BTreeSet, HashMap};

use crate::annotations::Annotations;
use crate::error::Result;
use crate::hardware::{AddressSpace, RangeKind};
use crate::image::FirmwareImage;
use crate::or1k::hex32;

/// Everything the renderer needs to turn an address or a register value into
/// a name: the annotations, the image (for strings), the discovered function
/// entries and the pre-read string tables.
pub struct Symbols<'a> {
    annotations: &'a Annotations,
    image: &'a FirmwareImage<'a>,
    /// Canonical function entry addresses
    functions: BTreeSet<u32>,
    /// Canonical jump-table seed addresses
    jump_tables: BTreeSet<u32>,
    /// Pre-rendered string tables keyed by canonical seed address
    string_tables: HashMap<u32, Vec<String>>,
}

impl<'a> Symbols<'a> {
    /// Build the symbol context. String tables are read from the image here,
    /// once, so rendering never touches the image for them again.
    pub fn new(
        annotations: &'a Annotations,
        image: &'a FirmwareImage<'a>,
        functions: BTreeSet<u32>,
    ) -> Result<Self> {
        let space = &annotations.space;
        let jump_tables = annotations
            .tables
            .jump_tables
            .iter()
            .map(|&a| space.canonical(a))
            .collect();

        let mut string_tables = HashMap::new();
        for &seed in &annotations.tables.string_tables {
            string_tables.insert(space.canonical(seed), image.read_string_table(seed)?);
        }

        Ok(Self {
            annotations,
            image,
            functions,
            jump_tables,
            string_tables,
        })
    }

    pub fn space(&self) -> &'a AddressSpace {
        &self.annotations.space
    }

    pub fn image(&self) -> &'a FirmwareImage<'a> {
        self.image
    }

    pub fn is_function(&self, addr: u32) -> bool {
        self.functions.contains(&self.space().canonical(addr))
    }

    /// Canonical function entry addresses, ascending.
    pub fn functions(&self) -> impl Iterator<Item = u32> + '_ {
        self.functions.iter().copied()
    }

    /// Canonical jump-table seed addresses, ascending.
    pub fn jump_table_seeds(&self) -> impl Iterator<Item = u32> + '_ {
        self.jump_tables.iter().copied()
    }

    /// Resolved strings of the table seeded at `addr`, if it is one.
    pub fn string_table(&self, addr: u32) -> Option<&[String]> {
        self.string_tables
            .get(&self.space().canonical(addr))
            .map(Vec::as_slice)
    }

    /// Preferred label: jump table, configured name, function, plain label.
    pub fn label(&self, addr: u32) -> String {
        self.make_label(addr, true)
    }

    /// Label without configured names, used as the left-hand column of every
    /// listing line.
    pub fn numeric_label(&self, addr: u32) -> String {
        self.make_label(addr, false)
    }

    fn make_label(&self, addr: u32, named: bool) -> String {
        let canonical = self.space().canonical(addr);
        if self.jump_tables.contains(&canonical) {
            return format!("jt_{:06x}", canonical);
        }
        if named {
            let labels = &self.annotations.labels;
            if let Some(name) = labels.get(addr).or_else(|| labels.get(canonical)) {
                return name.to_string();
            }
        }
        if self.functions.contains(&canonical) {
            format!("fn_{:06x}", canonical)
        } else {
            format!("l_{:06x}", canonical)
        }
    }

    /// Render a known register value.
    ///
    /// Peripheral names come first, then the first declared range containing
    /// the raw value, then small decimal literals, then plain hex.
    pub fn format_value(&self, v: i32) -> String {
        let raw = v as u32;
        if let Some(name) = self.annotations.registers.get(raw) {
            return format!("{} /* {} */", name, hex32(v));
        }

        if let Some(range) = self.space().classify(raw) {
            let phys = self.space().canonical(raw);

            if self.jump_tables.contains(&phys) {
                return format!("{} /* JUMP TABLE {} */", hex32(v), self.label(phys));
            }
            if let Some(strings) = self.string_tables.get(&phys) {
                return format!("C_STR_ARRAY [{}] /* {} */", strings.join(", "), hex32(v));
            }

            match range.kind {
                RangeKind::String => {
                    return format!(
                        "C_STR {} /* {} at {} */",
                        self.image.read_cstring_formatted(phys),
                        hex32(v),
                        hex32(phys)
                    );
                }
                RangeKind::Code => {
                    return format!("{} /* {} at {} */", self.label(phys), hex32(v), hex32(phys));
                }
                // vectors are never pointed at on purpose
                RangeKind::Vector => {}
                RangeKind::Data => {
                    return format!(
                        "{} /* DATA {} AT {} OFF +{:#x} */",
                        hex32(v),
                        range.label,
                        hex32(phys),
                        range.offset_of(raw)
                    );
                }
                RangeKind::RegisterWindow => {
                    return format!(
                        "{} /* REG_OF {} AT +{:#x} */",
                        hex32(v),
                        range.label,
                        range.offset_of(raw)
                    );
                }
            }
        }

        if (-128..=127).contains(&v) {
            format!("{} /* {} */", v, hex32(v))
        } else {
            hex32(v)
        }
    }
}
