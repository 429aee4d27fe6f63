// SPDX-License-Identifier: GPL-3.0-or-later
//! Address-space classification.
//!
//! The firmware's address space is described by an ordered list of ranges. A raw
//! 32-bit value is classified by the first range that contains it; overlapping
//! declarations are resolved purely by declaration order.

use std::fmt;

/// Semantic kind of a declared address range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeKind {
    /// Exception vector code
    Vector,
    /// Executable code
    Code,
    /// Literal data (parameters, globals, stack)
    Data,
    /// String pool
    String,
    /// Memory-mapped peripheral register window
    RegisterWindow,
}

impl RangeKind {
    /// Parse the short kind name used in the layout file.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "vector" => Some(RangeKind::Vector),
            "code" => Some(RangeKind::Code),
            "data" => Some(RangeKind::Data),
            "string" => Some(RangeKind::String),
            "register" => Some(RangeKind::RegisterWindow),
            _ => None,
        }
    }

    /// Branch and call targets must land in one of these.
    pub fn is_executable(self) -> bool {
        matches!(self, RangeKind::Vector | RangeKind::Code)
    }

    /// Table pointers are only followed into one of these.
    pub fn is_pointer_target(self) -> bool {
        matches!(self, RangeKind::Data | RangeKind::String)
    }
}

impl fmt::Display for RangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RangeKind::Vector => "vector",
            RangeKind::Code => "code",
            RangeKind::Data => "data",
            RangeKind::String => "string",
            RangeKind::RegisterWindow => "register",
        };
        f.write_str(name)
    }
}

/// A declared address range. `end` is inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRange {
    pub kind: RangeKind,
    pub start: u32,
    pub end: u32,
    pub label: String,
}

impl MemoryRange {
    pub fn new(kind: RangeKind, start: u32, end: u32, label: impl Into<String>) -> Self {
        Self {
            kind,
            start,
            end,
            label: label.into(),
        }
    }

    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.start && addr <= self.end
    }

    /// Byte offset of `addr` from the start of the range.
    pub fn offset_of(&self, addr: u32) -> u32 {
        addr.wrapping_sub(self.start)
    }
}

/// A second address window that views the same storage as a canonical window.
///
/// On the AR100 the DRAM code is executed at 0x43080000 but is stored in the
/// image right after the SRAM code, so runtime pointers into that window have
/// to be rewritten before they can index the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mirror {
    /// First address of the mirrored window
    pub start: u32,
    /// Window size in bytes
    pub size: u32,
    /// Canonical address corresponding to `start`
    pub canonical: u32,
}

impl Mirror {
    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.start && addr - self.start < self.size
    }

    /// Rewrite an address inside the mirrored window to its canonical counterpart.
    /// Addresses outside the window are returned unchanged.
    pub fn canonicalize(&self, addr: u32) -> u32 {
        if self.contains(addr) {
            (addr - self.start).wrapping_add(self.canonical)
        } else {
            addr
        }
    }

    /// A mirror whose canonical window overlaps the mirrored one cannot be
    /// normalized in a single step.
    pub fn overlaps_canonical(&self) -> bool {
        let mirror_end = self.start as u64 + self.size as u64;
        let canonical_end = self.canonical as u64 + self.size as u64;
        (self.canonical as u64) < mirror_end && (self.start as u64) < canonical_end
    }
}

/// Canonicalize through an optional mirror.
pub fn canonicalize(mirror: Option<&Mirror>, addr: u32) -> u32 {
    mirror.map_or(addr, |m| m.canonicalize(addr))
}

/// The ordered range list plus the mirror, used to classify raw values.
#[derive(Debug, Clone, Default)]
pub struct AddressSpace {
    ranges: Vec<MemoryRange>,
    mirror: Option<Mirror>,
}

impl AddressSpace {
    pub fn new(ranges: Vec<MemoryRange>, mirror: Option<Mirror>) -> Self {
        Self { ranges, mirror }
    }

    pub fn ranges(&self) -> &[MemoryRange] {
        &self.ranges
    }

    pub fn mirror(&self) -> Option<&Mirror> {
        self.mirror.as_ref()
    }

    pub fn canonical(&self, addr: u32) -> u32 {
        canonicalize(self.mirror.as_ref(), addr)
    }

    /// First declared range containing the raw value `addr`.
    pub fn classify(&self, addr: u32) -> Option<&MemoryRange> {
        self.ranges.iter().find(|r| r.contains(addr))
    }

    /// Whether the canonical form of `addr` lies in any code or vector range
    /// (compared against the ranges' canonical bounds).
    pub fn is_executable(&self, addr: u32) -> bool {
        self.any_canonical(addr, RangeKind::is_executable)
    }

    /// Whether the canonical form of `addr` lies in any data or string range.
    pub fn is_pointer_target(&self, addr: u32) -> bool {
        self.any_canonical(addr, RangeKind::is_pointer_target)
    }

    fn any_canonical(&self, addr: u32, pred: fn(RangeKind) -> bool) -> bool {
        let addr = self.canonical(addr);
        self.ranges.iter().filter(|r| pred(r.kind)).any(|r| {
            addr >= self.canonical(r.start) && addr <= self.canonical(r.end)
        })
    }
}
