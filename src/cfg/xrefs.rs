// SPDX-License-Identifier: GPL-3.0-or-later
//! Cross-reference and jump-table slot annotations.

use std::fmt;

/// How a cross-reference reaches its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrefKind {
    /// `l.jal`
    Call,
    /// `l.j`, `l.bf`, `l.bnf`
    Jump,
}

impl fmt::Display for XrefKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XrefKind::Call => f.write_str("call:"),
            XrefKind::Jump => f.write_str("jump:"),
        }
    }
}

/// One incoming reference, tagged with the origin's label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Xref {
    pub kind: XrefKind,
    pub origin: String,
}

impl fmt::Display for Xref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.origin)
    }
}

/// A jump-table entry pointing at an address: `table[index]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSlot {
    pub table: String,
    pub index: usize,
}

impl fmt::Display for TableSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.table, self.index)
    }
}
