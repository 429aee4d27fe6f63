// SPDX-License-Identifier: GPL-3.0-or-later
//! OpenRISC general purpose registers and their ABI aliases.

use std::fmt;

/// Number of general purpose registers
pub const NUM_GPRS: usize = 32;

/// ABI aliases used when rendering pseudo-code. Registers not listed keep
/// their `rN` name.
pub const GPR_ALIASES: &[(u8, &str)] = &[
    (0, "0"),
    (1, "SP"),
    (2, "FP"),
    (3, "A1"),
    (4, "A2"),
    (5, "A3"),
    (6, "A4"),
    (7, "A5"),
    (8, "A6"),
    (9, "LR"),
    (11, "RV"),
];

/// A general purpose register, `r0` through `r31`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reg(u8);

impl Reg {
    /// Hard-wired zero
    pub const ZERO: Reg = Reg(0);
    /// Link register
    pub const LR: Reg = Reg(9);

    pub fn new(index: u8) -> Option<Self> {
        ((index as usize) < NUM_GPRS).then_some(Reg(index))
    }

    /// Parse a listing register name such as `r11`.
    pub fn parse(name: &str) -> Option<Self> {
        let digits = name.strip_prefix('r')?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Reg::new(digits.parse().ok()?)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Name used in rendered pseudo-code.
    pub fn alias(self) -> String {
        GPR_ALIASES
            .iter()
            .find(|&&(num, _)| num == self.0)
            .map(|&(_, name)| name.to_string())
            .unwrap_or_else(|| self.to_string())
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_register_names() {
        assert_eq!(Reg::parse("r0"), Some(Reg::ZERO));
        assert_eq!(Reg::parse("r31").map(Reg::index), Some(31));
        assert_eq!(Reg::parse("r32"), None);
        assert_eq!(Reg::parse("r"), None);
        assert_eq!(Reg::parse("x3"), None);
        assert_eq!(Reg::parse("r+3"), None);
    }

    #[test]
    fn aliases() {
        let alias = |n| Reg::new(n).unwrap().alias();
        assert_eq!(alias(0), "0");
        assert_eq!(alias(1), "SP");
        assert_eq!(alias(3), "A1");
        assert_eq!(alias(8), "A6");
        assert_eq!(alias(9), "LR");
        assert_eq!(alias(10), "r10");
        assert_eq!(alias(11), "RV");
        assert_eq!(alias(31), "r31");
    }
}
