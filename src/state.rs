// SPDX-License-Identifier: GPL-3.0-or-later
//! Symbolic register state threaded through the rendering pass.

use crate::or1k::{NUM_GPRS, Reg};
use crate::symbols::Symbols;

/// Known/unknown value per general purpose register. `r0` always reads as a
/// known zero and ignores writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicState {
    regs: [Option<i32>; NUM_GPRS],
}

impl Default for SymbolicState {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolicState {
    /// All registers unknown.
    pub fn new() -> Self {
        Self {
            regs: [None; NUM_GPRS],
        }
    }

    /// Current value, or `None` when unknown.
    pub fn get(&self, reg: Reg) -> Option<i32> {
        if reg.is_zero() {
            Some(0)
        } else {
            self.regs[reg.index()]
        }
    }

    /// Current value, reading unknown registers as zero.
    pub fn value(&self, reg: Reg) -> i32 {
        self.get(reg).unwrap_or(0)
    }

    pub fn set(&mut self, reg: Reg, value: i32) {
        if !reg.is_zero() {
            self.regs[reg.index()] = Some(value);
        }
    }

    pub fn set_unknown(&mut self, reg: Reg) {
        if !reg.is_zero() {
            self.regs[reg.index()] = None;
        }
    }

    pub fn is_known(&self, reg: Reg) -> bool {
        self.get(reg).is_some()
    }

    /// Forget every register, as at a basic-block entry.
    pub fn reset_all(&mut self) {
        self.regs = [None; NUM_GPRS];
    }

    /// Number of registers other than `r0` with a known value.
    pub fn known_count(&self) -> usize {
        self.regs[1..].iter().filter(|r| r.is_some()).count()
    }

    /// Render the register's current value symbolically.
    pub fn format_register(&self, reg: Reg, symbols: &Symbols<'_>) -> String {
        symbols.format_value(self.value(reg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(n: u8) -> Reg {
        Reg::new(n).unwrap()
    }

    #[test]
    fn zero_register_is_hardwired() {
        let mut state = SymbolicState::new();
        state.set(Reg::ZERO, 42);
        assert_eq!(state.get(Reg::ZERO), Some(0));
        state.set_unknown(Reg::ZERO);
        assert!(state.is_known(Reg::ZERO));
        state.reset_all();
        assert_eq!(state.get(Reg::ZERO), Some(0));
    }

    #[test]
    fn set_unknown_forgets_value() {
        let mut state = SymbolicState::new();
        for n in 1..NUM_GPRS as u8 {
            state.set(r(n), n as i32);
            assert_eq!(state.get(r(n)), Some(n as i32));
            state.set_unknown(r(n));
            assert!(!state.is_known(r(n)));
            assert_eq!(state.value(r(n)), 0);
        }
    }

    #[test]
    fn reset_all_clears_everything() {
        let mut state = SymbolicState::new();
        state.set(r(3), 5);
        state.set(r(31), -1);
        assert_eq!(state.known_count(), 2);
        state.reset_all();
        assert_eq!(state.known_count(), 0);
        assert_eq!(state, SymbolicState::new());
    }
}
