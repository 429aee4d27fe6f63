// SPDX-License-Identifier: GPL-3.0-or-later
//! Literal formatting shared by the renderer.

use super::regs::Reg;

/// Zero-padded 8-digit hex. Negative values are shown in their 32-bit two's
/// complement form (`-4` is `0xfffffffc`), never sign-extended beyond it.
pub fn hex32(value: impl Into<i64>) -> String {
    format!("{:#010x}", value.into() as u32)
}

/// Sign-extend a 16-bit immediate to 32 bits.
pub fn sign_extend16(imm: i32) -> u32 {
    imm as i16 as i32 as u32
}

/// Render a displacement appended to a base register: `+8`, `-4`, or nothing.
pub fn displacement(imm: i32) -> String {
    match imm {
        0 => String::new(),
        i if i > 0 => format!("+{}", i),
        i => i.to_string(),
    }
}

/// Render a compare immediate as decimal with its sign-extended hex value and,
/// for printable values, the ASCII character.
pub fn compare_immediate(imm: i32) -> String {
    let mut s = format!("{} /* {}", imm, hex32(sign_extend16(imm)));
    if (0x20..=0x7f).contains(&imm) {
        s.push_str(&format!(" '{}'", imm as u8 as char));
    }
    s.push_str(" */");
    s
}

/// Render the special-purpose register selector `a | k`. SPR numbers are split
/// into a 5-bit group and an 11-bit register index.
pub fn spr_selector(a: Reg, k: i32) -> String {
    let kv = format!(
        "{} /* grp = {}, reg = {} */",
        hex32(k & 0xffff),
        (k >> 11) & 0x1f,
        k & 0x7ff
    );
    if a.is_zero() {
        kv
    } else if k == 0 {
        a.alias()
    } else {
        format!("{} | {}", a.alias(), kv)
    }
}
