// SPDX-License-Identifier: GPL-3.0-or-later
//! End-to-end tests: listing + image + annotations in, annotated listing out.

use pretty_assertions::assert_eq;

use or1k_decompiler::annotations::{Annotations, parse_layout};
use or1k_decompiler::cfg::normalize_delay_slots;
use or1k_decompiler::error::DecompileError;
use or1k_decompiler::hardware::Mirror;
use or1k_decompiler::listing::parse_listing;
use or1k_decompiler::or1k::Reg;
use or1k_decompiler::output::{ListingWriter, process_listing};
use or1k_decompiler::state::SymbolicState;

const LAYOUT: &str = r#"{
    "mirror": { "start": "0x43080000", "size": "0x100", "canonical": "0x9000" },
    "ranges": [
        { "kind": "code", "start": "0x4000", "end": "0x40ff", "label": "sram_code" },
        { "kind": "data", "start": "0x8000", "end": "0x80ff", "label": "params" },
        { "kind": "string", "start": "0x8100", "end": "0x81ff", "label": "strings" },
        { "kind": "code", "start": "0x43080000", "end": "0x430800ff", "label": "dram_code" }
    ]
}"#;

const LISTING: &str = "
firmware.elf:     file format elf32-or1k


Disassembly of section .text:

00004000 <_start>:
    4000:\t9c 60 00 05 \tl.addi r3,r0,5
    4004:\t18 80 00 00 \tl.movhi r4,0x0
    4008:\ta8 84 80 00 \tl.ori r4,r4,0x8000
    400c:\ta8 a0 80 20 \tl.ori r5,r0,0x8020
    4010:\te1 63 18 00 \tl.add r11,r3,r3
    4014:\t84 c3 00 00 \tl.lwz r6,0(r3)
    4018:\t04 00 00 08 \tl.jal 43080000 <dram_entry>
    401c:\t15 00 00 00 \tl.nop 0x0
    4020:\t00 00 00 04 \tl.j 4030
    4024:\t9c e0 00 01 \tl.addi r7,r0,1
    4028:\t9d 00 00 02 \tl.addi r8,r0,2
    402c:\t00 00 00 00 \t.word 0x00000000
    4030:\te1 63 38 00 \tl.add r11,r3,r7
    4034:\t44 00 48 00 \tl.jr r9
    4038:\t15 00 00 00 \tl.nop 0x0

43080000 <dram_entry>:
43080000:\t9d 60 00 00 \tl.addi r11,r0,0
43080004:\t44 00 48 00 \tl.jr r9
43080008:\t15 00 00 00 \tl.nop 0x0
";

fn put_word(image: &mut [u8], addr: usize, value: u32) {
    image[addr..addr + 4].copy_from_slice(&value.to_be_bytes());
}

fn image() -> Vec<u8> {
    let mut image = vec![0u8; 0x9100];
    // jump table
    put_word(&mut image, 0x8000, 0x4028);
    put_word(&mut image, 0x8004, 0x4030);
    put_word(&mut image, 0x8008, 0x4308_0000);
    // string table: three pointers then NULL
    put_word(&mut image, 0x8020, 0x8100);
    put_word(&mut image, 0x8024, 0x8106);
    put_word(&mut image, 0x8028, 0x810b);
    image[0x8100..0x8106].copy_from_slice(b"alpha\0");
    image[0x8106..0x810b].copy_from_slice(b"beta\0");
    image[0x810b..0x8111].copy_from_slice(b"gamma\0");
    image
}

fn annotations() -> Annotations {
    let mut a = Annotations::new(parse_layout(LAYOUT.as_bytes()).unwrap());
    a.labels.insert(0x4000, "_start");
    a.funcs.push(0x4000);
    a.tables.jump_tables.push(0x8000);
    a.tables.string_tables.push(0x8020);
    a
}

fn decompile(listing: &str) -> anyhow::Result<String> {
    let mut buf = Vec::new();
    process_listing(
        listing,
        image(),
        &annotations(),
        &mut ListingWriter::new(&mut buf),
    )?;
    Ok(String::from_utf8(buf)?)
}

/// Pseudo-code column of the line whose original text is `orig`.
fn rendering<'a>(output: &'a str, orig: &str) -> &'a str {
    let suffix = format!(" // {}", orig);
    let line = output
        .lines()
        .find(|l| l.ends_with(&suffix))
        .unwrap_or_else(|| panic!("no line for {:?} in\n{}", orig, output));
    let (_, rest) = line.split_once(":   ").unwrap();
    rest[..rest.len() - suffix.len()].trim_end()
}

#[test]
fn renders_folded_and_symbolic_values() {
    let out = decompile(LISTING).unwrap();

    assert_eq!(rendering(&out, "l.addi r3,r0,5"), "A1 = 5 /* 0x00000005 */");
    assert_eq!(rendering(&out, "l.movhi r4,0x0"), "A2 = 0");
    assert_eq!(
        rendering(&out, "l.ori r4,r4,0x8000"),
        "A2 = 0x00008000 /* JUMP TABLE jt_008000 */"
    );
    assert_eq!(
        rendering(&out, "l.ori r5,r0,0x8020"),
        r#"A3 = C_STR_ARRAY ["alpha", "beta", "gamma"] /* 0x00008020 */"#
    );
    assert_eq!(rendering(&out, "l.add r11,r3,r3"), "RV = 10 /* 0x0000000a */");
    assert_eq!(rendering(&out, "l.lwz r6,0(r3)"), "A4 = [u32 A1]");
    assert_eq!(
        rendering(&out, "l.jal 43080000 <dram_entry>"),
        "call fn_009000"
    );
    assert_eq!(rendering(&out, "l.j 4030"), "goto l_004030");
    assert_eq!(rendering(&out, "l.add r11,r3,r7"), "RV = A1 + A5");
    assert_eq!(rendering(&out, "l.addi r11,r0,0"), "RV = 0 /* 0x00000000 */");
}

#[test]
fn annotations_precede_block_entries() {
    let out = decompile(LISTING).unwrap();
    let banner = "-".repeat(62);

    assert!(out.starts_with(&format!("\n\n{}\n\n\n_start:\nfn_004000:   ", banner)));
    assert!(out.contains("\n\n\njt_008000[0]:\nl_004028:   A6 = 2 /* 0x00000002 */"));
    assert!(out.contains(
        "\n\n\n// xrefs from: jump:l_004020\njt_008000[1]:\nl_004030:   RV = A1 + A5"
    ));
    assert!(out.contains(&format!(
        "\n\n\n{}\n\n\n// xrefs from: call:l_004018\njt_008000[2]:\nfn_009000:   RV = 0",
        banner
    )));
}

#[test]
fn delay_slot_fillers_come_first() {
    let out = decompile(LISTING).unwrap();
    let lines: Vec<&str> = out.lines().filter(|l| l.starts_with("l_004020:")).collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].ends_with("// l.addi r7,r0,1"));
    assert!(lines[1].ends_with("// l.j 4030"));
    // nop fillers are dropped entirely
    assert!(!out.contains("l.nop"));
}

#[test]
fn jump_table_targets_are_block_starts_once() {
    let out = decompile(LISTING).unwrap();
    for (i, label) in ["l_004028", "l_004030", "fn_009000"].iter().enumerate() {
        let slot = format!("jt_008000[{}]:", i);
        assert_eq!(out.matches(&slot).count(), 1);
        assert!(out.contains(&format!("{}\n{}:   ", slot, label)));
    }
    assert!(!out.contains("jt_008000[3]"));
}

#[test]
fn normalization_is_idempotent() {
    let a = annotations();
    let insns = parse_listing(LISTING, &a.space).unwrap();
    let once = normalize_delay_slots(insns).unwrap();
    let twice = normalize_delay_slots(once.program.clone()).unwrap();
    assert_eq!(twice.program, once.program);
}

#[test]
fn unknown_mnemonic_aborts() {
    let listing = "    4000:\te0 64 2b 09 \tl.div r3,r4,r5\n";
    let err = decompile(listing).unwrap_err();
    assert_eq!(
        err.downcast_ref::<DecompileError>(),
        Some(&DecompileError::UnknownOpcode {
            addr: 0x4000,
            mnemonic: "l.div".into()
        })
    );
}

#[test]
fn malformed_operands_abort() {
    let listing = "    4000:\t9c 60 00 05 \tl.addi r3,r0\n";
    let err = decompile(listing).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DecompileError>(),
        Some(DecompileError::OperandCountMismatch { addr: 0x4000, .. })
    ));
}

#[test]
fn zero_register_stays_zero() {
    let mut state = SymbolicState::new();
    for n in 0..32 {
        let r = Reg::new(n).unwrap();
        state.set(r, 7);
        state.set_unknown(r);
        assert_eq!(state.is_known(r), n == 0);
    }
    assert_eq!(state.get(Reg::ZERO), Some(0));
}

#[test]
fn mirror_normalization_is_involutive() {
    let m = Mirror {
        start: 0x4308_0000,
        size: 0x2_0000,
        canonical: 0xc000,
    };
    for addr in [0u32, 0x4000, 0xc000, 0x4307_ffff, 0x430a_0000, u32::MAX] {
        assert_eq!(m.canonicalize(addr), addr);
    }
    for addr in [0x4308_0000u32, 0x4308_1234, 0x4309_ffff] {
        let c = m.canonicalize(addr);
        assert!(!m.contains(c));
        assert_eq!(m.canonicalize(c), c);
    }
}
