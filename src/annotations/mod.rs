// SPDX-License-Identifier: GPL-3.0-or-later
//! Annotation loading: memory layout, register names, labels, function entries
//! and table seeds.
//!
//! Every file lives in one annotations directory. Only `layout.json` is
//! required; the others default to empty when absent.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::hardware::{AddressSpace, MemoryRange, Mirror, RangeKind};

/// Strip a "0x" or "0X" prefix from a string, if present.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Parse a hex address string with optional 0x/0X prefix
pub fn parse_hex_addr(s: &str) -> Result<u32> {
    u32::from_str_radix(strip_hex_prefix(s.trim()), 16)
        .with_context(|| format!("Invalid hex address {:?}", s))
}

/// Deserialize JSON from a reader with standardized error context.
fn parse_json<T: serde::de::DeserializeOwned>(reader: impl Read, description: &str) -> Result<T> {
    serde_json::from_reader(reader).with_context(|| format!("Failed to parse {} file", description))
}

/// Load and deserialize a JSON file with standardized error context.
fn load_json_file<T: serde::de::DeserializeOwned>(path: &Path, description: &str) -> Result<T> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file {:?}", description, path))?;
    parse_json(file, description).with_context(|| format!("in {:?}", path))
}

/// Load an optional file, falling back to the default when it doesn't exist.
fn load_optional<T: Default>(path: &Path, load: impl FnOnce(&Path) -> Result<T>) -> Result<T> {
    if path.exists() {
        load(path)
    } else {
        Ok(T::default())
    }
}

/// Generic map from addresses to values, loaded from JSON.
/// JSON format: [{ "0xaddr": value }, ...]
#[derive(Debug, Default)]
pub struct AddrMap<T>(HashMap<u32, T>);

impl<T: serde::de::DeserializeOwned> AddrMap<T> {
    pub fn from_reader(reader: impl Read, description: &str) -> Result<Self> {
        let json: Vec<HashMap<String, T>> = parse_json(reader, description)?;

        let mut map = HashMap::new();
        for entry in json {
            for (addr_str, value) in entry {
                let addr = parse_hex_addr(&addr_str)
                    .with_context(|| format!("Bad key in {} file", description))?;
                map.insert(addr, value);
            }
        }
        Ok(AddrMap(map))
    }

    pub fn load(path: &Path, description: &str) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open {} file {:?}", description, path))?;
        Self::from_reader(file, description).with_context(|| format!("in {:?}", path))
    }
}

impl<T> AddrMap<T> {
    pub fn len(&self) -> usize {
        self.0.len()
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn get(&self, addr: u32) -> Option<&T> {
        self.0.get(&addr)
    }
    pub fn insert(&mut self, addr: u32, value: T) {
        self.0.insert(addr, value);
    }
    pub fn contains_key(&self, addr: u32) -> bool {
        self.0.contains_key(&addr)
    }
}

/// Value names: peripheral register addresses and well-known globals. A
/// matching value renders as its name before any range lookup.
#[derive(Debug, Default)]
pub struct RegisterNames(AddrMap<String>);

impl RegisterNames {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Ok(Self(AddrMap::load(path, "registers")?))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(Self(AddrMap::from_reader(reader, "registers")?))
    }

    pub fn insert(&mut self, addr: u32, name: impl Into<String>) {
        self.0.insert(addr, name.into());
    }

    pub fn get(&self, addr: u32) -> Option<&str> {
        self.0.get(addr).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Named labels for code addresses
#[derive(Debug, Default)]
pub struct Labels(AddrMap<String>);

impl Labels {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        Ok(Self(AddrMap::load(path, "labels")?))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(Self(AddrMap::from_reader(reader, "labels")?))
    }

    pub fn insert(&mut self, addr: u32, name: impl Into<String>) {
        self.0.insert(addr, name.into());
    }

    pub fn get(&self, addr: u32) -> Option<&str> {
        self.0.get(addr).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Hand-identified function entry points.
/// JSON format: ["0xaddr", ...]
#[derive(Debug, Default)]
pub struct FunctionEntries(Vec<u32>);

impl FunctionEntries {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let entries: Vec<String> = load_json_file(path, "functions")?;
        Self::from_strings(&entries)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let entries: Vec<String> = parse_json(reader, "functions")?;
        Self::from_strings(&entries)
    }

    fn from_strings(entries: &[String]) -> Result<Self> {
        let addrs = entries
            .iter()
            .map(|s| parse_hex_addr(s))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self(addrs))
    }

    pub fn push(&mut self, addr: u32) {
        self.0.push(addr);
    }

    pub fn addresses(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
struct TablesEntry {
    #[serde(default)]
    jump_tables: Vec<String>,
    #[serde(default)]
    string_tables: Vec<String>,
}

/// Seed addresses of jump tables and string tables in the image.
#[derive(Debug, Default)]
pub struct TableSeeds {
    pub jump_tables: Vec<u32>,
    pub string_tables: Vec<u32>,
}

impl TableSeeds {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let entry: TablesEntry = load_json_file(path, "tables")?;
        Self::from_entry(entry)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Self::from_entry(parse_json(reader, "tables")?)
    }

    fn from_entry(entry: TablesEntry) -> Result<Self> {
        let parse_all = |v: &[String]| {
            v.iter()
                .map(|s| parse_hex_addr(s))
                .collect::<Result<Vec<_>>>()
        };
        Ok(Self {
            jump_tables: parse_all(&entry.jump_tables)?,
            string_tables: parse_all(&entry.string_tables)?,
        })
    }

    pub fn len(&self) -> usize {
        self.jump_tables.len() + self.string_tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single memory range as written in layout.json
#[derive(Debug, Clone, Deserialize)]
pub struct RangeEntry {
    /// One of "vector", "code", "data", "string", "register"
    pub kind: String,
    pub start: String,
    /// Inclusive
    pub end: String,
    pub label: String,
}

/// The mirrored address window as written in layout.json
#[derive(Debug, Clone, Deserialize)]
pub struct MirrorEntry {
    pub start: String,
    pub size: String,
    pub canonical: String,
}

#[derive(Debug, Clone, Deserialize)]
struct LayoutEntry {
    #[serde(default)]
    mirror: Option<MirrorEntry>,
    ranges: Vec<RangeEntry>,
}

/// Parse the address-space layout (ordered ranges plus optional mirror).
pub fn parse_layout(reader: impl Read) -> Result<AddressSpace> {
    let entry: LayoutEntry = parse_json(reader, "layout")?;

    let mirror = match entry.mirror {
        Some(m) => {
            let mirror = Mirror {
                start: parse_hex_addr(&m.start)?,
                size: parse_hex_addr(&m.size)?,
                canonical: parse_hex_addr(&m.canonical)?,
            };
            if mirror.overlaps_canonical() {
                bail!(
                    "Mirror window {:#010x}+{:#x} overlaps its canonical window at {:#010x}",
                    mirror.start,
                    mirror.size,
                    mirror.canonical
                );
            }
            Some(mirror)
        }
        None => None,
    };

    let mut ranges = Vec::with_capacity(entry.ranges.len());
    for r in entry.ranges {
        let Some(kind) = RangeKind::from_name(&r.kind) else {
            bail!("Unknown range kind {:?} for range {:?}", r.kind, r.label);
        };
        let start = parse_hex_addr(&r.start)?;
        let end = parse_hex_addr(&r.end)?;
        if end < start {
            bail!(
                "Range {:?} ends ({:#010x}) before it starts ({:#010x})",
                r.label,
                end,
                start
            );
        }
        ranges.push(MemoryRange::new(kind, start, end, r.label));
    }

    Ok(AddressSpace::new(ranges, mirror))
}

/// All annotations bundled together for convenience
#[derive(Debug, Default)]
pub struct Annotations {
    pub space: AddressSpace,
    pub registers: RegisterNames,
    pub labels: Labels,
    pub funcs: FunctionEntries,
    pub tables: TableSeeds,
}

impl Annotations {
    /// Build annotations around a layout with no names, functions or tables.
    pub fn new(space: AddressSpace) -> Self {
        Self {
            space,
            ..Default::default()
        }
    }

    /// Load all annotations from a directory containing layout.json and,
    /// optionally, registers.json, labels.json, functions.json and tables.json.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        let layout_path = dir.join("layout.json");
        let layout = File::open(&layout_path)
            .with_context(|| format!("Failed to open layout file {:?}", layout_path))?;
        let space = parse_layout(layout).with_context(|| format!("in {:?}", layout_path))?;

        let registers = load_optional(&dir.join("registers.json"), RegisterNames::load_from_file)?;
        let labels = load_optional(&dir.join("labels.json"), Labels::load_from_file)?;
        let funcs = load_optional(&dir.join("functions.json"), FunctionEntries::load_from_file)?;
        let tables = load_optional(&dir.join("tables.json"), TableSeeds::load_from_file)?;

        Ok(Annotations {
            space,
            registers,
            labels,
            funcs,
            tables,
        })
    }

    /// Print loading statistics
    pub fn print_stats(&self, dir: &Path) {
        eprintln!(
            "Loaded {} ranges from {:?}{}",
            self.space.ranges().len(),
            dir.join("layout.json"),
            if self.space.mirror().is_some() { " (with mirror)" } else { "" }
        );
        eprintln!(
            "Loaded {} register names from {:?}",
            self.registers.len(),
            dir.join("registers.json")
        );
        eprintln!(
            "Loaded {} labels from {:?}",
            self.labels.len(),
            dir.join("labels.json")
        );
        eprintln!(
            "Loaded {} functions from {:?}",
            self.funcs.len(),
            dir.join("functions.json")
        );
        eprintln!(
            "Loaded {} jump tables and {} string tables from {:?}",
            self.tables.jump_tables.len(),
            self.tables.string_tables.len(),
            dir.join("tables.json")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_hex_prefix() {
        assert_eq!(strip_hex_prefix("0x1c20000"), "1c20000");
        assert_eq!(strip_hex_prefix("0X1C20000"), "1C20000");
        assert_eq!(strip_hex_prefix("4000"), "4000");
    }

    #[test]
    fn test_parse_hex_addr() {
        assert_eq!(parse_hex_addr("0x43080000").unwrap(), 0x4308_0000);
        assert_eq!(parse_hex_addr("c000").unwrap(), 0xc000);
        assert!(parse_hex_addr("0xnope").is_err());
    }

    #[test]
    fn test_parse_layout() {
        let json = br#"{
            "mirror": { "start": "0x43080000", "size": "0x20000", "canonical": "0xc000" },
            "ranges": [
                { "kind": "vector", "start": "0x0", "end": "0x3fff", "label": "vectors" },
                { "kind": "code", "start": "0x4000", "end": "0x817b", "label": "code" },
                { "kind": "register", "start": "0x1c20000", "end": "0x1c203ff", "label": "CCU" }
            ]
        }"#;
        let space = parse_layout(&json[..]).unwrap();
        assert_eq!(space.ranges().len(), 3);
        assert_eq!(space.ranges()[2].kind, RangeKind::RegisterWindow);
        assert_eq!(space.ranges()[2].label, "CCU");
        assert_eq!(space.canonical(0x4308_0010), 0xc010);
    }

    #[test]
    fn test_layout_without_mirror() {
        let json = br#"{ "ranges": [ { "kind": "code", "start": "0", "end": "ff", "label": "c" } ] }"#;
        let space = parse_layout(&json[..]).unwrap();
        assert!(space.mirror().is_none());
    }

    #[test]
    fn test_layout_rejects_unknown_kind() {
        let json = br#"{ "ranges": [ { "kind": "heap", "start": "0", "end": "ff", "label": "h" } ] }"#;
        assert!(parse_layout(&json[..]).is_err());
    }

    #[test]
    fn test_layout_rejects_overlapping_mirror() {
        let json = br#"{
            "mirror": { "start": "0x1000", "size": "0x2000", "canonical": "0x2000" },
            "ranges": []
        }"#;
        let err = parse_layout(&json[..]).unwrap_err();
        assert!(err.to_string().contains("overlaps"));
    }

    #[test]
    fn test_register_names() {
        let json = br#"[ { "0x1c20000": "PLL_CPUX_CTRL_REG" }, { "0x1f01c00": "R_PRCM" } ]"#;
        let names = RegisterNames::from_reader(&json[..]).unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names.get(0x1c2_0000), Some("PLL_CPUX_CTRL_REG"));
        assert_eq!(names.get(0x1c2_0004), None);
    }

    #[test]
    fn test_bad_label_key_is_an_error() {
        let json = br#"[ { "main": "main" } ]"#;
        assert!(Labels::from_reader(&json[..]).is_err());
    }

    #[test]
    fn test_functions_and_tables() {
        let funcs = FunctionEntries::from_reader(&br#"["0x4000", "0x4100"]"#[..]).unwrap();
        assert_eq!(funcs.addresses().collect::<Vec<_>>(), vec![0x4000, 0x4100]);

        let tables =
            TableSeeds::from_reader(&br#"{ "jump_tables": ["0x8200"] }"#[..]).unwrap();
        assert_eq!(tables.jump_tables, vec![0x8200]);
        assert!(tables.string_tables.is_empty());
    }
}
