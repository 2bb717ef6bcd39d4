//! Minimal crate file writer for building test layers.

use super::compression::IntWidth;
use super::value::ValueRep;
use super::SECTION_NAME_LEN;
use config::constants::USDC_MAGIC;
use std::collections::HashMap;

const HEADER_SIZE: usize = 88;

/// A value to author in a test layer.
#[derive(Debug, Clone)]
pub(crate) enum TestValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Double(f64),
    Token(&'static str),
    String(&'static str),
    Vec3d([f64; 3]),
    Vec3f([f32; 3]),
    /// Real part first.
    Quatf([f32; 4]),
    Matrix4d([[f64; 4]; 4]),
    TokenArray(Vec<&'static str>),
    IntArray(Vec<i32>),
    FloatArray(Vec<f32>),
    Vec3fArray(Vec<[f32; 3]>),
    TokenVector(Vec<String>),
    Specifier(&'static str),
    Variability(&'static str),
    EmptyDictionary,
    /// Stored but not decoded by the reader.
    TimeSamples,
    /// A reference list op, stored but not decoded by the reader.
    References,
}

struct SpecEntry {
    path: String,
    spec_type: u32,
    fields: Vec<(String, TestValue)>,
}

/// Encoded PATHS section columns.
#[derive(Default)]
struct PathTable {
    count: usize,
    indexes: Vec<i64>,
    element_tokens: Vec<i64>,
    jumps: Vec<i64>,
    spec_paths: Vec<i64>,
}

/// `/A/B` → `/A`, `/A.x` → `/A`, `/A` → `/`; the root has no parent.
fn parent_path(path: &str) -> Option<String> {
    if let Some((owner, _)) = path.rsplit_once('.') {
        return Some(owner.to_string());
    }
    match path.rsplit_once('/') {
        Some((_, "")) | None => None,
        Some(("", _)) => Some("/".to_string()),
        Some((parent, _)) => Some(parent.to_string()),
    }
}

/// Collects specs and writes them as a version 0.8.0 crate file.
pub(crate) struct CrateWriter {
    version: [u8; 3],
    specs: Vec<SpecEntry>,
    tokens: Vec<String>,
    token_index: HashMap<String, u32>,
    strings: Vec<u32>,
    out: Vec<u8>,
}

impl CrateWriter {
    pub(crate) fn new() -> Self {
        let mut writer = Self {
            version: [0, 8, 0],
            specs: vec![SpecEntry {
                path: "/".to_string(),
                spec_type: 7,
                fields: Vec::new(),
            }],
            tokens: Vec::new(),
            token_index: HashMap::new(),
            strings: Vec::new(),
            out: Vec::new(),
        };
        // Token 0 is empty so property element tokens can be negated.
        writer.token("");
        writer
    }

    pub(crate) fn version(mut self, version: [u8; 3]) -> Self {
        self.version = version;
        self
    }

    /// Add a layer metadata field.
    pub(crate) fn root(mut self, name: &str, value: TestValue) -> Self {
        self.specs[0].fields.push((name.to_string(), value));
        self
    }

    pub(crate) fn prim(
        mut self,
        path: &str,
        specifier: &'static str,
        type_name: &'static str,
        fields: Vec<(&str, TestValue)>,
    ) -> Self {
        let mut all = vec![("specifier".to_string(), TestValue::Specifier(specifier))];
        if !type_name.is_empty() {
            all.push(("typeName".to_string(), TestValue::Token(type_name)));
        }
        all.extend(fields.into_iter().map(|(name, value)| (name.to_string(), value)));
        self.specs.push(SpecEntry {
            path: path.to_string(),
            spec_type: 6,
            fields: all,
        });
        self
    }

    /// Add an attribute with a default value.
    pub(crate) fn attribute(self, path: &str, type_name: &'static str, default: TestValue) -> Self {
        self.attribute_fields(path, type_name, vec![("default", default)])
    }

    pub(crate) fn attribute_fields(
        mut self,
        path: &str,
        type_name: &'static str,
        fields: Vec<(&str, TestValue)>,
    ) -> Self {
        let mut all = vec![("typeName".to_string(), TestValue::Token(type_name))];
        all.extend(fields.into_iter().map(|(name, value)| (name.to_string(), value)));
        self.specs.push(SpecEntry {
            path: path.to_string(),
            spec_type: 1,
            fields: all,
        });
        self
    }

    pub(crate) fn relationship(mut self, path: &str) -> Self {
        self.specs.push(SpecEntry {
            path: path.to_string(),
            spec_type: 8,
            fields: Vec::new(),
        });
        self
    }

    pub(crate) fn finish(mut self) -> Vec<u8> {
        self.add_child_lists();
        self.out = vec![0u8; HEADER_SIZE];

        // Values first, so the structural sections can reference them.
        let specs = std::mem::take(&mut self.specs);
        let mut field_tokens = Vec::new();
        let mut field_reps = Vec::new();
        let mut runs = Vec::new();
        let mut spec_field_sets = Vec::new();
        for spec in &specs {
            spec_field_sets.push(runs.len() as i64);
            for (name, value) in &spec.fields {
                let token = self.token(name);
                let rep = self.value(value);
                runs.push(field_tokens.len() as i64);
                field_tokens.push(i64::from(token));
                field_reps.push(rep);
            }
            runs.push(i64::from(u32::MAX));
        }

        let paths = self.path_tree(&specs);

        let mut sections = Vec::new();

        let start = self.out.len();
        let mut chars = Vec::new();
        for token in &self.tokens {
            chars.extend_from_slice(token.as_bytes());
            chars.push(0);
        }
        let compressed = frame(&chars);
        let token_count = self.tokens.len() as u64;
        self.u64(token_count);
        self.u64(chars.len() as u64);
        self.u64(compressed.len() as u64);
        self.out.extend_from_slice(&compressed);
        sections.push(("TOKENS", start));

        let start = self.out.len();
        self.u64(self.strings.len() as u64);
        for index in self.strings.clone() {
            self.out.extend_from_slice(&index.to_le_bytes());
        }
        sections.push(("STRINGS", start));

        let start = self.out.len();
        self.u64(field_tokens.len() as u64);
        self.ints(&field_tokens, IntWidth::Four);
        let rep_bytes: Vec<u8> = field_reps.iter().flat_map(|rep| rep.0.to_le_bytes()).collect();
        let framed = frame(&rep_bytes);
        self.u64(framed.len() as u64);
        self.out.extend_from_slice(&framed);
        sections.push(("FIELDS", start));

        let start = self.out.len();
        self.u64(runs.len() as u64);
        self.ints(&runs, IntWidth::Four);
        sections.push(("FIELDSETS", start));

        let start = self.out.len();
        self.u64(paths.count as u64);
        self.u64(paths.indexes.len() as u64);
        self.ints(&paths.indexes, IntWidth::Four);
        self.ints(&paths.element_tokens, IntWidth::Four);
        self.ints(&paths.jumps, IntWidth::Four);
        sections.push(("PATHS", start));

        let start = self.out.len();
        let spec_types: Vec<i64> = specs.iter().map(|s| i64::from(s.spec_type)).collect();
        self.u64(specs.len() as u64);
        self.ints(&paths.spec_paths, IntWidth::Four);
        self.ints(&spec_field_sets, IntWidth::Four);
        self.ints(&spec_types, IntWidth::Four);
        sections.push(("SPECS", start));

        let toc = self.out.len();
        self.u64(sections.len() as u64);
        for (name, start) in sections {
            let mut raw = [0u8; SECTION_NAME_LEN];
            raw[..name.len()].copy_from_slice(name.as_bytes());
            self.out.extend_from_slice(&raw);
            self.u64(start as u64);
            self.u64(0);
        }

        self.out[..8].copy_from_slice(USDC_MAGIC);
        self.out[8..11].copy_from_slice(&self.version);
        self.out[16..24].copy_from_slice(&(toc as u64).to_le_bytes());
        self.out
    }

    fn token(&mut self, token: &str) -> u32 {
        if let Some(index) = self.token_index.get(token) {
            return *index;
        }
        let index = self.tokens.len() as u32;
        self.tokens.push(token.to_string());
        self.token_index.insert(token.to_string(), index);
        index
    }

    fn string(&mut self, value: &str) -> u32 {
        let token = self.token(value);
        self.strings.push(token);
        (self.strings.len() - 1) as u32
    }

    fn u64(&mut self, value: u64) {
        self.out.extend_from_slice(&value.to_le_bytes());
    }

    fn ints(&mut self, values: &[i64], width: IntWidth) {
        let framed = if values.is_empty() {
            Vec::new()
        } else {
            frame(&encode_integers(values, width))
        };
        self.u64(framed.len() as u64);
        self.out.extend_from_slice(&framed);
    }

    /// Record `primChildren` and `properties` from the spec paths.
    fn add_child_lists(&mut self) {
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        let mut properties: HashMap<String, Vec<String>> = HashMap::new();
        for spec in &self.specs[1..] {
            if let Some((owner, name)) = spec.path.rsplit_once('.') {
                properties.entry(owner.to_string()).or_default().push(name.to_string());
            } else if let Some((parent, name)) = spec.path.rsplit_once('/') {
                let parent = if parent.is_empty() { "/" } else { parent };
                children.entry(parent.to_string()).or_default().push(name.to_string());
            }
        }
        for spec in &mut self.specs {
            if let Some(names) = children.remove(&spec.path) {
                spec.fields.push(("primChildren".to_string(), TestValue::TokenVector(names)));
            }
            if let Some(names) = properties.remove(&spec.path) {
                spec.fields.push(("properties".to_string(), TestValue::TokenVector(names)));
            }
        }
    }

    /// Encode the path tree in pre-order and map each spec to its path index.
    fn path_tree(&mut self, specs: &[SpecEntry]) -> PathTable {
        let mut index_of: HashMap<String, usize> = HashMap::new();
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        for spec in specs {
            let next = index_of.len();
            index_of.entry(spec.path.clone()).or_insert(next);
            if let Some(parent) = parent_path(&spec.path) {
                children.entry(parent).or_default().push(spec.path.clone());
            }
        }

        let mut table = PathTable {
            count: index_of.len(),
            spec_paths: specs.iter().map(|s| index_of[&s.path] as i64).collect(),
            ..PathTable::default()
        };
        self.encode_path("/", false, &index_of, &children, &mut table);
        table
    }

    fn encode_path(
        &mut self,
        path: &str,
        has_sibling: bool,
        index_of: &HashMap<String, usize>,
        children: &HashMap<String, Vec<String>>,
        table: &mut PathTable,
    ) {
        let position = table.jumps.len();
        table.indexes.push(index_of[path] as i64);
        let element = match path.rsplit_once('.') {
            Some((_, name)) => -i64::from(self.token(name)),
            None => {
                let name = path.rsplit('/').next().unwrap_or_default();
                i64::from(self.token(name))
            }
        };
        table.element_tokens.push(element);
        table.jumps.push(0);

        let kids = children.get(path).cloned().unwrap_or_default();
        for (i, child) in kids.iter().enumerate() {
            self.encode_path(child, i + 1 < kids.len(), index_of, children, table);
        }

        table.jumps[position] = match (!kids.is_empty(), has_sibling) {
            (true, true) => (table.jumps.len() - position) as i64,
            (true, false) => -1,
            (false, true) => 0,
            (false, false) => -2,
        };
    }

    fn data_offset(&self) -> u64 {
        self.out.len() as u64
    }

    fn rep(type_id: u8, flags: u64, payload: u64) -> ValueRep {
        ValueRep(flags | (u64::from(type_id) << 48) | payload)
    }

    fn inlined(type_id: u8, bits: u32) -> ValueRep {
        Self::rep(type_id, ValueRep::INLINED_BIT, u64::from(bits))
    }

    fn value(&mut self, value: &TestValue) -> ValueRep {
        match value {
            TestValue::Bool(b) => Self::inlined(1, u32::from(*b)),
            TestValue::Int(i) => Self::inlined(3, *i as u32),
            TestValue::Float(f) => Self::inlined(8, f.to_bits()),
            TestValue::Double(d) => {
                if f64::from(*d as f32) == *d {
                    Self::inlined(9, (*d as f32).to_bits())
                } else {
                    let offset = self.data_offset();
                    self.out.extend_from_slice(&d.to_le_bytes());
                    Self::rep(9, 0, offset)
                }
            }
            TestValue::Token(t) => {
                let index = self.token(t);
                Self::inlined(11, index)
            }
            TestValue::String(s) => {
                let index = self.string(s);
                Self::inlined(10, index)
            }
            TestValue::Vec3d(v) => match small_ints(v) {
                Some(bits) => Self::inlined(23, bits),
                None => {
                    let offset = self.data_offset();
                    for c in v {
                        self.out.extend_from_slice(&c.to_le_bytes());
                    }
                    Self::rep(23, 0, offset)
                }
            },
            TestValue::Vec3f(v) => match small_ints(&v.map(f64::from)) {
                Some(bits) => Self::inlined(24, bits),
                None => {
                    let offset = self.data_offset();
                    for c in v {
                        self.out.extend_from_slice(&c.to_le_bytes());
                    }
                    Self::rep(24, 0, offset)
                }
            },
            TestValue::Quatf([real, i, j, k]) => {
                let offset = self.data_offset();
                for c in [i, j, k, real] {
                    self.out.extend_from_slice(&c.to_le_bytes());
                }
                Self::rep(17, 0, offset)
            }
            TestValue::Matrix4d(rows) => {
                let diagonal = [rows[0][0], rows[1][1], rows[2][2], rows[3][3]];
                let is_diagonal = (0..4).all(|r| (0..4).all(|c| r == c || rows[r][c] == 0.0));
                match small_ints(&diagonal).filter(|_| is_diagonal) {
                    Some(bits) => Self::inlined(15, bits),
                    None => {
                        let offset = self.data_offset();
                        for c in rows.iter().flatten() {
                            self.out.extend_from_slice(&c.to_le_bytes());
                        }
                        Self::rep(15, 0, offset)
                    }
                }
            }
            TestValue::TokenArray(tokens) => {
                if tokens.is_empty() {
                    return Self::rep(11, ValueRep::ARRAY_BIT, 0);
                }
                let indexes: Vec<u32> = tokens.iter().map(|t| self.token(t)).collect();
                let offset = self.data_offset();
                self.u64(indexes.len() as u64);
                for index in indexes {
                    self.out.extend_from_slice(&index.to_le_bytes());
                }
                Self::rep(11, ValueRep::ARRAY_BIT, offset)
            }
            TestValue::IntArray(values) => {
                let offset = self.data_offset();
                self.u64(values.len() as u64);
                if values.len() >= 16 {
                    let wide: Vec<i64> = values.iter().map(|v| i64::from(*v)).collect();
                    self.ints(&wide, IntWidth::Four);
                    return Self::rep(3, ValueRep::ARRAY_BIT | ValueRep::COMPRESSED_BIT, offset);
                }
                for v in values {
                    self.out.extend_from_slice(&v.to_le_bytes());
                }
                Self::rep(3, ValueRep::ARRAY_BIT, offset)
            }
            TestValue::FloatArray(values) => {
                let offset = self.data_offset();
                self.u64(values.len() as u64);
                if values.len() < 16 {
                    for v in values {
                        self.out.extend_from_slice(&v.to_le_bytes());
                    }
                    return Self::rep(8, ValueRep::ARRAY_BIT, offset);
                }
                if values.iter().all(|v| v.fract() == 0.0) {
                    self.out.push(b'i');
                    let ints: Vec<i64> = values.iter().map(|v| *v as i64).collect();
                    self.ints(&ints, IntWidth::Four);
                } else {
                    let mut table: Vec<f32> = Vec::new();
                    let mut indexes = Vec::new();
                    for v in values {
                        let index = match table.iter().position(|t| t == v) {
                            Some(index) => index,
                            None => {
                                table.push(*v);
                                table.len() - 1
                            }
                        };
                        indexes.push(index as i64);
                    }
                    self.out.push(b't');
                    self.out.extend_from_slice(&(table.len() as u32).to_le_bytes());
                    for t in &table {
                        self.out.extend_from_slice(&t.to_le_bytes());
                    }
                    self.ints(&indexes, IntWidth::Four);
                }
                Self::rep(8, ValueRep::ARRAY_BIT | ValueRep::COMPRESSED_BIT, offset)
            }
            TestValue::Vec3fArray(values) => {
                let offset = self.data_offset();
                self.u64(values.len() as u64);
                for c in values.iter().flatten() {
                    self.out.extend_from_slice(&c.to_le_bytes());
                }
                Self::rep(24, ValueRep::ARRAY_BIT, offset)
            }
            TestValue::TokenVector(names) => {
                let indexes: Vec<u32> = names.iter().map(|n| self.token(n)).collect();
                let offset = self.data_offset();
                self.u64(indexes.len() as u64);
                for index in indexes {
                    self.out.extend_from_slice(&index.to_le_bytes());
                }
                Self::rep(41, 0, offset)
            }
            TestValue::Specifier(name) => {
                let bits = match *name {
                    "def" => 0,
                    "over" => 1,
                    _ => 2,
                };
                Self::inlined(42, bits)
            }
            TestValue::Variability(name) => Self::inlined(44, u32::from(*name == "uniform")),
            TestValue::EmptyDictionary => Self::inlined(31, 0),
            TestValue::TimeSamples => {
                let offset = self.data_offset();
                self.u64(0);
                Self::rep(46, 0, offset)
            }
            TestValue::References => {
                let offset = self.data_offset();
                self.u64(0);
                Self::rep(34, 0, offset)
            }
        }
    }
}

/// Components packed as `i8` when every one is a small integer.
fn small_ints(values: &[f64]) -> Option<u32> {
    let mut bytes = [0u8; 4];
    for (slot, v) in bytes.iter_mut().zip(values) {
        if v.fract() != 0.0 || *v < f64::from(i8::MIN) || *v > f64::from(i8::MAX) {
            return None;
        }
        *slot = (*v as i8) as u8;
    }
    Some(u32::from_le_bytes(bytes))
}

/// A single LZ4 block behind a zero chunk count.
fn frame(bytes: &[u8]) -> Vec<u8> {
    let mut framed = vec![0u8];
    framed.extend(lz4_flex::block::compress(bytes));
    framed
}

/// Delta code `values`, using the most frequent delta as the common value.
fn encode_integers(values: &[i64], width: IntWidth) -> Vec<u8> {
    let mut previous = 0i64;
    let deltas: Vec<i64> = values
        .iter()
        .map(|v| {
            let delta = width.wrap(v.wrapping_sub(previous));
            previous = *v;
            delta
        })
        .collect();

    let mut counts: HashMap<i64, usize> = HashMap::new();
    for delta in &deltas {
        *counts.entry(*delta).or_default() += 1;
    }
    let common = counts
        .into_iter()
        .max_by_key(|(delta, count)| (*count, std::cmp::Reverse(*delta)))
        .map_or(0, |(delta, _)| delta);

    let fits = |delta: i64, bytes: usize| {
        let bits = bytes as u32 * 8;
        delta >= -(1i64 << (bits - 1)) && delta < (1i64 << (bits - 1))
    };

    let mut out = common.to_le_bytes()[..width.bytes()].to_vec();
    let mut codes = vec![0u8; (deltas.len() * 2 + 7) / 8];
    let mut payload = Vec::new();
    for (index, delta) in deltas.iter().enumerate() {
        let (code, bytes) = if *delta == common {
            (0, 0)
        } else if fits(*delta, width.small()) {
            (1, width.small())
        } else if fits(*delta, width.medium()) {
            (2, width.medium())
        } else {
            (3, width.bytes())
        };
        codes[index / 4] |= code << (2 * (index % 4));
        payload.extend_from_slice(&delta.to_le_bytes()[..bytes]);
    }
    out.extend(codes);
    out.extend(payload);
    out
}
