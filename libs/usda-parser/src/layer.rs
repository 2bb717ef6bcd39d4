//! # Layer Specs
//!
//! The parsed form of a USDA layer: prim specs with their properties and
//! metadata, exactly as authored. No composition happens here.
//!
//! ## Example
//!
//! ```rust
//! let parsed = usda_parser::parse("#usda 1.0\ndef Cube \"Box\" {}");
//! assert!(parsed.is_ok());
//! assert_eq!(parsed.layer.prims[0].type_name.as_deref(), Some("Cube"));
//! ```

use crate::error::ParseError;
use crate::span::{Span, Spanned};
use serde::{Deserialize, Serialize};

// =============================================================================
// PARSED
// =============================================================================

/// Parse result: the layer plus any errors encountered.
///
/// The parser recovers at prim boundaries, so `layer` may be partial when
/// `errors` is not empty.
#[derive(Debug, Clone)]
pub struct Parsed {
    /// Parsed layer.
    pub layer: Layer,
    /// Parse errors encountered.
    pub errors: Vec<ParseError>,
}

impl Parsed {
    /// Create a new parse result.
    pub fn new(layer: Layer, errors: Vec<ParseError>) -> Self {
        Self { layer, errors }
    }

    /// Check if parsing was successful (no errors).
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Convert into the layer, or the first error.
    pub fn into_result(self) -> Result<Layer, ParseError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(self.layer),
        }
    }
}

// =============================================================================
// LAYER
// =============================================================================

/// A text layer: header version, layer metadata and root prims.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Version from the `#usda` header, e.g. `"1.0"`.
    pub version: String,
    /// Layer metadata (`defaultPrim`, `upAxis`, …).
    pub metadata: Metadata,
    /// Root prim specs in authored order.
    pub prims: Vec<PrimSpec>,
}

impl Layer {
    /// Find a prim spec by absolute path, e.g. `/World/Cube1`.
    pub fn find_prim(&self, path: &str) -> Option<&PrimSpec> {
        let mut names = path.strip_prefix('/')?.split('/');
        let first = names.next()?;
        let mut prim = self.prims.iter().find(|p| p.name == first)?;
        for name in names {
            prim = prim.child(name)?;
        }
        Some(prim)
    }
}

// =============================================================================
// PRIM SPEC
// =============================================================================

/// How a prim spec was introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Specifier {
    /// `def`: defines the prim.
    Def,
    /// `over`: overrides opinions without defining.
    Over,
    /// `class`: abstract prim used as an inheritance source.
    Class,
}

/// A prim as authored in the layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimSpec {
    /// `def`, `over` or `class`.
    pub specifier: Specifier,
    /// Schema type name, e.g. `Cube`; `None` for typeless prims.
    pub type_name: Option<String>,
    /// Prim name (last path element).
    pub name: String,
    /// Prim metadata.
    pub metadata: Metadata,
    /// Attributes and relationships in authored order.
    pub properties: Vec<PropertySpec>,
    /// Child prims in authored order.
    pub children: Vec<PrimSpec>,
    /// Source span of the whole spec.
    pub span: Span,
}

impl PrimSpec {
    /// Look up an attribute by full name.
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.properties.iter().find_map(|p| match p {
            PropertySpec::Attribute(attr) if attr.name == name => Some(attr),
            _ => None,
        })
    }

    /// Look up a relationship by name.
    pub fn relationship(&self, name: &str) -> Option<&Relationship> {
        self.properties.iter().find_map(|p| match p {
            PropertySpec::Relationship(rel) if rel.name == name => Some(rel),
            _ => None,
        })
    }

    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&PrimSpec> {
        self.children.iter().find(|c| c.name == name)
    }

    /// `active` metadata, defaulting to true.
    pub fn is_active(&self) -> bool {
        self.metadata
            .get("active")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// True if the spec carries composition arcs this reader does not follow.
    pub fn has_composition_arcs(&self) -> bool {
        ["references", "payload", "inherits", "specializes", "variants"]
            .iter()
            .any(|key| self.metadata.get(key).is_some())
    }
}

impl Spanned for PrimSpec {
    fn span(&self) -> Span {
        self.span
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

/// A property spec inside a prim body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertySpec {
    /// Typed attribute.
    Attribute(Attribute),
    /// Relationship to other prims or properties.
    Relationship(Relationship),
}

/// Attribute variability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Variability {
    /// May vary over time (the default).
    #[default]
    Varying,
    /// `uniform`: one value for all time.
    Uniform,
}

/// A typed attribute such as `double3 xformOp:translate = (0, 1, 0)`.
///
/// The same attribute may be authored over several statements (a default
/// value, then `.timeSamples`, then `.connect`); the parser folds them into
/// one `Attribute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Full, namespaced name.
    pub name: String,
    /// Value type name without the array suffix, e.g. `double3`.
    pub type_name: String,
    /// True for `type[]` attributes.
    pub is_array: bool,
    /// `uniform` or varying.
    pub variability: Variability,
    /// True if declared `custom`.
    pub custom: bool,
    /// Default (time-independent) value, if authored.
    pub default: Option<Value>,
    /// Authored time samples as `(time, value)` pairs.
    pub time_samples: Vec<(f64, Value)>,
    /// Connection targets from `.connect`.
    pub connections: Vec<String>,
    /// Attribute metadata.
    pub metadata: Metadata,
    /// Source span of the first statement.
    pub span: Span,
}

impl Attribute {
    /// Create an attribute with no authored opinions.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            is_array: false,
            variability: Variability::Varying,
            custom: false,
            default: None,
            time_samples: Vec::new(),
            connections: Vec::new(),
            metadata: Metadata::default(),
            span,
        }
    }
}

/// A relationship such as `rel material:binding = </Looks/Red>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    /// Full, namespaced name.
    pub name: String,
    /// True if declared `custom`.
    pub custom: bool,
    /// List-op prefix, if any.
    pub list_op: Option<ListOp>,
    /// Target paths.
    pub targets: Vec<String>,
    /// Relationship metadata.
    pub metadata: Metadata,
    /// Source span.
    pub span: Span,
}

// =============================================================================
// METADATA
// =============================================================================

/// List-edit operation prefixing a metadata entry or relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListOp {
    /// `prepend`
    Prepend,
    /// `append`
    Append,
    /// `add`
    Add,
    /// `delete`
    Delete,
    /// `reorder`
    Reorder,
}

/// A single `key = value` metadata entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Metadata key.
    pub key: String,
    /// List-op prefix, if any.
    pub list_op: Option<ListOp>,
    /// Entry value.
    pub value: Value,
}

/// Metadata block `( ... )` attached to a layer, prim or property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Bare string entry (documentation).
    pub doc: Option<String>,
    /// Keyed entries in authored order.
    pub entries: Vec<MetadataEntry>,
}

impl Metadata {
    /// Value of the last entry with `key`.
    ///
    /// Later opinions in the same block win.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.key == key)
            .map(|e| &e.value)
    }

    /// True if no entries or doc string were authored.
    pub fn is_empty(&self) -> bool {
        self.doc.is_none() && self.entries.is_empty()
    }
}

// =============================================================================
// VALUE
// =============================================================================

/// An authored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// `None`: an explicitly blocked value.
    None,
    /// `true` / `false`.
    Bool(bool),
    /// Any numeric literal (including `inf` and `nan`).
    Number(f64),
    /// Quoted string.
    String(String),
    /// Bare identifier used as a value, e.g. `uniform token purpose = default`.
    Token(String),
    /// `<path>`.
    Path(String),
    /// `@asset@`, optionally followed by a prim path in references.
    AssetPath(String),
    /// Parenthesised tuple such as `(1, 2, 3)`.
    Tuple(Vec<Value>),
    /// Bracketed list such as `[1, 2, 3]`.
    Array(Vec<Value>),
    /// `{ type key = value ... }`.
    Dictionary(Vec<(String, Value)>),
}

impl Value {
    /// Numeric value; booleans map to 0/1.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Boolean value; numbers are true when non-zero.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Number(n) => Some(*n != 0.0),
            _ => None,
        }
    }

    /// String content of a string or token value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Token(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a tuple.
    pub fn as_tuple(&self) -> Option<&[Value]> {
        match self {
            Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Elements of an array.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// A tuple of exactly `N` numbers.
    pub fn as_numbers<const N: usize>(&self) -> Option<[f64; N]> {
        let items = self.as_tuple()?;
        if items.len() != N {
            return None;
        }
        let mut out = [0.0; N];
        for (slot, item) in out.iter_mut().zip(items) {
            *slot = item.as_f64()?;
        }
        Some(out)
    }

    /// A 3-tuple such as `double3` or `float3`.
    pub fn as_vec3(&self) -> Option<[f64; 3]> {
        self.as_numbers::<3>()
    }

    /// A 4-tuple such as `quatf` (authored as `(w, x, y, z)`).
    pub fn as_vec4(&self) -> Option<[f64; 4]> {
        self.as_numbers::<4>()
    }

    /// A `matrix4d` authored as four row tuples, flattened row-major.
    pub fn as_matrix4(&self) -> Option<[f64; 16]> {
        let rows = self.as_tuple()?;
        if rows.len() != 4 {
            return None;
        }
        let mut out = [0.0; 16];
        for (r, row) in rows.iter().enumerate() {
            let row = row.as_vec4()?;
            out[r * 4..r * 4 + 4].copy_from_slice(&row);
        }
        Some(out)
    }

    /// An array of strings or tokens, e.g. `xformOpOrder`.
    pub fn as_token_list(&self) -> Option<Vec<&str>> {
        self.as_array()?.iter().map(Value::as_str).collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================
