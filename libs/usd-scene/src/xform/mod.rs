//! # Xform Ops
//!
//! Evaluates a prim's `xformOpOrder` into a local transform matrix.
//!
//! ## Composition
//!
//! Ops are applied in `xformOpOrder` with column vectors, so the first op
//! listed is the outermost:
//!
//! ```text
//! local = op[0] * op[1] * ... * op[n-1]
//! ```
//!
//! ## Supported Ops
//!
//! - `translate`, `scale` (`double3` / `float3`)
//! - `rotateX`, `rotateY`, `rotateZ` (degrees)
//! - `rotateXYZ`, `rotateXZY`, `rotateYXZ`, `rotateYZX`, `rotateZXY`, `rotateZYX`
//! - `orient` (quaternion authored as `(w, x, y, z)`)
//! - `transform` (`matrix4d`)
//! - `!invert!` prefix and `!resetXformStack!`
//!
//! ## Example
//!
//! ```rust
//! use usd_scene::xform::local_transform;
//!
//! let layer = usda_parser::parse(
//!     "#usda 1.0\ndef Xform \"A\" {\n double3 xformOp:translate = (1, 2, 3)\n uniform token[] xformOpOrder = [\"xformOp:translate\"]\n}",
//! )
//! .into_result()
//! .unwrap();
//! let local = local_transform("/A", &layer.prims[0]).unwrap();
//! assert_eq!(local.matrix.w_axis.truncate(), glam::DVec3::new(1.0, 2.0, 3.0));
//! ```

use crate::error::XformError;
use config::constants::{EPSILON, SINGULAR_DETERMINANT, XFORMABLE_TYPE_NAMES};
use glam::{DMat4, DQuat, DVec3};
use usda_parser::{PrimSpec, Value};

/// Token in `xformOpOrder` that discards all ancestor transforms.
pub const RESET_XFORM_STACK: &str = "!resetXformStack!";

/// Prefix marking an op whose inverse is applied.
pub const INVERSE_PREFIX: &str = "!invert!";

/// Namespace every op attribute lives in.
pub const OP_NAMESPACE: &str = "xformOp";

// =============================================================================
// OP KINDS
// =============================================================================

/// Principal rotation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// X axis.
    X,
    /// Y axis.
    Y,
    /// Z axis.
    Z,
}

impl Axis {
    fn from_char(c: char) -> Option<Self> {
        match c {
            'X' => Some(Self::X),
            'Y' => Some(Self::Y),
            'Z' => Some(Self::Z),
            _ => None,
        }
    }

    /// Rotation about this axis by `degrees`.
    fn rotation(self, degrees: f64) -> DMat4 {
        let radians = degrees.to_radians();
        match self {
            Self::X => DMat4::from_rotation_x(radians),
            Self::Y => DMat4::from_rotation_y(radians),
            Self::Z => DMat4::from_rotation_z(radians),
        }
    }
}

/// Kind of an xform op, taken from the second component of its name
/// (`xformOp:<kind>[:suffix]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XformOpKind {
    /// `translate`
    Translate,
    /// `scale`
    Scale,
    /// `rotateX`, `rotateY` or `rotateZ`.
    Rotate(Axis),
    /// Three-angle rotation; axes are listed in application order.
    RotateEuler([Axis; 3]),
    /// `orient`
    Orient,
    /// `transform`
    Transform,
}

impl XformOpKind {
    /// Parse the op kind component, e.g. `rotateXYZ`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "translate" => return Some(Self::Translate),
            "scale" => return Some(Self::Scale),
            "orient" => return Some(Self::Orient),
            "transform" => return Some(Self::Transform),
            _ => {}
        }

        let axes: Vec<Axis> = name
            .strip_prefix("rotate")?
            .chars()
            .map(Axis::from_char)
            .collect::<Option<_>>()?;

        match axes.as_slice() {
            [axis] => Some(Self::Rotate(*axis)),
            [a, b, c] if a != b && b != c && a != c => Some(Self::RotateEuler([*a, *b, *c])),
            _ => None,
        }
    }
}

// =============================================================================
// OPS
// =============================================================================

/// One resolved entry of `xformOpOrder`.
#[derive(Debug, Clone, PartialEq)]
pub struct XformOp {
    /// Attribute holding the op value, e.g. `xformOp:translate:pivot`.
    pub attribute: String,
    /// Op kind.
    pub kind: XformOpKind,
    /// True when the entry carried the `!invert!` prefix.
    pub inverse: bool,
}

impl XformOp {
    /// Parse an `xformOpOrder` entry.
    ///
    /// Returns `None` if the entry is not of the form
    /// `[!invert!]xformOp:<kind>[:suffix]` with a known kind.
    pub fn parse(entry: &str) -> Option<Self> {
        let (inverse, attribute) = match entry.strip_prefix(INVERSE_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, entry),
        };

        let mut parts = attribute.split(':');
        if parts.next() != Some(OP_NAMESPACE) {
            return None;
        }
        let kind = XformOpKind::from_name(parts.next()?)?;

        Some(Self {
            attribute: attribute.to_string(),
            kind,
            inverse,
        })
    }

    /// Matrix of this op for the authored `value`.
    ///
    /// ## Parameters
    ///
    /// - `prim`: Prim path, used in errors
    /// - `value`: The op attribute's default value
    pub fn matrix(&self, prim: &str, value: &Value) -> Result<DMat4, XformError> {
        let invalid = |expected: &'static str| XformError::InvalidValue {
            prim: prim.to_string(),
            op: self.attribute.clone(),
            expected,
        };

        let matrix = match self.kind {
            XformOpKind::Translate => {
                let [x, y, z] = value.as_vec3().ok_or_else(|| invalid("3-vector"))?;
                DMat4::from_translation(DVec3::new(x, y, z))
            }
            XformOpKind::Scale => {
                let [x, y, z] = value.as_vec3().ok_or_else(|| invalid("3-vector"))?;
                DMat4::from_scale(DVec3::new(x, y, z))
            }
            XformOpKind::Rotate(axis) => {
                let degrees = value.as_f64().ok_or_else(|| invalid("number"))?;
                axis.rotation(degrees)
            }
            XformOpKind::RotateEuler(axes) => {
                let angles = value.as_vec3().ok_or_else(|| invalid("3-vector"))?;
                // The first listed axis is applied first, so it is innermost.
                axes.iter()
                    .zip(angles)
                    .fold(DMat4::IDENTITY, |acc, (axis, degrees)| axis.rotation(degrees) * acc)
            }
            XformOpKind::Orient => {
                let [w, x, y, z] = value.as_vec4().ok_or_else(|| invalid("quaternion"))?;
                let quat = DQuat::from_xyzw(x, y, z, w);
                if quat.length_squared() < EPSILON {
                    return Err(invalid("non-zero quaternion"));
                }
                DMat4::from_quat(quat.normalize())
            }
            XformOpKind::Transform => {
                // Row-major with row vectors: the same 16 numbers read
                // column-major give the column-vector matrix.
                let m = value.as_matrix4().ok_or_else(|| invalid("4x4 matrix"))?;
                DMat4::from_cols_array(&m)
            }
        };

        if !self.inverse {
            return Ok(matrix);
        }
        if matrix.determinant().abs() < SINGULAR_DETERMINANT {
            return Err(XformError::Singular {
                prim: prim.to_string(),
                op: self.attribute.clone(),
            });
        }
        Ok(matrix.inverse())
    }
}

// =============================================================================
// LOCAL TRANSFORM
// =============================================================================

/// A prim's local transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    /// Product of the prim's ops.
    pub matrix: DMat4,
    /// True if ancestors' transforms are discarded.
    pub resets_xform_stack: bool,
}

impl LocalTransform {
    /// Identity transform that inherits the parent's.
    pub const IDENTITY: Self = Self {
        matrix: DMat4::IDENTITY,
        resets_xform_stack: false,
    };

    /// Compose with the parent's local-to-world matrix.
    pub fn to_world(&self, parent: DMat4) -> DMat4 {
        if self.resets_xform_stack {
            self.matrix
        } else {
            parent * self.matrix
        }
    }
}

/// True if prims of this type carry xform ops.
pub fn is_xformable(prim: &PrimSpec) -> bool {
    prim.type_name
        .as_deref()
        .map_or(false, |t| XFORMABLE_TYPE_NAMES.contains(&t))
}

/// Evaluate the local transform of `prim` at its default time.
///
/// Non-xformable prims, and prims without `xformOpOrder`, yield identity.
///
/// ## Parameters
///
/// - `path`: Prim path, used in errors
/// - `prim`: Prim spec
pub fn local_transform(path: &str, prim: &PrimSpec) -> Result<LocalTransform, XformError> {
    if !is_xformable(prim) {
        return Ok(LocalTransform::IDENTITY);
    }

    let order = match prim.attribute("xformOpOrder").and_then(|a| a.default.as_ref()) {
        None | Some(Value::None) => return Ok(LocalTransform::IDENTITY),
        Some(value) => value.as_token_list().ok_or_else(|| XformError::InvalidOrder {
            prim: path.to_string(),
        })?,
    };

    let mut local = LocalTransform::IDENTITY;
    for entry in order {
        if entry == RESET_XFORM_STACK {
            local = LocalTransform {
                matrix: DMat4::IDENTITY,
                resets_xform_stack: true,
            };
            continue;
        }

        let op = XformOp::parse(entry).ok_or_else(|| XformError::UnknownOp {
            prim: path.to_string(),
            op: entry.to_string(),
        })?;

        let attribute = prim
            .attribute(&op.attribute)
            .ok_or_else(|| XformError::MissingOp {
                prim: path.to_string(),
                op: op.attribute.clone(),
            })?;
        let value = match &attribute.default {
            Some(value) if *value != Value::None => value,
            _ => {
                return Err(XformError::NoDefault {
                    prim: path.to_string(),
                    op: op.attribute.clone(),
                })
            }
        };

        local.matrix *= op.matrix(path, value)?;
    }

    Ok(local)
}
