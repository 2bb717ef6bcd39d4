//! # Scene Errors
//!
//! Error types for stage loading and xform evaluation.

use std::path::PathBuf;
use thiserror::Error;
use usda_parser::ParseError;

/// Errors that prevent a stage from being opened.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The file (or an archive entry) could not be read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// File or archive entry being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file exceeds the accepted input size.
    #[error("{} is {size} bytes, limit is {limit}", .path.display())]
    FileTooLarge {
        /// Offending file.
        path: PathBuf,
        /// Actual size in bytes.
        size: u64,
        /// Accepted maximum in bytes.
        limit: usize,
    },

    /// A binary crate layer could not be decoded.
    #[error("invalid usdc layer: {0}")]
    Crate(#[from] CrateError),

    /// The USDZ container is not a readable ZIP archive.
    #[error("invalid usdz archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The USDZ archive holds no USD layer.
    #[error("usdz archive contains no USD layer")]
    NoRootLayer,

    /// A text layer is not valid UTF-8.
    #[error("layer is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// The text layer failed to parse.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
}

impl SceneError {
    /// Create an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors decoding a binary crate (`.usdc`) layer.
#[derive(Debug, Error)]
pub enum CrateError {
    /// A read ran past the end of the file.
    #[error("truncated at byte {offset}: needed {needed} more bytes")]
    Truncated {
        /// Where the read started.
        offset: usize,
        /// Bytes the read asked for.
        needed: usize,
    },

    /// The file version has no decoder here.
    #[error("crate version {0}.{1}.{2} is not supported")]
    UnsupportedVersion(u8, u8, u8),

    /// A required table-of-contents section is absent.
    #[error("missing section {0}")]
    MissingSection(&'static str),

    /// A decoded size exceeds what the input could legitimately hold.
    #[error("{what} of {size} bytes exceeds the limit of {limit}")]
    TooLarge {
        /// Which buffer.
        what: &'static str,
        /// Requested size in bytes.
        size: u64,
        /// Accepted maximum in bytes.
        limit: usize,
    },

    /// An LZ4 block failed to decompress.
    #[error("lz4: {0}")]
    Lz4(#[from] lz4_flex::block::DecompressError),

    /// A table index points outside its table.
    #[error("{table} index {index} out of range")]
    BadIndex {
        /// Table being indexed.
        table: &'static str,
        /// Offending index.
        index: usize,
    },

    /// Structure that cannot occur in a well-formed file.
    #[error("corrupt crate file: {0}")]
    Corrupt(String),
}

/// Errors evaluating a prim's xform ops.
///
/// The error names the prim whose ops failed; descendants of that prim
/// report the same error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum XformError {
    /// `xformOpOrder` is not an array of tokens.
    #[error("{prim}: xformOpOrder is not a token array")]
    InvalidOrder {
        /// Prim path.
        prim: String,
    },

    /// `xformOpOrder` names an op whose attribute is not authored.
    #[error("{prim}: xformOpOrder names '{op}' but it is not authored")]
    MissingOp {
        /// Prim path.
        prim: String,
        /// Op attribute name.
        op: String,
    },

    /// The op attribute has no default value.
    #[error("{prim}: '{op}' has no default value")]
    NoDefault {
        /// Prim path.
        prim: String,
        /// Op attribute name.
        op: String,
    },

    /// The op value has the wrong shape.
    #[error("{prim}: '{op}' is not a {expected}")]
    InvalidValue {
        /// Prim path.
        prim: String,
        /// Op attribute name.
        op: String,
        /// Expected value shape.
        expected: &'static str,
    },

    /// The op name does not name a known op type.
    #[error("{prim}: unknown xform op '{op}'")]
    UnknownOp {
        /// Prim path.
        prim: String,
        /// Op attribute name.
        op: String,
    },

    /// An `!invert!` op has no inverse.
    #[error("{prim}: '{op}' is singular and cannot be inverted")]
    Singular {
        /// Prim path.
        prim: String,
        /// Op attribute name.
        op: String,
    },
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_names_path() {
        let err = SceneError::io(
            "/tmp/missing.usdz",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.usdz"));
        assert!(msg.contains("no such file"));
    }

    #[test]
    fn test_crate_error_wraps_into_scene_error() {
        let err: SceneError = CrateError::MissingSection("TOKENS").into();
        assert_eq!(err.to_string(), "invalid usdc layer: missing section TOKENS");
    }

    #[test]
    fn test_xform_error_display() {
        let err = XformError::MissingOp {
            prim: "/World/Box".into(),
            op: "xformOp:translate".into(),
        };
        assert_eq!(
            err.to_string(),
            "/World/Box: xformOpOrder names 'xformOp:translate' but it is not authored"
        );
    }
}
