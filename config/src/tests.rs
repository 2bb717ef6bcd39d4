//! # Tests for Config Constants
//!
//! Unit tests verifying the correctness of configuration constants.

use crate::constants::*;

// =============================================================================
// PRECISION TESTS
// =============================================================================

#[test]
fn test_epsilon_is_positive() {
    assert!(EPSILON > 0.0, "EPSILON must be positive");
}

#[test]
fn test_singular_determinant_below_epsilon_scale() {
    assert!(SINGULAR_DETERMINANT > 0.0);
    assert!(SINGULAR_DETERMINANT < 1e-6);
}

// =============================================================================
// GEOMETRY TESTS
// =============================================================================

#[test]
fn test_unit_cube_has_unit_edge() {
    assert_eq!(UNIT_CUBE_HALF_EXTENT * 2.0, 1.0);
}

#[test]
fn test_cube_counts_are_consistent() {
    assert_eq!(CUBE_FACE_CORNER_COUNT * 2, CUBE_CORNER_COUNT);
    assert_eq!(QUAD_VERTEX_COUNT as usize, CUBE_FACE_CORNER_COUNT);
    assert_eq!(CUBE_QUAD_COUNT, 6);
}

#[test]
fn test_vertical_axis_is_y() {
    assert_eq!(VERTICAL_AXIS, 1);
}

#[test]
fn test_demo_box_is_larger_than_unit_cube() {
    assert!(DEMO_BOX_HALF_EXTENT > UNIT_CUBE_HALF_EXTENT);
}

// =============================================================================
// SCENE TESTS
// =============================================================================

#[test]
fn test_magic_bytes_are_distinct() {
    assert_ne!(USDC_MAGIC, ZIP_MAGIC);
    assert!(!USDC_MAGIC.starts_with(ZIP_MAGIC));
}

#[test]
fn test_cube_is_xformable() {
    assert!(XFORMABLE_TYPE_NAMES.contains(&CUBE_TYPE_NAME));
    assert!(!XFORMABLE_TYPE_NAMES.contains(&"Scope"));
}

#[test]
fn test_usdz_layer_extensions_include_text() {
    assert!(USDZ_LAYER_EXTENSIONS.contains(&"usda"));
}

// =============================================================================
// REMOTE TESTS
// =============================================================================

#[test]
fn test_server_url_has_no_trailing_slash() {
    assert!(!DEFAULT_SERVER_URL.ends_with('/'));
    assert!(DEFAULT_SERVER_URL.starts_with("https://"));
}

#[test]
fn test_container_key_is_not_detached_prefix() {
    assert!(!CONTAINER_KEY.starts_with('@'));
    assert!(!CONTAINER_KEY.is_empty());
}

// =============================================================================
// SERIALIZATION TESTS
// =============================================================================

#[test]
fn test_object_id_fits_sha256() {
    // SHA-256 hex digest is 64 characters.
    assert!(OBJECT_ID_LENGTH <= 64);
    assert!(OBJECT_ID_LENGTH >= 16);
}

#[test]
fn test_batch_limit_is_reasonable() {
    assert!(MAX_BATCH_BYTES >= 64 * 1024);
}

// =============================================================================
// LIMIT TESTS
// =============================================================================

#[test]
fn test_nesting_limit_allows_real_scenes() {
    assert!(MAX_NESTING_DEPTH >= 64);
}

#[test]
fn test_stack_segment_exceeds_red_zone() {
    assert!(STACKER_STACK_SIZE_BYTES > STACKER_RED_ZONE_BYTES);
}
