//! Property-based tests for corner ordering and mesh assembly.
//!
//! Boxes are generated upright (any yaw about Y, any size and position) and
//! their corners are fed in random order.

use cube_mesh::{assemble_mesh, canonicalize, CubeCorners};
use glam::{DMat4, DVec3};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

/// An upright box: scale, then yaw about Y, then translate.
fn arb_upright_box() -> impl Strategy<Value = DMat4> {
    (
        prop::array::uniform3(0.01..50.0f64),
        0.0..std::f64::consts::TAU,
        prop::array::uniform3(-100.0..100.0f64),
    )
        .prop_map(|(scale, yaw, offset)| {
            DMat4::from_translation(DVec3::from_array(offset))
                * DMat4::from_rotation_y(yaw)
                * DMat4::from_scale(DVec3::from_array(scale))
        })
}

/// Corners of an upright box in random order.
fn arb_shuffled_corners() -> impl Strategy<Value = (CubeCorners, CubeCorners)> {
    arb_upright_box().prop_flat_map(|matrix| {
        let corners = CubeCorners::from_transform(matrix);
        Just(corners.points().to_vec())
            .prop_shuffle()
            .prop_map(move |points| {
                let shuffled: [DVec3; 8] = points.try_into().unwrap();
                (corners, CubeCorners::new(shuffled))
            })
    })
}

fn polar_angles(face: &[DVec3]) -> Vec<f64> {
    let center = face.iter().copied().sum::<DVec3>() / face.len() as f64;
    face.iter()
        .map(|p| (p.z - center.z).atan2(p.x - center.x))
        .collect()
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn bottom_face_is_below_top_face((_, corners) in arb_shuffled_corners()) {
        let ordered = canonicalize(&corners).unwrap();
        let bottom_max = ordered.bottom().iter().map(|v| v.y).fold(f64::MIN, f64::max);
        let top_min = ordered.top().iter().map(|v| v.y).fold(f64::MAX, f64::min);
        prop_assert!(bottom_max < top_min);
    }

    #[test]
    fn faces_have_increasing_polar_angle((_, corners) in arb_shuffled_corners()) {
        let ordered = canonicalize(&corners).unwrap();
        for face in [ordered.bottom(), ordered.top()] {
            let angles = polar_angles(face);
            prop_assert!(angles.windows(2).all(|w| w[0] < w[1]), "angles {:?}", angles);
        }
    }

    #[test]
    fn input_order_does_not_matter((original, shuffled) in arb_shuffled_corners()) {
        prop_assert_eq!(canonicalize(&shuffled).unwrap(), canonicalize(&original).unwrap());
    }

    #[test]
    fn meshes_have_fixed_lengths(matrix in arb_upright_box()) {
        let ordered = canonicalize(&CubeCorners::from_transform(matrix)).unwrap();
        let mesh = assemble_mesh(&ordered, Some("box".to_string()));
        prop_assert_eq!(mesh.vertices().len(), 24);
        prop_assert_eq!(mesh.faces().len(), 30);
        prop_assert!(mesh.faces().chunks(5).all(|quad| quad[0] == 4 && quad[1..].iter().all(|&i| i < 8)));
    }
}
