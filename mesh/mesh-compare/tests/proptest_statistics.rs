//! Property-based tests for distance statistics and comparisons.
//!
//! Run with: cargo test -p mesh-compare -- proptest

#![allow(clippy::unwrap_used)]

use mesh_compare::{CompareParams, DistanceStatistics, cloud_to_cloud, cloud_to_mesh};
use mesh_types::{IndexedMesh, unit_cube};
use nalgebra::Vector3;
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_distances() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-100.0..100.0f64, 1..200)
}

fn arb_offset() -> impl Strategy<Value = Vector3<f64>> {
    prop::array::uniform3(-2.0..2.0f64).prop_map(Vector3::from)
}

fn translated_cube(offset: Vector3<f64>) -> IndexedMesh {
    let mut cube = unit_cube();
    cube.translate(offset);
    cube
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn proptest_statistics_are_ordered(distances in arb_distances()) {
        let stats = DistanceStatistics::from_distances(&distances).unwrap();
        let eps = 1e-9;

        prop_assert_eq!(stats.count, distances.len());
        prop_assert!(stats.min <= stats.median && stats.median <= stats.max);
        prop_assert!(stats.min - eps <= stats.mean && stats.mean <= stats.max + eps);
        prop_assert!(stats.std_dev >= 0.0);
        prop_assert!(stats.rms + eps >= stats.mean.abs());
        prop_assert!(stats.rms <= stats.min.abs().max(stats.max.abs()) + eps);
    }

    #[test]
    fn proptest_sign_counts_cover_every_sample(distances in arb_distances()) {
        let stats = DistanceStatistics::from_signed_distances(&distances).unwrap();
        let signs = stats.signs.unwrap();
        prop_assert_eq!(signs.total(), distances.len());
        prop_assert_eq!(signs.negative, distances.iter().filter(|d| **d < 0.0).count());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn proptest_c2c_pooled_count_is_symmetric(offset in arb_offset(), seed in any::<u64>()) {
        let a = unit_cube();
        let b = translated_cube(offset);
        let params = CompareParams::new().with_sample_count(300).with_seed(seed);

        let ab = cloud_to_cloud(&a, &b, &params).unwrap();
        let ba = cloud_to_cloud(&b, &a, &params).unwrap();
        prop_assert_eq!(ab.stats.count, ba.stats.count);
        prop_assert_eq!(ab.stats.count, 600);
    }

    #[test]
    fn proptest_c2m_far_cloud_is_positive(offset in arb_offset(), seed in any::<u64>()) {
        // Shift at least 1.5 along x so the compared cube leaves the reference box.
        let shift = Vector3::new(offset.x.abs() + 1.5, offset.y, offset.z);
        let params = CompareParams::new().with_sample_count(200).with_seed(seed);

        let c2m = cloud_to_mesh(&unit_cube(), &translated_cube(shift), &params).unwrap();
        prop_assert!(c2m.signed_distances().all(|d| d > 0.0));
    }
}
