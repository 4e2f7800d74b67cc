//! API Regression Tests for the Mesh Comparison Crates
//!
//! These tests pin the public API across the workspace. They are organized
//! in tiers of increasing scope:
//!
//! - Tier 1: Foundation (mesh-types, mesh-io)
//! - Tier 2: Stages (mesh-sample, mesh-registration, mesh-compare, mesh-measure)
//! - Tier 3: Runs (mesh-diff)
//!
//! A failure after an API change is a breaking change that needs a version
//! bump.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::float_cmp)]

use mesh::{prelude::*, types};

// =============================================================================
// TIER 1: Foundation - Basic Types and I/O
// =============================================================================

mod tier1_foundation {
    use super::*;

    #[test]
    fn vertex_creation_and_access() {
        let v = types::Vertex::from_coords(1.0, 2.0, 3.0);
        assert!((v.position.x - 1.0).abs() < f64::EPSILON);
        assert!((v.position.z - 3.0).abs() < f64::EPSILON);
        assert!(v.normal.is_none());
    }

    #[test]
    fn indexed_mesh_construction() {
        let mesh = types::IndexedMesh::new();
        assert!(mesh.vertices.is_empty());
        assert!(mesh.validate().is_err());

        let vertices = vec![
            types::Vertex::from_coords(0.0, 0.0, 0.0),
            types::Vertex::from_coords(1.0, 0.0, 0.0),
            types::Vertex::from_coords(0.0, 1.0, 0.0),
        ];
        let mesh = types::IndexedMesh::from_parts(vertices, vec![[0, 1, 2]]);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert!(mesh.validate().is_ok());
    }

    #[test]
    fn primitive_unit_cube() {
        let cube = types::unit_cube();
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.face_count(), 12);
        assert!((cube.volume() - 1.0).abs() < 1e-12);
        assert!((cube.surface_area() - 6.0).abs() < 1e-12);
    }

    #[test]
    fn mesh_bounds_calculation() {
        let bounds = types::unit_cube().bounds();
        assert!((bounds.min.x - 0.0).abs() < f64::EPSILON);
        assert!((bounds.max.y - 1.0).abs() < f64::EPSILON);
        assert!(bounds.is_outside(&types::Point3::new(1.5, 0.5, 0.5)));
    }

    #[test]
    fn io_format_detection() {
        assert_eq!(MeshFormat::from_path("scan.stl"), Some(MeshFormat::Stl));
        assert_eq!(MeshFormat::from_path("scan.OBJ"), Some(MeshFormat::Obj));
        assert_eq!(MeshFormat::from_path("scan.ply"), None);
        assert_eq!(MeshFormat::Obj.extension(), "obj");
    }

    #[test]
    fn io_roundtrip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["cube.obj", "cube.stl"] {
            let path = dir.path().join(name);
            save_mesh(&types::unit_cube(), &path).unwrap();
            let loaded = load_mesh(&path).unwrap();
            assert_eq!(loaded.face_count(), 12);
        }
    }
}

// =============================================================================
// TIER 2: Stages - Sampling, Registration, Comparison, Measurement
// =============================================================================

mod tier2_stages {
    use super::*;
    use mesh::sample::{SampleParams, sample_points_uniformly};

    #[test]
    fn sampling_is_seeded() {
        let params = SampleParams::new().with_count(500).with_seed(3);
        let a = sample_points_uniformly(&types::unit_cube(), &params).unwrap();
        let b = sample_points_uniformly(&types::unit_cube(), &params).unwrap();
        assert_eq!(a.len(), 500);
        assert_eq!(a.positions(), b.positions());
    }

    #[test]
    fn registration_params_builder_pattern() {
        use mesh::registration::IcpParams;

        let params = AlignmentParams::new()
            .with_sample_count(1_000)
            .with_icp(IcpParams::new().with_max_iterations(20));
        assert_eq!(params.sample_count, 1_000);
        assert_eq!(params.icp.max_iterations, 20);
    }

    #[test]
    fn registration_identical_meshes() {
        let params = AlignmentParams::new().with_sample_count(5_000);
        let alignment = align_meshes(&types::unit_cube(), &types::unit_cube(), &params).unwrap();
        assert!(alignment.transform.translation.norm() < 1e-2);
        assert!(alignment.transform.rotation.angle() < 1e-2);
        assert!(alignment.fitness > 0.95);
        assert!(alignment.iterations < 50);
    }

    #[test]
    fn comparison_operations() {
        let params = CompareParams::new().with_sample_count(1_000);
        let c2c = cloud_to_cloud(&types::unit_cube(), &types::unit_cube(), &params).unwrap();
        assert_eq!(c2c.stats.count, 2_000);

        let c2m = cloud_to_mesh(&types::unit_cube(), &types::unit_cube(), &params).unwrap();
        assert_eq!(c2m.stats.signs.unwrap().total(), 1_000);
    }

    #[test]
    fn measurement_operation() {
        let metrics: MeshMetrics = measure(&types::unit_cube()).unwrap();
        assert!(metrics.is_watertight);
        assert_eq!(metrics.triangle_count, 12);
        assert!((metrics.bbox_volume - 1.0).abs() < 1e-12);
    }
}

// =============================================================================
// TIER 3: Runs - Orchestration and Artifacts
// =============================================================================

mod tier3_runs {
    use super::*;
    use mesh::diff::{RunState, Stage};

    #[test]
    fn in_memory_run() {
        let mut config = DiffConfig::default();
        config.alignment.sample_count = 1_000;
        config.comparison.sample_count = 1_000;

        let inputs = ComparisonInputs::new(types::unit_cube(), types::unit_cube());
        let run = run_comparison(&inputs, &config);
        assert_eq!(run.state, RunState::Complete);
        assert!(!run.is_degraded());
    }

    #[test]
    fn run_to_directory_writes_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mesh1 = dir.path().join("a.stl");
        save_mesh(&types::unit_cube(), &mesh1).unwrap();

        let mut config = DiffConfig::default();
        config.alignment.sample_count = 500;
        config.comparison.sample_count = 500;

        let out = dir.path().join("out");
        let run = run_to_directory(&mesh1, dir.path().join("b.stl"), &out, &config).unwrap();
        assert!(run.failure(Stage::LoadCompared).is_some());
        assert!(out.join("summary.txt").is_file());
    }
}

// =============================================================================
// Error Handling Patterns
// =============================================================================

mod error_handling {
    use super::*;
    use mesh::compare::{CompareError, MeshRole};

    #[test]
    fn empty_mesh_errors_name_their_role() {
        let params = CompareParams::new().with_sample_count(100);
        let err = cloud_to_cloud(&IndexedMesh::new(), &types::unit_cube(), &params).unwrap_err();
        assert!(matches!(
            err,
            CompareError::InvalidMesh {
                role: MeshRole::Reference,
                ..
            }
        ));
    }

    #[test]
    fn registration_empty_mesh_error() {
        let result = align_meshes(&IndexedMesh::new(), &types::unit_cube(), &AlignmentParams::new());
        assert!(result.is_err());
    }

    #[test]
    fn registration_invalid_mesh_names_its_role() {
        use mesh::registration::{MeshRole as AlignRole, RegistrationError};

        let mut broken = types::unit_cube();
        broken.faces[5][2] = 40;
        let err = align_meshes(&types::unit_cube(), &broken, &AlignmentParams::new()).unwrap_err();
        assert!(matches!(
            err,
            RegistrationError::InvalidMesh {
                role: AlignRole::Target,
                ..
            }
        ));
    }

    #[test]
    fn measure_empty_mesh_error() {
        assert!(measure(&IndexedMesh::new()).is_err());
    }
}
