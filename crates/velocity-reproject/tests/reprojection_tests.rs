//! End-to-end reprojection scenarios with deterministic transforms.

use approx::assert_relative_eq;
use nalgebra::Matrix2;
use projection::{AffineTransform, CoordinateTransform, IdentityTransform};
use test_utils::fixtures::{crs, grid::SMALL_4X4};
use test_utils::{
    create_outlet_flow, create_test_grid, create_uniform_flow, with_fill_cells, CountingTransform,
    FailingTransform, HoleTransform,
};
use velocity_common::BoundingBox;
use velocity_reproject::{
    estimate_local_basis, CellSize, CellTransform, InterpolationMethod, InverseMappingWarp,
    NoDataReason, ReprojectConfig, ReprojectError, Reprojector, TargetPlan, VelocityGranule,
};

const NODATA: f32 = -32767.0;

fn small_granule() -> VelocityGranule {
    let (vx, vy) = create_outlet_flow(SMALL_4X4.nx, SMALL_4X4.ny);
    VelocityGranule::new(SMALL_4X4.x(), SMALL_4X4.y(), crs::UTM_22N, vx, vy)
}

fn sequential() -> ReprojectConfig {
    ReprojectConfig {
        parallel: false,
        ..Default::default()
    }
}

#[test]
fn test_identity_projection_4x4() {
    let granule = small_granule();
    let reprojector = Reprojector::new(&granule, ReprojectConfig::default()).unwrap();
    let output = reprojector
        .run(&IdentityTransform::new(crs::UTM_22N), &InverseMappingWarp::new(true))
        .unwrap();

    assert_eq!(output.stats.total_cells, 16);
    assert_eq!(output.stats.valid_cells, 16);
    assert_eq!(output.stats.nodata_cells(), 0);

    for cell in &output.transforms.cells {
        let matrix = cell.matrix().expect("identity cell must have a matrix");
        assert_relative_eq!(*matrix, Matrix2::identity(), epsilon = 1e-9);
    }

    assert_eq!(output.granule.x, granule.x);
    assert_eq!(output.granule.y, granule.y);
    for i in 0..16 {
        assert_relative_eq!(output.granule.vx[i], granule.vx[i], epsilon = 1e-2);
        assert_relative_eq!(output.granule.vy[i], granule.vy[i], epsilon = 1e-2);
    }
}

#[test]
fn test_disjoint_extent_is_all_nodata() {
    let granule = small_granule();
    let reprojector = Reprojector::new(&granule, sequential()).unwrap();
    let transform = IdentityTransform::new(crs::UTM_22N);

    // Far away from the granule, on the same lattice
    let bbox = BoundingBox::from_extent(9_600.0, 9_600.0, 10_560.0, 10_560.0).unwrap();
    let plan = TargetPlan::new(bbox, 240.0).unwrap();

    let field = reprojector.transformation_matrix(&plan, &transform).unwrap();
    assert_eq!(field.len(), 16);
    assert_eq!(field.stats.out_of_extent, 16);
    assert_eq!(field.stats.nodata_fraction(), 1.0);

    let output = reprojector
        .run_with_plan(&plan, &transform, &InverseMappingWarp::new(false))
        .unwrap();
    assert!(output.granule.vx.iter().all(|&v| v == NODATA));
    assert!(output.granule.vy.iter().all(|&v| v == NODATA));
}

#[test]
fn test_shape_mismatch_before_any_transform_call() {
    let x = vec![0.0, 240.0, 480.0];
    let y = vec![240.0, 120.0, 0.0];
    let granule = VelocityGranule::new(x, y, crs::UTM_22N, vec![1.0; 9], vec![1.0; 9]);
    let transform = CountingTransform::new(IdentityTransform::new(crs::UTM_22N));

    let result = Reprojector::new(&granule, ReprojectConfig::default())
        .and_then(|r| r.run(&transform, &InverseMappingWarp::default()));

    assert!(matches!(
        result,
        Err(ReprojectError::ShapeMismatch { dx, dy }) if dx == 240.0 && dy == 120.0
    ));
    assert_eq!(transform.calls(), 0);
}

#[test]
fn test_transform_calls_are_batched() {
    let granule = small_granule();
    let reprojector = Reprojector::new(&granule, sequential()).unwrap();
    let transform = CountingTransform::new(IdentityTransform::new(crs::UTM_22N));

    let plan = reprojector.plan(&transform).unwrap();
    assert_eq!(transform.forward_calls(), 1);

    reprojector.transformation_matrix(&plan, &transform).unwrap();
    assert_eq!(transform.inverse_calls(), 1);
    assert_eq!(transform.forward_calls(), 2);
}

#[test]
fn test_rotation_preserves_speed() {
    let (vx, vy) = create_uniform_flow(SMALL_4X4.nx, SMALL_4X4.ny, 1200.0, -60.0);
    let granule = VelocityGranule::new(SMALL_4X4.x(), SMALL_4X4.y(), crs::UTM_22N, vx, vy);
    let reprojector = Reprojector::new(&granule, ReprojectConfig::default()).unwrap();
    let transform = AffineTransform::rotation(crs::UTM_22N, crs::POLAR_NORTH, 30.0);

    let output = reprojector
        .run(&transform, &InverseMappingWarp::new(true))
        .unwrap();

    let (sin, cos) = 30f64.to_radians().sin_cos();
    let rotation = Matrix2::new(cos, -sin, sin, cos);
    let speeds = output.granule.v.as_ref().unwrap();

    let mut checked = 0;
    for (i, cell) in output.transforms.cells.iter().enumerate() {
        match cell {
            CellTransform::Matrix(m) => {
                assert_relative_eq!(*m, rotation, epsilon = 1e-9);
                if output.granule.vx[i] != NODATA {
                    assert_relative_eq!(speeds[i], 1200.0, epsilon = 1e-2);
                    // -60 degrees rotated by 30 is -30 degrees
                    let angle = (output.granule.vy[i] as f64).atan2(output.granule.vx[i] as f64);
                    assert_relative_eq!(angle.to_degrees(), -30.0, epsilon = 1e-3);
                    checked += 1;
                }
            }
            CellTransform::NoData(reason) => assert_eq!(*reason, NoDataReason::OutOfExtent),
        }
    }
    assert!(checked > 0);
}

#[test]
fn test_extent_nodata_points_lie_outside_source() {
    let granule = small_granule();
    let reprojector = Reprojector::new(&granule, sequential()).unwrap();
    let transform = AffineTransform::rotation(crs::UTM_22N, crs::POLAR_NORTH, 45.0);

    let plan = reprojector.plan(&transform).unwrap();
    let field = reprojector.transformation_matrix(&plan, &transform).unwrap();
    let basis = estimate_local_basis(
        &plan.grid.points(),
        &transform,
        CellSize::new(240.0, -240.0).unwrap(),
        false,
    )
    .unwrap();

    let source = reprojector.source_bbox();
    assert!(field.stats.out_of_extent > 0);
    for (i, cell) in field.cells.iter().enumerate() {
        let (x, y) = basis.source_points[i];
        let inside = source.x.contains(x) && source.y.contains(y);
        match cell {
            CellTransform::NoData(NoDataReason::OutOfExtent) => assert!(!inside),
            CellTransform::Matrix(_) => assert!(inside),
            other => panic!("unexpected cell {other:?}"),
        }
    }
}

#[test]
fn test_transform_without_image_is_degenerate_basis() {
    let granule = small_granule();
    let reprojector = Reprojector::new(&granule, sequential()).unwrap();
    // Images of the three western columns touch the hole; the eastern one is clear
    let transform = HoleTransform::new(crs::UTM_22N, (-200.0, -1_000.0, 200.0, 1_000.0));

    let bbox = *reprojector.source_bbox();
    let plan = TargetPlan::new(bbox, 240.0).unwrap();
    let field = reprojector.transformation_matrix(&plan, &transform).unwrap();

    assert_eq!(field.stats.total_cells, 16);
    assert!(field.stats.degenerate_basis > 0);
    assert_eq!(
        field.stats.degenerate_basis + field.stats.valid_cells,
        field.stats.total_cells
    );
}

#[test]
fn test_failing_service_is_fatal_with_context() {
    let granule = small_granule();
    let reprojector = Reprojector::new(&granule, ReprojectConfig::default()).unwrap();
    let transform = FailingTransform::new(crs::UTM_22N, crs::POLAR_NORTH);

    let err = reprojector
        .run(&transform, &InverseMappingWarp::default())
        .unwrap_err();
    match err {
        ReprojectError::Transform {
            operation,
            source_crs,
            target_crs,
            ..
        } => {
            assert_eq!(operation, "forward");
            assert_eq!(source_crs, crs::UTM_22N);
            assert_eq!(target_crs, crs::POLAR_NORTH);
        }
        other => panic!("expected transform error, got {other:?}"),
    }
}

#[test]
fn test_projected_components_and_fill_values() {
    let width = SMALL_4X4.nx;
    let vx = with_fill_cells(create_test_grid(width, 4), width, &[(0, 0)], NODATA);
    let vy = create_test_grid(width, 4);
    let granule = VelocityGranule::new(SMALL_4X4.x(), SMALL_4X4.y(), crs::UTM_22N, vx, vy)
        .with_projected_velocity(vec![3.0; 16], vec![4.0; 16]);

    let config = ReprojectConfig {
        interpolation: InterpolationMethod::Nearest,
        ..Default::default()
    };
    let reprojector = Reprojector::new(&granule, config).unwrap();
    let output = reprojector
        .run(&IdentityTransform::new(crs::UTM_22N), &InverseMappingWarp::new(false))
        .unwrap();

    let out = &output.granule;
    assert_eq!(out.vx[0], NODATA);
    assert_eq!(out.vy[0], NODATA);
    assert_eq!(out.v.as_ref().unwrap()[0], NODATA);
    assert_relative_eq!(out.vx[5], 1001.0, epsilon = 1e-2);

    let vp = out.vp.as_ref().unwrap();
    assert!(vp.iter().all(|&v| (v - 5.0).abs() < 1e-4));
    assert_eq!(out.vxp.as_ref().unwrap().len(), 16);
}

#[test]
fn test_parallel_matches_sequential() {
    let granule = small_granule();
    let transform = AffineTransform::rotation(crs::UTM_22N, crs::POLAR_NORTH, -17.0);

    let par = Reprojector::new(&granule, ReprojectConfig::default())
        .unwrap()
        .run(&transform, &InverseMappingWarp::new(true))
        .unwrap();
    let seq = Reprojector::new(&granule, sequential())
        .unwrap()
        .run(&transform, &InverseMappingWarp::new(false))
        .unwrap();

    assert_eq!(par.granule, seq.granule);
    assert_eq!(par.transforms, seq.transforms);
}

#[test]
fn test_output_json_roundtrip() {
    let granule = small_granule();
    let reprojector = Reprojector::new(&granule, ReprojectConfig::default()).unwrap();
    let transform = IdentityTransform::between(crs::UTM_22N, crs::POLAR_NORTH);
    let output = reprojector
        .run(&transform, &InverseMappingWarp::default())
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reprojected.json");
    output.granule.save_json(&path).unwrap();

    let loaded = VelocityGranule::load_json(&path).unwrap();
    assert_eq!(loaded, output.granule);
    assert_eq!(loaded.epsg, transform.target_crs());
}
