//! End-to-end checks of both pipelines against the analytic quadric.
//!
//! None of these tests open a window or touch the GPU.

use isomatch::{build_presenter, AnalyticPipeline, DemoConfig, DiscretizedPipeline};
use isomatch_core::compare::{field_deviation, hausdorff_distance};
use isomatch_core::{AxisOrder, IsoMesh, LatticeSpec, Quadric, Registration, Vec3};
use proptest::prelude::*;

/// An ellipsoid-like quadric whose 0.1 level set sits well inside the lattice.
const COEFFICIENTS: [f32; 10] = [0.5, 1.0, 0.2, 0.0, 0.1, 0.0, 0.0, 0.2, 0.0, 0.0];

fn config() -> DemoConfig {
    DemoConfig {
        coefficients: Some(COEFFICIENTS),
        contour_value: 0.1,
        ..DemoConfig::default()
    }
}

fn quadric() -> Quadric {
    Quadric::new(COEFFICIENTS)
}

fn discretized(config: &DemoConfig) -> IsoMesh {
    DiscretizedPipeline::new(quadric(), config).run().expect("discretized pipeline")
}

#[test]
fn test_both_pipelines_produce_closed_surfaces() {
    let config = config();
    let analytic = AnalyticPipeline::new(quadric(), &config).run().unwrap();
    let discretized = discretized(&config);

    for (name, mesh) in [("analytic", &analytic), ("discretized", &discretized)] {
        assert!(!mesh.is_empty(), "{name} surface is empty");
        assert!(mesh.is_closed(), "{name} surface has {} open edges", mesh.boundary_edge_count());
    }
}

#[test]
fn test_faithful_reconstruction_matches_analytic_surface() {
    let config = config();
    let analytic = AnalyticPipeline::new(quadric(), &config).run().unwrap();
    let discretized = discretized(&config);

    let stats = field_deviation(&discretized, &quadric(), 0.1);
    assert!(stats.mean < 0.01, "{stats:?}");
    let hausdorff = hausdorff_distance(&analytic, &discretized).unwrap();
    assert!(hausdorff < 0.1, "{hausdorff}");
}

#[test]
fn test_reconstruction_converges_as_step_shrinks() {
    let coarse = DemoConfig {
        lattice: LatticeSpec::uniform(-1.0, 1.0, 0.4, 0.1),
        ..config()
    };
    let fine = DemoConfig {
        lattice: LatticeSpec::uniform(-1.0, 1.0, 0.05, 0.1),
        ..config()
    };
    let analytic = AnalyticPipeline::new(quadric(), &config()).run().unwrap();
    let coarse_mesh = discretized(&coarse);
    let fine_mesh = discretized(&fine);

    let coarse_dev = field_deviation(&coarse_mesh, &quadric(), 0.1);
    let fine_dev = field_deviation(&fine_mesh, &quadric(), 0.1);
    assert!(
        coarse_dev.mean > 2.0 * fine_dev.mean,
        "coarse {coarse_dev:?} vs fine {fine_dev:?}"
    );

    let coarse_h = hausdorff_distance(&analytic, &coarse_mesh).unwrap();
    let fine_h = hausdorff_distance(&analytic, &fine_mesh).unwrap();
    assert!(coarse_h > fine_h, "coarse {coarse_h} vs fine {fine_h}");
}

#[test]
fn test_swapped_axes_distort_the_surface() {
    let config = config();
    let faithful = field_deviation(&discretized(&config), &quadric(), 0.1);
    let swapped_mesh = DiscretizedPipeline::new(quadric(), &config)
        .with_axis_order(AxisOrder::Yxz)
        .run()
        .unwrap();
    let swapped = field_deviation(&swapped_mesh, &quadric(), 0.1);

    assert!(!swapped_mesh.is_empty());
    assert!(swapped.mean > 0.02, "{swapped:?}");
    assert!(swapped.mean > 10.0 * faithful.mean, "{swapped:?} vs {faithful:?}");
}

#[test]
fn test_nominal_registration_distorts_the_surface() {
    let config = config();
    let exact = field_deviation(&discretized(&config), &quadric(), 0.1);
    let nominal_mesh = DiscretizedPipeline::new(quadric(), &config)
        .with_registration(Registration::Nominal)
        .run()
        .unwrap();
    let nominal = field_deviation(&nominal_mesh, &quadric(), 0.1);

    assert!(nominal.mean > 5.0 * exact.mean, "{nominal:?} vs {exact:?}");
}

fn registration() -> impl Strategy<Value = Registration> {
    prop_oneof![Just(Registration::Exact), Just(Registration::Nominal)]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn buffer_bounds_follow_origin_and_spacing(
        lo in prop::array::uniform3(-2.0_f32..0.0),
        width in prop::array::uniform3(0.5_f32..2.0),
        step in 0.05_f32..0.3,
        offset in 0.0_f32..0.2,
        registration in registration(),
    ) {
        let lattice = LatticeSpec {
            ranges: [
                [lo[0], lo[0] + width[0]],
                [lo[1], lo[1] + width[1]],
                [lo[2], lo[2] + width[2]],
            ],
            step,
            offset,
        };
        let config = DemoConfig { lattice, ..config() };
        let volume = DiscretizedPipeline::new(quadric(), &config)
            .with_registration(registration)
            .build_volume()
            .unwrap();

        let dims = volume.dimensions();
        prop_assert_eq!(dims, lattice.dimensions());
        let cells = Vec3::new(
            (dims[0] - 1) as f32,
            (dims[1] - 1) as f32,
            (dims[2] - 1) as f32,
        );
        let (min, max) = volume.bounds();
        prop_assert_eq!(min, volume.origin());
        prop_assert_eq!(max, volume.origin() + volume.spacing() * cells);

        match registration {
            Registration::Exact => {
                prop_assert!(min.abs_diff_eq(lattice.min_corner(), 1e-6));
                prop_assert!(max.abs_diff_eq(lattice.max_corner(), 1e-5));
            }
            Registration::Nominal => {
                let nominal_max = Vec3::from(lo) + Vec3::from(width);
                prop_assert_eq!(min, Vec3::from(lo));
                prop_assert!(max.abs_diff_eq(nominal_max, 1e-5), "{} vs {}", max, nominal_max);
            }
        }
    }
}

#[test]
fn test_presenter_shares_the_left_camera() {
    let presenter = build_presenter(&config()).unwrap();
    assert!(presenter.right().shares_camera_with(presenter.left()));

    presenter.left().active_camera().borrow_mut().azimuth(25.0);
    presenter.left().active_camera().borrow_mut().dolly(1.3);
    let left = presenter.left().active_camera().borrow().clone();
    assert_eq!(*presenter.right().active_camera().borrow(), left);

    let (lo, hi) = presenter.visible_bounds().unwrap();
    assert!(lo.cmple(Vec3::ZERO).all() && hi.cmpge(Vec3::ONE).all());
}
