//! isomatch: an analytic quadric iso-surface next to its volume-resampled
//! reconstruction.
//!
//! The same quadric is contoured twice. The left view samples the closed-form
//! field; the right view first evaluates it on an explicit lattice, packs the
//! values into a volume buffer and samples a trilinear reconstruction of that
//! buffer. Both views share one camera, so any disagreement between the two
//! surfaces (interpolation error, a misregistered buffer, transposed packing)
//! shows up side by side.
//!
//! ```no_run
//! use isomatch::DemoConfig;
//!
//! fn main() -> isomatch::Result<()> {
//!     isomatch::run(&DemoConfig::default())
//! }
//! ```

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]

mod error;
pub mod pipeline;
pub mod postprocess;
pub mod presenter;

pub use error::{AppError, Result};
pub use isomatch_core::DemoConfig;
pub use pipeline::{AnalyticPipeline, DiscretizedPipeline};
pub use postprocess::SurfacePostProcessor;
pub use presenter::{DualViewportPresenter, PresenterOptions};

use isomatch_core::compare::{field_deviation, hausdorff_distance};
use isomatch_core::{IsoMesh, Quadric};
use isomatch_render::{Scene, Viewport};

/// Runs both pipelines and lays the results out for presentation.
pub fn build_presenter(config: &DemoConfig) -> Result<DualViewportPresenter> {
    config.validate()?;
    let (quadric, seed) = config.quadric();
    match seed {
        Some(seed) => log::info!("quadric coefficients {:?} (seed {seed})", quadric.coefficients()),
        None => log::info!("quadric coefficients {:?}", quadric.coefficients()),
    }
    log::info!(
        "lattice {:?} ({} points), contour value {}",
        config.lattice.dimensions(),
        config.lattice.num_points(),
        config.contour_value
    );

    let analytic = AnalyticPipeline::new(quadric, config).run()?;
    let discretized_pipeline = DiscretizedPipeline::new(quadric, config);
    let discretized = discretized_pipeline.run()?;
    log_mismatch(&quadric, config.contour_value, &analytic, &discretized, discretized_pipeline.is_faithful());

    let analytic = SurfacePostProcessor::new(config.analytic_material())
        .with_normals(config.normals_options())
        .actor("analytic", analytic);
    let discretized = SurfacePostProcessor::new(config.discretized_material())
        .with_normals(config.normals_options())
        .actor("discretized", discretized);

    let mut left = Scene::new(Viewport::FULL);
    left.add_surface(analytic);
    let mut right = Scene::new(Viewport::FULL);
    right.add_surface(discretized);

    Ok(DualViewportPresenter::new(left, right, PresenterOptions::from(config)))
}

fn log_mismatch(quadric: &Quadric, level: f32, analytic: &IsoMesh, discretized: &IsoMesh, faithful: bool) {
    let deviation = field_deviation(discretized, quadric, level);
    let Some(hausdorff) = hausdorff_distance(analytic, discretized) else {
        log::warn!("cannot compare surfaces: at least one of them is empty");
        return;
    };
    log::info!(
        "discretized surface is {:.4} from the quadric on average ({:.4} max), Hausdorff distance {hausdorff:.4}{}",
        deviation.mean,
        deviation.max,
        if faithful { "" } else { " (unfaithful buffer)" }
    );
}

/// Builds both surfaces and shows them until the window is closed.
pub fn run(config: &DemoConfig) -> Result<()> {
    build_presenter(config)?.run()
}
