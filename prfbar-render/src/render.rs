use std::time::{Duration, Instant};

use prfbar_core::{Frame, FrameLibrary, LibraryError, OrientationSchedule, ResolvedParams};
use rayon::prelude::*;

use crate::geometry::{BlockGeometry, Grid};

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("render threads must be >= 1 when set")]
    ZeroThreads,

    #[error("failed to build render thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Library(#[from] LibraryError),
}

#[derive(Debug, Clone, Default)]
pub struct RenderOpts {
    /// Worker threads; `None` uses rayon's default.
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct RenderStats {
    pub geometry: Duration,
    pub frames: Duration,
    pub total: Duration,
    pub frame_count: usize,
}

/// Renders the unique half-cycle of the bar stimulus into a [`FrameLibrary`].
pub struct CheckerboardRenderer<'a> {
    resolved: &'a ResolvedParams,
    grid: Grid,
    schedule: OrientationSchedule,
}

impl<'a> CheckerboardRenderer<'a> {
    pub fn new(resolved: &'a ResolvedParams) -> Self {
        let derived = &resolved.derived;
        Self {
            resolved,
            grid: Grid::new(derived.outer_radius, derived.frame_side),
            schedule: OrientationSchedule::new(derived.steps_per_sweep),
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn schedule(&self) -> &OrientationSchedule {
        &self.schedule
    }

    pub fn block_geometry(&self, block: usize, angle: f64) -> BlockGeometry {
        BlockGeometry::new(&self.grid, block, angle, self.resolved)
    }

    pub fn blank_frame(&self) -> Frame {
        let side = self.grid.side();
        Frame::filled(side, side, self.resolved.params.background_intensity)
    }

    /// Render every orientation block, bar positions in parallel, then seal
    /// the library with the blank frame.
    #[tracing::instrument(skip_all, fields(side = self.grid.side(), threads = ?opts.threads))]
    pub fn render_library(&self, opts: &RenderOpts) -> RenderResult<(FrameLibrary, RenderStats)> {
        let start = Instant::now();
        let pool = build_thread_pool(opts.threads)?;
        let side = self.grid.side();
        let background = self.resolved.params.background_intensity;
        let steps = self.schedule.steps_per_block();

        let mut library = FrameLibrary::new(self.resolved.library_layout(), side, side);
        let mut stats = RenderStats::default();

        for (block, angle) in self.schedule.rendered_blocks() {
            let t = Instant::now();
            let geometry = self.block_geometry(block, angle);
            stats.geometry += t.elapsed();

            let t = Instant::now();
            let rendered: Vec<Vec<Frame>> = pool.install(|| {
                (0..steps)
                    .into_par_iter()
                    .map(|step| geometry.render_step(&self.grid, step, background))
                    .collect()
            });
            stats.frames += t.elapsed();

            for frame in rendered.into_iter().flatten() {
                library.push(frame)?;
            }
            tracing::debug!(
                block,
                angle_deg = angle.to_degrees(),
                frames = library.len(),
                "rendered orientation block"
            );
        }

        let blank = library.seal(self.blank_frame())?;
        stats.frame_count = library.len();
        stats.total = start.elapsed();
        tracing::info!(
            frames = library.len(),
            blank,
            elapsed_ms = stats.total.as_secs_f64() * 1e3,
            "frame library complete"
        );
        Ok((library, stats))
    }
}

pub fn render_library(
    resolved: &ResolvedParams,
    opts: &RenderOpts,
) -> RenderResult<(FrameLibrary, RenderStats)> {
    CheckerboardRenderer::new(resolved).render_library(opts)
}

fn build_thread_pool(threads: Option<usize>) -> RenderResult<rayon::ThreadPool> {
    if threads == Some(0) {
        return Err(RenderError::ZeroThreads);
    }
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    Ok(builder.build()?)
}
