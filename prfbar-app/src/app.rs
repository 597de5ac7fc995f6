use std::fmt;
use std::path::Path;

use anyhow::{Context as _, Result};
use prfbar_core::{ExperimentParams, FrameLibrary, ParamOverrides, ResolvedParams, resolve};
use prfbar_experiment::{Sequence, assemble};
use prfbar_render::{RenderOpts, render_library};
use prfbar_timing::Timeline;

/// The four artifacts handed to playback: frames, order, timing and the
/// parameters that produced them.
#[derive(Debug, Clone)]
pub struct Stimulus {
    pub resolved: ResolvedParams,
    pub library: FrameLibrary,
    pub sequence: Sequence,
    pub timeline: Timeline,
}

impl Stimulus {
    pub fn summary(&self) -> Summary {
        let (width, height) = self.library.dimensions();
        Summary {
            frames: self.library.len(),
            width,
            height,
            blank: self.library.blank_index().unwrap_or_default(),
            sequence_len: self.sequence.len(),
            cycles: self.resolved.derived.num_cycles,
            buffer_frames: self.resolved.derived.buffer_frames,
            duration: self.timeline.total_duration(),
            frame_interval: self.timeline.frame_interval(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub frames: usize,
    pub width: u32,
    pub height: u32,
    pub blank: usize,
    pub sequence_len: usize,
    pub cycles: usize,
    pub buffer_frames: usize,
    pub duration: f64,
    pub frame_interval: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "frames    {} ({}x{}, blank #{})",
            self.frames, self.width, self.height, self.blank
        )?;
        writeln!(
            f,
            "sequence  {} frames, {} cycles + {} buffer",
            self.sequence_len, self.cycles, self.buffer_frames
        )?;
        write!(
            f,
            "duration  {:.3} s at {:.4} s/frame",
            self.duration, self.frame_interval
        )
    }
}

/// Read a partial parameter record from a JSON file.
pub fn load_overrides(path: &Path) -> Result<ParamOverrides> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse config '{}'", path.display()))
}

pub struct App {
    resolved: ResolvedParams,
    opts: RenderOpts,
}

impl App {
    pub fn new(overrides: ParamOverrides, opts: RenderOpts) -> Result<Self> {
        let params = overrides.apply(ExperimentParams::default());
        let resolved = resolve(params)?;
        Ok(Self { resolved, opts })
    }

    /// Defaults, then the config file, then `cli` on top.
    pub fn from_config(
        config: Option<&Path>,
        cli: ParamOverrides,
        opts: RenderOpts,
    ) -> Result<Self> {
        let file = match config {
            Some(path) => load_overrides(path)?,
            None => ParamOverrides::default(),
        };
        Self::new(file.merge(cli), opts)
    }

    pub fn resolved(&self) -> &ResolvedParams {
        &self.resolved
    }

    /// Render, assemble and time the whole scan.
    #[tracing::instrument(skip_all)]
    pub fn run(&self) -> Result<Stimulus> {
        let resolved = &self.resolved;
        tracing::info!(
            side = resolved.derived.frame_side,
            library = resolved.library_size(),
            sequence = resolved.sequence_len(),
            "generating stimulus"
        );

        let (library, stats) = render_library(resolved, &self.opts)?;
        tracing::info!(
            geometry_ms = stats.geometry.as_secs_f64() * 1e3,
            frames_ms = stats.frames.as_secs_f64() * 1e3,
            "render stats"
        );
        let blank = library
            .blank_index()
            .context("frame library was not sealed with a blank frame")?;

        let sequence = assemble(resolved, blank);
        let timeline = Timeline::new(
            sequence.len(),
            resolved.params.motion_steps,
            resolved.params.sampling_interval,
        );

        Ok(Stimulus {
            resolved: resolved.clone(),
            library,
            sequence,
            timeline,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prfbar_core::Resolution;

    fn small() -> ParamOverrides {
        ParamOverrides {
            resolution: Some(Resolution {
                width: 40,
                height: 32,
            }),
            motion_steps: Some(2),
            sweep_duration: Some(4.0),
            sampling_interval: Some(1.0),
            scan_duration: Some(90.0),
            ..Default::default()
        }
    }

    #[test]
    fn run_produces_consistent_artifacts() {
        let app = App::new(small(), RenderOpts::default()).unwrap();
        let stim = app.run().unwrap();
        assert_eq!(stim.library.len(), 4 * 4 * 2 + 1);
        assert_eq!(stim.sequence.len(), stim.timeline.len());
        assert_eq!(stim.sequence.len(), app.resolved().sequence_len());
        assert!(stim.timeline.is_strictly_increasing());
        assert!(
            stim.sequence
                .as_slice()
                .iter()
                .all(|&i| i < stim.library.len())
        );
        // 2 cycles of 40 s, 10 s buffer
        let summary = stim.summary();
        assert_eq!(summary.cycles, 2);
        assert_eq!(summary.buffer_frames, 20);
        assert!((summary.duration - 90.0).abs() < 1e-9);
    }

    #[test]
    fn bad_config_fails_before_rendering() {
        let overrides = ParamOverrides {
            sampling_interval: Some(0.0),
            ..small()
        };
        let err = App::new(overrides, RenderOpts::default()).err().unwrap();
        assert!(err.to_string().contains("sampling_interval"));
    }

    #[test]
    fn summary_renders_three_lines() {
        let stim = App::new(small(), RenderOpts::default())
            .unwrap()
            .run()
            .unwrap();
        let text = stim.summary().to_string();
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("blank #32"));
    }
}
