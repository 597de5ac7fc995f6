//! Parameter resolution.
//!
//! [`resolve`] validates an [`ExperimentParams`] record and derives every
//! quantity the renderer, the sequence assembler and the timing calculator
//! need. It is the only place configuration errors are raised.

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::library::LibraryLayout;
use crate::orientation::RENDERED_BLOCKS;
use crate::params::ExperimentParams;
use crate::segment::CYCLE_TEMPLATE;

/// Distance from the nearest integer under which a real sample count is
/// treated as that integer.
const SAMPLE_TOLERANCE: f64 = 1e-6;

/// Convert a real-valued sample count to an integer: nearest integer when
/// within [`SAMPLE_TOLERANCE`], floor otherwise. Negative input yields 0.
pub fn whole_samples(x: f64) -> usize {
    if !x.is_finite() || x <= 0.0 {
        return 0;
    }
    let nearest = x.round();
    if (x - nearest).abs() < SAMPLE_TOLERANCE {
        nearest as usize
    } else {
        x.floor() as usize
    }
}

/// Quantities derived from the parameters. Lengths are in frames unless noted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedParams {
    /// Bar positions per sweep (one per sampling interval).
    pub steps_per_sweep: usize,
    /// Bar positions rendered for the unique half of a cycle.
    pub steps_per_half_cycle: usize,
    /// Frames in one sweep (`steps_per_sweep * motion_steps`).
    pub sweep_frames: usize,
    pub outer_radius: f64,
    pub ring_width: f64,
    /// Side of the square frames, after cropping to the screen height.
    pub frame_side: u32,
    pub num_sweep_segments: usize,
    pub num_blank_segments: usize,
    /// Seconds.
    pub cycle_duration: f64,
    pub num_cycles: usize,
    /// Seconds of scan left after the last full cycle.
    pub buffer_time: f64,
    pub buffer_frames: usize,
}

/// Validated parameters plus derived quantities. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedParams {
    /// Parameters as used; `intensity_range` already reflects `contrast`.
    pub params: ExperimentParams,
    pub derived: DerivedParams,
}

impl ResolvedParams {
    pub fn library_layout(&self) -> LibraryLayout {
        LibraryLayout {
            blocks: RENDERED_BLOCKS,
            steps_per_block: self.derived.steps_per_sweep,
            motion_steps: self.params.motion_steps as usize,
        }
    }

    /// Rendered frames plus the blank.
    pub fn library_size(&self) -> usize {
        self.derived.steps_per_half_cycle * self.params.motion_steps as usize + 1
    }

    pub fn cycle_frames(&self) -> usize {
        CYCLE_TEMPLATE
            .iter()
            .map(|s| s.frame_count(self.derived.sweep_frames))
            .sum()
    }

    pub fn sequence_len(&self) -> usize {
        self.cycle_frames() * self.derived.num_cycles + self.derived.buffer_frames
    }
}

fn positive(field: &'static str, value: f64) -> ConfigResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::non_positive(field, value))
    }
}

fn nonzero(field: &'static str, value: u32) -> ConfigResult<u32> {
    if value == 0 {
        Err(ConfigError::non_positive(field, value))
    } else {
        Ok(value)
    }
}

#[tracing::instrument(level = "debug", skip(params))]
pub fn resolve(params: ExperimentParams) -> ConfigResult<ResolvedParams> {
    let width = nonzero("resolution.width", params.resolution.width)?;
    let height = nonzero("resolution.height", params.resolution.height)?;
    let sweep_duration = positive("sweep_duration", params.sweep_duration)?;
    let sampling_interval = positive("sampling_interval", params.sampling_interval)?;
    let scan_duration = positive("scan_duration", params.scan_duration)?;
    let prop_screen = positive("prop_screen", params.prop_screen)?;
    let ring_size = positive("ring_size", params.ring_size)?;
    let motion_steps = nonzero("motion_steps", params.motion_steps)? as usize;
    nonzero("num_sub_rings", params.num_sub_rings)?;

    let range = params.intensity_range;
    if range.min > range.max {
        return Err(ConfigError::out_of_range(
            "intensity_range",
            range.min,
            "[min, max] with min <= max",
        ));
    }
    if let Some(c) = params.contrast {
        if !(0.0..=1.0).contains(&c) {
            return Err(ConfigError::out_of_range("contrast", c, "[0, 1]"));
        }
    }

    let ratio = sweep_duration / sampling_interval;
    let steps_per_sweep = ratio.round();
    if steps_per_sweep < 1.0 || (ratio - steps_per_sweep).abs() > SAMPLE_TOLERANCE {
        return Err(ConfigError::NotWholeMultiple {
            field: "sweep_duration",
            value: sweep_duration,
            of: "sampling_interval",
        });
    }
    let steps_per_sweep = steps_per_sweep as usize;

    let sweep_frames = steps_per_sweep * motion_steps;
    if sweep_frames % 2 != 0 {
        return Err(ConfigError::OddSweepFrames {
            frames: sweep_frames,
        });
    }

    let outer_radius = 0.5 * prop_screen * height as f64;
    let ring_width = outer_radius * ring_size;
    let diameter = (2.0 * outer_radius).round() as u32;
    let frame_side = diameter.min(height);
    if frame_side == 0 || frame_side > width {
        return Err(ConfigError::Resolution {
            width,
            height,
            diameter,
        });
    }

    let num_blank_segments = CYCLE_TEMPLATE.iter().filter(|s| s.is_blank()).count();
    let num_sweep_segments = CYCLE_TEMPLATE.len() - num_blank_segments;
    let steps_per_half_cycle = num_sweep_segments / 2 * steps_per_sweep;

    let cycle_duration = num_sweep_segments as f64 * sweep_duration
        + num_blank_segments as f64 * sweep_duration / 2.0;
    let num_cycles = whole_samples(scan_duration / cycle_duration);
    let mut buffer_time = scan_duration - num_cycles as f64 * cycle_duration;
    if buffer_time.abs() < SAMPLE_TOLERANCE {
        buffer_time = 0.0;
    }
    let buffer_frames = whole_samples(motion_steps as f64 * buffer_time / sampling_interval);

    let mut resolved_params = params;
    if let Some(c) = resolved_params.contrast {
        resolved_params.intensity_range = range.with_contrast(c);
    }

    let derived = DerivedParams {
        steps_per_sweep,
        steps_per_half_cycle,
        sweep_frames,
        outer_radius,
        ring_width,
        frame_side,
        num_sweep_segments,
        num_blank_segments,
        cycle_duration,
        num_cycles,
        buffer_time: buffer_time.max(0.0),
        buffer_frames,
    };
    tracing::debug!(?derived, "resolved experiment parameters");

    Ok(ResolvedParams {
        params: resolved_params,
        derived,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{IntensityRange, Resolution};

    #[test]
    fn default_scenario() {
        let r = resolve(ExperimentParams::default()).unwrap();
        let d = &r.derived;
        assert_eq!(d.steps_per_sweep, 20);
        assert_eq!(d.steps_per_half_cycle, 80);
        assert_eq!(d.sweep_frames, 160);
        assert_eq!(d.outer_radius, 540.0);
        assert_eq!(d.ring_width, 135.0);
        assert_eq!(d.frame_side, 1080);
        assert_eq!(d.num_sweep_segments, 8);
        assert_eq!(d.num_blank_segments, 4);
        assert_eq!(d.cycle_duration, 160.0);
        assert_eq!(d.num_cycles, 2);
        assert!((d.buffer_time - 16.0).abs() < 1e-9);
        assert_eq!(d.buffer_frames, 160);
        assert_eq!(r.library_size(), 80 * 8 + 1);
        assert_eq!(r.library_layout().rendered_frames() + 1, r.library_size());
        assert_eq!(r.sequence_len(), 3360);
    }

    #[test]
    fn exact_cycles_leave_no_buffer() {
        let r = resolve(ExperimentParams {
            scan_duration: 320.0,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(r.derived.num_cycles, 2);
        assert_eq!(r.derived.buffer_time, 0.0);
        assert_eq!(r.derived.buffer_frames, 0);
    }

    #[test]
    fn contrast_rewrites_intensity_range() {
        let r = resolve(ExperimentParams {
            contrast: Some(0.5),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(
            r.params.intensity_range,
            IntensityRange { min: 64, max: 191 }
        );
        assert_eq!(r.params.contrast, Some(0.5));
    }

    #[test]
    fn zero_sampling_interval_names_the_field() {
        let err = resolve(ExperimentParams {
            sampling_interval: 0.0,
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.field(), Some("sampling_interval"));
    }

    #[test]
    fn non_positive_inputs_are_rejected() {
        let cases = [
            ExperimentParams {
                sweep_duration: -1.0,
                ..Default::default()
            },
            ExperimentParams {
                motion_steps: 0,
                ..Default::default()
            },
            ExperimentParams {
                resolution: Resolution {
                    width: 0,
                    height: 1080,
                },
                ..Default::default()
            },
            ExperimentParams {
                scan_duration: f64::NAN,
                ..Default::default()
            },
        ];
        for params in cases {
            assert!(matches!(
                resolve(params),
                Err(ConfigError::NonPositive { .. })
            ));
        }
    }

    #[test]
    fn contrast_outside_unit_interval() {
        let err = resolve(ExperimentParams {
            contrast: Some(1.5),
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err.field(), Some("contrast"));
    }

    #[test]
    fn fractional_steps_per_sweep() {
        let err = resolve(ExperimentParams {
            sweep_duration: 15.0,
            sampling_interval: 2.0,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::NotWholeMultiple { .. }));
    }

    #[test]
    fn odd_sweep_frame_count() {
        let err = resolve(ExperimentParams {
            sweep_duration: 3.0,
            sampling_interval: 1.0,
            motion_steps: 3,
            ..Default::default()
        })
        .unwrap_err();
        assert_eq!(err, ConfigError::OddSweepFrames { frames: 9 });
    }

    #[test]
    fn oversized_stimulus_is_cropped_to_height() {
        let r = resolve(ExperimentParams {
            prop_screen: 1.5,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(r.derived.frame_side, 1080);
        assert_eq!(r.derived.outer_radius, 810.0);
    }

    #[test]
    fn portrait_screen_cannot_hold_stimulus() {
        let err = resolve(ExperimentParams {
            resolution: Resolution {
                width: 600,
                height: 800,
            },
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ConfigError::Resolution { diameter: 800, .. }));
    }

    #[test]
    fn whole_samples_policy() {
        assert_eq!(whole_samples(20.0), 20);
        assert_eq!(whole_samples(19.999_999_999), 20);
        assert_eq!(whole_samples(2.1), 2);
        assert_eq!(whole_samples(2.9), 2);
        assert_eq!(whole_samples(-3.0), 0);
    }
}
