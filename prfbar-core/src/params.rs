use serde::{Deserialize, Serialize};

/// Screen size in pixels. Serialized as `[width, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl From<[u32; 2]> for Resolution {
    fn from([width, height]: [u32; 2]) -> Self {
        Self { width, height }
    }
}

impl From<Resolution> for [u32; 2] {
    fn from(r: Resolution) -> Self {
        [r.width, r.height]
    }
}

/// The two ends of the checkerboard's intensity scale. Serialized as `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u8; 2]", into = "[u8; 2]")]
pub struct IntensityRange {
    pub min: u8,
    pub max: u8,
}

impl From<[u8; 2]> for IntensityRange {
    fn from([min, max]: [u8; 2]) -> Self {
        Self { min, max }
    }
}

impl From<IntensityRange> for [u8; 2] {
    fn from(r: IntensityRange) -> Self {
        [r.min, r.max]
    }
}

impl IntensityRange {
    pub fn span(&self) -> u8 {
        self.max.saturating_sub(self.min)
    }

    pub fn midpoint(&self) -> f64 {
        (self.min as f64 + self.max as f64) / 2.0
    }

    /// Band `round((1 - contrast) * mid) ..= round((1 + contrast) * mid)`
    /// around the midpoint of this range, clamped to 8 bits.
    ///
    /// `contrast = 0` collapses both ends onto the rounded midpoint.
    pub fn with_contrast(&self, contrast: f64) -> Self {
        let mid = self.midpoint();
        let lo = ((1.0 - contrast) * mid).round().clamp(0.0, 255.0);
        let hi = ((1.0 + contrast) * mid).round().clamp(0.0, 255.0);
        Self {
            min: lo as u8,
            max: hi as u8,
        }
    }
}

/// Everything the stimulus depends on. Durations are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentParams {
    pub resolution: Resolution,
    /// Fraction of the screen height spanned by the stimulus diameter.
    pub prop_screen: f64,
    /// Bar width as a fraction of the outer radius.
    pub ring_size: f64,
    /// Checker-motion phases rendered per bar position.
    pub motion_steps: u32,
    pub num_sub_rings: u32,
    pub background_intensity: u8,
    pub intensity_range: IntensityRange,
    /// Overrides `intensity_range` symmetrically around its midpoint.
    pub contrast: Option<f64>,
    pub sweep_duration: f64,
    pub scan_duration: f64,
    /// Repetition time (TR).
    pub sampling_interval: f64,
}

impl Default for ExperimentParams {
    fn default() -> Self {
        Self {
            resolution: Resolution {
                width: 1920,
                height: 1080,
            },
            prop_screen: 1.0,
            ring_size: 0.25,
            motion_steps: 8,
            num_sub_rings: 1,
            background_intensity: 128,
            intensity_range: IntensityRange { min: 0, max: 255 },
            contrast: None,
            sweep_duration: 16.0,
            scan_duration: 336.0,
            sampling_interval: 0.8,
        }
    }
}

/// A partial parameter record, as read from a config file or the command line.
/// Unset fields fall back to whatever they are applied over.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParamOverrides {
    pub resolution: Option<Resolution>,
    pub prop_screen: Option<f64>,
    pub ring_size: Option<f64>,
    pub motion_steps: Option<u32>,
    pub num_sub_rings: Option<u32>,
    pub background_intensity: Option<u8>,
    pub intensity_range: Option<IntensityRange>,
    pub contrast: Option<f64>,
    pub sweep_duration: Option<f64>,
    pub scan_duration: Option<f64>,
    pub sampling_interval: Option<f64>,
}

impl ParamOverrides {
    pub fn apply(&self, base: ExperimentParams) -> ExperimentParams {
        ExperimentParams {
            resolution: self.resolution.unwrap_or(base.resolution),
            prop_screen: self.prop_screen.unwrap_or(base.prop_screen),
            ring_size: self.ring_size.unwrap_or(base.ring_size),
            motion_steps: self.motion_steps.unwrap_or(base.motion_steps),
            num_sub_rings: self.num_sub_rings.unwrap_or(base.num_sub_rings),
            background_intensity: self
                .background_intensity
                .unwrap_or(base.background_intensity),
            intensity_range: self.intensity_range.unwrap_or(base.intensity_range),
            contrast: self.contrast.or(base.contrast),
            sweep_duration: self.sweep_duration.unwrap_or(base.sweep_duration),
            scan_duration: self.scan_duration.unwrap_or(base.scan_duration),
            sampling_interval: self.sampling_interval.unwrap_or(base.sampling_interval),
        }
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: ParamOverrides) -> ParamOverrides {
        ParamOverrides {
            resolution: other.resolution.or(self.resolution),
            prop_screen: other.prop_screen.or(self.prop_screen),
            ring_size: other.ring_size.or(self.ring_size),
            motion_steps: other.motion_steps.or(self.motion_steps),
            num_sub_rings: other.num_sub_rings.or(self.num_sub_rings),
            background_intensity: other.background_intensity.or(self.background_intensity),
            intensity_range: other.intensity_range.or(self.intensity_range),
            contrast: other.contrast.or(self.contrast),
            sweep_duration: other.sweep_duration.or(self.sweep_duration),
            scan_duration: other.scan_duration.or(self.scan_duration),
            sampling_interval: other.sampling_interval.or(self.sampling_interval),
        }
    }
}
