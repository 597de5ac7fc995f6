use serde::{Deserialize, Serialize};

/// Presentation time of every frame in a sequence, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline {
    timestamps: Vec<f64>,
    total_duration: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineStats {
    pub frame_interval: f64,
    pub jitter: f64,
    pub min_interval: f64,
    pub max_interval: f64,
    pub frame_rate: f64,
}

impl Timeline {
    /// `len` evenly spaced timestamps covering `[0, len / motion_steps * sampling_interval)`.
    pub fn new(len: usize, motion_steps: u32, sampling_interval: f64) -> Self {
        if len == 0 || motion_steps == 0 {
            return Self {
                timestamps: Vec::new(),
                total_duration: 0.0,
            };
        }
        let total = len as f64 / motion_steps as f64 * sampling_interval;
        let timestamps = (0..len).map(|i| i as f64 * total / len as f64).collect();
        Self {
            timestamps,
            total_duration: total,
        }
    }

    /// Rebuild a timeline read back from storage.
    pub fn from_parts(timestamps: Vec<f64>, total_duration: f64) -> Self {
        Self {
            timestamps,
            total_duration,
        }
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Spacing between consecutive frames; 0 for fewer than two frames.
    pub fn frame_interval(&self) -> f64 {
        match self.timestamps.as_slice() {
            [first, second, ..] => second - first,
            _ => 0.0,
        }
    }

    /// End of the covered interval, one frame interval past the last timestamp.
    pub fn total_duration(&self) -> f64 {
        self.total_duration
    }

    pub fn is_strictly_increasing(&self) -> bool {
        self.timestamps.windows(2).all(|w| w[1] > w[0])
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.timestamps
    }

    pub fn stats(&self) -> TimelineStats {
        let intervals: Vec<f64> = self.timestamps.windows(2).map(|w| w[1] - w[0]).collect();
        if intervals.is_empty() {
            return TimelineStats {
                frame_interval: 0.0,
                jitter: 0.0,
                min_interval: 0.0,
                max_interval: 0.0,
                frame_rate: 0.0,
            };
        }
        let avg = intervals.iter().sum::<f64>() / intervals.len() as f64;
        let var = intervals.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / intervals.len() as f64;
        let min = intervals.iter().copied().fold(f64::INFINITY, f64::min);
        let max = intervals.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        TimelineStats {
            frame_interval: avg,
            jitter: var.sqrt(),
            min_interval: min,
            max_interval: max,
            frame_rate: if avg > 0.0 { 1.0 / avg } else { 0.0 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scan_timeline() {
        let t = Timeline::new(3360, 8, 0.8);
        assert_eq!(t.len(), 3360);
        assert_eq!(t.timestamps()[0], 0.0);
        assert!(t.is_strictly_increasing());
        assert!((t.frame_interval() - 0.1).abs() < 1e-12);
        assert!((t.total_duration() - 336.0).abs() < 1e-9);
        assert!(*t.timestamps().last().unwrap() < 336.0);
    }

    #[test]
    fn spacing_is_uniform() {
        let stats = Timeline::new(1000, 4, 2.0).stats();
        assert!((stats.frame_interval - 0.5).abs() < 1e-12);
        assert!(stats.jitter < 1e-9);
        assert!((stats.max_interval - stats.min_interval).abs() < 1e-9);
        assert!((stats.frame_rate - 2.0).abs() < 1e-9);
    }

    #[test]
    fn timestamp_formula() {
        let t = Timeline::new(7, 2, 1.5);
        let total = 7.0 / 2.0 * 1.5;
        for (i, &ts) in t.timestamps().iter().enumerate() {
            assert_eq!(ts, i as f64 * total / 7.0);
        }
    }

    #[test]
    fn empty_and_single() {
        let empty = Timeline::new(0, 8, 0.8);
        assert!(empty.is_empty());
        assert_eq!(empty.total_duration(), 0.0);
        assert_eq!(empty.stats().frame_rate, 0.0);

        let one = Timeline::new(1, 8, 0.8);
        assert_eq!(one.timestamps(), &[0.0]);
        assert!(one.is_strictly_increasing());
        assert!((one.total_duration() - 0.1).abs() < 1e-12);
    }
}
