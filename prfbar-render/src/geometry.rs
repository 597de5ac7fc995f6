use std::f64::consts::PI;

use prfbar_core::{Frame, IntensityRange, ResolvedParams};

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![(start + end) / 2.0; n];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

/// Centered pixel coordinates of a square frame, y pointing up.
///
/// The axes span `[-outer_radius, outer_radius]` over `round(2 * outer_radius)`
/// samples; when that exceeds `side` the middle `side` samples are kept.
#[derive(Debug, Clone)]
pub struct Grid {
    side: u32,
    outer_radius: f64,
    x: Vec<f64>,
    y: Vec<f64>,
    r: Vec<f64>,
}

impl Grid {
    pub fn new(outer_radius: f64, side: u32) -> Self {
        let n = side as usize;
        let full = ((2.0 * outer_radius).round() as usize).max(n);
        let offset = (full - n) / 2;
        let axis = linspace(-outer_radius, outer_radius, full);

        let mut x = Vec::with_capacity(n * n);
        let mut y = Vec::with_capacity(n * n);
        let mut r = Vec::with_capacity(n * n);
        for row in 0..n {
            let py = -axis[row + offset];
            for col in 0..n {
                let px = axis[col + offset];
                x.push(px);
                y.push(py);
                r.push(px.hypot(py));
            }
        }
        Self {
            side,
            outer_radius,
            x,
            y,
            r,
        }
    }

    pub fn side(&self) -> u32 {
        self.side
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    /// Distance of every pixel from the center, row-major.
    pub fn radius(&self) -> &[f64] {
        &self.r
    }

    pub fn in_aperture(&self, i: usize) -> bool {
        self.r[i] < self.outer_radius
    }

    fn rotated(&self, angle: f64) -> (Vec<f64>, Vec<f64>) {
        let (sin, cos) = angle.sin_cos();
        self.x
            .iter()
            .zip(&self.y)
            .map(|(&x, &y)| (x * cos - y * sin, x * sin + y * cos))
            .unzip()
    }
}

/// +1 where `cos(phase)` is non-negative, -1 elsewhere. Zero crossings round
/// up, so no pixel is ever classified 0.
fn square_wave(phase: f64) -> i8 {
    if (phase.cos() / 2.0 + 0.5).round() >= 1.0 {
        1
    } else {
        -1
    }
}

/// Map a wedge/ring product (±1) onto the two ends of the intensity range.
fn check_intensity(range: IntensityRange, product: i8) -> u8 {
    let lift = (range.span() as f64 * (product as f64 + 1.0) / 2.0).ceil();
    range.min.saturating_add(lift as u8)
}

/// Rotated coordinates and ring fields for one orientation block.
///
/// Built once at the block's remake step. Every bar position of the block
/// reuses it; the wedges are phase-shifted by the bar offset per step, so the
/// checks travel with the bar.
#[derive(Debug, Clone)]
pub struct BlockGeometry {
    block: usize,
    angle: f64,
    x: Vec<f64>,
    /// Per motion phase, the ring sign for positive and negative wedges.
    rings: Vec<(Vec<i8>, Vec<i8>)>,
    freq: f64,
    intensity: IntensityRange,
    bar_start: f64,
    step_size: f64,
    ring_width: f64,
}

impl BlockGeometry {
    pub fn new(grid: &Grid, block: usize, angle: f64, resolved: &ResolvedParams) -> Self {
        let params = &resolved.params;
        let derived = &resolved.derived;
        let (x, y) = grid.rotated(angle);

        let ring_width = derived.ring_width;
        let freq = params.num_sub_rings as f64 * (2.0 * PI / ring_width);
        let step_size =
            (2.0 * derived.outer_radius - ring_width / 2.0) / derived.steps_per_sweep as f64;

        let motion_steps = params.motion_steps as usize;
        // Opposite drift in alternating wedges.
        let rings: Vec<(Vec<i8>, Vec<i8>)> = (0..motion_steps)
            .map(|k| {
                let shift = k as f64 / motion_steps as f64 * 2.0 * PI;
                y.iter()
                    .map(|&py| (square_wave(py * freq + shift), square_wave(py * freq - shift)))
                    .unzip()
            })
            .collect();

        Self {
            block,
            angle,
            x,
            rings,
            freq,
            intensity: params.intensity_range,
            bar_start: -derived.outer_radius,
            step_size,
            ring_width,
        }
    }

    pub fn block(&self) -> usize {
        self.block
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn motion_steps(&self) -> usize {
        self.rings.len()
    }

    /// Bar edges `(lo, hi)` along the rotated x axis at a bar position.
    pub fn window(&self, step: usize) -> (f64, f64) {
        let lo = self.bar_start + step as f64 * self.step_size;
        (lo, lo + self.ring_width)
    }

    /// The motion-phase frames for one bar position, in phase order.
    pub fn render_step(&self, grid: &Grid, step: usize, background: u8) -> Vec<Frame> {
        let (lo, hi) = self.window(step);
        // Wedge sign for pixels inside the bar, 0 elsewhere.
        let wedges: Vec<i8> = self
            .x
            .iter()
            .enumerate()
            .map(|(i, &px)| {
                if px >= lo && px <= hi && grid.in_aperture(i) {
                    square_wave((px - lo) * self.freq)
                } else {
                    0
                }
            })
            .collect();

        self.rings
            .iter()
            .map(|(pos, neg)| {
                let mut frame = Frame::filled(grid.side(), grid.side(), background);
                for (i, (px, &wedge)) in frame.data_mut().iter_mut().zip(&wedges).enumerate() {
                    let ring = match wedge {
                        0 => continue,
                        w if w > 0 => pos[i],
                        _ => neg[i],
                    };
                    *px = check_intensity(self.intensity, wedge * ring);
                }
                frame
            })
            .collect()
    }
}
