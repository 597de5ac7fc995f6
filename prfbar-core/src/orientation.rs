use std::f64::consts::PI;

/// Number of bar orientations in the schedule (4 axes x 2 directions).
pub const ORIENTATION_COUNT: usize = 8;

/// Orientation blocks that are actually rendered; the other half of the
/// cycle replays these in reverse.
pub const RENDERED_BLOCKS: usize = ORIENTATION_COUNT / 2;

/// Multiples of 45 degrees, ordered so that neighbouring slots are never
/// angularly adjacent.
const PERMUTATION: [usize; ORIENTATION_COUNT] = [0, 5, 2, 7, 4, 1, 6, 3];

/// What a bar position does with the coordinate grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScheduleEntry {
    /// First position of an orientation block: rotate the grid by this angle (radians).
    Remake(f64),
    /// Keep the previous rotation, only advance the bar window.
    Keep,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrientationSchedule {
    angles: [f64; ORIENTATION_COUNT],
    steps_per_block: usize,
}

impl OrientationSchedule {
    pub fn new(steps_per_block: usize) -> Self {
        let angles = PERMUTATION.map(|k| k as f64 * PI / 4.0);
        Self {
            angles,
            steps_per_block,
        }
    }

    /// Rotation angles in schedule order, radians.
    pub fn angles(&self) -> &[f64; ORIENTATION_COUNT] {
        &self.angles
    }

    pub fn steps_per_block(&self) -> usize {
        self.steps_per_block
    }

    pub fn block_angle(&self, block: usize) -> f64 {
        self.angles[block % ORIENTATION_COUNT]
    }

    /// Entry for a bar position counted from the start of the cycle.
    pub fn entry(&self, step: usize) -> ScheduleEntry {
        if self.steps_per_block == 0 || step % self.steps_per_block != 0 {
            return ScheduleEntry::Keep;
        }
        ScheduleEntry::Remake(self.block_angle(step / self.steps_per_block))
    }

    /// `(block, angle)` for every remake in the rendered half of the cycle.
    pub fn rendered_blocks(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        (0..RENDERED_BLOCKS * self.steps_per_block).filter_map(move |step| match self.entry(step) {
            ScheduleEntry::Remake(angle) => Some((step / self.steps_per_block, angle)),
            ScheduleEntry::Keep => None,
        })
    }
}
