use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepDirection {
    Forward,
    /// The forward block played back to front.
    Reverse,
}

/// One entry of the presentation cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Segment {
    /// Half a sweep's worth of background.
    Blank,
    Sweep {
        block: usize,
        direction: SweepDirection,
    },
}

const fn forward(block: usize) -> Segment {
    Segment::Sweep {
        block,
        direction: SweepDirection::Forward,
    }
}

const fn reverse(block: usize) -> Segment {
    Segment::Sweep {
        block,
        direction: SweepDirection::Reverse,
    }
}

/// One full presentation cycle: eight sweeps in pairs, each pair preceded by a blank.
pub const CYCLE_TEMPLATE: [Segment; 12] = [
    Segment::Blank,
    forward(0),
    forward(1),
    Segment::Blank,
    forward(2),
    forward(3),
    Segment::Blank,
    reverse(0),
    reverse(1),
    Segment::Blank,
    reverse(2),
    reverse(3),
];

impl Segment {
    /// Frames this segment occupies when a sweep spans `sweep_frames`.
    pub fn frame_count(&self, sweep_frames: usize) -> usize {
        match self {
            Segment::Blank => sweep_frames / 2,
            Segment::Sweep { .. } => sweep_frames,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Segment::Blank)
    }

    pub fn label(&self) -> &'static str {
        use SweepDirection::*;
        match self {
            Segment::Blank => "blank",
            Segment::Sweep { block, direction } => match (block, direction) {
                (0, Forward) => "diagonal up-left",
                (1, Forward) => "vertical left-to-right",
                (2, Forward) => "diagonal up-right",
                (3, Forward) => "horizontal downward",
                (0, Reverse) => "diagonal down-right",
                (1, Reverse) => "vertical right-to-left",
                (2, Reverse) => "diagonal down-left",
                (3, Reverse) => "horizontal upward",
                _ => "sweep",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_has_eight_sweeps_and_four_blanks() {
        let blanks = CYCLE_TEMPLATE.iter().filter(|s| s.is_blank()).count();
        assert_eq!(blanks, 4);
        assert_eq!(CYCLE_TEMPLATE.len() - blanks, 8);
    }

    #[test]
    fn every_block_plays_once_each_way() {
        for block in 0..4 {
            for direction in [SweepDirection::Forward, SweepDirection::Reverse] {
                let hits = CYCLE_TEMPLATE
                    .iter()
                    .filter(|s| **s == Segment::Sweep { block, direction })
                    .count();
                assert_eq!(hits, 1, "block {block} {direction:?}");
            }
        }
    }

    #[test]
    fn cycle_frames_are_ten_half_sweeps_doubled() {
        let total: usize = CYCLE_TEMPLATE.iter().map(|s| s.frame_count(160)).sum();
        assert_eq!(total, 8 * 160 + 4 * 80);
    }

    #[test]
    fn reverse_labels_mirror_forward() {
        assert_eq!(reverse(0).label(), "diagonal down-right");
        assert_eq!(forward(3).label(), "horizontal downward");
        assert_eq!(Segment::Blank.label(), "blank");
    }
}
