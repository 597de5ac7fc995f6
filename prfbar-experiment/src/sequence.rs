use prfbar_core::{CYCLE_TEMPLATE, LibraryLayout, ResolvedParams, Segment, SweepDirection};
use serde::Serialize;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("sequence position {position} refers to frame {index}, library holds {library_len}")]
    IndexOutOfRange {
        position: usize,
        index: usize,
        library_len: usize,
    },
}

/// Frame-library indices, one per presented frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Sequence(Vec<usize>);

impl Sequence {
    /// Wrap indices read back from storage, checking each against the library size.
    pub fn from_indices(indices: Vec<usize>, library_len: usize) -> Result<Self, SequenceError> {
        if let Some((position, &index)) = indices
            .iter()
            .enumerate()
            .find(|&(_, &index)| index >= library_len)
        {
            return Err(SequenceError::IndexOutOfRange {
                position,
                index,
                library_len,
            });
        }
        Ok(Self(indices))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<usize> {
        self.0
    }
}

/// Resolves a cycle template against a library layout. Reads offsets only;
/// never touches frame contents.
#[derive(Debug, Clone)]
pub struct SequenceAssembler<'a> {
    layout: LibraryLayout,
    blank: usize,
    template: &'a [Segment],
}

impl SequenceAssembler<'static> {
    pub fn new(layout: LibraryLayout, blank: usize) -> Self {
        Self::with_template(layout, blank, &CYCLE_TEMPLATE)
    }
}

impl<'a> SequenceAssembler<'a> {
    pub fn with_template(layout: LibraryLayout, blank: usize, template: &'a [Segment]) -> Self {
        Self {
            layout,
            blank,
            template,
        }
    }

    pub fn segment(&self, segment: Segment, out: &mut Vec<usize>) {
        match segment {
            Segment::Blank => {
                let n = segment.frame_count(self.layout.sweep_frames());
                out.extend(std::iter::repeat_n(self.blank, n));
            }
            Segment::Sweep {
                block,
                direction: SweepDirection::Forward,
            } => out.extend(self.layout.sweep_range(block)),
            Segment::Sweep {
                block,
                direction: SweepDirection::Reverse,
            } => out.extend(self.layout.sweep_range(block).rev()),
        }
    }

    /// Indices of one presentation cycle.
    pub fn cycle(&self) -> Vec<usize> {
        let mut out = Vec::new();
        for &segment in self.template {
            self.segment(segment, &mut out);
        }
        out
    }

    /// `num_cycles` copies of the cycle followed by `buffer_frames` blanks.
    pub fn assemble(&self, num_cycles: usize, buffer_frames: usize) -> Sequence {
        let cycle = self.cycle();
        let mut out = Vec::with_capacity(cycle.len() * num_cycles + buffer_frames);
        for _ in 0..num_cycles {
            out.extend_from_slice(&cycle);
        }
        out.extend(std::iter::repeat_n(self.blank, buffer_frames));
        Sequence(out)
    }
}

/// Build the full scan sequence for resolved parameters.
#[tracing::instrument(level = "debug", skip(resolved))]
pub fn assemble(resolved: &ResolvedParams, blank: usize) -> Sequence {
    let derived = &resolved.derived;
    let sequence = SequenceAssembler::new(resolved.library_layout(), blank)
        .assemble(derived.num_cycles, derived.buffer_frames);
    tracing::debug!(
        len = sequence.len(),
        cycles = derived.num_cycles,
        buffer = derived.buffer_frames,
        "assembled sequence"
    );
    sequence
}
