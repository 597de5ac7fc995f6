pub mod sequence;

pub use sequence::{Sequence, SequenceAssembler, SequenceError, assemble};
