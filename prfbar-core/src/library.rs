use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::error::LibraryError;
use crate::frame::Frame;

/// How rendered frames are laid out in the library:
/// block-major, then bar position, then motion phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryLayout {
    pub blocks: usize,
    pub steps_per_block: usize,
    pub motion_steps: usize,
}

impl LibraryLayout {
    /// Frames in one sweep of one block.
    pub fn sweep_frames(&self) -> usize {
        self.steps_per_block * self.motion_steps
    }

    /// Frames rendered for all blocks, blank excluded.
    pub fn rendered_frames(&self) -> usize {
        self.blocks * self.sweep_frames()
    }

    pub fn index_of(&self, block: usize, step: usize, phase: usize) -> usize {
        block * self.sweep_frames() + step * self.motion_steps + phase
    }

    pub fn sweep_range(&self, block: usize) -> Range<usize> {
        let start = block * self.sweep_frames();
        start..start + self.sweep_frames()
    }
}

/// Append-only arena of rendered frames. The blank frame is appended last and
/// seals the library.
#[derive(Debug, Clone)]
pub struct FrameLibrary {
    layout: LibraryLayout,
    width: u32,
    height: u32,
    frames: Vec<Frame>,
    blank: Option<usize>,
}

impl FrameLibrary {
    pub fn new(layout: LibraryLayout, width: u32, height: u32) -> Self {
        Self {
            layout,
            width,
            height,
            frames: Vec::with_capacity(layout.rendered_frames() + 1),
            blank: None,
        }
    }

    /// Rebuild a sealed library from frames in library order, blank last.
    pub fn from_frames(
        layout: LibraryLayout,
        width: u32,
        height: u32,
        frames: Vec<Frame>,
    ) -> Result<Self, LibraryError> {
        let mut frames = frames;
        let blank = frames.pop().ok_or(LibraryError::Incomplete {
            expected: layout.rendered_frames() + 1,
            found: 0,
        })?;
        let mut library = Self::new(layout, width, height);
        for frame in frames {
            library.push(frame)?;
        }
        library.seal(blank)?;
        Ok(library)
    }

    /// Append a bar frame; returns its index.
    pub fn push(&mut self, frame: Frame) -> Result<usize, LibraryError> {
        if let Some(blank) = self.blank {
            return Err(LibraryError::Sealed { blank });
        }
        self.check_dimensions(&frame)?;
        self.frames.push(frame);
        Ok(self.frames.len() - 1)
    }

    /// Append the blank frame once every block has been rendered; returns the blank index.
    pub fn seal(&mut self, blank: Frame) -> Result<usize, LibraryError> {
        if let Some(blank) = self.blank {
            return Err(LibraryError::Sealed { blank });
        }
        let expected = self.layout.rendered_frames();
        if self.frames.len() != expected {
            return Err(LibraryError::Incomplete {
                expected,
                found: self.frames.len(),
            });
        }
        self.check_dimensions(&blank)?;
        self.frames.push(blank);
        let index = self.frames.len() - 1;
        self.blank = Some(index);
        Ok(index)
    }

    fn check_dimensions(&self, frame: &Frame) -> Result<(), LibraryError> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(LibraryError::DimensionMismatch {
                width: self.width,
                height: self.height,
                got_width: frame.width(),
                got_height: frame.height(),
            });
        }
        Ok(())
    }

    pub fn layout(&self) -> &LibraryLayout {
        &self.layout
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn blank_index(&self) -> Option<usize> {
        self.blank
    }

    pub fn is_sealed(&self) -> bool {
        self.blank.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> LibraryLayout {
        LibraryLayout {
            blocks: 2,
            steps_per_block: 3,
            motion_steps: 2,
        }
    }

    #[test]
    fn layout_offsets_are_block_major() {
        let l = layout();
        assert_eq!(l.sweep_frames(), 6);
        assert_eq!(l.rendered_frames(), 12);
        assert_eq!(l.index_of(0, 0, 0), 0);
        assert_eq!(l.index_of(0, 2, 1), 5);
        assert_eq!(l.index_of(1, 0, 0), 6);
        assert_eq!(l.sweep_range(1), 6..12);
    }

    #[test]
    fn seal_requires_every_frame() {
        let mut lib = FrameLibrary::new(layout(), 2, 2);
        lib.push(Frame::filled(2, 2, 0)).unwrap();
        let err = lib.seal(Frame::filled(2, 2, 9)).unwrap_err();
        assert_eq!(
            err,
            LibraryError::Incomplete {
                expected: 12,
                found: 1
            }
        );
    }

    #[test]
    fn sealed_library_rejects_appends() {
        let mut lib = FrameLibrary::new(layout(), 2, 2);
        for i in 0..12 {
            assert_eq!(lib.push(Frame::filled(2, 2, i)).unwrap(), i as usize);
        }
        assert_eq!(lib.seal(Frame::filled(2, 2, 128)).unwrap(), 12);
        assert_eq!(lib.len(), 13);
        assert_eq!(lib.blank_index(), Some(12));
        assert!(matches!(
            lib.push(Frame::filled(2, 2, 0)),
            Err(LibraryError::Sealed { blank: 12 })
        ));
    }

    #[test]
    fn mismatched_frames_are_refused() {
        let mut lib = FrameLibrary::new(layout(), 2, 2);
        assert!(matches!(
            lib.push(Frame::filled(3, 2, 0)),
            Err(LibraryError::DimensionMismatch { got_width: 3, .. })
        ));
    }

    #[test]
    fn from_frames_takes_last_as_blank() {
        let frames: Vec<Frame> = (0..13).map(|i| Frame::filled(1, 1, i)).collect();
        let lib = FrameLibrary::from_frames(layout(), 1, 1, frames).unwrap();
        assert_eq!(lib.blank_index(), Some(12));
        assert_eq!(lib.get(12).unwrap().pixel(0, 0), 12);
    }
}
