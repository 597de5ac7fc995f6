/// A single-channel 8-bit intensity image, stored row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Frame {
    /// Uniform frame, used for the blank and as the canvas bars are drawn into.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    /// Wraps raw row-major pixels; `None` when the buffer length does not match.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if data.len() != width as usize * height as usize {
            return None;
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> u8 {
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_frame_is_uniform() {
        let f = Frame::filled(4, 3, 128);
        assert_eq!(f.dimensions(), (4, 3));
        assert!(!f.is_square());
        assert!(f.data().iter().all(|&v| v == 128));
    }

    #[test]
    fn from_raw_checks_length() {
        assert!(Frame::from_raw(2, 2, vec![0; 3]).is_none());
        let f = Frame::from_raw(2, 2, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(f.pixel(1, 0), 2);
        assert_eq!(f.pixel(0, 1), 3);
    }
}
