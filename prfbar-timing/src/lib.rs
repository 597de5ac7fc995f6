pub mod timeline;

pub use timeline::{Timeline, TimelineStats};
