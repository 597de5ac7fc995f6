pub mod config;
pub mod error;
pub mod frame;
pub mod library;
pub mod orientation;
pub mod params;
pub mod segment;

pub use config::{DerivedParams, ResolvedParams, resolve, whole_samples};
pub use error::{ConfigError, ConfigResult, LibraryError};
pub use frame::Frame;
pub use library::{FrameLibrary, LibraryLayout};
pub use orientation::{ORIENTATION_COUNT, OrientationSchedule, RENDERED_BLOCKS, ScheduleEntry};
pub use params::{ExperimentParams, IntensityRange, ParamOverrides, Resolution};
pub use segment::{CYCLE_TEMPLATE, Segment, SweepDirection};
