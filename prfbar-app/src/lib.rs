pub mod app;
pub mod bundle;

pub use app::{App, Stimulus, Summary, load_overrides};
pub use bundle::{BundleError, Manifest, load_bundle, read_frame, read_manifest, save_bundle};
