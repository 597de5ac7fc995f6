pub mod geometry;
pub mod render;

pub use geometry::{BlockGeometry, Grid};
pub use render::{
    CheckerboardRenderer, RenderError, RenderOpts, RenderResult, RenderStats, render_library,
};
