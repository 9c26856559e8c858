pub mod binner;
pub mod camera;
pub mod clip;
pub mod color;
pub mod error;
pub mod framebuffer;
pub mod math;
pub mod model;
pub mod overlay;
pub mod plane;
pub mod polygon;
pub mod raster;
pub mod renderer;
pub mod shapes;
pub mod stats;
pub mod tile;
pub mod visibility;

pub use camera::Camera;
pub use color::Color;
pub use error::{PolygonFault, RasterFault, RenderError};
pub use framebuffer::FrameBuffer;
pub use model::{Face, Model};
pub use renderer::{RenderContext, RenderMode, RendererSettings};
pub use shapes::{Camera2D, Shape2D, Transform2D};
pub use stats::FrameStats;
