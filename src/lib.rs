/// soft_raster - CPU rasterization of 2D and 3D geometry into an RGBA8 framebuffer
/// Programmable vertex/fragment processors, homogeneous clipping, SIMD edge walking
pub mod camera;
pub mod config;
pub mod math;
pub mod perf;
pub mod rendering;

pub use camera::{Camera2D, Camera3D, CameraController};
pub use config::RasterConfig;
pub use perf::{CounterSnapshot, RasterCounters, RASTER_COUNTERS};
pub use rendering::{
    BlendMode, Color, DefaultProcessor, DepthTest, Depthbuffer, DrawMode, FaceCulling,
    FlatColorProcessor, FragmentContext, Framebuffer, LambertProcessor, Processor, Renderer2D,
    Renderer3D, ScreenVertex, Texture, TextureProcessor, Vertex, VertexBuffer, Viewport,
};
