/// Software rasterization pipeline
/// Vertex hook -> homogeneous clip -> projection -> edge-function fill
pub mod attribute;
pub mod blend;
pub mod clip;
pub mod color;
pub mod framebuffer;
pub mod pipeline;
pub mod processor;
pub mod projection;
pub mod rasterizer;
pub mod renderer;
pub mod simd;
pub mod texture;
pub mod vertex_buffer;

pub use attribute::{Attribute, AttributeSlot, Components, ScalarKind, Vertex};
pub use blend::{BlendMode, DepthTest, FaceCulling};
pub use clip::{ClipPolygon, ClipVertex, MAX_CLIP_VERTICES};
pub use color::Color;
pub use framebuffer::{Depthbuffer, Framebuffer};
pub use pipeline::{DrawMode, DrawState};
pub use processor::{
    DefaultProcessor, FlatColorProcessor, FragmentContext, LambertProcessor, Matrices, Processor,
    TextureProcessor,
};
pub use projection::{DepthMode, ScreenVertex, Viewport};
pub use rasterizer::{RasterState, RenderTarget};
pub use renderer::{RenderState2D, RenderState3D, Renderer2D, Renderer3D};
pub use texture::{Filter, PixelFormat, Texture, Wrap};
pub use vertex_buffer::{AttributeArray, AttributeData, VertexBuffer, VertexBufferError};
