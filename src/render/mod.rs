//! The render core: batching, the backend adapter, and its devices.

pub mod batch;
pub mod device;
pub mod recording;
pub mod renderer;
pub mod wgpu_device;

pub use batch::Batcher;
pub use device::{
    BufferHandle, ProgramHandle, RenderDevice, RenderError, TextureHandle, UniformValue,
};
pub use recording::{DeviceCall, RecordingDevice};
pub use renderer::{DrawConfig, RenderMode, Renderer, TextureAtlas, VertexBufferSpec};
pub use wgpu_device::WgpuDevice;
