//! The low-level device abstraction the renderer drives.
//!
//! [`RenderDevice`] is the seam between the name-keyed, state-tracking
//! [`Renderer`](crate::render::Renderer) and an actual GPU API. Two
//! implementations ship with the engine: [`WgpuDevice`](crate::render::WgpuDevice)
//! issues real GPU work, and [`RecordingDevice`](crate::render::RecordingDevice)
//! records every call for headless runs and assertions.
//!
//! The contract is deliberately stateful, mirroring how a GPU queue is
//! driven: resources are created up front and referred to by handle, `bind_*`
//! selects what subsequent draws use, and `set_uniform` stages values for the
//! next draw. The renderer above this trait guarantees a program and buffer
//! are bound before any draw, and is responsible for skipping redundant
//! binds — implementations may assume every call matters.

use glam::{Mat4, Vec4};
use thiserror::Error;

use crate::color::Color;
use crate::geometry::DrawMode;
use crate::shader::ShaderProgramSpec;

/// Everything that can go wrong in the render path.
///
/// All variants are fatal: configuration errors (`Unknown*`, `Missing*`,
/// mismatches) mean the application wired an entity to resources it never
/// registered, and resource-creation errors mean the backend rejected a
/// shader or allocation. Nothing here is retried or silently skipped.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("shader program '{name}' failed to compile: {detail}")]
    ShaderCompile { name: String, detail: String },

    #[error("shader program '{name}' is malformed: {detail}")]
    BadProgramSpec { name: String, detail: String },

    #[error("failed to create {what} '{name}': {detail}")]
    ResourceCreation {
        what: &'static str,
        name: String,
        detail: String,
    },

    #[error("no shader program named '{0}' is registered")]
    UnknownProgram(String),

    #[error("no geometry named '{0}' is registered")]
    UnknownGeometry(String),

    #[error("no vertex buffer named '{0}' exists")]
    UnknownBuffer(String),

    #[error("no texture atlas named '{0}' is registered")]
    UnknownAtlas(String),

    #[error("entity '{tag}' uses program '{program}' but has no {component} component")]
    MissingComponent {
        tag: String,
        program: String,
        component: &'static str,
    },

    #[error(
        "entity '{tag}' supplies {got} vertex colors for geometry '{geometry}' with {want} vertices"
    )]
    VertexColorMismatch {
        tag: String,
        geometry: String,
        got: usize,
        want: u32,
    },

    #[error(
        "program '{program}' expects {expected}-component positions but geometry '{geometry}' has {actual}"
    )]
    PositionSizeMismatch {
        program: String,
        geometry: String,
        expected: u32,
        actual: u32,
    },

    #[error("program '{program}' samples texture coordinates but geometry '{geometry}' has none")]
    MissingTexCoords { program: String, geometry: String },
}

/// Handle to a compiled shader program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ProgramHandle(pub(crate) usize);

/// Handle to a GPU vertex buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub(crate) usize);

/// Handle to a GPU texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) usize);

/// A uniform value staged for the next draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Mat4(Mat4),
    Vec4(Vec4),
}

impl UniformValue {
    /// Size of the value in a uniform block, matching WGSL layout rules
    /// (both variants are 16-byte aligned).
    pub fn byte_size(&self) -> usize {
        match self {
            UniformValue::Mat4(_) => 64,
            UniformValue::Vec4(_) => 16,
        }
    }
}

/// GPU command surface.
///
/// Handles index into per-device tables; a handle is only meaningful on the
/// device that created it.
pub trait RenderDevice {
    /// Compiles and links a shader program, caching attribute and uniform
    /// locations for later `set_uniform` calls. Compile failures are fatal
    /// and carry the backend's diagnostic.
    fn create_program(&mut self, spec: &ShaderProgramSpec) -> Result<ProgramHandle, RenderError>;

    /// Allocates an empty vertex buffer. Buffers must be created before they
    /// can be bound or uploaded to.
    fn create_buffer(&mut self, label: &str) -> Result<BufferHandle, RenderError>;

    /// Releases a buffer. Safe to call regardless of what is currently bound.
    fn delete_buffer(&mut self, buffer: BufferHandle);

    /// Replaces the buffer's contents with `data`.
    fn upload_vertices(&mut self, buffer: BufferHandle, data: &[f32]);

    /// Allocates a texture with the given RGBA8 contents.
    fn create_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<TextureHandle, RenderError>;

    /// Replaces a texture's contents (and, if needed, its dimensions) in
    /// place. Used when an atlas image finishes loading over its placeholder.
    fn write_texture(&mut self, texture: TextureHandle, width: u32, height: u32, pixels: &[u8]);

    /// Enables or disables depth testing for subsequent draws.
    fn set_depth_test(&mut self, enabled: bool);

    fn bind_program(&mut self, program: ProgramHandle);

    fn bind_buffer(&mut self, buffer: BufferHandle);

    fn bind_texture(&mut self, texture: TextureHandle);

    /// Stages a uniform value on the bound program for subsequent draws.
    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: UniformValue);

    /// Draws `vertex_count` vertices starting at `first_vertex` from the
    /// bound buffer, with the bound program and staged uniforms.
    fn draw(&mut self, mode: DrawMode, first_vertex: u32, vertex_count: u32);

    /// Starts a frame that will clear to `clear`.
    fn begin_frame(&mut self, clear: Color);

    /// Finishes and presents the frame.
    fn end_frame(&mut self);

    /// Adapts to a new surface size. Headless devices ignore this.
    fn resize(&mut self, _width: u32, _height: u32) {}
}
