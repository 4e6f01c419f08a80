//! A headless device that records every call it receives.
//!
//! [`RecordingDevice`] implements [`RenderDevice`] without touching a GPU: it
//! appends a [`DeviceCall`] per operation. The engine's own tests use it to
//! pin down the batching contract (draw-call counts, uniform ordering, bind
//! idempotence), and host applications can use it the same way, or to run the
//! full engine in environments with no graphics stack at all.

use crate::color::Color;
use crate::geometry::DrawMode;
use crate::render::device::{
    BufferHandle, ProgramHandle, RenderDevice, RenderError, TextureHandle, UniformValue,
};
use crate::shader::ShaderProgramSpec;

/// One recorded device operation.
#[derive(Clone, Debug, PartialEq)]
pub enum DeviceCall {
    CreateProgram { name: String },
    CreateBuffer { label: String },
    DeleteBuffer { buffer: usize },
    UploadVertices { buffer: usize, floats: usize },
    CreateTexture { label: String, width: u32, height: u32 },
    WriteTexture { texture: usize, width: u32, height: u32 },
    SetDepthTest { enabled: bool },
    BindProgram { program: usize },
    BindBuffer { buffer: usize },
    BindTexture { texture: usize },
    SetUniform {
        program: usize,
        name: String,
        value: UniformValue,
    },
    Draw {
        mode: DrawMode,
        first_vertex: u32,
        vertex_count: u32,
    },
    BeginFrame { clear: Color },
    EndFrame,
}

/// Records calls instead of issuing GPU work.
#[derive(Default)]
pub struct RecordingDevice {
    calls: Vec<DeviceCall>,
    programs: Vec<String>,
    buffers: Vec<String>,
    textures: Vec<String>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call recorded so far, in order.
    pub fn calls(&self) -> &[DeviceCall] {
        &self.calls
    }

    /// Forgets recorded calls (but not created resources); useful for
    /// asserting on a single frame.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Number of recorded calls matching `predicate`.
    pub fn count(&self, predicate: impl Fn(&DeviceCall) -> bool) -> usize {
        self.calls.iter().filter(|c| predicate(c)).count()
    }

    /// The recorded draws, in order.
    pub fn draws(&self) -> Vec<&DeviceCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, DeviceCall::Draw { .. }))
            .collect()
    }

    /// The name a program handle was created under.
    pub fn program_name(&self, index: usize) -> &str {
        &self.programs[index]
    }

    /// The label a buffer handle was created under.
    pub fn buffer_label(&self, index: usize) -> &str {
        &self.buffers[index]
    }
}

impl RenderDevice for RecordingDevice {
    fn create_program(&mut self, spec: &ShaderProgramSpec) -> Result<ProgramHandle, RenderError> {
        self.calls.push(DeviceCall::CreateProgram {
            name: spec.name.clone(),
        });
        self.programs.push(spec.name.clone());
        Ok(ProgramHandle(self.programs.len() - 1))
    }

    fn create_buffer(&mut self, label: &str) -> Result<BufferHandle, RenderError> {
        self.calls.push(DeviceCall::CreateBuffer {
            label: label.to_owned(),
        });
        self.buffers.push(label.to_owned());
        Ok(BufferHandle(self.buffers.len() - 1))
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.calls.push(DeviceCall::DeleteBuffer { buffer: buffer.0 });
    }

    fn upload_vertices(&mut self, buffer: BufferHandle, data: &[f32]) {
        self.calls.push(DeviceCall::UploadVertices {
            buffer: buffer.0,
            floats: data.len(),
        });
    }

    fn create_texture(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        _pixels: &[u8],
    ) -> Result<TextureHandle, RenderError> {
        self.calls.push(DeviceCall::CreateTexture {
            label: label.to_owned(),
            width,
            height,
        });
        self.textures.push(label.to_owned());
        Ok(TextureHandle(self.textures.len() - 1))
    }

    fn write_texture(&mut self, texture: TextureHandle, width: u32, height: u32, _pixels: &[u8]) {
        self.calls.push(DeviceCall::WriteTexture {
            texture: texture.0,
            width,
            height,
        });
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.calls.push(DeviceCall::SetDepthTest { enabled });
    }

    fn bind_program(&mut self, program: ProgramHandle) {
        self.calls.push(DeviceCall::BindProgram { program: program.0 });
    }

    fn bind_buffer(&mut self, buffer: BufferHandle) {
        self.calls.push(DeviceCall::BindBuffer { buffer: buffer.0 });
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        self.calls.push(DeviceCall::BindTexture { texture: texture.0 });
    }

    fn set_uniform(&mut self, program: ProgramHandle, name: &str, value: UniformValue) {
        self.calls.push(DeviceCall::SetUniform {
            program: program.0,
            name: name.to_owned(),
            value,
        });
    }

    fn draw(&mut self, mode: DrawMode, first_vertex: u32, vertex_count: u32) {
        self.calls.push(DeviceCall::Draw {
            mode,
            first_vertex,
            vertex_count,
        });
    }

    fn begin_frame(&mut self, clear: Color) {
        self.calls.push(DeviceCall::BeginFrame { clear });
    }

    fn end_frame(&mut self) {
        self.calls.push(DeviceCall::EndFrame);
    }
}
