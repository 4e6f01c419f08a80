//! The renderer backend: name-keyed GPU resources with cheap "is X active"
//! checks.
//!
//! [`Renderer`] owns the mapping from logical names (program, vertex buffer,
//! atlas) to device handles, and tracks which of each is currently bound.
//! Every `use_*` operation is idempotent: it only reaches the device when the
//! requested resource differs from the active one, so redundant state changes
//! cost a string compare, not a GPU call.
//!
//! [`Renderer::render`] is the single entry point the batcher invokes once
//! per batch: it performs the switch-if-needed steps for the program, buffer
//! and atlas, uploads static uniforms once, and then issues either one draw
//! per entity (when per-entity uniforms exist) or a single span draw.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc;

use crate::color::Color;
use crate::geometry::DrawMode;
use crate::render::device::{
    BufferHandle, ProgramHandle, RenderDevice, RenderError, TextureHandle, UniformValue,
};
use crate::shader::ShaderProgramSpec;

/// Whether depth testing is in effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    TwoD,
    ThreeD,
}

/// Description of a texture atlas to load.
///
/// The atlas becomes usable immediately: a 1×1 `placeholder` texture is
/// allocated synchronously and the image file is decoded on a background
/// thread, swapped in whenever it completes. Rendering never waits for it.
#[derive(Clone, Debug)]
pub struct TextureAtlas {
    pub name: String,
    pub path: PathBuf,
    /// Grid cell counts used to resolve `AtlasRegion::Cell` indices.
    pub columns: u32,
    pub rows: u32,
    pub placeholder: Color,
}

impl TextureAtlas {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            columns: 1,
            rows: 1,
            placeholder: Color::WHITE,
        }
    }

    pub fn with_grid(mut self, columns: u32, rows: u32) -> Self {
        self.columns = columns;
        self.rows = rows;
        self
    }

    pub fn with_placeholder(mut self, color: Color) -> Self {
        self.placeholder = color;
        self
    }
}

/// The vertex buffer a batch draws from.
///
/// `changed` tells the renderer whether `data` differs from what was last
/// uploaded under `name`; unchanged buffers are re-bound but not re-uploaded.
/// `vertex_count` is per entity — draw spans are derived from it.
pub struct VertexBufferSpec<'a> {
    pub name: &'a str,
    pub data: &'a [f32],
    pub changed: bool,
    pub mode: DrawMode,
    pub vertex_count: u32,
}

/// Everything the renderer needs to draw one batch.
pub struct DrawConfig<'a> {
    pub program: &'a str,
    pub buffer: VertexBufferSpec<'a>,
    pub entity_count: u32,
    /// Batch-constant uniforms, uploaded once.
    pub static_values: Vec<(&'a str, UniformValue)>,
    /// Per-entity uniform sets in draw order; empty for the pure batching
    /// fast path.
    pub entity_values: Vec<Vec<(&'a str, UniformValue)>>,
    pub atlas: Option<&'a str>,
}

type PendingImage = mpsc::Receiver<Result<LoadedImage, String>>;

struct LoadedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

struct AtlasEntry {
    handle: TextureHandle,
    columns: u32,
    rows: u32,
    pending: Option<PendingImage>,
}

/// Name-keyed, state-tracking adapter over a [`RenderDevice`].
pub struct Renderer<D: RenderDevice> {
    device: D,
    programs: HashMap<String, ProgramHandle>,
    buffers: HashMap<String, BufferHandle>,
    atlases: HashMap<String, AtlasEntry>,
    active_program: Option<String>,
    active_buffer: Option<String>,
    active_atlas: Option<String>,
    mode: Option<RenderMode>,
}

impl<D: RenderDevice> Renderer<D> {
    pub fn new(device: D) -> Self {
        Self {
            device,
            programs: HashMap::new(),
            buffers: HashMap::new(),
            atlases: HashMap::new(),
            active_program: None,
            active_buffer: None,
            active_atlas: None,
            mode: None,
        }
    }

    /// The underlying device; read access is what tests assert against.
    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    // ------------------------------------------------------------------
    // Resource lifecycle
    // ------------------------------------------------------------------

    /// Compiles and registers a shader program. Must happen before the frame
    /// loop; compile failures are fatal and carry the backend diagnostic.
    pub fn register_program(&mut self, spec: &ShaderProgramSpec) -> Result<(), RenderError> {
        let handle = self.device.create_program(spec)?;
        log::debug!("compiled shader program '{}'", spec.name);
        self.programs.insert(spec.name.clone(), handle);
        Ok(())
    }

    /// Creates a named vertex buffer. Creating a name that already exists is
    /// a no-op.
    pub fn create_vbo(&mut self, name: &str) -> Result<(), RenderError> {
        if self.buffers.contains_key(name) {
            return Ok(());
        }
        let handle = self.device.create_buffer(name)?;
        self.buffers.insert(name.to_owned(), handle);
        Ok(())
    }

    /// Releases a named vertex buffer. Unknown names are a no-op; deleting
    /// the currently-bound buffer simply leaves nothing bound.
    pub fn delete_vbo(&mut self, name: &str) {
        if let Some(handle) = self.buffers.remove(name) {
            if self.active_buffer.as_deref() == Some(name) {
                self.active_buffer = None;
            }
            self.device.delete_buffer(handle);
        }
    }

    /// Registers a texture atlas: allocates its placeholder now, kicks off
    /// the image decode in the background.
    pub fn create_atlas(&mut self, atlas: TextureAtlas) -> Result<(), RenderError> {
        let handle =
            self.device
                .create_texture(&atlas.name, 1, 1, &atlas.placeholder.to_rgba8())?;

        let (tx, rx) = mpsc::channel();
        let path = atlas.path.clone();
        std::thread::spawn(move || {
            let result = image::open(&path)
                .map(|img| {
                    let rgba = img.to_rgba8();
                    let (width, height) = rgba.dimensions();
                    LoadedImage {
                        width,
                        height,
                        pixels: rgba.into_raw(),
                    }
                })
                .map_err(|e| format!("{}: {e}", path.display()));
            // The receiver may be gone if the renderer was dropped; fine.
            let _ = tx.send(result);
        });

        self.atlases.insert(
            atlas.name.clone(),
            AtlasEntry {
                handle,
                columns: atlas.columns,
                rows: atlas.rows,
                pending: Some(rx),
            },
        );
        Ok(())
    }

    /// Applies any atlas images whose background decode has finished.
    ///
    /// Call once per frame, before rendering. A failed decode is logged and
    /// the placeholder stays in place.
    pub fn poll_texture_loads(&mut self) {
        for (name, entry) in self.atlases.iter_mut() {
            let Some(rx) = entry.pending.as_ref() else {
                continue;
            };
            match rx.try_recv() {
                Ok(Ok(img)) => {
                    self.device
                        .write_texture(entry.handle, img.width, img.height, &img.pixels);
                    log::info!("texture atlas '{name}' loaded ({}x{})", img.width, img.height);
                    entry.pending = None;
                }
                Ok(Err(e)) => {
                    log::error!("texture atlas '{name}' failed to load: {e}");
                    entry.pending = None;
                }
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    log::error!("texture atlas '{name}': loader thread vanished");
                    entry.pending = None;
                }
            }
        }
    }

    /// The grid dimensions an atlas was registered with.
    pub fn atlas_grid(&self, name: &str) -> Result<(u32, u32), RenderError> {
        self.atlases
            .get(name)
            .map(|e| (e.columns, e.rows))
            .ok_or_else(|| RenderError::UnknownAtlas(name.to_owned()))
    }

    // ------------------------------------------------------------------
    // State switches (idempotent)
    // ------------------------------------------------------------------

    /// Switches depth testing to match `mode`; a no-op when already there.
    pub fn set_mode(&mut self, mode: RenderMode) {
        if self.mode != Some(mode) {
            self.device.set_depth_test(mode == RenderMode::ThreeD);
            self.mode = Some(mode);
        }
    }

    /// Makes a program active, touching the device only on change.
    pub fn use_program(&mut self, name: &str) -> Result<(), RenderError> {
        let handle = self.program_handle(name)?;
        if self.active_program.as_deref() != Some(name) {
            self.device.bind_program(handle);
            self.active_program = Some(name.to_owned());
        }
        Ok(())
    }

    fn program_handle(&self, name: &str) -> Result<ProgramHandle, RenderError> {
        self.programs
            .get(name)
            .copied()
            .ok_or_else(|| RenderError::UnknownProgram(name.to_owned()))
    }

    fn use_buffer(&mut self, name: &str) -> Result<BufferHandle, RenderError> {
        let handle = self
            .buffers
            .get(name)
            .copied()
            .ok_or_else(|| RenderError::UnknownBuffer(name.to_owned()))?;
        if self.active_buffer.as_deref() != Some(name) {
            self.device.bind_buffer(handle);
            self.active_buffer = Some(name.to_owned());
        }
        Ok(handle)
    }

    fn use_atlas(&mut self, name: &str) -> Result<(), RenderError> {
        let handle = self
            .atlases
            .get(name)
            .map(|e| e.handle)
            .ok_or_else(|| RenderError::UnknownAtlas(name.to_owned()))?;
        if self.active_atlas.as_deref() != Some(name) {
            self.device.bind_texture(handle);
            self.active_atlas = Some(name.to_owned());
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Frame
    // ------------------------------------------------------------------

    pub fn begin_frame(&mut self, clear: Color) {
        self.device.begin_frame(clear);
    }

    pub fn end_frame(&mut self) {
        self.device.end_frame();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.device.resize(width, height);
    }

    /// Draws one batch; the single entry point the batcher uses.
    ///
    /// Switch-if-needed for program, buffer, and atlas; upload vertex data
    /// only when `changed`; static uniforms once; then either one draw per
    /// entity uniform set (each at vertex offset `i * vertex_count`) or a
    /// single draw spanning the whole batch.
    pub fn render(&mut self, config: &DrawConfig<'_>) -> Result<(), RenderError> {
        let program = self.program_handle(config.program)?;
        self.use_program(config.program)?;

        let buffer = self.use_buffer(config.buffer.name)?;
        if config.buffer.changed {
            self.device.upload_vertices(buffer, config.buffer.data);
        }

        if let Some(atlas) = config.atlas {
            self.use_atlas(atlas)?;
        }

        for (name, value) in &config.static_values {
            self.device.set_uniform(program, name, *value);
        }

        let per_entity = config.buffer.vertex_count;
        if config.entity_values.is_empty() {
            self.device
                .draw(config.buffer.mode, 0, per_entity * config.entity_count);
        } else {
            for (index, values) in config.entity_values.iter().enumerate() {
                for (name, value) in values {
                    self.device.set_uniform(program, name, *value);
                }
                self.device
                    .draw(config.buffer.mode, index as u32 * per_entity, per_entity);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs;
    use crate::render::recording::{DeviceCall, RecordingDevice};

    fn renderer() -> Renderer<RecordingDevice> {
        Renderer::new(RecordingDevice::new())
    }

    #[test]
    fn use_program_is_idempotent() {
        let mut r = renderer();
        r.register_program(&programs::basic()).unwrap();
        r.device_mut().clear_calls();

        r.use_program("basic").unwrap();
        r.use_program("basic").unwrap();

        let binds = r
            .device()
            .count(|c| matches!(c, DeviceCall::BindProgram { .. }));
        assert_eq!(binds, 1);
    }

    #[test]
    fn switching_back_rebinds() {
        let mut r = renderer();
        r.register_program(&programs::basic()).unwrap();
        r.register_program(&programs::vertex_color()).unwrap();
        r.device_mut().clear_calls();

        r.use_program("basic").unwrap();
        r.use_program("vertex_color").unwrap();
        r.use_program("basic").unwrap();

        let binds = r
            .device()
            .count(|c| matches!(c, DeviceCall::BindProgram { .. }));
        assert_eq!(binds, 3);
    }

    #[test]
    fn unknown_program_is_reported_by_name() {
        let mut r = renderer();
        let err = r.use_program("nebula").unwrap_err();
        assert!(matches!(err, RenderError::UnknownProgram(name) if name == "nebula"));
    }

    #[test]
    fn set_mode_only_reaches_the_device_on_change() {
        let mut r = renderer();
        r.set_mode(RenderMode::ThreeD);
        r.set_mode(RenderMode::ThreeD);
        r.set_mode(RenderMode::TwoD);

        let toggles: Vec<_> = r
            .device()
            .calls()
            .iter()
            .filter(|c| matches!(c, DeviceCall::SetDepthTest { .. }))
            .collect();
        assert_eq!(
            toggles,
            vec![
                &DeviceCall::SetDepthTest { enabled: true },
                &DeviceCall::SetDepthTest { enabled: false },
            ]
        );
    }

    #[test]
    fn duplicate_vbo_creation_is_a_no_op() {
        let mut r = renderer();
        r.create_vbo("group").unwrap();
        r.create_vbo("group").unwrap();
        let creates = r
            .device()
            .count(|c| matches!(c, DeviceCall::CreateBuffer { .. }));
        assert_eq!(creates, 1);
    }

    #[test]
    fn deleting_the_active_buffer_clears_the_binding() {
        let mut r = renderer();
        r.create_vbo("group").unwrap();
        r.use_buffer("group").unwrap();
        r.delete_vbo("group");

        // Recreate under the same name; it must be re-bound, not assumed
        // active from before the delete.
        r.create_vbo("group").unwrap();
        r.use_buffer("group").unwrap();
        let binds = r
            .device()
            .count(|c| matches!(c, DeviceCall::BindBuffer { .. }));
        assert_eq!(binds, 2);
    }

    #[test]
    fn unchanged_buffers_are_not_reuploaded() {
        let mut r = renderer();
        r.register_program(&programs::basic()).unwrap();
        r.create_vbo("basic:square").unwrap();

        let data = [0.0f32; 12];
        for changed in [true, false] {
            r.render(&DrawConfig {
                program: "basic",
                buffer: VertexBufferSpec {
                    name: "basic:square",
                    data: &data,
                    changed,
                    mode: DrawMode::Triangles,
                    vertex_count: 6,
                },
                entity_count: 1,
                static_values: vec![],
                entity_values: vec![],
                atlas: None,
            })
            .unwrap();
        }

        let uploads = r
            .device()
            .count(|c| matches!(c, DeviceCall::UploadVertices { .. }));
        assert_eq!(uploads, 1);
    }
}
