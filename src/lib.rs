//! # Aura
//!
//! **A batching-first 2D/3D engine core with an entity-component world.**
//!
//! Aura turns a heterogeneous collection of entities — each a tagged bundle
//! of components (transform, geometry reference, shader reference, colors,
//! texture region) — into a minimal sequence of GPU state changes and draw
//! calls, frame after frame. Entities that share a shader program and
//! geometry are batched together; uniforms declared *static* upload once per
//! batch, uniforms declared *entity* re-resolve per entity in draw order.
//!
//! ## Quick start
//!
//! ```no_run
//! use aura::*;
//!
//! fn main() {
//!     Game::run(GameConfig::new().title("Spin"), |boot| {
//!         boot.register_geometry(shapes::square());
//!         boot.register_program(programs::basic()).unwrap();
//!
//!         boot.world.add_entity(
//!             Entity::new("spinner")
//!                 .with_transform(Transform::from_2d(Vec2::new(480.0, 270.0), 0.0).uniform_scale(120.0))
//!                 .with_model(Model::new("square"))
//!                 .with_shader(ShaderRef::new("basic"))
//!                 .with_flat_color(FlatColor(Color::CYAN))
//!                 .with_update(|c, dt| c.transform.as_mut().unwrap().rotate_z(dt)),
//!         );
//!
//!         boot.register_state("main", GameState::new(|_| {}));
//!         boot.start_in("main");
//!     });
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`World`] owns the live entity set; adds and removes are buffered and
//!   reconciled between frames (removals first, then additions).
//! - [`GeometryRegistry`] and [`ShaderRegistry`] are populated once during
//!   bootstrap and read-only after.
//! - [`Batcher`] is the core: it groups renderables, builds per-group vertex
//!   buffers, and resolves static vs. per-entity uniforms.
//! - [`Renderer`] tracks the active program/buffer/texture by name and skips
//!   redundant binds; it drives a [`RenderDevice`] — [`WgpuDevice`] on a real
//!   GPU, [`RecordingDevice`] headless.
//! - [`Game`] runs the winit loop in a fixed order: input → state tick →
//!   systems → world reconciliation → render.

pub mod camera;
pub mod color;
pub mod entity;
pub mod game;
pub mod geometry;
pub mod gpu;
pub mod input;
pub mod programs;
pub mod render;
pub mod shader;
pub mod shapes;
pub mod systems;
pub mod transform;
pub mod world;

pub use camera::{Camera, Projection};
pub use color::Color;
pub use entity::{
    AtlasRegion, ComponentKind, Components, Entity, EntityId, FlatColor, Model, MultiColor,
    ShaderRef, TextureRef,
};
pub use game::{Bootstrap, Game, GameConfig, GameState, StateMachine, Tick};
pub use geometry::{DrawMode, Geometry, GeometryError, GeometryRegistry};
pub use gpu::GpuContext;
pub use input::Input;
pub use render::{
    Batcher, DeviceCall, DrawConfig, RecordingDevice, RenderDevice, RenderError, RenderMode,
    Renderer, TextureAtlas, UniformValue, VertexBufferSpec, WgpuDevice,
};
pub use shader::{
    AttributeSource, AttributeSpec, EntityBinding, EntityUniform, ShaderProgramSpec,
    ShaderRegistry, StaticBinding, StaticUniform,
};
pub use transform::Transform;
pub use world::World;

// Re-export the math types that appear throughout the public API.
pub use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};

// Re-export the winit types applications need for input handling.
pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;
