//! Entities and their closed component set.
//!
//! An [`Entity`] is a tagged bundle of components plus an optional per-frame
//! update hook. Components are a **closed** set with one fixed slot per kind
//! ([`Components`]): whether an entity has a transform is a field access, not
//! a string lookup, and "at most one component of each kind" holds by
//! construction.
//!
//! An entity meant for rendering must carry both a [`Model`] and a
//! [`ShaderRef`]; entities without them are legal (logic-only markers) and are
//! simply not drawn.
//!
//! # Example
//!
//! ```
//! use aura::{Entity, Model, ShaderRef, FlatColor, Transform, Color, Vec2};
//!
//! let player = Entity::new("player")
//!     .with_transform(Transform::from_2d(Vec2::new(32.0, 32.0), 0.0))
//!     .with_model(Model::new("square"))
//!     .with_shader(ShaderRef::new("basic"))
//!     .with_flat_color(FlatColor(Color::RED))
//!     .with_update(|components, dt| {
//!         if let Some(t) = components.transform.as_mut() {
//!             t.rotate_z(dt);
//!         }
//!     });
//! assert_eq!(player.tag(), "player");
//! ```

use crate::color::Color;
use crate::transform::Transform;

/// Opaque identity of an entity registered in a [`World`](crate::World).
///
/// Handed out by `World::add_entity`; used for removal and targeted lookup.
/// Ids are never reused within a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityId(pub(crate) u64);

/// The closed set of component kinds, used for presence filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentKind {
    Transform,
    Model,
    Shader,
    FlatColor,
    MultiColor,
    Texture,
}

/// Reference to one geometry in the catalog, by name.
#[derive(Clone, Debug)]
pub struct Model {
    pub geometry: String,
}

impl Model {
    pub fn new(geometry: impl Into<String>) -> Self {
        Self {
            geometry: geometry.into(),
        }
    }
}

/// Reference to one shader program in the catalog, by name.
#[derive(Clone, Debug)]
pub struct ShaderRef {
    pub program: String,
}

impl ShaderRef {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

/// A single color for the whole entity, resolved as a per-entity uniform.
#[derive(Clone, Copy, Debug)]
pub struct FlatColor(pub Color);

/// One color per vertex, interleaved into the vertex buffer.
///
/// The list length must equal the referenced geometry's vertex count; the
/// batcher reports a configuration error otherwise.
#[derive(Clone, Debug)]
pub struct MultiColor(pub Vec<Color>);

/// Which part of a texture atlas an entity samples.
#[derive(Clone, Copy, Debug)]
pub enum AtlasRegion {
    /// Cell index into the atlas grid, row-major from the top-left.
    Cell(u32),
    /// Explicit normalized sub-rectangle.
    Rect { u: f32, v: f32, w: f32, h: f32 },
}

impl AtlasRegion {
    /// Resolves to `(u, v, width, height)` given the atlas grid.
    pub fn to_uv_rect(self, columns: u32, rows: u32) -> [f32; 4] {
        match self {
            AtlasRegion::Cell(index) => {
                let w = 1.0 / columns as f32;
                let h = 1.0 / rows as f32;
                let col = index % columns;
                let row = index / columns;
                [col as f32 * w, row as f32 * h, w, h]
            }
            AtlasRegion::Rect { u, v, w, h } => [u, v, w, h],
        }
    }
}

/// Reference to a texture atlas plus the sub-region to sample.
#[derive(Clone, Debug)]
pub struct TextureRef {
    pub atlas: String,
    pub region: AtlasRegion,
}

impl TextureRef {
    pub fn new(atlas: impl Into<String>, region: AtlasRegion) -> Self {
        Self {
            atlas: atlas.into(),
            region,
        }
    }
}

/// Per-frame update hook: runs against the entity's own components during
/// world reconciliation.
pub type UpdateFn = Box<dyn FnMut(&mut Components, f32)>;

/// Fixed slot table: at most one component of each kind.
#[derive(Default)]
pub struct Components {
    pub transform: Option<Transform>,
    pub model: Option<Model>,
    pub shader: Option<ShaderRef>,
    pub flat_color: Option<FlatColor>,
    pub multi_color: Option<MultiColor>,
    pub texture: Option<TextureRef>,
}

impl Components {
    /// Presence check by kind, for the world's component filter.
    pub fn has(&self, kind: ComponentKind) -> bool {
        match kind {
            ComponentKind::Transform => self.transform.is_some(),
            ComponentKind::Model => self.model.is_some(),
            ComponentKind::Shader => self.shader.is_some(),
            ComponentKind::FlatColor => self.flat_color.is_some(),
            ComponentKind::MultiColor => self.multi_color.is_some(),
            ComponentKind::Texture => self.texture.is_some(),
        }
    }

    /// Whether this entity participates in rendering (has both a model and a
    /// shader reference).
    pub fn is_renderable(&self) -> bool {
        self.model.is_some() && self.shader.is_some()
    }
}

/// A tagged bundle of components with an optional per-frame hook.
///
/// Tags are free-form labels used for filtering ("asteroid", "bullet") and
/// need not be unique. Components are exclusively owned: attaching moves the
/// component in, and nothing else can hold it.
pub struct Entity {
    pub(crate) id: Option<EntityId>,
    tag: String,
    pub components: Components,
    pub(crate) update: Option<UpdateFn>,
}

impl Entity {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            id: None,
            tag: tag.into(),
            components: Components::default(),
            update: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.components.transform = Some(transform);
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.components.model = Some(model);
        self
    }

    pub fn with_shader(mut self, shader: ShaderRef) -> Self {
        self.components.shader = Some(shader);
        self
    }

    pub fn with_flat_color(mut self, color: FlatColor) -> Self {
        self.components.flat_color = Some(color);
        self
    }

    pub fn with_multi_color(mut self, colors: MultiColor) -> Self {
        self.components.multi_color = Some(colors);
        self
    }

    pub fn with_texture(mut self, texture: TextureRef) -> Self {
        self.components.texture = Some(texture);
        self
    }

    /// Attaches the per-frame update hook, called by
    /// [`World::update`](crate::World::update) with the frame delta.
    pub fn with_update(mut self, f: impl FnMut(&mut Components, f32) + 'static) -> Self {
        self.update = Some(Box::new(f));
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The id assigned when this entity was registered, if any.
    pub fn id(&self) -> Option<EntityId> {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_report_presence() {
        let entity = Entity::new("marker").with_model(Model::new("square"));
        assert!(entity.components.has(ComponentKind::Model));
        assert!(!entity.components.has(ComponentKind::Shader));
        assert!(!entity.components.is_renderable());
    }

    #[test]
    fn renderable_needs_model_and_shader() {
        let entity = Entity::new("sprite")
            .with_model(Model::new("square"))
            .with_shader(ShaderRef::new("basic"));
        assert!(entity.components.is_renderable());
    }

    #[test]
    fn atlas_cells_map_row_major() {
        // 4x2 grid, cell 5 is the second cell of the second row.
        let [u, v, w, h] = AtlasRegion::Cell(5).to_uv_rect(4, 2);
        assert_eq!((u, v), (0.25, 0.5));
        assert_eq!((w, h), (0.25, 0.5));
    }
}
