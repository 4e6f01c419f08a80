//! The shader catalog: program specifications and their uniform model.
//!
//! A [`ShaderProgramSpec`] names a WGSL module and declares, up front,
//! everything the render core needs to drive it:
//!
//! - **attributes** — per-vertex inputs in buffer order, each tied to a typed
//!   [`AttributeSource`] (geometry positions, geometry UVs, or an entity's
//!   per-vertex colors);
//! - **static uniforms** — values resolved once per batch from the render
//!   context ([`StaticBinding`]: view matrix, projection matrix, the bound
//!   atlas);
//! - **entity uniforms** — values resolved per entity, in draw order
//!   ([`EntityBinding`]: model matrix, flat color, atlas region).
//!
//! Keeping static and entity declarations in two separate lists means the
//! batcher never inspects a variation tag on the hot path: each list goes
//! through its own typed resolver.
//!
//! Specs are immutable once registered in a [`ShaderRegistry`]; the renderer
//! backend compiles each exactly once, before the frame loop starts.

use std::collections::HashMap;

/// What feeds a vertex attribute when the batcher builds a group's buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeSource {
    /// The geometry's position buffer (`vertex_size` floats per vertex).
    Position,
    /// The geometry's texture coordinates (two floats per vertex).
    TexCoord,
    /// The entity's `MultiColor` component (four floats per vertex).
    VertexColor,
}

/// A per-vertex input declared by a program's vertex stage.
///
/// Attributes are interleaved in declaration order; `components` must match
/// the WGSL `@location` type (and, for [`AttributeSource::Position`], the
/// geometry's vertex size).
#[derive(Clone, Debug)]
pub struct AttributeSpec {
    pub name: String,
    pub components: u32,
    pub source: AttributeSource,
}

/// Batch-constant uniform sources, resolved once per group.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StaticBinding {
    /// The active camera's view matrix.
    ViewMatrix,
    /// The active camera's projection matrix.
    ProjectionMatrix,
    /// The texture atlas sampled by the fragment stage. Carries no buffer
    /// bytes; its presence obliges every entity in the batch to have a
    /// `TextureRef` component.
    AtlasTexture,
}

/// Per-entity uniform sources, resolved separately for each entity in draw
/// order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityBinding {
    /// The entity transform's model matrix (`Mat4`).
    ModelMatrix,
    /// The entity's `FlatColor` component (`Vec4`).
    FlatColor,
    /// The entity's atlas sub-region as `(u, v, width, height)` (`Vec4`).
    TexRegion,
}

#[derive(Clone, Debug)]
pub struct StaticUniform {
    pub name: String,
    pub binding: StaticBinding,
}

#[derive(Clone, Debug)]
pub struct EntityUniform {
    pub name: String,
    pub binding: EntityBinding,
}

/// An immutable shader program specification.
///
/// `source` is a complete WGSL module with `vs_main` and `fs_main` entry
/// points. Buffer-backed uniforms live in a single uniform struct at
/// `@group(0) @binding(0)`, declared in static-then-entity order; a sampled
/// atlas occupies `@group(1)` bindings 0 (texture) and 1 (sampler).
///
/// # Example
///
/// ```
/// use aura::{ShaderProgramSpec, AttributeSource, StaticBinding, EntityBinding};
///
/// let spec = ShaderProgramSpec::new("glow", "/* wgsl */")
///     .attribute("position", 2, AttributeSource::Position)
///     .static_uniform("view", StaticBinding::ViewMatrix)
///     .static_uniform("projection", StaticBinding::ProjectionMatrix)
///     .entity_uniform("model", EntityBinding::ModelMatrix)
///     .entity_uniform("color", EntityBinding::FlatColor);
///
/// assert!(spec.has_entity_uniforms());
/// assert!(!spec.samples_atlas());
/// ```
#[derive(Clone, Debug)]
pub struct ShaderProgramSpec {
    pub name: String,
    pub source: String,
    pub attributes: Vec<AttributeSpec>,
    pub static_uniforms: Vec<StaticUniform>,
    pub entity_uniforms: Vec<EntityUniform>,
}

impl ShaderProgramSpec {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            attributes: Vec::new(),
            static_uniforms: Vec::new(),
            entity_uniforms: Vec::new(),
        }
    }

    pub fn attribute(
        mut self,
        name: impl Into<String>,
        components: u32,
        source: AttributeSource,
    ) -> Self {
        self.attributes.push(AttributeSpec {
            name: name.into(),
            components,
            source,
        });
        self
    }

    pub fn static_uniform(mut self, name: impl Into<String>, binding: StaticBinding) -> Self {
        self.static_uniforms.push(StaticUniform {
            name: name.into(),
            binding,
        });
        self
    }

    pub fn entity_uniform(mut self, name: impl Into<String>, binding: EntityBinding) -> Self {
        self.entity_uniforms.push(EntityUniform {
            name: name.into(),
            binding,
        });
        self
    }

    /// Whether the fragment stage samples a texture atlas.
    pub fn samples_atlas(&self) -> bool {
        self.static_uniforms
            .iter()
            .any(|u| u.binding == StaticBinding::AtlasTexture)
    }

    /// Whether any uniform must be re-resolved per entity. Decides between
    /// one draw per entity and a single batch-spanning draw.
    pub fn has_entity_uniforms(&self) -> bool {
        !self.entity_uniforms.is_empty()
    }

    /// Interleaved vertex stride in floats.
    pub fn vertex_stride(&self) -> u32 {
        self.attributes.iter().map(|a| a.components).sum()
    }
}

/// Name-keyed store of every shader program the application will use.
///
/// Like the geometry registry: populated during bootstrap, read-only after.
#[derive(Default)]
pub struct ShaderRegistry {
    programs: HashMap<String, ShaderProgramSpec>,
}

impl ShaderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: ShaderProgramSpec) {
        log::debug!(
            "registered shader program '{}' ({} static, {} entity uniforms)",
            spec.name,
            spec.static_uniforms.len(),
            spec.entity_uniforms.len()
        );
        self.programs.insert(spec.name.clone(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&ShaderProgramSpec> {
        self.programs.get(name)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_sums_attribute_components() {
        let spec = ShaderProgramSpec::new("p", "")
            .attribute("position", 2, AttributeSource::Position)
            .attribute("uv", 2, AttributeSource::TexCoord)
            .attribute("tint", 4, AttributeSource::VertexColor);
        assert_eq!(spec.vertex_stride(), 8);
    }

    #[test]
    fn atlas_detection_reads_static_list() {
        let plain = ShaderProgramSpec::new("plain", "")
            .static_uniform("view", StaticBinding::ViewMatrix);
        assert!(!plain.samples_atlas());

        let textured = plain.clone().static_uniform("atlas", StaticBinding::AtlasTexture);
        assert!(textured.samples_atlas());
    }
}
