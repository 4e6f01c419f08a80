//! Canonical built-in shader programs.
//!
//! Each constructor returns a ready-to-register [`ShaderProgramSpec`]. The
//! WGSL lives next to this module under `src/shaders/` and is embedded at
//! compile time.
//!
//! All four programs resolve their model matrix per entity; `basic` and
//! `basic_3d` also treat the entity's flat color as a per-entity uniform,
//! while `vertex_color` moves color into the vertex stream instead.

use crate::shader::{AttributeSource, EntityBinding, ShaderProgramSpec, StaticBinding};

/// Flat-colored 2D rendering: position attribute, entity model matrix and
/// entity color uniform.
pub fn basic() -> ShaderProgramSpec {
    ShaderProgramSpec::new("basic", include_str!("shaders/basic2d.wgsl"))
        .attribute("position", 2, AttributeSource::Position)
        .static_uniform("view", StaticBinding::ViewMatrix)
        .static_uniform("projection", StaticBinding::ProjectionMatrix)
        .entity_uniform("model", EntityBinding::ModelMatrix)
        .entity_uniform("color", EntityBinding::FlatColor)
}

/// Flat-colored 3D rendering; the depth-tested sibling of [`basic`].
pub fn basic_3d() -> ShaderProgramSpec {
    ShaderProgramSpec::new("basic_3d", include_str!("shaders/basic3d.wgsl"))
        .attribute("position", 3, AttributeSource::Position)
        .static_uniform("view", StaticBinding::ViewMatrix)
        .static_uniform("projection", StaticBinding::ProjectionMatrix)
        .entity_uniform("model", EntityBinding::ModelMatrix)
        .entity_uniform("color", EntityBinding::FlatColor)
}

/// Per-vertex colored 2D rendering: the entity supplies one color per vertex
/// through its `MultiColor` component.
pub fn vertex_color() -> ShaderProgramSpec {
    ShaderProgramSpec::new("vertex_color", include_str!("shaders/vertex_color2d.wgsl"))
        .attribute("position", 2, AttributeSource::Position)
        .attribute("color", 4, AttributeSource::VertexColor)
        .static_uniform("view", StaticBinding::ViewMatrix)
        .static_uniform("projection", StaticBinding::ProjectionMatrix)
        .entity_uniform("model", EntityBinding::ModelMatrix)
}

/// Textured 2D rendering from an atlas sub-region.
pub fn textured() -> ShaderProgramSpec {
    ShaderProgramSpec::new("textured", include_str!("shaders/textured2d.wgsl"))
        .attribute("position", 2, AttributeSource::Position)
        .attribute("uv", 2, AttributeSource::TexCoord)
        .static_uniform("view", StaticBinding::ViewMatrix)
        .static_uniform("projection", StaticBinding::ProjectionMatrix)
        .static_uniform("atlas", StaticBinding::AtlasTexture)
        .entity_uniform("model", EntityBinding::ModelMatrix)
        .entity_uniform("region", EntityBinding::TexRegion)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_draws_per_entity() {
        assert!(basic().has_entity_uniforms());
        assert!(!basic().samples_atlas());
    }

    #[test]
    fn textured_requires_an_atlas() {
        let spec = textured();
        assert!(spec.samples_atlas());
        assert_eq!(spec.vertex_stride(), 4);
    }
}
