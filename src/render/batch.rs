//! Render batching and uniform resolution.
//!
//! Once per frame, [`Batcher::render_frame`] turns the world's live entity
//! set into the minimal ordered sequence of device operations:
//!
//! 1. Entities carrying both a `Model` and a `ShaderRef` are grouped by
//!    (program, geometry) — plus the atlas name for textured programs, so a
//!    batch never switches textures mid-group. Groups keep live-set encounter
//!    order, but programs are iterated outermost so each distinct program is
//!    bound at most once per frame.
//! 2. Each group gets a named vertex buffer holding the geometry's
//!    interleaved attribute data repeated once per entity (per-vertex colors,
//!    when the program wants them, come from each entity's own `MultiColor`).
//!    The buffer is re-uploaded only when its content changed since the last
//!    frame.
//! 3. Uniforms resolve through two typed paths: static bindings once per
//!    group from the active camera, entity bindings separately per entity in
//!    encounter order.
//! 4. Programs with entity uniforms draw once per entity, entity *i* at
//!    vertex offset `i * vertex_count`; programs without them draw the whole
//!    group in one span. The offset of draw *N* and the uniform set of draw
//!    *N* always refer to the same entity — that pairing is the invariant
//!    everything else here serves.
//!
//! Missing components, mismatched color counts, and references to
//! unregistered resources are configuration errors and abort the frame;
//! see [`RenderError`] for the full taxonomy.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use glam::Vec4;

use crate::entity::Entity;
use crate::geometry::{Geometry, GeometryRegistry};
use crate::render::device::{RenderDevice, RenderError, UniformValue};
use crate::render::renderer::{DrawConfig, Renderer, VertexBufferSpec};
use crate::shader::{
    AttributeSource, EntityBinding, ShaderProgramSpec, ShaderRegistry, StaticBinding,
};
use crate::world::World;

/// One (program, geometry[, atlas]) batch, rebuilt every frame.
struct Group<'a> {
    program: &'a ShaderProgramSpec,
    geometry: &'a str,
    atlas: Option<&'a str>,
    entities: Vec<&'a Entity>,
}

/// Converts the world's renderables into device operations, frame by frame.
///
/// The batcher keeps one piece of cross-frame state: the last-uploaded
/// content of every group buffer, so static scenes upload vertex data once
/// and re-draw from the resident buffer thereafter.
#[derive(Default)]
pub struct Batcher {
    buffer_cache: HashMap<String, Vec<f32>>,
}

impl Batcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Renders every renderable entity in `world`. Call between the
    /// renderer's `begin_frame` and `end_frame`.
    pub fn render_frame<D: RenderDevice>(
        &mut self,
        world: &World,
        geometries: &GeometryRegistry,
        shaders: &ShaderRegistry,
        renderer: &mut Renderer<D>,
    ) -> Result<(), RenderError> {
        let camera = world.active_camera();
        let view = camera.view_matrix();
        let projection = camera.projection_matrix();

        // Group in encounter order, programs outermost.
        let mut program_order: Vec<&str> = Vec::new();
        let mut by_program: HashMap<&str, Vec<Group<'_>>> = HashMap::new();

        for entity in world.entities() {
            let components = &entity.components;
            let (Some(model), Some(shader)) = (&components.model, &components.shader) else {
                // Logic-only entity; nothing to draw.
                continue;
            };
            let spec = shaders
                .get(&shader.program)
                .ok_or_else(|| RenderError::UnknownProgram(shader.program.clone()))?;
            let atlas = if spec.samples_atlas() {
                let texture = components.texture.as_ref().ok_or_else(|| {
                    RenderError::MissingComponent {
                        tag: entity.tag().to_owned(),
                        program: spec.name.clone(),
                        component: "texture",
                    }
                })?;
                Some(texture.atlas.as_str())
            } else {
                None
            };

            let groups = match by_program.entry(spec.name.as_str()) {
                Entry::Occupied(slot) => slot.into_mut(),
                Entry::Vacant(slot) => {
                    program_order.push(spec.name.as_str());
                    slot.insert(Vec::new())
                }
            };
            match groups
                .iter_mut()
                .find(|g| g.geometry == model.geometry && g.atlas == atlas)
            {
                Some(group) => group.entities.push(entity),
                None => groups.push(Group {
                    program: spec,
                    geometry: &model.geometry,
                    atlas,
                    entities: vec![entity],
                }),
            }
        }

        for program in &program_order {
            for group in &by_program[program] {
                self.draw_group(group, geometries, renderer, view, projection)?;
            }
        }
        Ok(())
    }

    fn draw_group<D: RenderDevice>(
        &mut self,
        group: &Group<'_>,
        geometries: &GeometryRegistry,
        renderer: &mut Renderer<D>,
        view: glam::Mat4,
        projection: glam::Mat4,
    ) -> Result<(), RenderError> {
        let spec = group.program;
        let geometry = geometries
            .get(group.geometry)
            .ok_or_else(|| RenderError::UnknownGeometry(group.geometry.to_owned()))?;

        let buffer_name = match group.atlas {
            Some(atlas) => format!("{}:{}:{}", spec.name, geometry.name(), atlas),
            None => format!("{}:{}", spec.name, geometry.name()),
        };
        renderer.create_vbo(&buffer_name)?;

        let data = build_group_vertices(spec, geometry, &group.entities)?;
        let changed = self
            .buffer_cache
            .get(&buffer_name)
            .map(|cached| *cached != data)
            .unwrap_or(true);
        if changed {
            self.buffer_cache.insert(buffer_name.clone(), data.clone());
        }

        let static_values = resolve_static(spec, view, projection);
        let entity_values = resolve_entity(spec, renderer, &group.entities)?;

        renderer.render(&DrawConfig {
            program: &spec.name,
            buffer: VertexBufferSpec {
                name: &buffer_name,
                data: &data,
                changed,
                mode: geometry.mode(),
                vertex_count: geometry.vertex_count(),
            },
            entity_count: group.entities.len() as u32,
            static_values,
            entity_values,
            atlas: group.atlas,
        })
    }
}

/// Builds a group's vertex buffer: the geometry's attributes, interleaved in
/// the program's declared order, repeated once per entity.
fn build_group_vertices(
    spec: &ShaderProgramSpec,
    geometry: &Geometry,
    entities: &[&Entity],
) -> Result<Vec<f32>, RenderError> {
    // Attribute-level validation is per group, not per entity.
    for attribute in &spec.attributes {
        match attribute.source {
            AttributeSource::Position => {
                if attribute.components != geometry.vertex_size() {
                    return Err(RenderError::PositionSizeMismatch {
                        program: spec.name.clone(),
                        geometry: geometry.name().to_owned(),
                        expected: attribute.components,
                        actual: geometry.vertex_size(),
                    });
                }
            }
            AttributeSource::TexCoord => {
                if geometry.tex_coords().is_none() {
                    return Err(RenderError::MissingTexCoords {
                        program: spec.name.clone(),
                        geometry: geometry.name().to_owned(),
                    });
                }
            }
            AttributeSource::VertexColor => {}
        }
    }

    let vertex_count = geometry.vertex_count();
    let stride = spec.vertex_stride() as usize;
    let mut data = Vec::with_capacity(entities.len() * vertex_count as usize * stride);

    for entity in entities {
        let colors = if spec
            .attributes
            .iter()
            .any(|a| a.source == AttributeSource::VertexColor)
        {
            let multi = entity.components.multi_color.as_ref().ok_or_else(|| {
                RenderError::MissingComponent {
                    tag: entity.tag().to_owned(),
                    program: spec.name.clone(),
                    component: "multi color",
                }
            })?;
            if multi.0.len() != vertex_count as usize {
                return Err(RenderError::VertexColorMismatch {
                    tag: entity.tag().to_owned(),
                    geometry: geometry.name().to_owned(),
                    got: multi.0.len(),
                    want: vertex_count,
                });
            }
            Some(&multi.0)
        } else {
            None
        };

        for v in 0..vertex_count {
            for attribute in &spec.attributes {
                match attribute.source {
                    AttributeSource::Position => data.extend_from_slice(geometry.vertex(v)),
                    AttributeSource::TexCoord => {
                        let tc = geometry.tex_coords().expect("validated above");
                        let i = v as usize * 2;
                        data.extend_from_slice(&tc[i..i + 2]);
                    }
                    AttributeSource::VertexColor => {
                        let colors = colors.expect("validated above");
                        data.extend_from_slice(&colors[v as usize].to_array());
                    }
                }
            }
        }
    }
    Ok(data)
}

/// Resolves the batch-constant uniforms from the render context.
fn resolve_static(
    spec: &ShaderProgramSpec,
    view: glam::Mat4,
    projection: glam::Mat4,
) -> Vec<(&str, UniformValue)> {
    spec.static_uniforms
        .iter()
        .filter_map(|uniform| match uniform.binding {
            StaticBinding::ViewMatrix => {
                Some((uniform.name.as_str(), UniformValue::Mat4(view)))
            }
            StaticBinding::ProjectionMatrix => {
                Some((uniform.name.as_str(), UniformValue::Mat4(projection)))
            }
            // The atlas is bound as a texture, not uploaded as block bytes.
            StaticBinding::AtlasTexture => None,
        })
        .collect()
}

/// Resolves the per-entity uniform sets, one per entity, in draw order.
fn resolve_entity<'s, D: RenderDevice>(
    spec: &'s ShaderProgramSpec,
    renderer: &Renderer<D>,
    entities: &[&Entity],
) -> Result<Vec<Vec<(&'s str, UniformValue)>>, RenderError> {
    if spec.entity_uniforms.is_empty() {
        return Ok(Vec::new());
    }

    let mut sets = Vec::with_capacity(entities.len());
    for entity in entities {
        let components = &entity.components;
        let mut values = Vec::with_capacity(spec.entity_uniforms.len());
        for uniform in &spec.entity_uniforms {
            let value = match uniform.binding {
                EntityBinding::ModelMatrix => {
                    let transform = components.transform.as_ref().ok_or_else(|| {
                        RenderError::MissingComponent {
                            tag: entity.tag().to_owned(),
                            program: spec.name.clone(),
                            component: "transform",
                        }
                    })?;
                    UniformValue::Mat4(transform.matrix())
                }
                EntityBinding::FlatColor => {
                    let color = components.flat_color.as_ref().ok_or_else(|| {
                        RenderError::MissingComponent {
                            tag: entity.tag().to_owned(),
                            program: spec.name.clone(),
                            component: "flat color",
                        }
                    })?;
                    UniformValue::Vec4(color.0.into())
                }
                EntityBinding::TexRegion => {
                    let texture = components.texture.as_ref().ok_or_else(|| {
                        RenderError::MissingComponent {
                            tag: entity.tag().to_owned(),
                            program: spec.name.clone(),
                            component: "texture",
                        }
                    })?;
                    let (columns, rows) = renderer.atlas_grid(&texture.atlas)?;
                    UniformValue::Vec4(Vec4::from(texture.region.to_uv_rect(columns, rows)))
                }
            };
            values.push((uniform.name.as_str(), value));
        }
        sets.push(values);
    }
    Ok(sets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::entity::{Entity, FlatColor, Model, MultiColor, ShaderRef};
    use crate::programs;
    use crate::render::recording::{DeviceCall, RecordingDevice};
    use crate::shapes;
    use crate::transform::Transform;
    use glam::{Vec2, Vec3};

    struct Rig {
        world: World,
        geometries: GeometryRegistry,
        shaders: ShaderRegistry,
        renderer: Renderer<RecordingDevice>,
        batcher: Batcher,
    }

    /// A program with no entity uniforms: the pure-batching fast path.
    fn span_program() -> ShaderProgramSpec {
        ShaderProgramSpec::new("span", "")
            .attribute("position", 2, AttributeSource::Position)
            .static_uniform("view", StaticBinding::ViewMatrix)
            .static_uniform("projection", StaticBinding::ProjectionMatrix)
    }

    fn rig() -> Rig {
        let mut geometries = GeometryRegistry::new();
        geometries.register(shapes::square());
        geometries.register(shapes::triangle());

        let mut shaders = ShaderRegistry::new();
        let mut renderer = Renderer::new(RecordingDevice::new());
        for spec in [programs::basic(), programs::vertex_color(), span_program()] {
            renderer.register_program(&spec).unwrap();
            shaders.register(spec);
        }

        Rig {
            world: World::new(Vec2::new(100.0, 100.0)),
            geometries,
            shaders,
            renderer,
            batcher: Batcher::new(),
        }
    }

    fn square_entity(program: &str, color: Color) -> Entity {
        Entity::new("square")
            .with_transform(Transform::new())
            .with_model(Model::new("square"))
            .with_shader(ShaderRef::new(program))
            .with_flat_color(FlatColor(color))
    }

    fn render(rig: &mut Rig) -> Result<(), RenderError> {
        rig.world.update(0.016);
        rig.batcher.render_frame(
            &rig.world,
            &rig.geometries,
            &rig.shaders,
            &mut rig.renderer,
        )
    }

    #[test]
    fn no_entity_uniforms_draws_one_span() {
        let mut rig = rig();
        for _ in 0..3 {
            rig.world.add_entity(
                Entity::new("tile")
                    .with_model(Model::new("square"))
                    .with_shader(ShaderRef::new("span")),
            );
        }
        render(&mut rig).unwrap();

        let draws = rig.renderer.device().draws();
        assert_eq!(draws.len(), 1);
        assert_eq!(
            draws[0],
            &DeviceCall::Draw {
                mode: crate::geometry::DrawMode::Triangles,
                first_vertex: 0,
                vertex_count: 18,
            }
        );
    }

    #[test]
    fn entity_uniforms_draw_once_per_entity_in_encounter_order() {
        let mut rig = rig();
        rig.world.add_entity(square_entity("basic", Color::RED));
        rig.world.add_entity(square_entity("basic", Color::BLUE));
        render(&mut rig).unwrap();

        // Exactly two draws, at offsets 0 and 6 into the shared buffer.
        let draws = rig.renderer.device().draws();
        assert_eq!(draws.len(), 2);
        assert_eq!(
            draws[0],
            &DeviceCall::Draw {
                mode: crate::geometry::DrawMode::Triangles,
                first_vertex: 0,
                vertex_count: 6,
            }
        );
        assert_eq!(
            draws[1],
            &DeviceCall::Draw {
                mode: crate::geometry::DrawMode::Triangles,
                first_vertex: 6,
                vertex_count: 6,
            }
        );

        // Each draw is preceded by that entity's color, red then blue.
        let mut color_before_draw = Vec::new();
        let mut last_color = None;
        for call in rig.renderer.device().calls() {
            match call {
                DeviceCall::SetUniform { name, value, .. } if name == "color" => {
                    last_color = Some(*value);
                }
                DeviceCall::Draw { .. } => color_before_draw.push(last_color.unwrap()),
                _ => {}
            }
        }
        assert_eq!(
            color_before_draw,
            vec![
                UniformValue::Vec4(Color::RED.into()),
                UniformValue::Vec4(Color::BLUE.into()),
            ]
        );
    }

    #[test]
    fn each_program_binds_at_most_once_per_frame() {
        let mut rig = rig();
        // Interleave programs and geometries so naive encounter-order
        // grouping would rebind "basic" twice.
        rig.world.add_entity(square_entity("basic", Color::RED));
        rig.world.add_entity(
            Entity::new("tile")
                .with_model(Model::new("square"))
                .with_shader(ShaderRef::new("span")),
        );
        rig.world.add_entity(
            Entity::new("tri")
                .with_transform(Transform::new())
                .with_model(Model::new("triangle"))
                .with_shader(ShaderRef::new("basic"))
                .with_flat_color(FlatColor(Color::GREEN)),
        );
        render(&mut rig).unwrap();

        let binds = rig
            .renderer
            .device()
            .count(|c| matches!(c, DeviceCall::BindProgram { .. }));
        assert_eq!(binds, 2); // two distinct programs in the frame
    }

    #[test]
    fn non_renderable_entities_are_skipped_not_errors() {
        let mut rig = rig();
        rig.world.add_entity(Entity::new("logic-marker"));
        rig.world.add_entity(square_entity("basic", Color::RED));
        render(&mut rig).unwrap();
        assert_eq!(rig.renderer.device().draws().len(), 1);
    }

    #[test]
    fn vertex_color_count_mismatch_is_fatal() {
        let mut rig = rig();
        rig.world.add_entity(
            Entity::new("bad")
                .with_transform(Transform::new())
                .with_model(Model::new("square"))
                .with_shader(ShaderRef::new("vertex_color"))
                .with_multi_color(MultiColor(vec![Color::RED; 4])), // square has 6
        );
        let err = render(&mut rig).unwrap_err();
        assert!(matches!(
            err,
            RenderError::VertexColorMismatch { got: 4, want: 6, .. }
        ));
        // Nothing was drawn.
        assert!(rig.renderer.device().draws().is_empty());
    }

    #[test]
    fn unknown_geometry_fails_fast_with_its_name() {
        let mut rig = rig();
        rig.world.add_entity(
            Entity::new("ghost")
                .with_transform(Transform::new())
                .with_model(Model::new("dodecahedron"))
                .with_shader(ShaderRef::new("basic"))
                .with_flat_color(FlatColor(Color::WHITE)),
        );
        let err = render(&mut rig).unwrap_err();
        assert!(matches!(err, RenderError::UnknownGeometry(name) if name == "dodecahedron"));
    }

    #[test]
    fn unknown_program_fails_fast_with_its_name() {
        let mut rig = rig();
        rig.world.add_entity(
            Entity::new("ghost")
                .with_model(Model::new("square"))
                .with_shader(ShaderRef::new("phantom")),
        );
        let err = render(&mut rig).unwrap_err();
        assert!(matches!(err, RenderError::UnknownProgram(name) if name == "phantom"));
    }

    #[test]
    fn textured_program_requires_a_texture_component() {
        let mut rig = rig();
        let spec = programs::textured();
        rig.renderer.register_program(&spec).unwrap();
        rig.shaders.register(spec);

        rig.world.add_entity(
            Entity::new("untextured")
                .with_transform(Transform::new())
                .with_model(Model::new("square"))
                .with_shader(ShaderRef::new("textured")),
        );
        let err = render(&mut rig).unwrap_err();
        assert!(matches!(
            err,
            RenderError::MissingComponent { component: "texture", .. }
        ));
    }

    #[test]
    fn missing_transform_for_model_matrix_is_fatal() {
        let mut rig = rig();
        rig.world.add_entity(
            Entity::new("nowhere")
                .with_model(Model::new("square"))
                .with_shader(ShaderRef::new("basic"))
                .with_flat_color(FlatColor(Color::WHITE)),
        );
        let err = render(&mut rig).unwrap_err();
        assert!(matches!(
            err,
            RenderError::MissingComponent { component: "transform", .. }
        ));
    }

    #[test]
    fn static_scene_uploads_vertex_data_once() {
        let mut rig = rig();
        rig.world.add_entity(square_entity("basic", Color::RED));

        render(&mut rig).unwrap();
        render(&mut rig).unwrap();

        let uploads = rig
            .renderer
            .device()
            .count(|c| matches!(c, DeviceCall::UploadVertices { .. }));
        assert_eq!(uploads, 1);
    }

    #[test]
    fn growing_a_group_reuploads_its_buffer() {
        let mut rig = rig();
        rig.world.add_entity(square_entity("basic", Color::RED));
        render(&mut rig).unwrap();

        rig.world.add_entity(square_entity("basic", Color::BLUE));
        render(&mut rig).unwrap();

        let uploads: Vec<_> = rig
            .renderer
            .device()
            .calls()
            .iter()
            .filter_map(|c| match c {
                DeviceCall::UploadVertices { floats, .. } => Some(*floats),
                _ => None,
            })
            .collect();
        // 6 vertices × 2 floats, then twice that once the group has 2 entities.
        assert_eq!(uploads, vec![12, 24]);
    }

    #[test]
    fn per_vertex_colors_interleave_into_the_buffer() {
        let mut rig = rig();
        rig.world.add_entity(
            Entity::new("gradient")
                .with_transform(Transform::new())
                .with_model(Model::new("triangle"))
                .with_shader(ShaderRef::new("vertex_color"))
                .with_multi_color(MultiColor(vec![Color::RED, Color::GREEN, Color::BLUE])),
        );
        render(&mut rig).unwrap();

        // Stride is 2 (position) + 4 (color): 18 floats for one triangle.
        let uploads = rig
            .renderer
            .device()
            .count(|c| matches!(c, DeviceCall::UploadVertices { floats: 18, .. }));
        assert_eq!(uploads, 1);
    }

    #[test]
    fn transform_mutation_before_render_is_visible_in_uniforms() {
        let mut rig = rig();
        let id = rig.world.add_entity(square_entity("basic", Color::RED));
        rig.world.update(0.016);

        // Mutate after reconciliation, before the render pass.
        rig.world
            .entity_mut(id)
            .unwrap()
            .components
            .transform
            .as_mut()
            .unwrap()
            .set_position(Vec3::new(42.0, 0.0, 0.0));

        rig.batcher
            .render_frame(&rig.world, &rig.geometries, &rig.shaders, &mut rig.renderer)
            .unwrap();

        let model = rig
            .renderer
            .device()
            .calls()
            .iter()
            .find_map(|c| match c {
                DeviceCall::SetUniform { name, value, .. } if name == "model" => Some(*value),
                _ => None,
            })
            .unwrap();
        match model {
            UniformValue::Mat4(m) => assert_eq!(m.w_axis.x, 42.0),
            _ => panic!("model matrix should be a Mat4"),
        }
    }
}
