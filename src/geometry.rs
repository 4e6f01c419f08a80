//! The geometry catalog: immutable named shape definitions.
//!
//! A [`Geometry`] is pure vertex data — a flat position buffer, its
//! dimensionality, a draw mode, and optional texture coordinates. Geometries
//! are registered once during bootstrap in a [`GeometryRegistry`] and shared
//! by reference across every entity that draws the same shape; entities refer
//! to them by name through their `Model` component and never own them.
//!
//! # Example
//!
//! ```
//! use aura::{Geometry, GeometryRegistry, DrawMode, shapes};
//!
//! let mut registry = GeometryRegistry::new();
//! registry.register(shapes::square());
//! registry.register(
//!     Geometry::new("blade", vec![0.0, 0.0, 1.0, 0.0, 0.5, 2.0], 2, DrawMode::Triangles).unwrap(),
//! );
//!
//! assert_eq!(registry.get("square").unwrap().vertex_count(), 6);
//! ```

use std::collections::HashMap;

use thiserror::Error;

/// How a geometry's vertices are assembled into primitives.
///
/// This is the subset expressible on modern GPU APIs; fan- and loop-shaped
/// geometry is pre-expanded into list topologies by the shape constructors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawMode {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
}

/// Errors raised while constructing a [`Geometry`].
///
/// All of these are configuration mistakes in shape data; none are
/// recoverable at runtime.
#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("geometry '{name}': vertex size must be 2 or 3, got {size}")]
    BadVertexSize { name: String, size: u32 },
    #[error("geometry '{name}': {len} floats do not divide into vertices of size {size}")]
    BadVertexData { name: String, len: usize, size: u32 },
    #[error("geometry '{name}': {len} texture coordinate floats for {count} vertices (need {expected})")]
    BadTexCoords {
        name: String,
        len: usize,
        count: u32,
        expected: usize,
    },
}

/// An immutable named shape definition.
#[derive(Clone, Debug)]
pub struct Geometry {
    name: String,
    vertices: Vec<f32>,
    vertex_size: u32,
    vertex_count: u32,
    mode: DrawMode,
    tex_coords: Option<Vec<f32>>,
}

impl Geometry {
    /// Builds a geometry from a flat position buffer.
    ///
    /// `vertex_size` is the dimensionality (2 or 3); the buffer length must be
    /// an exact multiple of it.
    pub fn new(
        name: impl Into<String>,
        vertices: Vec<f32>,
        vertex_size: u32,
        mode: DrawMode,
    ) -> Result<Self, GeometryError> {
        let name = name.into();
        if !(2..=3).contains(&vertex_size) {
            return Err(GeometryError::BadVertexSize {
                name,
                size: vertex_size,
            });
        }
        if vertices.is_empty() || vertices.len() % vertex_size as usize != 0 {
            return Err(GeometryError::BadVertexData {
                name,
                len: vertices.len(),
                size: vertex_size,
            });
        }
        let vertex_count = (vertices.len() / vertex_size as usize) as u32;
        Ok(Self {
            name,
            vertices,
            vertex_size,
            vertex_count,
            mode,
            tex_coords: None,
        })
    }

    /// Attaches a texture coordinate buffer (two floats per vertex).
    pub fn with_tex_coords(mut self, tex_coords: Vec<f32>) -> Result<Self, GeometryError> {
        let expected = self.vertex_count as usize * 2;
        if tex_coords.len() != expected {
            return Err(GeometryError::BadTexCoords {
                name: self.name,
                len: tex_coords.len(),
                count: self.vertex_count,
                expected,
            });
        }
        self.tex_coords = Some(tex_coords);
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The flat position buffer, `vertex_size` floats per vertex.
    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    /// Dimensionality of each position (2 or 3).
    pub fn vertex_size(&self) -> u32 {
        self.vertex_size
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn mode(&self) -> DrawMode {
        self.mode
    }

    /// Texture coordinates, two floats per vertex, if the shape carries them.
    pub fn tex_coords(&self) -> Option<&[f32]> {
        self.tex_coords.as_deref()
    }

    /// The positions of vertex `index`, as a `vertex_size`-long slice.
    pub fn vertex(&self, index: u32) -> &[f32] {
        let size = self.vertex_size as usize;
        let start = index as usize * size;
        &self.vertices[start..start + size]
    }
}

/// Name-keyed store of every geometry the application will draw.
///
/// Populated once during bootstrap and passed by reference into the render
/// core; the render pass never mutates it.
#[derive(Default)]
pub struct GeometryRegistry {
    shapes: HashMap<String, Geometry>,
}

impl GeometryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a geometry under its own name, replacing any previous entry
    /// with the same name.
    pub fn register(&mut self, geometry: Geometry) {
        log::debug!(
            "registered geometry '{}' ({} vertices, {:?})",
            geometry.name(),
            geometry.vertex_count(),
            geometry.mode()
        );
        self.shapes.insert(geometry.name().to_owned(), geometry);
    }

    pub fn get(&self, name: &str) -> Option<&Geometry> {
        self.shapes.get(name)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_count_derived_from_buffer() {
        let g = Geometry::new("tri", vec![0.0; 9], 3, DrawMode::Triangles).unwrap();
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.vertex_size(), 3);
    }

    #[test]
    fn ragged_buffer_is_rejected() {
        let err = Geometry::new("bad", vec![0.0; 7], 2, DrawMode::Triangles).unwrap_err();
        assert!(matches!(err, GeometryError::BadVertexData { .. }));
    }

    #[test]
    fn vertex_size_must_be_planar_or_spatial() {
        let err = Geometry::new("bad", vec![0.0; 8], 4, DrawMode::Triangles).unwrap_err();
        assert!(matches!(err, GeometryError::BadVertexSize { .. }));
    }

    #[test]
    fn tex_coords_must_cover_every_vertex() {
        let g = Geometry::new("quad", vec![0.0; 8], 2, DrawMode::Triangles).unwrap();
        let err = g.with_tex_coords(vec![0.0; 6]).unwrap_err();
        assert!(matches!(err, GeometryError::BadTexCoords { .. }));
    }

    #[test]
    fn registry_lookup_by_name() {
        let mut registry = GeometryRegistry::new();
        registry.register(Geometry::new("dot", vec![0.0, 0.0], 2, DrawMode::Points).unwrap());
        assert!(registry.get("dot").is_some());
        assert!(registry.get("missing").is_none());
    }
}
