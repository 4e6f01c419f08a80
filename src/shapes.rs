//! Canonical built-in shapes for the geometry catalog.
//!
//! Every constructor returns a ready-to-register [`Geometry`]. 2D shapes are
//! unit-sized and centered at the origin so a transform's scale gives them
//! their world size; all triangle shapes wind counter-clockwise.

use std::f32::consts::TAU;

use crate::geometry::{DrawMode, Geometry};

/// A single point at the origin.
pub fn point() -> Geometry {
    Geometry::new("point", vec![0.0, 0.0], 2, DrawMode::Points)
        .expect("built-in shape data is well-formed")
}

/// A unit line segment along the X axis, centered at the origin.
pub fn line() -> Geometry {
    Geometry::new("line", vec![-0.5, 0.0, 0.5, 0.0], 2, DrawMode::Lines)
        .expect("built-in shape data is well-formed")
}

/// A unit triangle, CCW.
pub fn triangle() -> Geometry {
    #[rustfmt::skip]
    let vertices = vec![
        -0.5, -0.5,
         0.5, -0.5,
         0.0,  0.5,
    ];
    Geometry::new("triangle", vertices, 2, DrawMode::Triangles)
        .expect("built-in shape data is well-formed")
}

/// A unit square as two CCW triangles (6 vertices), with texture coordinates
/// covering the full `[0,1]` range.
pub fn square() -> Geometry {
    #[rustfmt::skip]
    let vertices = vec![
        -0.5, -0.5,
         0.5, -0.5,
         0.5,  0.5,

         0.5,  0.5,
        -0.5,  0.5,
        -0.5, -0.5,
    ];
    #[rustfmt::skip]
    let tex_coords = vec![
        0.0, 0.0,
        1.0, 0.0,
        1.0, 1.0,

        1.0, 1.0,
        0.0, 1.0,
        0.0, 0.0,
    ];
    Geometry::new("square", vertices, 2, DrawMode::Triangles)
        .and_then(|g| g.with_tex_coords(tex_coords))
        .expect("built-in shape data is well-formed")
}

/// A regular `sides`-gon of unit diameter, pre-expanded into a triangle list
/// (one triangle per side, all sharing the center).
///
/// # Panics
///
/// Panics if `sides < 3`.
pub fn polygon(sides: u32) -> Geometry {
    assert!(sides >= 3, "a polygon needs at least 3 sides");

    let mut vertices = Vec::with_capacity(sides as usize * 6);
    for i in 0..sides {
        let a0 = TAU * i as f32 / sides as f32;
        let a1 = TAU * (i + 1) as f32 / sides as f32;
        vertices.extend_from_slice(&[
            0.0,
            0.0,
            0.5 * a0.cos(),
            0.5 * a0.sin(),
            0.5 * a1.cos(),
            0.5 * a1.sin(),
        ]);
    }
    Geometry::new(format!("polygon{sides}"), vertices, 2, DrawMode::Triangles)
        .expect("built-in shape data is well-formed")
}

/// A unit cube as 36 CCW triangle-list vertices, positions only.
pub fn cube() -> Geometry {
    #[rustfmt::skip]
    let vertices = vec![
        // Front face (Z+)
        -0.5, -0.5,  0.5,   0.5, -0.5,  0.5,   0.5,  0.5,  0.5,
         0.5,  0.5,  0.5,  -0.5,  0.5,  0.5,  -0.5, -0.5,  0.5,
        // Back face (Z-)
         0.5, -0.5, -0.5,  -0.5, -0.5, -0.5,  -0.5,  0.5, -0.5,
        -0.5,  0.5, -0.5,   0.5,  0.5, -0.5,   0.5, -0.5, -0.5,
        // Top face (Y+)
        -0.5,  0.5,  0.5,   0.5,  0.5,  0.5,   0.5,  0.5, -0.5,
         0.5,  0.5, -0.5,  -0.5,  0.5, -0.5,  -0.5,  0.5,  0.5,
        // Bottom face (Y-)
        -0.5, -0.5, -0.5,   0.5, -0.5, -0.5,   0.5, -0.5,  0.5,
         0.5, -0.5,  0.5,  -0.5, -0.5,  0.5,  -0.5, -0.5, -0.5,
        // Right face (X+)
         0.5, -0.5,  0.5,   0.5, -0.5, -0.5,   0.5,  0.5, -0.5,
         0.5,  0.5, -0.5,   0.5,  0.5,  0.5,   0.5, -0.5,  0.5,
        // Left face (X-)
        -0.5, -0.5, -0.5,  -0.5, -0.5,  0.5,  -0.5,  0.5,  0.5,
        -0.5,  0.5,  0.5,  -0.5,  0.5, -0.5,  -0.5, -0.5, -0.5,
    ];
    Geometry::new("cube", vertices, 3, DrawMode::Triangles)
        .expect("built-in shape data is well-formed")
}

/// A unit cube's 12 edges as a line list (24 vertices).
pub fn cube_wireframe() -> Geometry {
    let corners: [[f32; 3]; 8] = [
        [-0.5, -0.5, -0.5],
        [0.5, -0.5, -0.5],
        [0.5, 0.5, -0.5],
        [-0.5, 0.5, -0.5],
        [-0.5, -0.5, 0.5],
        [0.5, -0.5, 0.5],
        [0.5, 0.5, 0.5],
        [-0.5, 0.5, 0.5],
    ];
    #[rustfmt::skip]
    let edges: [(usize, usize); 12] = [
        (0, 1), (1, 2), (2, 3), (3, 0), // back ring
        (4, 5), (5, 6), (6, 7), (7, 4), // front ring
        (0, 4), (1, 5), (2, 6), (3, 7), // connecting edges
    ];

    let mut vertices = Vec::with_capacity(edges.len() * 6);
    for (a, b) in edges {
        vertices.extend_from_slice(&corners[a]);
        vertices.extend_from_slice(&corners[b]);
    }
    Geometry::new("cube_wireframe", vertices, 3, DrawMode::Lines)
        .expect("built-in shape data is well-formed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_has_six_textured_vertices() {
        let square = square();
        assert_eq!(square.vertex_count(), 6);
        assert_eq!(square.tex_coords().unwrap().len(), 12);
    }

    #[test]
    fn cube_has_thirty_six_vertices() {
        assert_eq!(cube().vertex_count(), 36);
        assert_eq!(cube().vertex_size(), 3);
    }

    #[test]
    fn polygon_expands_to_triangle_list() {
        let hex = polygon(6);
        assert_eq!(hex.vertex_count(), 18);
        assert_eq!(hex.mode(), DrawMode::Triangles);
    }

    #[test]
    fn wireframe_cube_draws_twelve_edges() {
        let wire = cube_wireframe();
        assert_eq!(wire.vertex_count(), 24);
        assert_eq!(wire.mode(), DrawMode::Lines);
    }
}
