//! RGBA color values used by color components and the renderer.

/// An RGBA color with `f32` channels in the `[0, 1]` range.
///
/// Colors flow through the engine in three places: as the clear color of a
/// frame, as the `FlatColor` component (one color per entity, uploaded as a
/// uniform), and as the `MultiColor` component (one color per vertex,
/// interleaved into the vertex buffer).
///
/// # Example
///
/// ```
/// use aura::Color;
///
/// let tint = Color::rgba(1.0, 0.5, 0.0, 1.0);
/// let opaque = Color::rgb(0.2, 0.2, 0.25);
/// assert_eq!(Color::RED.to_array(), [1.0, 0.0, 0.0, 1.0]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const RED: Color = Color::rgba(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::rgba(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::rgba(0.0, 0.0, 1.0, 1.0);
    pub const YELLOW: Color = Color::rgba(1.0, 1.0, 0.0, 1.0);
    pub const CYAN: Color = Color::rgba(0.0, 1.0, 1.0, 1.0);
    pub const MAGENTA: Color = Color::rgba(1.0, 0.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Returns the channels as `[r, g, b, a]`, the layout uniform uploads use.
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Converts to 8-bit RGBA texel bytes, clamping each channel.
    pub fn to_rgba8(self) -> [u8; 4] {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }
}

impl From<Color> for glam::Vec4 {
    fn from(c: Color) -> Self {
        glam::Vec4::new(c.r, c.g, c.b, c.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgba8_quantization_clamps() {
        assert_eq!(Color::rgba(0.0, 0.5, 1.0, 2.0).to_rgba8(), [0, 128, 255, 255]);
        assert_eq!(Color::rgba(-1.0, 0.0, 0.0, 1.0).to_rgba8(), [0, 0, 0, 255]);
    }
}
