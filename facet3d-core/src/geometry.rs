/// Geometry primitives for 3D rendering
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A vertex is a bare 3D position; color lives on the owning face.
pub type Vertex = Point3<f32>;

/// RGBA color, each channel in 0..=1. Persisted as a `[r, g, b, a]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Scale the color channels by `factor`, leaving alpha alone
    pub fn shade(&self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        Self::new(self.r * factor, self.g * factor, self.b * factor, self.a)
    }

    /// 8-bit channels, clamped
    pub fn to_rgb8(&self) -> (u8, u8, u8) {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        (channel(self.r), channel(self.g), channel(self.b))
    }
}

impl From<[f32; 4]> for Rgba {
    fn from([r, g, b, a]: [f32; 4]) -> Self {
        Self::new(r, g, b, a)
    }
}

impl From<Rgba> for [f32; 4] {
    fn from(c: Rgba) -> Self {
        [c.r, c.g, c.b, c.a]
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::BLACK
    }
}

/// An ordered vertex run drawn as a triangle strip in a single color
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub vertices: Vec<Vertex>,
    pub color: Rgba,
}

impl Face {
    pub fn new(vertices: Vec<Vertex>, color: Rgba) -> Self {
        Self { vertices, color }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Face normal from the winding order, `None` for degenerate triangles
    pub fn calculate_normal(&self) -> Option<Vector3<f32>> {
        let [v0, v1, v2] = self.vertices;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).try_normalize(f32::EPSILON)
    }
}

/// Split a triangle-strip vertex run into its triangles `(i, i+1, i+2)`.
pub fn strip_triangles(vertices: &[Vertex]) -> impl Iterator<Item = Triangle> + '_ {
    vertices
        .windows(3)
        .map(|w| Triangle::new(w[0], w[1], w[2]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_strip_decomposition() {
        let quad = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ];
        let triangles: Vec<_> = strip_triangles(&quad).collect();
        assert_eq!(triangles.len(), 2);
        assert_eq!(triangles[1].vertices[0], quad[1]);

        assert_eq!(strip_triangles(&quad[..2]).count(), 0);
    }

    #[test]
    fn test_degenerate_normal() {
        let p = Point3::new(1.0, 1.0, 1.0);
        assert!(Triangle::new(p, p, p).calculate_normal().is_none());

        let normal = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        )
        .calculate_normal()
        .unwrap();
        assert_relative_eq!(normal, Vector3::z(), epsilon = 1e-6);
    }

    #[test]
    fn test_rgba_array_form() {
        let color: Rgba = serde_json::from_str("[0.25, 0.5, 1.0, 1.0]").unwrap();
        assert_eq!(color, Rgba::new(0.25, 0.5, 1.0, 1.0));
        assert_eq!(serde_json::to_string(&Rgba::WHITE).unwrap(), "[1.0,1.0,1.0,1.0]");
        assert_eq!(Rgba::new(2.0, 0.5, -1.0, 1.0).to_rgb8(), (255, 128, 0));
    }
}
