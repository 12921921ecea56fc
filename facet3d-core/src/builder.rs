/// Procedural mesh construction: tessellated spheres and normalized sketches
use log::{debug, warn};
use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_4, PI, TAU};
use std::fs;
use std::path::Path;

use crate::error::{Result, SceneError};
use crate::geometry::{Face, Rgba, Vertex};
use crate::mesh_file::{MeshFile, NamedMesh};

pub const DEFAULT_SECTORS: u32 = 32;
pub const DEFAULT_STACKS: u32 = 32;

/// Built-in sphere shaping functions.
///
/// Shaping functions map `(origin, u, v, radius)` to a point, where `u` is the
/// longitude angle in `[0, 2π]` and `v` the latitude angle in `[0, π]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SphereShape {
    /// Plain spherical-to-Cartesian conversion
    #[default]
    Full,
    /// Collapses the `u < π/4` wedge onto the origin, leaving a crescent
    Crescent,
    /// Collapses the `π/4 < v < 3π/4` band onto the origin, leaving two caps
    Beam,
}

impl SphereShape {
    pub fn point(self, origin: Point2<f32>, u: f32, v: f32, radius: f32) -> Vertex {
        match self {
            SphereShape::Full => spherical_point(origin, u, v, radius),
            SphereShape::Crescent if u < FRAC_PI_4 => collapsed_point(origin),
            SphereShape::Beam if FRAC_PI_4 < v && v < 3.0 * FRAC_PI_4 => collapsed_point(origin),
            _ => spherical_point(origin, u, v, radius),
        }
    }
}

/// `x = x0 + r·sin(v)·cos(u)`, `y = y0 + r·sin(v)·sin(u)`, `z = r·cos(v)`
pub fn spherical_point(origin: Point2<f32>, u: f32, v: f32, radius: f32) -> Vertex {
    Point3::new(
        origin.x + radius * v.sin() * u.cos(),
        origin.y + radius * v.sin() * u.sin(),
        radius * v.cos(),
    )
}

fn collapsed_point(origin: Point2<f32>) -> Vertex {
    Point3::new(origin.x, origin.y, 0.0)
}

/// Sphere tessellator with a fixed sector/stack resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshBuilder {
    sectors: u32,
    stacks: u32,
}

impl MeshBuilder {
    /// Zero counts are raised to one
    pub fn new(sectors: u32, stacks: u32) -> Self {
        if sectors == 0 || stacks == 0 {
            warn!("Sphere resolution {}x{} raised to at least 1x1", sectors, stacks);
        }
        Self {
            sectors: sectors.max(1),
            stacks: stacks.max(1),
        }
    }

    pub fn sectors(&self) -> u32 {
        self.sectors
    }

    pub fn stacks(&self) -> u32 {
        self.stacks
    }

    /// Vertices emitted per sphere: two triangles per sector/stack cell
    pub fn sphere_vertex_count(&self) -> usize {
        self.sectors as usize * self.stacks as usize * 6
    }

    /// Tessellate a sphere into a flat triangle list.
    ///
    /// Each cell emits `p0, p2, p1` then `p3, p1, p2`. The closing sector and
    /// stack use exactly `2π` and `π` so the seam has no wraparound error.
    pub fn generate_sphere<F>(&self, origin: Point2<f32>, radius: f32, shape: F) -> Vec<Vertex>
    where
        F: Fn(Point2<f32>, f32, f32, f32) -> Vertex,
    {
        let sector_step = TAU / self.sectors as f32;
        let stack_step = PI / self.stacks as f32;

        let mut vertices = Vec::with_capacity(self.sphere_vertex_count());
        for i in 0..self.sectors {
            for j in 0..self.stacks {
                let u = i as f32 * sector_step;
                let v = j as f32 * stack_step;

                let un = if i + 1 == self.sectors {
                    TAU
                } else {
                    (i + 1) as f32 * sector_step
                };
                let vn = if j + 1 == self.stacks {
                    PI
                } else {
                    (j + 1) as f32 * stack_step
                };

                let p0 = shape(origin, u, v, radius);
                let p1 = shape(origin, u, vn, radius);
                let p2 = shape(origin, un, v, radius);
                let p3 = shape(origin, un, vn, radius);

                vertices.extend_from_slice(&[p0, p2, p1, p3, p1, p2]);
            }
        }

        vertices
    }

    /// Tessellate with one of the built-in shapes
    pub fn generate_shaped_sphere(
        &self,
        origin: Point2<f32>,
        radius: f32,
        shape: SphereShape,
    ) -> Vec<Vertex> {
        self.generate_sphere(origin, radius, |o, u, v, r| shape.point(o, u, v, r))
    }
}

impl Default for MeshBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_SECTORS, DEFAULT_STACKS)
    }
}

/// Map a hand-authored point cloud into a local frame anchored at its minimum corner.
///
/// Each axis is normalized independently as
/// `(value - min) / ((max - min) * scale_factor)`, and collapses to `0.0` when
/// the axis has no extent. Aspect ratio is not preserved.
pub fn normalize_sketch(raw_vertices: &[Vertex], scale_factor: f32) -> Vec<Vertex> {
    let Some(first) = raw_vertices.first() else {
        return Vec::new();
    };

    let (min, max) = raw_vertices
        .iter()
        .fold((*first, *first), |(min, max), p| (min.inf(p), max.sup(p)));

    let normalize = |value: f32, min: f32, max: f32| {
        if max != min {
            (value - min) / ((max - min) * scale_factor)
        } else {
            0.0
        }
    };

    raw_vertices
        .iter()
        .map(|p| {
            Point3::new(
                normalize(p.x, min.x, max.x),
                normalize(p.y, min.y, max.y),
                normalize(p.z, min.z, max.z),
            )
        })
        .collect()
}

/// Read a sketch file: a JSON array of `[x, y, z]` triples
pub fn read_sketch(path: &Path) -> Result<Vec<Vertex>> {
    if !path.is_file() {
        return Err(SceneError::ObjectFileNotFound(path.to_path_buf()));
    }
    let data = fs::read(path).map_err(|e| SceneError::io(path, e))?;
    let raw: Vec<[f32; 3]> = serde_json::from_slice(&data).map_err(|e| SceneError::json(path, e))?;
    if raw.is_empty() {
        return Err(SceneError::EmptySketch(path.to_path_buf()));
    }
    Ok(raw.into_iter().map(|[x, y, z]| Point3::new(x, y, z)).collect())
}

/// Read, normalize and wrap a sketch into a single-face mesh
pub fn normalize_sketch_file(
    path: &Path,
    name: &str,
    scale_factor: f32,
    color: Rgba,
) -> Result<NamedMesh> {
    if !scale_factor.is_finite() || scale_factor <= 0.0 {
        return Err(SceneError::InvalidScale(scale_factor));
    }
    let raw = read_sketch(path)?;
    debug!(
        "Normalizing sketch {} ({} points, scale {})",
        path.display(),
        raw.len(),
        scale_factor
    );
    Ok(build_named_mesh(name, [(normalize_sketch(&raw, scale_factor), color)]))
}

/// Wrap `(vertices, color)` pairs into a named mesh, one face per pair
pub fn build_named_mesh<I>(name: &str, faces_with_colors: I) -> NamedMesh
where
    I: IntoIterator<Item = (Vec<Vertex>, Rgba)>,
{
    NamedMesh {
        name: name.to_string(),
        file: MeshFile::from_faces(
            faces_with_colors
                .into_iter()
                .map(|(vertices, color)| Face::new(vertices, color)),
        ),
    }
}
