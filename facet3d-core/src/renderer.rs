/// Boundary between the scene registry and whatever draws it
use nalgebra::Matrix4;

use crate::geometry::{Rgba, Vertex};

/// A rendering backend fed by [`SceneRegistry`](crate::registry::SceneRegistry).
///
/// The vertex buffer is uploaded once after loading; every frame the registry
/// sets a model matrix and a color, then draws face ranges as triangle strips.
pub trait RenderBackend {
    fn upload_vertices(&mut self, vertices: &[Vertex]);

    fn set_transform(&mut self, model: &Matrix4<f32>);

    fn set_color(&mut self, color: Rgba);

    /// Draw `count` vertices starting at `first` as a triangle strip
    fn draw_strip(&mut self, first: usize, count: usize);
}

/// Records every call; handy for tests and headless runs
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingBackend {
    pub uploaded: usize,
    pub transforms: Vec<Matrix4<f32>>,
    pub draws: Vec<(Rgba, usize, usize)>,
    color: Rgba,
}

impl RenderBackend for RecordingBackend {
    fn upload_vertices(&mut self, vertices: &[Vertex]) {
        self.uploaded = vertices.len();
    }

    fn set_transform(&mut self, model: &Matrix4<f32>) {
        self.transforms.push(*model);
    }

    fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }

    fn draw_strip(&mut self, first: usize, count: usize) {
        self.draws.push((self.color, first, count));
    }
}
