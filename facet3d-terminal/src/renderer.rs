/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use facet3d_core::geometry::strip_triangles;
use facet3d_core::{Camera, RenderBackend, Rgba, Transform, Triangle, Vertex};
use nalgebra::{Matrix4, Vector3};
use std::io::Write;

/// Character luminosity ramp for depth/shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Character used for triangle edges in wireframe mode
const WIRE_CHAR: char = '+';

/// Floor applied to face colors so faces turned away from the light stay visible
const AMBIENT: f32 = 0.35;

/// ASCII renderer that converts triangle strips to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
    vertices: Vec<Vertex>,
    model: Matrix4<f32>,
    camera: Camera,
    light_dir: Vector3<f32>,
    color: Rgba,
    wireframe: bool,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
            vertices: Vec::new(),
            model: Matrix4::identity(),
            camera: Camera::new(width as u32, height as u32),
            light_dir: Vector3::z(),
            color: Rgba::WHITE,
            wireframe: false,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        let size = width * height;
        self.width = width;
        self.height = height;
        self.depth_buffer = vec![f32::INFINITY; size];
        self.char_buffer = vec![' '; size];
        self.color_buffer = vec![Color::Reset; size];
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    /// Clear the buffers and capture the camera for this frame
    pub fn begin_frame(&mut self, camera: &Camera, wireframe: bool) {
        self.clear();
        self.camera = camera.clone();
        self.light_dir = (camera.position - camera.target)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::z);
        self.wireframe = wireframe;
    }

    /// Character at a cell, for inspection
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    /// Number of cells covered by geometry this frame
    pub fn covered_cells(&self) -> usize {
        self.depth_buffer.iter().filter(|d| d.is_finite()).count()
    }

    fn render_triangle(&mut self, triangle: &Triangle, mvp: &Matrix4<f32>) {
        let Some(normal) = self.world_triangle(triangle).calculate_normal() else {
            return;
        };

        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (coord, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match self
                .camera
                .project_with(mvp, vertex, self.width as u32, self.height as u32)
            {
                Some(projected) => *coord = projected,
                None => return, // Triangle is clipped
            }
        }

        // Strips alternate winding, so light both sides
        let brightness = normal.dot(&self.light_dir).abs();

        if self.wireframe {
            let color = self.shade(1.0);
            for i in 0..3 {
                self.rasterize_line(screen_coords[i], screen_coords[(i + 1) % 3], WIRE_CHAR, color);
            }
            return;
        }

        // Map brightness to character, never the blank one
        let steps = (LUMINOSITY_RAMP.len() - 2) as f32;
        let char_index = 1 + (brightness * steps).round() as usize;
        let character = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];

        let color = self.shade(brightness);
        self.rasterize_triangle(&screen_coords, character, color);
    }

    fn world_triangle(&self, triangle: &Triangle) -> Triangle {
        let [v0, v1, v2] = triangle.vertices;
        Triangle::new(
            self.model.transform_point(&v0),
            self.model.transform_point(&v1),
            self.model.transform_point(&v2),
        )
    }

    fn shade(&self, brightness: f32) -> Color {
        let (r, g, b) = self
            .color
            .shade(AMBIENT + (1.0 - AMBIENT) * brightness)
            .to_rgb8();
        Color::Rgb { r, g, b }
    }

    fn plot(&mut self, x: i32, y: i32, depth: f32, character: char, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = color;
        }
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char, color: Color) {
        let [v0, v1, v2] = *coords;

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        // Scanline rasterization
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                // Barycentric coordinates
                if let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        // Interpolate depth
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(x, y, depth, character, color);
                    }
                }
            }
        }
    }

    /// DDA line between two projected points with interpolated depth
    fn rasterize_line(&mut self, from: (f32, f32, f32), to: (f32, f32, f32), character: char, color: Color) {
        let dx = to.0 - from.0;
        let dy = to.1 - from.1;
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0);
        // Off-screen edges can be arbitrarily long; cap the walk to the screen size
        let steps = steps.min((self.width + self.height) as f32 * 4.0) as usize;

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = from.0 + dx * t;
            let y = from.1 + dy * t;
            let depth = from.2 + (to.2 - from.2) * t;
            self.plot(x.floor() as i32, y.floor() as i32, depth, character, color);
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = y * self.width + x;
                writer.queue(SetForegroundColor(self.color_buffer[idx]))?;
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl RenderBackend for AsciiRenderer {
    fn upload_vertices(&mut self, vertices: &[Vertex]) {
        self.vertices = vertices.to_vec();
    }

    fn set_transform(&mut self, model: &Matrix4<f32>) {
        self.model = *model;
    }

    fn set_color(&mut self, color: Rgba) {
        self.color = color;
    }

    fn draw_strip(&mut self, first: usize, count: usize) {
        let mvp = Transform::mvp_matrix(
            &self.model,
            &self.camera.view_matrix(),
            &self.camera.projection_matrix(),
        );
        let Some(strip) = self.vertices.get(first..first + count) else {
            return;
        };
        let triangles: Vec<Triangle> = strip_triangles(strip).collect();
        for triangle in &triangles {
            self.render_triangle(triangle, &mvp);
        }
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    fn quad() -> Vec<Vertex> {
        vec![
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, -1.0, 0.0),
            Point3::new(-1.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_strip_fills_center() {
        let mut renderer = AsciiRenderer::new(40, 20);
        renderer.upload_vertices(&quad());
        renderer.begin_frame(&Camera::new(40, 20), false);
        renderer.set_color(Rgba::WHITE);
        renderer.draw_strip(0, 4);

        // Facing the camera: brightest character
        assert_eq!(renderer.cell(18, 11), Some('@'));
        assert_eq!(renderer.cell(0, 0), Some(' '));
        assert!(renderer.covered_cells() > 0);
    }

    #[test]
    fn test_wireframe_leaves_interior_empty() {
        let mut renderer = AsciiRenderer::new(40, 20);
        renderer.upload_vertices(&quad());
        renderer.begin_frame(&Camera::new(40, 20), true);
        renderer.draw_strip(0, 4);

        let covered = renderer.covered_cells();
        assert!(covered > 0);

        renderer.begin_frame(&Camera::new(40, 20), false);
        renderer.draw_strip(0, 4);
        assert!(renderer.covered_cells() > covered);
    }

    #[test]
    fn test_transform_moves_geometry_offscreen() {
        let mut renderer = AsciiRenderer::new(40, 20);
        renderer.upload_vertices(&quad());
        renderer.begin_frame(&Camera::new(40, 20), false);
        renderer.set_transform(&Matrix4::new_translation(&Vector3::new(0.0, 0.0, 20.0)));
        renderer.draw_strip(0, 4);
        assert_eq!(renderer.covered_cells(), 0);
    }

    #[test]
    fn test_out_of_range_strip_ignored() {
        let mut renderer = AsciiRenderer::new(10, 10);
        renderer.upload_vertices(&quad());
        renderer.begin_frame(&Camera::new(10, 10), false);
        renderer.draw_strip(2, 10);
        assert_eq!(renderer.covered_cells(), 0);
    }

    #[test]
    fn test_draw_output() {
        let renderer = AsciiRenderer::new(3, 2);
        let mut out = Vec::new();
        renderer.draw(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\r\n"));
    }
}
