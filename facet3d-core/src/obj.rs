/// Wavefront OBJ import (positions and polygons only)
use log::{debug, warn};
use nom::{
    bytes::complete::{tag, take_while},
    character::complete::{char, i64 as index, space0, space1},
    combinator::{all_consuming, opt},
    multi::separated_list1,
    number::complete::float,
    sequence::{preceded, terminated},
    IResult,
};
use nalgebra::Point3;
use std::fs;
use std::path::Path;

use crate::builder::build_named_mesh;
use crate::error::{Result, SceneError};
use crate::geometry::{Rgba, Vertex};
use crate::mesh_file::NamedMesh;

/// Parse OBJ text into polygons of resolved positions.
///
/// Only `v` and `f` records are read; texture and normal indices on face
/// corners are skipped. `origin` labels errors.
pub fn parse_obj(input: &str, origin: &Path) -> Result<Vec<Vec<Vertex>>> {
    let mut positions: Vec<Vertex> = Vec::new();
    let mut polygons = Vec::new();

    for (line_no, line) in input.lines().enumerate() {
        let line = line.trim();
        let error = |message: String| SceneError::ObjParse {
            path: origin.to_path_buf(),
            message: format!("line {}: {}", line_no + 1, message),
        };

        if line.starts_with("v ") || line.starts_with("v\t") {
            let (_, position) = parse_position(line)
                .map_err(|e| error(format!("bad vertex record: {:?}", e)))?;
            positions.push(position);
        } else if line.starts_with("f ") || line.starts_with("f\t") {
            let (_, corners) =
                parse_face(line).map_err(|e| error(format!("bad face record: {:?}", e)))?;
            let polygon = corners
                .into_iter()
                .map(|i| resolve_index(i, positions.len()).map(|i| positions[i]))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| error(format!("face index out of range ({} vertices)", positions.len())))?;

            if polygon.len() < 3 {
                warn!("Skipping degenerate face on line {} of {}", line_no + 1, origin.display());
                continue;
            }
            polygons.push(polygon);
        }
    }

    Ok(polygons)
}

fn parse_position(input: &str) -> IResult<&str, Vertex> {
    let (input, _) = terminated(tag("v"), space1)(input)?;
    let (input, x) = float(input)?;
    let (input, y) = preceded(space1, float)(input)?;
    let (input, z) = preceded(space1, float)(input)?;
    // Optional homogeneous weight is ignored
    let (input, _) = all_consuming(terminated(opt(preceded(space1, float)), space0))(input)?;
    Ok((input, Point3::new(x, y, z)))
}

fn parse_face(input: &str) -> IResult<&str, Vec<i64>> {
    let (input, _) = terminated(tag("f"), space1)(input)?;
    all_consuming(terminated(separated_list1(space1, parse_corner), space0))(input)
}

/// `v`, `v/vt`, `v//vn` or `v/vt/vn`; only `v` is kept
fn parse_corner(input: &str) -> IResult<&str, i64> {
    let (input, position) = index(input)?;
    let (input, _) = opt(preceded(
        char('/'),
        take_while(|c: char| c == '/' || c == '-' || c.is_ascii_digit()),
    ))(input)?;
    Ok((input, position))
}

/// OBJ indices are 1-based; negative indices count back from the latest vertex
fn resolve_index(index: i64, count: usize) -> Option<usize> {
    let resolved = match index {
        0 => return None,
        i if i > 0 => i - 1,
        i => count as i64 + i,
    };
    usize::try_from(resolved).ok().filter(|&i| i < count)
}

/// Reorder a convex polygon's corners into triangle-strip order:
/// `v0, v1, vn-1, v2, vn-2, ...`
pub fn polygon_to_strip(polygon: &[Vertex]) -> Vec<Vertex> {
    let mut strip = Vec::with_capacity(polygon.len());
    let Some(first) = polygon.first() else {
        return strip;
    };
    strip.push(*first);

    let (mut lo, mut hi) = (1, polygon.len() - 1);
    while lo <= hi {
        strip.push(polygon[lo]);
        lo += 1;
        if lo <= hi {
            strip.push(polygon[hi]);
            hi -= 1;
        }
    }
    strip
}

/// Load an OBJ file as a named mesh, one strip-ordered face per polygon
pub fn import_obj(path: &Path, name: &str, color: Rgba) -> Result<NamedMesh> {
    if !path.is_file() {
        return Err(SceneError::ObjectFileNotFound(path.to_path_buf()));
    }
    let text = fs::read_to_string(path).map_err(|e| SceneError::io(path, e))?;
    let polygons = parse_obj(&text, path)?;
    debug!("Imported {} polygons from {}", polygons.len(), path.display());

    Ok(build_named_mesh(
        name,
        polygons
            .iter()
            .map(|polygon| (polygon_to_strip(polygon), color)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PYRAMID: &str = "\
# square pyramid
mtllib pyramid.mtl
v 0 0 0
v 1 0 0
v 1 0 1
v 0 0 1
v 0.5 1 0.5 1.0
vt 0 0
vn 0 1 0
f 1/1/1 2/1/1 3/1/1 4/1/1
f 1//1 2//1 5//1
f -4 -3 -1
";

    #[test]
    fn test_parse_pyramid() {
        let polygons = parse_obj(PYRAMID, Path::new("pyramid.obj")).unwrap();
        assert_eq!(polygons.len(), 3);
        assert_eq!(polygons[0].len(), 4);
        assert_eq!(polygons[1][2], Point3::new(0.5, 1.0, 0.5));
        // -4 and -3 relative to five vertices
        assert_eq!(polygons[2][0], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(polygons[2][1], Point3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_index_out_of_range() {
        let result = parse_obj("v 0 0 0\nf 1 2 3\n", Path::new("bad.obj"));
        match result {
            Err(SceneError::ObjParse { message, .. }) => assert!(message.starts_with("line 2")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_vertex() {
        let result = parse_obj("v 0 zero 0\n", Path::new("bad.obj"));
        assert!(matches!(result, Err(SceneError::ObjParse { .. })));
    }

    #[test]
    fn test_quad_strip_order() {
        let quad: Vec<Vertex> = (0..4).map(|i| Point3::new(i as f32, 0.0, 0.0)).collect();
        let strip = polygon_to_strip(&quad);
        assert_eq!(strip, vec![quad[0], quad[1], quad[3], quad[2]]);

        let pentagon: Vec<Vertex> = (0..5).map(|i| Point3::new(i as f32, 0.0, 0.0)).collect();
        let strip = polygon_to_strip(&pentagon);
        let order: Vec<f32> = strip.iter().map(|p| p.x).collect();
        assert_eq!(order, vec![0.0, 1.0, 4.0, 2.0, 3.0]);
    }

    #[test]
    fn test_resolve_index() {
        assert_eq!(resolve_index(1, 3), Some(0));
        assert_eq!(resolve_index(-1, 3), Some(2));
        assert_eq!(resolve_index(0, 3), None);
        assert_eq!(resolve_index(4, 3), None);
        assert_eq!(resolve_index(-4, 3), None);
    }
}
