use itertools::Itertools;
use tracing::debug;

use crate::error::ConvertError;
use super::heightmap::HeightmapData;

/// Normal written for every vertex, the mesher doesn't derive surface normals
pub const UP: [f32; 3] = [0.0, 0.0, 1.0];

/// Iterator which generates a quad (two triangles) with the top left corner at a given index
///
/// Corners are `v1` (top left), `v2` (top right), `v3` (bottom left) and `v4` (bottom right).
/// The triangles are `(v1, v2, v3)` and `(v2, v4, v3)` so both wind the same way.
struct QuadPatchGenerator {
    idx: usize,
    values: [u32; 6]
}

impl QuadPatchGenerator {
    /// Create a new quad patch generator for a grid with a given width, starting at base_idx
    fn new(base_idx: u32, width: u32) -> QuadPatchGenerator {
        QuadPatchGenerator {
            idx: 0,
            values: [
                base_idx,
                base_idx + 1,
                base_idx + width,
                base_idx + 1,
                base_idx + width + 1,
                base_idx + width
            ]
        }
    }
}

/// Return the 6 indices for this quad
impl Iterator for QuadPatchGenerator {
    type Item = u32;

    fn next(&mut self) -> Option<Self::Item> {
        let v = self.values.get(self.idx).copied();
        self.idx += 1;

        v
    }
}

/// Which optional per-vertex attributes to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshOptions {
    pub uvs: bool,
    pub normals: bool,
}

impl MeshOptions {
    /// Positions, texture coordinates and normals
    pub const EXTENDED: MeshOptions = MeshOptions { uvs: true, normals: true };

    /// Positions only
    pub const SIMPLE: MeshOptions = MeshOptions { uvs: false, normals: false };
}

impl Default for MeshOptions {
    fn default() -> Self {
        MeshOptions::EXTENDED
    }
}

/// Vertex and face data for a heightmap. All indices are 0 based and shared by every attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// Size of the sample grid the mesh was built from
    pub width: u32,
    pub height: u32,
    pub vertices: Vec<[f32; 3]>,
    pub uvs: Option<Vec<[f32; 2]>>,
    pub normals: Option<Vec<[f32; 3]>>,
    /// Triangle list, three indices per face
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn faces(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|f| [f[0], f[1], f[2]])
    }
}

/// Takes a heightmap and returns a mesh with one vertex per sample, height = intensity / 255
pub fn heightmap_to_mesh_data<T>(heightmap: &T, options: MeshOptions) -> Result<MeshData, ConvertError>
    where T: HeightmapData
{
    let (width, height) = heightmap.size();

    // Texture coordinates divide by (size - 1), so they need at least a 2x2 grid
    let min_size = if options.uvs { 2 } else { 1 };
    if width < min_size || height < min_size {
        return Err(ConvertError::DegenerateGrid { width, height });
    }

    // Generate positions
    let vertices = (0..height).cartesian_product(0..width)
        .map(|(y, x)| {
            let z = f32::from(heightmap.sample(x, y)?) / 255.0;
            Ok([x as f32, y as f32, z])
        })
        .collect::<Result<Vec<_>, ConvertError>>()?;

    let uvs = if options.uvs { Some(uvs(width, height)) } else { None };
    let normals = if options.normals { Some(vec![UP; vertices.len()]) } else { None };
    let indices = indices(width, height);

    debug!("Generated {} vertices and {} faces", vertices.len(), indices.len() / 3);

    Ok(MeshData {
        width,
        height,
        vertices,
        uvs,
        normals,
        indices,
    })
}

fn uvs(width: u32, height: u32) -> Vec<[f32; 2]> {
    let (du, dv) = ((width - 1) as f32, (height - 1) as f32);
    (0..height).cartesian_product(0..width)
        .map(move |(y, x)| [x as f32 / du, y as f32 / dv])
        .collect::<Vec<_>>()
}

fn indices(width: u32, height: u32) -> Vec<u32> {
    (0..height.saturating_sub(1)).cartesian_product(0..width.saturating_sub(1))
        .flat_map(move |(y, x)| QuadPatchGenerator::new(x + y * width, width))
        .collect::<Vec<_>>()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::land::heightmap::SampleGrid;

    fn grid(width: u32, height: u32) -> SampleGrid {
        let samples = (0..width * height).map(|i| (i * 37 % 256) as u8).collect();
        SampleGrid::from_raw(width, height, samples).unwrap()
    }

    #[test]
    fn quad_winding() {
        let quad = QuadPatchGenerator::new(0, 2).collect::<Vec<_>>();
        assert_eq!(quad, vec![0, 1, 2, 1, 3, 2]);
    }

    #[test]
    fn two_by_two_example() {
        let grid = SampleGrid::from_rows(&[&[0, 255], &[128, 64]]).unwrap();
        let mesh = heightmap_to_mesh_data(&grid, MeshOptions::EXTENDED).unwrap();

        let heights = mesh.vertices.iter().map(|v| v[2]).collect::<Vec<_>>();
        let expected = [0.0, 1.0, 0.502, 0.251];
        for (h, e) in heights.iter().zip(expected.iter()) {
            assert!((h - e).abs() < 0.001, "{} != {}", h, e);
        }

        assert_eq!((mesh.width, mesh.height), (2, 2));
        assert_eq!(mesh.vertices[1], [1.0, 0.0, 1.0]);
        assert_eq!(mesh.vertices[2][..2], [0.0, 1.0]);
        assert_eq!(mesh.faces().collect::<Vec<_>>(), vec![[0, 1, 2], [1, 3, 2]]);
    }

    #[test]
    fn counts_match_grid() {
        for &(w, h) in &[(2, 2), (3, 2), (5, 7), (16, 1), (1, 9)] {
            let mesh = heightmap_to_mesh_data(&grid(w, h), MeshOptions::SIMPLE).unwrap();
            let quads = (w as usize - 1) * (h as usize - 1);

            assert_eq!(mesh.vertices.len(), (w * h) as usize);
            assert_eq!(mesh.face_count(), 2 * quads);
        }
    }

    #[test]
    fn heights_are_normalized_intensity() {
        let samples = (0..=255).collect::<Vec<u8>>();
        let grid = SampleGrid::from_raw(16, 16, samples).unwrap();
        let mesh = heightmap_to_mesh_data(&grid, MeshOptions::SIMPLE).unwrap();

        for (i, v) in mesh.vertices.iter().enumerate() {
            assert!((0.0..=1.0).contains(&v[2]));
            assert_eq!(v[2], i as f32 / 255.0);
        }
    }

    #[test]
    fn face_indices_are_valid_and_distinct() {
        let (w, h) = (6, 4);
        let mesh = heightmap_to_mesh_data(&grid(w, h), MeshOptions::EXTENDED).unwrap();

        for face in mesh.faces() {
            assert!(face.iter().all(|&i| i < w * h));
            assert_eq!(face.iter().collect::<HashSet<_>>().len(), 3);
        }
    }

    #[test]
    fn uvs_span_unit_square() {
        let mesh = heightmap_to_mesh_data(&grid(4, 3), MeshOptions::EXTENDED).unwrap();
        let uvs = mesh.uvs.unwrap();

        assert_eq!(uvs.len(), 12);
        assert_eq!(uvs[0], [0.0, 0.0]);
        assert_eq!(uvs[11], [1.0, 1.0]);
        assert!(uvs.iter().all(|uv| (0.0..=1.0).contains(&uv[0]) && (0.0..=1.0).contains(&uv[1])));
        assert_eq!(mesh.normals.unwrap(), vec![UP; 12]);
    }

    #[test]
    fn simple_mesh_has_no_attributes() {
        let mesh = heightmap_to_mesh_data(&grid(3, 3), MeshOptions::SIMPLE).unwrap();
        assert!(mesh.uvs.is_none());
        assert!(mesh.normals.is_none());
    }

    #[test]
    fn thin_grids() {
        // Vertices only, nothing to triangulate
        let mesh = heightmap_to_mesh_data(&grid(1, 5), MeshOptions::SIMPLE).unwrap();
        assert_eq!(mesh.vertices.len(), 5);
        assert_eq!(mesh.face_count(), 0);

        // Normals alone don't need a 2x2 grid
        let normals_only = MeshOptions { uvs: false, normals: true };
        assert!(heightmap_to_mesh_data(&grid(5, 1), normals_only).is_ok());

        assert!(matches!(
            heightmap_to_mesh_data(&grid(1, 5), MeshOptions::EXTENDED),
            Err(ConvertError::DegenerateGrid { width: 1, height: 5 })
        ));
    }

    #[test]
    fn empty_grid_is_degenerate() {
        let empty = SampleGrid::from_raw(0, 0, Vec::new()).unwrap();
        assert!(matches!(
            heightmap_to_mesh_data(&empty, MeshOptions::SIMPLE),
            Err(ConvertError::DegenerateGrid { .. })
        ));
    }
}
