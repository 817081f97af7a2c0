pub mod heightmap;
pub use heightmap::{HeightmapData, ImageHeightmap, SampleGrid};

pub mod mesh;
pub use mesh::{MeshData, MeshOptions, heightmap_to_mesh_data};
