use std::fmt;
use std::io::{self, Write};

use crate::land::MeshData;
use super::Material;

pub const GROUP_NAME: &str = "Cube";
pub const OBJECT_NAME: &str = "Cube_Object";

/// A material the mesh uses, and the `.mtl` library it is declared in
#[derive(Debug, Clone, Copy)]
pub struct MaterialRef<'a> {
    pub library: &'a str,
    pub material: &'a Material,
}

/// One corner of an `f` record, e.g. `3`, `3/3`, `3//3` or `3/3/3`
struct FaceVertex {
    index: u32,
    uv: bool,
    normal: bool,
}

impl fmt::Display for FaceVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.uv, self.normal) {
            (false, false) => write!(f, "{}", self.index),
            (true, false) => write!(f, "{}/{}", self.index, self.index),
            (false, true) => write!(f, "{}//{}", self.index, self.index),
            (true, true) => write!(f, "{}/{}/{}", self.index, self.index, self.index),
        }
    }
}

/// Serialize a mesh as Wavefront `.obj` text.
///
/// Records are written in a single pass, in mesh order. Indices become 1 based.
pub fn write_obj<W: Write>(out: &mut W, mesh: &MeshData, material: Option<MaterialRef<'_>>) -> io::Result<()> {
    if let Some(MaterialRef { library, .. }) = material {
        writeln!(out, "mtllib {}", library)?;
    }
    writeln!(out, "g {}", GROUP_NAME)?;
    writeln!(out, "o {}", OBJECT_NAME)?;

    for [x, y, z] in &mesh.vertices {
        writeln!(out, "v {:.6} {:.6} {:.6}", x, y, z)?;
    }

    if let Some(uvs) = &mesh.uvs {
        for [u, v] in uvs {
            writeln!(out, "vt {:.6} {:.6}", u, v)?;
        }
    }

    if let Some(normals) = &mesh.normals {
        for [x, y, z] in normals {
            writeln!(out, "vn {:.4} {:.4} {:.4}", x, y, z)?;
        }
    }

    if let Some(MaterialRef { material, .. }) = material {
        writeln!(out, "usemtl {}", material.name)?;
    }

    let (uv, normal) = (mesh.uvs.is_some(), mesh.normals.is_some());
    let corner = |index: u32| FaceVertex { index: index + 1, uv, normal };
    for [a, b, c] in mesh.faces() {
        writeln!(out, "f {} {} {}", corner(a), corner(b), corner(c))?;
    }

    writeln!(out, "# This is a comment section")?;
    writeln!(out, "# Generated from TOM file")
}
