use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::container::extract_png;
use crate::error::ConvertError;
use crate::land::{heightmap_to_mesh_data, ImageHeightmap, MeshData, MeshOptions};
use crate::obj::{write_obj, Material, MaterialRef};

/// Extension given to converted meshes
pub const OBJ_EXTENSION: &str = "obj";

/// Extension of the material library written next to a mesh
pub const MTL_EXTENSION: &str = "mtl";

/// Where the material record ends up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialPlacement {
    /// No material lines at all
    Omit,
    /// Material definitions appended to the end of the `.obj`
    Inline,
    /// Material definitions in a `.mtl` file beside the `.obj`
    Sidecar,
}

impl Default for MaterialPlacement {
    fn default() -> Self {
        MaterialPlacement::Sidecar
    }
}

impl FromStr for MaterialPlacement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "omit" => Ok(MaterialPlacement::Omit),
            "inline" => Ok(MaterialPlacement::Inline),
            "sidecar" => Ok(MaterialPlacement::Sidecar),
            other => Err(format!("unknown material placement `{}`, expected omit, inline or sidecar", other)),
        }
    }
}

/// Everything needed to convert one `.tom` file
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub mesh: MeshOptions,
    pub material: MaterialPlacement,
}

impl ConvertOptions {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        ConvertOptions {
            input: input.into(),
            output: output.into(),
            mesh: MeshOptions::default(),
            material: MaterialPlacement::default(),
        }
    }

    /// Convert next to the input, swapping its extension for `.obj`
    pub fn beside(input: impl Into<PathBuf>) -> Self {
        let input = input.into();
        let mut output = input.clone();
        output.set_extension(OBJ_EXTENSION);
        ConvertOptions::new(input, output)
    }

    /// Path of the `.mtl` library for this output
    pub fn material_library(&self) -> PathBuf {
        self.output.with_extension(MTL_EXTENSION)
    }
}

/// What a successful conversion produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertSummary {
    pub width: u32,
    pub height: u32,
    pub vertices: usize,
    pub faces: usize,
}

impl From<&MeshData> for ConvertSummary {
    fn from(mesh: &MeshData) -> Self {
        ConvertSummary {
            width: mesh.width,
            height: mesh.height,
            vertices: mesh.vertices.len(),
            faces: mesh.face_count(),
        }
    }
}

/// Run the in-memory part of a conversion: container bytes to mesh
pub fn convert_bytes(data: &[u8], options: MeshOptions) -> Result<MeshData, ConvertError> {
    let png = extract_png(data)?;
    let heightmap = ImageHeightmap::decode(png)?;
    heightmap_to_mesh_data(&heightmap, options)
}

/// Convert one `.tom` file to an `.obj` (and possibly a `.mtl`).
///
/// The mesh is built completely before anything is created on disk, so a bad input never
/// leaves an output file behind. Files that fail part way through writing are removed.
#[tracing::instrument(skip_all, fields(input = ?options.input, output = ?options.output))]
pub fn convert_file(options: &ConvertOptions) -> Result<ConvertSummary, ConvertError> {
    let library_path = options.material_library();
    if options.material == MaterialPlacement::Sidecar && library_path == options.output {
        return Err(ConvertError::MaterialLibraryClash { path: library_path });
    }

    let data = fs::read(&options.input).map_err(ConvertError::io(&options.input))?;
    debug!("Read {} bytes", data.len());

    let material = Material::default();

    let mesh = convert_bytes(&data, options.mesh)?;
    let summary = ConvertSummary::from(&mesh);

    let library = library_path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("output.{}", MTL_EXTENSION));
    let material_ref = MaterialRef { library: &library, material: &material };

    match options.material {
        MaterialPlacement::Omit => {
            write_file(&options.output, |out| write_obj(out, &mesh, None))?;
        }
        MaterialPlacement::Inline => {
            write_file(&options.output, |out| {
                write_obj(out, &mesh, Some(material_ref))?;
                material.write_inline(out)
            })?;
        }
        MaterialPlacement::Sidecar => {
            write_file(&library_path, |out| material.write_mtl(out))?;
            if let Err(e) = write_file(&options.output, |out| write_obj(out, &mesh, Some(material_ref))) {
                remove_partial(&library_path);
                return Err(e);
            }
            info!("Material library saved to {:?}", library_path);
        }
    }

    info!("OBJ file saved to {:?} ({} vertices, {} faces)", options.output, summary.vertices, summary.faces);
    Ok(summary)
}

/// Create `path`, run `write` against it and flush. The file is removed again if any step fails.
fn write_file<F>(path: &Path, write: F) -> Result<(), ConvertError>
    where F: FnOnce(&mut BufWriter<File>) -> io::Result<()>
{
    let file = File::create(path).map_err(ConvertError::io(path))?;
    let mut writer = BufWriter::new(file);

    let result = write(&mut writer).and_then(|_| writer.flush());
    drop(writer);

    if let Err(e) = result {
        remove_partial(path);
        return Err(ConvertError::io(path)(e));
    }

    Ok(())
}

fn remove_partial(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!("Failed to remove partial output {:?}: {}", path, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placement_from_str() {
        assert_eq!("omit".parse::<MaterialPlacement>(), Ok(MaterialPlacement::Omit));
        assert_eq!("inline".parse::<MaterialPlacement>(), Ok(MaterialPlacement::Inline));
        assert_eq!("sidecar".parse::<MaterialPlacement>(), Ok(MaterialPlacement::Sidecar));
        assert!("embedded".parse::<MaterialPlacement>().is_err());
    }

    #[test]
    fn output_paths() {
        let options = ConvertOptions::beside("scans/latest.tom");

        assert_eq!(options.output, PathBuf::from("scans/latest.obj"));
        assert_eq!(options.material_library(), PathBuf::from("scans/latest.mtl"));
        assert_eq!(options.mesh, MeshOptions::EXTENDED);
        assert_eq!(options.material, MaterialPlacement::Sidecar);
    }

    #[test]
    fn failed_write_removes_file() {
        let dir = std::env::temp_dir().join(format!("tom-mesh-unit-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("half.obj");

        let result = write_file(&path, |out| {
            writeln!(out, "v 0 0 0")?;
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        });

        assert!(matches!(result, Err(ConvertError::Io { .. })));
        assert!(!path.exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn sidecar_library_cannot_be_the_output() {
        let options = ConvertOptions::new("scan.tom", "mesh.mtl");

        match convert_file(&options) {
            Err(ConvertError::MaterialLibraryClash { path }) => assert_eq!(path, PathBuf::from("mesh.mtl")),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn bytes_without_image() {
        let result = convert_bytes(b"just a header", MeshOptions::default());
        assert!(matches!(result, Err(ConvertError::SignatureNotFound)));
    }
}
