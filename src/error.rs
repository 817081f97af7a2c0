use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a single `.tom` to `.obj` conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("extract: PNG signature not found in container")]
    SignatureNotFound,

    #[error("extract: PNG signature at offset {signature_offset} has no IEND terminator after it")]
    TerminatorNotFound {
        signature_offset: usize
    },

    #[error("decode: embedded image could not be decoded")]
    Decode(#[from] image::ImageError),

    #[error("mesh: a {width}x{height} grid is too small for the requested output")]
    DegenerateGrid {
        width: u32,
        height: u32
    },

    #[error("write: material library `{path:?}` would overwrite the mesh, pick an output without an .mtl extension")]
    MaterialLibraryClash {
        path: PathBuf
    },

    #[error("mesh: sample ({x}, {y}) is outside the heightmap")]
    SampleOutOfBounds {
        x: u32,
        y: u32
    },

    #[error("io: `{path:?}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> ConvertError {
        let path = path.into();
        move |source| ConvertError::Io { path, source }
    }
}
