//! Convert `.tom` containers into heightmap meshes.
//!
//! A `.tom` file carries a PNG somewhere in its bytes. The PNG's grayscale intensities are
//! read as heights and turned into a Wavefront `.obj` grid mesh, one vertex per pixel and
//! two triangles per 2x2 block of pixels.

pub mod container;
pub mod convert;
pub mod error;
pub mod land;
pub mod obj;

pub use convert::{convert_bytes, convert_file, ConvertOptions, ConvertSummary, MaterialPlacement};
pub use error::ConvertError;
