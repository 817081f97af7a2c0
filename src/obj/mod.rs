pub mod material;
pub use material::Material;

pub mod writer;
pub use writer::{MaterialRef, write_obj};
