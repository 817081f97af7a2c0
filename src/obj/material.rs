use std::io::{self, Write};

/// Wavefront material record. Not derived from the image, every mesh gets the same one.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
    /// `d`, 1.0 is fully opaque
    pub dissolve: f32,
    pub illumination_model: u8,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            name: "Material01".to_string(),
            ambient: [1.0, 1.0, 1.0],
            diffuse: [0.8, 0.8, 0.8],
            specular: [0.0, 0.0, 0.0],
            shininess: 10.0,
            dissolve: 1.0,
            illumination_model: 2,
        }
    }
}

impl Material {
    /// Write this material in `.mtl` syntax
    pub fn write_mtl<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "newmtl {}", self.name)?;
        write_color(out, "Ka", self.ambient)?;
        write_color(out, "Kd", self.diffuse)?;
        write_color(out, "Ks", self.specular)?;
        writeln!(out, "Ns {:.4}", self.shininess)?;
        writeln!(out, "d {:.4}", self.dissolve)?;
        writeln!(out, "illum {}", self.illumination_model)
    }

    /// Append this material to the end of an `.obj` stream
    pub fn write_inline<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "# Material definitions")?;
        self.write_mtl(out)
    }
}

fn write_color<W: Write>(out: &mut W, key: &str, [r, g, b]: [f32; 3]) -> io::Result<()> {
    writeln!(out, "{} {:.4} {:.4} {:.4}", key, r, g, b)
}
