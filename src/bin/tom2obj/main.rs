use std::{fs, path::{Path, PathBuf}};
use structopt::StructOpt;
use thiserror::Error;
use tom_mesh::{convert_file, ConvertOptions, MaterialPlacement};
use tom_mesh::land::MeshOptions;
use tracing::{Level, error, info};

#[derive(StructOpt, Debug)]
#[structopt(name = "tom2obj")]
struct Opt {
    /// Path to a .tom file, or a folder of them
    #[structopt(parse(from_os_str))]
    input: PathBuf,

    /// Where to write the mesh. Only valid for a single file, defaults to the input with an .obj extension
    #[structopt(parse(from_os_str), short = "o", long = "output")]
    output: Option<PathBuf>,

    /// Only write vertex positions and plain faces, no texture coordinates or normals
    #[structopt(long = "positions-only")]
    positions_only: bool,

    /// Where to put the material: omit, inline or sidecar
    #[structopt(long = "material", default_value = "sidecar")]
    material: MaterialPlacement,

    /// Log debug output
    #[structopt(short = "v", long = "verbose")]
    verbose: bool,
}

#[derive(Debug, Error)]
enum Errors {
    #[error("The provided path was not a file or folder: `{path:?}`")]
    InvalidPath {
        path: PathBuf
    },

    #[error("--output can't be used when converting a folder: `{path:?}`")]
    OutputForFolder {
        path: PathBuf
    },

    #[error("{failed} of {total} files failed to convert")]
    BatchFailed {
        failed: usize,
        total: usize
    },
}

const EXTENSION: &str = "tom";

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if opt.verbose { Level::DEBUG } else { Level::INFO })
            .finish(),
    )?;

    run(opt)
}

fn run(options: Opt) -> anyhow::Result<()> {
    let mesh = if options.positions_only { MeshOptions::SIMPLE } else { MeshOptions::EXTENDED };
    let configure = |mut convert: ConvertOptions| {
        convert.mesh = mesh;
        convert.material = options.material;
        convert
    };

    let metadata = fs::metadata(&options.input)?;
    if metadata.is_file() {
        let convert = match &options.output {
            Some(output) => ConvertOptions::new(&options.input, output),
            None => ConvertOptions::beside(&options.input),
        };
        convert_file(&configure(convert))?;
    } else if metadata.is_dir() {
        if let Some(output) = &options.output {
            return Err(Errors::OutputForFolder { path: output.clone() })?;
        }

        let mut total = 0;
        let mut failed = 0;
        for entry in fs::read_dir(&options.input)? {
            let path = entry?.path();
            if !path.is_file() || !is_tom(&path) {
                continue;
            }

            total += 1;
            if let Err(e) = convert_file(&configure(ConvertOptions::beside(&path))) {
                error!("{:?}: {}", path, e);
                failed += 1;
            }
        }

        info!("Converted {} of {} files", total - failed, total);
        if failed > 0 {
            return Err(Errors::BatchFailed { failed, total })?;
        }
    } else {
        return Err(Errors::InvalidPath { path: options.input.clone() })?;
    }

    Ok(())
}

fn is_tom(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext.eq_ignore_ascii_case(EXTENSION))
}
