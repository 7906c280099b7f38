use std::{
    fs, io,
    path::{Path, PathBuf},
};

use mcc_codegen::Compilation;
use tracing::debug;

/// Writes every output file as `<directory>/<folder>/<name>.mcfunction`
///
/// Returns the written paths, root file first.
pub fn write_files(compilation: &Compilation, directory: &Path) -> io::Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(compilation.files.len());
    for file in &compilation.files {
        let mut path = directory.to_path_buf();
        if let Some(folder) = &file.folder {
            path.push(folder);
        }
        fs::create_dir_all(&path)?;
        path.push(format!("{}.mcfunction", file.name));

        fs::write(&path, file.to_string())?;
        debug!(path = %path.display(), commands = file.len(), "Wrote function");
        written.push(path);
    }
    Ok(written)
}
