//! Filesystem infrastructure: implements the `DeployFs` port.
//!
//! Every failure is reported as [`DeployError::Io`] naming the operation and
//! the path involved.

use std::io;
use std::path::Path;

use anyhow::Result;

use crate::application::ports::DeployFs;
use crate::domain::DeployError;

/// Production filesystem backed by `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalFs;

fn io_error<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> DeployError + 'a {
    move |source| DeployError::Io {
        op,
        path: path.to_path_buf(),
        source,
    }
}

impl DeployFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path).map_err(io_error("creating", path))?;
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        match std::fs::remove_dir_all(path) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => Ok(other.map_err(io_error("removing", path))?),
        }
    }

    fn copy_dir_contents(&self, from: &Path, to: &Path) -> Result<()> {
        copy_tree(from, to)?;
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        Ok(std::fs::read_to_string(path).map_err(io_error("reading", path))?)
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        std::fs::write(path, content).map_err(io_error("writing", path))?;
        Ok(())
    }
}

/// Copy the entries of `from` into `to`, recursing into directories.
///
/// Dot-files are ordinary entries here. Symlinks are recreated, not
/// followed.
fn copy_tree(from: &Path, to: &Path) -> Result<(), DeployError> {
    for entry in std::fs::read_dir(from).map_err(io_error("listing", from))? {
        let entry = entry.map_err(io_error("listing", from))?;
        let src = entry.path();
        let dst = to.join(entry.file_name());
        let file_type = entry.file_type().map_err(io_error("inspecting", &src))?;

        if file_type.is_dir() {
            std::fs::create_dir_all(&dst).map_err(io_error("creating", &dst))?;
            copy_tree(&src, &dst)?;
        } else if file_type.is_symlink() {
            copy_symlink(&src, &dst)?;
        } else {
            std::fs::copy(&src, &dst).map_err(io_error("copying", &src))?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<(), DeployError> {
    let target = std::fs::read_link(src).map_err(io_error("reading link", src))?;
    match std::fs::remove_file(dst) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            return Err(io_error("replacing", dst)(e));
        }
        _ => {}
    }
    std::os::unix::fs::symlink(&target, dst).map_err(io_error("linking", dst))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<(), DeployError> {
    std::fs::copy(src, dst).map_err(io_error("copying", src))?;
    Ok(())
}
