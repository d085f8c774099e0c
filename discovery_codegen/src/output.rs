//! Writing rendered source units to disk.
//!
//! Files are written atomically (temp file, then rename), so an interrupted run
//! never leaves a half-written unit behind. Any failure is fatal and names the
//! offending path.

use crate::assembler::GeneratedApi;
use crate::error::CodegenError;
use crate::render::{Renderer, SourceUnit};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Writes `content` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns `CodegenError::Write` if a directory cannot be created or the file
/// cannot be written or moved into place.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), CodegenError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| CodegenError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let temp_path: PathBuf = path.with_extension("rs.tmp");
    fs::write(&temp_path, content).map_err(|source| CodegenError::Write {
        path: temp_path.clone(),
        source,
    })?;
    fs::rename(&temp_path, path).map_err(|source| CodegenError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes every unit under `dest`; returns the written paths.
///
/// # Errors
///
/// Stops at the first unit that cannot be written.
pub fn write_units(dest: &Path, units: &[SourceUnit]) -> Result<Vec<PathBuf>, CodegenError> {
    let mut written: Vec<PathBuf> = Vec::with_capacity(units.len());
    for unit in units {
        let path: PathBuf = dest.join(&unit.path);
        write_atomic(&path, &unit.contents)?;
        debug!(path = %path.display(), "wrote source unit");
        written.push(path);
    }
    Ok(written)
}

/// Writes the base package index listing every API in `apis`.
///
/// # Errors
///
/// Returns `CodegenError::Write` if an index file cannot be written.
pub fn write_base_index(
    dest: &Path,
    renderer: &dyn Renderer,
    base_package: &[String],
    apis: &[GeneratedApi],
) -> Result<Vec<PathBuf>, CodegenError> {
    write_units(dest, &renderer.render_index(base_package, apis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn unit(path: &str, contents: &str) -> SourceUnit {
        SourceUnit {
            path: PathBuf::from(path),
            contents: contents.to_string(),
        }
    }

    #[test]
    fn write_units_creates_nested_directories() {
        let temp_dir: TempDir = TempDir::new().expect("temp dir");
        let units: Vec<SourceUnit> = vec![
            unit("generated/calendar/mod.rs", "pub mod model;\n"),
            unit("generated/calendar/model/event.rs", "pub struct Event {}\n"),
        ];

        let written: Vec<PathBuf> = write_units(temp_dir.path(), &units).expect("writes");
        assert_eq!(2, written.len());
        let actual: String =
            fs::read_to_string(temp_dir.path().join("generated/calendar/model/event.rs"))
                .expect("readable");
        assert_eq!("pub struct Event {}\n", actual);
    }

    #[test]
    fn write_atomic_overwrites_and_leaves_no_temp_file() {
        let temp_dir: TempDir = TempDir::new().expect("temp dir");
        let path: PathBuf = temp_dir.path().join("calendar.rs");
        fs::write(&path, "// old").expect("seed file");

        write_atomic(&path, "// new").expect("writes");
        assert_eq!("// new", fs::read_to_string(&path).expect("readable"));
        assert!(!path.with_extension("rs.tmp").exists());
    }

    #[test]
    fn write_failure_names_the_offending_path() {
        let temp_dir: TempDir = TempDir::new().expect("temp dir");
        let blocker: PathBuf = temp_dir.path().join("generated");
        fs::write(&blocker, "not a directory").expect("seed file");

        let err: CodegenError = write_units(temp_dir.path(), &[unit("generated/mod.rs", "")])
            .expect_err("parent is a file");
        let CodegenError::Write { ref path, .. } = err else {
            panic!("expected a write error, got {err:?}");
        };
        assert_eq!(&blocker, path);
    }
}
