//! Report emitter: the self-contained HTML page and the CSV export.
//!
//! Both consume the aggregate as-is; nothing here feeds back into the core.
pub mod csv;
pub mod html;

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::AppError;

/// Writes an artifact, creating parent directories as needed.
pub fn write_report(path: &Path, contents: &str) -> Result<(), AppError> {
    let io_err = |source| AppError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)?;
    info!(path = %path.display(), bytes = contents.len(), "report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_parent_directories() {
        let dir = tempfile::tempdir().expect("failed creating tempdir");
        let path = dir.path().join("nested/out/index.html");
        write_report(&path, "<html></html>").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html></html>");
    }

    #[test]
    fn reports_failing_path() {
        let dir = tempfile::tempdir().expect("failed creating tempdir");
        // a directory cannot be overwritten as a file
        let err = write_report(dir.path(), "x").unwrap_err();
        match err {
            AppError::Io { path, .. } => assert_eq!(path, dir.path()),
            other => panic!("unexpected error: {other}"),
        }
    }
}
