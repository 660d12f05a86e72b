//! Filesystem infrastructure: implements `HostFs` on the local disk.

use std::io::Write;
use std::path::Path;

use anyhow::Result;

use crate::application::ports::HostFs;
use crate::domain::ProvisionError;

/// Production filesystem implementation of `HostFs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

fn access(path: &Path, err: &std::io::Error) -> anyhow::Error {
    ProvisionError::file_access(path, err).into()
}

impl HostFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| access(path, &e))
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(|e| access(path, &e))?;
        temp.write_all(content.as_bytes())
            .and_then(|()| temp.flush())
            .map_err(|e| access(path, &e))?;

        // Keep the original mode when replacing an existing file.
        if let Ok(meta) = std::fs::metadata(path) {
            if let Err(err) = std::fs::set_permissions(temp.path(), meta.permissions()) {
                tracing::debug!(path = %path.display(), error = %err, "permissions not preserved");
            }
        }

        temp.persist(path).map_err(|e| access(path, &e.error))?;
        Ok(())
    }

    fn create_dir_all(&self, path: &Path, mode: Option<u32>) -> Result<()> {
        std::fs::create_dir_all(path).map_err(|e| access(path, &e))?;
        if let Some(mode) = mode {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
                .map_err(|e| access(path, &e))?;
        }
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> Result<()> {
        std::fs::remove_dir_all(path).map_err(|e| access(path, &e))
    }

    fn remove_file(&self, path: &Path) -> Result<()> {
        std::fs::remove_file(path).map_err(|e| access(path, &e))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        std::fs::copy(from, to).map_err(|e| access(from, &e))?;
        Ok(())
    }
}
