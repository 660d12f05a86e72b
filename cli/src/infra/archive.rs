//! Gzip tarball extraction (`tar` + `flate2`).

use std::fs::File;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use tar::Archive;

use crate::application::ports::ArchiveExtractor;
use crate::domain::ProvisionError;

#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzExtractor;

/// Drop the first component; `None` for the top-level entry itself or for
/// paths that would escape the destination.
fn stripped(path: &Path) -> Option<PathBuf> {
    let mut components = path.components();
    components.next()?;
    let rest: PathBuf = components.collect();
    let safe = rest
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    (safe && !rest.as_os_str().is_empty()).then_some(rest)
}

impl ArchiveExtractor for TarGzExtractor {
    fn extract_stripped(&self, archive: &Path, dest: &Path) -> Result<()> {
        let file = File::open(archive).map_err(|e| ProvisionError::file_access(archive, &e))?;
        let mut tar = Archive::new(GzDecoder::new(file));
        let mut count = 0usize;
        for entry in tar
            .entries()
            .with_context(|| format!("reading {}", archive.display()))?
        {
            let mut entry = entry.with_context(|| format!("reading {}", archive.display()))?;
            let path = entry.path().context("entry path")?.into_owned();
            let Some(relative) = stripped(&path) else {
                continue;
            };
            let target = dest.join(&relative);
            if let Some(parent) = target.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ProvisionError::file_access(parent, &e))?;
            }
            entry
                .unpack(&target)
                .with_context(|| format!("extracting {}", relative.display()))?;
            count += 1;
        }
        tracing::debug!(entries = count, dest = %dest.display(), "archive extracted");
        Ok(())
    }
}
