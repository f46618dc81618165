//! Archive extraction for release artifacts.
//!
//! Releases ship as `.tar.gz` (Darwin, Linux) or `.zip` (Windows). Both
//! extractors refuse entries that would land outside the destination.

use crate::core::ActionError;
use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::debug;

/// Archive formats relicta releases use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

impl ArchiveFormat {
    /// Pick the format from the file name suffix.
    pub fn from_filename(filename: &str) -> Result<Self, ActionError> {
        if filename.ends_with(".tar.gz") {
            Ok(Self::TarGz)
        } else if filename.ends_with(".zip") {
            Ok(Self::Zip)
        } else {
            Err(ActionError::UnsupportedArchiveFormat {
                filename: filename.to_string(),
            })
        }
    }
}

/// Extract `archive` into `dest`, creating `dest` if needed.
pub async fn extract_archive(archive: &Path, format: ArchiveFormat, dest: &Path) -> Result<()> {
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || match format {
        ArchiveFormat::TarGz => extract_tar_gz(&archive, &dest),
        ArchiveFormat::Zip => extract_zip(&archive, &dest),
    })
    .await
    .context("Archive extraction task panicked")?
}

fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    debug!("Extracting tar.gz {} to {}", archive.display(), dest.display());

    std::fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create directory: {}", dest.display()))?;

    let file =
        File::open(archive).with_context(|| format!("Failed to open {}", archive.display()))?;
    let mut tar = Archive::new(GzDecoder::new(file));
    tar.set_preserve_permissions(true);
    // `unpack` skips entries with `..` components or absolute paths
    tar.unpack(dest).with_context(|| format!("Failed to extract {}", archive.display()))?;

    Ok(())
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    debug!("Extracting zip {} to {}", archive.display(), dest.display());

    std::fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create directory: {}", dest.display()))?;

    let file =
        File::open(archive).with_context(|| format!("Failed to open {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file)
        .with_context(|| format!("Failed to read zip archive {}", archive.display()))?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).context("Failed to read zip entry")?;

        let outpath: PathBuf = match entry.enclosed_name() {
            Some(path) => dest.join(path),
            None => {
                debug!("Skipping zip entry outside destination: {}", entry.name());
                continue;
            }
        };

        if entry.is_dir() {
            std::fs::create_dir_all(&outpath)?;
            continue;
        }

        if let Some(parent) = outpath.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&outpath)
            .with_context(|| format!("Failed to create {}", outpath.display()))?;
        io::copy(&mut entry, &mut out)
            .with_context(|| format!("Failed to write {}", outpath.display()))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&outpath, std::fs::Permissions::from_mode(mode))?;
        }
    }

    Ok(())
}
