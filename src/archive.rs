//! Archive-extraction collaborator.
//!
//! Supports the two formats hosted releases actually ship: gzipped
//! tarballs and zip files. Extraction is entry-by-entry so hostile paths
//! cannot escape the destination directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};

/// Whether the engine knows how to extract a file with this name.
#[must_use]
pub fn is_archive(name: &str) -> bool {
    let lower = name.to_lowercase();
    lower.ends_with(".tar.gz") || lower.ends_with(".tgz") || lower.ends_with(".zip")
}

/// Extract `archive` (named `name`, which selects the format) into `dest`.
///
/// # Errors
///
/// Returns an error for unsupported formats, corrupt archives, or I/O
/// failures while unpacking.
pub fn extract(archive: &Path, name: &str, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).with_context(|| format!("create {}", dest.display()))?;

    let lower = name.to_lowercase();
    if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
        extract_tar_gz(archive, dest)
    } else if lower.ends_with(".zip") {
        extract_zip(archive, dest)
    } else {
        bail!("unsupported archive format: {name}");
    }
}

fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    let file =
        fs::File::open(archive).with_context(|| format!("open {}", archive.display()))?;
    let decompressor = flate2::read::GzDecoder::new(file);
    let mut tar = tar::Archive::new(decompressor);

    // unpack_in validates each entry path stays inside dest.
    for entry in tar.entries().context("read tar entries")? {
        let mut entry = entry.context("read tar entry")?;
        entry
            .unpack_in(dest)
            .with_context(|| format!("unpack into {}", dest.display()))?;
    }
    Ok(())
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let file =
        fs::File::open(archive).with_context(|| format!("open {}", archive.display()))?;
    let mut zip = zip::ZipArchive::new(file).context("read zip archive")?;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).context("read zip entry")?;
        let Some(relative) = entry.enclosed_name() else {
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)
                .with_context(|| format!("create {}", outpath.display()))?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("create {}", parent.display()))?;
            }
            let mut outfile = fs::File::create(&outpath)
                .with_context(|| format!("create {}", outpath.display()))?;
            io::copy(&mut entry, &mut outfile)
                .with_context(|| format!("extract {}", outpath.display()))?;
        }
    }
    Ok(())
}

/// Locate exactly one executable file in an extracted tree.
///
/// On Unix a file counts as executable when any execute bit is set; on
/// other platforms the `.exe` extension decides. Used when a release spec
/// does not name an explicit path inside the archive.
///
/// # Errors
///
/// Returns an error when the tree contains no executable or more than one
/// (the caller should configure an explicit path instead).
pub fn find_single_executable(dir: &Path) -> Result<PathBuf> {
    let mut executables = Vec::new();

    for entry in walkdir::WalkDir::new(dir) {
        let entry = entry.with_context(|| format!("walk {}", dir.display()))?;
        if entry.file_type().is_file() && is_executable(entry.path())? {
            executables.push(entry.path().to_path_buf());
        }
    }

    match executables.len() {
        0 => bail!("archive contains no executable file"),
        1 => Ok(executables.remove(0)),
        n => bail!("archive contains {n} executable files; set extract_path to choose one"),
    }
}

fn is_executable(path: &Path) -> Result<bool> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = fs::metadata(path)
            .with_context(|| format!("reading metadata: {}", path.display()))?;
        Ok(metadata.permissions().mode() & 0o111 != 0)
    }
    #[cfg(not(unix))]
    {
        Ok(path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("exe")))
    }
}
