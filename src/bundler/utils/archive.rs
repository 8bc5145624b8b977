//! Zip packaging for directory artifacts.

use crate::bundler::error::{ErrorExt, Result};
use std::{
    fs::File,
    io::{self, BufWriter},
    path::{Path, PathBuf},
};
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

/// Compresses the contents of `src_dir` into a zip file at `dest`.
///
/// Entry names are relative to `src_dir`, so the archive root is the
/// directory's contents rather than the directory itself. Symlinks are stored
/// as symlink entries. Returns the number of file entries written.
///
/// The archive is written to a uniquely named sibling of `dest` and renamed
/// into place, so readers never observe a partial file and concurrent calls
/// for the same `dest` do not interleave.
pub async fn zip_dir(src_dir: &Path, dest: &Path) -> Result<usize> {
    let src_dir = src_dir.to_path_buf();
    let dest = dest.to_path_buf();
    tokio::task::spawn_blocking(move || zip_dir_blocking(&src_dir, &dest)).await?
}

fn zip_dir_blocking(src_dir: &Path, dest: &Path) -> Result<usize> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent).fs_context("creating directory", parent)?;
    }

    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive.zip".into());
    let partial = dest.with_file_name(format!(".{file_name}.{}.part", uuid::Uuid::new_v4()));

    match write_zip(src_dir, &partial) {
        Ok(files) => {
            std::fs::rename(&partial, dest).fs_context("renaming zip", dest)?;
            Ok(files)
        }
        Err(e) => {
            let _ = std::fs::remove_file(&partial);
            Err(e)
        }
    }
}

fn write_zip(src_dir: &Path, dest: &Path) -> Result<usize> {
    let file = File::create(dest).fs_context("creating zip", dest)?;
    let mut writer = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);
    let exec_options = options.unix_permissions(0o755);

    let mut entries: Vec<(PathBuf, walkdir::DirEntry)> = Vec::new();
    for entry in walkdir::WalkDir::new(src_dir).min_depth(1).follow_links(false) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src_dir)?.to_path_buf();
        entries.push((rel, entry));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let mut files = 0;
    for (rel, entry) in entries {
        let name = entry_name(&rel);
        let file_type = entry.file_type();

        if file_type.is_symlink() {
            let target = std::fs::read_link(entry.path()).fs_context("reading symlink", entry.path())?;
            writer.add_symlink(name, target.to_string_lossy().into_owned(), options)?;
        } else if file_type.is_dir() {
            writer.add_directory(format!("{name}/"), options)?;
        } else {
            let opts = if is_executable(entry.path()) { exec_options } else { options };
            writer.start_file(name, opts)?;
            let mut input = File::open(entry.path()).fs_context("opening", entry.path())?;
            io::copy(&mut input, &mut writer).fs_context("compressing", entry.path())?;
            files += 1;
        }
    }

    writer.finish()?;
    Ok(files)
}

fn entry_name(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}
