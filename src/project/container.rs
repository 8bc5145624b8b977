//! In-memory zip container for a project and its assets.

use super::{ArchiveError, ProjectDocument};
use std::io::{Cursor, Read, Write};
use zip::{CompressionMethod, ZipArchive, ZipWriter, result::ZipError, write::SimpleFileOptions};

pub const DOCUMENT_ENTRY: &str = "project.json";
pub const KEYSTORE_ENTRY: &str = "assets/keystore.jks";
const ICON_PREFIX: &str = "assets/icon.";

/// Icon extensions accepted inside a container.
pub const ICON_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Icon bytes with their lowercase extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IconAsset {
    pub extension: String,
    pub bytes: Vec<u8>,
}

/// Decoded contents of a project file.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectBundle {
    pub document: ProjectDocument,
    pub icon: Option<IconAsset>,
    pub keystore: Option<Vec<u8>>,
}

/// Zips the document and assets.
pub fn pack(bundle: &ProjectBundle) -> Result<Vec<u8>, ArchiveError> {
    let document = serde_json::to_vec_pretty(&bundle.document).map_err(ArchiveError::InvalidDocument)?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);

    write_entry(&mut writer, DOCUMENT_ENTRY, &document, options)?;
    if let Some(icon) = &bundle.icon {
        let name = format!("{ICON_PREFIX}{}", icon.extension);
        write_entry(&mut writer, &name, &icon.bytes, options)?;
    }
    if let Some(keystore) = &bundle.keystore {
        write_entry(&mut writer, KEYSTORE_ENTRY, keystore, options)?;
    }

    let cursor = writer.finish().map_err(malformed)?;
    Ok(cursor.into_inner())
}

/// Reads a container produced by [`pack`].
///
/// No entry may inflate past `max_entry_bytes`.
pub fn unpack(bytes: &[u8], max_entry_bytes: u64) -> Result<ProjectBundle, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(malformed)?;

    let document = match read_entry(&mut archive, DOCUMENT_ENTRY, max_entry_bytes)? {
        Some(raw) => serde_json::from_slice(&raw).map_err(ArchiveError::InvalidDocument)?,
        None => return Err(ArchiveError::MissingDocument),
    };

    let mut icon = None;
    for extension in ICON_EXTENSIONS {
        let name = format!("{ICON_PREFIX}{extension}");
        if let Some(bytes) = read_entry(&mut archive, &name, max_entry_bytes)? {
            icon = Some(IconAsset {
                extension: extension.to_string(),
                bytes,
            });
            break;
        }
    }

    let keystore = read_entry(&mut archive, KEYSTORE_ENTRY, max_entry_bytes)?;

    Ok(ProjectBundle {
        document,
        icon,
        keystore,
    })
}

fn write_entry(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    bytes: &[u8],
    options: SimpleFileOptions,
) -> Result<(), ArchiveError> {
    writer.start_file(name, options).map_err(malformed)?;
    writer.write_all(bytes)?;
    Ok(())
}

fn read_entry(
    archive: &mut ZipArchive<Cursor<&[u8]>>,
    name: &str,
    limit: u64,
) -> Result<Option<Vec<u8>>, ArchiveError> {
    let entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(malformed(e)),
    };
    if entry.size() > limit {
        return Err(ArchiveError::EntryTooLarge {
            name: name.to_string(),
            limit,
        });
    }

    let mut out = Vec::with_capacity(entry.size() as usize);
    // The declared size can lie; cap the actual read as well.
    entry.take(limit + 1).read_to_end(&mut out)?;
    if out.len() as u64 > limit {
        return Err(ArchiveError::EntryTooLarge {
            name: name.to_string(),
            limit,
        });
    }
    Ok(Some(out))
}

fn malformed(e: ZipError) -> ArchiveError {
    ArchiveError::Malformed(e.to_string())
}
