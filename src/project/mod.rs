//! Portable encrypted project files.
//!
//! A project file is a zip container holding `project.json` plus optional
//! `assets/icon.<ext>` and `assets/keystore.jks`, sealed with AES-256-GCM
//! under a key derived from the host's identity. A file written on one host
//! does not open on another; that failure is reported as
//! [`ArchiveError::WrongKey`], distinct from a file that is not a project at
//! all.
//!
//! Encoding and decoding are synchronous and in-memory.

mod cipher;
mod container;
mod document;
mod key;

pub use cipher::{FORMAT_VERSION, MAGIC};
pub use container::{ICON_EXTENSIONS, IconAsset, ProjectBundle};
pub use document::ProjectDocument;
pub use key::{ITERATIONS, MachineIdentity, MachineKey, SALT};

use crate::bundler::ValidationError;

/// Project file extension.
pub const EXTENSION: &str = "swab";

/// Errors from saving or opening a project file.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Authentication failed: another host's file, or a modified one.
    #[error(
        "Cannot open this project file. It was created on a different machine or has been corrupted."
    )]
    WrongKey,

    /// Not a project file, or the container inside is damaged.
    #[error("Invalid project file: {0}")]
    Malformed(String),

    /// The container has no `project.json`.
    #[error("Invalid project file: missing project.json")]
    MissingDocument,

    /// `project.json` is not a valid document.
    #[error("Invalid project document: {0}")]
    InvalidDocument(#[source] serde_json::Error),

    /// An entry inflates past the configured limit.
    #[error("Project entry {name} exceeds {limit} bytes")]
    EntryTooLarge { name: String, limit: u64 },

    /// The document to save is incomplete.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Encryption error: {0}")]
    Crypto(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Packs and seals a project.
pub fn encode(key: &MachineKey, bundle: &ProjectBundle) -> Result<Vec<u8>, ArchiveError> {
    let container = container::pack(bundle)?;
    cipher::seal(key, &container)
}

/// Opens and unpacks a project file.
pub fn decode(
    key: &MachineKey,
    data: &[u8],
    max_entry_bytes: u64,
) -> Result<ProjectBundle, ArchiveError> {
    let container = cipher::open(key, data)?;
    container::unpack(&container, max_entry_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(home: &str) -> MachineKey {
        MachineKey::derive(&MachineIdentity {
            user: "u".into(),
            home: home.into(),
            install_dir: "/opt/swab".into(),
        })
    }

    #[test]
    fn round_trip_reproduces_document_bytes() {
        let document = ProjectDocument::from_json(json!({
            "app_name": "Round Trip",
            "app_description": "desc",
            "app_version": "1.0.0",
            "build_number": 7,
            "package_name": "com.round.trip",
            "web_url": "https://round.example.com",
            "enable_media_autoplay": true,
            "key_alias": "upload",
        }))
        .unwrap();
        let bundle = ProjectBundle {
            document,
            icon: None,
            keystore: None,
        };

        let key = key("/home/u");
        let sealed = encode(&key, &bundle).unwrap();
        let opened = decode(&key, &sealed, 1 << 20).unwrap();

        assert_eq!(opened, bundle);
        assert_eq!(
            serde_json::to_vec_pretty(&opened.document).unwrap(),
            serde_json::to_vec_pretty(&bundle.document).unwrap()
        );
    }

    #[test]
    fn other_host_cannot_decode() {
        let bundle = ProjectBundle {
            document: ProjectDocument::from_json(json!({
                "app_name": "A", "app_version": "1.0.0", "build_number": "1"
            }))
            .unwrap(),
            icon: None,
            keystore: None,
        };
        let sealed = encode(&key("/home/u"), &bundle).unwrap();
        let err = decode(&key("/home/other"), &sealed, 1 << 20).unwrap_err();
        assert!(matches!(err, ArchiveError::WrongKey));
        assert!(err.to_string().contains("different machine"));
    }
}
