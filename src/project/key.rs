//! Machine-bound key derivation.

use sha2::{Digest, Sha256};
use std::{fmt, path::Path};

/// Application salt for key stretching.
pub const SALT: &[u8] = b"swab_project_file_v1";

/// PBKDF2-HMAC-SHA256 rounds.
pub const ITERATIONS: u32 = 480_000;

/// Strings that identify the host an archive was written on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MachineIdentity {
    pub user: String,
    pub home: String,
    pub install_dir: String,
}

impl MachineIdentity {
    /// Identity of the running process for an installation at `install_dir`.
    pub fn current(install_dir: &Path) -> Self {
        Self {
            user: whoami::username(),
            home: dirs::home_dir()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "~".to_string()),
            install_dir: install_dir.display().to_string(),
        }
    }

    fn material(&self) -> String {
        format!("{}_{}_{}", self.user, self.home, self.install_dir)
    }
}

/// 256-bit archive key. Never persisted; derive it again on every use.
#[derive(Clone, PartialEq, Eq)]
pub struct MachineKey([u8; 32]);

impl MachineKey {
    /// Hashes the identity and stretches the hash with PBKDF2.
    pub fn derive(identity: &MachineIdentity) -> Self {
        let digest = Sha256::digest(identity.material().as_bytes());
        let mut key = [0u8; 32];
        pbkdf2::pbkdf2_hmac::<Sha256>(&digest, SALT, ITERATIONS, &mut key);
        Self(key)
    }

    /// Key for this host and installation.
    pub fn for_host(install_dir: &Path) -> Self {
        Self::derive(&MachineIdentity::current(install_dir))
    }

    pub(super) fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for MachineKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MachineKey(<redacted>)")
    }
}
