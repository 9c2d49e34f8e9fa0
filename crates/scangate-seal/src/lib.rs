// scangate-seal/src/lib.rs
// ============================================================================
// Module: Scangate Result Sealer
// Description: Encryption at rest for engine result artifacts.
// Purpose: Ensure plaintext results never outlive the sealing step.
// Dependencies: base64, chacha20poly1305, rand
// ============================================================================

//! ## Overview
//! Sealing wraps each artifact in XChaCha20-Poly1305 under a configured
//! 256-bit key with a fresh random nonce per file. The sealed container is
//! `magic || nonce || ciphertext`; the plaintext file is removed only after
//! the sealed form is durably written. When sealing is enabled but no key is
//! configured the sealer fails loudly and reports the artifact as still
//! plaintext; it never silently skips encryption the caller believes is on.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chacha20poly1305::XChaCha20Poly1305;
use chacha20poly1305::XNonce;
use chacha20poly1305::aead::Aead;
use chacha20poly1305::aead::KeyInit;
use rand::RngCore;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Magic prefix identifying sealed containers.
const SEAL_MAGIC: &[u8; 8] = b"SGSEAL01";
/// Nonce length for XChaCha20-Poly1305.
const NONCE_LENGTH: usize = 24;
/// Key length in bytes.
const KEY_LENGTH: usize = 32;
/// Extension appended to sealed artifacts.
const SEALED_EXTENSION: &str = "sealed";
/// Maximum artifact size accepted for sealing.
const MAX_ARTIFACT_BYTES: u64 = 256 * 1024 * 1024;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while sealing or unsealing artifacts.
#[derive(Debug, Error)]
pub enum SealError {
    /// Sealing is enabled but no key is configured. The named artifact is
    /// still plaintext on disk.
    #[error("sealing enabled but no key configured; {} remains plaintext", .0.display())]
    KeyMissing(PathBuf),
    /// The configured key material is not a valid 256-bit key.
    #[error("sealing key is not valid base64 for a 256-bit key")]
    InvalidKey,
    /// An artifact could not be read or written.
    #[error("artifact io failed: {}: {detail}", .path.display())]
    Io {
        /// Artifact involved.
        path: PathBuf,
        /// Underlying error detail.
        detail: String,
    },
    /// The artifact exceeds the sealing size limit.
    #[error("artifact exceeds sealing size limit: {}", .0.display())]
    TooLarge(PathBuf),
    /// The cipher rejected the operation.
    #[error("cipher operation failed for {}", .0.display())]
    Cipher(PathBuf),
    /// A sealed container is malformed or was produced with a different key.
    #[error("sealed container invalid: {}", .0.display())]
    Container(PathBuf),
}

// ============================================================================
// SECTION: Key Handling
// ============================================================================

/// Decodes base64 key material into a sealing key.
///
/// # Errors
///
/// Returns [`SealError::InvalidKey`] when the text is not base64 for exactly
/// 32 bytes.
pub fn decode_key(text: &str) -> Result<[u8; KEY_LENGTH], SealError> {
    let bytes = BASE64.decode(text.trim()).map_err(|_| SealError::InvalidKey)?;
    <[u8; KEY_LENGTH]>::try_from(bytes).map_err(|_| SealError::InvalidKey)
}

/// Generates a fresh random sealing key in base64 form.
#[must_use]
pub fn generate_key() -> String {
    let mut key = [0u8; KEY_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut key);
    BASE64.encode(key)
}

// ============================================================================
// SECTION: Sealer
// ============================================================================

/// Sealing configuration resolved from the gateway config.
#[derive(Debug, Clone)]
pub enum SealerMode {
    /// Sealing is disabled; artifacts pass through unchanged.
    Disabled,
    /// Sealing is enabled with the given key.
    Keyed([u8; KEY_LENGTH]),
    /// Sealing is enabled but no key was configured; every seal call fails.
    EnabledWithoutKey,
}

/// Result sealer applying encryption at rest to artifacts.
#[derive(Debug, Clone)]
pub struct ResultSealer {
    /// Resolved mode.
    mode: SealerMode,
}

impl ResultSealer {
    /// Creates a sealer in the given mode.
    #[must_use]
    pub const fn new(mode: SealerMode) -> Self {
        Self {
            mode,
        }
    }

    /// Returns true when sealing is enabled (keyed or misconfigured).
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self.mode, SealerMode::Disabled)
    }

    /// Seals the given artifacts, removing each plaintext on success.
    ///
    /// Returns the resulting artifact paths: sealed paths when enabled, the
    /// input paths unchanged when disabled.
    ///
    /// # Errors
    ///
    /// Returns [`SealError`] on the first artifact that cannot be sealed;
    /// that artifact and any later ones remain plaintext and are reported so.
    pub fn seal(&self, artifacts: &[PathBuf]) -> Result<Vec<PathBuf>, SealError> {
        match &self.mode {
            SealerMode::Disabled => Ok(artifacts.to_vec()),
            SealerMode::EnabledWithoutKey => Err(SealError::KeyMissing(
                artifacts.first().cloned().unwrap_or_default(),
            )),
            SealerMode::Keyed(key) => {
                let mut sealed = Vec::with_capacity(artifacts.len());
                for artifact in artifacts {
                    sealed.push(seal_file(key, artifact)?);
                }
                Ok(sealed)
            }
        }
    }

    /// Recovers the original bytes of a sealed artifact.
    ///
    /// # Errors
    ///
    /// Returns [`SealError`] when sealing is not keyed, the container is
    /// malformed, or authentication fails.
    pub fn unseal(&self, sealed: &Path, output: &Path) -> Result<(), SealError> {
        let SealerMode::Keyed(key) = &self.mode else {
            return Err(SealError::KeyMissing(sealed.to_path_buf()));
        };
        let container = fs::read(sealed).map_err(|err| SealError::Io {
            path: sealed.to_path_buf(),
            detail: err.to_string(),
        })?;
        let body = container
            .strip_prefix(SEAL_MAGIC.as_slice())
            .ok_or_else(|| SealError::Container(sealed.to_path_buf()))?;
        if body.len() < NONCE_LENGTH {
            return Err(SealError::Container(sealed.to_path_buf()));
        }
        let (nonce, ciphertext) = body.split_at(NONCE_LENGTH);
        let cipher = XChaCha20Poly1305::new(key.into());
        let plaintext = cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|_| SealError::Container(sealed.to_path_buf()))?;
        fs::write(output, plaintext).map_err(|err| SealError::Io {
            path: output.to_path_buf(),
            detail: err.to_string(),
        })
    }
}

/// Seals one file and removes its plaintext form.
fn seal_file(key: &[u8; KEY_LENGTH], artifact: &Path) -> Result<PathBuf, SealError> {
    let metadata = fs::metadata(artifact).map_err(|err| SealError::Io {
        path: artifact.to_path_buf(),
        detail: err.to_string(),
    })?;
    if metadata.len() > MAX_ARTIFACT_BYTES {
        return Err(SealError::TooLarge(artifact.to_path_buf()));
    }
    let plaintext = fs::read(artifact).map_err(|err| SealError::Io {
        path: artifact.to_path_buf(),
        detail: err.to_string(),
    })?;

    let mut nonce = [0u8; NONCE_LENGTH];
    rand::rngs::OsRng.fill_bytes(&mut nonce);
    let cipher = XChaCha20Poly1305::new(key.into());
    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext.as_slice())
        .map_err(|_| SealError::Cipher(artifact.to_path_buf()))?;

    let sealed_path = sealed_path_for(artifact);
    let mut file = fs::File::create(&sealed_path).map_err(|err| SealError::Io {
        path: sealed_path.clone(),
        detail: err.to_string(),
    })?;
    file.write_all(SEAL_MAGIC)
        .and_then(|()| file.write_all(&nonce))
        .and_then(|()| file.write_all(&ciphertext))
        .and_then(|()| file.sync_all())
        .map_err(|err| SealError::Io {
            path: sealed_path.clone(),
            detail: err.to_string(),
        })?;

    // Plaintext is removed only after the sealed form is durable.
    fs::remove_file(artifact).map_err(|err| SealError::Io {
        path: artifact.to_path_buf(),
        detail: err.to_string(),
    })?;
    Ok(sealed_path)
}

/// Returns the sealed-container path for an artifact.
#[must_use]
pub fn sealed_path_for(artifact: &Path) -> PathBuf {
    let mut name = artifact.as_os_str().to_os_string();
    name.push(".");
    name.push(SEALED_EXTENSION);
    PathBuf::from(name)
}
