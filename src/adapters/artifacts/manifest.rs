//! Artifact manifest and Ed25519 signature verification.
//!
//! `manifest.json` binds the artifact files by SHA-256; `manifest.sig` is an
//! Ed25519 signature over the exact manifest bytes. Both are optional unless
//! the integrity policy requires them.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use base64::engine::general_purpose;
use base64::Engine;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{ArtifactError, ENCODERS_FILE, MODELS_FILE, SCALER_FILE};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const SIGNATURE_FILE: &str = "manifest.sig";

const MANIFEST_VERSION: u32 = 1;

/// Files a manifest must bind.
pub const BOUND_FILES: [&str; 3] = [MODELS_FILE, SCALER_FILE, ENCODERS_FILE];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    /// File name → lowercase hex SHA-256
    pub files: BTreeMap<String, String>,
}

/// What must hold before artifacts are trusted.
#[derive(Debug, Clone, Default)]
pub struct IntegrityPolicy {
    /// Manifest, signature and key are all mandatory
    pub require_signed: bool,
    pub public_key: Option<VerifyingKey>,
}

/// How far verification got.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityStatus {
    /// No manifest present
    Unsigned,
    /// Hashes matched; no signature was checked
    HashesVerified,
    /// Hashes matched and the signature verified
    SignatureVerified,
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    to_hex(&Sha256::digest(bytes))
}

fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

fn integrity(msg: impl Into<String>) -> ArtifactError {
    ArtifactError::Integrity(msg.into())
}

/// Decode a base64 Ed25519 verifying key.
///
/// # Errors
/// Returns `ArtifactError::Integrity` if the key is not 32 valid bytes.
pub fn verifying_key_from_b64(b64: &str) -> Result<VerifyingKey, ArtifactError> {
    let bytes = general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|_| integrity("Invalid public key base64"))?;
    let key: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| integrity("Invalid public key length (expected 32 bytes)"))?;
    VerifyingKey::from_bytes(&key).map_err(|_| integrity("Invalid verifying key"))
}

/// Hash the bound artifact files in `dir`.
///
/// # Errors
/// Returns `ArtifactError::Missing` or `ArtifactError::Io` if a file cannot be read.
pub fn build_manifest(dir: &Path) -> Result<ArtifactManifest, ArtifactError> {
    let mut files = BTreeMap::new();
    for name in BOUND_FILES {
        let bytes = super::read_artifact(&dir.join(name))?;
        files.insert(name.to_string(), sha256_hex(&bytes));
    }
    Ok(ArtifactManifest {
        version: MANIFEST_VERSION,
        files,
    })
}

/// Check the manifest and signature in `dir` against `policy`.
///
/// # Errors
/// Returns `ArtifactError::Integrity` when a required piece is absent, a hash
/// differs, or the signature does not verify.
pub fn verify_artifacts(
    dir: &Path,
    policy: &IntegrityPolicy,
) -> Result<IntegrityStatus, ArtifactError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let sig_path = dir.join(SIGNATURE_FILE);

    if policy.require_signed && policy.public_key.is_none() {
        return Err(integrity(
            "Signed artifacts required but no public key is configured",
        ));
    }

    if !manifest_path.exists() {
        if policy.require_signed {
            return Err(integrity(format!("{MANIFEST_FILE} required but not found")));
        }
        tracing::warn!("No {MANIFEST_FILE} in artifact directory; loading unverified artifacts");
        return Ok(IntegrityStatus::Unsigned);
    }

    let manifest_bytes = fs::read(&manifest_path).map_err(|source| ArtifactError::Io {
        path: manifest_path.clone(),
        source,
    })?;

    let signature_checked = match (&policy.public_key, sig_path.exists()) {
        (Some(key), true) => {
            let sig_bytes = fs::read(&sig_path).map_err(|source| ArtifactError::Io {
                path: sig_path.clone(),
                source,
            })?;
            let sig: [u8; 64] = sig_bytes
                .as_slice()
                .try_into()
                .map_err(|_| integrity("Invalid signature length (expected 64 bytes)"))?;
            key.verify(&manifest_bytes, &Signature::from_bytes(&sig))
                .map_err(|_| integrity("Invalid artifact signature"))?;
            true
        }
        (_, false) if policy.require_signed => {
            return Err(integrity(format!("{SIGNATURE_FILE} required but not found")));
        }
        (None, true) => {
            tracing::warn!("{SIGNATURE_FILE} present but no public key configured; signature not checked");
            false
        }
        _ => false,
    };

    let manifest: ArtifactManifest = serde_json::from_slice(&manifest_bytes)
        .map_err(|e| integrity(format!("Invalid {MANIFEST_FILE}: {e}")))?;
    if manifest.version != MANIFEST_VERSION {
        return Err(integrity(format!(
            "Unsupported manifest version: {}",
            manifest.version
        )));
    }

    // Only the bound artifact names are ever joined onto `dir`.
    if let Some(extra) = manifest
        .files
        .keys()
        .find(|name| !BOUND_FILES.contains(&name.as_str()))
    {
        return Err(integrity(format!(
            "{MANIFEST_FILE} lists unexpected file {extra:?}"
        )));
    }

    for name in BOUND_FILES {
        let expected_hex = manifest
            .files
            .get(name)
            .ok_or_else(|| integrity(format!("{MANIFEST_FILE} does not bind {name}")))?;
        let path = dir.join(name);
        let bytes = fs::read(&path).map_err(|e| {
            integrity(format!("Manifest references unreadable file {path:?}: {e}"))
        })?;
        if !constant_time_eq_str(&sha256_hex(&bytes), &expected_hex.to_ascii_lowercase()) {
            return Err(integrity(format!("File hash mismatch for {name}")));
        }
    }

    if signature_checked {
        tracing::info!("Artifact signature and hashes verified");
        Ok(IntegrityStatus::SignatureVerified)
    } else {
        tracing::info!("Artifact hashes verified");
        Ok(IntegrityStatus::HashesVerified)
    }
}
