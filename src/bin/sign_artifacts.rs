//! Artifact signing utility for Obesense.
//!
//! Generates Ed25519 signing keys and writes a signed manifest
//! (`manifest.json` + `manifest.sig`) binding the three artifact files.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin sign_artifacts -- --generate-key --out-seed <path> [--out-pub <path>] [--force]
//! cargo run --bin sign_artifacts -- <artifact_dir>
//! ```
//!
//! The signing seed is read from the file named by
//! `OBESENSE_SIGNING_KEY_B64_FILE` (or `OBESENSE_SIGNING_KEY_B64` in debug
//! builds). Private key material is zeroized after use.

use std::env;
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use obesense::adapters::artifacts::manifest::{build_manifest, MANIFEST_FILE, SIGNATURE_FILE};

const KEY_FILE_ENV: &str = "OBESENSE_SIGNING_KEY_B64_FILE";
const KEY_ENV: &str = "OBESENSE_SIGNING_KEY_B64";

const USAGE: &str = "Usage:\n  sign_artifacts --generate-key --out-seed <path> [--out-pub <path>] [--force]\n  sign_artifacts <artifact_dir>";

#[derive(Zeroize, ZeroizeOnDrop)]
struct Seed([u8; 32]);

enum Command {
    GenerateKey {
        out_seed: PathBuf,
        out_pub: Option<PathBuf>,
        force: bool,
    },
    Sign {
        dir: PathBuf,
    },
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command, String> {
    let mut args = args.into_iter();
    let mut generate = false;
    let mut out_seed: Option<PathBuf> = None;
    let mut out_pub: Option<PathBuf> = None;
    let mut force = false;
    let mut dir: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--generate-key" => generate = true,
            "--out-seed" => out_seed = Some(PathBuf::from(args.next().ok_or(USAGE)?)),
            "--out-pub" => out_pub = Some(PathBuf::from(args.next().ok_or(USAGE)?)),
            "--force" => force = true,
            "-h" | "--help" => return Err(USAGE.to_string()),
            _ if dir.is_none() && !arg.starts_with('-') => dir = Some(PathBuf::from(arg)),
            _ => return Err(format!("Unknown arg: {arg}\n{USAGE}")),
        }
    }

    if generate {
        let out_seed = out_seed.ok_or(USAGE)?;
        Ok(Command::GenerateKey {
            out_seed,
            out_pub,
            force,
        })
    } else {
        Ok(Command::Sign {
            dir: dir.ok_or(USAGE)?,
        })
    }
}

fn read_signing_seed_b64() -> Result<Zeroizing<String>, String> {
    if let Ok(path) = env::var(KEY_FILE_ENV) {
        let content = Zeroizing::new(
            fs::read_to_string(path.trim())
                .map_err(|e| format!("Failed reading signing key file: {e}"))?,
        );
        let secret = content.trim_end_matches(['\n', '\r']).to_string();
        if secret.is_empty() {
            return Err("Empty signing key".to_string());
        }
        return Ok(Zeroizing::new(secret));
    }

    // Dev-only fallback for convenience.
    if cfg!(debug_assertions) {
        if let Ok(v) = env::var(KEY_ENV) {
            let secret = v.trim_end_matches(['\n', '\r']).to_string();
            if secret.is_empty() {
                return Err("Empty signing key".to_string());
            }
            return Ok(Zeroizing::new(secret));
        }
    }

    Err(format!(
        "Missing signing key. Set {KEY_FILE_ENV} (env var {KEY_ENV} only in debug builds)."
    ))
}

fn read_signing_seed() -> Result<Seed, String> {
    let v = read_signing_seed_b64()?;

    let raw = Zeroizing::new(
        general_purpose::STANDARD
            .decode(v.trim())
            .map_err(|e| format!("Invalid base64 in signing key: {e}"))?,
    );

    if raw.len() != 32 {
        return Err(format!(
            "Signing key seed must be 32 bytes after base64 decode (got {})",
            raw.len()
        ));
    }

    let mut seed = Seed([0u8; 32]);
    seed.0.copy_from_slice(&raw);
    Ok(seed)
}

fn write_file(path: &Path, contents: &[u8], mode: u32) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let mut opts = fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        opts.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = opts
        .open(path)
        .map_err(|e| format!("Failed to open {path:?}: {e}"))?;
    file.write_all(contents)
        .and_then(|()| file.write_all(b"\n"))
        .map_err(|e| format!("Failed to write {path:?}: {e}"))
}

fn generate_key(out_seed: &Path, out_pub: Option<&Path>, force: bool) -> Result<(), String> {
    for path in std::iter::once(out_seed).chain(out_pub) {
        if path.exists() && !force {
            return Err(format!(
                "Refusing to overwrite existing file {path:?}. Use --force."
            ));
        }
    }

    let mut seed = Seed([0u8; 32]);
    OsRng.fill_bytes(&mut seed.0);

    let signing_key = SigningKey::from_bytes(&seed.0);
    let pub_b64 = general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes());
    let seed_b64 = Zeroizing::new(general_purpose::STANDARD.encode(seed.0));

    write_file(out_seed, seed_b64.as_bytes(), 0o600)?;
    println!("Wrote signing seed (base64) to {out_seed:?}");

    if let Some(pub_path) = out_pub {
        // Public key is non-secret; allow read access.
        write_file(pub_path, pub_b64.as_bytes(), 0o644)?;
        println!("Wrote public key (base64) to {pub_path:?}");
    }

    // Print only non-secret material.
    println!("OBESENSE_ARTIFACT_PUBKEY_B64={pub_b64}");
    Ok(())
}

fn sign(dir: &Path) -> Result<(), String> {
    let seed = read_signing_seed()?;
    let signing_key = SigningKey::from_bytes(&seed.0);
    drop(seed);

    let manifest = build_manifest(dir).map_err(|e| e.to_string())?;
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| format!("Failed to serialize {MANIFEST_FILE}: {e}"))?;

    let manifest_path = dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, &manifest_bytes)
        .map_err(|e| format!("Failed to write {manifest_path:?}: {e}"))?;

    let sig: Signature = signing_key.sign(&manifest_bytes);
    let sig_path = dir.join(SIGNATURE_FILE);
    fs::write(&sig_path, sig.to_bytes())
        .map_err(|e| format!("Failed to write {sig_path:?}: {e}"))?;

    println!("Signed manifest: {manifest_path:?}");
    println!("Wrote signature: {sig_path:?}");
    println!(
        "OBESENSE_ARTIFACT_PUBKEY_B64={}",
        general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes())
    );
    Ok(())
}

fn main() -> Result<(), String> {
    match parse_args(env::args().skip(1))? {
        Command::GenerateKey {
            out_seed,
            out_pub,
            force,
        } => generate_key(&out_seed, out_pub.as_deref(), force),
        Command::Sign { dir } => sign(&dir),
    }
}
