//! # Lock File
//!
//! `synthseed.lock` stores the seed, base time, overrides and a hash of the
//! schema document, so teammates can reproduce the exact same dataset with
//! `synthseed generate --from-lock`.
//!
//! ## Merge conflicts
//!
//! Treat `synthseed.lock` as a machine-generated artifact, **not** a
//! hand-editable config file. If you hit a merge conflict:
//!
//! ```bash
//! git checkout --ours synthseed.lock
//! synthseed generate schema.json --force
//! ```

pub mod types;

use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

use self::types::LockFile;
use crate::error::{Result, SynthSeedError};
use crate::schema::document::RawSchema;

/// Default lock file name.
pub const LOCK_FILE_NAME: &str = "synthseed.lock";

/// Compute the schema hash for drift detection.
///
/// Hashes the parsed document rather than the file bytes, so reformatting
/// or reindenting the JSON does not count as a change.
pub fn compute_schema_hash(schema: &RawSchema) -> Result<String> {
    let serialized = serde_json::to_string(schema).map_err(|e| SynthSeedError::LockFile {
        message: format!("Failed to serialize schema for hashing: {}", e),
    })?;
    let mut hasher = Sha256::new();
    hasher.update(serialized.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// Refuse to reuse a lock file whose schema hash no longer matches, unless
/// `force` is set.
pub fn check_schema_hash(lock: &LockFile, current_hash: &str, force: bool) -> Result<()> {
    if lock.schema_hash == current_hash {
        return Ok(());
    }
    if force {
        tracing::warn!(
            "Schema has changed since {} was written; regenerating because --force was given",
            LOCK_FILE_NAME
        );
        return Ok(());
    }
    Err(SynthSeedError::LockFile {
        message: format!(
            "Schema has changed since {} was written (locked {}, now {}). \
             Re-run with --force to regenerate.",
            LOCK_FILE_NAME,
            short_hash(&lock.schema_hash),
            short_hash(current_hash)
        ),
    })
}

fn short_hash(hash: &str) -> &str {
    hash.get(..12).unwrap_or(hash)
}

/// Write a lock file to disk atomically.
///
/// Writes to a temporary file in the same directory, then renames it into
/// place, so an interrupted write leaves the original lock file intact.
pub fn write_lock_file(lock: &LockFile, path: &Path) -> Result<()> {
    use std::io::Write;

    let json = serde_json::to_string_pretty(lock).map_err(|e| SynthSeedError::LockFile {
        message: format!("Failed to serialize lock file: {}", e),
    })?;

    let dir = path.parent().unwrap_or(Path::new("."));
    let tmp_path = dir.join(".synthseed.lock.tmp");

    let mut file = fs::File::create(&tmp_path).map_err(|e| SynthSeedError::Output {
        message: format!("Failed to create temp lock file at {}", tmp_path.display()),
        source: e,
    })?;
    file.write_all(json.as_bytes())
        .map_err(|e| SynthSeedError::Output {
            message: format!("Failed to write temp lock file at {}", tmp_path.display()),
            source: e,
        })?;
    file.sync_all().map_err(|e| SynthSeedError::Output {
        message: "Failed to sync lock file to disk".to_string(),
        source: e,
    })?;

    fs::rename(&tmp_path, path).map_err(|e| SynthSeedError::Output {
        message: format!(
            "Failed to rename {} to {}",
            tmp_path.display(),
            path.display()
        ),
        source: e,
    })?;

    Ok(())
}

/// Read a lock file from disk.
pub fn read_lock_file(path: &Path) -> Result<LockFile> {
    let content = fs::read_to_string(path).map_err(|e| SynthSeedError::Output {
        message: format!("Failed to read lock file from {}", path.display()),
        source: e,
    })?;
    serde_json::from_str(&content).map_err(|e| SynthSeedError::LockFile {
        message: format!("Failed to parse lock file: {}", e),
    })
}
