// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Whole-file JSON persistence shared by the memory and profile stores.
//!
//! Writes overwrite the target in place; there is no journaling.

use std::io::ErrorKind;
use std::path::Path;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::TandemError;

/// Serialize `value` as pretty JSON to `path`, creating parent directories.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), TandemError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| TandemError::persistence(parent, e))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|e| TandemError::persistence(path, e))?;
    std::fs::write(path, json).map_err(|e| TandemError::persistence(path, e))
}

/// Checks that `user_id` can be embedded in a file name.
///
/// Accepts ASCII alphanumerics, `-`, `_`, and `.`; rejects empty ids and
/// ids starting with `.`.
pub fn validate_user_id(user_id: &str) -> Result<(), TandemError> {
    let valid = !user_id.is_empty()
        && !user_id.starts_with('.')
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(TandemError::InvalidUserId(user_id.to_string()))
    }
}

/// Read and decode JSON from `path`. A missing file yields `Ok(None)`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, TandemError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(TandemError::persistence(path, e)),
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| TandemError::persistence(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/state.json");

        write_json(&path, &vec![1, 2, 3]).unwrap();
        let back: Option<Vec<i32>> = read_json(&path).unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let back: Option<Vec<i32>> = read_json(&dir.path().join("absent.json")).unwrap();
        assert!(back.is_none());
    }

    #[test]
    fn user_id_must_be_a_safe_file_name() {
        for ok in ["default", "alice", "user-1", "a_b.c", "42"] {
            assert!(validate_user_id(ok).is_ok(), "{ok}");
        }
        for bad in ["", ".hidden", "..", "../etc", "a/b", "a\\b", "sp ace", "ü"] {
            assert!(
                matches!(validate_user_id(bad), Err(TandemError::InvalidUserId(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn corrupt_file_is_a_persistence_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = read_json::<Vec<i32>>(&path).unwrap_err();
        assert!(matches!(err, TandemError::Persistence { .. }));
    }
}
