//! Snapshot storage
//!
//! Writes a serializable value to a file as 2-space indented JSON, replacing
//! whatever the file held before.

use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while writing a snapshot
#[derive(Debug, Error)]
pub enum StorageError {
    /// The destination could not be created or truncated
    #[error("Failed to create {}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The value could not be represented as JSON
    #[error("Failed to serialize data for {}", path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Writing, flushing or syncing the file failed
    #[error("Failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Saves `value` to `path` as pretty-printed JSON
///
/// The file is flushed and synced before returning. The handle is closed on
/// every path, including a failure after the file was created.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let file = File::create(path).map_err(|source| StorageError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let write_error = |source: io::Error| StorageError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value).map_err(|source| {
        if source.is_io() {
            write_error(source.into())
        } else {
            StorageError::Serialize {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    writer.write_all(b"\n").map_err(write_error)?;

    let file = writer
        .into_inner()
        .map_err(|e| write_error(e.into_error()))?;
    file.sync_all().map_err(write_error)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gidsync_core::domain::entity::Entity;
    use serde::ser::Error as _;
    use serde::Serializer;

    fn entities() -> Vec<Entity> {
        vec![
            Entity::new("11", "Roadmap", "project"),
            Entity::new("12", "Launch", "project"),
        ]
    }

    #[test]
    fn test_writes_indented_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short_interval_projects.json");

        save_json(&path, &entities()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let expected = r#"[
  {
    "gid": "11",
    "name": "Roadmap",
    "resource_type": "project"
  },
  {
    "gid": "12",
    "name": "Launch",
    "resource_type": "project"
  }
]
"#;
        assert_eq!(contents, expected);
    }

    #[test]
    fn test_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");

        save_json(&path, &entities()).unwrap();
        save_json(&path, &Vec::<Entity>::new()).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]\n");
    }

    #[test]
    fn test_round_trips_entities() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");

        save_json(&path, entities().as_slice()).unwrap();

        let decoded: Vec<Entity> =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert_eq!(decoded, entities());
    }

    #[test]
    fn test_uncreatable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("projects.json");

        let err = save_json(&path, &entities()).unwrap_err();

        assert!(matches!(err, StorageError::Create { .. }));
        assert!(!path.exists());
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("refusing to serialize"))
        }
    }

    #[test]
    fn test_serialization_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");

        let err = save_json(&path, &Unserializable).unwrap_err();

        assert!(matches!(err, StorageError::Serialize { .. }));
    }
}
