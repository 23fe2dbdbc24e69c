use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::{debug, info};

use super::store::{CampRepository, CampTables, RepositoryError};

/// In-process camp store with an optional JSON snapshot on disk.
///
/// Transactions hold the write lock for their whole duration and operate on a draft copy of the
/// tables, so a failed unit of work leaves nothing behind and concurrent allocations cannot
/// interleave their capacity checks.
///
/// Sized for a single camp. Each transaction clones every table, and when a snapshot path is set
/// the JSON file is written synchronously while the write lock is held, on whatever thread called
/// into the service. Callers on an async runtime block that worker for the duration.
#[derive(Debug, Default)]
pub struct InMemoryCampRepository {
    tables: RwLock<CampTables>,
    snapshot_path: Option<PathBuf>,
}

impl InMemoryCampRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(tables: CampTables) -> Self {
        Self {
            tables: RwLock::new(tables),
            snapshot_path: None,
        }
    }

    /// Open a store persisted at `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let tables = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice::<CampTables>(&bytes)
                .map_err(|err| RepositoryError::Corrupt(format!("{}: {err}", path.display())))?,
            Err(err) if err.kind() == ErrorKind::NotFound => CampTables::default(),
            Err(err) => return Err(err.into()),
        };

        info!(
            path = %path.display(),
            rooms = tables.rooms.len(),
            laborers = tables.laborers.len(),
            "opened camp store snapshot"
        );

        Ok(Self {
            tables: RwLock::new(tables),
            snapshot_path: Some(path),
        })
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    fn persist(&self, tables: &CampTables) -> Result<(), RepositoryError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let bytes = serde_json::to_vec_pretty(tables)
            .map_err(|err| RepositoryError::Corrupt(err.to_string()))?;
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, bytes)?;
        fs::rename(&staging, path)?;
        debug!(path = %path.display(), "camp store snapshot written");
        Ok(())
    }
}

// Tables are only ever replaced wholesale after a successful unit of work, so a poisoned lock
// still guards a consistent state.
impl CampRepository for InMemoryCampRepository {
    fn read<T, F>(&self, query: F) -> Result<T, RepositoryError>
    where
        F: FnOnce(&CampTables) -> T,
    {
        let guard = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(query(&guard))
    }

    fn transaction<T, E, F>(&self, work: F) -> Result<T, E>
    where
        F: FnOnce(&mut CampTables) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let mut draft = guard.clone();
        let output = work(&mut draft)?;
        self.persist(&draft)?;
        *guard = draft;
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camp::domain::{Room, RoomId};

    fn insert_room(tables: &mut CampTables, name: &str) -> RoomId {
        let id = tables.next_room_id();
        tables.rooms.insert(
            id,
            Room {
                id,
                name: name.to_string(),
                capacity: 2,
                active: true,
            },
        );
        id
    }

    #[test]
    fn failed_transaction_commits_nothing() {
        let repository = InMemoryCampRepository::new();
        let result: Result<(), RepositoryError> = repository.transaction(|tables| {
            insert_room(tables, "R1");
            Err(RepositoryError::Unavailable("aborted".to_string()))
        });

        assert!(result.is_err());
        let rooms = repository
            .read(|tables| tables.rooms.len())
            .expect("read succeeds");
        assert_eq!(rooms, 0);
    }

    #[test]
    fn snapshot_survives_reopen() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("camp.json");

        let repository = InMemoryCampRepository::open(&path).expect("opens empty store");
        repository
            .transaction(|tables| {
                insert_room(tables, "R1");
                Ok::<_, RepositoryError>(())
            })
            .expect("commit succeeds");
        assert!(path.exists());

        let reopened = InMemoryCampRepository::open(&path).expect("reopens");
        let names = reopened
            .read(|tables| {
                tables
                    .rooms
                    .values()
                    .map(|room| room.name.clone())
                    .collect::<Vec<_>>()
            })
            .expect("read succeeds");
        assert_eq!(names, vec!["R1".to_string()]);
        assert_eq!(reopened.snapshot_path(), Some(path.as_path()));
    }

    #[test]
    fn unreadable_snapshot_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("camp.json");
        fs::write(&path, b"{ not json").expect("write fixture");

        assert!(matches!(
            InMemoryCampRepository::open(&path),
            Err(RepositoryError::Corrupt(_))
        ));
    }

    #[test]
    fn failed_snapshot_write_rolls_back() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing").join("camp.json");
        let store = InMemoryCampRepository::open(&path).expect("opens empty");

        let result = store.transaction(|tables| {
            insert_room(tables, "R1");
            Ok::<_, RepositoryError>(())
        });

        assert!(matches!(result, Err(RepositoryError::Io(_))));
        assert_eq!(store.read(|tables| tables.rooms.len()).expect("reads"), 0);
    }
}
