//! Embedded libSQL storage for screened candidates.
//!
//! The [`Storage`] struct wraps a local libSQL database holding the single
//! append-only `cv_table`. Each insert runs in autocommit mode, so a saved
//! row is durable and visible to later reads before the call returns.
//!
//! The handle is constructed once at startup and owned by whoever drives the
//! screening run; dropping it closes the connection.

mod schema;

use std::path::Path;

use cvscreen_shared::{CandidateProfile, Result, ScreenError};
use libsql::{Connection, Database, params};
use tracing::{debug, info, instrument};

/// Primary storage handle wrapping a libSQL database.
pub struct Storage {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
}

impl Storage {
    /// Open or create a database at `path` and make sure the table exists.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| ScreenError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| ScreenError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| ScreenError::Storage(e.to_string()))?;

        let storage = Self { db, conn };
        storage.ensure_schema().await?;
        debug!(path = %path.display(), "candidate store opened");
        Ok(storage)
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.conn
            .execute(schema::CREATE_CV_TABLE, params![])
            .await
            .map_err(|e| ScreenError::Storage(format!("failed to create cv_table: {e}")))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Candidate operations
    // -----------------------------------------------------------------------

    /// Append one candidate row. Duplicates are allowed.
    #[instrument(skip_all, fields(name = %candidate.name))]
    pub async fn save_candidate(&self, candidate: &CandidateProfile) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO cv_table (name, github, cv_filename, status) VALUES (?1, ?2, ?3, ?4)",
                params![
                    candidate.name.as_str(),
                    candidate.github.as_str(),
                    candidate.cv_filename.as_str(),
                    candidate.status.as_str(),
                ],
            )
            .await
            .map_err(|e| ScreenError::Storage(e.to_string()))?;

        info!(status = %candidate.status, "candidate saved");
        Ok(())
    }

    /// Number of stored candidate rows.
    pub async fn count_candidates(&self) -> Result<u64> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM cv_table", params![])
            .await
            .map_err(|e| ScreenError::Storage(e.to_string()))?;

        match rows.next().await {
            Ok(Some(row)) => row
                .get::<i64>(0)
                .map(|n| n as u64)
                .map_err(|e| ScreenError::Storage(e.to_string())),
            Ok(None) => Ok(0),
            Err(e) => Err(ScreenError::Storage(e.to_string())),
        }
    }

    /// All stored candidates in insertion order.
    pub async fn list_candidates(&self) -> Result<Vec<CandidateProfile>> {
        let mut rows = self
            .conn
            .query(
                "SELECT name, github, cv_filename, status FROM cv_table ORDER BY rowid",
                params![],
            )
            .await
            .map_err(|e| ScreenError::Storage(e.to_string()))?;

        let mut results = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| ScreenError::Storage(e.to_string()))?
        {
            results.push(row_to_candidate(&row)?);
        }
        Ok(results)
    }
}

/// Convert a database row to a [`CandidateProfile`].
fn row_to_candidate(row: &libsql::Row) -> Result<CandidateProfile> {
    let text = |idx: i32| -> Result<String> {
        row.get::<String>(idx)
            .map_err(|e| ScreenError::Storage(e.to_string()))
    };

    Ok(CandidateProfile {
        name: text(0)?,
        github: text(1)?,
        cv_filename: text(2)?,
        status: text(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;

    fn temp_db_path() -> PathBuf {
        std::env::temp_dir().join(format!("cvscreen_test_{}.db", Uuid::now_v7()))
    }

    /// Create a temp file storage for testing, returning its path for cleanup.
    async fn test_storage() -> (Storage, PathBuf) {
        let path = temp_db_path();
        let storage = Storage::open(&path).await.expect("open test db");
        (storage, path)
    }

    fn candidate() -> CandidateProfile {
        CandidateProfile {
            name: "Jane Doe".into(),
            github: "https://github.com/janedoe".into(),
            cv_filename: "jane_doe.pdf".into(),
            status: "Accepted".into(),
        }
    }

    #[tokio::test]
    async fn open_creates_empty_table() {
        let (storage, path) = test_storage().await;
        assert_eq!(storage.count_candidates().await.unwrap(), 0);
        assert!(storage.list_candidates().await.unwrap().is_empty());
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn reopen_keeps_rows() {
        let path = temp_db_path();
        let s1 = Storage::open(&path).await.expect("first open");
        s1.save_candidate(&candidate()).await.unwrap();
        drop(s1);

        let s2 = Storage::open(&path).await.expect("second open");
        assert_eq!(s2.count_candidates().await.unwrap(), 1);
        assert_eq!(s2.list_candidates().await.unwrap()[0], candidate());
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn duplicate_saves_append_distinct_rows() {
        let (storage, path) = test_storage().await;
        let profile = candidate();

        storage.save_candidate(&profile).await.expect("first save");
        assert_eq!(storage.count_candidates().await.unwrap(), 1);

        storage.save_candidate(&profile).await.expect("second save");
        assert_eq!(storage.count_candidates().await.unwrap(), 2);

        let rows = storage.list_candidates().await.unwrap();
        assert_eq!(rows, vec![profile.clone(), profile]);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn list_preserves_insertion_order() {
        let (storage, path) = test_storage().await;
        for name in ["Charlie", "Alice", "Bob"] {
            let profile = CandidateProfile {
                name: name.into(),
                ..candidate()
            };
            storage.save_candidate(&profile).await.unwrap();
        }

        let names: Vec<String> = storage
            .list_candidates()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, ["Charlie", "Alice", "Bob"]);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn open_creates_parent_directories() {
        let dir = std::env::temp_dir().join(format!("cvscreen_dir_{}", Uuid::now_v7()));
        let path = dir.join("nested").join("cv_table.db");
        let storage = Storage::open(&path).await.expect("open nested");
        storage.save_candidate(&candidate()).await.unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
