use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::debug;

use super::{StoreError, StudentStore};
use crate::students::domain::{NewStudent, StudentRecord};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS students (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        guardian_name TEXT NOT NULL,
        guardian_phone TEXT NOT NULL,
        student_phone TEXT,
        dob TEXT NOT NULL,
        address TEXT NOT NULL,
        class TEXT NOT NULL,
        subjects TEXT,
        photo_path TEXT
    )
"#;

/// Embedded record store backed by a local SQLite file.
#[derive(Debug, Clone)]
pub struct SqliteStudentStore {
    pool: SqlitePool,
}

impl SqliteStudentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating if missing) the database file at `path`.
    pub async fn open(path: &Path, max_connections: u32) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(StoreError::Unavailable)?;

        debug!(path = %path.display(), "opened sqlite pool");
        Ok(Self::new(pool))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl StudentStore for SqliteStudentStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, student: &NewStudent) -> Result<i64, StoreError> {
        let id = sqlx::query(
            r#"
            INSERT INTO students
                (name, guardian_name, guardian_phone, student_phone, dob, address, class, subjects, photo_path)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&student.name)
        .bind(&student.guardian_name)
        .bind(&student.guardian_phone)
        .bind(&student.student_phone)
        .bind(&student.dob)
        .bind(&student.address)
        .bind(&student.class)
        .bind(&student.subjects)
        .bind(&student.photo_path)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<StudentRecord>, StoreError> {
        let records = sqlx::query_as::<_, StudentRecord>(
            r#"
            SELECT id, name, guardian_name, guardian_phone, student_phone, dob, address, class,
                   subjects, photo_path
            FROM students
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_store() -> (SqliteStudentStore, TempDir) {
        let dir = TempDir::new().expect("temp dir");
        let store = SqliteStudentStore::open(&dir.path().join("admissions.db"), 1)
            .await
            .expect("store opens");
        store.initialize().await.expect("table created");
        (store, dir)
    }

    fn student(name: &str) -> NewStudent {
        NewStudent {
            name: name.to_string(),
            guardian_name: "Meera Rao".to_string(),
            guardian_phone: "555-0100".to_string(),
            student_phone: String::new(),
            dob: "2012-04-09".to_string(),
            address: "12 Lake Road".to_string(),
            class: "6".to_string(),
            subjects: "Math, Science".to_string(),
            photo_path: None,
        }
    }

    #[tokio::test]
    async fn insert_then_list_round_trips_columns() {
        let (store, _dir) = create_test_store().await;
        let mut new_student = student("Asha Rao");
        new_student.photo_path = Some("uploads/asha.png".to_string());

        let id = store.insert(&new_student).await.expect("insert succeeds");
        let records = store.list_all().await.expect("list succeeds");

        assert_eq!(records, vec![StudentRecord::from_new(id, new_student)]);
    }

    #[tokio::test]
    async fn ids_increase_with_each_insert() {
        let (store, _dir) = create_test_store().await;

        let mut ids = Vec::new();
        for name in ["A", "B", "C", "D"] {
            ids.push(store.insert(&student(name)).await.expect("insert succeeds"));
        }

        assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
        let listed: Vec<i64> = store
            .list_all()
            .await
            .expect("list succeeds")
            .into_iter()
            .map(|record| record.id)
            .collect();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn initialize_is_idempotent() {
        let (store, _dir) = create_test_store().await;
        store.insert(&student("Kept")).await.expect("insert succeeds");

        store.initialize().await.expect("second initialize");

        assert_eq!(store.list_all().await.expect("list succeeds").len(), 1);
    }

    #[tokio::test]
    async fn open_creates_missing_parent_directories() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("data").join("school").join("admissions.db");

        let store = SqliteStudentStore::open(&path, 1).await.expect("store opens");
        store.initialize().await.expect("table created");

        assert!(path.exists());
    }

    #[tokio::test]
    async fn legacy_rows_with_null_optionals_decode() {
        let (store, _dir) = create_test_store().await;
        sqlx::query(
            "INSERT INTO students (name, guardian_name, guardian_phone, dob, address, class) \
             VALUES ('Old', 'G', '1', '2010-01-01', 'Addr', '9')",
        )
        .execute(&store.pool)
        .await
        .expect("raw insert");

        let records = store.list_all().await.expect("list succeeds");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].student_phone, None);
        assert_eq!(records[0].subjects, None);
        assert_eq!(records[0].photo_path, None);
    }
}
