use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{StoreError, StudentStore};
use crate::students::domain::{NewStudent, StudentRecord};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS students (
        id SERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        guardian_name TEXT NOT NULL,
        guardian_phone TEXT NOT NULL,
        student_phone TEXT,
        dob DATE NOT NULL,
        address TEXT NOT NULL,
        class TEXT NOT NULL,
        subjects TEXT,
        photo_path TEXT
    )
"#;

/// Networked record store backed by PostgreSQL.
///
/// `dob` is a `DATE` column here: the submitted text is cast on insert, so a value PostgreSQL
/// cannot read as a date fails the statement.
#[derive(Debug, Clone)]
pub struct PostgresStudentStore {
    pool: PgPool,
}

impl PostgresStudentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await
            .map_err(StoreError::Unavailable)?;

        Ok(Self::new(pool))
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl StudentStore for PostgresStudentStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, student: &NewStudent) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO students
                (name, guardian_name, guardian_phone, student_phone, dob, address, class, subjects, photo_path)
            VALUES ($1, $2, $3, $4, $5::date, $6, $7, $8, $9)
            RETURNING id::BIGINT
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
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<StudentRecord>, StoreError> {
        let records = sqlx::query_as::<_, StudentRecord>(
            r#"
            SELECT id::BIGINT AS id, name, guardian_name, guardian_phone, student_phone,
                   dob::TEXT AS dob, address, class, subjects, photo_path
            FROM students
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}
