use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sqlx::sqlite::{SqliteConnection, SqlitePool, SqlitePoolOptions};

use crate::error::{JudgeError, Result};

const DATABASE_NAME: &str = "classjudge.sqlite3";

pub fn get_db_path() -> PathBuf {
    use directories::ProjectDirs;

    let proj_dirs =
        ProjectDirs::from("", "", "classjudge").expect("Unable to find user directory");
    let data_dir = proj_dirs.data_local_dir();

    fs::create_dir_all(data_dir).expect("Failed to create local data dir");

    data_dir.join(DATABASE_NAME)
}

pub async fn init_db(db_path: impl AsRef<Path>) -> sqlx::Result<SqlitePool> {
    let db_url = format!("sqlite://{}?mode=rwc", db_path.as_ref().display()); // rwc = read/write/create
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&db_url)
        .await?;

    // PRAGMA statements cannot be run inside a transaction
    for pragma_sql in &[
        "PRAGMA foreign_keys = ON;",
        "PRAGMA busy_timeout = 2000;",
        "PRAGMA journal_mode = WAL;",
        "PRAGMA synchronous = NORMAL;",
    ] {
        sqlx::query(pragma_sql).execute(&db_pool).await?;
    }

    let mut tx = db_pool.begin().await?;

    for sql in &[
        r"
        CREATE TABLE IF NOT EXISTS problems (
            id            INTEGER  PRIMARY KEY AUTOINCREMENT,
            description   TEXT     NOT NULL,
            active        BOOLEAN  NOT NULL DEFAULT 1
        );",
        r"
        CREATE TABLE IF NOT EXISTS test_cases (
            tc_id         INTEGER  PRIMARY KEY AUTOINCREMENT,
            input         TEXT     NOT NULL,
            output        TEXT     NOT NULL,
            problem_id    INTEGER  NOT NULL,
            FOREIGN KEY (problem_id)  REFERENCES problems (id)
        );",
        "CREATE INDEX IF NOT EXISTS idx_test_cases_problem ON test_cases(problem_id, tc_id);",
    ] {
        sqlx::query(sql).execute(tx.as_mut()).await?;
    }

    tx.commit().await?;

    log::info!("Initialized database at {}", db_path.as_ref().display());

    Ok(db_pool)
}

pub fn remove_db(db_path: impl AsRef<Path>) {
    // WAL and SHM files might not exist
    let wal_path = format!("{}-wal", db_path.as_ref().display());
    let shm_path = format!("{}-shm", db_path.as_ref().display());
    let _ = fs::remove_file(wal_path);
    let _ = fs::remove_file(shm_path);

    if let Err(e) = std::fs::remove_file(&db_path) {
        log::warn!(
            "Unable to remove database at {}: {e}",
            db_path.as_ref().display()
        );
    } else {
        log::info!("Removed database at {}", db_path.as_ref().display());
    }
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub id: i64,
    pub description: String,
    pub active: bool,
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    #[sqlx(rename = "tc_id")]
    pub id: i64,
    pub input: String,
    pub output: String,
    pub problem_id: i64,
}

/// Full contents of both tables, for diagnostics.
#[derive(Serialize, Debug, Default, PartialEq, Eq)]
pub struct Dump {
    pub problems: Vec<Problem>,
    pub test_cases: Vec<TestCase>,
}

/// Ordered (input, output) pairs from a single `testcase add` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureBatch(Vec<(String, String)>);

impl FixtureBatch {
    /// Pairs up instructor tokens as `input output input output ...`.
    ///
    /// An odd or zero token count is rejected so that a batch is never
    /// half-specified.
    pub fn from_tokens<S: Into<String>>(tokens: Vec<S>) -> Result<Self> {
        let count = tokens.len();
        if count == 0 || count % 2 != 0 {
            return Err(JudgeError::MalformedFixtureBatch(count));
        }

        let mut pairs = Vec::with_capacity(count / 2);
        let mut tokens = tokens.into_iter().map(Into::into);
        while let (Some(input), Some(output)) = (tokens.next(), tokens.next()) {
            pairs.push((input, output));
        }
        Ok(Self(pairs))
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Owner of the problem and test case tables.
///
/// Created once at startup and handed to whoever needs fixtures. Performs no
/// permission checks. Every mutation validates its target inside the same
/// transaction that applies it.
#[derive(Clone)]
pub struct FixtureStore {
    pool: SqlitePool,
}

impl FixtureStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn add_problem(&self, description: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO problems (description, active) VALUES (?, 1)")
            .bind(description)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        log::info!("Added problem {id}");
        Ok(id)
    }

    pub async fn edit_problem(&self, id: i64, description: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        ensure_problem(tx.as_mut(), id).await?;

        sqlx::query("UPDATE problems SET description = ? WHERE id = ?")
            .bind(description)
            .bind(id)
            .execute(tx.as_mut())
            .await?;

        tx.commit().await?;
        log::info!("Edited description of problem {id}");
        Ok(())
    }

    /// Deletes a problem together with all of its test cases.
    ///
    /// # Errors
    ///
    /// - `UnknownProblem` if `id` does not exist; nothing is deleted.
    /// - `Database` if any statement or the commit fails; the transaction is
    ///   rolled back on drop so no orphan rows remain.
    pub async fn delete_problem(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        ensure_problem(tx.as_mut(), id).await?;

        let removed_cases = sqlx::query("DELETE FROM test_cases WHERE problem_id = ?")
            .bind(id)
            .execute(tx.as_mut())
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM problems WHERE id = ?")
            .bind(id)
            .execute(tx.as_mut())
            .await?;

        tx.commit().await?;
        log::info!("Deleted problem {id} and {removed_cases} test cases");
        Ok(())
    }

    pub async fn activate_problem(&self, id: i64) -> Result<()> {
        self.set_active(id, true).await
    }

    pub async fn deactivate_problem(&self, id: i64) -> Result<()> {
        self.set_active(id, false).await
    }

    async fn set_active(&self, id: i64, active: bool) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        ensure_problem(tx.as_mut(), id).await?;

        sqlx::query("UPDATE problems SET active = ? WHERE id = ?")
            .bind(active)
            .bind(id)
            .execute(tx.as_mut())
            .await?;

        tx.commit().await?;
        log::info!("Set problem {id} active = {active}");
        Ok(())
    }

    pub async fn find_problem(&self, id: i64) -> Result<Option<Problem>> {
        let problem = sqlx::query_as::<_, Problem>(
            "SELECT id, description, active FROM problems WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(problem)
    }

    pub async fn list_active_problems(&self) -> Result<Vec<Problem>> {
        let problems = sqlx::query_as::<_, Problem>(
            "SELECT id, description, active FROM problems WHERE active = 1 ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(problems)
    }

    /// Inserts every pair of `batch` for `problem_id`, or none of them.
    ///
    /// Returns the new test case ids in batch order.
    pub async fn add_test_cases(&self, problem_id: i64, batch: &FixtureBatch) -> Result<Vec<i64>> {
        let mut tx = self.pool.begin().await?;
        ensure_problem(tx.as_mut(), problem_id).await?;

        let mut ids = Vec::with_capacity(batch.len());
        for (input, output) in batch.pairs() {
            let result =
                sqlx::query("INSERT INTO test_cases (input, output, problem_id) VALUES (?, ?, ?)")
                    .bind(input)
                    .bind(output)
                    .bind(problem_id)
                    .execute(tx.as_mut())
                    .await?;
            ids.push(result.last_insert_rowid());
        }

        tx.commit().await?;
        log::info!("Added {} test cases to problem {problem_id}", ids.len());
        Ok(ids)
    }

    pub async fn edit_test_case(&self, tc_id: i64, input: &str, output: &str) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let problem_id = ensure_test_case(tx.as_mut(), tc_id).await?;
        // Files created before foreign keys were enforced can hold orphans
        ensure_problem(tx.as_mut(), problem_id).await?;

        sqlx::query("UPDATE test_cases SET input = ?, output = ? WHERE tc_id = ?")
            .bind(input)
            .bind(output)
            .bind(tc_id)
            .execute(tx.as_mut())
            .await?;

        tx.commit().await?;
        log::info!("Edited test case {tc_id} of problem {problem_id}");
        Ok(())
    }

    pub async fn delete_test_case(&self, tc_id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        ensure_test_case(tx.as_mut(), tc_id).await?;

        sqlx::query("DELETE FROM test_cases WHERE tc_id = ?")
            .bind(tc_id)
            .execute(tx.as_mut())
            .await?;

        tx.commit().await?;
        log::info!("Deleted test case {tc_id}");
        Ok(())
    }

    /// Test cases of a problem in ascending id order, which is also the
    /// order of cases in a judge report.
    pub async fn list_test_cases(&self, problem_id: i64) -> Result<Vec<TestCase>> {
        let cases = sqlx::query_as::<_, TestCase>(
            r#"
            SELECT tc_id, input, output, problem_id
            FROM test_cases
            WHERE problem_id = ?
            ORDER BY tc_id
            "#,
        )
        .bind(problem_id)
        .fetch_all(&self.pool)
        .await?;

        log::debug!("Fetched {} test cases of problem {problem_id}", cases.len());
        Ok(cases)
    }

    pub async fn dump(&self) -> Result<Dump> {
        let problems =
            sqlx::query_as::<_, Problem>("SELECT id, description, active FROM problems ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        let test_cases = sqlx::query_as::<_, TestCase>(
            "SELECT tc_id, input, output, problem_id FROM test_cases ORDER BY tc_id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(Dump {
            problems,
            test_cases,
        })
    }
}

async fn ensure_problem(conn: &mut SqliteConnection, id: i64) -> Result<()> {
    let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM problems WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    match found {
        Some(_) => Ok(()),
        None => Err(JudgeError::UnknownProblem(id)),
    }
}

/// Returns the owning problem id of an existing test case
async fn ensure_test_case(conn: &mut SqliteConnection, tc_id: i64) -> Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT problem_id FROM test_cases WHERE tc_id = ?")
        .bind(tc_id)
        .fetch_optional(conn)
        .await?
        .ok_or(JudgeError::UnknownTestCase(tc_id))
}
