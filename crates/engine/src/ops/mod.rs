use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, DeleteResult, SqlErr};

use crate::{EngineError, ResultEngine, TokenSigner};

mod access;
mod assignments;
mod attendance;
mod auth;
mod classes;
mod reports;
mod students;
mod subjects;
mod teachers;
mod users;

pub use auth::LoginOutcome;
pub use users::CredentialsUpdate;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// The block runs as its own async block, so `?` inside it still reaches the
/// rollback arm and the connection goes back to the pool on every path.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result: $crate::ResultEngine<_> = async { $body }.await;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = $tx.rollback().await {
                    tracing::error!("transaction rollback failed: {rollback_err}");
                }
                Err(err)
            }
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    tokens: TokenSigner,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

fn normalize_required(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation(format!("{label} is required")));
    }
    Ok(trimmed.to_string())
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn is_foreign_key_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}

/// Maps a uniqueness violation to `duplicate`, anything else to a database error.
fn on_unique(err: DbErr, duplicate: impl FnOnce() -> EngineError) -> EngineError {
    if is_unique_violation(&err) {
        duplicate()
    } else {
        EngineError::Database(err)
    }
}

/// Makes the current transaction the database writer before it reads.
///
/// SQLite transactions start deferred. A concurrent writer that committed
/// between our first read and our first write turns that write into an
/// immediate `SQLITE_BUSY`. Writing first makes the busy timeout apply
/// instead, and every later read sees the other writer's commit.
async fn lock_for_write<C: ConnectionTrait>(db: &C) -> ResultEngine<()> {
    db.execute_unprepared("UPDATE attendance_sessions SET id = id WHERE 1 = 0")
        .await?;
    Ok(())
}

/// Fails with `NotFound(label)` when the delete matched no row.
fn ensure_deleted(result: &DeleteResult, label: &str) -> ResultEngine<()> {
    if result.rows_affected == 0 {
        return Err(EngineError::NotFound(label.to_string()));
    }
    Ok(())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    token_secret: Option<String>,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Secret used to sign and verify session tokens.
    pub fn token_secret(mut self, secret: &str) -> EngineBuilder {
        self.token_secret = Some(secret.to_string());
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let secret = self
            .token_secret
            .ok_or_else(|| EngineError::Validation("token secret is required".to_string()))?;
        Ok(Engine {
            database: self.database,
            tokens: TokenSigner::new(&secret)?,
        })
    }
}
