//! Statement execution sink.
//!
//! The driver opens one session per request and feeds it statements strictly
//! in order. A session owns a single connection so per-connection state such
//! as `USE <db>` carries from one statement to the next.

use std::str::FromStr;
use std::time::Instant;

use async_trait::async_trait;
use serde::Serialize;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection, Executor};
use thiserror::Error;

use crate::credentials::Credential;

/// Where statements of one request run.
#[derive(Debug, Clone)]
pub struct ExecutionTarget {
    pub credential: Credential,
    pub database: Option<String>,
    /// Opaque identifier of the target cluster/instance, for logging
    pub resource: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementOutcome {
    pub rows_affected: u64,
    pub elapsed_ms: u64,
}

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("unsupported connection scheme: {0}")]
    UnsupportedScheme(String),
    #[error("connect failed: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("statement failed: {source}")]
    Statement {
        #[source]
        source: sqlx::Error,
    },
    /// Refusal reported by an executor that does not go through `sqlx`, such
    /// as a remote data API or an in-process fake.
    #[error("statement rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait StatementExecutor: Send + Sync {
    async fn open(&self, target: &ExecutionTarget)
        -> Result<Box<dyn StatementSession>, ExecuteError>;
}

#[async_trait]
pub trait StatementSession: Send {
    async fn execute(&mut self, sql: &str) -> Result<StatementOutcome, ExecuteError>;

    async fn close(self: Box<Self>) -> Result<(), ExecuteError>;
}

/// Executes against PostgreSQL or SQLite through `sqlx`, chosen by the
/// connection URL scheme.
#[derive(Debug, Clone, Default)]
pub struct SqlxExecutor;

enum SqlxConnection {
    Postgres(PgConnection),
    Sqlite(SqliteConnection),
}

pub struct SqlxSession {
    conn: SqlxConnection,
}

#[async_trait]
impl StatementExecutor for SqlxExecutor {
    async fn open(
        &self,
        target: &ExecutionTarget,
    ) -> Result<Box<dyn StatementSession>, ExecuteError> {
        let url = target.credential.connection_url.as_str();
        let scheme = url.split(':').next().unwrap_or_default().to_ascii_lowercase();

        let conn = match scheme.as_str() {
            "postgres" | "postgresql" => {
                let mut options = PgConnectOptions::from_str(url).map_err(ExecuteError::Connect)?;
                if let Some(database) = target.database.as_deref() {
                    options = options.database(database);
                }
                SqlxConnection::Postgres(options.connect().await.map_err(ExecuteError::Connect)?)
            }
            "sqlite" => {
                let options = SqliteConnectOptions::from_str(url)
                    .map_err(ExecuteError::Connect)?
                    .create_if_missing(true);
                SqlxConnection::Sqlite(options.connect().await.map_err(ExecuteError::Connect)?)
            }
            other => return Err(ExecuteError::UnsupportedScheme(other.to_string())),
        };

        tracing::debug!(
            scheme = %scheme,
            database = ?target.database,
            resource = ?target.resource,
            "statement session opened"
        );
        Ok(Box::new(SqlxSession { conn }))
    }
}

#[async_trait]
impl StatementSession for SqlxSession {
    async fn execute(&mut self, sql: &str) -> Result<StatementOutcome, ExecuteError> {
        let started = Instant::now();
        let rows_affected = match &mut self.conn {
            SqlxConnection::Postgres(conn) => conn.execute(sql).await.map(|r| r.rows_affected()),
            SqlxConnection::Sqlite(conn) => conn.execute(sql).await.map(|r| r.rows_affected()),
        }
        .map_err(|source| ExecuteError::Statement { source })?;

        Ok(StatementOutcome {
            rows_affected,
            elapsed_ms: started.elapsed().as_millis() as u64,
        })
    }

    async fn close(self: Box<Self>) -> Result<(), ExecuteError> {
        match self.conn {
            SqlxConnection::Postgres(conn) => conn.close().await,
            SqlxConnection::Sqlite(conn) => conn.close().await,
        }
        .map_err(ExecuteError::Connect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(url: &str) -> ExecutionTarget {
        ExecutionTarget {
            credential: Credential {
                connection_url: url.to_string(),
            },
            database: None,
            resource: None,
        }
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let result = SqlxExecutor.open(&target("mysql://root@localhost/app")).await;
        assert!(matches!(result, Err(ExecuteError::UnsupportedScheme(s)) if s == "mysql"));
    }

    #[tokio::test]
    async fn test_sqlite_memory_session() {
        let mut session = SqlxExecutor.open(&target("sqlite::memory:")).await.unwrap();
        session
            .execute("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT)")
            .await
            .unwrap();
        let outcome = session
            .execute("INSERT INTO t (name) VALUES ('a'), ('b')")
            .await
            .unwrap();
        assert_eq!(outcome.rows_affected, 2);
        session.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_statement_error() {
        let mut session = SqlxExecutor.open(&target("sqlite::memory:")).await.unwrap();
        let err = session.execute("SELECT * FROM missing_table").await.unwrap_err();
        assert!(matches!(err, ExecuteError::Statement { .. }));
    }
}
