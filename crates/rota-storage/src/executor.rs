use std::fmt;

use futures_util::future::BoxFuture;
use rota_core::{DatabaseOperation, DefinedError};
use rota_errors::ErrorHandler;
use sqlx::{
    Arguments, Executor, FromRow, Sqlite, SqliteConnection, SqlitePool, Transaction,
    sqlite::{SqliteArguments, SqliteQueryResult, SqliteRow},
};

const COMPONENT: &str = "query_executor";

/// A positional statement parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&String> for SqlValue {
    fn from(value: &String) -> Self {
        Self::Text(value.clone())
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

fn arguments<'q>(params: &[SqlValue]) -> Result<SqliteArguments<'q>, sqlx::Error> {
    let mut args = SqliteArguments::default();

    for param in params {
        match param {
            SqlValue::Null => args.add(None::<String>),
            SqlValue::Integer(value) => args.add(*value),
            SqlValue::Real(value) => args.add(*value),
            SqlValue::Text(value) => args.add(value.clone()),
        }
        .map_err(sqlx::Error::Encode)?;
    }

    Ok(args)
}

/// Result of a statement that returns no rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub rows_affected: u64,
    pub last_insert_rowid: i64,
}

impl From<SqliteQueryResult> for RunOutcome {
    fn from(result: SqliteQueryResult) -> Self {
        Self {
            rows_affected: result.rows_affected(),
            last_insert_rowid: result.last_insert_rowid(),
        }
    }
}

/// Executes statements and converts storage failures into typed errors
///
/// Every failure becomes a database error of the caller's chosen operation,
/// carrying the statement text and the driver error as cause, and is routed
/// through the [`ErrorHandler`] before being returned.
#[derive(Clone)]
pub struct QueryExecutor {
    pool: SqlitePool,
    errors: ErrorHandler,
}

impl fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryExecutor").field("pool", &self.pool).finish_non_exhaustive()
    }
}

impl QueryExecutor {
    pub const fn new(pool: SqlitePool, errors: ErrorHandler) -> Self {
        Self { pool, errors }
    }

    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub const fn errors(&self) -> &ErrorHandler {
        &self.errors
    }

    fn fail(&self, error: sqlx::Error, statement: Option<&str>, operation: DatabaseOperation) -> DefinedError {
        self.errors
            .handle_unknown_database_error(error, COMPONENT, statement, operation)
    }

    /// Execute a statement that returns no rows
    ///
    /// # Errors
    ///
    /// Returns a database error of `operation` when the statement fails
    pub async fn run<'c, E>(
        &self,
        executor: E,
        statement: &str,
        params: &[SqlValue],
        operation: DatabaseOperation,
    ) -> Result<RunOutcome, DefinedError>
    where
        E: Executor<'c, Database = Sqlite>,
    {
        let result = match arguments(params) {
            Ok(args) => sqlx::query_with(statement, args).execute(executor).await,
            Err(error) => Err(error),
        };

        result
            .map(RunOutcome::from)
            .map_err(|error| self.fail(error, Some(statement), operation))
    }

    /// Fetch at most one row
    ///
    /// # Errors
    ///
    /// Returns a database error of `operation` when the query fails
    pub async fn get<'c, E, T>(
        &self,
        executor: E,
        statement: &str,
        params: &[SqlValue],
        operation: DatabaseOperation,
    ) -> Result<Option<T>, DefinedError>
    where
        E: Executor<'c, Database = Sqlite>,
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let result = match arguments(params) {
            Ok(args) => sqlx::query_as_with::<_, T, _>(statement, args).fetch_optional(executor).await,
            Err(error) => Err(error),
        };

        result.map_err(|error| self.fail(error, Some(statement), operation))
    }

    /// Fetch every matching row
    ///
    /// # Errors
    ///
    /// Returns a database error of `operation` when the query fails
    pub async fn all<'c, E, T>(
        &self,
        executor: E,
        statement: &str,
        params: &[SqlValue],
        operation: DatabaseOperation,
    ) -> Result<Vec<T>, DefinedError>
    where
        E: Executor<'c, Database = Sqlite>,
        T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
    {
        let result = match arguments(params) {
            Ok(args) => sqlx::query_as_with::<_, T, _>(statement, args).fetch_all(executor).await,
            Err(error) => Err(error),
        };

        result.map_err(|error| self.fail(error, Some(statement), operation))
    }

    /// Start a transaction on a dedicated pooled connection
    ///
    /// # Errors
    ///
    /// Returns a generic database error when no transaction can be started
    pub async fn begin_transaction(&self) -> Result<ScopedTransaction, DefinedError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|error| self.fail(error, None, DatabaseOperation::GenericFail))?;

        tracing::trace!("transaction started");

        Ok(ScopedTransaction { tx })
    }

    /// # Errors
    ///
    /// Returns a generic database error when the commit fails
    pub async fn commit(&self, tx: ScopedTransaction) -> Result<(), DefinedError> {
        tx.tx
            .commit()
            .await
            .map_err(|error| self.fail(error, None, DatabaseOperation::GenericFail))
    }

    /// # Errors
    ///
    /// Returns a generic database error when the rollback fails
    pub async fn rollback(&self, tx: ScopedTransaction) -> Result<(), DefinedError> {
        tx.tx
            .rollback()
            .await
            .map_err(|error| self.fail(error, None, DatabaseOperation::GenericFail))
    }

    /// Run `work` in a transaction, committing on `Ok` and rolling back on `Err`
    ///
    /// The closure receives the transaction's connection; anything it
    /// captures must be owned.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a generic database error when the
    /// transaction cannot be started or committed
    pub async fn with_transaction<T, F>(&self, work: F) -> Result<T, DefinedError>
    where
        F: for<'t> FnOnce(&'t mut SqliteConnection) -> BoxFuture<'t, Result<T, DefinedError>>,
    {
        let mut tx = self.begin_transaction().await?;

        match work(tx.conn()).await {
            Ok(value) => {
                self.commit(tx).await?;
                Ok(value)
            }
            Err(error) => {
                if let Err(rollback) = self.rollback(tx).await {
                    tracing::warn!(
                        trace_id = %rollback.trace_id(),
                        "rollback failed after transaction error"
                    );
                    self.errors.release(rollback.trace_id());
                }
                Err(error)
            }
        }
    }
}

/// Open transaction that rolls back unless committed
///
/// Dropping the handle on any path (early return, `?`, panic) discards the
/// transaction's writes.
pub struct ScopedTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl ScopedTransaction {
    /// Connection to run statements on inside the transaction
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }
}

impl fmt::Debug for ScopedTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedTransaction").finish_non_exhaustive()
    }
}
