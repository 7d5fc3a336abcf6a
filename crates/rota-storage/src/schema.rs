use rota_core::{DatabaseOperation, DefinedError};

use crate::QueryExecutor;

const SCHEMA: &str = include_str!("../resources/schema.sql");

/// Create any missing tables; safe to run on every start
///
/// # Errors
///
/// Returns a generic database error if a statement fails
pub async fn migrate(executor: &QueryExecutor) -> Result<(), DefinedError> {
    let statements = SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty());

    for statement in statements {
        executor
            .run(executor.pool(), statement, &[], DatabaseOperation::GenericFail)
            .await?;
    }

    tracing::info!("database schema ready");

    Ok(())
}
