//! SQLite persistence for accounts, staff, appointments, and share links

#![allow(clippy::must_use_candidate)]

mod executor;
pub mod models;
mod pool;
pub mod repositories;
mod schema;

pub use executor::{QueryExecutor, RunOutcome, ScopedTransaction, SqlValue};
pub use pool::connect;
pub use repositories::{AppointmentRepository, SharedLinkRepository, StaffRepository, UserRepository};
pub use schema::migrate;
pub use sqlx::{SqliteConnection, SqlitePool};

#[cfg(test)]
pub(crate) mod test_support {
    use rota_config::DatabaseConfig;
    use rota_errors::ErrorHandler;

    use crate::QueryExecutor;

    /// Fresh in-memory database with the schema applied
    pub async fn executor() -> QueryExecutor {
        let pool = crate::connect(&DatabaseConfig::default()).await.unwrap();
        let executor = QueryExecutor::new(pool, ErrorHandler::default());
        crate::migrate(&executor).await.unwrap();
        executor
    }
}
