use rota_core::{DatabaseOperation, DefinedError};
use sqlx::SqliteConnection;

use crate::{QueryExecutor, RunOutcome, models::SharedLink};

#[derive(Debug, Clone)]
pub struct SharedLinkRepository {
    db: QueryExecutor,
}

impl SharedLinkRepository {
    pub const fn new(db: QueryExecutor) -> Self {
        Self { db }
    }

    /// # Errors
    ///
    /// Returns a `Create` database error if the insert fails
    pub async fn create(&self, conn: &mut SqliteConnection, link: &SharedLink) -> Result<(), DefinedError> {
        self.db
            .run(
                conn,
                "INSERT INTO SharedAppointmentLinks (id, userId, weekViewIds, expiry, permission, createDate, modifyDate) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                &[
                    (&link.id).into(),
                    (&link.user_id).into(),
                    (&link.week_view_ids).into(),
                    link.expiry.clone().into(),
                    (&link.permission).into(),
                    (&link.create_date).into(),
                    (&link.modify_date).into(),
                ],
                DatabaseOperation::Create,
            )
            .await?;

        Ok(())
    }

    /// # Errors
    ///
    /// Returns a `Read` database error if the query fails
    pub async fn find_by_id(&self, id: &str) -> Result<Option<SharedLink>, DefinedError> {
        self.db
            .get(
                self.db.pool(),
                "SELECT * FROM SharedAppointmentLinks WHERE id = ?",
                &[id.into()],
                DatabaseOperation::Read,
            )
            .await
    }

    /// # Errors
    ///
    /// Returns a `Read` database error if the query fails
    pub async fn find_for_user(&self, conn: &mut SqliteConnection, user_id: &str) -> Result<Vec<SharedLink>, DefinedError> {
        self.db
            .all(
                conn,
                "SELECT * FROM SharedAppointmentLinks WHERE userId = ?",
                &[user_id.into()],
                DatabaseOperation::Read,
            )
            .await
    }

    /// # Errors
    ///
    /// Returns a `Delete` database error if the statement fails
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<RunOutcome, DefinedError> {
        self.db
            .run(
                self.db.pool(),
                "DELETE FROM SharedAppointmentLinks WHERE id = ? AND userId = ?",
                &[id.into(), user_id.into()],
                DatabaseOperation::Delete,
            )
            .await
    }

    /// # Errors
    ///
    /// Returns a `Delete` database error if the statement fails
    pub async fn delete_for_user(&self, conn: &mut SqliteConnection, user_id: &str) -> Result<RunOutcome, DefinedError> {
        self.db
            .run(
                conn,
                "DELETE FROM SharedAppointmentLinks WHERE userId = ?",
                &[user_id.into()],
                DatabaseOperation::Delete,
            )
            .await
    }
}
