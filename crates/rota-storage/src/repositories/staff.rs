use rota_core::{DatabaseOperation, DefinedError};
use sqlx::SqliteConnection;

use crate::{QueryExecutor, RunOutcome, models::Staff};

#[derive(Debug, Clone)]
pub struct StaffRepository {
    db: QueryExecutor,
}

impl StaffRepository {
    pub const fn new(db: QueryExecutor) -> Self {
        Self { db }
    }

    /// # Errors
    ///
    /// Returns a `Create` database error if the insert fails
    pub async fn create(&self, staff: &Staff) -> Result<(), DefinedError> {
        self.db
            .run(
                self.db.pool(),
                "INSERT INTO Staffs (id, userId, name, email, phoneNumber, image, color, createDate, modifyDate) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                &[
                    (&staff.id).into(),
                    (&staff.user_id).into(),
                    (&staff.name).into(),
                    staff.email.clone().into(),
                    staff.phone_number.clone().into(),
                    staff.image.clone().into(),
                    (&staff.color).into(),
                    (&staff.create_date).into(),
                    (&staff.modify_date).into(),
                ],
                DatabaseOperation::Create,
            )
            .await?;

        Ok(())
    }

    /// # Errors
    ///
    /// Returns a `Read` database error if the query fails
    pub async fn find_by_name(&self, user_id: &str, name: &str) -> Result<Option<Staff>, DefinedError> {
        self.db
            .get(
                self.db.pool(),
                "SELECT * FROM Staffs WHERE userId = ? AND name = ?",
                &[user_id.into(), name.into()],
                DatabaseOperation::Read,
            )
            .await
    }

    /// # Errors
    ///
    /// Returns a `Read` database error if the query fails
    pub async fn find_by_id(&self, user_id: &str, id: &str) -> Result<Option<Staff>, DefinedError> {
        self.db
            .get(
                self.db.pool(),
                "SELECT * FROM Staffs WHERE userId = ? AND id = ?",
                &[user_id.into(), id.into()],
                DatabaseOperation::Read,
            )
            .await
    }

    /// # Errors
    ///
    /// Returns a `Read` database error if the query fails
    pub async fn list(&self, user_id: &str) -> Result<Vec<Staff>, DefinedError> {
        self.db
            .all(
                self.db.pool(),
                "SELECT * FROM Staffs WHERE userId = ? ORDER BY name",
                &[user_id.into()],
                DatabaseOperation::Read,
            )
            .await
    }

    /// # Errors
    ///
    /// Returns an `Update` database error if the statement fails
    pub async fn update(&self, staff: &Staff) -> Result<RunOutcome, DefinedError> {
        self.db
            .run(
                self.db.pool(),
                "UPDATE Staffs SET name = ?, email = ?, phoneNumber = ?, image = ?, color = ?, modifyDate = ? \
                 WHERE id = ? AND userId = ?",
                &[
                    (&staff.name).into(),
                    staff.email.clone().into(),
                    staff.phone_number.clone().into(),
                    staff.image.clone().into(),
                    (&staff.color).into(),
                    (&staff.modify_date).into(),
                    (&staff.id).into(),
                    (&staff.user_id).into(),
                ],
                DatabaseOperation::Update,
            )
            .await
    }

    /// Delete on the caller's transaction
    ///
    /// # Errors
    ///
    /// Returns a `Delete` database error if the statement fails
    pub async fn delete(&self, conn: &mut SqliteConnection, id: &str) -> Result<RunOutcome, DefinedError> {
        self.db
            .run(conn, "DELETE FROM Staffs WHERE id = ?", &[id.into()], DatabaseOperation::Delete)
            .await
    }
}

#[cfg(test)]
mod tests {
    use rota_core::ErrorKind;

    use super::*;
    use crate::{
        models::{new_id, timestamp},
        test_support,
    };

    fn staff(user_id: &str, name: &str) -> Staff {
        Staff {
            id: new_id(),
            user_id: user_id.into(),
            name: name.into(),
            email: None,
            phone_number: Some("555-0100".into()),
            image: None,
            color: "#336699".into(),
            create_date: timestamp(),
            modify_date: timestamp(),
        }
    }

    #[tokio::test]
    async fn create_and_find() {
        let repo = StaffRepository::new(test_support::executor().await);
        let ana = staff("u1", "ana");
        repo.create(&ana).await.unwrap();

        assert_eq!(repo.find_by_name("u1", "ana").await.unwrap(), Some(ana.clone()));
        assert_eq!(repo.find_by_id("u1", &ana.id).await.unwrap(), Some(ana.clone()));
        assert!(repo.find_by_name("u2", "ana").await.unwrap().is_none());
        assert_eq!(repo.list("u1").await.unwrap(), vec![ana]);
    }

    #[tokio::test]
    async fn duplicate_name_fails_as_create_error() {
        let repo = StaffRepository::new(test_support::executor().await);
        repo.create(&staff("u1", "ana")).await.unwrap();

        let error = repo.create(&staff("u1", "ana")).await.unwrap_err();
        assert!(matches!(
            error.kind(),
            ErrorKind::Database {
                operation: DatabaseOperation::Create,
                query: Some(_)
            }
        ));
    }

    #[tokio::test]
    async fn update_reports_rows_affected() {
        let repo = StaffRepository::new(test_support::executor().await);
        let mut ana = staff("u1", "ana");
        repo.create(&ana).await.unwrap();

        ana.color = "#000000".into();
        assert_eq!(repo.update(&ana).await.unwrap().rows_affected, 1);

        let ghost = staff("u1", "ghost");
        assert_eq!(repo.update(&ghost).await.unwrap().rows_affected, 0);
    }
}
