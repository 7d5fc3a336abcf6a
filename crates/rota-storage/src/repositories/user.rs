use rota_core::{DatabaseOperation, DefinedError};

use crate::{QueryExecutor, models::User};

#[derive(Debug, Clone)]
pub struct UserRepository {
    db: QueryExecutor,
}

impl UserRepository {
    pub const fn new(db: QueryExecutor) -> Self {
        Self { db }
    }

    /// # Errors
    ///
    /// Returns a `Create` database error if the insert fails, including
    /// when the email is already registered
    pub async fn create(&self, user: &User) -> Result<(), DefinedError> {
        self.db
            .run(
                self.db.pool(),
                "INSERT INTO Users (id, firstName, lastName, email, passwordHash, color, image, phoneNumber, \
                 createDate, modifyDate) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                &[
                    (&user.id).into(),
                    (&user.first_name).into(),
                    (&user.last_name).into(),
                    (&user.email).into(),
                    (&user.password_hash).into(),
                    (&user.color).into(),
                    user.image.clone().into(),
                    user.phone_number.clone().into(),
                    (&user.create_date).into(),
                    (&user.modify_date).into(),
                ],
                DatabaseOperation::Create,
            )
            .await?;

        Ok(())
    }

    /// # Errors
    ///
    /// Returns a `Read` database error if the query fails
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DefinedError> {
        self.db
            .get(
                self.db.pool(),
                "SELECT * FROM Users WHERE email = ?",
                &[email.into()],
                DatabaseOperation::Read,
            )
            .await
    }

    /// # Errors
    ///
    /// Returns a `Read` database error if the query fails
    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>, DefinedError> {
        self.db
            .get(self.db.pool(), "SELECT * FROM Users WHERE id = ?", &[id.into()], DatabaseOperation::Read)
            .await
    }
}
