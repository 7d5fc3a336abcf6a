use rota_core::{DatabaseOperation, DefinedError};
use sqlx::SqliteConnection;

use crate::{QueryExecutor, RunOutcome, SqlValue, models::Appointment};

#[derive(Debug, Clone)]
pub struct AppointmentRepository {
    db: QueryExecutor,
}

impl AppointmentRepository {
    pub const fn new(db: QueryExecutor) -> Self {
        Self { db }
    }

    /// # Errors
    ///
    /// Returns a `Create` database error if the insert fails
    pub async fn create(&self, appointment: &Appointment) -> Result<(), DefinedError> {
        self.db
            .run(
                self.db.pool(),
                "INSERT INTO StaffAppointments (id, staffId, weekViewId, startDate, endDate, location, createDate, modifyDate) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                &[
                    (&appointment.id).into(),
                    (&appointment.staff_id).into(),
                    (&appointment.week_view_id).into(),
                    (&appointment.start_date).into(),
                    (&appointment.end_date).into(),
                    appointment.location.clone().into(),
                    (&appointment.create_date).into(),
                    (&appointment.modify_date).into(),
                ],
                DatabaseOperation::Create,
            )
            .await?;

        Ok(())
    }

    /// Appointments of every staff member owned by `user_id`
    ///
    /// # Errors
    ///
    /// Returns a `Read` database error if the query fails
    pub async fn list_for_user(
        &self,
        user_id: &str,
        week_view_id: Option<&str>,
    ) -> Result<Vec<Appointment>, DefinedError> {
        let mut statement = String::from(
            "SELECT a.* FROM StaffAppointments a JOIN Staffs s ON s.id = a.staffId WHERE s.userId = ?",
        );
        let mut params: Vec<SqlValue> = vec![user_id.into()];

        if let Some(week_view_id) = week_view_id {
            statement.push_str(" AND a.weekViewId = ?");
            params.push(week_view_id.into());
        }
        statement.push_str(" ORDER BY a.startDate");

        self.db
            .all(self.db.pool(), &statement, &params, DatabaseOperation::Read)
            .await
    }

    /// # Errors
    ///
    /// Returns a `Delete` database error if the statement fails
    pub async fn delete_for_staff(&self, conn: &mut SqliteConnection, staff_id: &str) -> Result<RunOutcome, DefinedError> {
        self.db
            .run(
                conn,
                "DELETE FROM StaffAppointments WHERE staffId = ?",
                &[staff_id.into()],
                DatabaseOperation::Delete,
            )
            .await
    }

    /// # Errors
    ///
    /// Returns a `Delete` database error if the statement fails
    pub async fn delete_week(&self, staff_id: &str, week_view_id: &str) -> Result<RunOutcome, DefinedError> {
        self.db
            .run(
                self.db.pool(),
                "DELETE FROM StaffAppointments WHERE staffId = ? AND weekViewId = ?",
                &[staff_id.into(), week_view_id.into()],
                DatabaseOperation::Delete,
            )
            .await
    }
}
