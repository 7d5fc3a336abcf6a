use rota_core::{DatabaseOperation, DefinedError};
use rota_errors::ErrorHandler;
use rota_storage::{
    AppointmentRepository, QueryExecutor, StaffRepository,
    models::{Staff, new_id, timestamp},
};
use serde::Serialize;

use crate::forms::{NewStaff, StaffUpdate};

const COMPONENT: &str = "staff_service";

/// Outcome of removing a staff member
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedStaff {
    pub staff: Staff,
    pub appointments_removed: u64,
}

#[derive(Debug, Clone)]
pub struct StaffService {
    db: QueryExecutor,
    staff: StaffRepository,
    appointments: AppointmentRepository,
}

impl StaffService {
    pub fn new(db: QueryExecutor) -> Self {
        Self {
            staff: StaffRepository::new(db.clone()),
            appointments: AppointmentRepository::new(db.clone()),
            db,
        }
    }

    fn errors(&self) -> &ErrorHandler {
        self.db.errors()
    }

    fn wrap(&self, error: DefinedError) -> DefinedError {
        self.errors().handle_unknown_service_error(error, COMPONENT)
    }

    fn not_found(&self, message: String) -> DefinedError {
        let error = DefinedError::database(DatabaseOperation::RecordNotFound)
            .message(message)
            .build();
        self.errors().handle_error(error, COMPONENT)
    }

    fn exists(&self, name: &str) -> DefinedError {
        let error = DefinedError::database(DatabaseOperation::RecordExists)
            .message(format!("Staff name \"{name}\" already exists"))
            .build();
        self.errors().handle_error(error, COMPONENT)
    }

    /// # Errors
    ///
    /// `RecordExists` when the name is taken for this user
    pub async fn create(&self, user_id: &str, form: NewStaff) -> Result<Staff, DefinedError> {
        if self.staff.find_by_name(user_id, &form.name).await.map_err(|e| self.wrap(e))?.is_some() {
            return Err(self.exists(&form.name));
        }

        let now = timestamp();
        let staff = Staff {
            id: new_id(),
            user_id: user_id.to_owned(),
            name: form.name,
            email: form.email,
            phone_number: form.phone_number,
            image: form.image,
            color: form.color,
            create_date: now.clone(),
            modify_date: now,
        };

        self.staff.create(&staff).await.map_err(|e| self.wrap(e))?;
        tracing::info!(user_id, staff_id = %staff.id, "staff created");

        Ok(staff)
    }

    /// # Errors
    ///
    /// `RecordNotFound` when no staff member has this name
    pub async fn get_by_name(&self, user_id: &str, name: &str) -> Result<Staff, DefinedError> {
        self.staff
            .find_by_name(user_id, name)
            .await
            .map_err(|e| self.wrap(e))?
            .ok_or_else(|| self.not_found(format!("Staff name \"{name}\" not found")))
    }

    /// # Errors
    ///
    /// Storage failures, wrapped
    pub async fn list(&self, user_id: &str) -> Result<Vec<Staff>, DefinedError> {
        self.staff.list(user_id).await.map_err(|e| self.wrap(e))
    }

    /// # Errors
    ///
    /// `RecordNotFound` for an unknown id, `RecordExists` when renaming onto a taken name
    pub async fn update(&self, user_id: &str, id: &str, form: StaffUpdate) -> Result<Staff, DefinedError> {
        let mut staff = self
            .staff
            .find_by_id(user_id, id)
            .await
            .map_err(|e| self.wrap(e))?
            .ok_or_else(|| self.not_found(format!("Staff \"{id}\" not found")))?;

        if staff.name != form.name
            && self
                .staff
                .find_by_name(user_id, &form.name)
                .await
                .map_err(|e| self.wrap(e))?
                .is_some()
        {
            return Err(self.exists(&form.name));
        }

        staff.name = form.name;
        staff.color = form.color;
        staff.email = form.email;
        staff.phone_number = form.phone_number;
        staff.image = form.image;
        staff.modify_date = timestamp();

        let outcome = self.staff.update(&staff).await.map_err(|e| self.wrap(e))?;
        if outcome.rows_affected == 0 {
            return Err(self.not_found(format!("Staff \"{id}\" not found")));
        }

        Ok(staff)
    }

    /// Remove a staff member and all of their appointments atomically
    ///
    /// # Errors
    ///
    /// `RecordNotFound` when no staff member has this name; storage failures
    /// roll the whole deletion back
    pub async fn delete_by_name(&self, user_id: &str, name: &str) -> Result<DeletedStaff, DefinedError> {
        let staff = self.get_by_name(user_id, name).await?;

        let mut tx = self.db.begin_transaction().await.map_err(|e| self.wrap(e))?;

        let removed = self
            .appointments
            .delete_for_staff(tx.conn(), &staff.id)
            .await
            .map_err(|e| self.wrap(e))?;
        self.staff
            .delete(tx.conn(), &staff.id)
            .await
            .map_err(|e| self.wrap(e))?;

        self.db.commit(tx).await.map_err(|e| self.wrap(e))?;
        tracing::info!(user_id, staff_id = %staff.id, appointments = removed.rows_affected, "staff deleted");

        Ok(DeletedStaff {
            staff,
            appointments_removed: removed.rows_affected,
        })
    }
}
