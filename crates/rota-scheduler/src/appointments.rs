use std::collections::HashMap;

use rota_core::{DatabaseOperation, DefinedError};
use rota_errors::ErrorHandler;
use rota_storage::{
    AppointmentRepository, QueryExecutor, StaffRepository,
    models::{Appointment, new_id, timestamp},
};
use serde::Serialize;

use crate::forms::NewAppointment;

const COMPONENT: &str = "appointment_service";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedAppointments {
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedWeek {
    pub week_view_id: String,
    pub staff_name: String,
    pub appointments_removed: u64,
}

#[derive(Debug, Clone)]
pub struct AppointmentService {
    staff: StaffRepository,
    appointments: AppointmentRepository,
    errors: ErrorHandler,
}

impl AppointmentService {
    pub fn new(db: &QueryExecutor) -> Self {
        Self {
            staff: StaffRepository::new(db.clone()),
            appointments: AppointmentRepository::new(db.clone()),
            errors: db.errors().clone(),
        }
    }

    fn wrap(&self, error: DefinedError) -> DefinedError {
        self.errors.handle_unknown_service_error(error, COMPONENT)
    }

    fn unknown_staff(&self, name: &str) -> DefinedError {
        let error = DefinedError::database(DatabaseOperation::RecordNotFound)
            .message(format!("Staff name \"{name}\" not found"))
            .build();
        self.errors.handle_error(error, COMPONENT)
    }

    /// Insert every item that can be inserted
    ///
    /// Items are independent. Failed items are reported by their client id,
    /// or by a generated id when the client sent none.
    ///
    /// # Errors
    ///
    /// A service error wrapping the first failure when every item fails, or a
    /// partial error naming the failed items when only some do
    pub async fn create_many(
        &self,
        user_id: &str,
        items: Vec<NewAppointment>,
    ) -> Result<CreatedAppointments, DefinedError> {
        let total = items.len();
        let mut staff_ids: HashMap<String, Option<String>> = HashMap::new();
        let mut created = Vec::with_capacity(total);
        let mut failures: Vec<(String, DefinedError)> = Vec::new();

        for item in items {
            let item_id = item.id.clone().unwrap_or_else(new_id);

            let staff_id = match staff_ids.get(&item.staff_name) {
                Some(cached) => cached.clone(),
                None => match self.staff.find_by_name(user_id, &item.staff_name).await {
                    Ok(staff) => {
                        let id = staff.map(|s| s.id);
                        staff_ids.insert(item.staff_name.clone(), id.clone());
                        id
                    }
                    Err(error) => {
                        failures.push((item_id, error));
                        continue;
                    }
                },
            };

            let Some(staff_id) = staff_id else {
                failures.push((item_id, self.unknown_staff(&item.staff_name)));
                continue;
            };

            let now = timestamp();
            let appointment = Appointment {
                id: item_id.clone(),
                staff_id,
                week_view_id: item.week_view_id,
                start_date: item.start_date,
                end_date: item.end_date,
                location: item.location,
                create_date: now.clone(),
                modify_date: now,
            };

            match self.appointments.create(&appointment).await {
                Ok(()) => created.push(appointment),
                Err(error) => failures.push((item_id, error)),
            }
        }

        if failures.is_empty() {
            tracing::info!(user_id, created = created.len(), "appointments created");
            return Ok(CreatedAppointments { appointments: created });
        }

        let mut failures = failures.into_iter();
        if created.is_empty() {
            let Some((_, first)) = failures.next() else {
                return Ok(CreatedAppointments { appointments: created });
            };
            for (_, other) in failures {
                self.errors.release(other.trace_id());
            }
            return Err(self.wrap(first));
        }

        let failed: Vec<String> = failures
            .map(|(id, error)| {
                self.errors.release(error.trace_id());
                id
            })
            .collect();

        tracing::warn!(user_id, created = created.len(), failed = failed.len(), "appointments partially created");

        let partial = DefinedError::partial(failed, total).build();
        Err(self.errors.handle_error(partial, COMPONENT))
    }

    /// # Errors
    ///
    /// Storage failures, wrapped
    pub async fn list(&self, user_id: &str, week_view_id: Option<&str>) -> Result<Vec<Appointment>, DefinedError> {
        self.appointments
            .list_for_user(user_id, week_view_id)
            .await
            .map_err(|e| self.wrap(e))
    }

    /// Remove one staff member's appointments for a week
    ///
    /// # Errors
    ///
    /// `RecordNotFound` when the staff member does not exist
    pub async fn delete_week(
        &self,
        user_id: &str,
        week_view_id: &str,
        staff_name: &str,
    ) -> Result<DeletedWeek, DefinedError> {
        let staff = self
            .staff
            .find_by_name(user_id, staff_name)
            .await
            .map_err(|e| self.wrap(e))?
            .ok_or_else(|| self.unknown_staff(staff_name))?;

        let outcome = self
            .appointments
            .delete_week(&staff.id, week_view_id)
            .await
            .map_err(|e| self.wrap(e))?;

        Ok(DeletedWeek {
            week_view_id: week_view_id.to_owned(),
            staff_name: staff.name,
            appointments_removed: outcome.rows_affected,
        })
    }
}
