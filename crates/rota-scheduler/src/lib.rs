//! Account, staff, appointment, and share link operations over the storage layer
//!
//! Services raise leaf errors for business rule violations and wrap storage
//! failures in service errors, so the request's trace always resolves to the
//! innermost cause.

#![allow(clippy::must_use_candidate)]

mod accounts;
mod appointments;
pub mod forms;
mod share_links;
mod staff;

use serde::{Deserialize, Serialize};

pub use accounts::{AccountService, SignedIn};
pub use appointments::{AppointmentService, CreatedAppointments, DeletedWeek};
pub use share_links::{ShareLink, ShareLinkService, SharedSchedule};
pub use staff::{DeletedStaff, StaffService};

/// Access granted by a share link
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, strum::EnumString, strum::IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Permission {
    #[default]
    Read,
    Write,
}

impl Permission {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use rota_config::DatabaseConfig;
    use rota_errors::ErrorHandler;
    use rota_storage::{
        AppointmentRepository, QueryExecutor,
        models::{Appointment, new_id, timestamp},
    };

    /// Fresh in-memory database with the schema applied
    pub async fn executor() -> QueryExecutor {
        let pool = rota_storage::connect(&DatabaseConfig::default()).await.unwrap();
        let executor = QueryExecutor::new(pool, ErrorHandler::default());
        rota_storage::migrate(&executor).await.unwrap();
        executor
    }

    pub async fn appointment(db: &QueryExecutor, staff_id: &str, week_view_id: &str) {
        let appointment = Appointment {
            id: new_id(),
            staff_id: staff_id.into(),
            week_view_id: week_view_id.into(),
            start_date: "2024-01-02T09:00:00Z".into(),
            end_date: "2024-01-02T10:00:00Z".into(),
            location: None,
            create_date: timestamp(),
            modify_date: timestamp(),
        };
        AppointmentRepository::new(db.clone()).create(&appointment).await.unwrap();
    }
}
