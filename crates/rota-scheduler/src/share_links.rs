use rota_core::{DatabaseOperation, DefinedError};
use rota_errors::ErrorHandler;
use rota_storage::{
    AppointmentRepository, QueryExecutor, SharedLinkRepository,
    models::{Appointment, SharedLink, new_id, timestamp},
};
use serde::Serialize;

use crate::{Permission, forms::NewShareLink};

const COMPONENT: &str = "share_link_service";

/// Share link as returned to its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareLink {
    pub id: String,
    pub permission: String,
    pub expiry: Option<String>,
    pub week_view_ids: Vec<String>,
    pub create_date: String,
    /// Whether an identical existing link was returned
    pub reused: bool,
}

impl ShareLink {
    fn from_row(row: &SharedLink, reused: bool) -> Self {
        Self {
            id: row.id.clone(),
            permission: row.permission.clone(),
            expiry: row.expiry.clone(),
            week_view_ids: row.week_views(),
            create_date: row.create_date.clone(),
            reused,
        }
    }
}

/// Schedule visible through a share link
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedSchedule {
    pub link: ShareLink,
    pub appointments: Vec<Appointment>,
}

#[derive(Debug, Clone)]
pub struct ShareLinkService {
    db: QueryExecutor,
    links: SharedLinkRepository,
    appointments: AppointmentRepository,
}

impl ShareLinkService {
    pub fn new(db: QueryExecutor) -> Self {
        Self {
            links: SharedLinkRepository::new(db.clone()),
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

    fn not_found(&self, id: &str) -> DefinedError {
        let error = DefinedError::database(DatabaseOperation::RecordNotFound)
            .message(format!("Share link \"{id}\" not found"))
            .build();
        self.errors().handle_error(error, COMPONENT)
    }

    /// Return the caller's identical link, or replace their links with a new one
    ///
    /// A user holds at most one link at a time.
    ///
    /// # Errors
    ///
    /// Storage failures, wrapped; the replacement is rolled back as a whole
    pub async fn create_or_reuse(&self, user_id: &str, form: NewShareLink) -> Result<ShareLink, DefinedError> {
        let permission: Permission = form.permission.parse().unwrap_or_default();
        let candidate = SharedLink {
            id: new_id(),
            user_id: user_id.to_owned(),
            week_view_ids: SharedLink::join_week_views(&form.week_view_ids),
            expiry: form.expiry,
            permission: permission.as_str().to_owned(),
            create_date: timestamp(),
            modify_date: timestamp(),
        };

        let links = self.links.clone();
        let result = self
            .db
            .with_transaction(move |conn| {
                Box::pin(async move {
                    let existing = links.find_for_user(&mut *conn, &candidate.user_id).await?;

                    if let Some(same) = existing.iter().find(|link| {
                        link.permission == candidate.permission
                            && link.expiry == candidate.expiry
                            && link.week_views() == candidate.week_views()
                    }) {
                        return Ok(ShareLink::from_row(same, true));
                    }

                    links.delete_for_user(&mut *conn, &candidate.user_id).await?;
                    links.create(&mut *conn, &candidate).await?;

                    Ok(ShareLink::from_row(&candidate, false))
                })
            })
            .await
            .map_err(|e| self.wrap(e))?;

        tracing::info!(user_id, link_id = %result.id, reused = result.reused, "share link ready");

        Ok(result)
    }

    /// Resolve a link to the owner's appointments in its weeks
    ///
    /// # Errors
    ///
    /// `RecordNotFound` when the link is missing or expired
    pub async fn get(&self, id: &str) -> Result<SharedSchedule, DefinedError> {
        let link = self
            .links
            .find_by_id(id)
            .await
            .map_err(|e| self.wrap(e))?
            .filter(|link| !link.is_expired_at(chrono::Utc::now()))
            .ok_or_else(|| self.not_found(id))?;

        let weeks = link.week_views();
        let appointments = self
            .appointments
            .list_for_user(&link.user_id, None)
            .await
            .map_err(|e| self.wrap(e))?
            .into_iter()
            .filter(|a| weeks.is_empty() || weeks.contains(&a.week_view_id))
            .collect();

        Ok(SharedSchedule {
            link: ShareLink::from_row(&link, false),
            appointments,
        })
    }

    /// # Errors
    ///
    /// `RecordNotFound` when the caller owns no link with this id
    pub async fn delete(&self, user_id: &str, id: &str) -> Result<(), DefinedError> {
        let outcome = self.links.delete(user_id, id).await.map_err(|e| self.wrap(e))?;

        if outcome.rows_affected == 0 {
            return Err(self.not_found(id));
        }

        Ok(())
    }
}
