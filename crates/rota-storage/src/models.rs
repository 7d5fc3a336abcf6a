//! Row types, one per table
//!
//! Timestamps are RFC 3339 strings in UTC, as stored.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Current time in the stored timestamp format
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Account row; the password hash is never serialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub color: String,
    pub image: Option<String>,
    pub phone_number: Option<String>,
    pub create_date: String,
    pub modify_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Staff {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub image: Option<String>,
    pub color: String,
    pub create_date: String,
    pub modify_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    pub staff_id: String,
    pub week_view_id: String,
    pub start_date: String,
    pub end_date: String,
    pub location: Option<String>,
    pub create_date: String,
    pub modify_date: String,
}

/// Share link row; `week_view_ids` is comma separated, empty meaning every week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
#[sqlx(rename_all = "camelCase")]
pub struct SharedLink {
    pub id: String,
    pub user_id: String,
    pub week_view_ids: String,
    pub expiry: Option<String>,
    pub permission: String,
    pub create_date: String,
    pub modify_date: String,
}

impl SharedLink {
    /// Week views the link grants, sorted; empty for all weeks
    pub fn week_views(&self) -> Vec<String> {
        let mut views: Vec<String> = self
            .week_view_ids
            .split(',')
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .collect();
        views.sort();
        views
    }

    /// Canonical storage form of a week view list
    pub fn join_week_views(views: &[String]) -> String {
        let mut views = views.to_vec();
        views.sort();
        views.dedup();
        views.join(",")
    }

    /// Whether `expiry` lies before `now`; unparseable expiries count as expired
    pub fn is_expired_at(&self, now: chrono::DateTime<Utc>) -> bool {
        self.expiry.as_deref().is_some_and(|expiry| {
            chrono::DateTime::parse_from_rfc3339(expiry)
                .ok()
                .is_none_or(|at| at.with_timezone(&Utc) < now)
        })
    }
}
