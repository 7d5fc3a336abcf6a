use rota_errors::ResponseBuilder;
use rota_scheduler::{AccountService, AppointmentService, ShareLinkService, StaffService};
use rota_storage::QueryExecutor;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub responses: ResponseBuilder,
    pub accounts: AccountService,
    pub staff: StaffService,
    pub appointments: AppointmentService,
    pub share_links: ShareLinkService,
    /// When false, requests without a verified user act as the anonymous owner
    pub auth_enabled: bool,
}

impl AppState {
    /// Services over `db`, reporting through the executor's error handler
    #[must_use]
    pub fn new(db: &QueryExecutor, accounts: AccountService, auth_enabled: bool) -> Self {
        Self {
            responses: ResponseBuilder::new(db.errors().clone()),
            accounts,
            staff: StaffService::new(db.clone()),
            appointments: AppointmentService::new(db),
            share_links: ShareLinkService::new(db.clone()),
            auth_enabled,
        }
    }
}
