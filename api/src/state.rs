use std::sync::Arc;

use sea_orm::DatabaseConnection;
use services::meeting::MeetingProvisioner;
use services::notifier::Notifier;

/// Shared application state handed to every route handler.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    notifier: Arc<dyn Notifier>,
    meetings: Arc<dyn MeetingProvisioner>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        notifier: Arc<dyn Notifier>,
        meetings: Arc<dyn MeetingProvisioner>,
    ) -> Self {
        Self {
            db,
            notifier,
            meetings,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    pub fn meetings(&self) -> &dyn MeetingProvisioner {
        self.meetings.as_ref()
    }
}
