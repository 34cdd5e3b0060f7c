use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::ServiceResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingInfo {
    pub meeting_id: String,
    pub passcode: String,
}

/// Provisions online meetings for live-class lessons when a course is
/// published. Implementations talk to an external conferencing provider.
#[async_trait]
pub trait MeetingProvisioner: Send + Sync {
    async fn create_meeting(
        &self,
        name: &str,
        duration_minutes: i32,
        start: DateTime<Utc>,
        host_email: &str,
        external_id: &str,
    ) -> ServiceResult<MeetingInfo>;
}

/// Logs the request and hands back deterministic placeholder credentials.
pub struct NullMeetingProvisioner;

#[async_trait]
impl MeetingProvisioner for NullMeetingProvisioner {
    async fn create_meeting(
        &self,
        name: &str,
        _duration_minutes: i32,
        start: DateTime<Utc>,
        _host_email: &str,
        external_id: &str,
    ) -> ServiceResult<MeetingInfo> {
        info!(%name, %start, "meeting provisioning skipped (no provider configured)");
        Ok(MeetingInfo {
            meeting_id: format!("local-{external_id}"),
            passcode: String::new(),
        })
    }
}
