//! Fire-and-forget notification fan-out.
//!
//! Services enqueue a [`Notification`] and move on; delivery is best-effort
//! and never participates in the transaction that triggered it.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{error, warn};

const MAX_DELIVERY_ATTEMPTS: u32 = 5;
const RETRY_DELAY_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// Reviewer rejected content; goes to the author with the reviewer message.
    ContentRejected {
        recipient: String,
        content_name: String,
        message: String,
    },
    /// Fresh publish of a course with no enrollments yet; goes to the
    /// course group's active members.
    ContentPublished {
        recipients: Vec<String>,
        content_name: String,
    },
    /// Re-publish of a course people are already enrolled on.
    ContentUpdated {
        recipients: Vec<String>,
        content_name: String,
    },
    /// A non-privileged author moved content into review.
    ReviewRequested {
        admin_emails: Vec<String>,
        content_name: String,
        requested_by: String,
    },
    /// An assessment went live; goes to its author.
    AssessmentAccepted {
        recipient: String,
        assessment_title: String,
    },
    /// A trainee enrolled; goes to the course teachers.
    EnrollmentCreated {
        teacher_emails: Vec<String>,
        course_name: String,
        trainee_name: String,
    },
    CertificateIssued {
        recipient: String,
        course_name: String,
    },
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Drops everything. Used where notification side effects are irrelevant.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Captures notifications for assertion in tests.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.sent.lock().unwrap().push(notification);
    }
}

/// Transport behind the queue. The api crate provides an SMTP
/// implementation; tests substitute their own.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, notification: &Notification) -> Result<(), String>;
}

/// Queue-backed notifier. A background worker drains the queue and retries
/// each message up to [`MAX_DELIVERY_ATTEMPTS`] times before dropping it.
pub struct QueuedNotifier {
    tx: mpsc::UnboundedSender<Notification>,
}

impl QueuedNotifier {
    pub fn start(mailer: Arc<dyn Mailer>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Notification>();
        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                let mut attempt = 0;
                loop {
                    attempt += 1;
                    match mailer.send(&notification).await {
                        Ok(()) => break,
                        Err(reason) if attempt < MAX_DELIVERY_ATTEMPTS => {
                            warn!(attempt, %reason, "notification delivery failed, retrying");
                            tokio::time::sleep(std::time::Duration::from_secs(
                                RETRY_DELAY_SECS,
                            ))
                            .await;
                        }
                        Err(reason) => {
                            error!(%reason, "notification dropped after {MAX_DELIVERY_ATTEMPTS} attempts");
                            break;
                        }
                    }
                }
            }
        });
        Self { tx }
    }
}

impl Notifier for QueuedNotifier {
    fn notify(&self, notification: Notification) {
        if self.tx.send(notification).is_err() {
            error!("notification queue closed, message dropped");
        }
    }
}
