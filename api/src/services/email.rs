//! SMTP delivery behind the notification queue.
//!
//! Uses the `lettre` crate with the SMTP credentials from configuration.
//! One [`Notification`] becomes one email per recipient; the queue worker
//! in the services crate handles retries.

use async_trait::async_trait;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{
    AsyncTransport, Tokio1Executor, message::Message,
    transport::smtp::{AsyncSmtpTransport, authentication::Credentials},
};
use once_cell::sync::Lazy;
use services::notifier::{Mailer, Notification};
use util::config;

const SMTP_HOST: &str = "smtp.gmail.com";

/// Global SMTP client, initialized lazily from configuration.
static SMTP_CLIENT: Lazy<AsyncSmtpTransport<Tokio1Executor>> = Lazy::new(|| {
    let tls_parameters =
        TlsParameters::new(SMTP_HOST.to_string()).expect("Failed to create TLS parameters");

    AsyncSmtpTransport::<Tokio1Executor>::relay(SMTP_HOST)
        .expect("Failed to create SMTP transport")
        .port(587)
        .tls(Tls::Required(tls_parameters))
        .credentials(Credentials::new(
            config::smtp_username(),
            config::smtp_app_password(),
        ))
        .build()
});

pub struct SmtpMailer;

impl SmtpMailer {
    fn sender() -> String {
        format!("{} <{}>", config::email_from_name(), config::smtp_username())
    }

    /// Subject line, body and recipient list for one notification.
    fn render(notification: &Notification) -> (String, String, Vec<String>) {
        let frontend = config::frontend_url();
        match notification {
            Notification::ContentRejected {
                recipient,
                content_name,
                message,
            } => (
                format!("\"{content_name}\" was rejected"),
                format!(
                    "Hello,\n\n\
                    Your content \"{content_name}\" was rejected by a reviewer.\n\n\
                    Reviewer message: {message}\n\n\
                    You can revise it at {frontend}."
                ),
                vec![recipient.clone()],
            ),
            Notification::ContentPublished {
                recipients,
                content_name,
            } => (
                format!("New course available: {content_name}"),
                format!(
                    "Hello,\n\n\
                    The course \"{content_name}\" is now available to your group.\n\n\
                    Enroll at {frontend}."
                ),
                recipients.clone(),
            ),
            Notification::ContentUpdated {
                recipients,
                content_name,
            } => (
                format!("Course updated: {content_name}"),
                format!(
                    "Hello,\n\n\
                    The course \"{content_name}\" you are enrolled on has been updated.\n\n\
                    See what changed at {frontend}."
                ),
                recipients.clone(),
            ),
            Notification::ReviewRequested {
                admin_emails,
                content_name,
                requested_by,
            } => (
                format!("Review requested: {content_name}"),
                format!(
                    "Hello,\n\n\
                    {requested_by} has submitted \"{content_name}\" for review.\n\n\
                    Review it at {frontend}."
                ),
                admin_emails.clone(),
            ),
            Notification::AssessmentAccepted {
                recipient,
                assessment_title,
            } => (
                format!("\"{assessment_title}\" is live"),
                format!(
                    "Hello,\n\n\
                    Your assessment \"{assessment_title}\" has been accepted and published."
                ),
                vec![recipient.clone()],
            ),
            Notification::EnrollmentCreated {
                teacher_emails,
                course_name,
                trainee_name,
            } => (
                format!("New enrollment on {course_name}"),
                format!(
                    "Hello,\n\n\
                    {trainee_name} has enrolled on your course \"{course_name}\"."
                ),
                teacher_emails.clone(),
            ),
            Notification::CertificateIssued {
                recipient,
                course_name,
            } => (
                format!("Your certificate for {course_name}"),
                format!(
                    "Hello,\n\n\
                    Congratulations on completing \"{course_name}\"! Your certificate is\n\
                    available at {frontend}."
                ),
                vec![recipient.clone()],
            ),
        }
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, notification: &Notification) -> Result<(), String> {
        let (subject, body, recipients) = Self::render(notification);
        let from: lettre::message::Mailbox = Self::sender()
            .parse()
            .map_err(|e| format!("invalid sender address: {e}"))?;

        for recipient in recipients {
            let Ok(to) = recipient.parse() else {
                tracing::warn!(%recipient, "skipping invalid recipient address");
                continue;
            };
            let email = Message::builder()
                .from(from.clone())
                .to(to)
                .subject(subject.clone())
                .body(body.clone())
                .map_err(|e| format!("failed to build email: {e}"))?;

            SMTP_CLIENT
                .send(email)
                .await
                .map_err(|e| format!("smtp delivery failed: {e}"))?;
        }
        Ok(())
    }
}
