//! Appointment confirmation emails.
//!
//! Rendered with Askama (HTML and plain text) and sent over SMTP via lettre.
//! Without SMTP configuration the message is rendered and logged only.
//! Delivery problems never fail a booking; callers log and move on.

use askama::Template;
use chrono::NaiveDate;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use pawmilya_core::BloodTest;

use crate::clinic;
use crate::config::EmailConfig;
use crate::services::booking::ValidBooking;

/// Details shared by both renderings.
#[derive(Debug, Clone)]
pub struct Confirmation {
    pub owner_name: String,
    pub pet_name: String,
    pub pet_species: String,
    pub service: String,
    pub date: String,
    pub time_slot: String,
    pub blood_test: Option<String>,
    pub additional_info: Option<String>,
}

impl Confirmation {
    #[must_use]
    pub fn from_booking(booking: &ValidBooking) -> Self {
        Self {
            owner_name: booking.owner_name.clone(),
            pet_name: booking.pet_name.clone(),
            pet_species: booking.species.label(),
            service: booking.service.label().to_string(),
            date: long_date(booking.appointment_date),
            time_slot: booking.time_slot.label(),
            blood_test: (booking.blood_test != BloodTest::None)
                .then(|| booking.blood_test.label()),
            additional_info: booking.additional_info.clone(),
        }
    }

    fn subject(&self) -> String {
        format!("Appointment Confirmation - {}", self.pet_name)
    }
}

/// e.g. `Wednesday, May 1, 2030`.
fn long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// HTML template for the confirmation email.
#[derive(Template)]
#[template(path = "email/appointment_confirmation.html")]
struct ConfirmationEmailHtml<'a> {
    c: &'a Confirmation,
    clinic_name: &'a str,
    address_lines: &'a [&'a str],
    phone: &'a str,
    hours: &'a str,
    reminders: &'a [&'a str],
}

/// Plain text template for the confirmation email.
#[derive(Template)]
#[template(path = "email/appointment_confirmation.txt")]
struct ConfirmationEmailText<'a> {
    c: &'a Confirmation,
    clinic_name: &'a str,
    address_lines: &'a [&'a str],
    phone: &'a str,
    hours: &'a str,
    reminders: &'a [&'a str],
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for confirmation emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: String,
}

impl EmailService {
    /// Create the service. `None` renders and logs without sending.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay cannot be configured.
    pub fn new(config: Option<&EmailConfig>) -> Result<Self, SmtpError> {
        let Some(config) = config else {
            return Ok(Self {
                mailer: None,
                from_address: String::new(),
            });
        };

        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer: Some(mailer),
            from_address: config.from_address.clone(),
        })
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.mailer.is_some()
    }

    /// Render both bodies of a confirmation: `(text, html)`.
    ///
    /// # Errors
    ///
    /// Returns error if a template fails to render.
    pub fn render_confirmation(&self, c: &Confirmation) -> Result<(String, String), EmailError> {
        let text = ConfirmationEmailText {
            c,
            clinic_name: clinic::NAME,
            address_lines: &clinic::ADDRESS_LINES,
            phone: clinic::PHONE,
            hours: clinic::HOURS,
            reminders: &clinic::REMINDERS,
        }
        .render()?;
        let html = ConfirmationEmailHtml {
            c,
            clinic_name: clinic::NAME,
            address_lines: &clinic::ADDRESS_LINES,
            phone: clinic::PHONE,
            hours: clinic::HOURS,
            reminders: &clinic::REMINDERS,
        }
        .render()?;
        Ok((text, html))
    }

    /// Send (or log) a confirmation to `to`.
    ///
    /// # Errors
    ///
    /// Returns error if rendering or delivery fails.
    pub async fn send_confirmation(&self, to: &str, c: &Confirmation) -> Result<(), EmailError> {
        let (text, html) = self.render_confirmation(c)?;
        let subject = c.subject();

        let Some(mailer) = &self.mailer else {
            tracing::info!(to = %to, subject = %subject, "SMTP not configured, confirmation not sent");
            tracing::debug!(body = %text, "Rendered confirmation email");
            return Ok(());
        };

        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(&subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html),
                    ),
            )?;

        mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn confirmation() -> Confirmation {
        Confirmation {
            owner_name: "Ana Reyes".to_string(),
            pet_name: "Mochi".to_string(),
            pet_species: "Reptile (Iguana)".to_string(),
            service: "Vaccination".to_string(),
            date: long_date("2030-05-01".parse().unwrap()),
            time_slot: "10:00 AM".to_string(),
            blood_test: None,
            additional_info: Some("Shy around dogs".to_string()),
        }
    }

    #[test]
    fn test_long_date() {
        assert_eq!(long_date("2030-05-01".parse().unwrap()), "Wednesday, May 1, 2030");
    }

    #[test]
    fn test_text_body_has_details_and_clinic_info() {
        let service = EmailService::new(None).unwrap();
        let (text, html) = service.render_confirmation(&confirmation()).unwrap();

        assert!(text.contains("Dear Ana Reyes"));
        assert!(text.contains("Pet Species: Reptile (Iguana)"));
        assert!(text.contains("Wednesday, May 1, 2030"));
        assert!(text.contains("Additional Information: Shy around dogs"));
        assert!(!text.contains("Blood Test:"));
        assert!(text.contains("Casa Vallejo Bldg.2, 2nd Floor"));
        assert!(text.contains(clinic::PHONE));
        for reminder in clinic::REMINDERS {
            assert!(text.contains(reminder));
        }

        assert!(html.contains("Mochi"));
        assert!(html.contains("Appointment Confirmation"));
    }

    #[tokio::test]
    async fn test_send_without_smtp_only_logs() {
        let service = EmailService::new(None).unwrap();
        assert!(!service.is_enabled());
        service
            .send_confirmation("ana@example.com", &confirmation())
            .await
            .unwrap();
    }
}
