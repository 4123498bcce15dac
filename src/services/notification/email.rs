//! Email notification sender.
//!
//! Renders notifications as HTML + plain-text e-mails and sends them over
//! SMTP using the lettre crate. Reminders go to the guest, booking and promo
//! notices go to the admin inbox.

use std::time::Duration;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{NotificationResult, NotificationSender};
use crate::config::SmtpConfig;
use crate::models::{BookingNotice, Notification, PromoUsedNotice, ReminderNotice};

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// A notification rendered into an e-mail, ready to send
#[derive(Debug, Clone)]
pub struct RenderedEmail {
    pub to: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

/// Email notification sender
pub struct EmailNotifier {
    smtp: SmtpConfig,
    admin_email: String,
}

impl EmailNotifier {
    pub fn new(smtp: SmtpConfig, admin_email: String) -> Self {
        Self { smtp, admin_email }
    }

    /// Renders a notification into recipient, subject and bodies
    pub fn render(&self, notification: &Notification) -> RenderedEmail {
        match notification {
            Notification::Booking(notice) => RenderedEmail {
                to: self.admin_email.clone(),
                subject: format!("🎉 New Booking: {}", notice.experience_name),
                html: booking_html(notice),
                text: booking_text(notice),
            },
            Notification::PromoUsed(notice) => RenderedEmail {
                to: self.admin_email.clone(),
                subject: format!("🏷️ Promo Code Used: {}", notice.promo_code),
                html: promo_html(notice),
                text: promo_text(notice),
            },
            Notification::BookingReminder(notice) => RenderedEmail {
                to: notice.guest_email.clone(),
                subject: format!(
                    "Reminder: {} on {}",
                    notice.experience_name,
                    notice.date.format("%b %-d")
                ),
                html: reminder_html(notice),
                text: reminder_text(notice),
            },
        }
    }

    fn build_message(&self, email: RenderedEmail) -> Result<Message, String> {
        let from: Mailbox = self
            .smtp
            .from_address
            .parse()
            .map_err(|e| format!("Invalid sender address '{}': {}", self.smtp.from_address, e))?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|e| format!("Invalid recipient '{}': {}", email.to, e))?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(email.subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(email.text),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(email.html),
                    ),
            )
            .map_err(|e| format!("Failed to build email: {}", e))
    }

    fn build_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, String> {
        let host = self
            .smtp
            .host
            .as_deref()
            .ok_or_else(|| "SMTP host not configured".to_string())?;
        let port = self.smtp.port;

        // Port 465 = implicit TLS (SMTPS), anything else = STARTTLS
        let builder = if port == 465 {
            let tls_params = TlsParameters::new(host.to_string())
                .map_err(|e| format!("Invalid TLS parameters for SMTP host: {}", e))?;
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| format!("Invalid SMTP host: {}", e))?
                .port(port)
                .tls(Tls::Wrapper(tls_params))
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| format!("Invalid SMTP host: {}", e))?
                .port(port)
        };

        let builder = builder.timeout(Some(SMTP_TIMEOUT));

        let transport = match (&self.smtp.username, &self.smtp.password) {
            (Some(username), Some(password)) => builder
                .credentials(Credentials::new(username.clone(), password.clone()))
                .build(),
            _ => builder.build(),
        };

        Ok(transport)
    }
}

#[async_trait]
impl NotificationSender for EmailNotifier {
    async fn send(&self, notification: &Notification) -> NotificationResult {
        let rendered = self.render(notification);
        let recipient = rendered.to.clone();

        let message = match self.build_message(rendered) {
            Ok(m) => m,
            Err(e) => return NotificationResult::failure(e, None),
        };

        let mailer = match self.build_transport() {
            Ok(t) => t,
            Err(e) => return NotificationResult::failure(e, None),
        };

        match mailer.send(message).await {
            Ok(_) => {
                log::debug!("Sent {} email to {}", notification.kind(), recipient);
                NotificationResult::success(None)
            }
            Err(e) => NotificationResult::failure(
                format!("Failed to send email to {}: {}", recipient, e),
                None,
            ),
        }
    }
}

// =============================================================================
// Rendering
// =============================================================================

/// Simple HTML escaping for email content
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn money(amount: Option<f64>) -> String {
    match amount {
        Some(a) => format!("${:.2}", a),
        None => "N/A".to_string(),
    }
}

fn or_na(value: Option<&str>) -> &str {
    value.unwrap_or("N/A")
}

fn row(label: &str, value: &str) -> String {
    format!(
        r#"<tr>
                <td style="padding: 8px 0; color: #64748b;">{}</td>
                <td style="padding: 8px 0; text-align: right; font-weight: 600;">{}</td>
              </tr>"#,
        label,
        html_escape(value)
    )
}

fn layout(accent: &str, heading: &str, title: &str, rows: &[String], footer: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"></head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;">
  <h1 style="color: {accent}; margin-bottom: 20px;">{heading}</h1>
  <div style="background: #f8fafc; border-radius: 12px; padding: 20px; margin-bottom: 20px;">
    <h2 style="margin: 0 0 15px 0; color: #1e293b;">{title}</h2>
    <table style="width: 100%; border-collapse: collapse;">
      {rows}
    </table>
  </div>
  <p style="color: #64748b; font-size: 14px;">{footer}</p>
</body>
</html>"#,
        accent = accent,
        heading = heading,
        title = html_escape(title),
        rows = rows.join("\n              "),
        footer = footer,
    )
}

fn booking_html(n: &BookingNotice) -> String {
    let mut rows = vec![
        row("Vendor", or_na(n.vendor_name.as_deref())),
        row("Guest Email", or_na(n.guest_email.as_deref())),
        row("Date", &n.date),
        row("Time", or_na(n.time.as_deref())),
        row("Guests", &n.guests.to_string()),
    ];
    if let Some(ref code) = n.promo_code {
        rows.push(row(
            "Promo Code Used",
            &format!("{} (-{})", code, money(n.discount_amount)),
        ));
    }
    let total = match n.currency {
        Some(ref c) => format!("{} {}", money(n.total_amount), c.to_uppercase()),
        None => money(n.total_amount),
    };
    rows.push(row("Total", &total));

    layout(
        "#f97316",
        "New Booking Received!",
        &n.experience_name,
        &rows,
        "This is an automated notification from Stackd.",
    )
}

fn booking_text(n: &BookingNotice) -> String {
    let mut text = format!(
        "New booking: {}\n\nVendor: {}\nGuest email: {}\nDate: {}\nTime: {}\nGuests: {}\n",
        n.experience_name,
        or_na(n.vendor_name.as_deref()),
        or_na(n.guest_email.as_deref()),
        n.date,
        or_na(n.time.as_deref()),
        n.guests,
    );
    if let Some(ref code) = n.promo_code {
        text.push_str(&format!(
            "Promo code: {} (-{})\n",
            code,
            money(n.discount_amount)
        ));
    }
    text.push_str(&format!("Total: {}\n", money(n.total_amount)));
    text
}

fn promo_html(n: &PromoUsedNotice) -> String {
    let rows = vec![
        row("Experience", &n.experience_name),
        row("Guest Email", or_na(n.guest_email.as_deref())),
        row("Original Amount", &money(n.original_amount)),
        row("Discount Applied", &format!("-{}", money(n.discount_amount))),
        row("Final Amount", &money(n.total_amount)),
    ];

    layout(
        "#16a34a",
        "Promo Code Used!",
        &n.promo_code,
        &rows,
        "This is an automated notification from Stackd.",
    )
}

fn promo_text(n: &PromoUsedNotice) -> String {
    format!(
        "Promo code used: {}\n\nExperience: {}\nGuest email: {}\nOriginal amount: {}\nDiscount: -{}\nFinal amount: {}\n",
        n.promo_code,
        n.experience_name,
        or_na(n.guest_email.as_deref()),
        money(n.original_amount),
        money(n.discount_amount),
        money(n.total_amount),
    )
}

fn reminder_html(n: &ReminderNotice) -> String {
    let date = n.date.format("%A, %B %-d, %Y").to_string();
    let rows = vec![
        row("Hosted by", or_na(n.vendor_name.as_deref())),
        row("Date", &date),
        row("Time", or_na(n.time.as_deref())),
        row("Guests", &n.guests.to_string()),
    ];

    layout(
        "#f97316",
        "Your experience is coming up!",
        &n.experience_name,
        &rows,
        "You are receiving this because you booked through Stackd.",
    )
}

fn reminder_text(n: &ReminderNotice) -> String {
    format!(
        "Your experience is coming up!\n\n{}\nHosted by: {}\nDate: {}\nTime: {}\nGuests: {}\n\n--\nYou are receiving this because you booked through Stackd.",
        n.experience_name,
        or_na(n.vendor_name.as_deref()),
        n.date.format("%A, %B %-d, %Y"),
        or_na(n.time.as_deref()),
        n.guests,
    )
}
