//! Unit tests for configuration parsing
//!
//! Tests environment variable parsing and default values.
//!
//! Note: These tests modify global environment variables and must run serially.

use std::time::Duration;

use stackd::config::{
    ConfigError, NotificationConfig, ReminderConfig, SecurityConfig, SmtpConfig,
    MAX_REMINDER_HORIZON_HOURS,
};
use serial_test::serial;

const REMINDER_VARS: &[&str] = &[
    "REMINDER_LEAD_HOURS",
    "REMINDER_TOLERANCE_HOURS",
    "REMINDER_INTERVAL_SECS",
];

const NOTIFICATION_VARS: &[&str] = &[
    "NOTIFICATION_WEBHOOK_URL",
    "NOTIFICATION_WEBHOOK_SECRET",
    "SMTP_HOST",
    "SMTP_PORT",
    "SMTP_USERNAME",
    "SMTP_PASSWORD",
    "SMTP_FROM",
    "ADMIN_EMAIL",
];

fn clear(vars: &[&str]) {
    for var in vars {
        std::env::remove_var(var);
    }
}

// =============================================================================
// Reminder Config Tests
// =============================================================================

#[test]
#[serial]
fn test_reminder_config_defaults() {
    clear(REMINDER_VARS);

    let config = ReminderConfig::from_env().unwrap();

    assert_eq!(config.lead_hours, 72);
    assert_eq!(config.tolerance_hours, 1);
    assert_eq!(config.interval, Some(Duration::from_secs(3600)));
}

#[test]
#[serial]
fn test_reminder_config_custom_values() {
    std::env::set_var("REMINDER_LEAD_HOURS", "24");
    std::env::set_var("REMINDER_TOLERANCE_HOURS", "2");
    std::env::set_var("REMINDER_INTERVAL_SECS", "900");

    let config = ReminderConfig::from_env().unwrap();

    assert_eq!(config.lead_hours, 24);
    assert_eq!(config.tolerance_hours, 2);
    assert_eq!(config.interval, Some(Duration::from_secs(900)));

    clear(REMINDER_VARS);
}

#[test]
#[serial]
fn test_reminder_interval_zero_disables_worker() {
    clear(REMINDER_VARS);
    std::env::set_var("REMINDER_INTERVAL_SECS", "0");

    let config = ReminderConfig::from_env().unwrap();

    assert!(config.interval.is_none());

    clear(REMINDER_VARS);
}

#[test]
#[serial]
fn test_reminder_config_invalid_values_use_defaults() {
    std::env::set_var("REMINDER_LEAD_HOURS", "three days");
    std::env::set_var("REMINDER_INTERVAL_SECS", "-5");

    let config = ReminderConfig::from_env().unwrap();

    assert_eq!(config.lead_hours, 72);
    assert_eq!(config.interval, Some(Duration::from_secs(3600)));

    clear(REMINDER_VARS);
}

#[test]
#[serial]
fn test_reminder_config_rejects_tolerance_wider_than_lead() {
    clear(REMINDER_VARS);
    std::env::set_var("REMINDER_LEAD_HOURS", "1");
    std::env::set_var("REMINDER_TOLERANCE_HOURS", "2");

    let result = ReminderConfig::from_env();

    assert!(matches!(result, Err(ConfigError::InvalidReminderWindow)));

    clear(REMINDER_VARS);
}

#[test]
#[serial]
fn test_reminder_config_rejects_negative_tolerance() {
    clear(REMINDER_VARS);
    std::env::set_var("REMINDER_TOLERANCE_HOURS", "-1");

    let result = ReminderConfig::from_env();

    assert!(matches!(result, Err(ConfigError::InvalidReminderWindow)));

    clear(REMINDER_VARS);
}

#[test]
#[serial]
fn test_reminder_config_rejects_lead_beyond_horizon() {
    clear(REMINDER_VARS);
    std::env::set_var("REMINDER_LEAD_HOURS", "3000000000");

    let result = ReminderConfig::from_env();

    assert!(matches!(result, Err(ConfigError::InvalidReminderWindow)));

    clear(REMINDER_VARS);
}

#[test]
#[serial]
fn test_reminder_config_accepts_window_ending_at_horizon() {
    clear(REMINDER_VARS);
    std::env::set_var(
        "REMINDER_LEAD_HOURS",
        (MAX_REMINDER_HORIZON_HOURS - 1).to_string(),
    );
    std::env::set_var("REMINDER_TOLERANCE_HOURS", "1");

    let config = ReminderConfig::from_env().unwrap();
    assert_eq!(config.lead_hours, MAX_REMINDER_HORIZON_HOURS - 1);

    std::env::set_var("REMINDER_TOLERANCE_HOURS", "2");
    assert!(matches!(
        ReminderConfig::from_env(),
        Err(ConfigError::InvalidReminderWindow)
    ));

    clear(REMINDER_VARS);
}

// =============================================================================
// Notification Config Tests
// =============================================================================

#[test]
#[serial]
fn test_notification_config_requires_a_target() {
    clear(NOTIFICATION_VARS);

    let result = NotificationConfig::from_env();

    assert!(matches!(result, Err(ConfigError::MissingNotificationTarget)));
}

#[test]
#[serial]
fn test_notification_config_with_webhook_only() {
    clear(NOTIFICATION_VARS);
    std::env::set_var(
        "NOTIFICATION_WEBHOOK_URL",
        "https://project.functions.example.com/send-admin-notification",
    );
    std::env::set_var("NOTIFICATION_WEBHOOK_SECRET", "whsec");

    let config = NotificationConfig::from_env().unwrap();

    assert_eq!(
        config.webhook_url.as_deref(),
        Some("https://project.functions.example.com/send-admin-notification")
    );
    assert_eq!(config.webhook_secret.as_deref(), Some("whsec"));
    assert!(config.smtp.host.is_none());
    assert_eq!(config.admin_email, "admin@stackd.app");

    clear(NOTIFICATION_VARS);
}

#[test]
#[serial]
fn test_notification_config_rejects_non_http_webhook() {
    clear(NOTIFICATION_VARS);
    std::env::set_var("NOTIFICATION_WEBHOOK_URL", "ftp://files.example.com/hook");

    let result = NotificationConfig::from_env();

    assert!(matches!(result, Err(ConfigError::InvalidWebhookUrl)));

    clear(NOTIFICATION_VARS);
}

#[test]
#[serial]
fn test_notification_config_rejects_malformed_webhook() {
    clear(NOTIFICATION_VARS);
    std::env::set_var("NOTIFICATION_WEBHOOK_URL", "not a url");

    let result = NotificationConfig::from_env();

    assert!(matches!(result, Err(ConfigError::InvalidWebhookUrl)));

    clear(NOTIFICATION_VARS);
}

#[test]
#[serial]
fn test_empty_webhook_url_falls_back_to_smtp() {
    clear(NOTIFICATION_VARS);
    std::env::set_var("NOTIFICATION_WEBHOOK_URL", "");
    std::env::set_var("SMTP_HOST", "smtp.example.com");

    let config = NotificationConfig::from_env().unwrap();

    assert!(config.webhook_url.is_none());
    assert_eq!(config.smtp.host.as_deref(), Some("smtp.example.com"));

    clear(NOTIFICATION_VARS);
}

#[test]
#[serial]
fn test_smtp_config_defaults() {
    clear(NOTIFICATION_VARS);

    let smtp = SmtpConfig::from_env();

    assert!(smtp.host.is_none());
    assert_eq!(smtp.port, 587);
    assert!(smtp.username.is_none());
    assert_eq!(smtp.from_address, "Stackd <notifications@stackd.app>");
}

#[test]
#[serial]
fn test_smtp_config_custom_values() {
    clear(NOTIFICATION_VARS);
    std::env::set_var("SMTP_HOST", "mail.example.com");
    std::env::set_var("SMTP_PORT", "465");
    std::env::set_var("SMTP_USERNAME", "mailer");
    std::env::set_var("SMTP_PASSWORD", "hunter2");
    std::env::set_var("ADMIN_EMAIL", "ops@example.com");

    let config = NotificationConfig::from_env().unwrap();

    assert_eq!(config.smtp.port, 465);
    assert_eq!(config.smtp.username.as_deref(), Some("mailer"));
    assert_eq!(config.smtp.password.as_deref(), Some("hunter2"));
    assert_eq!(config.admin_email, "ops@example.com");

    clear(NOTIFICATION_VARS);
}

// =============================================================================
// Security Config Tests
// =============================================================================

#[test]
#[serial]
fn test_security_config_reads_service_key() {
    std::env::set_var("SERVICE_API_KEY", "service-role-key");

    let config = SecurityConfig::from_env();

    assert_eq!(config.service_api_key.as_deref(), Some("service-role-key"));

    std::env::remove_var("SERVICE_API_KEY");
}

#[test]
#[serial]
fn test_security_config_empty_key_means_open() {
    std::env::set_var("SERVICE_API_KEY", "");

    let config = SecurityConfig::from_env();

    assert!(config.service_api_key.is_none());

    std::env::remove_var("SERVICE_API_KEY");
}
