use std::env;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database: DatabaseConfig,
    pub reminders: ReminderConfig,
    pub notification: NotificationConfig,
    pub security: SecurityConfig,
}

/// Database connection pool configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

/// Furthest ahead a reminder window may reach (one year)
pub const MAX_REMINDER_HORIZON_HOURS: i64 = 24 * 365;

/// Booking reminder job configuration
#[derive(Debug, Clone)]
pub struct ReminderConfig {
    /// How far ahead of the booking the reminder goes out
    pub lead_hours: i64,
    /// Half-width of the band around `lead_hours`
    pub tolerance_hours: i64,
    /// Period of the in-process worker. `None` disables it.
    pub interval: Option<Duration>,
}

/// Where notifications are delivered
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Notification function endpoint. When set, reminders are POSTed here.
    pub webhook_url: Option<String>,
    /// Optional HMAC secret used to sign webhook requests
    pub webhook_secret: Option<String>,
    pub smtp: SmtpConfig,
    pub admin_email: String,
}

/// SMTP settings for the e-mail notifier
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: Option<String>,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: String,
}

/// Security configuration
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Service-role key expected as `Authorization: Bearer <key>` on /api routes.
    /// When unset the API is open.
    pub service_api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            database: DatabaseConfig::from_env()?,
            reminders: ReminderConfig::from_env()?,
            notification: NotificationConfig::from_env()?,
            security: SecurityConfig::from_env(),
        })
    }
}

impl DatabaseConfig {
    /// Load database configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let url = env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)?;

        Ok(Self {
            url,
            max_connections: parse_or("DATABASE_MAX_CONNECTIONS", 10),
            min_connections: parse_or("DATABASE_MIN_CONNECTIONS", 1),
            acquire_timeout: Duration::from_secs(parse_or("DATABASE_ACQUIRE_TIMEOUT_SECS", 5)),
            idle_timeout: Duration::from_secs(parse_or("DATABASE_IDLE_TIMEOUT_SECS", 600)),
            max_lifetime: Duration::from_secs(parse_or("DATABASE_MAX_LIFETIME_SECS", 1800)),
        })
    }
}

impl ReminderConfig {
    /// Load reminder job configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let lead_hours: i64 = parse_or("REMINDER_LEAD_HOURS", 72);
        let tolerance_hours: i64 = parse_or("REMINDER_TOLERANCE_HOURS", 1);

        if tolerance_hours < 0
            || lead_hours.saturating_sub(tolerance_hours) < 0
            || lead_hours.saturating_add(tolerance_hours) > MAX_REMINDER_HORIZON_HOURS
        {
            return Err(ConfigError::InvalidReminderWindow);
        }

        let interval_secs: u64 = parse_or("REMINDER_INTERVAL_SECS", 3600);
        let interval = (interval_secs > 0).then(|| Duration::from_secs(interval_secs));

        Ok(Self {
            lead_hours,
            tolerance_hours,
            interval,
        })
    }
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            lead_hours: 72,
            tolerance_hours: 1,
            interval: Some(Duration::from_secs(3600)),
        }
    }
}

impl NotificationConfig {
    /// Load notification delivery configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let webhook_url = env::var("NOTIFICATION_WEBHOOK_URL")
            .ok()
            .filter(|v| !v.is_empty());

        if let Some(ref raw) = webhook_url {
            let parsed = url::Url::parse(raw).map_err(|_| ConfigError::InvalidWebhookUrl)?;
            if parsed.scheme() != "http" && parsed.scheme() != "https" {
                return Err(ConfigError::InvalidWebhookUrl);
            }
        }

        let smtp = SmtpConfig::from_env();

        if webhook_url.is_none() && smtp.host.is_none() {
            return Err(ConfigError::MissingNotificationTarget);
        }

        Ok(Self {
            webhook_url,
            webhook_secret: env::var("NOTIFICATION_WEBHOOK_SECRET").ok(),
            smtp,
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@stackd.app".to_string()),
        })
    }
}

impl SmtpConfig {
    /// Load SMTP settings from environment variables
    pub fn from_env() -> Self {
        Self {
            host: env::var("SMTP_HOST").ok().filter(|v| !v.is_empty()),
            port: parse_or("SMTP_PORT", 587),
            username: env::var("SMTP_USERNAME").ok(),
            password: env::var("SMTP_PASSWORD").ok(),
            from_address: env::var("SMTP_FROM")
                .unwrap_or_else(|_| "Stackd <notifications@stackd.app>".to_string()),
        }
    }
}

impl SecurityConfig {
    /// Load security configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            service_api_key: env::var("SERVICE_API_KEY").ok().filter(|v| !v.is_empty()),
        }
    }
}

/// Reads `key` and parses it, falling back to `default` when unset or invalid
fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    MissingDatabaseUrl,
    InvalidReminderWindow,
    InvalidWebhookUrl,
    MissingNotificationTarget,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "PORT must be a valid number"),
            ConfigError::MissingDatabaseUrl => {
                write!(f, "DATABASE_URL environment variable is required")
            }
            ConfigError::InvalidReminderWindow => write!(
                f,
                "REMINDER_TOLERANCE_HOURS must be non-negative and not exceed REMINDER_LEAD_HOURS, \
                 and the window must end within {} hours",
                MAX_REMINDER_HORIZON_HOURS
            ),
            ConfigError::InvalidWebhookUrl => {
                write!(f, "NOTIFICATION_WEBHOOK_URL must be a valid http(s) URL")
            }
            ConfigError::MissingNotificationTarget => write!(
                f,
                "either NOTIFICATION_WEBHOOK_URL or SMTP_HOST must be configured"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
