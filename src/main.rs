use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};

use stackd::config;
use stackd::db;
use stackd::reminders::{self, ReminderScheduler, SystemClock};
use stackd::routes;
use stackd::services::{
    create_sender, BookingStore, EmailNotifier, NotificationSender, PgBookingStore,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Load configuration
    let config = config::Config::from_env().map_err(|e| {
        log::error!("Configuration error: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    log::info!("Starting Stackd reminder service on {}:{}", config.host, config.port);

    // Create database pool
    let db_pool = db::create_pool(&config.database).await.map_err(|e| {
        log::error!("Database pool error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    // Run migrations
    db::run_migrations(&db_pool).await.map_err(|e| {
        log::error!("Migration error: {}", e);
        std::io::Error::other(e.to_string())
    })?;

    if config.security.service_api_key.is_none() {
        log::warn!("SERVICE_API_KEY not set, /api routes accept unauthenticated requests");
    }
    if config.notification.smtp.host.is_none() {
        log::warn!("SMTP_HOST not set, /api/notifications will reject every delivery");
    }

    // Reminder job wiring
    let store: Arc<dyn BookingStore> = Arc::new(PgBookingStore::new(db_pool.clone()));
    let sender = create_sender(&config.notification, config.security.service_api_key.as_deref());
    let scheduler = Arc::new(ReminderScheduler::with_config(
        store,
        sender,
        Arc::new(SystemClock),
        &config.reminders,
    ));

    // The notification endpoint always delivers over SMTP
    let email_sender: Arc<dyn NotificationSender> = Arc::new(EmailNotifier::new(
        config.notification.smtp.clone(),
        config.notification.admin_email.clone(),
    ));

    let worker = match config.reminders.interval {
        Some(period) => Some(reminders::worker::spawn(scheduler.clone(), period)),
        None => {
            log::info!("REMINDER_INTERVAL_SECS is 0, reminders run only when triggered");
            None
        }
    };

    let host = config.host.clone();
    let port = config.port;
    let security = config.security.clone();

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::HeaderName::from_static("x-client-info"),
                actix_web::http::header::HeaderName::from_static("apikey"),
            ])
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(security.clone()))
            .app_data(web::Data::from(scheduler.clone()))
            .app_data(web::Data::from(email_sender.clone()))
            .wrap(middleware::Logger::default())
            .wrap(cors)
            .configure(routes::health::configure)
            .configure(routes::reminders::configure)
            .configure(routes::notifications::configure)
    })
    .bind((host.as_str(), port))?
    .shutdown_timeout(30)
    .run();

    // Spawn graceful shutdown handler
    let server_handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        log::info!("Shutdown signal received, stopping server...");
        if let Some(worker) = worker {
            worker.abort();
        }
        server_handle.stop(true).await;
    });

    server.await
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
