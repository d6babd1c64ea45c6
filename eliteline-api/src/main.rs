use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use eliteline_api::{app, state::{AdminAuthConfig, AppState, WebhookConfig}};
use eliteline_booking::BookingService;
use eliteline_mailer::MailClient;
use eliteline_payments::StripeClient;
use eliteline_store::{DbClient, PgBookingRepository, PgSequenceRepository};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eliteline_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = eliteline_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Eliteline API on port {}", config.server.port);

    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    let bookings = Arc::new(PgBookingRepository::new(db.pool.clone()));
    let sequences = Arc::new(PgSequenceRepository::new(db.pool.clone()));

    let gateway = Arc::new(
        StripeClient::new(
            config.stripe.secret_key.clone(),
            config.stripe.success_url.clone(),
            config.stripe.cancel_url.clone(),
            Duration::from_secs(config.stripe.timeout_seconds),
        )
        .expect("Failed to build Stripe client"),
    );

    let mailer = Arc::new(
        MailClient::new(
            config.mail.api_url.clone(),
            config.mail.api_key.clone(),
            config.mail.from.clone(),
            Duration::from_secs(config.mail.timeout_seconds),
        )
        .expect("Failed to build mail client"),
    );

    let service = Arc::new(BookingService::new(
        bookings,
        sequences,
        gateway,
        mailer,
        config.mail.operator_address.clone(),
    ));

    let app_state = AppState {
        service,
        auth: AdminAuthConfig {
            email: config.admin.email.clone(),
            password: config.admin.password.clone(),
            token: config.admin.token.clone(),
            jwt_secret: config.admin.jwt_secret.clone(),
            session_days: config.admin.session_days,
        },
        webhook: WebhookConfig {
            secret: config.stripe.webhook_secret.clone(),
            tolerance_seconds: config.stripe.webhook_tolerance_seconds,
        },
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
