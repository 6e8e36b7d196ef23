mod api;
mod app_state;
mod db;
mod env_config;
mod layers;
mod logger;
mod services;

#[cfg(test)]
mod test_support;

use app_state::models::AppState;
use axum::{
    Router,
    routing::{get, post},
};
use db::postgres::postgres_service::PostgresService;
use env_config::models::{app_config::AppConfig, app_env::AppEnv, app_setting::AppSettings};
use layers::{create_cors, create_trace};
use services::broadcast::{job::BroadcastJob, scheduler::BroadcastScheduler};
use services::inbound::handler::InboundMessageHandler;
use services::notifications::{dispatcher::NotificationDispatcher, sink::TelegramSink};
use services::rates::{
    fetcher::RateFetcher,
    snapshot_store::SnapshotStore,
    sources::{CoinGeckoSource, ExchangeRateApiSource},
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::{net::TcpListener, signal};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let settings: Arc<AppSettings> = Arc::new(initialize_application());

    let postgres_service = Arc::new(initialize_database_connection(settings.clone()).await);

    let server_address: SocketAddr = format!(
        "{}:{}",
        settings.app_env.server_address, settings.app_env.server_port,
    )
    .parse()
    .expect("Invalid server address configuration");

    info!("Server will listen on: {}", server_address);

    let app_state: Arc<AppState> = Arc::new(build_app_state(settings.clone(), postgres_service.clone()));

    let scheduler_handle = BroadcastScheduler::new(app_state.clone()).start();

    let app_router = create_application_router(app_state.clone());

    start_http_server(app_router, server_address).await;

    if let Some(handle) = scheduler_handle {
        handle.abort();
    }
    postgres_service.connection.close().await;

    info!("Application stopped");
}

/// Loads environment and config file, then initializes logging
fn initialize_application() -> AppSettings {
    let environment = AppEnv::new().unwrap_or_else(|e| panic!("Invalid environment: {}", e));
    let config = AppConfig::new(&environment.env).unwrap_or_else(|e| panic!("Invalid configuration: {}", e));
    let app_settings = AppSettings {
        app_config: config,
        app_env: environment,
    };

    logger::init_logger(
        &app_settings.app_config.log.level,
        &app_settings.app_config.log.format,
        app_settings.app_env.is_local(),
    )
    .expect("Failed to initialize logger");

    info!("Starting KZT rates bot...");
    info!("Current environment: {}", app_settings.app_env.env);

    if app_settings.app_env.is_local() {
        info!("Running in local development mode");
        debug!("Configuration details: {:#?}", app_settings);
    } else {
        info!("Running in production mode");
    }

    app_settings
}

async fn initialize_database_connection(settings: Arc<AppSettings>) -> PostgresService {
    info!("Initializing database connection...");

    match PostgresService::new(&settings).await {
        Ok(service) => {
            info!("PostgreSQL connection established successfully");
            service
        }
        Err(err) => {
            error!("Failed to connect to PostgreSQL: {}", err);
            panic!("Cannot continue without PostgreSQL connection");
        }
    }
}

/// Wires the long-lived HTTP clients and the pipeline components
fn build_app_state(settings: Arc<AppSettings>, postgres_service: Arc<PostgresService>) -> AppState {
    let timeout = Duration::from_secs(settings.app_config.http.timeout_seconds);

    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("kzt-rates-bot/", env!("CARGO_PKG_VERSION")))
        .build()
        .expect("Failed to create HTTP client");

    let rates_config = &settings.app_config.rates;
    let rate_fetcher = Arc::new(RateFetcher::new(
        Arc::new(ExchangeRateApiSource::new(
            http_client.clone(),
            &rates_config.fiat_base_url,
            &settings.app_env.currency_api_token,
        )),
        Arc::new(CoinGeckoSource::new(http_client, &rates_config.crypto_url)),
    ));

    let telegram_sink = TelegramSink::new(&settings.app_env.bot_token, timeout)
        .expect("Failed to create Telegram client");
    let dispatcher = Arc::new(NotificationDispatcher::new(Arc::new(telegram_sink)));

    let snapshot_store = Arc::new(SnapshotStore::new(
        postgres_service.repository_fx_rate.clone(),
    ));

    if settings.app_env.admin_chat_ids.is_empty() {
        info!("ADMIN_ID is empty, broadcasts will only be stored");
    }

    let broadcast_job = Arc::new(BroadcastJob::new(
        rate_fetcher.clone(),
        snapshot_store,
        dispatcher.clone(),
        settings.app_env.admin_chat_ids.clone(),
    ));

    let inbound_handler = Arc::new(InboundMessageHandler::new(
        postgres_service.repository_user.clone(),
        rate_fetcher,
        dispatcher,
    ));

    AppState {
        settings,
        postgres_service,
        broadcast_job,
        inbound_handler,
    }
}

fn create_application_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook/{secret}", post(api::webhook))
        .route("/cron", get(api::cron_job))
        .route("/healthz", get(api::health_api))
        .route("/db-health", get(api::health_db))
        .layer(axum::Extension(app_state))
        .layer(create_cors())
        .layer(create_trace())
}

async fn start_http_server(app: Router, addr: SocketAddr) {
    info!("Starting HTTP server on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("Failed to bind to address {}: {}", addr, err);
            panic!("Cannot start server: {}", err);
        }
    };

    info!("Server started successfully, now accepting connections");

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", err);
        panic!("Server failed: {}", err);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
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

    info!("Shutdown signal received");
}
