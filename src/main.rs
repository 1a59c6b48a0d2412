mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::Config;
use dotenv::dotenv;
use routes::create_router;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

use crate::db::db::DBClient;
use service::{
    audit_service::AuditService,
    payout_provider::{PaystackRail, PayoutRail},
    resolution_service::ResolutionService,
    settlement_service::SettlementService,
    violation_service::ViolationService,
};

#[derive(Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<DBClient>,
    pub violation_service: Arc<ViolationService>,
    pub resolution_service: Arc<ResolutionService>,
    pub settlement_service: Arc<SettlementService>,
    pub audit_service: Arc<AuditService>,
}

impl AppState {
    pub fn new(db_client: DBClient, config: Config) -> Self {
        let db_client_arc = Arc::new(db_client);

        let audit_service = Arc::new(AuditService::new(db_client_arc.clone()));
        let payout_rail: Arc<dyn PayoutRail> = Arc::new(PaystackRail::new(&config));

        let settlement_service = Arc::new(SettlementService::new(
            db_client_arc.clone(),
            payout_rail,
            audit_service.clone(),
        ));

        let resolution_service = Arc::new(ResolutionService::new(
            db_client_arc.clone(),
            settlement_service.clone(),
            audit_service.clone(),
        ));

        let violation_service = Arc::new(ViolationService::new(
            db_client_arc.clone(),
            settlement_service.clone(),
            audit_service.clone(),
        ));

        Self {
            env: config,
            db_client: db_client_arc,
            violation_service,
            resolution_service,
            settlement_service,
            audit_service,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = Config::init();

    let pool = match PgPoolOptions::new()
        .max_connections(20)
        .min_connections(5)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("Connection to the database is successful");
            pool
        }
        Err(err) => {
            tracing::error!("Failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    let db_client = DBClient::new(pool);

    let allowed_origins = vec![
        "http://localhost:5173".parse::<HeaderValue>().unwrap(),
        "http://localhost:8000".parse::<HeaderValue>().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE]);

    let app_state = Arc::new(AppState::new(db_client, config.clone()));

    let app = create_router(app_state).layer(cors);

    tracing::info!("Server is running on http://localhost:{}", config.port);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", &config.port))
        .await
        .unwrap();

    axum::serve(listener, app).await.unwrap();
}
