use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use anyhow::Context;

mod api;
mod attendance;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod routes;
mod store;
mod utils;

use crate::api::AppState;
use crate::attendance::{
    ClockInOrchestrator,
    clock::{Clock, SystemClock},
    lifecycle::AttendanceService,
    remote_approval::RemoteApprovalService,
};
use crate::docs::ApiDoc;
use crate::routes::Limiters;
use crate::store::MySqlStore;
use config::Config;
use db::init_db;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi; // ← needed for ApiDoc::openapi()
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "HRM attendance service"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(
        timezone = %config.company_timezone,
        location_timeout_s = config.location_timeout.as_secs(),
        "Server starting..."
    );

    let pool = init_db(&config.database_url, config.run_migrations).await?;
    let store = Arc::new(MySqlStore::new(pool));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let orchestrator = ClockInOrchestrator::new(
        AttendanceService::new(store.clone(), clock.clone()),
        RemoteApprovalService::new(store.clone(), clock.clone()),
        store.clone(),
        store.clone(),
        clock.clone(),
    )
    .with_timezone(config.company_timezone)
    .with_location_timeout(config.location_timeout);

    let state = AppState {
        orchestrator,
        shifts: store.clone(),
        offices: store.clone(),
        employees: store,
        clock,
        default_fence_radius_m: config.default_fence_radius_m,
    };

    let limiters = Limiters::from_config(&config)?;
    let server_addr = config.server_addr.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(state.clone()))
            .app_data(Data::new(config.clone()))
            .service(index)
            // Protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, &config.api_prefix, &limiters))
    })
    .bind(&server_addr)
    .with_context(|| format!("Failed to bind {server_addr}"))?
    .run()
    .await?;

    Ok(())
}
