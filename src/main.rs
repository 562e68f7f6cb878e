use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use sales_dashboard::config::Config;
use sales_dashboard::db::DashboardStorage;
use sales_dashboard::router::{DashboardState, dashboard_router, session_key};
use sales_dashboard::service::Dashboard;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        listen_addr = %cfg.basic.listen_addr,
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel,
        upload_limit_bytes = cfg.basic.upload_limit_bytes,
        insecure_cookie = cfg.basic.insecure_cookie,
    );

    if cfg.basic.cookie_key.is_none() {
        warn!("no cookie_key configured; sessions will not survive a restart");
    }
    let key = session_key(cfg.basic.cookie_key.as_deref())?;

    let storage = DashboardStorage::connect(&cfg.basic.database_url).await?;
    let dashboard = Dashboard::bootstrap(storage, &cfg.admin).await?;

    let state = DashboardState::new(dashboard, key, cfg.basic.insecure_cookie);
    let app = dashboard_router(state, cfg.basic.upload_limit_bytes);

    let listener = TcpListener::bind(cfg.basic.listen_addr.as_str()).await?;
    info!("HTTP server listening on {}", cfg.basic.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;
    Ok(())
}
