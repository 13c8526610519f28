use axum::Router;
use migration::MigratorTrait;
use tokio::net::TcpListener;
use tracing::{info, warn};

use configs::AppConfig;
use service::seed;

use crate::{routes, state::ServerState};

/// Connect, migrate, seed and build the router.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<(Router, ServerState)> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None).await?;
        info!("migrations applied");
    }
    let state = ServerState::new(db.clone(), cfg)?;
    if let Some(report) = seed::run(&db, &cfg.seed, state.auth.as_ref(), &state.sales).await? {
        info!(organization_id = %report.organization_id, "demo data seeded");
    }
    Ok((routes::build_router(state.clone()), state))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl_c");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Public entry: build the app and serve until Ctrl+C.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let (app, state) = build_app(&cfg).await?;

    let listener = TcpListener::bind((cfg.server.host.as_str(), cfg.server.port)).await?;
    info!(addr = %listener.local_addr()?, "server listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    state.db.close().await?;
    info!("server stopped");
    Ok(())
}
