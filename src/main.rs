use std::sync::Arc;
use std::time::Duration;

use sea_orm_migration::MigratorTrait;
use tracing::{info, warn};

use warehouse_api::config::{init_tracing, load_config};
use warehouse_api::db::establish_connection;
use warehouse_api::erp::{client::HttpErpTransport, ErpTransport};
use warehouse_api::migrator::Migrator;
use warehouse_api::services::AppServices;
use warehouse_api::{app_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config.log_level, config.log_json);

    let db = Arc::new(establish_connection(&config).await?);
    if config.auto_migrate {
        Migrator::up(&*db, None).await?;
        info!("database migrations applied");
    }

    let erp_transport: Option<Arc<dyn ErpTransport>> = match &config.erp_base_url {
        Some(base_url) => {
            let transport = HttpErpTransport::new(
                base_url,
                config.erp_api_key.as_deref(),
                Duration::from_secs(config.erp_timeout_secs),
            )?;
            info!(%base_url, "ERP exchange enabled");
            Some(Arc::new(transport))
        }
        None => {
            warn!("no ERP base URL configured, ERP exchange disabled");
            None
        }
    };

    let services = AppServices::new(db.clone(), erp_transport, config.warehouse_label.clone());
    services.catalog.ensure_default_location().await?;

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "warehouse API listening");

    let app = app_router(AppState {
        db,
        config,
        services,
    });
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for the shutdown signal");
    }
    info!("shutting down");
}
