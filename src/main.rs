use dotenvy::dotenv;
use schoolportal::logging::init_tracing;
use schoolportal::metrics::{init_metrics, metrics_app};
use schoolportal::router::init_router;
use schoolportal::state::init_app_state;
use schoolportal_config::ServerConfig;
use schoolportal_db::run_migrations;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let metrics_handle = init_metrics()?;

    let state = init_app_state().await?;
    run_migrations(&state.db).await?;

    let mut app = init_router(state);
    if let Some(handle) = metrics_handle {
        app = app.merge(metrics_app(handle));
    }

    let server_config = ServerConfig::from_env();
    let listener = tokio::net::TcpListener::bind(server_config.bind_addr()).await?;
    info!("Server running on http://{}", server_config.bind_addr());

    axum::serve(listener, app).await?;
    Ok(())
}
