use shift_schedule_backend::error::AppError;
use shift_schedule_backend::run_server;
use shift_schedule_config::get_config;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,shift_schedule_optimizer=debug,hyper=info";

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();

    let config = get_config()?;
    info!(
        port = config.server.port,
        time_limit_seconds = config.solver.time_limit_seconds,
        "loaded configuration"
    );

    let server = run_server(config).await?;
    server.await
}
