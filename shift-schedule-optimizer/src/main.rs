mod restaurant;

use shift_schedule_optimizer::{solve, SolverSettings};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub fn main() -> Result<(), serde_json::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,shift_schedule_optimizer=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let request = restaurant::week()?;
    let outcome = solve(&request, &SolverSettings::default());
    info!(status = %outcome.status, elapsed_ms = outcome.elapsed_ms, "demo week solved");

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
