mod api_doc;
mod error;
mod handlers;
mod middleware;
mod setup;
mod state;
mod telemetry;
mod validation;

use clearcut_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load .env if present; real environment wins.
    dotenvy::dotenv().ok();

    telemetry::init();

    let config = Config::from_env()?;
    config.validate()?;
    error::init_error_mode(config.is_hardened());

    let (state, sweep_task) = setup::services::build_state(config.clone()).await?;
    let router = setup::routes::setup_routes(&config, state)?;

    setup::server::start_server(&config, router, sweep_task).await?;

    Ok(())
}
