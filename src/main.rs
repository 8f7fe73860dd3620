use std::net::SocketAddr;

use anyhow::Context;
use dotenv::dotenv;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

use consent_recorder::{env_utils, get_main_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    debug!("initializing app state ...");

    let config = env_utils::AppConfig::from_env();
    if config.supabase.is_none() {
        info!("Supabase credentials missing, consent records will not be stored");
    }

    let port = env_utils::get_port();
    let addr = format!("[::]:{port}")
        .parse::<SocketAddr>()
        .context("unable to parse listen address")?;

    info!("Starting server on port: {}", port);

    axum::Server::bind(&addr)
        .serve(
            get_main_router(AppState::new(config))
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .context("error while starting API server")?;

    anyhow::Ok(())
}
