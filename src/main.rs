mod config;
mod eager_env;
mod error;
mod node;
mod ring;
mod server;
mod utils;

use crate::{
    config::NodeConfig,
    eager_env::check_env,
    node::{ChordNode, maintenance},
    server::{AppStateInner, start_server},
};
use anyhow::{Context, Result};
use log::{error, info};
use std::{net::TcpListener, sync::Arc};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::builder()
        .format_timestamp(Some(env_logger::TimestampPrecision::Millis))
        .init();
    check_env();

    let config = NodeConfig::from_env();
    let bootstrap = config.bootstrap.clone();
    let node = Arc::new(ChordNode::new(config).context("invalid node configuration")?);

    let listener = TcpListener::bind(format!("0.0.0.0:{}", *eager_env::PORT))
        .context("failed to bind PORT")?;

    info!(
        "Listening on {} as {}",
        listener.local_addr().context("failed to get local address")?,
        node.local()
    );

    let stop_maintenance = maintenance::start(node.clone());

    if let Some(bootstrap) = bootstrap {
        let node = node.clone();
        tokio::spawn(async move {
            if let Err(e) = node.join(&bootstrap).await {
                error!("could not join the ring via {bootstrap}: {e}");
            }
        });
    }

    let state = Arc::new(AppStateInner { node });
    start_server(state, listener)
        .await
        .context("error while running server")?;

    stop_maintenance();

    Ok(())
}
