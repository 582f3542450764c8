// harness: wires C1-C5 together against a local fleet sidecar for manual
// smoke-testing. Not part of the published SDK surface.

use std::sync::Arc;

use clap::Parser;
use mp_query::{ServerInfo, SqpResponder};
use multiplay_server_sdk::{AllocationCoordinator, SdkEvent, ServerConfig};
use tracing::{info, warn};

/// Manual smoke-test harness for the Multiplay server SDK.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Override the bootstrap query port when no valid server.json is found.
    #[arg(long, default_value_t = 7778)]
    fallback_query_port: u16,

    /// Server name reported over SQP queries.
    #[arg(long, default_value = "harness-server")]
    server_name: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "harness starting");

    let args = Args::parse();

    let config = mp_config_or_fallback(args.fallback_query_port);
    info!(server_id = config.server_id, query_port = config.query_port, "bootstrap config ready");

    let server_info = Arc::new(ServerInfo::new());
    server_info.set_server_name(&args.server_name);
    server_info.set_game_type("harness");
    server_info.set_build_id(env!("CARGO_PKG_VERSION"));
    server_info.set_current_players(0);
    server_info.set_max_players(16);
    server_info.set_game_port(u32::from(config.game_port));

    let responder = match SqpResponder::bind(config.query_port, Arc::clone(&server_info)).await {
        Ok(responder) => Some(responder),
        Err(err) => {
            warn!(error = %err, "failed to bind SQP query port, continuing without it");
            None
        }
    };

    let coordinator = match AllocationCoordinator::new(config) {
        Ok(coordinator) => coordinator,
        Err(err) => {
            warn!(error = %err, "failed to build the allocation coordinator, exiting");
            return;
        }
    };

    let mut events = coordinator.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            match event {
                SdkEvent::Allocated(notification) => {
                    info!(?notification, "server allocated");
                }
                SdkEvent::Deallocated(notification) => {
                    info!(?notification, "server deallocated");
                }
                SdkEvent::Rt(event) => {
                    info!(?event, "real-time event");
                }
            }
        }
    });

    coordinator.subscribe_to_server_events();

    info!("harness running, press ctrl-c to stop");
    let _ = tokio::signal::ctrl_c().await;
    coordinator.unsubscribe_to_server_events();
    if let Some(responder) = responder {
        responder.shutdown();
    }
}

fn mp_config_or_fallback(fallback_query_port: u16) -> ServerConfig {
    let config = mp_config::load();
    if config.is_valid() {
        return config;
    }
    warn!("no valid server.json found, using harness fallback values");
    ServerConfig {
        server_id: 1,
        allocation_id: String::new(),
        query_port: fallback_query_port,
        game_port: fallback_query_port.saturating_sub(1),
        server_log_dir: std::env::temp_dir().display().to_string(),
    }
}
