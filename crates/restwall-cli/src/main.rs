use anyhow::Result;
use clap::Parser;
use restwall_core::{ControlStore, LogSurface, Scheduler};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Parser, Debug)]
#[command(name = "restwall", version)]
#[command(about = "Scheduled screen-break overlay daemon with remote control", long_about = None)]
struct Args {
    /// Listen address for the remote control API.
    #[arg(long, default_value = "0.0.0.0:34567")]
    listen: SocketAddr,

    /// Shared secret required on every API request.
    #[arg(long, env = "RESTWALL_ADMIN_KEY")]
    admin_key: String,

    /// Seconds between scheduler re-evaluations.
    #[arg(long, default_value_t = 3)]
    tick_seconds: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let store = Arc::new(ControlStore::new());
    let scheduler = Scheduler::new(store.clone(), Box::new(LogSurface));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let app = restwall_http::router(store, &args.admin_key);
    let listener = tokio::net::TcpListener::bind(args.listen).await?;
    log::info!("remote control listening on http://{}", args.listen);

    let mut server_shutdown = shutdown_rx.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.changed().await;
            })
            .await
    });

    let scheduler_task = tokio::spawn(scheduler.run(args.tick_seconds, shutdown_rx));

    tokio::signal::ctrl_c().await?;
    log::info!("received ctrl-c, shutting down");
    let _ = shutdown_tx.send(true);

    scheduler_task.await?;
    server.await??;
    log::info!("shut down cleanly");
    Ok(())
}
