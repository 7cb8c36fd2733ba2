use std::{io, sync::Arc};

use artifacts::{ArtifactClient, StoreArgs};
use clap::Parser;
use log::{error, info};
use tokio::{net::TcpListener, signal};

use serving::{ServerBuilder, router};

const DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Parser)]
#[command(name = "serving", about = "Serve predictions of a trained house price model")]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    /// Address to listen on.
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    host: String,

    #[arg(long, env = "PORT", default_value_t = 8000)]
    port: u16,

    /// Logical name of the served model, read from models/<name>.
    #[arg(long, env = "MODEL_NAME", default_value = "housing")]
    model_name: String,
}

async fn shutdown() {
    if let Err(e) = signal::ctrl_c().await {
        error!("failed to listen for ctrl-c: {e}");
        return;
    }
    info!("received SIGTERM");
}

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let store = cli.store.config().connect().await?;
    let client = ArtifactClient::new(store);

    // The listener is only bound once a model is loaded.
    let server = ServerBuilder::new(client, cli.model_name).start().await?;
    let app = router(Arc::new(server));

    let addr = format!("{}:{}", cli.host, cli.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("listening at {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown())
        .await?;

    info!("wrapping up");
    Ok(())
}
