use std::{path::PathBuf, process::ExitCode, time::Duration};

use artifacts::{ArtifactClient, ArtifactKind, StoreArgs};
use clap::{Args, Parser, Subcommand};
use log::{error, info};

use pipeline::{
    FetchStage, FileSource, HttpSource, PreprocessConfig, PreprocessStage,
    TrainConfig, TrainStage,
    config::{DEFAULT_DATASET, DEFAULT_DROP_COLUMN, DEFAULT_SEED, DEFAULT_TARGET, DEFAULT_TEST_FRACTION},
    source::DEFAULT_DATASET_URL,
};

#[derive(Parser)]
#[command(name = "pipeline", about = "Fetch, preprocess and train the house price model")]
struct Cli {
    #[command(flatten)]
    store: StoreArgs,

    /// Logical dataset name shared by every artifact of a run.
    #[arg(long, env = "DATASET_NAME", default_value = DEFAULT_DATASET)]
    name: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download the raw dataset into raw/<name>.
    Fetch(SourceArgs),
    /// Clean raw/<name> into processed/<name>.
    Preprocess(PreprocessArgs),
    /// Fit a model on processed/<name> and store models/<name>.
    Train(TrainArgs),
    /// Run fetch, preprocess and train in order.
    Run {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        preprocess: PreprocessArgs,
        #[command(flatten)]
        train: TrainArgs,
    },
    /// List the stored artifacts.
    List,
}

#[derive(Args)]
struct SourceArgs {
    /// Dataset URL.
    #[arg(long, env = "DATASET_URL", default_value = DEFAULT_DATASET_URL)]
    url: String,

    /// Read the dataset from a local file instead of the URL.
    #[arg(long, env = "DATASET_FILE")]
    file: Option<PathBuf>,

    /// Download timeout, in seconds.
    #[arg(long, env = "SOURCE_TIMEOUT_SECS", default_value_t = 60)]
    source_timeout_secs: u64,
}

#[derive(Args)]
struct PreprocessArgs {
    /// Non-predictive columns to drop.
    #[arg(long, env = "DROP_COLUMNS", value_delimiter = ',', default_value = DEFAULT_DROP_COLUMN)]
    drop_columns: Vec<String>,
}

#[derive(Args)]
struct TrainArgs {
    /// Column to predict.
    #[arg(long, env = "TARGET_COLUMN", default_value = DEFAULT_TARGET)]
    target: String,

    /// Share of rows held out for scoring.
    #[arg(long, env = "TEST_FRACTION", default_value_t = DEFAULT_TEST_FRACTION)]
    test_fraction: f64,

    /// Seed of the train/test shuffle.
    #[arg(long, env = "SEED", default_value_t = DEFAULT_SEED)]
    seed: u64,
}

async fn fetch(client: &ArtifactClient, name: &str, args: SourceArgs) -> pipeline::Result<()> {
    let report = match args.file {
        Some(path) => FetchStage::new(client.clone(), FileSource::new(path)).run(name).await?,
        None => {
            let timeout = Duration::from_secs(args.source_timeout_secs.max(1));
            let source = HttpSource::new(args.url, timeout)?;
            FetchStage::new(client.clone(), source).run(name).await?
        }
    };

    println!("{}: {} rows, {} columns", report.key, report.rows, report.columns);
    Ok(())
}

async fn preprocess(client: &ArtifactClient, name: &str, args: PreprocessArgs) -> pipeline::Result<()> {
    let config = PreprocessConfig::new(args.drop_columns)?;
    let report = PreprocessStage::new(client.clone(), config).run(name).await?;

    println!("{}: {} of {} rows kept", report.key, report.rows_out, report.rows_in);
    Ok(())
}

async fn train(client: &ArtifactClient, name: &str, args: TrainArgs) -> pipeline::Result<()> {
    let config = TrainConfig::new(args.target, args.test_fraction, args.seed)?;
    let report = TrainStage::new(client.clone(), config).run(name).await?;

    println!("{}: held-out R^2 {:.4}, RMSE {:.2}", report.key, report.held_out_r2, report.rmse);
    Ok(())
}

async fn list(client: &ArtifactClient) -> pipeline::Result<()> {
    for kind in [ArtifactKind::Raw, ArtifactKind::Processed, ArtifactKind::Model] {
        for key in client.list(kind).await? {
            println!("{key}");
        }
    }
    Ok(())
}

async fn execute(cli: Cli) -> pipeline::Result<()> {
    let store = cli.store.config().connect().await?;
    let client = ArtifactClient::new(store);
    let name = cli.name.as_str();

    match cli.command {
        Command::Fetch(args) => fetch(&client, name, args).await,
        Command::Preprocess(args) => preprocess(&client, name, args).await,
        Command::Train(args) => train(&client, name, args).await,
        Command::Run {
            source,
            preprocess: clean,
            train: fit,
        } => {
            fetch(&client, name, source).await?;
            preprocess(&client, name, clean).await?;
            train(&client, name, fit).await
        }
        Command::List => list(&client).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => {
            info!("done");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(code = e.code(); "{e}");
            eprintln!("error [{}]: {e}", e.code());
            ExitCode::FAILURE
        }
    }
}
