use anyhow::Context;
use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufWriter;
use tracing::{info, warn};

use parcel_stream::catalog::DatasetCatalog;
use parcel_stream::config::Config;
use parcel_stream::parcel::RowTransformer;
use parcel_stream::pipeline::{LineSink, RowStream, StreamingPipeline, WriterSink};
use parcel_stream::server::{self, AppState};
use parcel_stream::{logging, metrics};

#[derive(Parser)]
#[command(name = "parcel_stream")]
#[command(about = "Streams county parcel datasets as enriched NDJSON")]
#[command(version)]
struct Cli {
    /// Path to a TOML config file (defaults to parcel_stream.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the parcel API over HTTP
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Directory holding <county>_parcels.csv files
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Enrich one CSV file and write NDJSON to stdout or a file
    Enrich {
        input: PathBuf,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List the dataset identifiers available in the data directory
    Datasets {
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    let _log_guard = logging::init_logging(&config.logging);

    for category in config.zoning.unscored_categories() {
        warn!(
            "Zoning category '{}' has no fitness score; parcels mapped to it get a null score",
            category
        );
    }

    match cli.command {
        Commands::Serve {
            host,
            port,
            data_dir,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(dir) = data_dir {
                config.data.dir = dir;
            }

            metrics::init_metrics();
            let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
                .parse()
                .with_context(|| format!("invalid listen address {}", config.server.host))?;
            info!(data_dir = %config.data.dir.display(), "Serving parcel datasets");

            let state = Arc::new(AppState::from_config(&config));
            server::start_server(state, addr).await?;
        }
        Commands::Enrich { input, output } => {
            let file = tokio::fs::File::open(&input)
                .await
                .with_context(|| format!("opening {}", input.display()))?;
            let mut sink: Box<dyn LineSink> = match &output {
                Some(path) => {
                    let out = tokio::fs::File::create(path)
                        .await
                        .with_context(|| format!("creating {}", path.display()))?;
                    Box::new(WriterSink::new(BufWriter::new(out)))
                }
                None => Box::new(WriterSink::new(BufWriter::new(tokio::io::stdout()))),
            };

            let transformer = RowTransformer::for_current_year(
                Arc::new(config.zoning.clone()),
                Arc::new(config.columns.clone()),
            );
            let name = input.display().to_string();
            let mut pipeline = StreamingPipeline::new(name, transformer);
            let summary = pipeline
                .run(RowStream::new(file), sink.as_mut())
                .await?;
            info!(
                rows = summary.rows_emitted,
                diagnostics = summary.diagnostics,
                "Enrichment finished"
            );
        }
        Commands::Datasets { data_dir } => {
            let dir = data_dir.unwrap_or(config.data.dir);
            let catalog = DatasetCatalog::new(dir);
            for id in catalog.list().await? {
                println!("{}", id);
            }
        }
    }

    Ok(())
}
