mod db;
mod offline;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "roadwatch-cli")]
#[command(about = "Road condition matching command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance.
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Print the severity tier and display color for a condition score.
    Classify {
        /// Condition score in [0, 100].
        score: f64,
    },
    /// Match a point against every road in a network file, without a database.
    Match {
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long)]
        network: PathBuf,
        /// Per-side buffer width in meters.
        #[arg(long, default_value_t = roadwatch_core::DEFAULT_BUFFER_METERS)]
        tolerance: f64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    Ping,
    Migrate,
    /// Upsert cities and roads from a network file.
    Seed {
        /// Defaults to `ROADWATCH_NETWORK_PATH`.
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Db { command }) => db::run(command).await?,
        Some(Commands::Classify { score }) => offline::run_classify(score)?,
        Some(Commands::Match {
            lng,
            lat,
            network,
            tolerance,
        }) => offline::run_match(lng, lat, &network, tolerance)?,
        None => println!("roadwatch-cli: no command given; see --help"),
    }

    Ok(())
}

#[cfg(test)]
mod tests;
