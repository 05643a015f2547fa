//! `invscan`: read invoice scans, print the six extracted fields, save annotated copies.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, models, process};

/// Extract date, amount, invoice number, seller, client and tax ID from invoice images
#[derive(Parser)]
#[command(name = "invscan", author, version, about)]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// JSON config file (default: the per-user config, if present)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan one image and print its fields
    Process(process::ProcessArgs),

    /// Scan every image matching a glob with a shared detector
    Batch(batch::BatchArgs),

    /// Inspect or fetch the detection and recognition models
    Models(models::ModelsArgs),

    /// Inspect or edit the config file
    Config(config::ConfigArgs),
}

/// Install the stderr logger; stdout carries only command output.
fn init_logging(verbose: u8) -> anyhow::Result<()> {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Process(args) => process::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Models(args) => models::run(args, config_path).await,
        Commands::Config(args) => config::run(args).await,
    }
}
