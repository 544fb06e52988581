//! bookscout: search public book catalogs and download a chosen title.

use std::path::PathBuf;
use std::time::Duration;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use bookscout::CatalogId;
use bookscout_cli::commands;
use bookscout_cli::config::{resolve_catalogs, resolve_download_dir, ScoutConfig};

#[derive(Parser)]
#[command(
    name = "bookscout",
    about = "bookscout: search public book catalogs and download a chosen title",
    version,
    after_help = "Run 'bookscout' with no command for an interactive session."
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Directory for downloaded files.
    /// Also reads from BOOKSCOUT_DOWNLOAD_DIR.
    #[arg(long, global = true)]
    download_dir: Option<String>,

    /// Pause between catalog queries, in milliseconds.
    #[arg(long, global = true, default_value = "1000")]
    delay_ms: u64,

    /// Catalog to query (repeatable). Defaults to noor-book and kutub-pdf.
    #[arg(long = "source", global = true)]
    sources: Vec<CatalogId>,

    /// Follow a result's page to a direct file link before downloading.
    #[arg(long, global = true)]
    follow_links: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the selected catalogs and print the results.
    Search {
        /// Search term.
        query: String,
        /// Output results as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Download a file by URL.
    Download {
        /// URL of the file.
        url: String,
        /// Title used to name the file inside the download directory.
        #[arg(long)]
        title: Option<String>,
        /// Explicit destination path.
        #[arg(long, short, conflicts_with = "title")]
        output: Option<PathBuf>,
    },
    /// List the known catalogs.
    Sources {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ScoutConfig {
        download_dir: resolve_download_dir(cli.download_dir.as_deref()),
        delay: Duration::from_millis(cli.delay_ms),
        catalogs: resolve_catalogs(&cli.sources),
        follow_links: cli.follow_links,
        ..ScoutConfig::default()
    };

    let result = match cli.command {
        None => commands::run_interactive(&config).await,
        Some(Commands::Search { query, json }) => commands::run_search(&config, &query, json).await,
        Some(Commands::Download { url, title, output }) => {
            commands::run_download(&config, &url, title.as_deref(), output.as_deref()).await
        }
        Some(Commands::Sources { json }) => commands::run_sources(json),
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "bookscout", &mut std::io::stdout());
            Ok(())
        }
    };

    // 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("  Error: {e:#}");
        std::process::exit(1);
    }

    result
}
