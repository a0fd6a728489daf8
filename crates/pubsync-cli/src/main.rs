//! pubsync - publish a local directory to a remote site
//!
//! Add files that exist only locally, update files whose content changed and
//! remove files that only exist remotely, comparing SHA-256 fingerprints.

mod display;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use console::style;
use pubsync_config::{Config, ConfigBuilder, ConfigLoader, LoggingConfig};
use pubsync_remote::HttpRemoteStore;
use pubsync_sync::{ExecutorOptions, Publisher};
use pubsync_types::{AccessToken, Credentials};
use std::path::PathBuf;
use tracing::info;

/// pubsync - publish a local directory to a remote site
#[derive(Parser)]
#[command(
    name = "pubsync",
    version = env!("CARGO_PKG_VERSION"),
    about = "Publish the current directory to a remote site",
    long_about = "pubsync makes a remote site hold exactly the files of the current directory.\n\
                  Content is compared by SHA-256 fingerprint; version control and editor\n\
                  metadata are never published."
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Quiet mode - errors only
    #[arg(short, long)]
    quiet: bool,

    /// Verbose mode - info logging even when the config says otherwise
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish the current directory
    Publish {
        /// Site identifier
        #[arg(long, env = "INPUT_SITE")]
        site: String,

        /// Access token for the site
        #[arg(long, env = "INPUT_TOKEN", hide_env_values = true)]
        token: String,

        /// Show what would change without touching the site
        #[arg(long)]
        dry_run: bool,

        /// Maximum concurrent operations per phase
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Show configuration
    Config {
        /// Show the built-in defaults instead of the effective configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load_default()?,
    };

    init_logging(cli.debug, cli.quiet, cli.verbose, &config.logging)?;

    match cli.command {
        Commands::Publish {
            site,
            token,
            dry_run,
            jobs,
        } => {
            publish_command(config, site, token, dry_run, jobs, cli.quiet).await?;
        }
        Commands::Config { default } => {
            config_command(&config, default)?;
        }
    }

    Ok(())
}

fn init_logging(debug: bool, quiet: bool, verbose: bool, logging: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if debug {
        "debug"
    } else if quiet {
        "error"
    } else if verbose {
        "info"
    } else {
        logging.level.as_str()
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .map_err(|e| anyhow!("Invalid log filter: {}", e))?;

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false);

    let installed = if logging.json_format {
        builder.json().try_init()
    } else {
        builder.with_ansi(logging.colored_output).try_init()
    };
    installed.map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

async fn publish_command(
    mut config: Config,
    site: String,
    token: String,
    dry_run: bool,
    jobs: Option<usize>,
    quiet: bool,
) -> Result<()> {
    let credentials = Credentials::new(site, AccessToken::new(token))?;
    if let Some(jobs) = jobs {
        config.sync.concurrency = jobs;
    }
    ConfigBuilder::validate(&config)?;
    info!("Got inputs for site {}", credentials.site());

    let store = HttpRemoteStore::from_config(&config.remote)?;
    let options = ExecutorOptions::default()
        .with_concurrency(config.sync.concurrency)
        .with_dry_run(dry_run);

    let report = Publisher::new(store, credentials)
        .with_root(".")
        .with_symlinks(config.sync.symlinks)
        .with_options(options)
        .publish()
        .await?;

    if !quiet {
        display::print_report(&report);
    }

    report.into_result()?;
    Ok(())
}

fn config_command(config: &Config, default: bool) -> Result<()> {
    if default {
        println!("{} Default configuration:", style("⚙").blue().bold());
        print!("{}", ConfigLoader::to_yaml(&Config::default())?);
    } else {
        println!("{} Current configuration:", style("⚙").blue().bold());
        match ConfigLoader::config_exists() {
            Some(path) => println!("{}", style(format!("# from {}", path.display())).dim()),
            None => println!("{}", style("# no configuration file found").dim()),
        }
        print!("{}", ConfigLoader::to_yaml(config)?);
    }
    Ok(())
}
