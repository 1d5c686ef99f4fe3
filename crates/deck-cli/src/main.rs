//! Deck CLI - deploy Decks onto Kubernetes clusters

use clap::{Parser, Subcommand};
use console::style;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod error;
mod exit_codes;

use error::CliError;

#[derive(Parser)]
#[command(name = "deck")]
#[command(author = "Deck Contributors")]
#[command(version)]
#[command(
    about = "Deploy declarative application bundles (Decks) onto Kubernetes",
    long_about = None
)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Configuration file (default: <config dir>/deck/config.yaml)
    #[arg(long, global = true, env = "DECK_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the decks of a Deckfile
    List {
        /// Deckfile or directory containing one
        #[arg(default_value = ".")]
        deckfile: PathBuf,
    },

    /// Render a deck and apply it to the current cluster
    Get {
        /// Deckfile or directory containing one
        #[arg(default_value = ".")]
        deckfile: PathBuf,

        /// Deck to install (default: the first one)
        #[arg(long)]
        name: Option<String>,

        /// Wait for all pods to become ready
        #[arg(short = 'W', long)]
        wait: bool,

        /// Seconds to wait for pods
        #[arg(
            short = 'T',
            long,
            default_value_t = 120,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        timeout: u64,

        /// Use the current kubectl context instead of a managed cluster
        #[arg(short = 'I', long)]
        no_cluster: bool,

        /// Never prompt and draw no progress spinner
        #[arg(short = 'y', long)]
        no_input: bool,
    },

    /// Render a deck and delete its resources from the current cluster
    Remove {
        /// Deckfile or directory containing one
        #[arg(default_value = ".")]
        deckfile: PathBuf,

        /// Deck to remove (default: the first one)
        #[arg(long)]
        name: Option<String>,

        /// Use the current kubectl context instead of a managed cluster
        #[arg(short = 'I', long)]
        no_cluster: bool,
    },

    /// Render a deck locally
    Template {
        /// Deckfile or directory containing one
        #[arg(default_value = ".")]
        deckfile: PathBuf,

        /// Deck to render (default: the first one)
        #[arg(long)]
        name: Option<String>,

        /// Kubernetes version to render for (X.Y) instead of asking the cluster
        #[arg(long)]
        kube_version: Option<String>,

        /// Output directory (if not set, outputs to stdout)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn init_logging(debug: bool) {
    let default = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();
}

/// Remove live scratch directories when interrupted
fn install_interrupt_handler() {
    let installed = ctrlc::set_handler(|| {
        deck_engine::cleanup_scratch_dirs();
        std::process::exit(exit_codes::INTERRUPTED);
    });

    if let Err(e) = installed {
        tracing::warn!("Could not install Ctrl+C handler: {}", e);
    }
}

fn run(cli: Cli) -> error::Result<()> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::List { deckfile } => commands::list::run(&deckfile),

        Commands::Get {
            deckfile,
            name,
            wait,
            timeout,
            no_cluster,
            no_input,
        } => {
            let options = commands::get::GetOptions {
                wait,
                timeout,
                no_cluster,
                no_input,
            };
            commands::get::run(&deckfile, name.as_deref(), &options, config)
        }

        Commands::Remove {
            deckfile,
            name,
            no_cluster,
        } => commands::remove::run(&deckfile, name.as_deref(), no_cluster, config),

        Commands::Template {
            deckfile,
            name,
            kube_version,
            output_dir,
        } => commands::template::run(
            &deckfile,
            name.as_deref(),
            kube_version.as_deref(),
            output_dir.as_deref(),
            config,
        ),

        Commands::Version => commands::version::run(config),
    }
}

fn report(err: CliError, debug: bool) {
    eprintln!(
        "{} {}",
        style("There was an error running deck:").red().bold(),
        err
    );

    if debug {
        eprintln!("{:?}", miette::Report::new(err));
    }
}

fn main() {
    miette::set_panic_hook();

    let cli = Cli::parse();
    let debug = cli.debug;

    init_logging(debug);
    install_interrupt_handler();

    if let Err(err) = run(cli) {
        let code = err.exit_code();
        report(err, debug);
        std::process::exit(code);
    }
}
