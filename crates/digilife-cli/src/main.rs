//! digilife CLI - headless runs, saved worlds and statistics.

mod commands;
mod config;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "digilife")]
#[command(author, version, about = "digilife - evolving digital creatures", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new digilife project
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Run the simulation headless
    Run(RunArgs),

    /// Show statistics for a saved world
    Stats {
        /// Saved session name or file (default: the current session)
        #[arg(short, long)]
        session: Option<String>,

        /// Print the statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage sessions
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
}

#[derive(Args, Default)]
pub struct RunArgs {
    /// Number of ticks to run (default: from digilife.toml)
    #[arg(short, long)]
    pub ticks: Option<u64>,

    /// Initial population
    #[arg(long)]
    pub population: Option<usize>,

    /// Food items spawned per second
    #[arg(long)]
    pub data_rate: Option<f64>,

    /// World size as WIDTHxHEIGHT
    #[arg(long)]
    pub world_size: Option<String>,

    /// Disable GPU batch evaluation
    #[arg(long)]
    pub no_gpu: bool,

    /// Disable vocalizations
    #[arg(long)]
    pub no_audio: bool,

    /// Log every birth, death, vocalization and mutation
    #[arg(long)]
    pub debug: bool,

    /// Simulated steps per second
    #[arg(long)]
    pub fps: Option<u32>,

    /// Speed multiplier applied to every step
    #[arg(long)]
    pub speed: Option<f64>,

    /// Resume from a saved session name or file
    #[arg(long)]
    pub load: Option<String>,

    /// RNG seed for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Subcommand)]
enum SessionCommands {
    /// Save the current world under a name
    Save {
        /// Session name
        name: String,
    },

    /// Make a saved session the current world
    Load {
        /// Session name
        name: String,
    },

    /// List saved sessions
    List,
}

fn init_logging(verbose: bool, debug: bool) {
    let level = if debug {
        LevelFilter::DEBUG
    } else if verbose {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let debug = matches!(&cli.command, Commands::Run(args) if args.debug);
    init_logging(cli.verbose, debug);

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Run(args) => commands::run::run(&args, cli.verbose),
        Commands::Stats { session, json } => commands::stats::run(session.as_deref(), json),
        Commands::Session { command } => match command {
            SessionCommands::Save { name } => commands::session::save(&name),
            SessionCommands::Load { name } => commands::session::load(&name),
            SessionCommands::List => commands::session::list(),
        },
    }
}
