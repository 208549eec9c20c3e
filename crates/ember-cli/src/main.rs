//! # ember
//!
//! Command-line interface for the Ember EVM.
//!
//! ## Usage
//!
//! ```bash
//! # Execute a snippet
//! ember run 600260030160005260206000f3
//! ember run --trace --json 0x6001600101
//!
//! # Disassemble bytecode
//! ember disasm 0x6001600101
//!
//! # Run state-test fixtures
//! ember statetest path/to/fixtures --fork Cancun
//!
//! # Configuration
//! ember config --show
//! ember config --set-gas 30000000 --set-fork London
//! ```

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

mod commands;
mod config;
mod error;
mod output;

pub use config::Config;
pub use error::CliError;
pub use output::Output;

/// Ember EVM CLI
#[derive(Parser, Debug)]
#[command(name = "ember")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Log filter, e.g. `debug` or `ember_evm=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Execute bytecode against a fresh state
    Run(commands::run::RunArgs),
    /// Disassemble bytecode
    Disasm(commands::disasm::DisasmArgs),
    /// Run state-test fixtures
    Statetest(commands::statetest::StateTestArgs),
    /// Show or edit configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
        /// Set the default gas for `run`
        #[arg(long)]
        set_gas: Option<u64>,
        /// Set the default fork for `run`
        #[arg(long)]
        set_fork: Option<String>,
        /// Set the default log filter
        #[arg(long)]
        set_log_level: Option<String>,
    },
}

fn main() {
    let cli = Cli::parse();
    let mut config = Config::load();
    init_tracing(&cli, &config);

    let result = match cli.command {
        Commands::Run(args) => args.execute(&config, cli.json),
        Commands::Disasm(args) => args.execute(cli.json),
        Commands::Statetest(args) => args.execute(cli.json),
        Commands::Config {
            show,
            set_gas,
            set_fork,
            set_log_level,
        } => handle_config(&mut config, show, set_gas, set_fork, set_log_level, cli.json),
    };

    if let Err(e) = result {
        if cli.json {
            println!(
                "{}",
                serde_json::json!({
                    "error": e.to_string(),
                    "success": false
                })
            );
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

/// Install the global subscriber. The filter is `--log-level`, then
/// `RUST_LOG`, then the config file. Logs go to stderr.
fn init_tracing(cli: &Cli, config: &Config) {
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
    };

    let layer = if cli.log_json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer().with_writer(std::io::stderr).boxed()
    };

    // A second init only happens in tests; keep the first subscriber
    let _ = tracing_subscriber::registry().with(layer).with(filter).try_init();
}

fn handle_config(
    config: &mut Config,
    show: bool,
    set_gas: Option<u64>,
    set_fork: Option<String>,
    set_log_level: Option<String>,
    json: bool,
) -> Result<(), CliError> {
    let mut modified = false;

    if let Some(gas) = set_gas {
        config.gas_limit = gas;
        modified = true;
    }

    if let Some(fork) = set_fork {
        commands::chain_config(&fork)?;
        config.fork = fork;
        modified = true;
    }

    if let Some(level) = set_log_level {
        EnvFilter::try_new(&level).map_err(|e| CliError::Config(e.to_string()))?;
        config.log_level = level;
        modified = true;
    }

    if modified {
        let path = config.save()?;
        Output::new(json)
            .field("status", "saved")
            .field("path", path.display().to_string())
            .line(format!("Configuration saved to {}", path.display()))
            .print();
    } else if show {
        Output::new(json)
            .field_u64("gas_limit", config.gas_limit)
            .field("fork", config.fork.clone())
            .field("log_level", config.log_level.clone())
            .line(format!("Gas limit: {}", config.gas_limit))
            .line(format!("Fork:      {}", config.fork))
            .line(format!("Log level: {}", config.log_level))
            .print();
    } else {
        Output::new(json)
            .line("Use --show to display config, or --set-gas/--set-fork/--set-log-level to modify")
            .print();
    }

    Ok(())
}
