//! javm driver CLI
//!
//! Runs the runtime core's driver programs: checked casts, canonical
//! class names and uncaught thread failures.

use clap::{Parser, Subcommand};
use javm_cli::commands::thread_exception::ThreadExceptionArgs;
use javm_cli::commands::{class_cast, class_name, thread_exception, SharedWriter};
use javm_cli::{config, logging};
use javm_types::standard_registry;
use parking_lot::Mutex;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "javm")]
#[command(about = "javm runtime core driver programs", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (TOML with a [threads] table)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter directives (overrides RUST_LOG, default "warn")
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cast values through java.lang.Object and report which casts succeed
    ClassCast {
        /// Instance type followed by cast targets (built-in program when empty)
        chain: Vec<String>,
    },

    /// Print canonical type names
    ClassName {
        /// Type names to resolve (built-in program when empty)
        names: Vec<String>,
        /// Extra array dimensions to wrap each type in
        #[arg(short, long, default_value_t = 0)]
        dimensions: u32,
    },

    /// Start a thread that prints a count and dies with an uncaught exception
    ThreadException {
        /// Lines printed before failing
        #[arg(short, long, default_value_t = 10)]
        count: u32,
        /// Worker thread name
        #[arg(short, long)]
        name: Option<String>,
        /// Worker thread priority
        #[arg(short, long)]
        priority: Option<i32>,
    },

    /// Run every built-in program
    All,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log.as_deref())?;

    let config = config::load(cli.config.as_deref())?;
    let registry = standard_registry();
    tracing::debug!(classes = registry.len(), "standard registry ready");

    let stdout: SharedWriter = Arc::new(Mutex::new(io::stdout()));
    let stderr: SharedWriter = Arc::new(Mutex::new(io::stderr()));

    match cli.command {
        Commands::ClassCast { chain } => {
            class_cast::execute(&registry, &chain, &mut io::stdout())?;
        }
        Commands::ClassName { names, dimensions } => {
            class_name::execute(&registry, &names, dimensions, &mut io::stdout())?;
        }
        Commands::ThreadException {
            count,
            name,
            priority,
        } => {
            let args = ThreadExceptionArgs {
                count,
                name,
                priority,
            };
            thread_exception::execute(registry, config.threads, &args, stdout, stderr)?;
        }
        Commands::All => {
            class_cast::execute(&registry, &[], &mut io::stdout())?;
            class_name::execute(&registry, &[], 0, &mut io::stdout())?;
            thread_exception::execute(
                registry,
                config.threads,
                &ThreadExceptionArgs::default(),
                stdout,
                stderr,
            )?;
        }
    }

    Ok(())
}
