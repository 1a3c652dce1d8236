mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wright_lib::consts::BUILD_FILE;
use wright_lib::util::version::Bump;

use crate::cmd::{cmd_bump, cmd_list, cmd_run};
use crate::output::print_error;

/// wright - task runner for Lua build files
#[derive(Parser)]
#[command(name = "wright")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Run a task from a build file
  Run {
    /// Name of the task to run
    #[arg(default_value = "build")]
    task: String,

    /// Path to the build file
    #[arg(short, long, default_value = BUILD_FILE)]
    script: PathBuf,
  },

  /// List the tasks a build file exports
  List {
    /// Path to the build file
    #[arg(short, long, default_value = BUILD_FILE)]
    script: PathBuf,

    /// Output as JSON
    #[arg(long)]
    json: bool,
  },

  /// Bump the VERSION declared in a build file
  Bump {
    /// Version part to increment: major, minor or patch
    #[arg(default_value = "patch")]
    part: Bump,

    /// Path to the build file
    #[arg(short, long, default_value = BUILD_FILE)]
    script: PathBuf,
  },
}

fn init_logging(verbose: bool) {
  let default = if verbose { "debug" } else { "info" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  let result = match cli.command {
    Commands::Run { task, script } => cmd_run(&task, &script),
    Commands::List { script, json } => cmd_list(&script, json),
    Commands::Bump { part, script } => cmd_bump(part, &script),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_error(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
