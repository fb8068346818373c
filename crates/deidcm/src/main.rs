//! deidcm launcher
//!
//! CLI entry point: parses arguments, initializes logging, and hands
//! off to the command modules.

use clap::{Parser, Subcommand, ValueEnum};
use deidcm::PolicyMode;
use deidcm_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "deidcm", about = "Batch de-identifier for DICOM data")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Only listed top-level tags survive
    Keep,
    /// Listed tags are removed wherever they occur
    Redact,
}

impl From<ModeArg> for PolicyMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Keep => PolicyMode::Keep,
            ModeArg::Redact => PolicyMode::Redact,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// De-identify every item in a directory
    Run {
        /// Directory containing the items to process
        input_dir: PathBuf,

        /// Where output artifacts materialize before bundling
        /// (default: current directory)
        #[arg(long)]
        work_dir: Option<PathBuf>,

        /// Policy list driving instance redaction
        #[arg(long, value_enum, default_value = "keep")]
        mode: ModeArg,

        /// Override path for the keep list
        #[arg(long)]
        keep_list: Option<PathBuf>,

        /// Override path for the redact list
        #[arg(long)]
        redact_list: Option<PathBuf>,

        /// Leave private (odd-group) tags untouched
        #[arg(short = 'p', long)]
        skip_private_tags: bool,

        /// Do not collect outputs into the bundle directory
        #[arg(short = 'b', long)]
        no_bundle: bool,

        /// Do not remove previous output before processing
        #[arg(long)]
        no_clear: bool,

        /// Route DICOMDIR files through the generic pipeline instead
        /// of the length-preserving path
        #[arg(long)]
        dicomdir_pipeline: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify one item without touching it
    Inspect {
        /// File, directory, or archive to classify
        path: PathBuf,

        /// Print the classification as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _log_guard = match init_logging(LogConfig {
        app_name: "deidcm",
        verbose: cli.verbose,
    }) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: logging not initialized: {e:#}");
            None
        }
    };

    let result = match cli.command {
        Commands::Run {
            input_dir,
            work_dir,
            mode,
            keep_list,
            redact_list,
            skip_private_tags,
            no_bundle,
            no_clear,
            dicomdir_pipeline,
            json,
        } => cli::run::execute(cli::run::RunArgs {
            input_dir,
            work_dir,
            mode: mode.into(),
            keep_list,
            redact_list,
            skip_private_tags,
            no_bundle,
            no_clear,
            dicomdir_pipeline,
            json,
        }),
        Commands::Inspect { path, json } => {
            cli::inspect::execute(cli::inspect::InspectArgs { path, json })
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{e:#}"), "command failed");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
