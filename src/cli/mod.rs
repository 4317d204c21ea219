// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Two commands are supported:
//   1. `generate` — writes the k-fold persona-chat files
//   2. `inspect`  — prints corpus statistics
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, GenerateArgs, InspectArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "persona-chat-data",
    version = "0.1.0",
    about = "Generate persona-conditioned, k-fold ranking datasets from character dialogue corpora."
)]
pub struct Cli {
    /// The subcommand to run (generate or inspect)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Generate(args) => Self::run_generate(args),
            Commands::Inspect(args)  => Self::run_inspect(args),
        }
    }

    /// Handles the `generate` subcommand.
    fn run_generate(args: GenerateArgs) -> Result<()> {
        use crate::application::generate_use_case::GenerateUseCase;

        tracing::info!("Generating folds from corpus in: {}", args.data_dir);

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = GenerateUseCase::new(args.into());
        let report   = use_case.execute()?;

        println!(
            "Done. {} records written across {} folds ({} examples skipped).",
            report.records_written,
            report.fold_sizes.len(),
            report.assembly_skipped(),
        );
        Ok(())
    }

    /// Handles the `inspect` subcommand.
    fn run_inspect(args: InspectArgs) -> Result<()> {
        use crate::application::inspect_use_case::InspectUseCase;

        let use_case = InspectUseCase::new(args.into());
        let rendered = use_case.execute()?;

        println!("{rendered}");
        Ok(())
    }
}
