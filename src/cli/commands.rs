// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands: `generate` and `inspect`
// and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, u64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use crate::application::generate_use_case::GenerateConfig;
use crate::application::inspect_use_case::InspectConfig;

/// The two top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the k-fold persona-chat training files
    Generate(GenerateArgs),

    /// Print corpus statistics and character notes
    Inspect(InspectArgs),
}

/// All arguments for the `generate` command.
/// Each field becomes a --flag on the command line; together
/// they are the entire configuration of a run — nothing else is
/// read from the environment, so a run can be reproduced by
/// re-supplying the same flags.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Directory containing dialogues.csv and attributes.csv
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Directory the fold files are written into
    #[arg(long, default_value = "folds")]
    pub out_dir: String,

    /// Number of cross-validation folds (K)
    #[arg(long, default_value_t = 5)]
    pub folds: usize,

    /// HLA tags sampled into each record's persona
    #[arg(long, default_value_t = 4)]
    pub persona_size: usize,

    /// Candidates per record, the true response included
    #[arg(long, default_value_t = 20)]
    pub num_candidates: usize,

    /// Seed for every sampling step; same seed, same output bytes
    #[arg(long, default_value_t = 578153)]
    pub seed: u64,

    /// Drop characters with fewer dialogues than this
    #[arg(long, default_value_t = 0)]
    pub min_dialogues: usize,

    /// Drop characters with fewer HLA tags than this
    #[arg(long, default_value_t = 0)]
    pub min_tags: usize,

    /// Character id removed outright (repeatable)
    #[arg(long = "drop-character")]
    pub drop_characters: Vec<String>,

    /// Verify an input file before parsing, as FILE=SHA256 (repeatable)
    #[arg(long = "checksum", value_parser = parse_checksum)]
    pub checksums: Vec<(String, String)>,

    /// Abort unless exactly this many examples survive cleaning
    /// (reproduction guard for published corpus versions)
    #[arg(long)]
    pub expected_examples: Option<usize>,
}

/// Parse a FILE=SHA256 pair for the --checksum flag
fn parse_checksum(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((file, digest)) if !file.is_empty() && !digest.is_empty() => {
            Ok((file.to_string(), digest.to_string()))
        }
        _ => Err(format!("expected FILE=SHA256, got '{s}'")),
    }
}

/// Convert CLI GenerateArgs into the application-layer config.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<GenerateArgs> for GenerateConfig {
    fn from(a: GenerateArgs) -> Self {
        GenerateConfig {
            data_dir:        a.data_dir,
            out_dir:         a.out_dir,
            folds:           a.folds,
            persona_size:    a.persona_size,
            num_candidates:  a.num_candidates,
            seed:            a.seed,
            min_dialogues:   a.min_dialogues,
            min_tags:        a.min_tags,
            drop_characters: a.drop_characters,
            checksums:       a.checksums,
            expected_examples: a.expected_examples,
        }
    }
}

/// All arguments for the `inspect` command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Directory containing dialogues.csv and attributes.csv
    #[arg(long, default_value = "data")]
    pub data_dir: String,

    /// Also print this character's note and full tag list
    #[arg(long)]
    pub character: Option<String>,

    /// How many of the busiest characters to list
    #[arg(long, default_value_t = 20)]
    pub top: usize,
}

impl From<InspectArgs> for InspectConfig {
    fn from(a: InspectArgs) -> Self {
        InspectConfig {
            data_dir:  a.data_dir,
            character: a.character,
            top:       a.top,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_checksum_ok() {
        let parsed = parse_checksum("dialogues.csv=abc123").unwrap();
        assert_eq!(parsed, ("dialogues.csv".to_string(), "abc123".to_string()));
    }

    #[test]
    fn test_parse_checksum_rejects_bad_input() {
        assert!(parse_checksum("no-equals-sign").is_err());
        assert!(parse_checksum("=digestonly").is_err());
        assert!(parse_checksum("fileonly=").is_err());
    }
}
