// ============================================================
// Layer 6 — Run Report
// ============================================================
// Aggregate counters for one pipeline run: what was loaded,
// what was skipped and why, and how large each fold came out.
//
// The report serves two audiences:
//   - the operator, via tracing::info at the end of the run
//   - reproducibility checks, via report.json written next to
//     the fold files (same counts on the same inputs and seed
//     is a cheap first-line determinism check before diffing
//     the fold files themselves)
//
// Reference: Rust Book §5 (Structs)
//            serde_json documentation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything that happened during one generate run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    /// Examples surviving the load and cleaning filters
    pub examples_loaded: usize,

    /// Raw rows skipped as unparseable or missing required fields
    pub malformed_skipped: usize,

    /// Dialogue rows skipped for an empty response
    pub empty_response_skipped: usize,

    /// Examples skipped because their character has no entry in
    /// the attribute store
    pub unknown_character_skipped: usize,

    /// Examples skipped because the pool could not supply enough
    /// distinct distractors
    pub insufficient_pool_skipped: usize,

    /// Records actually assembled and written
    pub records_written: usize,

    /// Records written per fold, indexed by fold id
    pub fold_sizes: Vec<usize>,
}

impl RunReport {
    /// Total examples skipped during assembly, all reasons
    pub fn assembly_skipped(&self) -> usize {
        self.unknown_character_skipped + self.insufficient_pool_skipped
    }

    /// Log the report at info level
    pub fn log(&self) {
        tracing::info!(
            "Run complete: {} records written across {} folds (sizes: {:?})",
            self.records_written,
            self.fold_sizes.len(),
            self.fold_sizes,
        );
        tracing::info!(
            "Skips: {} malformed, {} empty responses, {} unknown characters, {} insufficient pool",
            self.malformed_skipped,
            self.empty_response_skipped,
            self.unknown_character_skipped,
            self.insufficient_pool_skipped,
        );
    }

    /// Write the report as pretty JSON into the output directory
    pub fn save(&self, out_dir: &Path) -> Result<()> {
        let path = out_dir.join("report.json");
        fs::write(&path, serde_json::to_string_pretty(self)?)
            .with_context(|| format!("cannot write report to '{}'", path.display()))?;
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_assembly_skipped_sums_reasons() {
        let report = RunReport {
            unknown_character_skipped: 3,
            insufficient_pool_skipped: 4,
            ..Default::default()
        };
        assert_eq!(report.assembly_skipped(), 7);
    }

    #[test]
    fn test_save_round_trip() {
        let dir    = TempDir::new().unwrap();
        let report = RunReport {
            examples_loaded: 12,
            records_written: 10,
            fold_sizes:      vec![2, 2, 2, 2, 2],
            ..Default::default()
        };
        report.save(dir.path()).unwrap();

        let loaded: RunReport =
            serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap())
                .unwrap();
        assert_eq!(loaded.records_written, 10);
        assert_eq!(loaded.fold_sizes, vec![2, 2, 2, 2, 2]);
    }
}
