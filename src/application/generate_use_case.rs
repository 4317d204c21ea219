// ============================================================
// Layer 2 — GenerateUseCase (Pipeline Driver)
// ============================================================
// Orchestrates the full fold-generation pipeline in order:
//
//   Step 1: Load + clean the raw corpus    (Layer 4 - data)
//   Step 2: Build the attribute store      (Layer 4 - data)
//   Step 3: Build the candidate pool       (Layer 4 - data)
//   Step 4: Partition examples into folds  (Layer 4 - data)
//   Step 5: Assemble + write each fold     (Layer 4 - data)
//   Step 6: Save config + run report       (Layer 6 - infra)
//
// Reproducibility contract:
//   one StdRng seeded from the configured seed is threaded
//   through every sampling step — fold shuffle, persona subset,
//   distractor draw, true-response placement — and examples are
//   visited in a deterministic order (fold 0..k, load order
//   within each fold). Same seed + same inputs ⇒ byte-identical
//   fold files.
//
// Failure policy:
//   per-example errors (unknown character, insufficient pool)
//   are counted skips; I/O and checksum errors abort the run.
//   Fold files are renamed into place only when complete, so an
//   aborted run leaves no ambiguous partial output.

use anyhow::{ensure, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::data::{
    assembler::assemble,
    attribute_store::AttributeStore,
    candidate_pool::CandidatePool,
    loader::{CorpusLoader, LoadOptions},
    partitioner::partition,
    writer::FoldWriter,
};
use crate::domain::errors::PipelineError;
use crate::infra::report::RunReport;

// ─── Generation Configuration ────────────────────────────────────────────────
// Every knob of a run, explicit and re-suppliable. Nothing is
// read from ambient process state; rerunning with the same
// config and inputs reproduces the same bytes. Serialized to
// config.json next to the fold files for exactly that purpose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    pub data_dir:        String,
    pub out_dir:         String,
    pub folds:           usize,
    pub persona_size:    usize,
    pub num_candidates:  usize,
    pub seed:            u64,
    pub min_dialogues:   usize,
    pub min_tags:        usize,
    pub drop_characters: Vec<String>,
    pub checksums:       Vec<(String, String)>,

    /// Expected example count after cleaning, for reproduction runs
    pub expected_examples: Option<usize>,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            data_dir:        "data".to_string(),
            out_dir:         "folds".to_string(),
            folds:           5,
            persona_size:    4,
            num_candidates:  20,
            seed:            578153,
            min_dialogues:   0,
            min_tags:        0,
            drop_characters: Vec::new(),
            checksums:       Vec::new(),
            expected_examples: None,
        }
    }
}

// ─── GenerateUseCase ─────────────────────────────────────────────────────────
// Owns the config and runs the full pipeline.
pub struct GenerateUseCase {
    config: GenerateConfig,
}

impl GenerateUseCase {
    pub fn new(config: GenerateConfig) -> Self {
        Self { config }
    }

    /// Execute the full generation pipeline end to end.
    pub fn execute(&self) -> Result<RunReport> {
        let cfg = &self.config;

        ensure!(cfg.folds >= 1, "fold count must be at least 1");
        ensure!(cfg.persona_size >= 1, "persona size must be at least 1");
        ensure!(
            cfg.num_candidates >= 2,
            "need at least 2 candidates (the true response plus one distractor)"
        );

        // ── Step 1: Load + clean the raw corpus ───────────────────────────────
        tracing::info!("Loading corpus from '{}'", cfg.data_dir);
        let loader = CorpusLoader::new(
            &cfg.data_dir,
            LoadOptions {
                min_dialogues:   cfg.min_dialogues,
                min_tags:        cfg.min_tags,
                drop_characters: cfg.drop_characters.clone(),
                checksums:       cfg.checksums.clone(),
                expected_examples: cfg.expected_examples,
            },
        );
        let corpus = loader.load()?;

        // ── Step 2: Build the attribute store ─────────────────────────────────
        let store = AttributeStore::new(corpus.characters);
        tracing::info!("Attribute store: {} characters", store.len());

        // ── Step 3: Build the candidate pool ──────────────────────────────────
        let pool = CandidatePool::build(&corpus.examples);

        // ── Step 4: Partition examples into folds ─────────────────────────────
        // One seeded RNG from here on, threaded through every
        // sampling step in a fixed order.
        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let assignment = partition(&corpus.examples, cfg.folds, &mut rng);
        tracing::info!("Partitioned {} examples: fold sizes {:?}",
            assignment.len(),
            assignment.fold_sizes(),
        );

        // ── Step 5: Assemble and write each fold ──────────────────────────────
        let writer = FoldWriter::new(&cfg.out_dir)?;
        let mut report = RunReport {
            examples_loaded:        corpus.examples.len(),
            malformed_skipped:      corpus.stats.malformed,
            empty_response_skipped: corpus.stats.empty_response,
            fold_sizes:             vec![0; cfg.folds],
            ..Default::default()
        };

        for fold in 0..cfg.folds {
            let mut records = Vec::new();
            for index in assignment.fold_members(fold) {
                let example = &corpus.examples[index];
                match assemble(
                    example,
                    fold,
                    &store,
                    &pool,
                    cfg.persona_size,
                    cfg.num_candidates,
                    &mut rng,
                ) {
                    Ok(record) => records.push(record),
                    Err(PipelineError::UnknownCharacter(id)) => {
                        tracing::debug!("Skipping example of unknown character {}", id);
                        report.unknown_character_skipped += 1;
                    }
                    Err(PipelineError::InsufficientPool { needed, available }) => {
                        tracing::debug!(
                            "Skipping example: pool has {} distinct entries, {} needed",
                            available,
                            needed,
                        );
                        report.insufficient_pool_skipped += 1;
                    }
                    // Everything else is fatal to the run
                    Err(e) => return Err(e.into()),
                }
            }

            report.fold_sizes[fold] = records.len();
            report.records_written += records.len();
            writer.write_fold(fold, &records)?;
        }

        // ── Step 6: Save config + run report ──────────────────────────────────
        self.save_config(Path::new(&cfg.out_dir))?;
        report.save(Path::new(&cfg.out_dir))?;
        report.log();

        Ok(report)
    }

    /// Persist the exact configuration of this run so it can be
    /// re-supplied verbatim for reproduction.
    fn save_config(&self, out_dir: &Path) -> Result<()> {
        let path = out_dir.join("config.json");
        fs::write(&path, serde_json::to_string_pretty(&self.config)?)
            .with_context(|| format!("cannot write config to '{}'", path.display()))?;
        Ok(())
    }
}
