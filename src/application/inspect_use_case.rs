// ============================================================
// Layer 2 — InspectUseCase
// ============================================================
// Answers "what is actually in this corpus?" without running a
// full generation: overall counts, the busiest characters, and
// on request the full tag list of one character.
//
// The rendered report is returned as a string; the CLI layer
// decides how to present it. No fold files are touched.

use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::data::attribute_store::AttributeStore;
use crate::data::candidate_pool::CandidatePool;
use crate::data::loader::{CorpusLoader, LoadOptions};

/// Parameters for a corpus inspection.
#[derive(Debug, Clone)]
pub struct InspectConfig {
    pub data_dir: String,

    /// When set, also print this character's note and tags
    pub character: Option<String>,

    /// How many of the busiest characters to list
    pub top: usize,
}

pub struct InspectUseCase {
    config: InspectConfig,
}

impl InspectUseCase {
    pub fn new(config: InspectConfig) -> Self {
        Self { config }
    }

    /// Load the corpus and render a human-readable report.
    pub fn execute(&self) -> Result<String> {
        let corpus = CorpusLoader::new(&self.config.data_dir, LoadOptions::default()).load()?;

        // Example counts per character, before building the store
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for ex in &corpus.examples {
            *counts.entry(ex.character_id.as_str()).or_default() += 1;
        }

        let pool  = CandidatePool::build(&corpus.examples);
        let store = AttributeStore::new(corpus.characters);

        // Tag volume across the whole store
        let total_tags: usize = store.characters().map(|c| c.tag_count()).sum();

        let mut out = String::new();
        writeln!(out, "Corpus report for '{}'", self.config.data_dir)?;
        writeln!(out, "  characters with attributes: {}", store.len())?;
        writeln!(out, "  hla tags:                   {} total", total_tags)?;
        writeln!(out, "  dialogue examples:          {}", corpus.examples.len())?;
        writeln!(out, "  candidate pool:             {} entries, {} distinct",
            pool.len(),
            pool.distinct_len(),
        )?;
        writeln!(out, "  skipped at load:            {} malformed, {} empty responses",
            corpus.stats.malformed,
            corpus.stats.empty_response,
        )?;

        // Busiest characters first
        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));

        writeln!(out, "\nTop {} characters by dialogue count:", self.config.top)?;
        for (id, count) in ranked.iter().take(self.config.top) {
            writeln!(out, "  {:>6} dialogues  {}", count, store.char_note(id))?;
        }

        if let Some(id) = &self.config.character {
            writeln!(out, "\nCharacter {}", store.char_note(id))?;
            match store.get_tags(id) {
                Ok(tags) => {
                    writeln!(out, "  {} tags:", tags.len())?;
                    for tag in tags {
                        writeln!(out, "    - {}", tag.render())?;
                    }
                }
                Err(_) => {
                    writeln!(out, "  no attributes on record")?;
                }
            }
        }

        Ok(out)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::{ATTRIBUTES_FILE, DIALOGUES_FILE};
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(ATTRIBUTES_FILE),
            "feature,char_id,work,char_name\n\
             jerkass,l4390,TheBigBangTheory,Sheldon\n\
             the stoic,l4390,TheBigBangTheory,Sheldon\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(DIALOGUES_FILE),
            "show_id,char_name,char_id,dia1,dia2\n\
             TheBigBangTheory,Sheldon,l4390,knock knock,That is not the protocol\n\
             TheBigBangTheory,Sheldon,l4390,hello,Greetings\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_report_contains_counts_and_notes() {
        let dir = fixture();
        let report = InspectUseCase::new(InspectConfig {
            data_dir:  dir.path().display().to_string(),
            character: None,
            top:       10,
        })
        .execute()
        .unwrap();

        assert!(report.contains("characters with attributes: 1"));
        assert!(report.contains("hla tags:                   2 total"));
        assert!(report.contains("dialogue examples:          2"));
        assert!(report.contains("[TheBigBangTheory] Sheldon (l4390)"));
    }

    #[test]
    fn test_character_detail_lists_tags_in_order() {
        let dir = fixture();
        let report = InspectUseCase::new(InspectConfig {
            data_dir:  dir.path().display().to_string(),
            character: Some("l4390".to_string()),
            top:       5,
        })
        .execute()
        .unwrap();

        let jerkass = report.find("- jerkass").unwrap();
        let stoic   = report.find("- the stoic").unwrap();
        assert!(jerkass < stoic);
    }

    #[test]
    fn test_unknown_character_gets_fallback_note() {
        let dir = fixture();
        let report = InspectUseCase::new(InspectConfig {
            data_dir:  dir.path().display().to_string(),
            character: Some("l0000".to_string()),
            top:       5,
        })
        .execute()
        .unwrap();

        assert!(report.contains("Minor character (not enough attributes)"));
        assert!(report.contains("no attributes on record"));
    }
}
