// ============================================================
// Layer 4 — Corpus Loader
// ============================================================
// Loads the two raw CSV files that make up the corpus:
//
//   dialogues.csv   show_id,char_name,char_id,dia1,dia2
//                   (dia1 = context utterance, dia2 = the
//                    character's true response)
//   attributes.csv  feature,char_id,work,char_name
//                   (one HLA tag per row)
//
// Parsing uses the csv crate with serde-derived row structs.
// Dialogue text routinely contains commas and quotes, so the
// naive split-on-comma approach is not an option here.
//
// Skip discipline:
//   - A row the csv reader cannot deserialize, or a row with an
//     empty character id, is a malformed record: skipped, counted.
//   - A dialogue row with an empty response is skipped under its
//     own counter — an empty string is not a usable true label
//     and must never appear as one.
//   Neither case aborts the load. Only unreadable files and
//   checksum mismatches are fatal.
//
// Cleaning filters (applied after parse, each one logged as a
// reduction report):
//   - drop named character ids outright (force removal)
//   - drop characters with fewer dialogues than a threshold
//   - drop characters with fewer tags than a threshold
//
// Reference: Rust Book §9 (Error Handling)
//            csv crate documentation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::character::{Character, HlaTag};
use crate::domain::example::DialogueExample;
use crate::infra::integrity;

/// File name of the dialogue turns CSV inside the data directory
pub const DIALOGUES_FILE: &str = "dialogues.csv";

/// File name of the HLA attributes CSV inside the data directory
pub const ATTRIBUTES_FILE: &str = "attributes.csv";

/// One raw row of dialogues.csv, exactly as it appears on disk
#[derive(Debug, Deserialize)]
struct DialogueRow {
    #[allow(dead_code)]
    show_id:   String,
    char_name: String,
    char_id:   String,
    dia1:      String,
    dia2:      String,
}

/// One raw row of attributes.csv
#[derive(Debug, Deserialize)]
struct AttributeRow {
    feature:   String,
    char_id:   String,
    work:      String,
    char_name: String,
}

/// Cleaning and verification knobs for a load.
/// All thresholds default to "no filtering".
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Characters with fewer dialogue examples than this are dropped
    pub min_dialogues: usize,

    /// Characters with fewer HLA tags than this are dropped
    pub min_tags: usize,

    /// Character ids removed outright, whatever their counts
    pub drop_characters: Vec<String>,

    /// Expected example count after cleaning; a mismatch aborts
    /// the load (reproduction guard against silently drifted data)
    pub expected_examples: Option<usize>,

    /// (file name, expected SHA-256 hex) pairs verified before parsing
    pub checksums: Vec<(String, String)>,
}

/// Counters accumulated during a load, reported not raised.
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    /// Dialogue rows read from disk (before any skipping)
    pub dialogue_rows: usize,

    /// Rows skipped because they could not be parsed or were
    /// missing a character id
    pub malformed: usize,

    /// Dialogue rows skipped for an empty response field
    pub empty_response: usize,

    /// Attribute rows read from disk
    pub attribute_rows: usize,

    /// Attribute rows that repeated an existing (character, tag) pair
    pub duplicate_tags: usize,

    /// Characters removed by the cleaning filters
    pub characters_dropped: usize,

    /// Tag labels stripped for appearing on too few characters
    pub rare_tags_removed: usize,

    /// Dialogue examples removed along with their characters
    pub examples_dropped: usize,
}

/// Everything the rest of the pipeline needs, fully in memory.
#[derive(Debug)]
pub struct RawCorpus {
    /// Character id → character, in stable id order
    pub characters: BTreeMap<String, Character>,

    /// All surviving dialogue examples, in file order
    pub examples: Vec<DialogueExample>,

    /// What was read and what was skipped
    pub stats: LoadStats,
}

/// Loads and cleans the raw corpus from a data directory.
pub struct CorpusLoader {
    data_dir: PathBuf,
    options:  LoadOptions,
}

impl CorpusLoader {
    pub fn new(data_dir: impl Into<PathBuf>, options: LoadOptions) -> Self {
        Self { data_dir: data_dir.into(), options }
    }

    /// Load both CSV files, apply the cleaning filters, and
    /// return the in-memory corpus. Fatal only on I/O or
    /// checksum problems; bad rows are skipped and counted.
    pub fn load(&self) -> Result<RawCorpus> {
        // ── Step 0: verify checksums before touching any parser ───────────────
        for (file, expected) in &self.options.checksums {
            let path = self.data_dir.join(file);
            integrity::verify_sha256(&path, expected)
                .with_context(|| format!("integrity check failed for '{}'", path.display()))?;
        }

        let mut stats = LoadStats::default();

        // ── Step 1: attributes → characters with ordered tag sets ─────────────
        let mut characters = self.load_attributes(&mut stats)?;

        // ── Step 2: dialogues → examples ──────────────────────────────────────
        let mut examples = self.load_dialogues(&mut stats)?;

        tracing::info!(
            "Loaded {} characters, {} examples ({} malformed, {} empty responses skipped)",
            characters.len(),
            examples.len(),
            stats.malformed,
            stats.empty_response,
        );

        // ── Step 3: cleaning filters, each with a reduction report ────────────
        self.apply_filters(&mut characters, &mut examples, &mut stats);

        // ── Step 4: reproduce check ───────────────────────────────────────────
        // When an expected count is supplied, a mismatch means the
        // input data or the cleaning parameters drifted — abort
        // rather than generate folds that cannot be compared.
        if let Some(expected) = self.options.expected_examples {
            anyhow::ensure!(
                examples.len() == expected,
                "reproduce check failed: expected {} examples after cleaning, got {}",
                expected,
                examples.len(),
            );
            tracing::info!("Passed reproduce check: {} examples after cleaning", expected);
        }

        Ok(RawCorpus { characters, examples, stats })
    }

    fn load_attributes(&self, stats: &mut LoadStats) -> Result<BTreeMap<String, Character>> {
        let path = self.data_dir.join(ATTRIBUTES_FILE);
        let mut reader = open_csv(&path)?;

        let mut characters: BTreeMap<String, Character> = BTreeMap::new();

        for (idx, row) in reader.deserialize::<AttributeRow>().enumerate() {
            let row = match row {
                Ok(r) => r,
                Err(e) => {
                    // Header is line 1, so data row idx 0 is line 2
                    tracing::debug!("Malformed attribute row at line {}: {}", idx + 2, e);
                    stats.malformed += 1;
                    continue;
                }
            };
            stats.attribute_rows += 1;

            if row.char_id.trim().is_empty() || row.feature.trim().is_empty() {
                skip_malformed(idx + 2, "missing char_id or feature", stats);
                continue;
            }

            let character = characters.entry(row.char_id.clone()).or_insert_with(|| {
                Character::new(row.char_id.clone(), row.char_name.clone(), row.work.clone())
            });

            // The raw corpus records some tags more than once per page.
            // Character::add_tag keeps the first occurrence only.
            if !character.add_tag(HlaTag::new(normalize(&row.feature))) {
                stats.duplicate_tags += 1;
            }
        }

        tracing::info!(
            "Attribute load: {} rows, {} characters, {} duplicate tags collapsed",
            stats.attribute_rows,
            characters.len(),
            stats.duplicate_tags,
        );
        Ok(characters)
    }

    fn load_dialogues(&self, stats: &mut LoadStats) -> Result<Vec<DialogueExample>> {
        let path = self.data_dir.join(DIALOGUES_FILE);
        let mut reader = open_csv(&path)?;

        let mut examples = Vec::new();

        for (idx, row) in reader.deserialize::<DialogueRow>().enumerate() {
            let row = match row {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!("Malformed dialogue row at line {}: {}", idx + 2, e);
                    stats.malformed += 1;
                    continue;
                }
            };
            stats.dialogue_rows += 1;

            // Missing character id → the example can never be
            // joined to a persona. Malformed, skip.
            if row.char_id.trim().is_empty() {
                skip_malformed(idx + 2, "missing char_id", stats);
                continue;
            }

            // Empty responses are not useful training signal and
            // must never silently become a true label.
            let response = normalize(&row.dia2);
            if response.is_empty() {
                stats.empty_response += 1;
                continue;
            }

            // Characters come from the attribute file only. A
            // character that speaks but has no curated attributes
            // stays out of the store; its examples surface as
            // UnknownCharacter skips at assembly time.
            examples.push(DialogueExample::new(
                row.char_id,
                normalize(&row.dia1),
                response,
            ));
        }

        Ok(examples)
    }

    fn apply_filters(
        &self,
        characters: &mut BTreeMap<String, Character>,
        examples:   &mut Vec<DialogueExample>,
        stats:      &mut LoadStats,
    ) {
        use std::collections::BTreeSet;

        // Ids removed by any filter; their examples go with them
        let mut dropped: BTreeSet<String> = BTreeSet::new();

        // Force removals first, whatever the counts say
        for id in &self.options.drop_characters {
            if characters.remove(id).is_some() {
                tracing::warn!("Force removal of character {}", id);
            }
            dropped.insert(id.clone());
        }

        // High pass on dialogue count per character
        if self.options.min_dialogues > 0 {
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for ex in examples.iter() {
                *counts.entry(ex.character_id.as_str()).or_default() += 1;
            }
            let excluded: Vec<String> = counts
                .iter()
                .filter(|(_, &n)| n < self.options.min_dialogues)
                .map(|(id, _)| id.to_string())
                .collect();
            if !excluded.is_empty() {
                tracing::info!(
                    "High pass: excluded {} characters with fewer than {} dialogues",
                    excluded.len(),
                    self.options.min_dialogues,
                );
            }
            for id in excluded {
                characters.remove(&id);
                dropped.insert(id);
            }
        }

        // Cross-referenced high pass on the character↔tag map,
        // both directions: first strip tags held by fewer than
        // min_tags characters, then drop characters left with
        // fewer than min_tags tags. A rare tag can therefore pull
        // its sole holders below the threshold — intended: such
        // pairs carry no reusable persona signal either way.
        if self.options.min_tags > 0 {
            let mut holders: BTreeMap<String, usize> = BTreeMap::new();
            for c in characters.values() {
                for tag in c.tags() {
                    *holders.entry(tag.label.clone()).or_default() += 1;
                }
            }
            let rare: std::collections::BTreeSet<&str> = holders
                .iter()
                .filter(|(_, &n)| n < self.options.min_tags)
                .map(|(label, _)| label.as_str())
                .collect();
            if !rare.is_empty() {
                for c in characters.values_mut() {
                    c.retain_tags(|t| !rare.contains(t.label.as_str()));
                }
                tracing::info!(
                    "High pass: stripped {} tags held by fewer than {} characters",
                    rare.len(),
                    self.options.min_tags,
                );
                stats.rare_tags_removed = rare.len();
            }

            let excluded: Vec<String> = characters
                .values()
                .filter(|c| c.tag_count() < self.options.min_tags)
                .map(|c| c.id.clone())
                .collect();
            if !excluded.is_empty() {
                tracing::info!(
                    "High pass: excluded {} characters with fewer than {} tags",
                    excluded.len(),
                    self.options.min_tags,
                );
            }
            for id in excluded {
                characters.remove(&id);
                dropped.insert(id);
            }
        }

        stats.characters_dropped = dropped.len();

        // Drop examples of filtered characters. Examples whose
        // character merely lacks attribute rows stay — they are
        // per-example UnknownCharacter skips later, not load drops.
        let before = examples.len();
        examples.retain(|ex| !dropped.contains(&ex.character_id));
        stats.examples_dropped = before - examples.len();
        report_reduction(before, examples.len(), "character filtering");
    }
}

/// Open a CSV reader over a file, with header row expected.
fn open_csv(path: &Path) -> Result<csv::Reader<std::fs::File>> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_path(path)
        .with_context(|| format!("cannot open '{}'", path.display()))
}

/// Normalize free text for the line-oriented output format:
/// tabs and newlines become spaces, the candidate delimiter '|'
/// becomes '/', runs of spaces collapse, edges are trimmed.
pub fn normalize(text: &str) -> String {
    let mut out        = String::with_capacity(text.len());
    let mut last_space = false;

    for c in text.chars() {
        let c = match c {
            '\t' | '\n' | '\r' => ' ',
            '|' => '/',
            c if c.is_control() => ' ',
            c => c,
        };
        if c == ' ' {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(c);
            last_space = false;
        }
    }

    out.trim().to_string()
}

/// Count and log one malformed row. The error is reported, never
/// raised — a bad row must not abort the load.
fn skip_malformed(line: usize, reason: &str, stats: &mut LoadStats) {
    let err = crate::domain::errors::PipelineError::MalformedRecord {
        line,
        reason: reason.to_string(),
    };
    tracing::debug!("Skipping row: {err}");
    stats.malformed += 1;
}

/// Log how a filter step changed the row count (or that it didn't).
fn report_reduction(old: usize, new: usize, message: &str) {
    if old != new {
        tracing::info!("Reduction report {}: {} -> {}", message, old, new);
    } else {
        tracing::info!("Reduction report {}: no change {}", message, old);
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    /// Write a small corpus into a temp dir and return it
    fn fixture(dialogues: &str, attributes: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(DIALOGUES_FILE), dialogues).unwrap();
        fs::write(dir.path().join(ATTRIBUTES_FILE), attributes).unwrap();
        dir
    }

    const ATTRS: &str = "\
feature,char_id,work,char_name
jerkass,l4390,TheBigBangTheory,Sheldon
the stoic,l4390,TheBigBangTheory,Sheldon
jerkass,l4390,TheBigBangTheory,Sheldon
nice girl,l0001,Friends,Monica
";

    #[test]
    fn test_basic_load() {
        let dialogues = "\
show_id,char_name,char_id,dia1,dia2
TheBigBangTheory,Sheldon,l4390,knock knock,That is not the protocol
TheBigBangTheory,Sheldon,l4390,\"hi, sheldon\",I sit there
Friends,Monica,l0001,hello,Welcome to my kitchen
";
        let dir    = fixture(dialogues, ATTRS);
        let corpus = CorpusLoader::new(dir.path(), LoadOptions::default())
            .load()
            .unwrap();

        assert_eq!(corpus.examples.len(), 3);
        assert_eq!(corpus.characters.len(), 2);
        // Quoted comma survives intact
        assert_eq!(corpus.examples[1].context, "hi, sheldon");
        // Duplicate "jerkass" row collapsed
        assert_eq!(corpus.characters["l4390"].tag_count(), 2);
        assert_eq!(corpus.stats.duplicate_tags, 1);
    }

    #[test]
    fn test_empty_response_skipped_and_counted() {
        let dialogues = "\
show_id,char_name,char_id,dia1,dia2
TheBigBangTheory,Sheldon,l4390,knock knock,
TheBigBangTheory,Sheldon,l4390,hello,Greetings
";
        let dir    = fixture(dialogues, ATTRS);
        let corpus = CorpusLoader::new(dir.path(), LoadOptions::default())
            .load()
            .unwrap();

        assert_eq!(corpus.examples.len(), 1);
        assert_eq!(corpus.stats.empty_response, 1);
    }

    #[test]
    fn test_missing_char_id_is_malformed() {
        let dialogues = "\
show_id,char_name,char_id,dia1,dia2
TheBigBangTheory,Sheldon,,knock knock,Who indeed
";
        let dir    = fixture(dialogues, ATTRS);
        let corpus = CorpusLoader::new(dir.path(), LoadOptions::default())
            .load()
            .unwrap();

        assert!(corpus.examples.is_empty());
        assert_eq!(corpus.stats.malformed, 1);
    }

    #[test]
    fn test_min_dialogues_high_pass() {
        let dialogues = "\
show_id,char_name,char_id,dia1,dia2
TheBigBangTheory,Sheldon,l4390,a,r1
TheBigBangTheory,Sheldon,l4390,b,r2
Friends,Monica,l0001,c,r3
";
        let dir     = fixture(dialogues, ATTRS);
        let options = LoadOptions { min_dialogues: 2, ..Default::default() };
        let corpus  = CorpusLoader::new(dir.path(), options).load().unwrap();

        // Monica has only 1 dialogue → dropped with her example
        assert!(!corpus.characters.contains_key("l0001"));
        assert_eq!(corpus.examples.len(), 2);
        assert_eq!(corpus.stats.examples_dropped, 1);
    }

    #[test]
    fn test_min_tags_cross_reference_prunes_both_directions() {
        // Tag holders: "brave" on l1+l2, "loyal" on l1+l2,
        // "quirky" only on l1, "grumpy" only on l3.
        let attributes = "\
feature,char_id,work,char_name
brave,l1,ShowA,Alpha
loyal,l1,ShowA,Alpha
quirky,l1,ShowA,Alpha
brave,l2,ShowB,Beta
loyal,l2,ShowB,Beta
grumpy,l3,ShowC,Gamma
";
        let dialogues = "\
show_id,char_name,char_id,dia1,dia2
ShowA,Alpha,l1,a,r1
ShowB,Beta,l2,b,r2
ShowC,Gamma,l3,c,r3
";
        let dir     = fixture(dialogues, attributes);
        let options = LoadOptions { min_tags: 2, ..Default::default() };
        let corpus  = CorpusLoader::new(dir.path(), options).load().unwrap();

        // Rare tags stripped from every survivor's list
        assert_eq!(corpus.stats.rare_tags_removed, 2);
        let alpha_tags: Vec<&str> = corpus.characters["l1"]
            .tags()
            .iter()
            .map(|t| t.label.as_str())
            .collect();
        assert_eq!(alpha_tags, vec!["brave", "loyal"]);

        // Gamma's only tag was rare → tagless → dropped, with
        // the dialogue example going too
        assert!(!corpus.characters.contains_key("l3"));
        assert_eq!(corpus.examples.len(), 2);
        assert!(corpus.characters.contains_key("l2"));
    }

    #[test]
    fn test_reproduce_check() {
        let dialogues = "\
show_id,char_name,char_id,dia1,dia2
TheBigBangTheory,Sheldon,l4390,a,r1
TheBigBangTheory,Sheldon,l4390,b,r2
";
        // Matching expectation passes
        let dir     = fixture(dialogues, ATTRS);
        let options = LoadOptions { expected_examples: Some(2), ..Default::default() };
        assert!(CorpusLoader::new(dir.path(), options).load().is_ok());

        // Any other expectation is fatal
        let options = LoadOptions { expected_examples: Some(3), ..Default::default() };
        let err = CorpusLoader::new(dir.path(), options).load().unwrap_err();
        assert!(err.to_string().contains("reproduce check failed"));
    }

    #[test]
    fn test_force_removal() {
        let dialogues = "\
show_id,char_name,char_id,dia1,dia2
TheBigBangTheory,Sheldon,l4390,a,r1
Friends,Monica,l0001,c,r3
";
        let dir     = fixture(dialogues, ATTRS);
        let options = LoadOptions {
            drop_characters: vec!["l4390".to_string()],
            ..Default::default()
        };
        let corpus = CorpusLoader::new(dir.path(), options).load().unwrap();

        assert!(!corpus.characters.contains_key("l4390"));
        assert_eq!(corpus.examples.len(), 1);
    }

    #[test]
    fn test_dialogue_only_character_examples_survive_load() {
        let dialogues = "\
show_id,char_name,char_id,dia1,dia2
Nowhere,Ghost,l9999,ghost context,ghost reply
";
        let dir    = fixture(dialogues, ATTRS);
        let corpus = CorpusLoader::new(dir.path(), LoadOptions::default())
            .load()
            .unwrap();

        // No attribute rows for l9999 → no store entry, but the
        // example is kept for a per-example skip downstream
        assert!(!corpus.characters.contains_key("l9999"));
        assert_eq!(corpus.examples.len(), 1);
    }

    #[test]
    fn test_missing_file_is_fatal() {
        let dir    = TempDir::new().unwrap();
        let result = CorpusLoader::new(dir.path(), LoadOptions::default()).load();
        assert!(result.is_err());
    }

    #[test]
    fn test_normalize_flattens_structure_characters() {
        assert_eq!(normalize("a\tb\nc"), "a b c");
        assert_eq!(normalize("pick me | not him"), "pick me / not him");
        assert_eq!(normalize("  spaced   out  "), "spaced out");
    }
}
