// ============================================================
// Layer 3 — Character Domain Type
// ============================================================
// Represents one fictional character together with its curated
// Human-Level Attribute (HLA) tags.
//
// What is an HLA tag?
//   A short descriptive phrase — "jerkass", "the stoic",
//   "brilliant but lazy" — that summarises a personality trait
//   WITHOUT quoting any of the character's actual dialogue.
//   A sampled subset of these tags becomes the persona shown
//   to the ranking model as conditioning context.
//
// Tag ordering matters:
//   Tags keep the order the curators recorded them in, because
//   a persona description reads most naturally in that order.
//   We therefore store a Vec, not a HashSet, and de-duplicate
//   on insert instead.
//
// Reference: Rust Book §5 (Structs and Methods)
//            Rust Book §8 (Vectors and Strings)

use serde::{Deserialize, Serialize};

/// A single Human-Level Attribute tag.
///
/// The label is the short trait phrase; some curated entries
/// carry an optional explanatory clause (e.g. "jerkass —
/// abrasive to everyone regardless of rank").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HlaTag {
    /// The short trait phrase itself
    pub label: String,

    /// Optional longer clause explaining the trait
    pub clause: Option<String>,
}

impl HlaTag {
    /// Create a tag with no explanatory clause
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), clause: None }
    }

    /// Create a tag with an explanatory clause
    pub fn with_clause(label: impl Into<String>, clause: impl Into<String>) -> Self {
        Self {
            label:  label.into(),
            clause: Some(clause.into()),
        }
    }

    /// Render the tag as a single persona line.
    /// The clause, when present, follows the label after a colon.
    pub fn render(&self) -> String {
        match &self.clause {
            Some(c) => format!("{}: {}", self.label, c),
            None    => self.label.clone(),
        }
    }
}

/// One fictional character as loaded from the raw corpus.
/// Immutable after load time — the pipeline only reads from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    /// Corpus-wide character identifier (e.g. "l4390")
    pub id: String,

    /// Human-readable character name (e.g. "Sheldon")
    pub name: String,

    /// The show / work the character appears in
    pub work: String,

    /// Ordered, de-duplicated HLA tags.
    /// Order is curator order; uniqueness is per character only —
    /// two characters may well share "jerkass".
    tags: Vec<HlaTag>,
}

impl Character {
    /// Create a character with an empty tag set
    pub fn new(id: impl Into<String>, name: impl Into<String>, work: impl Into<String>) -> Self {
        Self {
            id:   id.into(),
            name: name.into(),
            work: work.into(),
            tags: Vec::new(),
        }
    }

    /// Add a tag, preserving insertion order and skipping
    /// duplicates by label. Returns true if the tag was new.
    ///
    /// Duplicates are common in the raw corpus: the same trait
    /// can be recorded on a character's page more than once.
    pub fn add_tag(&mut self, tag: HlaTag) -> bool {
        if self.tags.iter().any(|t| t.label == tag.label) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// The character's full ordered tag list
    pub fn tags(&self) -> &[HlaTag] {
        &self.tags
    }

    /// Keep only the tags the predicate accepts, preserving the
    /// order of the survivors. Used by the corpus-wide cleaning
    /// pass that strips globally rare tags.
    pub fn retain_tags<F>(&mut self, f: F)
    where
        F: FnMut(&HlaTag) -> bool,
    {
        self.tags.retain(f);
    }

    /// Number of distinct tags this character carries
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// A human-readable note identifying the character,
    /// e.g. "[TheBigBangTheory] Sheldon (l4390)"
    pub fn note(&self) -> String {
        format!("[{}] {} ({})", self.work, self.name, self.id)
    }
}
