// ============================================================
// Layer 3 — Dialogue Example and Training Record
// ============================================================
// The two record types that flow through the pipeline:
//
//   DialogueExample — one raw (context, true response) turn,
//                     owned by a character. Input side.
//   TrainingRecord  — the fully assembled, ranking-ready unit:
//                     persona + context + candidate list. Output side.
//
// Why does DialogueExample hold a character ID and not the
// character itself?
//   The ID is a lookup key into the attribute store. If the
//   example carried its own copy of the persona data, adjusting
//   a character's tags later would leave stale copies behind.
//   One owner for persona data, everyone else borrows by key.
//
// The candidate list encodes the label implicitly:
//   the true response sits at a seeded-random position inside
//   `candidates`, and that is the whole label. The consuming
//   ranking framework infers the correct position from context,
//   so there is deliberately no `label_index` field here.
//
// Reference: Rust Book §5 (Structs)

use serde::{Deserialize, Serialize};

/// One raw dialogue turn: what was said, and what the character
/// truly replied. Created by the corpus loader, immutable after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueExample {
    /// Lookup key into the attribute store (never a persona copy)
    pub character_id: String,

    /// The utterance(s) the character is responding to
    pub context: String,

    /// The character's actual reply — the positive label
    pub response: String,
}

impl DialogueExample {
    pub fn new(
        character_id: impl Into<String>,
        context:      impl Into<String>,
        response:     impl Into<String>,
    ) -> Self {
        Self {
            character_id: character_id.into(),
            context:      context.into(),
            response:     response.into(),
        }
    }
}

/// One fully assembled output unit, ready for serialization.
/// Constructed once by the assembler, never mutated again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRecord {
    /// Sampled persona lines, in original curator order
    pub persona: Vec<String>,

    /// The dialogue context for this turn
    pub context: String,

    /// All candidate responses. Exactly one of them is the true
    /// response; the rest are distractors drawn from the pool.
    pub candidates: Vec<String>,

    /// Which fold this record belongs to, in [0, k)
    pub fold: usize,
}

impl TrainingRecord {
    /// How often `response` appears among the candidates.
    /// Used by tests to assert the exactly-once invariant.
    pub fn occurrences_of(&self, response: &str) -> usize {
        self.candidates.iter().filter(|c| c.as_str() == response).count()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_occurrences_counts_exact_matches_only() {
        let rec = TrainingRecord {
            persona:    vec!["jerkass".into()],
            context:    "knock knock".into(),
            candidates: vec!["who is there".into(), "go away".into(), "who".into()],
            fold:       0,
        };
        assert_eq!(rec.occurrences_of("who is there"), 1);
        assert_eq!(rec.occurrences_of("who"), 1);
        assert_eq!(rec.occurrences_of("hello"), 0);
    }
}
