// ============================================================
// Layer 4 — Attribute Store
// ============================================================
// In-memory index of character id → ordered HLA tag set.
// Read-only after construction; the assembler samples persona
// subsets from it for every example.
//
// Subset sampling preserves curator order:
//   we draw `count` distinct POSITIONS, sort them, and map back
//   to tags. "jerkass" before "secretly kind" reads as intended;
//   the reverse order tells a different story. The draw itself
//   is deterministic given the seeded RNG threaded in by the
//   caller.
//
// Reference: rand crate documentation (rand::seq::index)

use rand::rngs::StdRng;
use std::collections::BTreeMap;

use crate::domain::character::{Character, HlaTag};
use crate::domain::errors::{PipelineError, PipelineResult};

/// Read-only character → tags index.
pub struct AttributeStore {
    characters: BTreeMap<String, Character>,
}

impl AttributeStore {
    /// Build the store from loaded characters.
    /// Characters are immutable from here on.
    pub fn new(characters: BTreeMap<String, Character>) -> Self {
        Self { characters }
    }

    /// Number of characters in the store
    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Look up a character, failing with UnknownCharacter if it
    /// was never loaded.
    pub fn get(&self, character_id: &str) -> PipelineResult<&Character> {
        self.characters
            .get(character_id)
            .ok_or_else(|| PipelineError::UnknownCharacter(character_id.to_string()))
    }

    /// The full ordered tag list for a character.
    pub fn get_tags(&self, character_id: &str) -> PipelineResult<&[HlaTag]> {
        Ok(self.get(character_id)?.tags())
    }

    /// Draw a size-bounded subset of a character's tags.
    ///
    /// - `count` is clamped to the character's total tag count,
    ///   so asking for more than exists is not an error.
    /// - The result preserves the original relative order.
    /// - Same seed, same corpus → same subset.
    pub fn sample_subset(
        &self,
        character_id: &str,
        count:        usize,
        rng:          &mut StdRng,
    ) -> PipelineResult<Vec<HlaTag>> {
        let tags  = self.get_tags(character_id)?;
        let count = count.min(tags.len());

        // Sample distinct positions, then restore curator order
        let mut picked: Vec<usize> = rand::seq::index::sample(rng, tags.len(), count).into_vec();
        picked.sort_unstable();

        Ok(picked.into_iter().map(|i| tags[i].clone()).collect())
    }

    /// A human-readable note for a character id, with a fallback
    /// for ids that never made it into the store.
    pub fn char_note(&self, character_id: &str) -> String {
        match self.characters.get(character_id) {
            Some(c) => c.note(),
            None    => "Minor character (not enough attributes)".to_string(),
        }
    }

    /// Iterate characters in stable id order
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }
}
