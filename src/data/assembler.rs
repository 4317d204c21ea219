// ============================================================
// Layer 4 — Example Assembler
// ============================================================
// Turns one raw DialogueExample into one ranking-ready
// TrainingRecord:
//
//   1. sample a persona subset from the attribute store
//   2. draw num_candidates - 1 distractors from the pool
//   3. place the true response at a uniformly random index
//      within the candidate list
//
// The true response's position is the implicit label — there is
// no separate label field, matching the candidate-list input
// shape the consuming ranker expects.
//
// Failure behaviour: UnknownCharacter and InsufficientPool
// abort THIS example only. The driver counts the skip and moves
// on; one poorly-populated character must not block the rest of
// the dataset.
//
// Reference: Rust Book §9 (Error Handling)

use rand::rngs::StdRng;
use rand::Rng;

use crate::data::attribute_store::AttributeStore;
use crate::data::candidate_pool::CandidatePool;
use crate::domain::errors::PipelineResult;
use crate::domain::example::{DialogueExample, TrainingRecord};

/// Assemble one training record from one dialogue example.
///
/// # Panics
/// Panics if num_candidates is zero — a candidate list must at
/// least hold the true response.
pub fn assemble(
    example:        &DialogueExample,
    fold:           usize,
    store:          &AttributeStore,
    pool:           &CandidatePool,
    persona_size:   usize,
    num_candidates: usize,
    rng:            &mut StdRng,
) -> PipelineResult<TrainingRecord> {
    assert!(num_candidates > 0, "candidate list must hold at least the true response");

    // Persona first: a seeded subset of the character's tags,
    // rendered as persona lines in curator order
    let persona: Vec<String> = store
        .sample_subset(&example.character_id, persona_size, rng)?
        .iter()
        .map(|tag| tag.render())
        .collect();

    // Distractors: distinct, never the true response itself
    let distractors = pool.sample_distractors(&example.response, num_candidates - 1, rng)?;

    // Embed the true response at a uniformly random position
    let true_index = rng.gen_range(0..num_candidates);
    let mut candidates = Vec::with_capacity(num_candidates);
    candidates.extend(distractors.iter().take(true_index).cloned());
    candidates.push(example.response.clone());
    candidates.extend(distractors.iter().skip(true_index).cloned());

    Ok(TrainingRecord {
        persona,
        context: example.context.clone(),
        candidates,
        fold,
    })
}
