// ============================================================
// Layer 4 — Candidate Pool
// ============================================================
// The shared, order-irrelevant collection of every true
// response across all characters. Distractor candidates for
// ranking examples are drawn from here.
//
// Duplicates are kept on purpose:
//   two characters saying "I don't know" are two legitimate
//   entries, and the original frequency distribution is part
//   of the sampling behaviour. Distinctness is only enforced
//   on the OUTPUT of a draw — a candidate list must never
//   contain the same string twice.
//
// Sampling strategy:
//   Rejection sampling over the flat pool: draw a random index,
//   keep the value if it is not the excluded true response and
//   not already drawn. With pool size ≫ requested count (the
//   documented invariant) this almost never rejects. A bounded
//   attempt cap guards the degenerate near-exhausted case, after
//   which we fall back to walking a shuffled permutation of the
//   whole pool. Both paths consume only the seeded RNG, so both
//   are reproducible.
//
// Reference: rand crate documentation (Rng::gen_range,
//            SliceRandom::shuffle)

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

use crate::domain::errors::{PipelineError, PipelineResult};
use crate::domain::example::DialogueExample;

/// Flat pool of response strings shared by all characters.
/// Read-only after build.
pub struct CandidatePool {
    /// Every true response, duplicates included, in load order
    entries: Vec<String>,

    /// Distinct response values, for feasibility checks
    distinct: HashSet<String>,
}

impl CandidatePool {
    /// Aggregate every true response across all examples,
    /// exactly once per example.
    pub fn build(examples: &[DialogueExample]) -> Self {
        let entries: Vec<String> = examples.iter().map(|ex| ex.response.clone()).collect();
        let distinct: HashSet<String> = entries.iter().cloned().collect();

        tracing::info!(
            "Candidate pool built: {} entries, {} distinct",
            entries.len(),
            distinct.len(),
        );
        Self { entries, distinct }
    }

    /// Total entries, duplicates included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct response values
    pub fn distinct_len(&self) -> usize {
        self.distinct.len()
    }

    /// Draw `count` DISTINCT distractors, never equal to the
    /// example's own true response (compared by value).
    ///
    /// Fails with InsufficientPool when the pool minus the
    /// exclusion has fewer than `count` distinct values left.
    pub fn sample_distractors(
        &self,
        exclude_response: &str,
        count:            usize,
        rng:              &mut StdRng,
    ) -> PipelineResult<Vec<String>> {
        // Feasibility check up front, so the sampling loops below
        // are guaranteed to terminate with a full draw.
        let mut available = self.distinct.len();
        if self.distinct.contains(exclude_response) {
            available -= 1;
        }
        if available < count {
            return Err(PipelineError::InsufficientPool { needed: count, available });
        }

        let mut drawn = Vec::with_capacity(count);
        let mut seen: HashSet<&str> = HashSet::with_capacity(count);

        // Fast path: rejection sampling. The cap is generous —
        // with pool ≫ count the expected rejection rate is tiny.
        let max_attempts = 32 * count + 100;
        let mut attempts = 0;
        while drawn.len() < count && attempts < max_attempts {
            attempts += 1;
            let candidate = &self.entries[rng.gen_range(0..self.entries.len())];
            if candidate == exclude_response || seen.contains(candidate.as_str()) {
                continue;
            }
            seen.insert(candidate.as_str());
            drawn.push(candidate.clone());
        }

        // Slow path: the pool is barely bigger than the request.
        // Walk a full shuffled permutation; feasibility was
        // already proven, so this always completes.
        if drawn.len() < count {
            let mut order: Vec<usize> = (0..self.entries.len()).collect();
            order.shuffle(rng);
            for i in order {
                if drawn.len() == count {
                    break;
                }
                let candidate = &self.entries[i];
                if candidate == exclude_response || seen.contains(candidate.as_str()) {
                    continue;
                }
                seen.insert(candidate.as_str());
                drawn.push(candidate.clone());
            }
        }

        Ok(drawn)
    }
}
