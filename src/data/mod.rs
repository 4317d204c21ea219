// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// This layer handles everything from raw CSV files all the
// way to serialized per-fold training files.
//
// The pipeline flows in this order:
//
//   dialogues.csv + attributes.csv
//       │
//       ▼
//   CorpusLoader      → parses rows, cleans, counts skips
//       │
//       ▼
//   AttributeStore    → character → ordered HLA tags
//       │
//       ▼
//   CandidatePool     → all true responses, distractor source
//       │
//       ▼
//   FoldPartitioner   → per-character balanced k-fold split
//       │
//       ▼
//   ExampleAssembler  → persona + candidates per example
//       │
//       ▼
//   FoldWriter        → one persona-chat format file per fold
//
// Each module is responsible for exactly one step.
// This makes each step independently testable and replaceable.
//
// Reference: Rust Book §13 (Iterators and Closures)

/// Parses and cleans the raw CSV corpus
pub mod loader;

/// In-memory index of character → ordered HLA tag set
pub mod attribute_store;

/// Shared pool of true responses used as distractors
pub mod candidate_pool;

/// Deterministic per-character balanced k-fold partitioning
pub mod partitioner;

/// Builds ranking-ready TrainingRecords from examples
pub mod assembler;

/// Serializes fold files in persona-chat line format
pub mod writer;
