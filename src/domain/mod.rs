// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Pure Rust structs and enums that define the core concepts
// of the dataset pipeline.
//
// Rules for this layer:
//   - NO file I/O or CSV parsing here
//   - NO random number generation here
//   - Only plain Rust structs, enums, and errors
//
// Why keep this layer pure?
//   - Easy to unit test (no fixture files needed)
//   - Easy to understand (no framework noise)
//   - The sampling layers can be swapped without touching
//     the definitions of what a character or a record IS
//
// Reference: Rust Book §5 (Structs), §6 (Enums)

// A character with its ordered HLA tag set
pub mod character;

// Dialogue examples and assembled training records
pub mod example;

// The typed error taxonomy for per-example and fatal failures
pub mod errors;
