// ============================================================
// Layer 6 — Infrastructure
// ============================================================
// Cross-cutting support with no dataset semantics of its own:
// input-file integrity checks and the end-of-run report.
//
// Reference: Rust Book §7 (Module System)

// SHA-256 checksum verification for raw input files
pub mod integrity;

// Aggregate run counters, logged and saved as JSON
pub mod report;
