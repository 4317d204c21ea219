// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// This layer orchestrates the data layer to accomplish a
// specific goal (generating fold files, or inspecting the
// corpus).
//
// Rules for this layer:
//   - No CSV parsing or sampling math here
//   - No argument parsing or printing here (that's Layer 1)
//   - Only workflow coordination
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The fold-generation workflow (the pipeline driver)
pub mod generate_use_case;

// The corpus statistics / character note workflow
pub mod inspect_use_case;
