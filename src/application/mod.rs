// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflows that drive a model through its lifecycle. They
// coordinate the data, ml and infra layers but hold no model
// code of their own.
//
// Reference: Clean Architecture pattern
//            Rust Book §7 (Module System)

// The training workflow
pub mod train_use_case;

// Rebuild a trained model and summarise it
pub mod inspect_use_case;
