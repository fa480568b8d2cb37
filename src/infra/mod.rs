// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Cross-cutting concerns used by the ML and application layers:
//
//   checkpoint.rs — checkpoint directory: network weights,
//                   side-channel states, run options and the
//                   model config needed to rebuild a model
//
//   metrics.rs    — loss log: appends the current losses to a
//                   CSV file after each logged step
//
// Reference: Rust Book §7 (Modules)
//            Rust Book §9 (Error Handling with anyhow)

/// Checkpoint files of one run
pub mod checkpoint;

/// Loss CSV logger
pub mod metrics;
