// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs and traits describing a trainable model's
// lifecycle, independent of any tensor library:
//
//   options.rs  — run configuration (clap + serde)
//   registry.rs — the loss / network / visual name lists
//   traits.rs   — the type-erased Network view, Mode, LoadMode
//   naming.rs   — checkpoint file naming
//
// Rules for this layer:
//   - NO Burn framework types allowed here
//   - NO file I/O
//
// Reference: Rust Book §5 (Structs), §10 (Traits)

/// Options shared by every model of a run
pub mod options;

/// Ordered name lists backing losses, networks and visuals
pub mod registry;

/// Core abstractions (traits) that the ML layer implements
pub mod traits;

/// Checkpoint file names
pub mod naming;
