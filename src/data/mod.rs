// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Feeds the training loop with row vectors:
//
//   SyntheticRows  → seeded low-rank samples
//       │
//       ▼
//   split_train_val → shuffled train / validation sets
//       │
//       ▼
//   RowBatcher     → [batch, dim] tensors on the model device
//
// Reference: Burn Book §4 (Datasets and Batcher)
//            Rust Book §13 (Iterators and Closures)

/// Seeded synthetic samples
pub mod synthetic;

/// Shuffles and splits data into train/validation sets
pub mod splitter;

/// Stacks samples into tensor batches
pub mod batcher;
