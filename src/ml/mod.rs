// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Everything that touches Burn modules, optimizers and
// schedulers lives here. The lifecycle itself is generic; the
// reconstruction model is one concrete model built on it.
//
//   backend.rs        — backend alias and the autotune flag
//   network.rs        — NetworkSlot: a Burn module behind the
//                       type-erased Network trait
//   scheduler.rs      — linear / step / cosine learning-rate
//                       schedules
//   base_model.rs     — ModelBase + the TrainableModel trait:
//                       setup, train / eval / test, freezing,
//                       checkpoints, summaries
//   reconstruction.rs — encoder / decoder model trained with MSE
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Backend alias and process-wide autotune flag
pub mod backend;

/// Burn module wrapper implementing `Network`
pub mod network;

/// Learning-rate schedules
pub mod scheduler;

/// Shared lifecycle of every trainable model
pub mod base_model;

/// Reference encoder / decoder model
pub mod reconstruction;
