// ============================================================
// Layer 5 — Backend Selection
// ============================================================
// Models always run on the CPU (NdArray), wrapped in Autodiff
// for training.
//
// `enable_autotune` is the one piece of process-wide state: it is
// switched on whenever a model is initialized and lets callers
// know kernels may be autotuned for fixed input shapes.

use std::sync::atomic::{AtomicBool, Ordering};

pub type TrainBackend = burn::backend::Autodiff<burn::backend::NdArray>;

static AUTOTUNE: AtomicBool = AtomicBool::new(false);

pub fn enable_autotune() {
    if !AUTOTUNE.swap(true, Ordering::Relaxed) {
        tracing::debug!("Autotune enabled");
    }
}

pub fn autotune_enabled() -> bool {
    AUTOTUNE.load(Ordering::Relaxed)
}
