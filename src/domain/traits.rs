// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// A model owns several networks of different concrete types.
// The lifecycle layer only needs a handful of operations on
// each of them, so it talks to a type-erased `Network` view:
//
//   - parameter count and a printable structure
//   - the train / eval mode flag
//   - per-parameter gradient tracking flags
//   - saving and loading weights
//
// Implementations:
//   - NetworkSlot<B, M> → wraps any Burn module (ml::network)
//
// Reference: Rust Book §10 (Traits), §17 (Trait Objects)

use anyhow::Result;
use std::path::Path;

// ─── Mode ─────────────────────────────────────────────────────────────────────
/// Whether a network is being trained or evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Train,
    Eval,
}

// ─── LoadMode ─────────────────────────────────────────────────────────────────
/// How closely a checkpoint has to match the network it is loaded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Checkpoint and network hold exactly the same tensors
    Strict,
    /// Tensors missing from the checkpoint keep their current values and
    /// tensors unknown to the network are ignored; shapes must still agree
    Partial,
}

// ─── LoadSummary ──────────────────────────────────────────────────────────────
/// What happened while loading one checkpoint file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Tensors copied into the network
    pub applied: usize,
    /// Network tensors the checkpoint did not provide
    pub missing: usize,
    /// Checkpoint tensors the network has no slot for
    pub unused:  usize,
}

impl LoadSummary {
    pub fn is_complete(&self) -> bool {
        self.missing == 0 && self.unused == 0
    }
}

// ─── Network ──────────────────────────────────────────────────────────────────
/// A trainable network as seen by the lifecycle layer.
pub trait Network {
    /// Total number of scalar parameters, including every sub-module
    fn num_params(&self) -> usize;

    /// Human readable module structure
    fn describe(&self) -> String;

    fn mode(&self) -> Mode;

    fn set_mode(&mut self, mode: Mode);

    /// Turn gradient tracking on or off for every parameter
    fn set_require_grad(&mut self, require_grad: bool);

    /// Gradient tracking flag of every float parameter, in visiting order
    fn grad_flags(&self) -> Vec<bool>;

    /// Re-apply flags captured by `grad_flags`
    fn restore_grad_flags(&mut self, flags: &[bool]);

    /// Write the weights to `path`, replacing any existing file
    fn save_weights(&self, path: &Path) -> Result<()>;

    /// Read weights from `path`. The network is left untouched on error.
    fn load_weights(&mut self, path: &Path, mode: LoadMode) -> Result<LoadSummary>;

    /// True when every parameter tracks gradients
    fn requires_grad(&self) -> bool {
        self.grad_flags().iter().all(|flag| *flag)
    }

    /// True when no parameter tracks gradients
    fn is_frozen(&self) -> bool {
        self.grad_flags().iter().all(|flag| !*flag)
    }
}
