// ============================================================
// Layer 3 — Checkpoint File Naming
// ============================================================
// File naming convention inside <checkpoints_dir>/<name>/:
//
//   {epoch}_net_{name}.pth      ← one per registered network
//   {epoch}_subnet_{name}.pth   ← one per subnetwork
//   {epoch}_states.pth          ← side-channel training state
//
// `epoch` is an identifier, e.g. "5" or "latest".

use std::fmt;

pub const CHECKPOINT_EXTENSION: &str = "pth";

/// Which kind of object a checkpoint file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointKind<'a> {
    Network(&'a str),
    Subnetwork(&'a str),
    States,
}

impl fmt::Display for CheckpointKind<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(name)    => write!(f, "network `{name}`"),
            Self::Subnetwork(name) => write!(f, "subnetwork `{name}`"),
            Self::States           => f.write_str("states"),
        }
    }
}

/// File name of a checkpoint, without its directory.
pub fn checkpoint_file_name(epoch: impl fmt::Display, kind: CheckpointKind<'_>) -> String {
    match kind {
        CheckpointKind::Network(name)    => format!("{epoch}_net_{name}.{CHECKPOINT_EXTENSION}"),
        CheckpointKind::Subnetwork(name) => format!("{epoch}_subnet_{name}.{CHECKPOINT_EXTENSION}"),
        CheckpointKind::States           => format!("{epoch}_states.{CHECKPOINT_EXTENSION}"),
    }
}
