// ============================================================
// Layer 3 — Model Options
// ============================================================
// Everything a model needs to know about the run it belongs to:
// where checkpoints live, what to resume from, which subnetworks
// to preload or freeze, and how the learning rate evolves.
//
// The struct is both a clap argument group (flattened into the
// CLI subcommands) and a serde type (saved as options.json next
// to the checkpoints of a run).
//
// List flags take comma-separated values:
//   --freeze-subnetworks encoder,decoder
//
// Reference: Rust Book §5 (Structs)
//            clap derive documentation

use clap::{Args, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the learning rate changes from one epoch to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LrPolicy {
    /// Constant for `niter` epochs, then linear decay to zero over `niter_decay` epochs
    #[default]
    Linear,
    /// Multiply by 0.1 every `lr_decay_iters` epochs
    Step,
    /// Cosine annealing from the initial rate to zero over `niter` epochs
    Cosine,
}

#[derive(Args, Debug, Clone, Serialize, Deserialize)]
pub struct ModelOptions {
    /// GPU ids requested for the run. Recorded only: models always run on the CPU
    #[arg(long, value_delimiter = ',')]
    #[serde(default)]
    pub gpu_ids: Vec<usize>,

    /// Set by the subcommand: `train` turns it on, `inspect` leaves it off
    #[arg(skip)]
    #[serde(default)]
    pub is_train: bool,

    /// Root directory for all experiments
    #[arg(long, default_value = "checkpoints")]
    pub checkpoints_dir: PathBuf,

    /// Experiment name; checkpoints go to <checkpoints_dir>/<name>
    #[arg(long, default_value = "experiment")]
    pub name: String,

    /// Directory holding the checkpoints to resume from
    #[arg(long)]
    pub resume_dir: Option<PathBuf>,

    /// Epoch identifier of the checkpoints to resume from
    #[arg(long, default_value = "latest")]
    pub resume_epoch: String,

    /// Directory holding pretrained subnetwork checkpoints
    #[arg(long)]
    pub load_subnetworks_dir: Option<PathBuf>,

    /// Subnetworks to load from --load-subnetworks-dir
    #[arg(long, value_delimiter = ',')]
    #[serde(default)]
    pub load_subnetworks: Vec<String>,

    /// Epoch identifier of the pretrained subnetwork checkpoints
    #[arg(long, default_value = "latest")]
    pub load_subnetworks_epoch: String,

    /// Subnetworks whose parameters stop tracking gradients
    #[arg(long, value_delimiter = ',')]
    #[serde(default)]
    pub freeze_subnetworks: Vec<String>,

    /// Print the full structure of every network, not just parameter counts
    #[arg(long)]
    #[serde(default)]
    pub verbose: bool,

    /// Initial learning rate of every optimizer
    #[arg(long, default_value_t = 2e-4)]
    pub lr: f64,

    /// Learning-rate policy
    #[arg(long, value_enum, default_value_t = LrPolicy::Linear)]
    #[serde(default)]
    pub lr_policy: LrPolicy,

    /// Epoch the run starts counting from (shifts the linear policy)
    #[arg(long, default_value_t = 1)]
    pub epoch_count: usize,

    /// Epochs at the initial learning rate (linear), or the cosine period
    #[arg(long, default_value_t = 100)]
    pub niter: usize,

    /// Epochs of linear decay to zero
    #[arg(long, default_value_t = 100)]
    pub niter_decay: usize,

    /// Epochs between two decays of the step policy
    #[arg(long, default_value_t = 50)]
    pub lr_decay_iters: usize,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            gpu_ids:                Vec::new(),
            is_train:               false,
            checkpoints_dir:        PathBuf::from("checkpoints"),
            name:                   "experiment".to_string(),
            resume_dir:             None,
            resume_epoch:           "latest".to_string(),
            load_subnetworks_dir:   None,
            load_subnetworks:       Vec::new(),
            load_subnetworks_epoch: "latest".to_string(),
            freeze_subnetworks:     Vec::new(),
            verbose:                false,
            lr:                     2e-4,
            lr_policy:              LrPolicy::Linear,
            epoch_count:            1,
            niter:                  100,
            niter_decay:            100,
            lr_decay_iters:         50,
        }
    }
}

impl ModelOptions {
    /// Directory this run writes its checkpoints to: <checkpoints_dir>/<name>
    pub fn save_dir(&self) -> PathBuf {
        self.checkpoints_dir.join(&self.name)
    }

    /// Whether `setup` should load full network checkpoints
    pub fn should_resume(&self) -> bool {
        !self.is_train || self.resume_dir.is_some()
    }
}
