// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the two subcommands, `train` and `inspect`. Both
// flatten the shared model options, so every lifecycle flag
// (--name, --resume-dir, --freeze-subnetworks, --lr-policy ...)
// is available on either.
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};

use model_lifecycle::application::train_use_case::TrainConfig;
use model_lifecycle::domain::options::ModelOptions;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the reconstruction model on synthetic data
    Train(TrainArgs),

    /// Load a saved checkpoint and print its networks
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct TrainArgs {
    #[command(flatten)]
    pub options: ModelOptions,

    /// Width of each input row
    #[arg(long, default_value_t = 16)]
    pub input_dim: usize,

    /// Hidden width of the encoder and decoder
    #[arg(long, default_value_t = 32)]
    pub hidden_dim: usize,

    /// Size of the latent code
    #[arg(long, default_value_t = 4)]
    pub latent_dim: usize,

    /// Number of synthetic rows to generate (80% train, 20% validation)
    #[arg(long, default_value_t = 512)]
    pub num_samples: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    /// Save numbered checkpoints every N epochs ("latest" is saved every epoch)
    #[arg(long, default_value_t = 5)]
    pub save_epoch_freq: usize,

    /// Seed for data generation and the train/validation split
    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            options:         ModelOptions { is_train: true, ..a.options },
            input_dim:       a.input_dim,
            hidden_dim:      a.hidden_dim,
            latent_dim:      a.latent_dim,
            num_samples:     a.num_samples,
            batch_size:      a.batch_size,
            save_epoch_freq: a.save_epoch_freq,
            seed:            a.seed,
        }
    }
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub options: ModelOptions,
}
