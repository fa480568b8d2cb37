// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Drives one training run of the reconstruction model through
// the shared lifecycle:
//
//   Step 1: Save options + model config   (Layer 6 - infra)
//   Step 2: Build the model and setup()   (Layer 5 - ml)
//   Step 3: Restore step counters         (resumed runs only)
//   Step 4: Generate and split samples    (Layer 4 - data)
//   Step 5: Epoch loop
//             optimize each batch, log losses,
//             save checkpoints, update learning rates
//   Step 6: eval() + test() on the validation set
//
// Epochs run from `epoch_count` to `niter + niter_decay`, so a
// resumed run continues where the previous one stopped.
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::data::{
    batcher::RowBatcher,
    splitter::split_train_val,
    synthetic::SyntheticRows,
};
use crate::domain::options::ModelOptions;
use crate::infra::{
    checkpoint::{CheckpointStore, OtherStates},
    metrics::LossLogger,
};
use crate::ml::{
    backend::TrainBackend,
    base_model::TrainableModel,
    reconstruction::{ReconstructionConfig, ReconstructionModel},
};

const STATE_EPOCH: &str = "epoch";
const STATE_TOTAL_STEPS: &str = "total_steps";

// ─── Training Configuration ──────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub options:         ModelOptions,
    pub input_dim:       usize,
    pub hidden_dim:      usize,
    pub latent_dim:      usize,
    pub num_samples:     usize,
    pub batch_size:      usize,
    pub save_epoch_freq: usize,
    pub seed:            u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            options:         ModelOptions { is_train: true, ..ModelOptions::default() },
            input_dim:       16,
            hidden_dim:      32,
            latent_dim:      4,
            num_samples:     512,
            batch_size:      32,
            save_epoch_freq: 5,
            seed:            42,
        }
    }
}

impl TrainConfig {
    pub fn model_config(&self) -> ReconstructionConfig {
        ReconstructionConfig::new(self.input_dim, self.hidden_dim, self.latent_dim)
    }
}

/// What a finished run reports back to the caller.
#[derive(Debug, Clone)]
pub struct TrainSummary {
    pub epochs_run:  usize,
    pub total_steps: usize,
    pub train_loss:  Option<f64>,
    pub val_loss:    f64,
    pub save_dir:    PathBuf,
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    pub fn new(mut config: TrainConfig) -> Self {
        config.options.is_train = true;
        Self { config }
    }

    pub fn execute(&self) -> Result<TrainSummary> {
        let cfg     = &self.config;
        let options = &cfg.options;
        if cfg.batch_size == 0 || cfg.save_epoch_freq == 0 {
            bail!("batch_size and save_epoch_freq must be at least 1");
        }

        // ── Step 1: Run configuration ─────────────────────────────────────────
        let store = CheckpointStore::new(options.save_dir());
        store.save_options(options)?;
        store.save_model_config(&cfg.model_config())?;
        tracing::info!("Saving checkpoints to '{}'", store.dir().display());

        // ── Step 2: Model ─────────────────────────────────────────────────────
        let mut model: ReconstructionModel<TrainBackend> =
            ReconstructionModel::new(options, &cfg.model_config());
        model.setup()?;

        // ── Step 3: Resume counters ───────────────────────────────────────────
        let mut total_steps = 0;
        if options.resume_dir.is_some() {
            if let Some(states) = model.load_states(&options.resume_epoch)? {
                total_steps = states
                    .get(STATE_TOTAL_STEPS)
                    .and_then(|value| value.as_u64())
                    .unwrap_or(0) as usize;
                tracing::info!("Resuming after {} steps", total_steps);
            }
        }
        model.set_current_step(Some(total_steps));

        // ── Step 4: Data ──────────────────────────────────────────────────────
        let rows = SyntheticRows::new(cfg.input_dim, cfg.latent_dim, cfg.seed)?
            .generate(cfg.num_samples);
        let (train_rows, val_rows) = split_train_val(rows, 0.8, cfg.seed);
        if train_rows.is_empty() || val_rows.is_empty() {
            bail!("num_samples = {} is too small for a train/validation split", cfg.num_samples);
        }
        let batcher = RowBatcher::<TrainBackend>::new(model.base().device().clone());

        // ── Step 5: Epoch loop ────────────────────────────────────────────────
        let logger     = LossLogger::new(store.dir(), model.base().registry().loss_names())?;
        let last_epoch = options.niter + options.niter_decay;
        let mut epochs_run = 0;
        let mut train_loss = None;

        for epoch in options.epoch_count..=last_epoch {
            model.train();
            for chunk in train_rows.chunks(cfg.batch_size) {
                model.set_input(batcher.batch(chunk)?);
                model.optimize_parameters()?;
                total_steps += 1;
                model.set_current_step(Some(total_steps));
            }

            let losses = model.get_current_losses();
            logger.log(epoch, total_steps, &losses)?;
            train_loss = losses.first().map(|(_, value)| *value);
            let report: Vec<String> = losses
                .iter()
                .map(|(name, value)| format!("{name}={value:.4}"))
                .collect();
            println!("Epoch {:>3}/{} | {}", epoch, last_epoch, report.join(" | "));

            let mut states = OtherStates::new();
            states.insert(STATE_EPOCH.to_string(), epoch.into());
            states.insert(STATE_TOTAL_STEPS.to_string(), total_steps.into());

            if epoch % cfg.save_epoch_freq == 0 {
                tracing::info!("saving the model at the end of epoch {}", epoch);
                model.save_networks(epoch, &states);
                model.save_subnetworks(epoch);
            }
            model.save_networks("latest", &states);
            model.save_subnetworks("latest");

            model.update_learning_rate(options.verbose);
            epochs_run += 1;
        }

        // ── Step 6: Validation ────────────────────────────────────────────────
        model.eval();
        model.set_input(batcher.batch(&val_rows)?);
        model.test()?;
        let val_loss = model
            .get_current_losses()
            .first()
            .map(|(_, value)| *value)
            .context("model reports no losses")?;
        println!("Validation | recon={val_loss:.4}");

        tracing::info!("Training complete!");
        Ok(TrainSummary {
            epochs_run,
            total_steps,
            train_loss,
            val_loss,
            save_dir: store.dir().to_path_buf(),
        })
    }
}
