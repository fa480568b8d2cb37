// ============================================================
// Layer 2 — InspectUseCase
// ============================================================
// Rebuilds a trained model for inference and reports on it:
//
//   Step 1: Read the saved model config   (Layer 6 - infra)
//   Step 2: Build the model in eval mode  (Layer 5 - ml)
//   Step 3: setup() loads `resume_epoch`  (Layer 5 - ml)
//   Step 4: Collect the network summary and saved states
//
// Reference: Burn Book §5 (Records and Checkpointing)

use anyhow::Result;

use crate::domain::options::ModelOptions;
use crate::infra::checkpoint::{CheckpointStore, OtherStates};
use crate::ml::{
    backend::TrainBackend,
    base_model::TrainableModel,
    reconstruction::{ReconstructionConfig, ReconstructionModel},
};

/// The result of inspecting one checkpoint.
#[derive(Debug, Clone)]
pub struct InspectReport {
    pub model_name: &'static str,
    pub summary:    String,
    pub states:     Option<OtherStates>,
}

pub struct InspectUseCase {
    options: ModelOptions,
}

impl InspectUseCase {
    pub fn new(mut options: ModelOptions) -> Self {
        options.is_train = false;
        Self { options }
    }

    pub fn execute(&self) -> Result<InspectReport> {
        // ── Step 1: Model config ──────────────────────────────────────────────
        let source = self.options.resume_dir.clone().unwrap_or_else(|| self.options.save_dir());
        let config: ReconstructionConfig = CheckpointStore::new(&source).load_model_config()?;
        tracing::info!("Inspecting '{}' at epoch {}", source.display(), self.options.resume_epoch);

        // ── Step 2 + 3: Build and load ────────────────────────────────────────
        let mut model: ReconstructionModel<TrainBackend> = ReconstructionModel::new(&self.options, &config);
        model.eval();
        model.setup()?;

        // ── Step 4: Report ────────────────────────────────────────────────────
        Ok(InspectReport {
            model_name: model.name(),
            summary:    model.network_summary(true),
            states:     model.load_states(&self.options.resume_epoch)?,
        })
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::train_use_case::{TrainConfig, TrainUseCase};

    fn train(dir: &std::path::Path) -> ModelOptions {
        let options = ModelOptions {
            checkpoints_dir: dir.to_path_buf(),
            name:            "inspected".to_string(),
            niter:           1,
            niter_decay:     0,
            ..ModelOptions::default()
        };
        let cfg = TrainConfig { options: options.clone(), num_samples: 20, batch_size: 4, ..TrainConfig::default() };
        TrainUseCase::new(cfg).execute().unwrap();
        options
    }

    #[test]
    fn test_inspect_trained_run() {
        let tmp    = tempfile::tempdir().unwrap();
        let report = InspectUseCase::new(train(tmp.path())).execute().unwrap();

        assert_eq!(report.model_name, "ReconstructionModel");
        assert!(report.summary.contains("[Network encoder]"));
        assert!(report.summary.contains("[Network decoder]"));
        let states = report.states.unwrap();
        assert_eq!(states.get("epoch").and_then(|v| v.as_u64()), Some(1));
    }

    #[test]
    fn test_inspect_without_training_fails() {
        let tmp     = tempfile::tempdir().unwrap();
        let options = ModelOptions { checkpoints_dir: tmp.path().to_path_buf(), ..ModelOptions::default() };
        let err     = InspectUseCase::new(options).execute().unwrap_err();
        assert!(format!("{err:#}").contains("model_config.json"));
    }
}
