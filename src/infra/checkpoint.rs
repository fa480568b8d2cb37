// ============================================================
// Layer 6 — Checkpoint Store
// ============================================================
// Reads and writes the files of one checkpoint directory.
//
// What gets saved:
//   1. Network weights ({epoch}_net_{name}.pth, Burnpack data)
//   2. Subnetwork weights ({epoch}_subnet_{name}.pth)
//   3. Side-channel states ({epoch}_states.pth, JSON object)
//   4. options.json / model_config.json — enough to rebuild the
//      model before loading its weights
//
// A checkpoint that does not exist is not an error: loads log a
// warning and report `None` so callers can skip it.
//
// Why is the states file JSON?
//   Its contents are whatever the training loop wants back on
//   resume (epoch, step counters). A free-form JSON object keeps
//   the store independent of the loop and stays readable by hand.
//
// Reference: Burn Book §5 (Records and Checkpointing)
//            Rust Book §9 (Error Handling)

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fmt::Display,
    fs,
    path::{Path, PathBuf},
};

use crate::domain::naming::{checkpoint_file_name, CheckpointKind};
use crate::domain::options::ModelOptions;
use crate::domain::traits::{LoadMode, LoadSummary, Network};

/// Free-form training state saved next to the network weights.
pub type OtherStates = serde_json::Map<String, serde_json::Value>;

pub const OPTIONS_FILE: &str = "options.json";
pub const MODEL_CONFIG_FILE: &str = "model_config.json";

/// One checkpoint directory.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// The directory is created on the first save, not here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a checkpoint file in this directory
    pub fn path_for(&self, epoch: impl Display, kind: CheckpointKind<'_>) -> PathBuf {
        self.dir.join(checkpoint_file_name(epoch, kind))
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Cannot create checkpoint directory '{}'", self.dir.display()))
    }

    // ─── Weights ──────────────────────────────────────────────────────────────

    /// Save one network's weights and return the written path.
    pub fn save_network(
        &self,
        net:   &dyn Network,
        epoch: impl Display,
        kind:  CheckpointKind<'_>,
    ) -> Result<PathBuf> {
        self.ensure_dir()?;
        let path = self.path_for(epoch, kind);
        net.save_weights(&path)
            .with_context(|| format!("Failed to save {kind} to '{}'", path.display()))?;
        tracing::debug!("Saved {} to '{}'", kind, path.display());
        Ok(path)
    }

    /// Load one network's weights.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    pub fn load_network(
        &self,
        net:   &mut dyn Network,
        epoch: impl Display,
        kind:  CheckpointKind<'_>,
        mode:  LoadMode,
    ) -> Result<Option<LoadSummary>> {
        let path = self.path_for(epoch, kind);
        if !path.is_file() {
            tracing::warn!("cannot load {}", path.display());
            return Ok(None);
        }

        let summary = net
            .load_weights(&path, mode)
            .with_context(|| format!("Failed to load {kind} from '{}'", path.display()))?;

        tracing::debug!(
            "Loaded {} from '{}': {} applied, {} missing, {} unused",
            kind,
            path.display(),
            summary.applied,
            summary.missing,
            summary.unused,
        );
        Ok(Some(summary))
    }

    // ─── Side-channel states ──────────────────────────────────────────────────

    pub fn save_states(&self, epoch: impl Display, states: &OtherStates) -> Result<PathBuf> {
        let path = self.path_for(epoch, CheckpointKind::States);
        self.write_json(&path, states)?;
        Ok(path)
    }

    /// Returns `Ok(None)` when no states were saved for `epoch`.
    pub fn load_states(&self, epoch: impl Display) -> Result<Option<OtherStates>> {
        let path = self.path_for(epoch, CheckpointKind::States);
        if !path.is_file() {
            tracing::warn!("cannot load {}", path.display());
            return Ok(None);
        }
        self.read_json(&path).map(Some)
    }

    // ─── Run configuration ────────────────────────────────────────────────────

    pub fn save_options(&self, options: &ModelOptions) -> Result<PathBuf> {
        let path = self.dir.join(OPTIONS_FILE);
        self.write_json(&path, options)?;
        Ok(path)
    }

    pub fn load_options(&self) -> Result<ModelOptions> {
        self.read_json(&self.dir.join(OPTIONS_FILE))
    }

    /// Save the architecture config so the model can be rebuilt for inference.
    pub fn save_model_config<C: Serialize>(&self, config: &C) -> Result<PathBuf> {
        let path = self.dir.join(MODEL_CONFIG_FILE);
        self.write_json(&path, config)?;
        Ok(path)
    }

    pub fn load_model_config<C: DeserializeOwned>(&self) -> Result<C> {
        self.read_json(&self.dir.join(MODEL_CONFIG_FILE)).with_context(|| {
            format!(
                "Cannot rebuild the model: no {MODEL_CONFIG_FILE} in '{}'. \
                 Has this run been trained?",
                self.dir.display()
            )
        })
    }

    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json).with_context(|| format!("Cannot write '{}'", path.display()))?;
        tracing::debug!("Wrote '{}'", path.display());
        Ok(())
    }

    fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Cannot read '{}'", path.display()))?;
        serde_json::from_str(&json).with_context(|| format!("Malformed JSON in '{}'", path.display()))
    }
}
