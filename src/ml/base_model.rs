// ============================================================
// Layer 5 — Model Base and Lifecycle
// ============================================================
// Every concrete model embeds a `ModelBase` and implements the
// `TrainableModel` trait. The trait's required methods are the
// model-specific parts (forward pass, name → object accessors);
// its provided methods are the lifecycle shared by all models:
//
//   setup                       schedulers, pretrained subnetworks,
//                               freezing, resuming, summary
//   train / eval / test         mode flags, no-grad forward pass
//   get_networks / get_current_losses / get_current_visuals
//   freeze_subnetworks / unfreeze_subnetworks
//   save_subnetworks / load_subnetworks      strict
//   save_networks / load_networks / load_states  non-strict
//   print_networks, update_learning_rate, set_current_step
//
// Registry names the model cannot resolve are bugs in the model
// and panic. Save failures are logged and swallowed; a missing
// checkpoint file is logged and skipped.
//
// Why swallow save failures?
//   Saving happens at the end of every epoch. A full disk or a
//   bad path should cost one checkpoint, not the whole run; the
//   returned paths tell the caller what actually reached disk.
//
// Reference: Burn Book §5 (Training)

use anyhow::{bail, Result};
use burn::tensor::{backend::Backend, TensorData};
use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use crate::domain::naming::CheckpointKind;
use crate::domain::options::ModelOptions;
use crate::domain::registry::ModelRegistry;
use crate::domain::traits::{LoadMode, Mode, Network};
use crate::infra::checkpoint::{CheckpointStore, OtherStates};
use crate::ml::backend::enable_autotune;
use crate::ml::scheduler::{LearningRate, Scheduler};

const SUMMARY_RULE: &str = "------------------------------------------------";

// ─── OptimizerSlot ────────────────────────────────────────────────────────────
/// A named optimizer as seen by the lifecycle layer.
///
/// Burn optimizers take the learning rate on every step, so the
/// rate lives here and the model reads it when stepping.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerSlot {
    pub name:       String,
    pub initial_lr: LearningRate,
    pub lr:         LearningRate,
}

// ─── ModelBase ────────────────────────────────────────────────────────────────
/// State shared by every model: options, device, save directory,
/// registry, optimizers and their schedulers.
#[derive(Debug)]
pub struct ModelBase<B: Backend> {
    options:      ModelOptions,
    device:       B::Device,
    save_dir:     PathBuf,
    registry:     ModelRegistry,
    optimizers:   Vec<OptimizerSlot>,
    schedulers:   Vec<Scheduler>,
    current_step: Option<usize>,
}

impl<B: Backend> ModelBase<B> {
    /// Initialize from the run options. Models always run on the
    /// backend's default (CPU) device; requested GPU ids are ignored.
    pub fn new(options: &ModelOptions) -> Self {
        if !options.gpu_ids.is_empty() {
            tracing::warn!("GPU ids {:?} requested; running on the CPU", options.gpu_ids);
        }
        enable_autotune();

        Self {
            options:      options.clone(),
            device:       B::Device::default(),
            save_dir:     options.save_dir(),
            registry:     ModelRegistry::new(),
            optimizers:   Vec::new(),
            schedulers:   Vec::new(),
            current_step: None,
        }
    }

    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    pub fn device(&self) -> &B::Device {
        &self.device
    }

    pub fn is_train(&self) -> bool {
        self.options.is_train
    }

    pub fn save_dir(&self) -> &Path {
        &self.save_dir
    }

    /// Where checkpoints are resumed from: `resume_dir`, or this run's own directory.
    pub fn resume_dir(&self) -> &Path {
        self.options.resume_dir.as_deref().unwrap_or(&self.save_dir)
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Called once by the concrete model while it is being built.
    pub fn set_registry(&mut self, registry: ModelRegistry) {
        self.registry = registry;
    }

    pub fn register_optimizer(&mut self, name: impl Into<String>, lr: LearningRate) {
        self.optimizers.push(OptimizerSlot { name: name.into(), initial_lr: lr, lr });
    }

    pub fn optimizers(&self) -> &[OptimizerSlot] {
        &self.optimizers
    }

    pub fn schedulers(&self) -> &[Scheduler] {
        &self.schedulers
    }

    /// Current learning rate of the named optimizer
    pub fn learning_rate(&self, optimizer: &str) -> Option<LearningRate> {
        self.optimizers.iter().find(|slot| slot.name == optimizer).map(|slot| slot.lr)
    }

    /// One scheduler per registered optimizer; each optimizer takes
    /// its scheduler's epoch-0 rate.
    pub fn build_schedulers(&mut self) -> Result<()> {
        self.schedulers = self
            .optimizers
            .iter()
            .map(|slot| Scheduler::new(&self.options, slot.initial_lr))
            .collect::<Result<_>>()?;

        for (slot, scheduler) in self.optimizers.iter_mut().zip(&self.schedulers) {
            slot.lr = scheduler.current_lr();
        }
        tracing::debug!(
            "Built {} {:?} scheduler(s)",
            self.schedulers.len(),
            self.options.lr_policy,
        );
        Ok(())
    }

    /// Step every scheduler once, then report the rate of every optimizer.
    pub fn update_learning_rate(&mut self, verbose: bool) -> Vec<LearningRate> {
        for (slot, scheduler) in self.optimizers.iter_mut().zip(self.schedulers.iter_mut()) {
            slot.lr = scheduler.step();
        }

        self.optimizers
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                if verbose {
                    println!("optimizer {}, learning rate = {:.7}", i + 1, slot.lr);
                }
                slot.lr
            })
            .collect()
    }

    pub fn set_current_step(&mut self, step: Option<usize>) {
        self.current_step = step;
    }

    pub fn current_step(&self) -> Option<usize> {
        self.current_step
    }
}

// ─── TrainableModel ───────────────────────────────────────────────────────────
pub trait TrainableModel<B: Backend> {
    /// One batch of model input
    type Input;

    fn base(&self) -> &ModelBase<B>;

    fn base_mut(&mut self) -> &mut ModelBase<B>;

    fn set_input(&mut self, input: Self::Input);

    /// Run the forward pass on the last input, updating losses and visuals.
    fn forward(&mut self) -> Result<()>;

    /// Network registered under `name`
    fn network(&self, name: &str) -> Option<&dyn Network>;

    fn network_mut(&mut self, name: &str) -> Option<&mut dyn Network>;

    /// Names of the independently freezable / loadable parts of the model
    fn subnetwork_names(&self) -> Vec<String>;

    fn subnetwork(&self, name: &str) -> Option<&dyn Network>;

    fn subnetwork_mut(&mut self, name: &str) -> Option<&mut dyn Network>;

    /// Latest value of the loss registered under `name`
    fn current_loss(&self, name: &str) -> Option<f64>;

    /// Latest value of the visual registered under `name`
    fn current_visual(&self, name: &str) -> Option<TensorData>;

    // ─── Provided lifecycle ───────────────────────────────────────────────────

    /// Type name of the concrete model, without path or generics.
    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        let without_generics = full.split('<').next().unwrap_or(full);
        without_generics.rsplit("::").next().unwrap_or(without_generics)
    }

    /// Prepare the model for a run, in order:
    ///   1. schedulers (training only)
    ///   2. pretrained subnetworks from `load_subnetworks_dir`
    ///   3. freezing of `freeze_subnetworks`
    ///   4. full networks from `resume_dir` (inference, or resumed training)
    ///   5. network summary
    fn setup(&mut self) -> Result<()> {
        let options = self.base().options().clone();

        if options.is_train {
            self.base_mut().build_schedulers()?;
        }

        if let Some(dir) = &options.load_subnetworks_dir {
            self.load_subnetworks(
                &options.load_subnetworks_epoch,
                Some(options.load_subnetworks.as_slice()),
                Some(dir.as_path()),
            )?;
            tracing::info!("loading pretrained {:?}", options.load_subnetworks);
        }

        if !options.freeze_subnetworks.is_empty() {
            self.freeze_subnetworks(&options.freeze_subnetworks)?;
            tracing::info!("freezing {:?}", options.freeze_subnetworks);
        }

        if options.should_resume() {
            self.load_networks(&options.resume_epoch)?;
        }

        self.print_networks(options.verbose);
        Ok(())
    }

    fn eval(&mut self) {
        set_mode::<B, Self>(self, Mode::Eval);
    }

    fn train(&mut self) {
        set_mode::<B, Self>(self, Mode::Train);
    }

    /// Forward pass with gradient tracking disabled on every registered
    /// network. Per-parameter flags are restored afterwards.
    fn test(&mut self) -> Result<()> {
        let names = self.base().registry().model_names().to_vec();
        let saved: Vec<Vec<bool>> = names
            .iter()
            .map(|name| resolve_network::<B, Self>(self, name).grad_flags())
            .collect();

        for name in &names {
            resolve_network_mut::<B, Self>(self, name).set_require_grad(false);
        }
        let outcome = self.forward();
        for (name, flags) in names.iter().zip(&saved) {
            resolve_network_mut::<B, Self>(self, name).restore_grad_flags(flags);
        }
        outcome
    }

    /// Registered networks, in registry order.
    fn get_networks(&self) -> Vec<&dyn Network> {
        self.base()
            .registry()
            .model_names()
            .iter()
            .map(|name| resolve_network::<B, Self>(self, name))
            .collect()
    }

    fn get_current_visuals(&self) -> Vec<(String, TensorData)> {
        self.base()
            .registry()
            .visual_names()
            .iter()
            .map(|name| {
                let visual = self.current_visual(name).unwrap_or_else(|| {
                    panic!("{} registers visual `{name}` but does not provide it", self.name())
                });
                (name.clone(), visual)
            })
            .collect()
    }

    fn get_current_losses(&self) -> Vec<(String, f64)> {
        self.base()
            .registry()
            .loss_names()
            .iter()
            .map(|name| {
                let loss = self.current_loss(name).unwrap_or_else(|| {
                    panic!("{} registers loss `{name}` but does not provide it", self.name())
                });
                (name.clone(), loss)
            })
            .collect()
    }

    fn freeze_subnetworks(&mut self, names: &[String]) -> Result<()> {
        toggle_subnetworks::<B, Self>(self, names, false)
    }

    fn unfreeze_subnetworks(&mut self, names: &[String]) -> Result<()> {
        toggle_subnetworks::<B, Self>(self, names, true)
    }

    /// Save every subnetwork. Returns the files actually written.
    fn save_subnetworks(&self, epoch: impl Display) -> Vec<PathBuf> {
        let epoch = epoch.to_string();
        let store = CheckpointStore::new(self.base().save_dir());
        let mut written = Vec::new();

        for name in self.subnetwork_names() {
            let net = self.subnetwork(&name).unwrap_or_else(|| {
                panic!("{} lists subnetwork `{name}` but does not provide it", self.name())
            });
            match store.save_network(net, &epoch, CheckpointKind::Subnetwork(&name)) {
                Ok(path) => written.push(path),
                Err(err) => tracing::error!("{err:#}"),
            }
        }
        written
    }

    /// Strictly load subnetworks saved by `save_subnetworks`.
    ///
    /// `names = None` loads every subnetwork; `dir = None` reads from the
    /// resume directory. Missing files are skipped. Returns how many
    /// subnetworks were loaded.
    fn load_subnetworks(
        &mut self,
        epoch: impl Display,
        names: Option<&[String]>,
        dir:   Option<&Path>,
    ) -> Result<usize> {
        let epoch = epoch.to_string();
        let store = CheckpointStore::new(dir.unwrap_or_else(|| self.base().resume_dir()));
        let mut loaded = 0;

        for name in self.subnetwork_names() {
            if let Some(names) = names {
                if !names.contains(&name) {
                    continue;
                }
            }
            let model_name = self.name();
            let net = self.subnetwork_mut(&name).unwrap_or_else(|| {
                panic!("{model_name} lists subnetwork `{name}` but does not provide it")
            });
            let summary =
                store.load_network(net, &epoch, CheckpointKind::Subnetwork(&name), LoadMode::Strict)?;
            if summary.is_some() {
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    /// Save every registered network plus the side-channel states.
    /// Returns the files actually written.
    fn save_networks(&self, epoch: impl Display, other_states: &OtherStates) -> Vec<PathBuf> {
        let epoch = epoch.to_string();
        let store = CheckpointStore::new(self.base().save_dir());
        let mut written = Vec::new();

        for name in self.base().registry().model_names() {
            let net = resolve_network::<B, Self>(self, name);
            match store.save_network(net, &epoch, CheckpointKind::Network(name)) {
                Ok(path) => written.push(path),
                Err(err) => tracing::error!("{err:#}"),
            }
        }

        match store.save_states(&epoch, other_states) {
            Ok(path) => written.push(path),
            Err(err) => tracing::error!("{err:#}"),
        }
        written
    }

    /// Non-strictly load every registered network from the resume
    /// directory. Missing files are skipped. Returns how many networks
    /// were loaded.
    fn load_networks(&mut self, epoch: impl Display) -> Result<usize> {
        let epoch = epoch.to_string();
        let store = CheckpointStore::new(self.base().resume_dir());
        let names = self.base().registry().model_names().to_vec();
        let mut loaded = 0;

        for name in &names {
            tracing::info!("loading {name}");
            let net = resolve_network_mut::<B, Self>(self, name);
            let summary =
                store.load_network(net, &epoch, CheckpointKind::Network(name), LoadMode::Partial)?;
            if summary.is_some() {
                loaded += 1;
            }
        }
        Ok(loaded)
    }

    /// Side-channel states saved with the networks of `epoch`, if any.
    fn load_states(&self, epoch: impl Display) -> Result<Option<OtherStates>> {
        CheckpointStore::new(self.base().resume_dir()).load_states(epoch)
    }

    /// Parameter count of every registered network, framed by rules;
    /// `verbose` adds each network's full structure.
    fn network_summary(&self, verbose: bool) -> String {
        let mut lines = vec!["------------------- Networks -------------------".to_string()];
        for (name, net) in self.base().registry().model_names().iter().zip(self.get_networks()) {
            if verbose {
                lines.push(net.describe());
            }
            lines.push(format!(
                "[Network {name}] Total number of parameters: {:.3}M",
                net.num_params() as f64 / 1e6
            ));
        }
        lines.push(SUMMARY_RULE.to_string());
        lines.join("\n")
    }

    fn print_networks(&self, verbose: bool) {
        println!("{}", self.network_summary(verbose));
    }

    /// Step every scheduler once and return the new rate of every optimizer.
    fn update_learning_rate(&mut self, verbose: bool) -> Vec<LearningRate> {
        self.base_mut().update_learning_rate(verbose)
    }

    fn set_current_step(&mut self, step: Option<usize>) {
        self.base_mut().set_current_step(step);
    }
}

// ─── Registry resolution ──────────────────────────────────────────────────────

fn resolve_network<'a, B, T>(model: &'a T, name: &str) -> &'a dyn Network
where
    B: Backend,
    T: TrainableModel<B> + ?Sized,
{
    model.network(name).unwrap_or_else(|| {
        panic!("{} registers network `{name}` but does not provide it", model.name())
    })
}

fn resolve_network_mut<'a, B, T>(model: &'a mut T, name: &str) -> &'a mut dyn Network
where
    B: Backend,
    T: TrainableModel<B> + ?Sized,
{
    let model_name = model.name();
    model.network_mut(name).unwrap_or_else(|| {
        panic!("{model_name} registers network `{name}` but does not provide it")
    })
}

fn set_mode<B, T>(model: &mut T, mode: Mode)
where
    B: Backend,
    T: TrainableModel<B> + ?Sized,
{
    let names = model.base().registry().model_names().to_vec();
    for name in &names {
        resolve_network_mut::<B, T>(model, name).set_mode(mode);
    }
}

fn toggle_subnetworks<B, T>(model: &mut T, names: &[String], require_grad: bool) -> Result<()>
where
    B: Backend,
    T: TrainableModel<B> + ?Sized,
{
    let available = model.subnetwork_names();
    if let Some(unknown) = names.iter().find(|name| !available.contains(name)) {
        bail!("{} has no subnetwork `{unknown}` (available: {available:?})", model.name());
    }
    for name in names {
        if let Some(net) = model.subnetwork_mut(name) {
            net.set_require_grad(require_grad);
        }
    }
    Ok(())
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::options::LrPolicy;
    use crate::ml::backend::autotune_enabled;
    use crate::ml::reconstruction::{ReconstructionConfig, ReconstructionModel};
    use burn::backend::{Autodiff, NdArray};
    use burn::tensor::{Distribution, Tensor};
    use std::fs;

    type TestBackend = Autodiff<NdArray>;
    type Model = ReconstructionModel<TestBackend>;

    fn options(checkpoints: &Path) -> ModelOptions {
        ModelOptions {
            is_train:        true,
            checkpoints_dir: checkpoints.to_path_buf(),
            name:            "run".to_string(),
            lr:              1e-2,
            ..ModelOptions::default()
        }
    }

    fn model(options: &ModelOptions) -> Model {
        ReconstructionModel::new(options, &ReconstructionConfig::new(6, 8, 3))
    }

    fn encoder_weights(m: &Model) -> Vec<f32> {
        m.encoder().input.weight.val().to_data().to_vec::<f32>().unwrap()
    }

    fn decoder_weights(m: &Model) -> Vec<f32> {
        m.decoder().output.weight.val().to_data().to_vec::<f32>().unwrap()
    }

    fn feed(m: &mut Model) {
        let x = Tensor::random([4, 6], Distribution::Default, m.base().device());
        m.set_input(x);
    }

    #[test]
    fn test_networks_follow_registry_order() {
        let tmp = tempfile::tempdir().unwrap();
        let m = model(&options(tmp.path()));
        assert_eq!(m.base().registry().model_names(), ["encoder", "decoder"]);
        assert_eq!(m.get_networks().len(), 2);
        assert_eq!(m.base().optimizers().len(), 2);
        assert!(autotune_enabled());
    }

    #[test]
    #[should_panic(expected = "registers visual `ghost`")]
    fn test_unknown_registered_visual_panics() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = model(&options(tmp.path()));
        m.base_mut().set_registry(
            ModelRegistry::new().with_networks(["encoder", "decoder"]).with_visuals(["real", "ghost"]),
        );
        feed(&mut m);
        m.forward().unwrap();
        m.get_current_visuals();
    }

    #[test]
    fn test_save_failure_is_swallowed() {
        let tmp  = tempfile::tempdir().unwrap();
        let file = tmp.path().join("not_a_dir");
        fs::write(&file, b"occupied").unwrap();

        // <file>/run cannot be created
        let m = model(&options(&file));
        assert!(m.save_networks(1, &OtherStates::new()).is_empty());
        assert!(m.save_subnetworks(1).is_empty());
        assert!(fs::metadata(&file).unwrap().is_file());
    }

    #[test]
    #[should_panic(expected = "registers network `ghost`")]
    fn test_unknown_registered_network_panics() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = model(&options(tmp.path()));
        m.base_mut().set_registry(ModelRegistry::new().with_networks(["encoder", "ghost"]));
        m.get_networks();
    }

    #[test]
    #[should_panic(expected = "registers loss `kl`")]
    fn test_unknown_registered_loss_panics() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = model(&options(tmp.path()));
        m.base_mut().set_registry(
            ModelRegistry::new().with_networks(["encoder", "decoder"]).with_losses(["recon", "kl"]),
        );
        feed(&mut m);
        m.forward().unwrap();
        m.get_current_losses();
    }

    #[test]
    fn test_eval_and_train_switch_every_network() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = model(&options(tmp.path()));
        m.eval();
        assert!(m.get_networks().iter().all(|net| net.mode() == Mode::Eval));
        m.train();
        assert!(m.get_networks().iter().all(|net| net.mode() == Mode::Train));
    }

    #[test]
    fn test_test_pass_restores_gradient_flags() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = model(&options(tmp.path()));
        m.freeze_subnetworks(&["encoder".to_string()]).unwrap();
        feed(&mut m);

        m.test().unwrap();
        assert_eq!(m.get_current_losses().len(), 1);
        assert!(m.network("encoder").unwrap().is_frozen());
        assert!(m.network("decoder").unwrap().requires_grad());
    }

    #[test]
    fn test_freeze_and_unfreeze_subnetworks() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = model(&options(tmp.path()));
        let both = vec!["encoder".to_string(), "decoder".to_string()];

        m.freeze_subnetworks(&both).unwrap();
        assert!(m.get_networks().iter().all(|net| net.is_frozen()));
        m.unfreeze_subnetworks(&both[..1]).unwrap();
        assert!(m.subnetwork("encoder").unwrap().requires_grad());
        assert!(m.subnetwork("decoder").unwrap().is_frozen());
    }

    #[test]
    fn test_freezing_unknown_subnetwork_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = model(&options(tmp.path()));
        let err = m.freeze_subnetworks(&["ghost".to_string()]).unwrap_err();
        assert!(err.to_string().contains("ghost"));
        assert!(m.subnetwork("encoder").unwrap().requires_grad());
    }

    #[test]
    fn test_save_and_load_networks_with_states() {
        let tmp  = tempfile::tempdir().unwrap();
        let opts = options(tmp.path());
        let saved = model(&opts);

        let mut states = OtherStates::new();
        states.insert("epoch".to_string(), 3.into());
        let written = saved.save_networks(3, &states);
        assert_eq!(written.len(), 3);
        assert!(tmp.path().join("run").join("3_net_encoder.pth").exists());
        assert!(tmp.path().join("run").join("3_states.pth").exists());

        let resume = ModelOptions { resume_dir: Some(tmp.path().join("run")), ..opts };
        let mut loaded = model(&resume);
        assert_eq!(loaded.load_networks(3).unwrap(), 2);
        assert_eq!(encoder_weights(&loaded), encoder_weights(&saved));
        assert_eq!(decoder_weights(&loaded), decoder_weights(&saved));
        assert_eq!(loaded.load_states(3).unwrap(), Some(states));
    }

    #[test]
    fn test_missing_network_checkpoint_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = model(&options(tmp.path()));
        let before = encoder_weights(&m);
        assert_eq!(m.load_networks("latest").unwrap(), 0);
        assert_eq!(encoder_weights(&m), before);
        assert_eq!(m.load_states("latest").unwrap(), None);
    }

    #[test]
    fn test_load_subnetworks_skips_missing_files() {
        let tmp  = tempfile::tempdir().unwrap();
        let opts = options(tmp.path());
        let saved = model(&opts);
        let written = saved.save_subnetworks("latest");
        assert_eq!(written.len(), 2);
        fs::remove_file(tmp.path().join("run").join("latest_subnet_decoder.pth")).unwrap();

        let mut fresh = model(&opts);
        let decoder_before = decoder_weights(&fresh);
        let loaded = fresh.load_subnetworks("latest", None, Some(tmp.path().join("run").as_path())).unwrap();
        assert_eq!(loaded, 1);
        assert_eq!(encoder_weights(&fresh), encoder_weights(&saved));
        assert_eq!(decoder_weights(&fresh), decoder_before);
    }

    #[test]
    fn test_load_subnetworks_honours_name_filter() {
        let tmp  = tempfile::tempdir().unwrap();
        let opts = options(tmp.path());
        let saved = model(&opts);
        saved.save_subnetworks(5);

        let mut fresh = model(&opts);
        let encoder_before = encoder_weights(&fresh);
        let only_decoder = ["decoder".to_string()];
        let loaded = fresh.load_subnetworks(5, Some(&only_decoder[..]), Some(tmp.path().join("run").as_path())).unwrap();
        assert_eq!(loaded, 1);
        assert_eq!(encoder_weights(&fresh), encoder_before);
        assert_eq!(decoder_weights(&fresh), decoder_weights(&saved));
    }

    #[test]
    fn test_update_learning_rate_steps_once() {
        let tmp  = tempfile::tempdir().unwrap();
        let opts = ModelOptions {
            lr_policy:      LrPolicy::Step,
            lr_decay_iters: 1,
            ..options(tmp.path())
        };
        let mut m = model(&opts);
        m.setup().unwrap();
        assert_eq!(m.base().learning_rate("encoder"), Some(1e-2));

        let rates = m.update_learning_rate(false);
        assert_eq!(rates.len(), 2);
        assert!(rates.iter().all(|lr| (lr - 1e-3).abs() < 1e-12));
        assert_eq!(m.base().learning_rate("decoder"), Some(rates[1]));
    }

    #[test]
    fn test_setup_keeps_freeze_through_resume() {
        let tmp  = tempfile::tempdir().unwrap();
        let opts = options(tmp.path());
        let saved = model(&opts);
        saved.save_networks("latest", &OtherStates::new());

        let resumed = ModelOptions {
            resume_dir:         Some(tmp.path().join("run")),
            freeze_subnetworks: vec!["encoder".to_string()],
            ..opts
        };
        let mut m = model(&resumed);
        m.setup().unwrap();
        assert!(m.subnetwork("encoder").unwrap().is_frozen());
        assert!(m.subnetwork("decoder").unwrap().requires_grad());
        assert_eq!(encoder_weights(&m), encoder_weights(&saved));
        assert_eq!(m.base().schedulers().len(), 2);
    }

    #[test]
    fn test_setup_loads_pretrained_subnetworks() {
        let tmp = tempfile::tempdir().unwrap();
        let pretrained = model(&ModelOptions { name: "pretrained".to_string(), ..options(tmp.path()) });
        pretrained.save_subnetworks("latest");

        let opts = ModelOptions {
            load_subnetworks_dir: Some(tmp.path().join("pretrained")),
            load_subnetworks:     vec!["encoder".to_string()],
            ..options(tmp.path())
        };
        let mut m = model(&opts);
        m.setup().unwrap();
        assert_eq!(encoder_weights(&m), encoder_weights(&pretrained));
        assert_ne!(decoder_weights(&m), decoder_weights(&pretrained));
    }

    #[test]
    fn test_inference_setup_loads_latest_without_schedulers() {
        let tmp = tempfile::tempdir().unwrap();
        let trained = model(&options(tmp.path()));
        trained.save_networks("latest", &OtherStates::new());

        let opts = ModelOptions { is_train: false, ..options(tmp.path()) };
        let mut m = model(&opts);
        m.setup().unwrap();
        assert!(m.base().schedulers().is_empty());
        assert_eq!(decoder_weights(&m), decoder_weights(&trained));
    }

    #[test]
    fn test_network_summary() {
        let tmp = tempfile::tempdir().unwrap();
        let m = model(&options(tmp.path()));
        let summary = m.network_summary(false);
        // 6*8 + 8 + 8*3 + 3 per network
        assert!(summary.contains("[Network encoder] Total number of parameters: 0.000M"));
        assert!(summary.contains("[Network decoder]"));
        assert!(summary.ends_with(SUMMARY_RULE));
        assert!(m.network_summary(true).len() > summary.len());
    }

    #[test]
    fn test_current_step() {
        let tmp = tempfile::tempdir().unwrap();
        let mut m = model(&options(tmp.path()));
        assert_eq!(m.base().current_step(), None);
        m.set_current_step(Some(12));
        assert_eq!(m.base().current_step(), Some(12));
    }
}
