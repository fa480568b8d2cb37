// ============================================================
// Layer 5 — Network Slot
// ============================================================
// Wraps a concrete Burn module so the lifecycle layer can handle
// it through the `Network` trait.
//
// Burn modules are values: every transformation consumes the
// module and returns a new one. The slot owns the current value
// and swaps in the transformed module after each operation.
//
// Gradient flags are read with a ModuleVisitor and written with
// a ModuleMapper; both walk float parameters in the same order,
// so flags captured by one can be restored by the other.
//
// Weights are stored with burn-store's Burnpack format.
//
// Why load into a clone?
//   burn-store writes tensors into the module as it reads them.
//   A strict load can still be rejected afterwards (unused
//   tensors), and a half-applied checkpoint would leave a network
//   that matches neither the file nor its previous state. The
//   clone is only swapped in once the load has been accepted.
//
// Why restore gradient flags after a load?
//   Loaded tensors replace the parameters wholesale and come back
//   tracking gradients. A subnetwork frozen before a resume would
//   silently start training again, so the flags captured before
//   the load are re-applied to the new parameters.
//
// Reference: Burn Book §3 (Modules), §5 (Records)

use anyhow::{anyhow, bail, Result};
use burn::{
    module::{Module, ModuleMapper, ModuleVisitor, Param},
    tensor::{backend::Backend, Tensor},
};
use burn_store::{BurnpackStore, ModuleSnapshot};
use std::{fmt, marker::PhantomData, path::Path};

use crate::domain::traits::{LoadMode, LoadSummary, Mode, Network};

// ─── NetworkSlot ──────────────────────────────────────────────────────────────
/// A Burn module plus the mode flag the lifecycle layer toggles.
#[derive(Debug, Clone)]
pub struct NetworkSlot<B: Backend, M: Module<B>> {
    module:   M,
    mode:     Mode,
    _backend: PhantomData<B>,
}

impl<B: Backend, M: Module<B>> NetworkSlot<B, M> {
    pub fn new(module: M) -> Self {
        Self { module, mode: Mode::Train, _backend: PhantomData }
    }

    pub fn module(&self) -> &M {
        &self.module
    }

    /// Replace the module with a transformed version of itself,
    /// e.g. the result of an optimizer step.
    pub fn update(&mut self, f: impl FnOnce(M) -> M) {
        self.module = f(self.module.clone());
    }
}

impl<B, M> Network for NetworkSlot<B, M>
where
    B: Backend,
    M: Module<B> + fmt::Display,
{
    fn num_params(&self) -> usize {
        self.module.num_params()
    }

    fn describe(&self) -> String {
        self.module.to_string()
    }

    fn mode(&self) -> Mode {
        self.mode
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    fn set_require_grad(&mut self, require_grad: bool) {
        let mut mapper = RequireGradSetter { require_grad };
        self.update(|module| module.map(&mut mapper));
    }

    fn grad_flags(&self) -> Vec<bool> {
        let mut collector = GradFlagCollector::default();
        self.module.visit(&mut collector);
        collector.flags
    }

    fn restore_grad_flags(&mut self, flags: &[bool]) {
        let mut mapper = GradFlagRestorer { flags, cursor: 0 };
        self.update(|module| module.map(&mut mapper));
    }

    fn save_weights(&self, path: &Path) -> Result<()> {
        let mut store = BurnpackStore::from_file(path)
            .auto_extension(false)
            .overwrite(true);
        self.module
            .save_into(&mut store)
            .map_err(|err| anyhow!("cannot write '{}': {err}", path.display()))
    }

    fn load_weights(&mut self, path: &Path, mode: LoadMode) -> Result<LoadSummary> {
        let flags = self.grad_flags();
        let mut store = BurnpackStore::from_file(path)
            .auto_extension(false)
            .allow_partial(mode == LoadMode::Partial);

        // Load into a copy so a rejected checkpoint leaves the network as it was.
        let mut module = self.module.clone();
        let result = module
            .load_from(&mut store)
            .map_err(|err| anyhow!("cannot read '{}': {err}", path.display()))?;

        if mode == LoadMode::Strict && !result.unused.is_empty() {
            bail!(
                "checkpoint '{}' holds tensors the network does not have: {:?}",
                path.display(),
                result.unused,
            );
        }

        let summary = LoadSummary {
            applied: result.applied.len(),
            missing: result.missing.len(),
            unused:  result.unused.len(),
        };

        // Loaded tensors come back with default tracking; keep freezes in place.
        let mut restorer = GradFlagRestorer { flags: &flags, cursor: 0 };
        self.module = module.map(&mut restorer);
        Ok(summary)
    }
}

// ─── Visitors and mappers ─────────────────────────────────────────────────────

#[derive(Default)]
struct GradFlagCollector {
    flags: Vec<bool>,
}

impl<B: Backend> ModuleVisitor<B> for GradFlagCollector {
    fn visit_float<const D: usize>(&mut self, param: &Param<Tensor<B, D>>) {
        self.flags.push(param.val().is_require_grad());
    }
}

struct RequireGradSetter {
    require_grad: bool,
}

impl<B: Backend> ModuleMapper<B> for RequireGradSetter {
    fn map_float<const D: usize>(&mut self, param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
        param.set_require_grad(self.require_grad)
    }
}

struct GradFlagRestorer<'a> {
    flags:  &'a [bool],
    cursor: usize,
}

impl<B: Backend> ModuleMapper<B> for GradFlagRestorer<'_> {
    fn map_float<const D: usize>(&mut self, param: Param<Tensor<B, D>>) -> Param<Tensor<B, D>> {
        let flag = self.flags.get(self.cursor).copied();
        self.cursor += 1;
        match flag {
            Some(require_grad) => param.set_require_grad(require_grad),
            None => param,
        }
    }
}

/// Toggle gradient tracking on several networks at once.
/// A single network is passed as a one-element slice.
pub fn set_requires_grad(nets: &mut [&mut dyn Network], requires_grad: bool) {
    for net in nets.iter_mut() {
        net.set_require_grad(requires_grad);
    }
}
