// ============================================================
// Layer 5 — Learning-Rate Schedulers
// ============================================================
// One scheduler per optimizer, chosen by `LrPolicy`:
//
//   linear — lr * (1 - max(0, epoch + epoch_count - niter) / (niter_decay + 1))
//   step   — lr * 0.1^(epoch / lr_decay_iters)
//   cosine — lr * (1 + cos(PI * min(epoch, niter) / niter)) / 2
//
// All three implement Burn's `LrScheduler`, whose `step()` returns
// the rate for the *next* epoch. `Scheduler::new` calls it once so
// `current_lr()` is the epoch-0 rate; every later `step()` moves
// one epoch forward.
//
// Why not Burn's CosineAnnealingLrScheduler?
//   It restarts: after `niter` steps the rate jumps back to the
//   initial value. Training runs for `niter + niter_decay` epochs,
//   and the rate must stay at zero once the annealing is over.

use anyhow::{bail, Result};
use burn::{
    lr_scheduler::LrScheduler,
    tensor::backend::Backend,
};

use crate::domain::options::{LrPolicy, ModelOptions};

pub type LearningRate = f64;

const STEP_GAMMA: f64 = 0.1;

// ─── Linear decay ─────────────────────────────────────────────────────────────
/// Constant for `niter` epochs, then linear decay to zero.
#[derive(Clone, Copy, Debug)]
pub struct LinearDecayLrScheduler {
    initial_lr:  LearningRate,
    epoch_count: usize,
    niter:       usize,
    niter_decay: usize,
    epoch:       usize,
}

impl LinearDecayLrScheduler {
    pub fn new(initial_lr: LearningRate, epoch_count: usize, niter: usize, niter_decay: usize) -> Self {
        // usize::MAX wraps to 0 on the first step
        Self { initial_lr, epoch_count, niter, niter_decay, epoch: usize::MAX }
    }

    fn factor(&self) -> f64 {
        let decayed = (self.epoch + self.epoch_count).saturating_sub(self.niter);
        (1.0 - decayed as f64 / (self.niter_decay + 1) as f64).max(0.0)
    }
}

impl LrScheduler for LinearDecayLrScheduler {
    type Record<B: Backend> = usize;

    fn step(&mut self) -> LearningRate {
        self.epoch = self.epoch.wrapping_add(1);
        self.initial_lr * self.factor()
    }

    fn to_record<B: Backend>(&self) -> Self::Record<B> {
        self.epoch
    }

    fn load_record<B: Backend>(mut self, record: Self::Record<B>) -> Self {
        self.epoch = record;
        self
    }
}

// ─── Step decay ───────────────────────────────────────────────────────────────
/// Multiplies the rate by `gamma` every `step_size` epochs.
#[derive(Clone, Copy, Debug)]
pub struct StepDecayLrScheduler {
    initial_lr: LearningRate,
    step_size:  usize,
    gamma:      f64,
    epoch:      usize,
}

impl StepDecayLrScheduler {
    pub fn new(initial_lr: LearningRate, step_size: usize, gamma: f64) -> Result<Self> {
        if step_size == 0 {
            bail!("lr_decay_iters must be at least 1");
        }
        Ok(Self { initial_lr, step_size, gamma, epoch: usize::MAX })
    }
}

impl LrScheduler for StepDecayLrScheduler {
    type Record<B: Backend> = usize;

    fn step(&mut self) -> LearningRate {
        self.epoch = self.epoch.wrapping_add(1);
        let decays = (self.epoch / self.step_size) as i32;
        self.initial_lr * self.gamma.powi(decays)
    }

    fn to_record<B: Backend>(&self) -> Self::Record<B> {
        self.epoch
    }

    fn load_record<B: Backend>(mut self, record: Self::Record<B>) -> Self {
        self.epoch = record;
        self
    }
}

// ─── Cosine annealing ─────────────────────────────────────────────────────────
/// Half a cosine wave from the initial rate down to zero over
/// `niter` epochs, then zero.
#[derive(Clone, Copy, Debug)]
pub struct CosineDecayLrScheduler {
    initial_lr: LearningRate,
    niter:      usize,
    epoch:      usize,
}

impl CosineDecayLrScheduler {
    pub fn new(initial_lr: LearningRate, niter: usize) -> Result<Self> {
        if niter == 0 {
            bail!("niter must be at least 1 for the cosine policy");
        }
        Ok(Self { initial_lr, niter, epoch: usize::MAX })
    }
}

impl LrScheduler for CosineDecayLrScheduler {
    type Record<B: Backend> = usize;

    fn step(&mut self) -> LearningRate {
        self.epoch = self.epoch.wrapping_add(1);
        let progress = self.epoch.min(self.niter) as f64 / self.niter as f64;
        self.initial_lr * 0.5 * (1.0 + (std::f64::consts::PI * progress).cos())
    }

    fn to_record<B: Backend>(&self) -> Self::Record<B> {
        self.epoch
    }

    fn load_record<B: Backend>(mut self, record: Self::Record<B>) -> Self {
        self.epoch = record;
        self
    }
}

// ─── Scheduler ────────────────────────────────────────────────────────────────
/// The scheduler driving one optimizer's learning rate.
#[derive(Clone, Debug)]
pub struct Scheduler {
    kind:       SchedulerKind,
    current_lr: LearningRate,
}

#[derive(Clone, Debug)]
enum SchedulerKind {
    Linear(LinearDecayLrScheduler),
    Step(StepDecayLrScheduler),
    Cosine(CosineDecayLrScheduler),
}

impl SchedulerKind {
    fn step(&mut self) -> LearningRate {
        match self {
            Self::Linear(s) => s.step(),
            Self::Step(s)   => s.step(),
            Self::Cosine(s) => s.step(),
        }
    }
}

impl Scheduler {
    /// Build the scheduler selected by `options.lr_policy`, positioned at epoch 0.
    pub fn new(options: &ModelOptions, initial_lr: LearningRate) -> Result<Self> {
        if !initial_lr.is_finite() || initial_lr <= 0.0 {
            bail!("--lr must be a positive number, got {initial_lr}");
        }
        let kind = match options.lr_policy {
            LrPolicy::Linear => SchedulerKind::Linear(LinearDecayLrScheduler::new(
                initial_lr,
                options.epoch_count,
                options.niter,
                options.niter_decay,
            )),
            LrPolicy::Step => SchedulerKind::Step(StepDecayLrScheduler::new(
                initial_lr,
                options.lr_decay_iters,
                STEP_GAMMA,
            )?),
            LrPolicy::Cosine => {
                SchedulerKind::Cosine(CosineDecayLrScheduler::new(initial_lr, options.niter)?)
            }
        };

        let mut scheduler = Self { kind, current_lr: initial_lr };
        scheduler.current_lr = scheduler.kind.step();
        Ok(scheduler)
    }

    /// Advance one epoch and return the new rate.
    pub fn step(&mut self) -> LearningRate {
        self.current_lr = self.kind.step();
        self.current_lr
    }

    pub fn current_lr(&self) -> LearningRate {
        self.current_lr
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn options(policy: LrPolicy) -> ModelOptions {
        ModelOptions {
            lr_policy:      policy,
            epoch_count:    1,
            niter:          2,
            niter_decay:    3,
            lr_decay_iters: 2,
            ..ModelOptions::default()
        }
    }

    fn sequence(scheduler: &mut Scheduler, steps: usize) -> Vec<LearningRate> {
        let mut lrs = vec![scheduler.current_lr()];
        lrs.extend((0..steps).map(|_| scheduler.step()));
        lrs
    }

    fn assert_close(actual: &[LearningRate], expected: &[LearningRate]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-12, "got {actual:?}, expected {expected:?}");
        }
    }

    #[test]
    fn test_linear_holds_then_decays_to_zero() {
        let mut s = Scheduler::new(&options(LrPolicy::Linear), 1.0).unwrap();
        // epoch + 1 - 2 > 0 from epoch 2 on, over niter_decay + 1 = 4
        assert_close(&sequence(&mut s, 6), &[1.0, 1.0, 0.75, 0.5, 0.25, 0.0, 0.0]);
    }

    #[test]
    fn test_linear_respects_epoch_count() {
        let opts = ModelOptions { epoch_count: 3, ..options(LrPolicy::Linear) };
        let s = Scheduler::new(&opts, 1.0).unwrap();
        // resumed at epoch 3: already one decay step in
        assert!((s.current_lr() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_step_policy() {
        let mut s = Scheduler::new(&options(LrPolicy::Step), 1.0).unwrap();
        assert_close(&sequence(&mut s, 4), &[1.0, 1.0, 0.1, 0.1, 0.01]);
    }

    #[test]
    fn test_step_policy_rejects_zero_interval() {
        let opts = ModelOptions { lr_decay_iters: 0, ..options(LrPolicy::Step) };
        assert!(Scheduler::new(&opts, 1.0).is_err());
    }

    #[test]
    fn test_cosine_policy() {
        let mut s = Scheduler::new(&options(LrPolicy::Cosine), 0.5).unwrap();
        // cos(0), cos(PI/2), cos(PI)
        assert_close(&sequence(&mut s, 2), &[0.5, 0.25, 0.0]);
    }

    #[test]
    fn test_cosine_stays_at_zero_after_niter() {
        // niter = 2, trained for niter + niter_decay = 5 epochs
        let mut s = Scheduler::new(&options(LrPolicy::Cosine), 0.5).unwrap();
        assert_close(&sequence(&mut s, 5), &[0.5, 0.25, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_cosine_rejects_zero_period() {
        let opts = ModelOptions { niter: 0, ..options(LrPolicy::Cosine) };
        assert!(Scheduler::new(&opts, 0.5).is_err());
    }

    #[test]
    fn test_rate_above_one_accepted_by_every_policy() {
        for policy in [LrPolicy::Linear, LrPolicy::Step, LrPolicy::Cosine] {
            let s = Scheduler::new(&options(policy), 2.0).unwrap();
            assert!((s.current_lr() - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_non_positive_rate_rejected() {
        for policy in [LrPolicy::Linear, LrPolicy::Step, LrPolicy::Cosine] {
            let err = Scheduler::new(&options(policy), 0.0).unwrap_err();
            assert!(err.to_string().contains("--lr"));
            assert!(Scheduler::new(&options(policy), f64::NAN).is_err());
        }
    }

    #[test]
    fn test_record_round_trip() {
        type B = burn::backend::NdArray;
        let mut s = LinearDecayLrScheduler::new(1.0, 1, 2, 3);
        s.step();
        s.step();
        s.step();
        let record = LrScheduler::to_record::<B>(&s);
        let mut restored = LinearDecayLrScheduler::new(1.0, 1, 2, 3).load_record::<B>(record);
        assert_eq!(restored.step(), s.clone().step());
    }
}
