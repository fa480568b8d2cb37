// ============================================================
// Layer 5 — Reconstruction Model
// ============================================================
// A small encoder / decoder pair trained to reproduce its input:
//
//   x ──► encoder (Mlp) ──► z ──► decoder (Mlp) ──► x̂
//   loss_recon = MSE(x̂, x)
//
// Registry:
//   networks    encoder, decoder
//   subnetworks encoder, decoder
//   losses      recon
//   visuals     real (x), fake (x̂)
//
// Each network has its own Adam optimizer so the two can be
// scheduled, frozen and restored independently.
//
// Reference: Burn Book §3 (Building Blocks), §5 (Training)

use anyhow::{Context, Result};
use burn::{
    nn::{
        loss::{MseLoss, Reduction},
        Linear, LinearConfig,
    },
    optim::{adaptor::OptimizerAdaptor, Adam, AdamConfig, GradientsParams, Optimizer},
    prelude::*,
    tensor::{activation::relu, backend::AutodiffBackend, ElementConversion, TensorData},
};

use crate::domain::options::ModelOptions;
use crate::domain::registry::ModelRegistry;
use crate::domain::traits::Network;
use crate::ml::base_model::{ModelBase, TrainableModel};
use crate::ml::network::NetworkSlot;

const ENCODER: &str = "encoder";
const DECODER: &str = "decoder";
const LOSS_RECON: &str = "recon";
const VISUAL_REAL: &str = "real";
const VISUAL_FAKE: &str = "fake";

// ─── Mlp ──────────────────────────────────────────────────────────────────────

#[derive(Config, Debug)]
pub struct MlpConfig {
    pub d_input:  usize,
    pub d_hidden: usize,
    pub d_output: usize,
    #[config(default = true)]
    pub bias:     bool,
}

impl MlpConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        Mlp {
            input:  LinearConfig::new(self.d_input, self.d_hidden).with_bias(self.bias).init(device),
            output: LinearConfig::new(self.d_hidden, self.d_output).with_bias(self.bias).init(device),
        }
    }
}

/// Two linear layers with a ReLU in between.
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    pub input:  Linear<B>,
    pub output: Linear<B>,
}

impl<B: Backend> Mlp<B> {
    /// x: [batch, d_input] → [batch, d_output]
    pub fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        self.output.forward(relu(self.input.forward(x)))
    }
}

// ─── ReconstructionModel ──────────────────────────────────────────────────────

#[derive(Config, Debug)]
pub struct ReconstructionConfig {
    pub input_dim:  usize,
    pub hidden_dim: usize,
    pub latent_dim: usize,
}

pub struct ReconstructionModel<B: AutodiffBackend> {
    base:          ModelBase<B>,
    net_encoder:   NetworkSlot<B, Mlp<B>>,
    net_decoder:   NetworkSlot<B, Mlp<B>>,
    optim_encoder: OptimizerAdaptor<Adam, Mlp<B>, B>,
    optim_decoder: OptimizerAdaptor<Adam, Mlp<B>, B>,
    real:          Option<Tensor<B, 2>>,
    fake:          Option<Tensor<B, 2>>,
    loss_recon:    Option<Tensor<B, 1>>,
}

impl<B: AutodiffBackend> ReconstructionModel<B> {
    pub fn new(options: &ModelOptions, config: &ReconstructionConfig) -> Self {
        let mut base = ModelBase::<B>::new(options);
        base.set_registry(
            ModelRegistry::new()
                .with_losses([LOSS_RECON])
                .with_networks([ENCODER, DECODER])
                .with_visuals([VISUAL_REAL, VISUAL_FAKE]),
        );
        base.register_optimizer(ENCODER, options.lr);
        base.register_optimizer(DECODER, options.lr);

        let device  = base.device().clone();
        let encoder = MlpConfig::new(config.input_dim, config.hidden_dim, config.latent_dim)
            .init(&device);
        let decoder = MlpConfig::new(config.latent_dim, config.hidden_dim, config.input_dim)
            .init(&device);

        Self {
            base,
            net_encoder:   NetworkSlot::new(encoder),
            net_decoder:   NetworkSlot::new(decoder),
            optim_encoder: AdamConfig::new().with_epsilon(1e-8).init(),
            optim_decoder: AdamConfig::new().with_epsilon(1e-8).init(),
            real:          None,
            fake:          None,
            loss_recon:    None,
        }
    }

    pub fn encoder(&self) -> &Mlp<B> {
        self.net_encoder.module()
    }

    pub fn decoder(&self) -> &Mlp<B> {
        self.net_decoder.module()
    }

    /// Forward, backward, then one optimizer step per network using the
    /// learning rates owned by the model base.
    pub fn optimize_parameters(&mut self) -> Result<()> {
        self.forward()?;
        let loss = self.loss_recon.clone().context("forward pass produced no loss")?;

        let mut grads = loss.backward();
        let grads_encoder = GradientsParams::from_module(&mut grads, self.net_encoder.module());
        let grads_decoder = GradientsParams::from_module(&mut grads, self.net_decoder.module());

        let lr_encoder = self.base.learning_rate(ENCODER).context("encoder optimizer is not registered")?;
        let lr_decoder = self.base.learning_rate(DECODER).context("decoder optimizer is not registered")?;

        let optim = &mut self.optim_encoder;
        self.net_encoder.update(|module| optim.step(lr_encoder, module, grads_encoder));
        let optim = &mut self.optim_decoder;
        self.net_decoder.update(|module| optim.step(lr_decoder, module, grads_decoder));
        Ok(())
    }
}

impl<B: AutodiffBackend> TrainableModel<B> for ReconstructionModel<B> {
    /// A batch of rows: [batch, input_dim]
    type Input = Tensor<B, 2>;

    fn base(&self) -> &ModelBase<B> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ModelBase<B> {
        &mut self.base
    }

    fn set_input(&mut self, input: Self::Input) {
        self.real = Some(input);
    }

    fn forward(&mut self) -> Result<()> {
        let real = self.real.clone().context("set_input must be called before forward")?;

        let latent = self.net_encoder.module().forward(real.clone());
        let fake   = self.net_decoder.module().forward(latent);
        let loss   = MseLoss::new().forward(fake.clone(), real, Reduction::Mean);

        self.fake       = Some(fake);
        self.loss_recon = Some(loss);
        Ok(())
    }

    fn network(&self, name: &str) -> Option<&dyn Network> {
        match name {
            ENCODER => Some(&self.net_encoder),
            DECODER => Some(&self.net_decoder),
            _ => None,
        }
    }

    fn network_mut(&mut self, name: &str) -> Option<&mut dyn Network> {
        match name {
            ENCODER => Some(&mut self.net_encoder),
            DECODER => Some(&mut self.net_decoder),
            _ => None,
        }
    }

    fn subnetwork_names(&self) -> Vec<String> {
        vec![ENCODER.to_string(), DECODER.to_string()]
    }

    fn subnetwork(&self, name: &str) -> Option<&dyn Network> {
        self.network(name)
    }

    fn subnetwork_mut(&mut self, name: &str) -> Option<&mut dyn Network> {
        self.network_mut(name)
    }

    fn current_loss(&self, name: &str) -> Option<f64> {
        match name {
            LOSS_RECON => self
                .loss_recon
                .as_ref()
                .map(|loss| loss.clone().into_scalar().elem::<f64>()),
            _ => None,
        }
    }

    fn current_visual(&self, name: &str) -> Option<TensorData> {
        let visual = match name {
            VISUAL_REAL => self.real.as_ref(),
            VISUAL_FAKE => self.fake.as_ref(),
            _ => None,
        };
        visual.map(|tensor| tensor.to_data())
    }
}
