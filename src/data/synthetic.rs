// ============================================================
// Layer 4 — Synthetic Samples
// ============================================================
// Generates rows that lie on a random low-dimensional subspace:
//
//   z ~ U(-1, 1)^rank
//   x = A z + noise          A: [dim, rank], fixed by the seed
//
// An encoder with latent size >= rank can reconstruct these rows,
// so the training loss has somewhere to go.
//
// The same seed always yields the same rows.
//
// Reference: rand crate documentation (StdRng, SeedableRng)

use anyhow::{bail, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// One input row
#[derive(Debug, Clone, PartialEq)]
pub struct RowSample {
    pub values: Vec<f32>,
}

impl RowSample {
    pub fn dim(&self) -> usize {
        self.values.len()
    }
}

/// Generator of low-rank rows.
#[derive(Debug, Clone)]
pub struct SyntheticRows {
    dim:   usize,
    rank:  usize,
    noise: f32,
    seed:  u64,
}

impl SyntheticRows {
    pub fn new(dim: usize, rank: usize, seed: u64) -> Result<Self> {
        if dim == 0 || rank == 0 {
            bail!("synthetic rows need a positive dimension and rank (got dim={dim}, rank={rank})");
        }
        Ok(Self { dim, rank: rank.min(dim), noise: 0.01, seed })
    }

    pub fn with_noise(mut self, noise: f32) -> Self {
        self.noise = noise;
        self
    }

    pub fn generate(&self, count: usize) -> Vec<RowSample> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let basis: Vec<f32> = (0..self.dim * self.rank)
            .map(|_| rng.gen_range(-1.0..1.0))
            .collect();

        let samples: Vec<RowSample> = (0..count)
            .map(|_| {
                let z: Vec<f32> = (0..self.rank).map(|_| rng.gen_range(-1.0..1.0)).collect();
                let values = basis
                    .chunks(self.rank)
                    .map(|row| {
                        let clean: f32 = row.iter().zip(&z).map(|(a, b)| a * b).sum();
                        clean + self.noise * rng.gen_range(-1.0f32..1.0)
                    })
                    .collect();
                RowSample { values }
            })
            .collect();

        tracing::debug!(
            "Generated {} synthetic rows (dim={}, rank={})",
            samples.len(),
            self.dim,
            self.rank,
        );
        samples
    }
}
