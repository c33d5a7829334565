use rand::Rng;
use thiserror::Error;

use crate::catalog::DifficultyPreset;

/// Raised when a preset cannot parameterize a round. The only rejectable
/// condition in the whole game; everything else is a defined no-op.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid preset `{name}`: count and max_value must both be at least 1")]
pub struct InvalidConfiguration {
    pub name: String,
}

/// One generated round: the numbers that will be flashed and their sum.
/// Fields are private so `sum` can never drift from `values`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    values: Vec<u32>,
    sum: u32,
}

impl Round {
    /// Draw `preset.count` values uniformly from `[1, preset.max_value]`,
    /// with replacement (repeats are intended, not a bug), and precompute
    /// their sum. Reproducible for a given RNG state.
    pub fn generate<R: Rng>(
        preset: &DifficultyPreset,
        rng: &mut R,
    ) -> Result<Self, InvalidConfiguration> {
        if preset.count < 1 || preset.max_value < 1 {
            return Err(InvalidConfiguration {
                name: preset.name.to_string(),
            });
        }

        let values: Vec<u32> = (0..preset.count)
            .map(|_| rng.gen_range(1..=preset.max_value))
            .collect();
        let sum = values.iter().sum();

        Ok(Self { values, sum })
    }

    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn sum(&self) -> u32 {
        self.sum
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
