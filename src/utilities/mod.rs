/////////////////////////////////////////////////////////////////////////////////////
//
// Contagion model
//
// utilities module
//
// random number sources and the probability test used by every transition
//
////////////////////////////////////////////////////////////////////////////////////

use super::error::ContagionError;
use rand::prelude::*;
use rand::rngs::StdRng;

// Source of randomness used by the simulation.
// The graph draws every random number through this trait so a test can swap in
// a scripted sequence and check exact transition outcomes.
pub trait RandomSource {
    // Uniform value in [0, 1).
    fn uniform(&mut self) -> f64;

    // Uniform index in 0..len. `len` is never 0.
    fn index(&mut self, len: usize) -> usize;
}

// Default source - a StdRng seeded from the OS or from a fixed seed
#[derive(Debug, Clone)]
pub struct StdRandom {
    rng: StdRng,
}

impl StdRandom {
    pub fn from_entropy() -> StdRandom {
        StdRandom {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> StdRandom {
        StdRandom {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for StdRandom {
    fn default() -> Self {
        StdRandom::from_entropy()
    }
}

impl RandomSource for StdRandom {
    fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0, len)
    }
}

// Replays a fixed list of uniform values, wrapping around at the end.
// Indices are derived from the same values: `value * len`, truncated.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    pub fn new(values: Vec<f64>) -> Result<ScriptedRandom, ContagionError> {
        if values.is_empty() {
            return Err(ContagionError::Parameter(String::from(
                "a scripted random source needs at least one value",
            )));
        }
        Ok(ScriptedRandom { values, cursor: 0 })
    }

    // number of values handed out so far
    pub fn draws(&self) -> usize {
        self.cursor
    }

    fn next_value(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

impl RandomSource for ScriptedRandom {
    fn uniform(&mut self) -> f64 {
        self.next_value()
    }

    fn index(&mut self, len: usize) -> usize {
        let value = self.next_value();
        ((value * len as f64) as usize).min(len - 1)
    }
}

// Bernoulli trial: true with probability `prob`.
// `prob` is clamped to [0, 1] and NaN never succeeds, so 0 never fires and 1 always does.
pub fn simulate_prob<R: RandomSource + ?Sized>(rng: &mut R, prob: f64) -> bool {
    if prob.is_nan() {
        return false;
    }
    let prob = prob.max(0.0).min(1.0);
    rng.uniform() < prob
}

// convert mean and sample population to Beta distribution alpha and beta
pub fn beta_mv_to_ab(mean: f64, sample_population: usize) -> (f64, f64) {
    let alpha = mean * sample_population as f64;
    let beta = (1.0 - mean) * sample_population as f64;
    (alpha, beta)
}
