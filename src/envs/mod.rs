mod pendulum;

use {
    anyhow::Result,
    rand::{
        Rng,
        RngCore,
    },
    serde::{
        de::DeserializeOwned,
        Serialize,
    },
    std::ops::RangeInclusive,
};

pub use crate::envs::pendulum::{
    PendulumConfig,
    PendulumEnv,
};

/// The result of taking a single step in an [`Environment`].
#[derive(Debug, Clone)]
pub struct Step {
    pub observation: Vec<f64>,
    pub action: Vec<f64>,
    pub reward: f64,
    pub terminated: bool,
    pub truncated: bool,
}

/// A continuous control task.
///
/// Observations and actions are flat vectors of `f64`. The valid range of each
/// action dimension is given by [`Environment::action_domain`].
pub trait Environment {
    type Config: Clone + Serialize + DeserializeOwned;

    fn config(&self) -> &Self::Config;
    fn new(config: Self::Config) -> Result<Box<Self>>;
    fn reset(
        &mut self,
        seed: u64,
    ) -> Result<Vec<f64>>;
    fn step(
        &mut self,
        action: &[f64],
    ) -> Result<Step>;
    fn timelimit(&self) -> usize;
    fn action_space(&self) -> Vec<usize>;
    fn action_domain(&self) -> Vec<RangeInclusive<f64>>;
    fn observation_space(&self) -> Vec<usize>;
    fn current_observation(&self) -> Vec<f64>;
}

/// Sample a uniformly random action from the given domain.
pub fn sample_action(
    rng: &mut dyn RngCore,
    domain: &[RangeInclusive<f64>],
) -> Vec<f64> {
    domain
        .iter()
        .map(|range| rng.gen_range(range.clone()))
        .collect()
}
