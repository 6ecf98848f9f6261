mod ddpg;

pub use ddpg::{
    Losses,
    DDPG,
};


use {
    crate::components::ReplayBuffer,
    candle_core::{
        Device,
        Result,
        Tensor,
    },
    std::{
        ops::RangeInclusive,
        path::Path,
    },
    strum::Display,
};


/// The execution mode of an agent is either training or testing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum RunMode {
    Train,
    Test,
}

pub trait Algorithm {
    type Config;

    fn config(&self) -> &Self::Config;
    fn from_config(
        device: &Device,
        config: &Self::Config,
        size_state: usize,
        action_domain: &[RangeInclusive<f64>],
    ) -> Result<Box<Self>>;

    fn actions(
        &mut self,
        state: &Tensor,
        mode: RunMode,
    ) -> Result<Tensor>;

    fn train(&mut self) -> Result<Option<Losses>>;

    fn reset_episode(&mut self);
}

pub trait OffPolicyAlgorithm: Algorithm {
    fn remember(
        &mut self,
        state: &Tensor,
        action: &Tensor,
        reward: &Tensor,
        next_state: &Tensor,
        done: &Tensor,
    );

    fn replay_buffer(&self) -> &ReplayBuffer;
}

pub trait SaveableAlgorithm {
    fn save<P: AsRef<Path> + ?Sized>(
        &self,
        path: &P,
        name: &str,
    ) -> Result<()>;

    fn load<P: AsRef<Path> + ?Sized>(
        &mut self,
        path: &P,
        name: &str,
    ) -> Result<()>;
}
