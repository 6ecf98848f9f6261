//! # Components
//!
//! This module contains the components that can be used to build an agent.
//!
//! ## Noise
//!
//! The [`OuNoise`] struct implements the Ornstein-Uhlenbeck process, which is
//! added to the actions of the [`crate::agents::DDPG`] algorithm during
//! training to drive exploration.
//!
//! ## Replay Buffer
//!
//! The [`ReplayBuffer`] struct implements a bounded replay buffer, which is
//! used by off-policy algorithms such as [`crate::agents::DDPG`].

mod ou_noise;
mod replay_buffer;

pub use ou_noise::OuNoise;
pub use replay_buffer::{
    Batch,
    ReplayBuffer,
};
