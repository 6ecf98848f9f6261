use {
    anyhow::{
        bail,
        Result,
    },
    serde::{
        Deserialize,
        Serialize,
    },
};


#[allow(non_camel_case_types)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DDPG_Config {
    // The learning rates for the Actor and Critic networks
    pub actor_learning_rate: f64,
    pub critic_learning_rate: f64,
    // The impact of the q value of the next state on the current state's q value.
    pub gamma: f64,
    // The weight for updating the target networks.
    pub tau: f64,
    // The number of neurons in the hidden layers of the Actor and Critic networks.
    pub hidden_1_size: usize,
    pub hidden_2_size: usize,
    pub hidden_3_size: usize,
    // Dropout probability after the second hidden layer.
    pub dropout_rate: f32,
    // Epsilon of the batch normalization layers.
    pub batch_norm_eps: f64,
    // The capacity of the replay buffer used for sampling training data.
    pub replay_buffer_capacity: usize,
    // The training batch size for each training iteration.
    pub training_batch_size: usize,
    // Ornstein-Uhlenbeck process parameters.
    pub ou_mu: f64,
    pub ou_theta: f64,
    pub ou_sigma: f64,
    // Fixed seed for the exploration noise, random if None.
    pub ou_seed: Option<u64>,
}
impl Default for DDPG_Config {
    fn default() -> Self {
        Self {
            actor_learning_rate: 0.00147,
            critic_learning_rate: 0.00147,
            gamma: 0.99,
            tau: 0.01,
            hidden_1_size: 32,
            hidden_2_size: 64,
            hidden_3_size: 32,
            dropout_rate: 0.5,
            batch_norm_eps: 1e-3,
            replay_buffer_capacity: 100_000,
            training_batch_size: 64,
            ou_mu: 0.0,
            ou_theta: 0.15,
            ou_sigma: 0.2,
            ou_seed: None,
        }
    }
}
impl DDPG_Config {
    pub fn pendulum() -> Self {
        Self {
            actor_learning_rate: 1e-4,
            critic_learning_rate: 1e-3,
            gamma: 0.99,
            tau: 0.005,
            hidden_1_size: 64,
            hidden_2_size: 128,
            hidden_3_size: 64,
            dropout_rate: 0.1,
            replay_buffer_capacity: 100_000,
            training_batch_size: 100,
            ou_sigma: 0.1,
            ..Default::default()
        }
    }

    /// Check that the hyperparameters describe a trainable agent.
    pub fn validate(&self) -> Result<()> {
        if self.actor_learning_rate <= 0.0 || self.critic_learning_rate <= 0.0 {
            bail!("Learning rates must be positive");
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            bail!("Gamma must lie in [0, 1], got {}", self.gamma);
        }
        if self.tau <= 0.0 || self.tau > 1.0 {
            bail!("Tau must lie in (0, 1], got {}", self.tau);
        }
        if self.hidden_1_size == 0 || self.hidden_2_size == 0 || self.hidden_3_size == 0 {
            bail!("Hidden layers cannot be empty");
        }
        if !(0.0..1.0).contains(&self.dropout_rate) {
            bail!("Dropout rate must lie in [0, 1), got {}", self.dropout_rate);
        }
        if self.batch_norm_eps <= 0.0 {
            bail!("Batch norm epsilon must be positive");
        }
        // batch normalization needs more than one sample per batch
        if self.training_batch_size < 2 {
            bail!("Training batch size must be at least 2, got {}", self.training_batch_size);
        }
        if self.training_batch_size > self.replay_buffer_capacity {
            bail!(
                "Training batch size ({}) exceeds the replay buffer capacity ({})",
                self.training_batch_size,
                self.replay_buffer_capacity,
            );
        }
        Ok(())
    }
}

impl DDPG_Config {
    pub fn actor_lr(&self) -> f64 {
        self.actor_learning_rate
    }
    pub fn critic_lr(&self) -> f64 {
        self.critic_learning_rate
    }
    pub fn hidden_sizes(&self) -> [usize; 3] {
        [self.hidden_1_size, self.hidden_2_size, self.hidden_3_size]
    }
    pub fn set_actor_lr(&mut self, lr: f64) {
        self.actor_learning_rate = lr;
    }
    pub fn set_critic_lr(&mut self, lr: f64) {
        self.critic_learning_rate = lr;
    }
    pub fn set_replay_buffer_capacity(&mut self, capacity: usize) {
        self.replay_buffer_capacity = capacity;
    }
    pub fn set_training_batch_size(&mut self, batch_size: usize) {
        self.training_batch_size = batch_size;
    }
}
