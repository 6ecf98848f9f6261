use serde::{
    Deserialize,
    Serialize,
};


#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainConfig {
    // The total number of episodes.
    max_episodes: usize,
    // Number of random actions to take at very beginning of training.
    initial_random_actions: usize,
    // Whether to run a training iteration after every environment step.
    learn_every_step: bool,
    // The number of extra training iterations after one episode finishes.
    training_iterations: usize,
}
impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            max_episodes: 30,
            initial_random_actions: 0,
            learn_every_step: true,
            training_iterations: 0,
        }
    }
}
impl TrainConfig {
    pub fn new(
        max_episodes: usize,
        initial_random_actions: usize,
        learn_every_step: bool,
        training_iterations: usize,
    ) -> Self {
        Self {
            max_episodes,
            initial_random_actions,
            learn_every_step,
            training_iterations,
        }
    }

    pub fn pendulum() -> Self {
        Self {
            max_episodes: 100,
            initial_random_actions: 1000,
            learn_every_step: true,
            training_iterations: 0,
        }
    }
}

impl TrainConfig {
    pub fn max_episodes(&self) -> usize {
        self.max_episodes
    }
    pub fn initial_random_actions(&self) -> usize {
        self.initial_random_actions
    }
    pub fn learn_every_step(&self) -> bool {
        self.learn_every_step
    }
    pub fn training_iterations(&self) -> usize {
        self.training_iterations
    }
    pub fn set_max_episodes(&mut self, max_episodes: usize) {
        self.max_episodes = max_episodes;
    }
    pub fn set_initial_random_actions(&mut self, initial_random_actions: usize) {
        self.initial_random_actions = initial_random_actions;
    }
    pub fn set_learn_every_step(&mut self, learn_every_step: bool) {
        self.learn_every_step = learn_every_step;
    }
    pub fn set_training_iterations(&mut self, training_iterations: usize) {
        self.training_iterations = training_iterations;
    }
}
