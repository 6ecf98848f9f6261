use serde::{
    Deserialize,
    Serialize,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestConfig {
    // The total number of episodes.
    max_episodes: usize,
}
impl Default for TestConfig {
    fn default() -> Self {
        Self {
            max_episodes: 10,
        }
    }
}
impl TestConfig {
    pub fn new(max_episodes: usize) -> Self {
        Self {
            max_episodes,
        }
    }
}

impl TestConfig {
    pub fn max_episodes(&self) -> usize {
        self.max_episodes
    }
    pub fn set_max_episodes(&mut self, max_episodes: usize) {
        self.max_episodes = max_episodes;
    }
}
