mod experiment;
mod run;
mod tick;

pub use experiment::{
    run_experiment_off_policy,
    RunData,
};
pub use run::loop_off_policy;
pub use tick::tick_off_policy;

use crate::configs::{
    TestConfig,
    TrainConfig,
};


/// Whether a loop trains or tests the agent, carrying the matching config.
#[derive(Clone, Debug)]
pub enum ParamRunMode {
    Train(TrainConfig),
    Test(TestConfig),
}
