use {
    super::ParamRunMode,
    crate::{
        agents::{
            Algorithm,
            OffPolicyAlgorithm,
            RunMode,
        },
        envs::{
            sample_action,
            Environment,
        },
    },
    anyhow::Result,
    candle_core::{
        Device,
        Tensor,
    },
    rand::Rng,
    tracing::{
        info,
        warn,
    },
};


/// Run episodes of an environment with an off-policy algorithm.
///
/// In [`ParamRunMode::Train`] every transition is remembered and the agent
/// learns after each step (and/or after each episode). In
/// [`ParamRunMode::Test`] the agent acts without exploration noise and
/// nothing is stored.
///
/// Returns the total reward of every episode and whether it terminated.
///
/// # Arguments
///
/// * `env` - The environment to run on.
/// * `alg` - The agent to run with.
/// * `mode` - Whether to train or test, with the matching config.
/// * `device` - The device to run on.
pub fn loop_off_policy<Alg, Env>(
    env: &mut Env,
    alg: &mut Alg,
    mode: ParamRunMode,
    device: &Device,
) -> Result<(Vec<f64>, Vec<bool>)>
where
    Env: Environment,
    Alg: Algorithm + OffPolicyAlgorithm,
{
    warn!("action space: {:?}", env.action_space());
    warn!("observation space: {:?}", env.observation_space());

    let run_mode = mode.run_mode();
    let max_episodes = match &mode {
        ParamRunMode::Train(config) => config.max_episodes(),
        ParamRunMode::Test(config) => config.max_episodes(),
    };

    let mut steps_taken = 0;
    let mut mc_returns = Vec::new();
    let mut successes = Vec::new();
    let mut rng = rand::thread_rng();

    for episode in 0..max_episodes {
        let mut total_reward = 0.0;
        env.reset(rng.gen::<u64>())?;
        alg.reset_episode();

        loop {
            let state = &Tensor::new(env.current_observation(), device)?;

            // select an action, or randomly sample one
            let action = &match &mode {
                ParamRunMode::Train(config) if steps_taken < config.initial_random_actions() => {
                    Tensor::new(sample_action(&mut rng, &env.action_domain()), device)?
                }
                _ => alg.actions(state, run_mode)?,
            };

            let step = env.step(&action.to_vec1::<f64>()?)?;
            total_reward += step.reward;
            steps_taken += 1;

            if let ParamRunMode::Train(config) = &mode {
                alg.remember(
                    state,
                    action,
                    &Tensor::new(vec![step.reward], device)?,
                    &Tensor::new(step.observation.clone(), device)?,
                    &Tensor::new(vec![if step.terminated { 1.0 } else { 0.0 }], device)?,
                );
                if config.learn_every_step() {
                    if let Some(losses) = alg.train()? {
                        info!("step {steps_taken} losses: {losses:?}");
                    }
                }
            }

            if step.terminated || step.truncated {
                successes.push(step.terminated);
                break;
            }
        }

        warn!("{run_mode} episode {episode} with total reward of {total_reward}");
        mc_returns.push(total_reward);

        if let ParamRunMode::Train(config) = &mode {
            for _ in 0..config.training_iterations() {
                alg.train()?;
            }
        }
    }
    Ok((mc_returns, successes))
}

impl ParamRunMode {
    pub fn run_mode(&self) -> RunMode {
        match self {
            ParamRunMode::Train(_) => RunMode::Train,
            ParamRunMode::Test(_) => RunMode::Test,
        }
    }
}
