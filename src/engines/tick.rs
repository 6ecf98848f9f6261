use {
    crate::{
        agents::{
            Algorithm,
            OffPolicyAlgorithm,
            RunMode,
        },
        envs::{
            Environment,
            Step,
        },
    },
    anyhow::Result,
    tracing::warn,
    candle_core::{
        Device,
        Tensor,
    },
    rand::{
        thread_rng,
        Rng,
    },
};


/// Run a single tick / step of an environment with an off-policy algorithm.
///
/// The transition is remembered by the agent, and the environment is reset
/// when the episode ends.
///
/// # Arguments
///
/// * `env` - The environment to step in.
/// * `agent` - The agent to step with.
/// * `mode` - Whether the agent explores.
/// * `device` - The device to run on.
pub fn tick_off_policy<Alg, Env>(
    env: &mut Env,
    agent: &mut Alg,
    mode: RunMode,
    device: &Device,
) -> Result<Step>
where
    Env: Environment,
    Alg: Algorithm + OffPolicyAlgorithm,
{
    let state = &Tensor::new(env.current_observation(), device)?;
    let action = &agent.actions(state, mode)?;
    let step = env.step(&action.to_vec1::<f64>()?)?;

    agent.remember(
        state,
        action,
        &Tensor::new(vec![step.reward], device)?,
        &Tensor::new(step.observation.clone(), device)?,
        &Tensor::new(vec![if step.terminated { 1.0 } else { 0.0 }], device)?,
    );

    if step.terminated || step.truncated {
        env.reset(thread_rng().gen::<u64>())?;
        agent.reset_episode();
    }

    let x = (step.reward, step.terminated, step.truncated);
    warn!("Environment has ticked (off policy) with {x:?}");

    Ok(step)
}


#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{
            agents::DDPG,
            configs::DDPG_Config,
            envs::{
                PendulumConfig,
                PendulumEnv,
            },
        },
    };

    #[test]
    fn ticks_remember_and_reset() -> Result<()> {
        let mut env = *PendulumEnv::new(PendulumConfig {
            timelimit: 2,
            ..Default::default()
        })?;
        env.reset(0)?;
        let config = DDPG_Config {
            hidden_1_size: 4,
            hidden_2_size: 4,
            hidden_3_size: 4,
            replay_buffer_capacity: 10,
            training_batch_size: 2,
            ..Default::default()
        };
        let mut agent = *DDPG::from_config(&Device::Cpu, &config, 3, &env.action_domain())?;

        let first = tick_off_policy(&mut env, &mut agent, RunMode::Train, &Device::Cpu)?;
        assert!(!first.truncated);
        let second = tick_off_policy(&mut env, &mut agent, RunMode::Train, &Device::Cpu)?;
        assert!(second.truncated);

        assert_eq!(agent.replay_buffer().len(), 2);
        // the environment was reset, so the next tick is the first of a new episode
        let third = tick_off_policy(&mut env, &mut agent, RunMode::Test, &Device::Cpu)?;
        assert!(!third.truncated);
        Ok(())
    }
}
