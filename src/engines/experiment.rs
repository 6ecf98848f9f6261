use {
    super::{
        run::loop_off_policy,
        ParamRunMode,
    },
    crate::{
        agents::{
            Algorithm,
            OffPolicyAlgorithm,
            SaveableAlgorithm,
        },
        configs::{
            TestConfig,
            TrainConfig,
        },
        envs::Environment,
        util::write_config,
    },
    anyhow::{
        anyhow,
        Result,
    },
    candle_core::Device,
    serde::{
        Deserialize,
        Serialize,
    },
    std::{
        fs::create_dir_all,
        path::Path,
    },
    tracing::warn,
};

/// The data collected in a single run of an experiment.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunData {
    pub train_returns: Vec<f64>,
    pub train_successes: Vec<bool>,
    pub test_returns: Vec<f64>,
    pub test_successes: Vec<bool>,
}

/// Run an experiment with an off-policy algorithm.
///
/// Every repetition trains a fresh agent on a fresh environment, optionally
/// tests it, and writes the collected returns to `run_{n}_data.ron` and the
/// trained weights to `run_{n}-*.safetensors`.
///
/// # Arguments
///
/// * `path` - The directory where the configs and collected data will be stored.
/// * `n_repetitions` - The number of repeated, identical runs to perform.
/// * `env_config` - The configuration for the environment.
/// * `alg_config` - The configuration for the algorithm.
/// * `train_config` - The configuration for the training loop.
/// * `test_config` - The configuration for testing after training, if any.
/// * `load_model` - The directory and name of weights to start from, if any.
/// * `device` - The device to run the experiment on.
#[allow(clippy::too_many_arguments)]
pub fn run_experiment_off_policy<Alg, Env>(
    path: &dyn AsRef<Path>,
    n_repetitions: usize,
    env_config: Env::Config,
    alg_config: Alg::Config,
    train_config: TrainConfig,
    test_config: Option<TestConfig>,
    load_model: Option<(String, String)>,
    device: &Device,
) -> Result<Vec<RunData>>
where
    Env: Environment,
    Alg: Algorithm + OffPolicyAlgorithm + SaveableAlgorithm,
    Alg::Config: Clone + Serialize,
{
    let path = path.as_ref();

    let alg_config_exists = path.join("config_algorithm.ron").try_exists()?;
    let env_config_exists = path.join("config_environment.ron").try_exists()?;
    if alg_config_exists || env_config_exists {
        Err(anyhow!(concat!(
            "Config files already exist in this directory!\n",
            "I am assuming I would be overwriting existing data!",
        )))?
    }

    create_dir_all(path)?;
    write_config(&alg_config, path.join("config_algorithm.ron"))?;
    write_config(&env_config, path.join("config_environment.ron"))?;
    write_config(&train_config, path.join("config_training.ron"))?;
    if let Some(test_config) = &test_config {
        write_config(test_config, path.join("config_testing.ron"))?;
    }

    let mut all_data = Vec::with_capacity(n_repetitions);
    for n in 0..n_repetitions {
        warn!("Collecting data, run {n}/{n_repetitions}");

        // Create the Agent and the Environment

        let mut env = *Env::new(env_config.clone())?;
        let mut alg = *Alg::from_config(
            device,
            &alg_config,
            env.observation_space().iter().product::<usize>(),
            &env.action_domain(),
        )?;

        // Maybe load model weights

        if let Some((model_path, model_name)) = &load_model {
            warn!("Loading model weights from {model_path} with name {model_name}");
            alg.load(Path::new(model_path), model_name)?;
        }

        // Train the Agent on the Environment

        let (train_returns, train_successes) = loop_off_policy(
            &mut env,
            &mut alg,
            ParamRunMode::Train(train_config.clone()),
            device,
        )?;
        alg.save(path, &format!("run_{n}"))?;

        // Maybe test the trained Agent

        let (test_returns, test_successes) = match &test_config {
            Some(test_config) => loop_off_policy(
                &mut env,
                &mut alg,
                ParamRunMode::Test(test_config.clone()),
                device,
            )?,
            None => (Vec::new(), Vec::new()),
        };

        // Write collected data to file

        let data = RunData {
            train_returns,
            train_successes,
            test_returns,
            test_successes,
        };
        write_config(&data, path.join(format!("run_{n}_data.ron")))?;
        all_data.push(data);
    }
    Ok(all_data)
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
            util::read_config,
        },
        std::fs::remove_dir_all,
    };

    fn configs() -> (PendulumConfig, DDPG_Config) {
        (
            PendulumConfig {
                timelimit: 5,
                ..Default::default()
            },
            DDPG_Config {
                hidden_1_size: 4,
                hidden_2_size: 4,
                hidden_3_size: 4,
                replay_buffer_capacity: 100,
                training_batch_size: 4,
                ..Default::default()
            },
        )
    }

    #[test]
    fn writes_configs_results_and_weights() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("ddpg_agent_experiment_{}", std::process::id()));
        let (env_config, alg_config) = configs();

        let data = run_experiment_off_policy::<DDPG, PendulumEnv>(
            &dir,
            2,
            env_config.clone(),
            alg_config,
            TrainConfig::new(2, 0, true, 1),
            Some(TestConfig::new(1)),
            None,
            &Device::Cpu,
        )?;

        assert_eq!(data.len(), 2);
        assert_eq!(read_config::<PendulumConfig>(dir.join("config_environment.ron"))?, env_config);
        for (n, run) in data.iter().enumerate() {
            assert_eq!(run.train_returns.len(), 2);
            assert_eq!(run.test_returns.len(), 1);
            assert_eq!(&read_config::<RunData>(dir.join(format!("run_{n}_data.ron")))?, run);
            assert!(dir.join(format!("run_{n}-actor.safetensors")).exists());
            assert!(dir.join(format!("run_{n}-critic.safetensors")).exists());
        }

        remove_dir_all(&dir)?;
        Ok(())
    }

    #[test]
    fn refuses_to_overwrite_an_experiment() -> Result<()> {
        let dir = std::env::temp_dir().join(format!("ddpg_agent_overwrite_{}", std::process::id()));
        let (env_config, alg_config) = configs();
        create_dir_all(&dir)?;
        write_config(&alg_config, dir.join("config_algorithm.ron"))?;

        let result = run_experiment_off_policy::<DDPG, PendulumEnv>(
            &dir,
            1,
            env_config,
            alg_config,
            TrainConfig::new(1, 0, true, 0),
            None,
            None,
            &Device::Cpu,
        );
        assert!(result.is_err());

        remove_dir_all(&dir)?;
        Ok(())
    }
}
