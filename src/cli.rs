use {
    crate::{
        agents::DDPG,
        configs::{
            DDPG_Config,
            TestConfig,
            TrainConfig,
        },
        engines::run_experiment_off_policy,
        envs::{
            PendulumConfig,
            PendulumEnv,
        },
        logging::setup_logging,
        util::read_config,
    },
    anyhow::Result,
    candle_core::Device,
    clap::{
        Parser,
        ValueEnum,
    },
    std::path::Path,
    tracing::{
        warn,
        Level,
    },
};


#[derive(ValueEnum, Debug, Clone)]
pub enum Env {
    Pendulum,
}

#[derive(ValueEnum, Debug, Clone)]
pub enum Loglevel {
    Error, // put these only during active debugging and then downgrade later
    Warn,  // main events in the program
    Info,  // all the little details
    None,  // don't log anything
}
impl Loglevel {
    pub fn level(&self) -> Option<Level> {
        match self {
            Loglevel::Error => Some(Level::ERROR),
            Loglevel::Warn => Some(Level::WARN),
            Loglevel::Info => Some(Level::INFO),
            Loglevel::None => None,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Setup logging
    #[arg(long, value_enum, default_value_t=Loglevel::Warn)]
    pub log: Loglevel,

    /// The environment to run.
    #[arg(long, value_enum, default_value_t=Env::Pendulum)]
    pub env: Env,

    /// Experiment name to use for logging / collecting data.
    #[arg(long)]
    pub name: String,

    /// Algorithm config.
    #[arg(long)]
    pub alg_config: Option<String>,

    /// Environment config.
    #[arg(long)]
    pub env_config: Option<String>,

    /// Train the model according to the given config.
    #[arg(long)]
    pub train_config: Option<String>,

    /// Test the trained model according to the given config.
    #[arg(long)]
    pub test_config: Option<String>,

    /// Load a pretrained model from this directory.
    #[arg(long)]
    pub load_model: Option<String>,

    /// The name the pretrained weights were saved under, e.g. `run_0` for the
    /// first run of an experiment. Defaults to the experiment name.
    #[arg(long)]
    pub model_name: Option<String>,

    /// The number of repeated, identical runs.
    #[arg(long, default_value_t = 1)]
    pub repetitions: usize,
}

/// The name of the weights to load: `<model_name>-{actor,critic}.safetensors`.
pub fn model_name(args: &Args) -> String {
    args.model_name.clone().unwrap_or_else(|| args.name.clone())
}

/// Set up logging, read the configs and run the experiment described by the
/// command line arguments. Data ends up in `data/<name>`.
pub fn run(args: Args) -> Result<()> {
    if let Some(level) = args.log.level() {
        setup_logging(
            Some(Path::new(&format!("{}.log", args.name))),
            Some(level),
            Some(level),
        )?;
    }

    let device = Device::Cpu;
    let path = Path::new("data/").join(&args.name);
    let load_model = args
        .load_model
        .clone()
        .map(|model_path| (model_path, model_name(&args)));

    match args.env {
        Env::Pendulum => {
            let env_config = match &args.env_config {
                Some(config_path) => read_config(config_path)?,
                None => PendulumConfig::default(),
            };
            let alg_config = match &args.alg_config {
                Some(config_path) => read_config(config_path)?,
                None => DDPG_Config::pendulum(),
            };
            alg_config.validate()?;
            let train_config = match &args.train_config {
                Some(config_path) => read_config(config_path)?,
                None => TrainConfig::pendulum(),
            };
            let test_config = match &args.test_config {
                Some(config_path) => Some(read_config::<TestConfig>(config_path)?),
                None => None,
            };

            let data = run_experiment_off_policy::<DDPG, PendulumEnv>(
                &path,
                args.repetitions,
                env_config,
                alg_config,
                train_config,
                test_config,
                load_model,
                &device,
            )?;

            for (n, run) in data.iter().enumerate() {
                let returns = &run.train_returns;
                warn!(
                    "Run {n} trained with avg return {:.2}",
                    returns.iter().sum::<f64>() / returns.len().max(1) as f64,
                );
            }
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_defaults() {
        let args = Args::parse_from(["ddpg_agent", "--name", "swingup"]);
        assert_eq!(args.name, "swingup");
        assert_eq!(args.repetitions, 1);
        assert!(matches!(args.env, Env::Pendulum));
        assert_eq!(args.log.level(), Some(Level::WARN));
        assert!(args.alg_config.is_none());
    }

    #[test]
    fn parses_config_paths() {
        let args = Args::parse_from([
            "ddpg_agent",
            "--name",
            "swingup",
            "--log",
            "none",
            "--alg-config",
            "ddpg.ron",
            "--test-config",
            "test.ron",
            "--repetitions",
            "3",
        ]);
        assert_eq!(args.alg_config.as_deref(), Some("ddpg.ron"));
        assert_eq!(args.test_config.as_deref(), Some("test.ron"));
        assert_eq!(args.repetitions, 3);
        assert!(args.log.level().is_none());
    }

    #[test]
    fn loads_weights_saved_by_an_earlier_experiment() {
        let args = Args::parse_from([
            "ddpg_agent",
            "--name",
            "finetune",
            "--load-model",
            "data/swingup",
            "--model-name",
            "run_0",
        ]);
        assert_eq!(args.load_model.as_deref(), Some("data/swingup"));
        assert_eq!(model_name(&args), "run_0");

        let args = Args::parse_from(["ddpg_agent", "--name", "finetune"]);
        assert_eq!(model_name(&args), "finetune");
    }
}
