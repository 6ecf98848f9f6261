use {
    anyhow::Result,
    serde::{
        de::DeserializeOwned,
        Serialize,
    },
    std::{
        fs::{
            read_to_string,
            File,
        },
        io::Write,
        path::Path,
    },
};


/// Read a RON encoded config from the given file.
pub fn read_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    Ok(ron::from_str(&read_to_string(path)?)?)
}

/// Write a config to the given file as pretty RON.
pub fn write_config<T: Serialize>(
    config: &T,
    path: impl AsRef<Path>,
) -> Result<()> {
    File::create(path)?.write_all(
        ron::ser::to_string_pretty(
            config,
            ron::ser::PrettyConfig::default(),
        )?.as_bytes()
    )?;
    Ok(())
}


#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::configs::{
            DDPG_Config,
            TrainConfig,
        },
    };

    #[test]
    fn configs_survive_a_trip_through_ron() -> Result<()> {
        let path = std::env::temp_dir().join(format!("ddpg_agent_config_{}.ron", std::process::id()));
        let config = DDPG_Config {
            ou_seed: Some(7),
            ..DDPG_Config::pendulum()
        };

        write_config(&config, &path)?;
        assert_eq!(read_config::<DDPG_Config>(&path)?, config);

        std::fs::remove_file(&path)?;
        Ok(())
    }

    #[test]
    fn reads_handwritten_configs() -> Result<()> {
        let path = std::env::temp_dir().join(format!("ddpg_agent_train_{}.ron", std::process::id()));
        std::fs::write(
            &path,
            "(max_episodes: 5, initial_random_actions: 10, learn_every_step: false, training_iterations: 3)",
        )?;

        assert_eq!(read_config::<TrainConfig>(&path)?, TrainConfig::new(5, 10, false, 3));

        std::fs::remove_file(&path)?;
        Ok(())
    }
}
