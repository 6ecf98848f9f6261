use {
    super::{
        Environment,
        Step,
    },
    anyhow::{
        bail,
        Result,
    },
    rand::{
        rngs::StdRng,
        Rng,
        SeedableRng,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    std::{
        f64::consts::PI,
        ops::RangeInclusive,
    },
};

fn angle_normalize(x: f64) -> f64 {
    (x + PI).rem_euclid(2.0 * PI) - PI
}

/// The inverted pendulum swing-up task.
///
/// The pendulum starts in a random position and the goal is to swing it up so
/// that it stays upright, with its center of gravity directly above the fixed
/// point. The dynamics follow the classic Gymnasium Pendulum-v1.
///
/// The observation consists of the (x, y) coordinates of the free end of the
/// pendulum and its angular velocity: \[cos(theta), sin(theta), velocity\].
///
/// The action is the torque applied to the free end: \[tau\].
#[derive(Clone)]
pub struct PendulumEnv {
    config: PendulumConfig,
    theta: f64,
    velocity: f64,
    steps: usize,
}

/// The configuration struct for the Pendulum environment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendulumConfig {
    pub timelimit: usize,
    pub gravity: f64,
    pub max_speed: f64,
    pub max_torque: f64,
    pub dt: f64,
    pub mass: f64,
    pub length: f64,
}
impl Default for PendulumConfig {
    fn default() -> Self {
        Self {
            timelimit: 200,
            gravity: 10.0,
            max_speed: 8.0,
            max_torque: 2.0,
            dt: 0.05,
            mass: 1.0,
            length: 1.0,
        }
    }
}

impl PendulumEnv {
    fn observation(&self) -> Vec<f64> {
        vec![self.theta.cos(), self.theta.sin(), self.velocity]
    }
}

impl Environment for PendulumEnv {
    type Config = PendulumConfig;

    fn config(&self) -> &Self::Config {
        &self.config
    }

    fn new(config: Self::Config) -> Result<Box<Self>> {
        if config.timelimit == 0 {
            bail!("The pendulum needs a timelimit of at least one step");
        }
        if config.max_torque <= 0.0 || config.max_speed <= 0.0 {
            bail!("The pendulum needs a positive max torque and max speed");
        }
        Ok(Box::new(Self {
            config,
            theta: PI,
            velocity: 0.0,
            steps: 0,
        }))
    }

    fn reset(
        &mut self,
        seed: u64,
    ) -> Result<Vec<f64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.theta = rng.gen_range(-PI..=PI);
        self.velocity = rng.gen_range(-1.0..=1.0);
        self.steps = 0;
        Ok(self.observation())
    }

    fn step(
        &mut self,
        action: &[f64],
    ) -> Result<Step> {
        if action.len() != 1 {
            bail!("The pendulum expects 1 action dimension, got {}", action.len());
        }
        let PendulumConfig {
            timelimit,
            gravity: g,
            max_speed,
            max_torque,
            dt,
            mass: m,
            length: l,
        } = self.config;

        let u = action[0].clamp(-max_torque, max_torque);
        let th = self.theta;
        let thdot = self.velocity;

        let cost = angle_normalize(th).powi(2) + 0.1 * thdot.powi(2) + 0.001 * u.powi(2);

        let new_thdot = (thdot + (3.0 * g / (2.0 * l) * th.sin() + 3.0 / (m * l * l) * u) * dt)
            .clamp(-max_speed, max_speed);
        self.theta = th + new_thdot * dt;
        self.velocity = new_thdot;
        self.steps += 1;

        Ok(Step {
            observation: self.observation(),
            action: vec![u],
            reward: -cost,
            terminated: false,
            truncated: self.steps >= timelimit,
        })
    }

    fn timelimit(&self) -> usize {
        self.config.timelimit
    }

    fn action_space(&self) -> Vec<usize> {
        vec![1]
    }

    fn action_domain(&self) -> Vec<RangeInclusive<f64>> {
        vec![-self.config.max_torque..=self.config.max_torque]
    }

    fn observation_space(&self) -> Vec<usize> {
        vec![3]
    }

    fn current_observation(&self) -> Vec<f64> {
        self.observation()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn observation_lies_on_the_unit_circle() -> Result<()> {
        let mut env = *PendulumEnv::new(PendulumConfig::default())?;
        let obs = env.reset(7)?;
        assert_eq!(obs.len(), 3);
        assert!((obs[0].powi(2) + obs[1].powi(2) - 1.0).abs() < 1e-12);
        assert!(obs[2].abs() <= 1.0);
        Ok(())
    }

    #[test]
    fn reset_is_reproducible() -> Result<()> {
        let mut env = *PendulumEnv::new(PendulumConfig::default())?;
        assert_eq!(env.reset(11)?, env.reset(11)?);
        Ok(())
    }

    #[test]
    fn torque_is_clamped() -> Result<()> {
        let mut env = *PendulumEnv::new(PendulumConfig::default())?;
        env.reset(0)?;
        let step = env.step(&[10.0])?;
        assert_eq!(step.action, vec![2.0]);
        Ok(())
    }

    #[test]
    fn upright_and_still_costs_nothing() -> Result<()> {
        let mut env = *PendulumEnv::new(PendulumConfig::default())?;
        env.theta = 0.0;
        env.velocity = 0.0;
        let step = env.step(&[0.0])?;
        assert_eq!(step.reward, 0.0);
        assert_eq!(env.current_observation(), vec![1.0, 0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn truncates_at_the_timelimit() -> Result<()> {
        let config = PendulumConfig {
            timelimit: 5,
            ..Default::default()
        };
        let mut env = *PendulumEnv::new(config)?;
        env.reset(0)?;
        for _ in 0..4 {
            let step = env.step(&[0.0])?;
            assert!(!step.truncated);
            assert!(step.reward <= 0.0);
        }
        let step = env.step(&[0.0])?;
        assert!(step.truncated);
        assert!(!step.terminated);
        Ok(())
    }

    #[test]
    fn rejects_wrong_action_size() -> Result<()> {
        let mut env = *PendulumEnv::new(PendulumConfig::default())?;
        env.reset(0)?;
        assert!(env.step(&[0.0, 1.0]).is_err());
        Ok(())
    }
}
