use {
    super::{
        Algorithm,
        OffPolicyAlgorithm,
        RunMode,
        SaveableAlgorithm,
    },
    crate::{
        components::{
            Batch,
            OuNoise,
            ReplayBuffer,
        },
        configs::DDPG_Config,
    },
    candle_core::{
        DType,
        Device,
        Error,
        Module,
        ModuleT,
        Result,
        Tensor,
        Var,
    },
    candle_nn::{
        batch_norm,
        linear,
        ops::sigmoid,
        AdamW,
        BatchNorm,
        BatchNormConfig,
        Dropout,
        Linear,
        Optimizer,
        ParamsAdamW,
        VarBuilder,
        VarMap,
    },
    std::{
        fs::create_dir_all,
        ops::RangeInclusive,
        path::Path,
    },
    tracing::info,
};

/// Soft-update every variable under `target_prefix` towards its counterpart
/// under `network_prefix`:
///
/// `target <- tau * network + (1 - tau) * target`
///
/// This covers the batch norm running statistics as well as the weights.
fn track(
    varmap: &VarMap,
    target_prefix: &str,
    network_prefix: &str,
    tau: f64,
) -> Result<()> {
    let data = varmap
        .data()
        .lock()
        .map_err(|e| Error::Msg(format!("poisoned varmap: {e}")))?;

    for (name, target) in data.iter() {
        let Some(suffix) = name.strip_prefix(target_prefix) else {
            continue;
        };
        let network = data
            .get(&format!("{network_prefix}{suffix}"))
            .ok_or_else(|| Error::Msg(format!("no network variable to track for {name}")))?;
        target.set(&(network.affine(tau, 0.0)? + target.affine(1.0 - tau, 0.0)?)?)?;
    }
    Ok(())
}

/// The variables of the network under `prefix` that receive gradients.
fn trainable_vars(
    varmap: &VarMap,
    prefix: &str,
) -> Result<Vec<Var>> {
    Ok(varmap
        .data()
        .lock()
        .map_err(|e| Error::Msg(format!("poisoned varmap: {e}")))?
        .iter()
        .filter_map(|(name, var)| {
            (name.starts_with(prefix) && !name.contains("running_")).then_some(var.clone())
        })
        .collect())
}

/// `y = r + gamma * q_next * (1 - done)`, cut off from the graph.
fn bootstrap_targets(
    rewards: &Tensor,
    q_next: &Tensor,
    dones: &Tensor,
    gamma: f64,
) -> Result<Tensor> {
    let not_done = dones.affine(-1.0, 1.0)?;
    Ok((rewards + (q_next * not_done)?.affine(gamma, 0.0)?)?.detach())
}

/// Three `Linear -> ReLU -> BatchNorm` blocks with dropout after the second.
struct Tower {
    blocks: Vec<(Linear, BatchNorm)>,
    dropout: Dropout,
}

impl Tower {
    fn new(
        size_in: usize,
        hidden: [usize; 3],
        dropout_rate: f32,
        norm: BatchNormConfig,
        vb: VarBuilder,
    ) -> Result<Self> {
        let dims = [size_in, hidden[0], hidden[1], hidden[2]];
        let blocks = (0..3)
            .map(|i| {
                Ok((
                    linear(dims[i], dims[i + 1], vb.pp(format!("fc{i}")))?,
                    batch_norm(dims[i + 1], norm, vb.pp(format!("bn{i}")))?,
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            blocks,
            dropout: Dropout::new(dropout_rate),
        })
    }

    fn forward_t(
        &self,
        xs: &Tensor,
        train: bool,
    ) -> Result<Tensor> {
        let mut xs = xs.clone();
        for (i, (fc, bn)) in self.blocks.iter().enumerate() {
            xs = bn.forward_t(&fc.forward(&xs)?.relu()?, train)?;
            if i == 1 {
                xs = self.dropout.forward_t(&xs, train)?;
            }
        }
        Ok(xs)
    }
}

struct ActorNetwork {
    body: Tower,
    head: Linear,
}

impl ActorNetwork {
    fn new(
        size_state: usize,
        size_action: usize,
        config: &DDPG_Config,
        vb: VarBuilder,
    ) -> Result<Self> {
        let hidden = config.hidden_sizes();
        Ok(Self {
            body: Tower::new(size_state, hidden, config.dropout_rate, norm_config(config), vb.clone())?,
            head: linear(hidden[2], size_action, vb.pp("out"))?,
        })
    }

    /// Raw actions in \[0, 1\].
    fn forward_t(
        &self,
        state: &Tensor,
        train: bool,
    ) -> Result<Tensor> {
        sigmoid(&self.head.forward(&self.body.forward_t(state, train)?)?)
    }
}

struct CriticNetwork {
    states: Tower,
    actions: Tower,
    head: Linear,
}

impl CriticNetwork {
    fn new(
        size_state: usize,
        size_action: usize,
        config: &DDPG_Config,
        vb: VarBuilder,
    ) -> Result<Self> {
        let hidden = config.hidden_sizes();
        Ok(Self {
            states: Tower::new(size_state, hidden, config.dropout_rate, norm_config(config), vb.pp("state"))?,
            actions: Tower::new(size_action, hidden, config.dropout_rate, norm_config(config), vb.pp("action"))?,
            head: linear(hidden[2], 1, vb.pp("out"))?,
        })
    }

    fn forward_t(
        &self,
        state: &Tensor,
        action: &Tensor,
        train: bool,
    ) -> Result<Tensor> {
        let xs = (self.states.forward_t(state, train)? + self.actions.forward_t(action, train)?)?;
        self.head.forward(&xs.relu()?)
    }
}

fn norm_config(config: &DDPG_Config) -> BatchNormConfig {
    BatchNormConfig {
        eps: config.batch_norm_eps,
        remove_mean: true,
        affine: true,
        momentum: 0.01,
    }
}

struct Actor {
    varmap: VarMap,
    network: ActorNetwork,
    target_network: ActorNetwork,
    action_low: Tensor,
    action_high: Tensor,
    action_range: Tensor,
}

impl Actor {
    fn new(
        device: &Device,
        dtype: DType,
        size_state: usize,
        action_domain: &[RangeInclusive<f64>],
        config: &DDPG_Config,
    ) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, dtype, device);
        let size_action = action_domain.len();

        let network = ActorNetwork::new(size_state, size_action, config, vb.pp("actor"))?;
        let target_network = ActorNetwork::new(size_state, size_action, config, vb.pp("target-actor"))?;

        // this sets the two networks to be equal to each other using tau = 1.0
        track(&varmap, "target-actor.", "actor.", 1.0)?;

        let low: Vec<f64> = action_domain.iter().map(|r| *r.start()).collect();
        let high: Vec<f64> = action_domain.iter().map(|r| *r.end()).collect();
        let action_low = Tensor::new(low, device)?.to_dtype(dtype)?;
        let action_high = Tensor::new(high, device)?.to_dtype(dtype)?;
        let action_range = action_high.sub(&action_low)?;

        Ok(Self {
            varmap,
            network,
            target_network,
            action_low,
            action_high,
            action_range,
        })
    }

    fn scale(
        &self,
        raw: &Tensor,
    ) -> Result<Tensor> {
        raw.broadcast_mul(&self.action_range)?
            .broadcast_add(&self.action_low)
    }

    fn clamp(
        &self,
        actions: &Tensor,
    ) -> Result<Tensor> {
        actions.maximum(&self.action_low)?.minimum(&self.action_high)
    }

    fn forward_t(
        &self,
        state: &Tensor,
        train: bool,
    ) -> Result<Tensor> {
        self.scale(&self.network.forward_t(state, train)?)
    }

    fn target_forward(
        &self,
        state: &Tensor,
    ) -> Result<Tensor> {
        Ok(self.scale(&self.target_network.forward_t(state, false)?)?.detach())
    }

    fn track(
        &mut self,
        tau: f64,
    ) -> Result<()> {
        track(&self.varmap, "target-actor.", "actor.", tau)
    }
}

struct Critic {
    varmap: VarMap,
    network: CriticNetwork,
    target_network: CriticNetwork,
}

impl Critic {
    fn new(
        device: &Device,
        dtype: DType,
        size_state: usize,
        size_action: usize,
        config: &DDPG_Config,
    ) -> Result<Self> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, dtype, device);

        let network = CriticNetwork::new(size_state, size_action, config, vb.pp("critic"))?;
        let target_network = CriticNetwork::new(size_state, size_action, config, vb.pp("target-critic"))?;

        // this sets the two networks to be equal to each other using tau = 1.0
        track(&varmap, "target-critic.", "critic.", 1.0)?;

        Ok(Self {
            varmap,
            network,
            target_network,
        })
    }

    fn forward_t(
        &self,
        state: &Tensor,
        action: &Tensor,
        train: bool,
    ) -> Result<Tensor> {
        self.network.forward_t(state, action, train)
    }

    fn target_forward(
        &self,
        state: &Tensor,
        action: &Tensor,
    ) -> Result<Tensor> {
        Ok(self.target_network.forward_t(state, action, false)?.detach())
    }

    fn track(
        &mut self,
        tau: f64,
    ) -> Result<()> {
        track(&self.varmap, "target-critic.", "critic.", tau)
    }
}

/// The losses of a single learning step.
#[derive(Clone, Copy, Debug)]
pub struct Losses {
    pub actor: f64,
    pub critic: f64,
}

/// Deep Deterministic Policy Gradient.
///
/// The actor maps states to actions within the action domain and the critic
/// estimates their value. Both are trained from uniformly sampled replay
/// transitions and bootstrap from slowly tracking target copies of themselves.
#[allow(clippy::upper_case_acronyms)]
pub struct DDPG {
    actor: Actor,
    actor_optim: AdamW,
    critic: Critic,
    critic_optim: AdamW,
    gamma: f64,
    tau: f64,
    replay_buffer: ReplayBuffer,
    batch_size: usize,
    ou_noise: OuNoise,

    config: DDPG_Config,
    size_state: usize,
    size_action: usize,
    device: Device,
}

impl DDPG {
    pub fn new(
        device: &Device,
        config: &DDPG_Config,
        size_state: usize,
        action_domain: &[RangeInclusive<f64>],
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::Msg(format!("invalid DDPG config: {e}")))?;
        if size_state == 0 || action_domain.is_empty() {
            return Err(Error::Msg("DDPG needs a non-empty state and action space".to_owned()));
        }
        let size_action = action_domain.len();

        let actor = Actor::new(device, DType::F64, size_state, action_domain, config)?;
        let actor_optim = AdamW::new(
            trainable_vars(&actor.varmap, "actor.")?,
            ParamsAdamW {
                lr: config.actor_lr(),
                weight_decay: 0.0,
                ..Default::default()
            },
        )?;

        let critic = Critic::new(device, DType::F64, size_state, size_action, config)?;
        let critic_optim = AdamW::new(
            trainable_vars(&critic.varmap, "critic.")?,
            ParamsAdamW {
                lr: config.critic_lr(),
                weight_decay: 0.0,
                ..Default::default()
            },
        )?;

        Ok(Self {
            actor,
            actor_optim,
            critic,
            critic_optim,
            gamma: config.gamma,
            tau: config.tau,
            replay_buffer: ReplayBuffer::new(config.replay_buffer_capacity),
            batch_size: config.training_batch_size,
            ou_noise: OuNoise::new(
                config.ou_mu,
                config.ou_theta,
                config.ou_sigma,
                size_action,
                config.ou_seed,
                device,
            )?,
            config: config.clone(),
            size_state,
            size_action,
            device: device.clone(),
        })
    }

    /// The noiseless action of the local actor for a single state.
    pub fn actor_forward_item(
        &self,
        state: &Tensor,
    ) -> Result<Tensor> {
        self.actor
            .forward_t(&state.detach().unsqueeze(0)?, false)?
            .squeeze(0)
    }

    /// The local critic's value of a single state-action pair.
    pub fn critic_forward_item(
        &self,
        state: &Tensor,
        action: &Tensor,
    ) -> Result<Tensor> {
        self.critic
            .forward_t(
                &state.detach().unsqueeze(0)?,
                &action.detach().unsqueeze(0)?,
                false,
            )?
            .squeeze(0)
    }

    pub fn new_buffer(&mut self, buffer_capacity: usize) {
        self.replay_buffer = ReplayBuffer::new(buffer_capacity);
    }

    pub fn size_state(&self) -> usize {
        self.size_state
    }

    pub fn size_action(&self) -> usize {
        self.size_action
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Store a transition and learn from a sampled batch once the buffer holds
    /// more transitions than one batch.
    pub fn step(
        &mut self,
        state: &Tensor,
        action: &Tensor,
        reward: &Tensor,
        next_state: &Tensor,
        done: &Tensor,
    ) -> Result<Option<Losses>> {
        self.remember(state, action, reward, next_state, done);
        self.train()
    }

    /// Update the critic, then the actor, from one batch of transitions and
    /// move both target networks towards their local networks.
    pub fn learn(
        &mut self,
        batch: &Batch,
    ) -> Result<Losses> {
        let Batch {
            states,
            actions,
            rewards,
            next_states,
            dones,
        } = batch;

        // Q_targets_next = critic_target(next_state, actor_target(next_state))
        let next_actions = self.actor.target_forward(next_states)?;
        let q_next = self.critic.target_forward(next_states, &next_actions)?;
        let q_target = bootstrap_targets(rewards, &q_next, dones, self.gamma)?;

        let q = self.critic.forward_t(states, actions, true)?;
        let critic_loss = (q - q_target)?.sqr()?.mean_all()?;
        self.critic_optim.backward_step(&critic_loss)?;

        // dQ/da is taken at the actor's own actions. Only the actor's
        // variables are stepped, so the critic is left untouched.
        let actor_loss = self
            .critic
            .forward_t(states, &self.actor.forward_t(states, true)?, false)?
            .mean_all()?
            .neg()?;
        self.actor_optim.backward_step(&actor_loss)?;

        self.soft_update()?;

        Ok(Losses {
            actor: actor_loss.to_scalar::<f64>()?,
            critic: critic_loss.to_scalar::<f64>()?,
        })
    }

    /// Move both target networks towards their local networks by `tau`.
    pub fn soft_update(&mut self) -> Result<()> {
        self.critic.track(self.tau)?;
        self.actor.track(self.tau)
    }
}

impl Algorithm for DDPG {
    type Config = DDPG_Config;

    fn config(&self) -> &DDPG_Config {
        &self.config
    }

    fn from_config(
        device: &Device,
        config: &DDPG_Config,
        size_state: usize,
        action_domain: &[RangeInclusive<f64>],
    ) -> Result<Box<Self>> {
        Ok(Box::new(Self::new(device, config, size_state, action_domain)?))
    }

    fn actions(
        &mut self,
        state: &Tensor,
        mode: RunMode,
    ) -> Result<Tensor> {
        // Candle assumes a batch dimension, so when we don't have one we need
        // to pretend we do by un- and resqueezing the state tensor.
        let actions = self.actor_forward_item(state)?;
        let actions = match mode {
            RunMode::Train => (actions + self.ou_noise.sample()?)?,
            RunMode::Test => actions,
        };
        self.actor.clamp(&actions)
    }

    fn train(&mut self) -> Result<Option<Losses>> {
        if self.replay_buffer.len() <= self.batch_size {
            return Ok(None);
        }
        match self.replay_buffer.random_batch(self.batch_size)? {
            Some(batch) => self.learn(&batch).map(Some),
            None => Ok(None),
        }
    }

    fn reset_episode(&mut self) {
        self.ou_noise.reset();
    }
}

impl OffPolicyAlgorithm for DDPG {
    fn remember(
        &mut self,
        state: &Tensor,
        action: &Tensor,
        reward: &Tensor,
        next_state: &Tensor,
        done: &Tensor,
    ) {
        info!(
            concat!(
                "\nPushing to replay buffer:",
                "\n{state:?}",
                "\n{action:?}",
                "\n{reward:?}",
                "\n{next_state:?}",
                "\n{done:?}",
            ),
            state = state,
            action = action,
            reward = reward,
            next_state = next_state,
            done = done,
        );
        self.replay_buffer
            .push(state, action, reward, next_state, done)
    }

    fn replay_buffer(&self) -> &ReplayBuffer {
        &self.replay_buffer
    }
}

impl SaveableAlgorithm for DDPG {
    fn save<P: AsRef<Path> + ?Sized>(
        &self,
        path: &P,
        name: &str,
    ) -> Result<()> {
        let path = path.as_ref();
        create_dir_all(path)?;
        self.actor.varmap.save(path.join(format!("{name}-actor.safetensors")))?;
        self.critic.varmap.save(path.join(format!("{name}-critic.safetensors")))
    }

    fn load<P: AsRef<Path> + ?Sized>(
        &mut self,
        path: &P,
        name: &str,
    ) -> Result<()> {
        let path = path.as_ref();
        self.actor.varmap.load(path.join(format!("{name}-actor.safetensors")))?;
        self.critic.varmap.load(path.join(format!("{name}-critic.safetensors")))
    }
}
