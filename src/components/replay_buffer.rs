use {
    candle_core::{
        Result,
        Tensor,
    },
    rand::{
        seq::index::sample,
        thread_rng,
    },
    std::collections::VecDeque,
    unzip_n::unzip_n,
};

unzip_n!(5);

/// A transition in the replay buffer.
///
/// # Fields
///
/// * `state` - The state tensor.
/// * `action` - The action tensor.
/// * `reward` - The reward tensor.
/// * `next_state` - The next state tensor.
/// * `done` - 1.0 if the episode terminated with this transition, else 0.0.
#[derive(Clone)]
struct Transition {
    state: Tensor,
    action: Tensor,
    reward: Tensor,
    next_state: Tensor,
    done: Tensor,
}
impl Transition {
    fn new(
        state: &Tensor,
        action: &Tensor,
        reward: &Tensor,
        next_state: &Tensor,
        done: &Tensor,
    ) -> Self {
        Self {
            state: state.detach(),
            action: action.detach(),
            reward: reward.detach(),
            next_state: next_state.detach(),
            done: done.detach(),
        }
    }
}

/// A batch of transitions, stacked along a leading batch dimension.
pub struct Batch {
    pub states: Tensor,
    pub actions: Tensor,
    pub rewards: Tensor,
    pub next_states: Tensor,
    pub dones: Tensor,
}

/// A replay buffer for off-policy algorithms.
///
/// The replay buffer is implemented as a simple ring buffer / VecDeque.
///
/// # Fields
///
/// * `buffer` - The buffer of transitions.
/// * `capacity` - The capacity of the buffer.
/// * `size` - The current size of the buffer.
#[derive(Clone)]
pub struct ReplayBuffer {
    buffer: VecDeque<Transition>,
    capacity: usize,
    size: usize,
}
impl ReplayBuffer {
    /// Create a new replay buffer with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
            size: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Check if the buffer is full.
    pub fn is_full(&self) -> bool {
        self.size == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Push a transition into the buffer.
    ///
    /// If the buffer is full, the oldest transition is removed to make room for
    /// the new transition.
    pub fn push(
        &mut self,
        state: &Tensor,
        action: &Tensor,
        reward: &Tensor,
        next_state: &Tensor,
        done: &Tensor,
    ) {
        if self.capacity == 0 {
            return;
        }
        if self.size == self.capacity {
            self.buffer.pop_front();
        } else {
            self.size += 1;
        }
        self.buffer
            .push_back(Transition::new(state, action, reward, next_state, done));
    }

    /// Sample a random batch of distinct transitions from the buffer.
    ///
    /// When the size of the buffer is less than the batch size, `None` is returned.
    pub fn random_batch(
        &self,
        batch_size: usize,
    ) -> Result<Option<Batch>> {
        if self.size < batch_size || batch_size == 0 {
            return Ok(None);
        }

        let (states, actions, rewards, next_states, dones) =
            sample(&mut thread_rng(), self.size, batch_size)
                .into_iter()
                .map(|i| {
                    let t = &self.buffer[i];
                    (
                        t.state.clone(),
                        t.action.clone(),
                        t.reward.clone(),
                        t.next_state.clone(),
                        t.done.clone(),
                    )
                })
                .unzip_n_vec();

        Ok(Some(Batch {
            states: Tensor::stack(&states, 0)?,
            actions: Tensor::stack(&actions, 0)?,
            rewards: Tensor::stack(&rewards, 0)?,
            next_states: Tensor::stack(&next_states, 0)?,
            dones: Tensor::stack(&dones, 0)?,
        }))
    }
}


#[cfg(test)]
mod tests {
    use {
        super::*,
        candle_core::Device,
        std::collections::HashSet,
    };

    fn push_numbered(
        buffer: &mut ReplayBuffer,
        n: usize,
    ) -> Result<()> {
        let device = &Device::Cpu;
        for i in 0..n {
            let x = i as f64;
            buffer.push(
                &Tensor::new(&[x, x], device)?,
                &Tensor::new(&[x], device)?,
                &Tensor::new(&[-x], device)?,
                &Tensor::new(&[x + 1.0, x + 1.0], device)?,
                &Tensor::new(&[0.0f64], device)?,
            );
        }
        Ok(())
    }

    #[test]
    fn evicts_oldest_when_full() -> Result<()> {
        let mut buffer = ReplayBuffer::new(3);
        push_numbered(&mut buffer, 5)?;

        assert!(buffer.is_full());
        assert_eq!(buffer.len(), 3);

        let kept: Vec<f64> = buffer
            .buffer
            .iter()
            .map(|t| t.action.to_vec1::<f64>().map(|v| v[0]))
            .collect::<Result<_>>()?;
        assert_eq!(kept, vec![2.0, 3.0, 4.0]);
        Ok(())
    }

    #[test]
    fn no_batch_until_enough_transitions() -> Result<()> {
        let mut buffer = ReplayBuffer::new(10);
        push_numbered(&mut buffer, 3)?;

        assert!(buffer.random_batch(4)?.is_none());
        assert!(buffer.random_batch(3)?.is_some());
        Ok(())
    }

    #[test]
    fn batches_are_stacked() -> Result<()> {
        let mut buffer = ReplayBuffer::new(10);
        push_numbered(&mut buffer, 8)?;

        let batch = buffer.random_batch(4)?.expect("enough transitions");
        assert_eq!(batch.states.dims(), &[4, 2]);
        assert_eq!(batch.actions.dims(), &[4, 1]);
        assert_eq!(batch.rewards.dims(), &[4, 1]);
        assert_eq!(batch.next_states.dims(), &[4, 2]);
        assert_eq!(batch.dones.dims(), &[4, 1]);

        // rows stay aligned across the stacked tensors
        let actions = batch.actions.squeeze(1)?.to_vec1::<f64>()?;
        let rewards = batch.rewards.squeeze(1)?.to_vec1::<f64>()?;
        for (a, r) in actions.iter().zip(rewards.iter()) {
            assert_eq!(*a, -*r);
        }
        Ok(())
    }

    #[test]
    fn samples_without_replacement() -> Result<()> {
        let mut buffer = ReplayBuffer::new(16);
        push_numbered(&mut buffer, 16)?;

        let batch = buffer.random_batch(16)?.expect("enough transitions");
        let seen: HashSet<u64> = batch
            .actions
            .squeeze(1)?
            .to_vec1::<f64>()?
            .into_iter()
            .map(|a| a as u64)
            .collect();
        assert_eq!(seen.len(), 16);
        Ok(())
    }
}
