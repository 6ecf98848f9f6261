use {
    candle_core::{
        DType,
        Device,
        Result,
        Tensor,
    },
    rand::{
        rngs::StdRng,
        SeedableRng,
    },
    rand_distr::{
        Distribution,
        StandardNormal,
    },
};

/// The Ornstein-Uhlenbeck process.
///
/// Produces temporally correlated noise that drifts back towards `mu`:
///
/// `x <- x + theta * (mu - x) + sigma * N(0, I)`
///
/// # Fields
///
/// * `mu` - The long-running mean, one entry per action dimension.
/// * `theta` - The speed of mean reversion.
/// * `sigma` - The volatility.
/// * `state` - The current state of the process.
pub struct OuNoise {
    mu: Tensor,
    theta: f64,
    sigma: f64,
    state: Tensor,
    rng: StdRng,
}
impl OuNoise {
    pub fn new(
        mu: f64,
        theta: f64,
        sigma: f64,
        size_action: usize,
        seed: Option<u64>,
        device: &Device,
    ) -> Result<Self> {
        let mu = Tensor::ones(size_action, DType::F64, device)?.affine(mu, 0.0)?;
        Ok(Self {
            state: mu.clone(),
            mu,
            theta,
            sigma,
            rng: match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            },
        })
    }

    /// Reset the internal state to the mean.
    pub fn reset(&mut self) {
        self.state = self.mu.clone();
    }

    /// Advance the process by one step and return the new state.
    pub fn sample(&mut self) -> Result<Tensor> {
        let rand: Vec<f64> = StandardNormal
            .sample_iter(&mut self.rng)
            .take(self.state.elem_count())
            .collect();
        let rand = Tensor::from_vec(rand, self.state.dims(), self.state.device())?;

        let dx = (self.mu.sub(&self.state)?.affine(self.theta, 0.0)? + rand.affine(self.sigma, 0.0)?)?;
        self.state = (&self.state + dx)?;
        Ok(self.state.clone())
    }

    pub fn state(&self) -> &Tensor {
        &self.state
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_the_mean() -> Result<()> {
        let noise = OuNoise::new(0.5, 0.15, 0.2, 3, Some(0), &Device::Cpu)?;
        assert_eq!(noise.state().to_vec1::<f64>()?, vec![0.5, 0.5, 0.5]);
        Ok(())
    }

    #[test]
    fn without_volatility_the_mean_is_a_fixed_point() -> Result<()> {
        let mut noise = OuNoise::new(-1.0, 0.15, 0.0, 2, Some(0), &Device::Cpu)?;
        for _ in 0..10 {
            assert_eq!(noise.sample()?.to_vec1::<f64>()?, vec![-1.0, -1.0]);
        }
        Ok(())
    }

    #[test]
    fn reverts_to_the_mean() -> Result<()> {
        let mut noise = OuNoise::new(0.0, 0.5, 0.0, 1, Some(0), &Device::Cpu)?;
        noise.state = Tensor::new(&[4.0f64], &Device::Cpu)?;

        assert_eq!(noise.sample()?.to_vec1::<f64>()?, vec![2.0]);
        assert_eq!(noise.sample()?.to_vec1::<f64>()?, vec![1.0]);
        Ok(())
    }

    #[test]
    fn reset_restores_the_mean() -> Result<()> {
        let mut noise = OuNoise::new(0.0, 0.15, 0.2, 4, Some(1), &Device::Cpu)?;
        for _ in 0..5 {
            noise.sample()?;
        }
        assert_ne!(noise.state().to_vec1::<f64>()?, vec![0.0; 4]);

        noise.reset();
        assert_eq!(noise.state().to_vec1::<f64>()?, vec![0.0; 4]);
        Ok(())
    }

    #[test]
    fn seeded_processes_agree() -> Result<()> {
        let mut a = OuNoise::new(0.0, 0.15, 0.2, 2, Some(42), &Device::Cpu)?;
        let mut b = OuNoise::new(0.0, 0.15, 0.2, 2, Some(42), &Device::Cpu)?;
        for _ in 0..3 {
            assert_eq!(a.sample()?.to_vec1::<f64>()?, b.sample()?.to_vec1::<f64>()?);
        }
        Ok(())
    }
}
