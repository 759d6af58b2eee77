//! Observation standardization with exponentially decayed, bias-corrected
//! running statistics of the per-frame mean and standard deviation.
//!
//! The statistics live as long as the normalizer; episode resets do not clear
//! them, so they describe the whole run.

use tracing::trace;

use crate::config::NormalizerConfig;
use crate::core::{Env, Frame, RenderFrame, Result, Step};

/// Running statistics owned by one normalizer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NormalizerState {
    pub running_mean: f64,
    pub running_std: f64,
    pub step_count: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObservationNormalizer {
    alpha: f64,
    epsilon: f64,
    state: NormalizerState,
}

impl ObservationNormalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { alpha: config.alpha, epsilon: config.epsilon, state: NormalizerState::default() }
    }

    pub fn state(&self) -> &NormalizerState { &self.state }

    /// Normalize a frame if there is one; an absent frame passes through and
    /// leaves the statistics untouched.
    pub fn normalize(&mut self, frame: Option<Frame>) -> Option<Frame> {
        frame.map(|f| self.normalize_frame(&f))
    }

    /// Fold `frame` into the running statistics and standardize it.
    pub fn normalize_frame(&mut self, frame: &Frame) -> Frame {
        let wide = frame.mapv(f64::from);
        let mean = wide.mean().unwrap_or(0.0);
        let std = wide.std(0.0);

        let a = self.alpha;
        let s = &mut self.state;
        s.step_count += 1;
        s.running_mean = s.running_mean * a + mean * (1.0 - a);
        s.running_std = s.running_std * a + std * (1.0 - a);

        let correction = 1.0 - a.powf(s.step_count as f64);
        let unbiased_mean = s.running_mean / correction;
        let unbiased_std = s.running_std / correction;
        trace!(step = s.step_count, unbiased_mean, unbiased_std, "observation statistics");

        let scale = unbiased_std + self.epsilon;
        frame.mapv(|v| ((f64::from(v) - unbiased_mean) / scale) as f32)
    }
}

impl Default for ObservationNormalizer {
    fn default() -> Self { Self::new(NormalizerConfig::default()) }
}

/// Standardizes every frame produced by the inner environment, including the
/// first frame of each episode.
pub struct NormalizeObservation<E> {
    inner: E,
    normalizer: ObservationNormalizer,
}

impl<E: Env<Obs = Frame>> NormalizeObservation<E> {
    pub fn new(inner: E, config: NormalizerConfig) -> Self {
        Self { inner, normalizer: ObservationNormalizer::new(config) }
    }

    pub fn normalizer(&self) -> &ObservationNormalizer { &self.normalizer }

    pub fn inner(&self) -> &E { &self.inner }
    pub fn inner_mut(&mut self) -> &mut E { &mut self.inner }
    pub fn into_inner(self) -> E { self.inner }
}

impl<E: Env<Obs = Frame>> Env for NormalizeObservation<E> {
    type Obs = Frame;
    type Act = E::Act;

    fn reset(&mut self) -> Result<Self::Obs> {
        let obs = self.inner.reset()?;
        Ok(self.normalizer.normalize_frame(&obs))
    }

    fn step(&mut self, action: Self::Act) -> Result<Step<Self::Obs>> {
        let s = self.inner.step(action)?;
        let obs = self.normalizer.normalize_frame(&s.observation);
        Ok(Step::new(obs, s.reward, s.done, s.info))
    }

    fn change_level(&mut self, level: u32) -> Result<()> { self.inner.change_level(level) }
    fn render(&self) -> Option<RenderFrame> { self.inner.render() }
    fn close(&mut self) { self.inner.close() }
}
