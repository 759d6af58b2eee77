//! Raw frame reduction and the wrapper that pairs it with reward shaping.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};
use ndarray::{Array2, Array3};
use tracing::debug;

use crate::config::{RewardConfig, Resolution};
use crate::core::{Env, Frame, GymError, Observation, RawFrame, RenderFrame, Result, Step, StepInfo};
use crate::spaces::BoxSpace;
use crate::wrappers::reward::RewardShaper;

/// ITU-R 601 luma weights for R, G and B.
pub const LUMA_WEIGHTS: [f32; 3] = [0.299, 0.587, 0.114];

/// Collapse an H x W x C frame (C >= 3) to its luminance, on the 0..255 scale.
pub fn luminance(raw: &RawFrame) -> Result<Array2<f32>> {
    let (h, w, c) = raw.dim();
    if h == 0 || w == 0 || c < 3 {
        return Err(GymError::InvalidObservation(format!(
            "expected an HxWx3 colour frame, got {h}x{w}x{c}"
        )));
    }
    let [wr, wg, wb] = LUMA_WEIGHTS;
    Ok(Array2::from_shape_fn((h, w), |(y, x)| {
        f32::from(raw[[y, x, 0]]) * wr + f32::from(raw[[y, x, 1]]) * wg + f32::from(raw[[y, x, 2]]) * wb
    }))
}

/// Turn a raw frame into a `(1, height, width)` grayscale frame.
///
/// An absent frame yields zeros of the target shape.
pub fn reduce_frame(frame: Option<&RawFrame>, resolution: Resolution) -> Result<Frame> {
    let (th, tw) = (resolution.height as usize, resolution.width as usize);
    let Some(raw) = frame else {
        debug!("absent frame replaced by zeros");
        return Ok(Frame::zeros((1, th, tw)));
    };

    let gray = luminance(raw)?;
    let (h, w) = gray.dim();
    // Float resampling in `image` clamps to [0, 1].
    let unit: Vec<f32> = gray.iter().map(|v| v / 255.0).collect();
    let buffer: ImageBuffer<Luma<f32>, Vec<f32>> = ImageBuffer::from_raw(w as u32, h as u32, unit)
        .ok_or_else(|| GymError::InvalidObservation(format!("cannot view {h}x{w} luminance as an image")))?;
    let resized = imageops::resize(&buffer, resolution.width, resolution.height, FilterType::Triangle);
    let data: Vec<f32> = resized.into_raw().into_iter().map(|v| v * 255.0).collect();
    Ok(Array3::from_shape_vec((1, th, tw), data)?)
}

/// Replaces the collaborator's reward with the shaped reward and its frames
/// with reduced grayscale frames.
///
/// Every step info must carry `distance`, `time`, `player_status` and `score`.
pub struct ProcessFrame<E> {
    inner: E,
    resolution: Resolution,
    shaper: RewardShaper,
}

impl<E> ProcessFrame<E>
where
    E: Env<Obs = Observation>,
{
    pub fn new(inner: E, resolution: Resolution, reward: RewardConfig) -> Self {
        Self { inner, resolution, shaper: RewardShaper::new(reward) }
    }

    /// Bounds of a single reduced frame.
    pub fn observation_space(&self) -> BoxSpace {
        let Resolution { height, width } = self.resolution;
        BoxSpace::new(0.0, 255.0, vec![1, height as usize, width as usize])
    }

    pub fn shaper(&self) -> &RewardShaper { &self.shaper }

    pub fn inner(&self) -> &E { &self.inner }
    pub fn inner_mut(&mut self) -> &mut E { &mut self.inner }
    pub fn into_inner(self) -> E { self.inner }
}

impl<E> Env for ProcessFrame<E>
where
    E: Env<Obs = Observation>,
{
    type Obs = Frame;
    type Act = E::Act;

    fn reset(&mut self) -> Result<Self::Obs> {
        self.shaper.reset();
        let obs = self.inner.reset()?;
        reduce_frame(obs.as_ref(), self.resolution)
    }

    fn step(&mut self, action: Self::Act) -> Result<Step<Self::Obs>> {
        let s = self.inner.step(action)?;
        // Validate everything before the shaper state moves.
        let counters = StepInfo::from_info(&s.info)?;
        let frame = reduce_frame(s.observation.as_ref(), self.resolution)?;
        let reward = self.shaper.shape(&counters, s.done);
        Ok(Step::new(frame, reward, s.done, s.info))
    }

    fn change_level(&mut self, level: u32) -> Result<()> { self.inner.change_level(level) }
    fn render(&self) -> Option<RenderFrame> { self.inner.render() }
    fn close(&mut self) { self.inner.close() }
}
