//! Action repeat with a K-frame observation buffer.

use std::collections::VecDeque;

use ndarray::{Axis, concatenate};
use tracing::debug;

use crate::config::Resolution;
use crate::core::{Env, Frame, GymError, RenderFrame, Result, StackedFrames, Step};
use crate::spaces::BoxSpace;

/// Fixed-capacity queue of the most recent frames.
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    frames: VecDeque<Frame>,
    capacity: usize,
}

impl FrameBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "FrameBuffer requires capacity > 0");
        Self { frames: VecDeque::with_capacity(capacity), capacity }
    }

    pub fn capacity(&self) -> usize { self.capacity }
    pub fn len(&self) -> usize { self.frames.len() }
    pub fn is_empty(&self) -> bool { self.frames.is_empty() }

    /// Append a frame, evicting the oldest one once full.
    pub fn push(&mut self, frame: Frame) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    /// Drop everything and fill every slot with `frame`.
    pub fn fill(&mut self, frame: Frame) {
        self.frames.clear();
        for _ in 1..self.capacity {
            self.frames.push_back(frame.clone());
        }
        self.frames.push_back(frame);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Frame> { self.frames.iter() }

    /// Concatenate the buffered `(1, h, w)` frames, oldest first, into `(len, h, w)`.
    pub fn stack(&self) -> Result<StackedFrames> {
        if self.frames.is_empty() {
            return Err(GymError::NotReady("frame buffer is empty".into()));
        }
        let views: Vec<_> = self.frames.iter().map(|f| f.view()).collect();
        Ok(concatenate(Axis(0), &views)?)
    }
}

/// Where the stacked episode currently is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EpisodeState {
    /// No `reset` yet.
    NotStarted,
    Active,
    /// The last step reported `done`; only `reset` is valid.
    Terminal,
}

/// Repeats every action `stack_depth` times and returns the last
/// `stack_depth` frames stacked along a new leading axis, with rewards summed.
///
/// When the episode ends early the terminal frame fills the remaining slots,
/// so the output always holds exactly `stack_depth` frames.
pub struct FrameStack<E> {
    inner: E,
    buffer: FrameBuffer,
    resolution: Resolution,
    enforce_order: bool,
    state: EpisodeState,
}

impl<E> FrameStack<E>
where
    E: Env<Obs = Frame>,
    E::Act: Clone,
{
    /// # Panics
    ///
    /// If `stack_depth` is 0. `wrap_platformer` rejects that through
    /// `PipelineConfig::validate` instead.
    pub fn new(inner: E, stack_depth: usize, resolution: Resolution) -> Self {
        Self {
            inner,
            buffer: FrameBuffer::new(stack_depth),
            resolution,
            enforce_order: true,
            state: EpisodeState::NotStarted,
        }
    }

    /// With enforcement off, out-of-order `step` calls go straight to the inner env.
    pub fn with_order_enforcement(mut self, enforce: bool) -> Self {
        self.enforce_order = enforce;
        self
    }

    pub fn stack_depth(&self) -> usize { self.buffer.capacity() }

    pub fn episode_state(&self) -> EpisodeState { self.state }

    pub fn buffer(&self) -> &FrameBuffer { &self.buffer }

    pub fn observation_space(&self) -> BoxSpace {
        let Resolution { height, width } = self.resolution;
        BoxSpace::new(0.0, 255.0, vec![self.stack_depth(), height as usize, width as usize])
    }

    pub fn inner(&self) -> &E { &self.inner }
    pub fn inner_mut(&mut self) -> &mut E { &mut self.inner }
    pub fn into_inner(self) -> E { self.inner }

    fn repeat(&mut self, action: E::Act) -> Result<Step<StackedFrames>> {
        let mut last = self.inner.step(action.clone())?;
        let mut total_reward = last.reward;
        self.buffer.push(last.observation.clone());

        for _ in 1..self.buffer.capacity() {
            if !last.done {
                last = self.inner.step(action.clone())?;
                total_reward += last.reward;
            }
            self.buffer.push(last.observation.clone());
        }

        if last.done {
            self.state = EpisodeState::Terminal;
        }
        let stacked = self.buffer.stack()?;
        Ok(Step::new(stacked, total_reward, last.done, last.info))
    }

    fn check_order(&self) -> Result<()> {
        if !self.enforce_order {
            return Ok(());
        }
        match self.state {
            EpisodeState::Active => Ok(()),
            EpisodeState::NotStarted => Err(GymError::NotReady("step called before reset".into())),
            EpisodeState::Terminal => {
                Err(GymError::NotReady("episode is over; call reset before stepping again".into()))
            }
        }
    }
}

impl<E> Env for FrameStack<E>
where
    E: Env<Obs = Frame>,
    E::Act: Clone,
{
    type Obs = StackedFrames;
    type Act = E::Act;

    fn reset(&mut self) -> Result<Self::Obs> {
        let first = self.inner.reset()?;
        self.buffer.fill(first);
        self.state = EpisodeState::Active;
        debug!(stack_depth = self.buffer.capacity(), "episode reset");
        self.buffer.stack()
    }

    fn step(&mut self, action: Self::Act) -> Result<Step<Self::Obs>> {
        self.check_order()?;
        self.repeat(action).inspect_err(|err| {
            // Earlier sub-steps already advanced the inner state.
            debug!(%err, "sub-step failed; reset required");
            self.state = EpisodeState::NotStarted;
        })
    }

    fn change_level(&mut self, level: u32) -> Result<()> {
        debug!(level, "changing level");
        self.inner.change_level(level)
    }

    fn render(&self) -> Option<RenderFrame> { self.inner.render() }
    fn close(&mut self) { self.inner.close() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Info;

    /// Emits frames filled with the step index; ends after `done_after` steps.
    struct Counter {
        t: usize,
        done_after: usize,
        stepped: usize,
    }

    impl Counter {
        fn new(done_after: usize) -> Self { Self { t: 0, done_after, stepped: 0 } }
    }

    fn filled(v: f32) -> Frame { Frame::from_elem((1, 2, 3), v) }

    impl Env for Counter {
        type Obs = Frame;
        type Act = u32;

        fn reset(&mut self) -> Result<Frame> {
            self.t = 0;
            Ok(filled(-1.0))
        }

        fn step(&mut self, _action: u32) -> Result<Step<Frame>> {
            self.t += 1;
            self.stepped += 1;
            Ok(Step::new(filled(self.t as f32), 1.0, self.t >= self.done_after, Info::new()))
        }
    }

    fn slot_values(stacked: &StackedFrames) -> Vec<f32> {
        stacked.outer_iter().map(|f| f[[0, 0]]).collect()
    }

    #[test]
    fn reset_repeats_first_frame() {
        let mut env = FrameStack::new(Counter::new(100), 4, Resolution::new(2, 3));
        let obs = env.reset().unwrap();
        assert_eq!(obs.dim(), (4, 2, 3));
        assert_eq!(slot_values(&obs), vec![-1.0; 4]);
        assert_eq!(env.episode_state(), EpisodeState::Active);
    }

    #[test]
    fn step_repeats_action_and_sums_reward() {
        let mut env = FrameStack::new(Counter::new(100), 4, Resolution::new(2, 3));
        env.reset().unwrap();
        let s = env.step(0).unwrap();
        assert_eq!(slot_values(&s.observation), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.reward, 4.0);
        assert!(!s.done);
        assert_eq!(env.inner().stepped, 4);
    }

    #[test]
    fn early_termination_pads_with_terminal_frame() {
        let mut env = FrameStack::new(Counter::new(2), 4, Resolution::new(2, 3));
        env.reset().unwrap();
        let s = env.step(0).unwrap();
        assert!(s.done);
        assert_eq!(s.observation.dim(), (4, 2, 3));
        assert_eq!(slot_values(&s.observation), vec![1.0, 2.0, 2.0, 2.0]);
        assert_eq!(s.reward, 2.0);
        assert_eq!(env.inner().stepped, 2);
        assert_eq!(env.episode_state(), EpisodeState::Terminal);
    }

    #[test]
    fn stepping_out_of_order_is_refused() {
        let mut env = FrameStack::new(Counter::new(1), 2, Resolution::new(2, 3));
        assert!(matches!(env.step(0), Err(GymError::NotReady(_))));
        env.reset().unwrap();
        assert!(env.step(0).unwrap().done);
        assert!(matches!(env.step(0), Err(GymError::NotReady(_))));
        env.reset().unwrap();
        assert!(env.step(0).is_ok());
    }

    /// Fails on the given global step number.
    struct FailsOnce {
        counter: Counter,
        fail_at: usize,
    }

    impl Env for FailsOnce {
        type Obs = Frame;
        type Act = u32;

        fn reset(&mut self) -> Result<Frame> { self.counter.reset() }

        fn step(&mut self, action: u32) -> Result<Step<Frame>> {
            if self.counter.stepped + 1 == self.fail_at {
                self.counter.stepped += 1;
                return Err(GymError::MissingInfoKey("score".into()));
            }
            self.counter.step(action)
        }
    }

    #[test]
    fn failed_sub_step_requires_reset() {
        let inner = FailsOnce { counter: Counter::new(100), fail_at: 2 };
        let mut env = FrameStack::new(inner, 4, Resolution::new(2, 3));
        env.reset().unwrap();

        match env.step(0) {
            Err(GymError::MissingInfoKey(k)) => assert_eq!(k, "score"),
            other => panic!("expected MissingInfoKey, got {other:?}"),
        }
        assert_eq!(env.episode_state(), EpisodeState::NotStarted);
        assert!(matches!(env.step(0), Err(GymError::NotReady(_))));
        // the refused call never reached the inner env
        assert_eq!(env.inner().counter.stepped, 2);

        let obs = env.reset().unwrap();
        assert_eq!(slot_values(&obs), vec![-1.0; 4]);
        let s = env.step(0).unwrap();
        assert_eq!(slot_values(&s.observation), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.reward, 4.0);
    }

    #[test]
    fn unenforced_order_forwards_to_inner() {
        let mut env = FrameStack::new(Counter::new(1), 2, Resolution::new(2, 3)).with_order_enforcement(false);
        let s = env.step(0).unwrap();
        assert_eq!(s.observation.dim(), (2, 2, 3));
        let again = env.step(0).unwrap();
        assert!(again.done);
        assert_eq!(env.inner().stepped, 2);
    }

    #[test]
    #[should_panic(expected = "capacity > 0")]
    fn zero_stack_depth_panics() {
        let _ = FrameStack::new(Counter::new(1), 0, Resolution::new(2, 3));
    }

    #[test]
    fn buffer_evicts_oldest() {
        let mut b = FrameBuffer::new(2);
        assert!(b.stack().is_err());
        b.push(filled(1.0));
        b.push(filled(2.0));
        b.push(filled(3.0));
        assert_eq!(b.len(), 2);
        assert_eq!(slot_values(&b.stack().unwrap()), vec![2.0, 3.0]);
        b.fill(filled(7.0));
        assert_eq!(slot_values(&b.stack().unwrap()), vec![7.0, 7.0]);
    }
}
