// Vectorized rollouts: N independent pipelines stepped in a loop on the
// calling thread. Each copy owns all of its shaping, normalization and
// stacking state; nothing is shared between them.

use crate::core::{Env, RenderFrame, Result, Step};

/// Runs N copies of an environment in the current thread.
///
/// - Construct with `SyncVectorEnv::new(n, |i| wrap_platformer(make_env(i), &config))`
/// - Step with a batch of actions: `step_all(actions)`
/// - Reset all envs: `reset_all()`
pub struct SyncVectorEnv<E: Env> {
    envs: Vec<E>,
}

impl<E: Env> SyncVectorEnv<E> {
    /// Create N copies; the factory receives the index of the copy.
    pub fn new<F>(n: usize, mut factory: F) -> Result<Self>
    where
        F: FnMut(usize) -> Result<E>,
    {
        let envs = (0..n).map(&mut factory).collect::<Result<Vec<_>>>()?;
        Ok(Self { envs })
    }

    pub fn len(&self) -> usize { self.envs.len() }
    pub fn is_empty(&self) -> bool { self.envs.is_empty() }

    pub fn reset_all(&mut self) -> Result<Vec<E::Obs>> {
        self.envs.iter_mut().map(|e| e.reset()).collect()
    }

    /// Step all environments with a batch of actions.
    /// The length of `actions` must equal `self.len()`.
    pub fn step_all(&mut self, actions: Vec<E::Act>) -> Result<Vec<Step<E::Obs>>> {
        assert_eq!(actions.len(), self.envs.len(), "actions len must match envs len");
        self.envs
            .iter_mut()
            .zip(actions)
            .map(|(e, a)| e.step(a))
            .collect()
    }

    pub fn change_level_all(&mut self, level: u32) -> Result<()> {
        self.envs.iter_mut().try_for_each(|e| e.change_level(level))
    }

    pub fn render_all(&self) -> Vec<Option<RenderFrame>> {
        self.envs.iter().map(|e| e.render()).collect()
    }

    pub fn close_all(&mut self) {
        for e in &mut self.envs { e.close(); }
    }

    pub fn envs(&self) -> &[E] { &self.envs }
    pub fn envs_mut(&mut self) -> &mut [E] { &mut self.envs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GymError, Info};

    #[derive(Default)]
    struct DummyEnv { s: i32 }

    impl Env for DummyEnv {
        type Obs = i32;
        type Act = i32;
        fn reset(&mut self) -> Result<i32> { self.s = 0; Ok(self.s) }
        fn step(&mut self, a: i32) -> Result<Step<i32>> {
            self.s += a;
            Ok(Step::new(self.s, 1.0, self.s >= 5, Info::new()))
        }
        fn render(&self) -> Option<RenderFrame> { Some(RenderFrame::Text(format!("s={}", self.s))) }
    }

    #[test]
    fn vector_env_runs_batch() {
        let mut v = SyncVectorEnv::new(3, |_| Ok(DummyEnv::default())).unwrap();
        assert_eq!(v.reset_all().unwrap(), vec![0, 0, 0]);
        let steps = v.step_all(vec![1, 2, 3]).unwrap();
        let obs: Vec<i32> = steps.iter().map(|s| s.observation).collect();
        assert_eq!(obs, vec![1, 2, 3]);
        assert_eq!(v.render_all().len(), 3);
        // DummyEnv keeps the default level handling
        assert!(matches!(v.change_level_all(1), Err(GymError::NotSupported(_))));
        v.close_all();
    }

    #[test]
    fn factory_errors_propagate() {
        let built = SyncVectorEnv::<DummyEnv>::new(2, |i| {
            if i == 1 { Err(GymError::InvalidConfig("boom".into())) } else { Ok(DummyEnv::default()) }
        });
        assert!(built.is_err());
    }
}
