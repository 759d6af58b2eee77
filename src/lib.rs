pub mod core;
pub mod config;
pub mod spaces;
pub mod utils;
pub mod envs;
pub mod wrappers;
pub mod pipeline;
pub mod registry;
pub mod vector;

pub use crate::core::{
    Action, Env, Frame, GymError, Info, InfoValue, Observation, RawFrame, RenderFrame, Result, StackedFrames, Step,
    StepInfo,
};
pub use crate::config::{KwArgs, NormalizerConfig, PipelineConfig, Resolution, RewardConfig, ShaperState};
pub use crate::spaces::{BoxSpace, Discrete, Space};
pub use crate::envs::SyntheticPlatformer;
pub use crate::wrappers::{
    EpisodeState, FrameBuffer, FrameStack, NormalizeObservation, NormalizerState, ObservationNormalizer, ProcessFrame,
    RewardShaper, reduce_frame,
};
pub use crate::pipeline::{Pipeline, wrap_platformer};
pub use crate::registry::{EnvSpec, make, make_raw, register};
pub use crate::utils::{encode_png, frame_to_png, save_frame_png, save_png};
pub use crate::vector::SyncVectorEnv;

#[cfg(test)]
mod tests {
    use super::*;

    /// A collaborator that walks right one unit per step and never renders.
    struct WalkEnv {
        distance: i64,
        time: i64,
    }

    impl Env for WalkEnv {
        type Obs = Observation;
        type Act = Action;

        fn reset(&mut self) -> Result<Observation> {
            self.distance = 40;
            self.time = 400;
            Ok(None)
        }

        fn step(&mut self, _action: Action) -> Result<Step<Observation>> {
            self.distance += 1;
            self.time -= 1;
            let info = Info::new()
                .with("distance", self.distance)
                .with("time", self.time)
                .with("player_status", 0)
                .with("score", 0);
            Ok(Step::new(None, 1.0, false, info))
        }
    }

    #[test]
    fn walk_env_through_pipeline() {
        let mut env = wrap_platformer(WalkEnv { distance: 0, time: 0 }, &PipelineConfig::default()).unwrap();
        let obs = env.reset().unwrap();
        assert_eq!(obs.dim(), (4, 84, 84));
        let s = env.step(0).unwrap();
        assert!((s.reward - 3.6).abs() < 1e-9, "reward {}", s.reward);
        assert!(!s.done);
        // absent frames are reduced to zeros and stay zero after normalization
        assert!(s.observation.iter().all(|&v| v == 0.0));
        assert!(matches!(env.change_level(1), Err(GymError::NotSupported(_))));
    }

    #[test]
    fn discrete_and_box_spaces() {
        let mut rng = utils::rng_from_seed(42);
        let d = Discrete::new(5);
        for _ in 0..100 {
            let v = d.sample(&mut rng);
            assert!(d.contains(&v));
        }

        let b = BoxSpace::new(-1.0, 1.0, vec![2, 3]);
        for _ in 0..20 {
            let v = b.sample(&mut rng);
            assert!(b.contains(&v));
        }
    }
}
