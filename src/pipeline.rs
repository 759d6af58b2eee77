//! The full platformer preprocessing chain.

use tracing::debug;

use crate::config::PipelineConfig;
use crate::core::{Env, Observation, Result};
use crate::wrappers::{FrameStack, NormalizeObservation, ProcessFrame};

/// Reward shaping and frame reduction, then normalization, then stacking.
pub type Pipeline<E> = FrameStack<NormalizeObservation<ProcessFrame<E>>>;

/// Wrap a stepping collaborator in the complete pipeline.
///
/// Each call builds independent shaper, normalizer and frame buffer state, so
/// parallel rollouts need one pipeline per collaborator.
pub fn wrap_platformer<E>(env: E, config: &PipelineConfig) -> Result<Pipeline<E>>
where
    E: Env<Obs = Observation>,
    E::Act: Clone,
{
    config.validate()?;
    debug!(
        height = config.resolution.height,
        width = config.resolution.width,
        stack_depth = config.stack_depth,
        alpha = config.normalizer.alpha,
        "building platformer pipeline"
    );
    let processed = ProcessFrame::new(env, config.resolution, config.reward);
    let normalized = NormalizeObservation::new(processed, config.normalizer);
    Ok(FrameStack::new(normalized, config.stack_depth, config.resolution)
        .with_order_enforcement(config.enforce_order))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Resolution;
    use crate::core::GymError;
    use crate::envs::SyntheticPlatformer;
    use crate::envs::synthetic::RIGHT;
    use crate::spaces::Space;

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = PipelineConfig::default();
        config.stack_depth = 0;
        let err = wrap_platformer(SyntheticPlatformer::default(), &config).err();
        assert!(matches!(err, Some(GymError::InvalidConfig(_))));
    }

    #[test]
    fn synthetic_rollout_has_stacked_shape() {
        let mut env = wrap_platformer(SyntheticPlatformer::new(1), &PipelineConfig::default()).unwrap();
        let obs = env.reset().unwrap();
        assert_eq!(obs.dim(), (4, 84, 84));
        let s = env.step(RIGHT).unwrap();
        assert_eq!(s.observation.dim(), (4, 84, 84));
        assert_eq!(env.observation_space().shape(), &[4, 84, 84]);
        // one reset frame plus up to four repeated steps
        let seen = env.inner().normalizer().state().step_count;
        assert!((2..=5).contains(&seen), "normalizer saw {seen} frames");

        let space = env.inner().inner().observation_space();
        let raw = env.inner().inner().inner().frame().unwrap();
        let reduced = crate::wrappers::reduce_frame(Some(&raw), Resolution::default()).unwrap();
        assert!(space.contains(&reduced.into_dyn()));
    }

    #[test]
    fn change_level_reaches_collaborator() {
        let mut env = wrap_platformer(SyntheticPlatformer::new(1), &PipelineConfig::default()).unwrap();
        env.change_level(3).unwrap();
        assert_eq!(env.inner().inner().inner().level(), 3);
    }
}
