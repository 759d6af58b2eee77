use platformer_wrappers::envs::SyntheticPlatformer;
use platformer_wrappers::registry::SYNTHETIC_ID;
use platformer_wrappers::utils::{instance_seed, rng_from_seed};
use platformer_wrappers::{Env, KwArgs, PipelineConfig, Space, make, save_frame_png};
use tracing::info;

fn main() -> platformer_wrappers::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Options arrive as key=value pairs, e.g. `stack_depth=4 alpha=0.999`.
    let kwargs: KwArgs = std::env::args()
        .skip(1)
        .filter_map(|arg| arg.split_once('=').map(|(k, v)| (k.to_string(), v.to_string())))
        .collect();
    let config = PipelineConfig::from_kwargs(&kwargs)?;

    let mut env = make(SYNTHETIC_ID, &config)?;
    let actions = SyntheticPlatformer::action_space();
    let mut rng = rng_from_seed(instance_seed(123, 0));

    for episode in 0..3 {
        env.reset()?;
        let mut episode_return = 0.0;
        let mut steps = 0u32;
        loop {
            let s = env.step(actions.sample(&mut rng))?;
            episode_return += s.reward;
            steps += 1;
            if s.done {
                break;
            }
        }
        info!(episode, steps, episode_return, "episode finished");
    }

    let newest = obs_slot(&env.reset()?, config.stack_depth - 1);
    let path = std::env::temp_dir().join("platformer_frame.png");
    save_frame_png(&path, &newest)?;
    info!(path = %path.display(), "wrote processed frame");
    Ok(())
}

fn obs_slot(stacked: &platformer_wrappers::StackedFrames, slot: usize) -> platformer_wrappers::Frame {
    stacked
        .index_axis(ndarray::Axis(0), slot)
        .to_owned()
        .insert_axis(ndarray::Axis(0))
}
