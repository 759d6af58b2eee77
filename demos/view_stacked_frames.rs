use minifb::{Key, Window, WindowOptions};
use platformer_wrappers::envs::SyntheticPlatformer;
use platformer_wrappers::utils::{frame_to_gray8, rng_from_seed};
use platformer_wrappers::{Env, PipelineConfig, Space, StackedFrames, wrap_platformer};

const SCALE: usize = 3;

fn gray_to_u32(v: u8) -> u32 {
    // Minifb expects 0RGB.
    let v = v as u32;
    (v << 16) | (v << 8) | v
}

/// Lay the K stacked frames side by side, each min-max scaled on its own.
fn paint(stacked: &StackedFrames, buffer: &mut [u32], width: usize) {
    let (_, h, w) = stacked.dim();
    for (k, frame) in stacked.outer_iter().enumerate() {
        let gray = frame_to_gray8(frame.iter().copied());
        for y in 0..h * SCALE {
            for x in 0..w * SCALE {
                let v = gray[(y / SCALE) * w + x / SCALE];
                buffer[y * width + k * w * SCALE + x] = gray_to_u32(v);
            }
        }
    }
}

fn main() -> platformer_wrappers::Result<()> {
    tracing_subscriber::fmt::init();

    let config = PipelineConfig::default();
    let mut env = wrap_platformer(SyntheticPlatformer::new(7), &config)?;
    let (h, w) = (config.resolution.height as usize, config.resolution.width as usize);
    let (width, height) = (w * SCALE * config.stack_depth, h * SCALE);

    let mut window = Window::new("platformer-wrappers: stacked frames", width, height, WindowOptions::default())
        .expect("Unable to open window");
    let mut buffer: Vec<u32> = vec![0; width * height];

    let actions = SyntheticPlatformer::action_space();
    let mut rng = rng_from_seed(7);
    let mut obs = env.reset()?;

    while window.is_open() && !window.is_key_down(Key::Escape) {
        paint(&obs, &mut buffer, width);
        window.update_with_buffer(&buffer, width, height).expect("Failed to update window buffer");

        let s = env.step(actions.sample(&mut rng))?;
        obs = if s.done { env.reset()? } else { s.observation };
    }
    Ok(())
}
