pub mod rng;
pub mod render;
pub mod render2d;

pub use rng::{RngStream, instance_seed, level_stream, rng_from_seed, rollout_seeds};
pub use render::{encode_png, frame_to_gray8, frame_to_png, save_frame_png, save_png};
pub use render2d::{Canvas, Color, BLACK, BRICK, COIN, GROUND, PLAYER, SKY, WHITE};
