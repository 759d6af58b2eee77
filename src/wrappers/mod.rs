// Wrappers composing the platformer preprocessing chain.
//
// Applied innermost first:
// - ProcessFrame: reward shaping + grayscale/resize of raw frames
// - NormalizeObservation: running mean/std standardization
// - FrameStack: action repeat and K-frame stacking

pub mod frame_stack;
pub mod normalize;
pub mod process_frame;
pub mod reward;

pub use frame_stack::{EpisodeState, FrameBuffer, FrameStack};
pub use normalize::{NormalizeObservation, NormalizerState, ObservationNormalizer};
pub use process_frame::{LUMA_WEIGHTS, ProcessFrame, luminance, reduce_frame};
pub use reward::RewardShaper;
