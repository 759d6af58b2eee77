use rand::Rng;
use tracing::debug;

use crate::core::{Action, Env, Info, InfoValue, Observation, RawFrame, RenderFrame, Result, Step, StepInfo};
use crate::spaces::Discrete;
use crate::utils::render2d::{BRICK, COIN, Canvas, Color, GROUND, PLAYER, SKY};
use crate::utils::rng::{RngStream, level_stream};

pub const FRAME_HEIGHT: u32 = 224;
pub const FRAME_WIDTH: u32 = 256;

pub const NOOP: Action = 0;
pub const RIGHT: Action = 1;
pub const RIGHT_JUMP: Action = 2;
pub const LEFT: Action = 3;

/// A small side-scrolling stand-in for an emulated platformer.
///
/// Frames: 224x256 RGB, or `None` when `emit_frames` is off.
/// Actions: Discrete(4) {0: noop, 1: right, 2: right + jump, 3: left}
/// Info: `distance`, `time`, `player_status`, `score`, `level`, `life`
/// Raw reward: signed horizontal movement of the step.
/// The episode ends when the player reaches `goal_distance`, the clock runs
/// out, or a hazard hits a small player.
pub struct SyntheticPlatformer {
    distance: f64,
    time: f64,
    player_status: u8,
    score: u64,
    level: u32,
    steps: u32,
    alive: bool,

    pub goal_distance: f64,
    /// Steps per unit of in-game time.
    pub steps_per_tick: u32,
    pub emit_frames: bool,
    /// Report the terminal observation as absent.
    pub absent_terminal_frame: bool,

    seed: u64,
    rng: RngStream,
}

impl Default for SyntheticPlatformer {
    fn default() -> Self { Self::new(1_234_567) }
}

impl SyntheticPlatformer {
    pub fn new(seed: u64) -> Self {
        Self {
            distance: 40.0,
            time: 400.0,
            player_status: 0,
            score: 0,
            level: 0,
            steps: 0,
            alive: true,
            goal_distance: 3225.0,
            steps_per_tick: 2,
            emit_frames: true,
            absent_terminal_frame: false,
            seed,
            rng: level_stream(seed, 0),
        }
    }

    pub fn action_space() -> Discrete { Discrete::new(4) }

    pub fn level(&self) -> u32 { self.level }

    pub fn counters(&self) -> StepInfo {
        StepInfo {
            distance: self.distance,
            time: self.time,
            player_status: f64::from(self.player_status),
            score: self.score as f64,
        }
    }

    fn finished(&self) -> bool {
        !self.alive || self.time <= 0.0 || self.distance >= self.goal_distance
    }

    fn info(&self) -> Info {
        let mut info = Info::new();
        self.counters().write_into(&mut info);
        info.insert("level", InfoValue::from(self.level));
        info.insert("life", InfoValue::from(self.alive));
        info
    }

    fn draw(&self) -> Canvas {
        let mut canvas = Canvas::new(FRAME_WIDTH, FRAME_HEIGHT);
        // Each level gets its own sky tint.
        let tint = (self.level % 4) as u8 * 40;
        canvas.clear(Color(SKY.0.saturating_sub(tint), SKY.1, SKY.2.saturating_sub(tint)));

        let ground_y = FRAME_HEIGHT as i32 - 32;
        canvas.fill_rect(0, ground_y, FRAME_WIDTH as i32, 32, GROUND);

        // Bricks scroll with the player's progress.
        let scroll = (self.distance as i32).rem_euclid(32);
        for i in 0..=(FRAME_WIDTH as i32 / 32) {
            canvas.fill_rect(i * 32 - scroll, ground_y - 64, 16, 16, BRICK);
        }

        let size = 16 * (1 + i32::from(self.player_status.min(1)));
        canvas.fill_rect(64, ground_y - size, 16, size, PLAYER);

        // Remaining time as a bar along the top edge.
        let bar = (self.time.max(0.0) / 400.0 * f64::from(FRAME_WIDTH - 1)) as i32;
        canvas.draw_line(0, 2, bar, 2, COIN);
        canvas
    }

    fn observe(&self) -> Result<Observation> {
        if !self.emit_frames || (self.absent_terminal_frame && self.finished()) {
            return Ok(None);
        }
        Ok(Some(self.draw().to_raw_frame()?))
    }

    /// Raw RGB frame of the current state.
    pub fn frame(&self) -> Result<RawFrame> { self.draw().to_raw_frame() }
}

impl Env for SyntheticPlatformer {
    type Obs = Observation;
    type Act = Action;

    fn reset(&mut self) -> Result<Self::Obs> {
        self.distance = 40.0;
        self.time = 400.0;
        self.player_status = 0;
        self.score = 0;
        self.steps = 0;
        self.alive = true;
        self.observe()
    }

    fn step(&mut self, action: Self::Act) -> Result<Step<Self::Obs>> {
        let dx = match action {
            RIGHT => 2.0,
            RIGHT_JUMP => 3.0,
            LEFT => -2.0,
            _ => 0.0,
        };
        let before = self.distance;
        self.distance = (self.distance + dx).max(0.0);

        self.steps += 1;
        if self.steps % self.steps_per_tick.max(1) == 0 {
            self.time -= 1.0;
        }

        if self.rng.gen_bool(0.03) {
            self.score += 200;
        }
        if self.rng.gen_bool(0.01) {
            self.player_status = (self.player_status + 1).min(2);
        }
        let hazard = (0.004 + 0.002 * f64::from(self.level)).min(1.0);
        if self.rng.gen_bool(hazard) {
            if self.player_status > 0 {
                self.player_status -= 1;
            } else {
                self.alive = false;
            }
        }
        if self.distance >= self.goal_distance {
            self.score += (self.time.max(0.0) as u64) * 50;
        }

        let done = self.finished();
        if done {
            debug!(distance = self.distance, time = self.time, alive = self.alive, "synthetic episode over");
        }
        Ok(Step::new(self.observe()?, self.distance - before, done, self.info()))
    }

    /// Switches to the event stream of `level`.
    fn change_level(&mut self, level: u32) -> Result<()> {
        self.level = level;
        self.rng = level_stream(self.seed, level);
        Ok(())
    }

    fn render(&self) -> Option<RenderFrame> { Some(self.draw().into_render_frame()) }
}
