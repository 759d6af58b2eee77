// Core traits and types shared by every wrapper and collaborator.

use ndarray::Array3;

/// A raw rendered frame, H x W x C bytes with C >= 3 (RGB, alpha ignored).
pub type RawFrame = Array3<u8>;

/// A processed single-channel frame of shape (1, height, width).
pub type Frame = Array3<f32>;

/// K processed frames stacked along the leading axis: (K, height, width).
pub type StackedFrames = Array3<f32>;

/// What a stepping collaborator hands back. `None` marks an absent frame.
pub type Observation = Option<RawFrame>;

/// Discrete action index understood by the stepping collaborator.
pub type Action = u32;

/// Ordered key-value map attached to each step.
/// Unknown keys are carried through the wrappers untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Info {
    entries: Vec<(String, InfoValue)>,
}

impl Info {
    pub fn new() -> Self { Self { entries: Vec::new() } }

    /// Insert or replace a key with the given value.
    pub fn insert<K: Into<String>>(&mut self, key: K, value: InfoValue) {
        let k = key.into();
        if let Some((_, v)) = self.entries.iter_mut().find(|(kk, _)| kk == &k) {
            *v = value;
        } else {
            self.entries.push((k, value));
        }
    }

    /// Builder-style insert, handy for scripted collaborators.
    pub fn with<K: Into<String>, V: Into<InfoValue>>(mut self, key: K, value: V) -> Self {
        self.insert(key, value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&InfoValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Fetch a numeric entry, failing when the key is absent or not a number.
    pub fn require_f64(&self, key: &str) -> Result<f64> {
        match self.get(key) {
            Some(value) => value.as_f64().ok_or_else(|| GymError::InvalidInfoValue {
                key: key.to_string(),
                found: format!("{value:?}"),
            }),
            None => Err(GymError::MissingInfoKey(key.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &InfoValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn len(&self) -> usize { self.entries.len() }
}

/// Value types carried in an info map.
#[derive(Clone, Debug, PartialEq)]
pub enum InfoValue {
    Bool(bool),
    I64(i64),
    F64(f64),
    Str(String),
}

impl InfoValue {
    /// Numeric view of the value; booleans and strings are not numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            InfoValue::I64(v) => Some(*v as f64),
            InfoValue::F64(v) => Some(*v),
            InfoValue::Bool(_) | InfoValue::Str(_) => None,
        }
    }
}

impl From<bool> for InfoValue { fn from(v: bool) -> Self { InfoValue::Bool(v) } }
impl From<i64> for InfoValue { fn from(v: i64) -> Self { InfoValue::I64(v) } }
impl From<i32> for InfoValue { fn from(v: i32) -> Self { InfoValue::I64(v as i64) } }
impl From<u32> for InfoValue { fn from(v: u32) -> Self { InfoValue::I64(v as i64) } }
impl From<f64> for InfoValue { fn from(v: f64) -> Self { InfoValue::F64(v) } }
impl From<f32> for InfoValue { fn from(v: f32) -> Self { InfoValue::F64(v as f64) } }
impl From<&str> for InfoValue { fn from(v: &str) -> Self { InfoValue::Str(v.to_string()) } }
impl From<String> for InfoValue { fn from(v: String) -> Self { InfoValue::Str(v) } }

/// Keys every platformer step info must carry.
pub const KEY_DISTANCE: &str = "distance";
pub const KEY_TIME: &str = "time";
pub const KEY_PLAYER_STATUS: &str = "player_status";
pub const KEY_SCORE: &str = "score";

/// Typed view over the four info fields the reward shaper depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepInfo {
    pub distance: f64,
    pub time: f64,
    pub player_status: f64,
    pub score: f64,
}

impl StepInfo {
    /// Extract the required fields, failing fast on anything missing.
    pub fn from_info(info: &Info) -> Result<Self> {
        Ok(Self {
            distance: info.require_f64(KEY_DISTANCE)?,
            time: info.require_f64(KEY_TIME)?,
            player_status: info.require_f64(KEY_PLAYER_STATUS)?,
            score: info.require_f64(KEY_SCORE)?,
        })
    }

    /// Write the fields back into an info map (used by collaborators).
    pub fn write_into(&self, info: &mut Info) {
        info.insert(KEY_DISTANCE, InfoValue::F64(self.distance));
        info.insert(KEY_TIME, InfoValue::F64(self.time));
        info.insert(KEY_PLAYER_STATUS, InfoValue::F64(self.player_status));
        info.insert(KEY_SCORE, InfoValue::F64(self.score));
    }
}

/// A frame returned by `Env::render`.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderFrame {
    Text(String),
    /// Raw pixel buffer in row-major RGB or RGBA format.
    Pixels {
        width: u32,
        height: u32,
        /// Pixel data. Convention: RGB uses 3 bytes per pixel, RGBA uses 4.
        data: Vec<u8>,
    },
}

/// A step result from the environment.
#[derive(Clone, Debug, PartialEq)]
pub struct Step<Obs> {
    pub observation: Obs,
    pub reward: f64,
    pub done: bool,
    pub info: Info,
}

impl<Obs> Step<Obs> {
    pub fn new(observation: Obs, reward: f64, done: bool, info: Info) -> Self {
        Self { observation, reward, done, info }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum GymError {
    #[error("step info is missing required key `{0}`")]
    MissingInfoKey(String),
    #[error("step info key `{key}` is not numeric (found {found})")]
    InvalidInfoValue { key: String, found: String },
    #[error("Invalid observation: {0}")]
    InvalidObservation(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Environment not ready: {0}")]
    NotReady(String),
    #[error("Operation not supported: {0}")]
    NotSupported(String),
    #[error("Unknown environment id: {0}")]
    UnknownEnv(String),
    #[error("Env id already registered: {0}")]
    AlreadyRegistered(String),
    #[error("array shape mismatch: {0}")]
    Shape(#[from] ndarray::ShapeError),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, GymError>;

/// Reset/step contract shared by stepping collaborators and by every wrapper.
///
/// Calling `step` after an episode reported `done` without an intervening
/// `reset` is outside the contract; wrappers may refuse it with `NotReady`.
pub trait Env {
    type Obs;
    type Act;

    /// Start a new episode and return its first observation.
    fn reset(&mut self) -> Result<Self::Obs>;

    /// Apply an action and advance the environment by one step.
    fn step(&mut self, action: Self::Act) -> Result<Step<Self::Obs>>;

    /// Switch the underlying game to another level.
    fn change_level(&mut self, level: u32) -> Result<()> {
        Err(GymError::NotSupported(format!("change_level({level})")))
    }

    fn render(&self) -> Option<RenderFrame> { None }

    fn close(&mut self) {}
}

impl<E: Env + ?Sized> Env for Box<E> {
    type Obs = E::Obs;
    type Act = E::Act;

    fn reset(&mut self) -> Result<Self::Obs> { (**self).reset() }
    fn step(&mut self, action: Self::Act) -> Result<Step<Self::Obs>> { (**self).step(action) }
    fn change_level(&mut self, level: u32) -> Result<()> { (**self).change_level(level) }
    fn render(&self) -> Option<RenderFrame> { (**self).render() }
    fn close(&mut self) { (**self).close() }
}
