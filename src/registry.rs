//! Registration of stepping collaborators by id.
//!
//! A process-wide registry so collaborators can be built by name and wrapped
//! in the full pipeline in one call, e.g. `make("SyntheticPlatformer-v0", &config)`.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use crate::config::PipelineConfig;
use crate::core::{Action, Env, GymError, Observation, Result};
use crate::envs::SyntheticPlatformer;
use crate::pipeline::{Pipeline, wrap_platformer};

/// A boxed stepping collaborator.
pub type BoxedEnv = Box<dyn Env<Obs = Observation, Act = Action> + Send>;

/// Factory closure type for constructing collaborators.
pub type FactoryFn = Box<dyn Fn() -> BoxedEnv + Send + Sync>;

/// Id of the built-in synthetic collaborator.
pub const SYNTHETIC_ID: &str = "SyntheticPlatformer-v0";

/// Collaborator metadata.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvSpec {
    /// Unique identifier like "SyntheticPlatformer-v0".
    pub id: String,
    pub version: Option<String>,
}

impl EnvSpec {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self { id: id.into(), version: None }
    }
}

#[derive(Default)]
struct RegistryInner {
    specs: HashMap<String, EnvSpec>,
    factories: HashMap<String, FactoryFn>,
}

struct Registry {
    inner: RwLock<RegistryInner>,
}

impl Registry {
    fn with_builtins() -> Self {
        let mut inner = RegistryInner::default();
        let spec = EnvSpec { version: Some("0".into()), ..EnvSpec::new(SYNTHETIC_ID) };
        inner.factories.insert(spec.id.clone(), factory_of(SyntheticPlatformer::default));
        inner.specs.insert(spec.id.clone(), spec);
        Self { inner: RwLock::new(inner) }
    }

    fn register(&self, spec: EnvSpec, factory: FactoryFn) -> Result<()> {
        let mut g = self.inner.write().map_err(|_| GymError::NotReady("registry poisoned".into()))?;
        if g.specs.contains_key(&spec.id) {
            return Err(GymError::AlreadyRegistered(spec.id));
        }
        g.factories.insert(spec.id.clone(), factory);
        g.specs.insert(spec.id.clone(), spec);
        Ok(())
    }

    fn get_spec(&self, id: &str) -> Option<EnvSpec> {
        let g = self.inner.read().ok()?;
        g.specs.get(id).cloned()
    }

    fn make_raw(&self, id: &str) -> Result<BoxedEnv> {
        let guard = self.inner.read().map_err(|_| GymError::NotReady("registry poisoned".into()))?;
        match guard.factories.get(id) {
            Some(f) => Ok((f)()),
            None => Err(GymError::UnknownEnv(id.to_string())),
        }
    }
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::with_builtins)
}

/// Register a collaborator spec and its factory globally.
pub fn register(spec: EnvSpec, factory: FactoryFn) -> Result<()> { registry().register(spec, factory) }

pub fn get_spec(id: &str) -> Option<EnvSpec> { registry().get_spec(id) }

/// Construct a bare collaborator by id.
pub fn make_raw<S: AsRef<str>>(id: S) -> Result<BoxedEnv> { registry().make_raw(id.as_ref()) }

/// Construct a collaborator by id and wrap it in the full pipeline.
pub fn make<S: AsRef<str>>(id: S, config: &PipelineConfig) -> Result<Pipeline<BoxedEnv>> {
    wrap_platformer(make_raw(id)?, config)
}

/// Adapt a concrete collaborator constructor into a factory.
pub fn factory_of<E, F>(ctor: F) -> FactoryFn
where
    E: Env<Obs = Observation, Act = Action> + Send + 'static,
    F: Fn() -> E + Send + Sync + 'static,
{
    Box::new(move || Box::new(ctor()) as BoxedEnv)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Info, Step};

    struct Blank;

    impl Env for Blank {
        type Obs = Observation;
        type Act = Action;

        fn reset(&mut self) -> Result<Observation> { Ok(None) }

        fn step(&mut self, _a: Action) -> Result<Step<Observation>> {
            let info = Info::new().with("distance", 40).with("time", 400).with("player_status", 0).with("score", 0);
            Ok(Step::new(None, 0.0, true, info))
        }
    }

    #[test]
    fn register_and_make_pipeline() {
        register(EnvSpec::new("Blank-v0"), factory_of(|| Blank)).expect("register ok");
        assert!(matches!(
            register(EnvSpec::new("Blank-v0"), factory_of(|| Blank)),
            Err(GymError::AlreadyRegistered(_))
        ));
        assert_eq!(get_spec("Blank-v0").map(|s| s.id), Some("Blank-v0".to_string()));

        let mut env = make("Blank-v0", &PipelineConfig::default()).expect("make ok");
        let obs = env.reset().unwrap();
        assert!(obs.iter().all(|&v| v == 0.0));
        let s = env.step(0).unwrap();
        assert!(s.done);
        assert_eq!(s.reward, -50.0);
    }

    #[test]
    fn builtin_and_unknown_ids() {
        assert!(get_spec(SYNTHETIC_ID).is_some());
        let mut env = make(SYNTHETIC_ID, &PipelineConfig::default()).unwrap();
        assert_eq!(env.reset().unwrap().dim(), (4, 84, 84));
        assert!(matches!(make_raw("Nope-v9"), Err(GymError::UnknownEnv(_))));
    }
}
