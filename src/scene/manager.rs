use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::assets::AssetEntityIndex;
use crate::config::MembershipConfig;
use crate::engine::SceneGraph;
use crate::errors::{Error, Result};
use crate::handles::SceneHandle;
use crate::scene::SceneMembership;

struct ManagerInner<G, A> {
    scenes: FxHashMap<SceneHandle, Arc<SceneMembership<G, A>>>,
    active_scene: Option<SceneHandle>,
}

/// Registry of per-scene membership gateways.
///
/// Each attached scene gets its own [`SceneMembership`] and therefore its own
/// lock. The registry's lock only guards the map itself and is never held
/// while a membership operation runs.
pub struct SceneManager<G, A> {
    engine: Arc<G>,
    assets: Arc<A>,
    config: MembershipConfig,
    inner: RwLock<ManagerInner<G, A>>,
}

impl<G: SceneGraph, A: AssetEntityIndex> SceneManager<G, A> {
    #[must_use]
    pub fn new(engine: Arc<G>, assets: Arc<A>) -> Self {
        Self::with_config(engine, assets, MembershipConfig::default())
    }

    /// `config` is handed to every membership created by [`attach`](Self::attach).
    #[must_use]
    pub fn with_config(engine: Arc<G>, assets: Arc<A>, config: MembershipConfig) -> Self {
        Self {
            engine,
            assets,
            config,
            inner: RwLock::new(ManagerInner {
                scenes: FxHashMap::default(),
                active_scene: None,
            }),
        }
    }

    /// Starts managing an engine scene and returns its gateway. Attaching a
    /// scene twice returns the existing gateway. Scenes the engine reports as
    /// detached are refused.
    pub fn attach(&self, scene: SceneHandle) -> Result<Arc<SceneMembership<G, A>>> {
        if let Some(existing) = self.inner.read().scenes.get(&scene) {
            return Ok(Arc::clone(existing));
        }

        self.engine
            .entity_count(scene)
            .map_err(|source| Error::Scene { scene, source })?;

        let mut guard = self.inner.write();
        let membership = guard.scenes.entry(scene).or_insert_with(|| {
            log::debug!("Attached scene {scene:?}");
            Arc::new(SceneMembership::with_config(
                scene,
                Arc::clone(&self.engine),
                Arc::clone(&self.assets),
                self.config.clone(),
            ))
        });
        Ok(Arc::clone(membership))
    }

    /// Stops managing a scene. Outstanding `Arc`s to its gateway stay usable;
    /// the engine scene itself is untouched.
    pub fn detach(&self, scene: SceneHandle) -> Option<Arc<SceneMembership<G, A>>> {
        let mut guard = self.inner.write();
        if guard.active_scene == Some(scene) {
            guard.active_scene = None;
            log::warn!("Active scene was detached! No scene is active now.");
        }
        guard.scenes.remove(&scene)
    }

    pub fn get(&self, scene: SceneHandle) -> Result<Arc<SceneMembership<G, A>>> {
        self.inner
            .read()
            .scenes
            .get(&scene)
            .cloned()
            .ok_or(Error::SceneNotRegistered(scene))
    }

    #[must_use]
    pub fn contains(&self, scene: SceneHandle) -> bool {
        self.inner.read().scenes.contains_key(&scene)
    }

    pub fn set_active(&self, scene: SceneHandle) -> Result<()> {
        let mut guard = self.inner.write();
        if !guard.scenes.contains_key(&scene) {
            log::error!("Attempted to set unregistered scene {scene:?} as active.");
            return Err(Error::SceneNotRegistered(scene));
        }
        guard.active_scene = Some(scene);
        Ok(())
    }

    #[must_use]
    pub fn active_handle(&self) -> Option<SceneHandle> {
        self.inner.read().active_scene
    }

    #[must_use]
    pub fn active(&self) -> Option<Arc<SceneMembership<G, A>>> {
        let guard = self.inner.read();
        guard
            .active_scene
            .and_then(|scene| guard.scenes.get(&scene).cloned())
    }

    #[must_use]
    pub fn scene_handles(&self) -> Vec<SceneHandle> {
        self.inner.read().scenes.keys().copied().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().scenes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetRegistry;
    use crate::engine::MemoryEngine;
    use crate::errors::ErrorKind;

    fn manager() -> (Arc<MemoryEngine>, SceneManager<MemoryEngine, AssetRegistry>) {
        let engine = Arc::new(MemoryEngine::new());
        let manager = SceneManager::new(Arc::clone(&engine), Arc::new(AssetRegistry::new()));
        (engine, manager)
    }

    #[test]
    fn attach_twice_returns_same_gateway() {
        let (engine, manager) = manager();
        let scene = engine.create_scene();

        let first = manager.attach(scene).unwrap();
        let second = manager.attach(scene).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn attach_refuses_detached_scene() {
        let (engine, manager) = manager();
        let scene = engine.create_scene();
        engine.destroy_scene(scene);

        let err = manager.attach(scene).err().unwrap();
        assert_eq!(err.kind(), Some(ErrorKind::DetachedScene));
        assert!(manager.is_empty());
    }

    #[test]
    fn detaching_active_scene_clears_it() {
        let (engine, manager) = manager();
        let scene = engine.create_scene();
        manager.attach(scene).unwrap();
        manager.set_active(scene).unwrap();
        assert_eq!(manager.active_handle(), Some(scene));
        assert!(manager.active().is_some());

        assert!(manager.detach(scene).is_some());
        assert_eq!(manager.active_handle(), None);
        assert!(matches!(manager.get(scene), Err(Error::SceneNotRegistered(_))));
    }

    #[test]
    fn set_active_requires_registration() {
        let (engine, manager) = manager();
        let scene = engine.create_scene();
        assert!(matches!(
            manager.set_active(scene),
            Err(Error::SceneNotRegistered(s)) if s == scene
        ));
    }
}
