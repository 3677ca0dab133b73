use parking_lot::RwLock;
use slotmap::{SecondaryMap, SlotMap};

use crate::config::{DuplicatePolicy, MemoryEngineConfig};
use crate::engine::SceneGraph;
use crate::errors::EngineError;
use crate::handles::{EntityHandle, SceneHandle};

// Internal data structure, protected by a lock.
#[derive(Default)]
struct EngineInner {
    entities: SlotMap<EntityHandle, ()>,
    /// Insertion-ordered entity list per live scene.
    scenes: SlotMap<SceneHandle, Vec<EntityHandle>>,
}

/// In-memory scene graph.
///
/// Owns the lifetime of its scenes and entities. Each call takes the engine's
/// own lock once, so individual calls never tear, while a batch of calls
/// from one thread can interleave with calls from another.
pub struct MemoryEngine {
    inner: RwLock<EngineInner>,
    config: MemoryEngineConfig,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MemoryEngineConfig::default())
    }

    #[must_use]
    pub fn with_config(config: MemoryEngineConfig) -> Self {
        Self {
            inner: RwLock::default(),
            config,
        }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &MemoryEngineConfig {
        &self.config
    }

    // ========================================================================
    // Lifetime
    // ========================================================================

    pub fn create_scene(&self) -> SceneHandle {
        self.inner.write().scenes.insert(Vec::new())
    }

    /// Destroys a scene. Later calls against it report `DetachedScene`.
    /// Returns `false` if the scene was already gone.
    pub fn destroy_scene(&self, scene: SceneHandle) -> bool {
        self.inner.write().scenes.remove(scene).is_some()
    }

    pub fn create_entity(&self) -> EntityHandle {
        self.inner.write().entities.insert(())
    }

    /// Creates `count` entities at once, in order.
    pub fn create_entities(&self, count: usize) -> Vec<EntityHandle> {
        let mut guard = self.inner.write();
        (0..count).map(|_| guard.entities.insert(())).collect()
    }

    /// Destroys an entity and drops it from every scene that held it.
    pub fn destroy_entity(&self, entity: EntityHandle) -> bool {
        let mut guard = self.inner.write();
        if guard.entities.remove(entity).is_none() {
            return false;
        }
        for (_, members) in &mut guard.scenes {
            members.retain(|&e| e != entity);
        }
        true
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn is_alive(&self, entity: EntityHandle) -> bool {
        self.inner.read().entities.contains_key(entity)
    }

    #[must_use]
    pub fn contains(&self, scene: SceneHandle, entity: EntityHandle) -> bool {
        self.inner
            .read()
            .scenes
            .get(scene)
            .is_some_and(|members| members.contains(&entity))
    }

    /// Snapshot of a scene's entities in insertion order.
    pub fn entities(&self, scene: SceneHandle) -> Result<Vec<EntityHandle>, EngineError> {
        self.inner
            .read()
            .scenes
            .get(scene)
            .cloned()
            .ok_or(EngineError::DetachedScene(scene))
    }

    /// How many scenes each entity currently belongs to.
    #[must_use]
    pub fn membership_counts(&self) -> SecondaryMap<EntityHandle, usize> {
        let guard = self.inner.read();
        let mut counts = SecondaryMap::new();
        for (_, members) in &guard.scenes {
            for &entity in members {
                if let Some(slot) = counts.entry(entity) {
                    *slot.or_insert(0) += 1;
                }
            }
        }
        counts
    }
}

impl SceneGraph for MemoryEngine {
    fn add_entity(&self, scene: SceneHandle, entity: EntityHandle) -> Result<(), EngineError> {
        let mut guard = self.inner.write();
        if !guard.entities.contains_key(entity) {
            return Err(EngineError::invalid_entity(entity));
        }
        let policy = self.config.duplicate_policy;
        let members = guard
            .scenes
            .get_mut(scene)
            .ok_or(EngineError::DetachedScene(scene))?;

        if members.contains(&entity) {
            return match policy {
                DuplicatePolicy::Ignore => Ok(()),
                DuplicatePolicy::Reject => Err(EngineError::EngineRejected(format!(
                    "entity {entity:?} is already in scene {scene:?}"
                ))),
            };
        }
        members.push(entity);
        Ok(())
    }

    fn remove_entity(&self, scene: SceneHandle, entity: EntityHandle) -> Result<(), EngineError> {
        let mut guard = self.inner.write();
        let members = guard
            .scenes
            .get_mut(scene)
            .ok_or(EngineError::DetachedScene(scene))?;
        if let Some(pos) = members.iter().position(|&e| e == entity) {
            members.remove(pos);
        }
        Ok(())
    }

    fn entity_count(&self, scene: SceneHandle) -> Result<usize, EngineError> {
        self.inner
            .read()
            .scenes
            .get(scene)
            .map(Vec::len)
            .ok_or(EngineError::DetachedScene(scene))
    }
}
