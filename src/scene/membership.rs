//! Scene Membership
//!
//! [`SceneMembership`] is the single serialized gateway for adding and
//! removing entities in one engine scene.
//!
//! # Locking
//!
//! Every mutating call takes the scene's own `parking_lot::Mutex` before the
//! first engine call and releases it after the last one. A batch of N
//! entities is therefore one critical section: no other caller on the same
//! scene can observe or interleave with a half-applied batch. Asset-level
//! calls resolve the asset's entity list inside that same critical section.
//! Different scenes have different locks and never wait on each other.
//!
//! The lock is not re-entrant. While holding a [`MembershipGuard`], use the
//! guard's methods; calling back into the `SceneMembership` that issued it on
//! the same thread deadlocks.
//!
//! # Failure
//!
//! Batches are fail-fast. The first engine failure stops the batch and
//! returns [`Error::BatchAborted`] with the failing entity and how many
//! entities were applied before it. Applied entities are not rolled back.
//! Removing an entity that is not in the scene is never an error.
//!
//! # Counting
//!
//! [`SceneMembership::entity_count`] is, by default, a plain engine read that
//! does not take the scene lock. It can observe a batch in flight. Use
//! [`SceneMembership::entity_count_consistent`], a guard's
//! [`MembershipGuard::entity_count`], or `CountConsistency::Locked` when the
//! count has to be ordered with mutations.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, MutexGuard};

use crate::assets::AssetEntityIndex;
use crate::config::{CountConsistency, MembershipConfig};
use crate::engine::SceneGraph;
use crate::errors::{EngineError, Error, Result};
use crate::handles::{AssetHandle, EntityHandle, SceneHandle, collect_entities};
use crate::scene::stats::{MembershipStats, StatsSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Add,
    Remove,
}

impl Mutation {
    fn verb(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
        }
    }

    #[inline]
    fn apply<G: SceneGraph>(
        self,
        engine: &G,
        scene: SceneHandle,
        entity: EntityHandle,
    ) -> std::result::Result<(), EngineError> {
        match self {
            Self::Add => engine.add_entity(scene, entity),
            Self::Remove => engine.remove_entity(scene, entity),
        }
    }

    fn record(self, stats: &MembershipStats, n: usize) {
        match self {
            Self::Add => stats.record_added(n),
            Self::Remove => stats.record_removed(n),
        }
    }
}

/// Membership gateway for one engine scene.
///
/// Holds the scene by handle only; the engine owns the scene and this type
/// must not be used after the engine destroys it (calls then fail with
/// `DetachedScene`). Share it between threads with `Arc`.
pub struct SceneMembership<G, A> {
    scene: SceneHandle,
    engine: Arc<G>,
    assets: Arc<A>,
    lock: Mutex<()>,
    config: MembershipConfig,
    stats: MembershipStats,
}

impl<G: SceneGraph, A: AssetEntityIndex> SceneMembership<G, A> {
    pub fn new(scene: SceneHandle, engine: Arc<G>, assets: Arc<A>) -> Self {
        Self::with_config(scene, engine, assets, MembershipConfig::default())
    }

    pub fn with_config(
        scene: SceneHandle,
        engine: Arc<G>,
        assets: Arc<A>,
        config: MembershipConfig,
    ) -> Self {
        Self {
            scene,
            engine,
            assets,
            lock: Mutex::new(()),
            config,
            stats: MembershipStats::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn scene(&self) -> SceneHandle {
        self.scene
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &MembershipConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn engine(&self) -> &Arc<G> {
        &self.engine
    }

    #[inline]
    #[must_use]
    pub fn assets(&self) -> &Arc<A> {
        &self.assets
    }

    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    // ========================================================================
    // Critical Section
    // ========================================================================

    /// Blocks until this scene's lock is free and returns the held critical
    /// section. Everything done through the guard is atomic with respect to
    /// other callers on this scene until the guard is dropped.
    pub fn lock(&self) -> MembershipGuard<'_, G, A> {
        let guard = match self.config.slow_lock_warning() {
            Some(threshold) => {
                let start = Instant::now();
                let guard = self.lock.lock();
                let waited = start.elapsed();
                if waited > threshold {
                    log::warn!(
                        "Waited {:.2}ms for scene {:?} lock (threshold {}ms)",
                        waited.as_secs_f64() * 1000.0,
                        self.scene,
                        threshold.as_millis()
                    );
                }
                guard
            }
            None => self.lock.lock(),
        };
        MembershipGuard {
            membership: self,
            _lock: guard,
        }
    }

    /// Non-blocking [`lock`](Self::lock). Returns `None` if another caller
    /// currently holds the scene.
    pub fn try_lock(&self) -> Option<MembershipGuard<'_, G, A>> {
        self.lock.try_lock().map(|guard| MembershipGuard {
            membership: self,
            _lock: guard,
        })
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.lock.is_locked()
    }

    // ========================================================================
    // Operations
    // ========================================================================

    pub fn add_entity(&self, entity: EntityHandle) -> Result<()> {
        self.lock().add_entity(entity)
    }

    pub fn remove_entity(&self, entity: EntityHandle) -> Result<()> {
        self.lock().remove_entity(entity)
    }

    pub fn add_entities<I>(&self, entities: I) -> Result<()>
    where
        I: IntoIterator<Item = EntityHandle>,
    {
        self.lock().add_entities(entities)
    }

    pub fn remove_entities<I>(&self, entities: I) -> Result<()>
    where
        I: IntoIterator<Item = EntityHandle>,
    {
        self.lock().remove_entities(entities)
    }

    pub fn add_asset_entities(&self, asset: AssetHandle) -> Result<()> {
        self.lock().add_asset_entities(asset)
    }

    pub fn remove_asset_entities(&self, asset: AssetHandle) -> Result<()> {
        self.lock().remove_asset_entities(asset)
    }

    /// Entity count as reported by the engine.
    ///
    /// With the default `CountConsistency::Relaxed` this does not wait for
    /// in-flight mutations and may reflect part of a batch.
    pub fn entity_count(&self) -> Result<usize> {
        match self.config.count_consistency {
            CountConsistency::Relaxed => self.read_count(),
            CountConsistency::Locked => self.lock().entity_count(),
        }
    }

    /// Entity count read under the scene lock.
    pub fn entity_count_consistent(&self) -> Result<usize> {
        self.lock().entity_count()
    }

    fn read_count(&self) -> Result<usize> {
        self.engine
            .entity_count(self.scene)
            .map_err(|source| Error::Scene {
                scene: self.scene,
                source,
            })
    }
}

/// Held critical section of a [`SceneMembership`].
///
/// Obtained from [`SceneMembership::lock`] or [`SceneMembership::try_lock`];
/// the scene lock is released on drop.
///
/// ```rust,ignore
/// let mut scene = membership.lock();
/// scene.remove_asset_entities(old_lod)?;
/// scene.add_asset_entities(new_lod)?;
/// let count = scene.entity_count()?;
/// ```
pub struct MembershipGuard<'a, G, A> {
    membership: &'a SceneMembership<G, A>,
    _lock: MutexGuard<'a, ()>,
}

impl<G: SceneGraph, A: AssetEntityIndex> MembershipGuard<'_, G, A> {
    #[inline]
    #[must_use]
    pub fn scene(&self) -> SceneHandle {
        self.membership.scene
    }

    /// Adds one entity. Adding an entity already in the scene does whatever
    /// the engine does for a duplicate insert.
    pub fn add_entity(&mut self, entity: EntityHandle) -> Result<()> {
        self.apply_one(entity, Mutation::Add)
    }

    /// Removes one entity. Absent entities are a successful no-op.
    pub fn remove_entity(&mut self, entity: EntityHandle) -> Result<()> {
        self.apply_one(entity, Mutation::Remove)
    }

    /// Adds entities in sequence order. Duplicates are passed through.
    pub fn add_entities<I>(&mut self, entities: I) -> Result<()>
    where
        I: IntoIterator<Item = EntityHandle>,
    {
        let entities = collect_entities(entities);
        self.apply_batch(&entities, Mutation::Add)
    }

    pub fn remove_entities<I>(&mut self, entities: I) -> Result<()>
    where
        I: IntoIterator<Item = EntityHandle>,
    {
        let entities = collect_entities(entities);
        self.apply_batch(&entities, Mutation::Remove)
    }

    /// Adds every entity the asset owns, in the asset's order.
    pub fn add_asset_entities(&mut self, asset: AssetHandle) -> Result<()> {
        let entities = self.resolve(asset)?;
        log::debug!(
            "Adding {} entities of asset {asset:?} to scene {:?}",
            entities.len(),
            self.scene()
        );
        self.apply_batch(&entities, Mutation::Add)
    }

    /// Removes every entity the asset owns, in the asset's order.
    pub fn remove_asset_entities(&mut self, asset: AssetHandle) -> Result<()> {
        let entities = self.resolve(asset)?;
        log::debug!(
            "Removing {} entities of asset {asset:?} from scene {:?}",
            entities.len(),
            self.scene()
        );
        self.apply_batch(&entities, Mutation::Remove)
    }

    /// Entity count, ordered with every mutation on this scene.
    pub fn entity_count(&self) -> Result<usize> {
        self.membership.read_count()
    }

    fn resolve(&self, asset: AssetHandle) -> Result<Arc<[EntityHandle]>> {
        self.membership.assets.entities_of(asset).map_err(|source| {
            self.membership.stats.record_failure();
            log::warn!("Could not resolve entities of asset {asset:?}: {source}");
            Error::AssetUnresolved { asset, source }
        })
    }

    fn apply_one(&mut self, entity: EntityHandle, mutation: Mutation) -> Result<()> {
        let m = self.membership;
        match mutation.apply(&*m.engine, m.scene, entity) {
            Ok(()) => {
                mutation.record(&m.stats, 1);
                log::trace!("{} {entity:?} on scene {:?}", mutation.verb(), m.scene);
                Ok(())
            }
            Err(source) => {
                m.stats.record_failure();
                log::warn!(
                    "Failed to {} {entity:?} on scene {:?}: {source}",
                    mutation.verb(),
                    m.scene
                );
                Err(Error::Entity { entity, source })
            }
        }
    }

    fn apply_batch(&mut self, entities: &[EntityHandle], mutation: Mutation) -> Result<()> {
        let m = self.membership;
        let total = entities.len();

        for (applied, &entity) in entities.iter().enumerate() {
            if let Err(source) = mutation.apply(&*m.engine, m.scene, entity) {
                mutation.record(&m.stats, applied);
                m.stats.record_failure();
                log::warn!(
                    "Batch {} on scene {:?} aborted at {entity:?} ({applied}/{total} applied): {source}",
                    mutation.verb(),
                    m.scene
                );
                return Err(Error::BatchAborted {
                    entity,
                    applied,
                    total,
                    source,
                });
            }
        }

        mutation.record(&m.stats, total);
        m.stats.record_batch();
        log::trace!("Batch {} of {total} entities on scene {:?}", mutation.verb(), m.scene);
        Ok(())
    }
}
