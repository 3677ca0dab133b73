use parking_lot::{RwLock, RwLockReadGuard};
use rustc_hash::FxHashMap;
use slotmap::SlotMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::assets::{AssetEntityIndex, LoadedAsset};
use crate::errors::EngineError;
use crate::handles::{AssetHandle, EntityHandle};

// Internal data structure, protected by a lock.
#[derive(Default)]
pub struct RegistryInner {
    pub map: SlotMap<AssetHandle, Arc<LoadedAsset>>,
    pub lookup: FxHashMap<Uuid, AssetHandle>,
}

/// Thread-safe registry of loaded assets.
///
/// Writers (the loading thread) take the write lock briefly to insert or
/// unload; readers (scene membership calls from any thread) only ever take
/// the read lock and leave with an `Arc` clone, so a scene lock held by the
/// caller is never ordered against anything but this short read.
#[derive(Default)]
pub struct AssetRegistry {
    inner: RwLock<RegistryInner>,
}

impl AssetRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::default(),
        }
    }

    /// [Write] Registers an asset and returns its handle.
    pub fn register(&self, asset: LoadedAsset) -> AssetHandle {
        let mut guard = self.inner.write();
        let count = asset.entity_count();
        let handle = guard.map.insert(Arc::new(asset));
        log::debug!("Registered asset {handle:?} with {count} entities");
        handle
    }

    /// [Write] Registers an asset under a UUID. A second registration with the
    /// same UUID returns the first handle and drops `asset`.
    pub fn register_with_uuid(&self, uuid: Uuid, asset: LoadedAsset) -> AssetHandle {
        let mut guard = self.inner.write();
        if let Some(&handle) = guard.lookup.get(&uuid) {
            return handle;
        }
        let handle = guard.map.insert(Arc::new(asset));
        guard.lookup.insert(uuid, handle);
        handle
    }

    /// [Write] Unloads an asset. Its entities are left wherever they are;
    /// removing them from scenes is the caller's call to make beforehand.
    pub fn unload(&self, handle: AssetHandle) -> Option<Arc<LoadedAsset>> {
        let mut guard = self.inner.write();
        let asset = guard.map.remove(handle)?;
        guard.lookup.retain(|_, h| *h != handle);
        Some(asset)
    }

    /// [Read] Gets a single asset.
    pub fn get(&self, handle: AssetHandle) -> Option<Arc<LoadedAsset>> {
        self.inner.read().map.get(handle).cloned()
    }

    pub fn get_by_uuid(&self, uuid: &Uuid) -> Option<Arc<LoadedAsset>> {
        let guard = self.inner.read();
        let handle = guard.lookup.get(uuid)?;
        guard.map.get(*handle).cloned()
    }

    pub fn handle_by_uuid(&self, uuid: &Uuid) -> Option<AssetHandle> {
        self.inner.read().lookup.get(uuid).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// [Read - Advanced] Acquires a read-lock guard for iterating many assets
    /// without re-locking per asset.
    pub fn read_lock(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read()
    }
}

impl AssetEntityIndex for AssetRegistry {
    fn entities_of(&self, asset: AssetHandle) -> Result<Arc<[EntityHandle]>, EngineError> {
        self.inner
            .read()
            .map
            .get(asset)
            .map(|loaded| Arc::clone(loaded.entities()))
            .ok_or_else(|| EngineError::invalid_asset(asset))
    }
}
