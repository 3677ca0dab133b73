//! Asset Entity Index
//!
//! Assets own a fixed, ordered list of entities established at load time.
//! This module exposes that list through the [`AssetEntityIndex`] trait, the
//! only asset-side surface [`SceneMembership`](crate::scene::SceneMembership)
//! depends on, plus [`AssetRegistry`], a thread-safe in-memory implementation.

pub mod asset;
pub mod storage;

pub use asset::LoadedAsset;
pub use storage::AssetRegistry;

use std::sync::Arc;

use crate::errors::EngineError;
use crate::handles::{AssetHandle, EntityHandle};

/// Read-only view from an asset to the entities it owns.
///
/// Must be callable from any thread without external synchronization, and
/// must never block on render-thread or engine state: it is queried while a
/// scene lock is held.
pub trait AssetEntityIndex: Send + Sync {
    /// The asset's entities in load order. Unknown or unloaded assets fail
    /// with `InvalidHandle`.
    fn entities_of(&self, asset: AssetHandle) -> Result<Arc<[EntityHandle]>, EngineError>;
}
