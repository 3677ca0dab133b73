//! Handle Types
//!
//! Opaque, copyable identifiers for the objects this crate bookkeeps.
//! All three are `slotmap` keys: value-comparable, hashable and ordered,
//! with no ownership attached. Dropping a handle never removes anything from
//! a scene; lifetime belongs to whichever engine or registry issued it.

use slotmap::new_key_type;
use smallvec::SmallVec;

new_key_type! {
    /// A renderable or transform entity living inside the engine.
    pub struct EntityHandle;
    /// A scene graph instance owned by the engine.
    pub struct SceneHandle;
    /// A loaded asset that owns a fixed set of entities.
    pub struct AssetHandle;
}

/// Inline capacity of [`EntityList`]. Most assets and ad-hoc batches fit.
pub const INLINE_ENTITIES: usize = 16;

/// Ordered sequence of entities consumed by batch operations.
pub type EntityList = SmallVec<[EntityHandle; INLINE_ENTITIES]>;

/// Collects any caller collection of handles into an [`EntityList`],
/// preserving order and keeping duplicates.
///
/// ```rust,ignore
/// let list = collect_entities(asset_entities.iter().copied());
/// let list = collect_entities(vec![a, b, c]);
/// ```
pub fn collect_entities<I>(entities: I) -> EntityList
where
    I: IntoIterator,
    I::Item: Into<EntityHandle>,
{
    entities.into_iter().map(Into::into).collect()
}
