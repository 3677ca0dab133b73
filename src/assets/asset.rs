use std::sync::Arc;

use crate::handles::EntityHandle;

/// A loaded asset as seen by scene membership: which entities it owns.
///
/// The entity list is frozen once built and shared by `Arc`, so handing it to
/// several scenes (or threads) never copies or locks.
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub name: Option<String>,
    /// Entities in load order.
    entities: Arc<[EntityHandle]>,
    /// Entity at the top of the asset's transform hierarchy, if it has one.
    root: Option<EntityHandle>,
}

impl LoadedAsset {
    pub fn new(entities: impl IntoIterator<Item = EntityHandle>) -> Self {
        Self {
            name: None,
            entities: entities.into_iter().collect(),
            root: None,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Marks `root` as the asset's root entity. It must be one of the owned
    /// entities; otherwise the call is ignored and logged.
    #[must_use]
    pub fn with_root(mut self, root: EntityHandle) -> Self {
        if self.entities.contains(&root) {
            self.root = Some(root);
        } else {
            log::warn!("Root {root:?} is not owned by asset {:?}, ignoring", self.name);
        }
        self
    }

    #[inline]
    #[must_use]
    pub fn entities(&self) -> &Arc<[EntityHandle]> {
        &self.entities
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> Option<EntityHandle> {
        self.root
    }

    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    #[must_use]
    pub fn owns(&self, entity: EntityHandle) -> bool {
        self.entities.contains(&entity)
    }
}
