//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! Two layers:
//! - [`EngineError`] is what the external collaborators ([`SceneGraph`] and
//!   [`AssetEntityIndex`]) report for a single call.
//! - [`Error`] is what callers of [`SceneMembership`] see. It wraps the engine
//!   failure together with the entity or asset that triggered it and, for
//!   batches, how far the batch got.
//!
//! Both classify into the three-way [`ErrorKind`] taxonomy.
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for `std::result::Result<T, Error>`.
//!
//! ```rust,ignore
//! use scene_membership::errors::{Error, ErrorKind};
//!
//! match membership.add_entities(batch) {
//!     Ok(()) => {}
//!     Err(e @ Error::BatchAborted { .. }) => {
//!         log::warn!("{} entities landed before the failure: {e}", e.applied());
//!     }
//!     Err(e) => return Err(e),
//! }
//! ```
//!
//! [`SceneGraph`]: crate::engine::SceneGraph
//! [`AssetEntityIndex`]: crate::assets::AssetEntityIndex
//! [`SceneMembership`]: crate::scene::SceneMembership

use thiserror::Error;

use crate::handles::{AssetHandle, EntityHandle, SceneHandle};

/// Coarse classification shared by every failure that reaches the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An entity or asset handle does not name a live object.
    InvalidHandle,
    /// The scene no longer corresponds to a live engine scene.
    DetachedScene,
    /// The engine refused the call for an internal reason.
    EngineRejected,
}

/// Failure reported by the engine or asset collaborators for one call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The handle does not correspond to a live engine object.
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    /// The scene has been destroyed by the engine.
    #[error("Scene {0:?} is detached")]
    DetachedScene(SceneHandle),

    /// Any other engine-side refusal.
    #[error("Engine rejected the call: {0}")]
    EngineRejected(String),
}

impl EngineError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidHandle(_) => ErrorKind::InvalidHandle,
            Self::DetachedScene(_) => ErrorKind::DetachedScene,
            Self::EngineRejected(_) => ErrorKind::EngineRejected,
        }
    }

    pub(crate) fn invalid_entity(entity: EntityHandle) -> Self {
        Self::InvalidHandle(format!("entity {entity:?}"))
    }

    pub(crate) fn invalid_asset(asset: AssetHandle) -> Self {
        Self::InvalidHandle(format!("asset {asset:?}"))
    }
}

/// The main error type returned by scene membership operations.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Membership Errors
    // ========================================================================
    /// A single-entity operation failed.
    #[error("Entity {entity:?} failed: {source}")]
    Entity {
        /// The entity passed by the caller
        entity: EntityHandle,
        #[source]
        source: EngineError,
    },

    /// A batch stopped at its first failure. Entities before the failing one
    /// stay applied; entities after it were never attempted.
    #[error("Batch aborted at entity {entity:?} after {applied} of {total} applied: {source}")]
    BatchAborted {
        /// The entity whose engine call failed
        entity: EntityHandle,
        /// Number of entities applied before the failure
        applied: usize,
        /// Length of the batch as submitted
        total: usize,
        #[source]
        source: EngineError,
    },

    /// An asset's entity list could not be resolved. Nothing was applied.
    #[error("Asset {asset:?} could not be resolved: {source}")]
    AssetUnresolved {
        /// The asset passed by the caller
        asset: AssetHandle,
        #[source]
        source: EngineError,
    },

    /// A scene-level call (count, liveness probe) failed.
    #[error("Scene {scene:?} failed: {source}")]
    Scene {
        /// The scene the call targeted
        scene: SceneHandle,
        #[source]
        source: EngineError,
    },

    /// The scene is unknown to the [`SceneManager`](crate::scene::SceneManager).
    #[error("Scene not registered: {0:?}")]
    SceneNotRegistered(SceneHandle),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// A configuration value is out of range.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON parsing error.
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// Classification of the underlying engine failure, if there was one.
    #[must_use]
    pub fn kind(&self) -> Option<ErrorKind> {
        self.engine_error().map(EngineError::kind)
    }

    /// The engine failure that caused this error, if any.
    #[must_use]
    pub fn engine_error(&self) -> Option<&EngineError> {
        match self {
            Self::Entity { source, .. }
            | Self::BatchAborted { source, .. }
            | Self::AssetUnresolved { source, .. }
            | Self::Scene { source, .. } => Some(source),
            _ => None,
        }
    }

    /// How many entities of the failed call were applied before it stopped.
    #[must_use]
    pub fn applied(&self) -> usize {
        match self {
            Self::BatchAborted { applied, .. } => *applied,
            _ => 0,
        }
    }

    /// The entity whose engine call failed, if the failure was per-entity.
    #[must_use]
    pub fn failed_entity(&self) -> Option<EntityHandle> {
        match self {
            Self::Entity { entity, .. } | Self::BatchAborted { entity, .. } => Some(*entity),
            _ => None,
        }
    }
}

/// Alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_error_reports_progress() {
        let entity = EntityHandle::default();
        let err = Error::BatchAborted {
            entity,
            applied: 2,
            total: 5,
            source: EngineError::EngineRejected("full".into()),
        };
        assert_eq!(err.applied(), 2);
        assert_eq!(err.failed_entity(), Some(entity));
        assert_eq!(err.kind(), Some(ErrorKind::EngineRejected));
        assert!(err.to_string().contains("after 2 of 5 applied"));
    }

    #[test]
    fn non_engine_errors_have_no_kind() {
        let err = Error::SceneNotRegistered(SceneHandle::default());
        assert_eq!(err.kind(), None);
        assert_eq!(err.applied(), 0);
        assert_eq!(err.failed_entity(), None);
    }

    #[test]
    fn engine_error_kinds() {
        assert_eq!(
            EngineError::invalid_asset(AssetHandle::default()).kind(),
            ErrorKind::InvalidHandle
        );
        assert_eq!(
            EngineError::DetachedScene(SceneHandle::default()).kind(),
            ErrorKind::DetachedScene
        );
    }
}
