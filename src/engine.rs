//! Engine Scene-Graph Surface
//!
//! This module defines [`SceneGraph`], the opaque mutation/query surface a
//! renderer exposes for its scenes. It is the only way this crate touches
//! engine state.
//!
//! # Contract
//!
//! - A single call is internally consistent (the engine may lock around it),
//!   but a *sequence* of calls carries no atomicity. Serializing sequences per
//!   scene is the job of [`SceneMembership`](crate::scene::SceneMembership).
//! - `remove_entity` of an entity that is not in the scene is a successful
//!   no-op. Only a detached scene may fail a removal.
//! - Adding an entity that is already present does whatever the engine does.
//!   This crate passes that behavior through untouched.
//!
//! [`MemoryEngine`] is an in-process implementation used by tests and by hosts
//! without a real renderer.
//!
//! ```rust,ignore
//! use scene_membership::engine::{MemoryEngine, SceneGraph};
//!
//! let engine = MemoryEngine::new();
//! let scene = engine.create_scene();
//! let entity = engine.create_entity();
//!
//! engine.add_entity(scene, entity)?;
//! assert_eq!(engine.entity_count(scene)?, 1);
//! ```

pub mod memory;

pub use memory::MemoryEngine;

use crate::errors::EngineError;
use crate::handles::{EntityHandle, SceneHandle};

/// Renderer-side scene mutation surface.
///
/// Implementations must be shareable across threads; the per-scene ordering
/// of calls is provided by the caller, not by the implementation.
pub trait SceneGraph: Send + Sync {
    /// Inserts `entity` into `scene`.
    fn add_entity(&self, scene: SceneHandle, entity: EntityHandle) -> Result<(), EngineError>;

    /// Removes `entity` from `scene`. Absent entities are not an error.
    fn remove_entity(&self, scene: SceneHandle, entity: EntityHandle) -> Result<(), EngineError>;

    /// Number of entities currently in `scene`.
    fn entity_count(&self, scene: SceneHandle) -> Result<usize, EngineError>;
}
