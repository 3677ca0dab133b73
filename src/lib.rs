//! Thread-safe scene membership bookkeeping.
//!
//! Sits between loaded assets (each owning a fixed list of entities) and a
//! renderer's scene graph, and serializes every add/remove against a scene so
//! that streaming threads, the render thread and control threads can all
//! mutate the same scene without tearing it.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use scene_membership::{AssetRegistry, LoadedAsset, MemoryEngine, SceneMembership};
//!
//! let engine = Arc::new(MemoryEngine::new());
//! let assets = Arc::new(AssetRegistry::new());
//!
//! let scene = engine.create_scene();
//! let asset = assets.register(LoadedAsset::new(engine.create_entities(3)));
//!
//! let membership = SceneMembership::new(scene, engine, assets);
//! membership.add_asset_entities(asset)?;
//! assert_eq!(membership.entity_count()?, 3);
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod assets;
pub mod config;
pub mod engine;
pub mod errors;
pub mod handles;
pub mod scene;

pub use assets::{AssetEntityIndex, AssetRegistry, LoadedAsset};
pub use config::{CountConsistency, DuplicatePolicy, MemoryEngineConfig, MembershipConfig};
pub use engine::{MemoryEngine, SceneGraph};
pub use errors::{EngineError, Error, ErrorKind, Result};
pub use handles::{AssetHandle, EntityHandle, EntityList, SceneHandle, collect_entities};
pub use scene::{MembershipGuard, SceneManager, SceneMembership, StatsSnapshot};
