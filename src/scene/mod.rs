//! Scene membership subsystem
//!
//! - [`SceneMembership`]: serialized add/remove gateway for one engine scene
//! - [`MembershipGuard`]: a held critical section on that scene
//! - [`SceneManager`]: registry of gateways, one per attached scene
//! - [`MembershipStats`]: counters of applied mutations

pub mod manager;
pub mod membership;
pub mod stats;

pub use manager::SceneManager;
pub use membership::{MembershipGuard, SceneMembership};
pub use stats::{MembershipStats, StatsSnapshot};
