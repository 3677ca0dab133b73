//! Membership Configuration
//!
//! Runtime knobs for [`SceneMembership`](crate::scene::SceneMembership) and the
//! in-memory reference engine. Every field has a default, so a partial JSON
//! document (or none at all) is valid.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use scene_membership::config::{MembershipConfig, CountConsistency};
//!
//! // Default: relaxed counts, no lock-wait warnings
//! let config = MembershipConfig::default();
//!
//! // Strict counts and a warning when a caller waits more than 4 ms
//! let config = MembershipConfig {
//!     count_consistency: CountConsistency::Locked,
//!     slow_lock_warning_ms: Some(4),
//! };
//!
//! // Or from disk
//! let config = MembershipConfig::from_json_file("membership.json")?;
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

// ---------------------------------------------------------------------------
// CountConsistency
// ---------------------------------------------------------------------------

/// How `entity_count()` relates to concurrent mutation.
///
/// | Mode      | Takes the scene lock | May observe a half-applied batch |
/// |-----------|----------------------|----------------------------------|
/// | `Relaxed` | no                   | yes                              |
/// | `Locked`  | yes                  | no                               |
///
/// `entity_count_consistent()` is always locked regardless of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountConsistency {
    /// Single engine read, never blocks on the scene lock.
    #[default]
    Relaxed,
    /// Read under the scene lock, ordered with every mutation.
    Locked,
}

// ---------------------------------------------------------------------------
// MembershipConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MembershipConfig {
    pub count_consistency: CountConsistency,
    /// Log a warning when acquiring a scene lock takes longer than this.
    /// `None` disables the timing entirely.
    pub slow_lock_warning_ms: Option<u64>,
}

impl MembershipConfig {
    #[inline]
    #[must_use]
    pub fn slow_lock_warning(&self) -> Option<Duration> {
        self.slow_lock_warning_ms.map(Duration::from_millis)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Rejects values that would make the lock-wait warning fire on every call.
    pub fn validate(&self) -> Result<()> {
        if self.slow_lock_warning_ms == Some(0) {
            return Err(Error::Config(
                "slow_lock_warning_ms must be > 0 (use null to disable)".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryEngineConfig
// ---------------------------------------------------------------------------

/// What the in-memory engine does when an entity already in a scene is
/// added again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Set semantics: the second add is a silent no-op.
    #[default]
    Ignore,
    /// The second add fails with `EngineRejected`.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryEngineConfig {
    pub duplicate_policy: DuplicatePolicy,
}

impl MemoryEngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
