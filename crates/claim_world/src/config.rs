//! Configuration consumed by the claim core. The embedding server owns these
//! values; the core only reads them.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::claims::{ClaimsMode, PermissionPolicy, PlayerId, WorldId};

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimConfig {
    /// Known worlds and their per-world settings. A claim recorded for a
    /// world absent from this table is dropped at load.
    pub worlds: BTreeMap<WorldId, WorldClaimConfig>,
    /// Blocks credited to each connected player per accrual run.
    pub accrual_per_run: i64,
    /// Ceiling on passively accrued blocks.
    pub accrued_cap: i64,
    /// Permission-key fragment to human-readable denial reason. Matched
    /// case-insensitively as a substring of the action's permission key.
    pub bans: BTreeMap<String, String>,
    /// Identities that bypass claim checks entirely.
    pub bypass: BTreeSet<PlayerId>,
    /// Group name to member identities. Trust lists reference groups as
    /// `[name]` entries.
    pub groups: BTreeMap<String, BTreeSet<PlayerId>>,
    /// Whether a claimless player placing the starter item may build in the
    /// wilderness of a creative-locked world.
    pub creative_bootstrap: bool,
    /// How long an applied boundary visualization lives before auto-revert.
    pub visual_revert_ms: u64,
}

impl Default for ClaimConfig {
    fn default() -> Self {
        Self {
            worlds: BTreeMap::new(),
            accrual_per_run: 100,
            accrued_cap: 80_000,
            bans: BTreeMap::new(),
            bypass: BTreeSet::new(),
            groups: BTreeMap::new(),
            creative_bootstrap: true,
            visual_revert_ms: 60_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldClaimConfig {
    pub mode: ClaimsMode,
}

impl ClaimConfig {
    pub fn load_toml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        Ok(toml::from_str(&text)?)
    }

    pub fn world_exists(&self, world: &str) -> bool {
        self.worlds.contains_key(world)
    }

    pub fn world_mode(&self, world: &str) -> ClaimsMode {
        self.worlds
            .get(world)
            .map(|world| world.mode)
            .unwrap_or_default()
    }

    /// Groups the given actor belongs to.
    pub fn groups_of(&self, actor: &str) -> BTreeSet<String> {
        self.groups
            .iter()
            .filter(|(_, members)| members.contains(actor))
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn permission_policy(&self) -> PermissionPolicy<'_> {
        PermissionPolicy {
            bans: &self.bans,
            bypass: &self.bypass,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "cannot read config: {err}"),
            ConfigError::Parse(err) => write!(f, "cannot parse config: {err}"),
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}
