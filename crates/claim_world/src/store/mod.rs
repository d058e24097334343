//! Durable storage for claims and player records, behind one backend
//! contract with interchangeable implementations.
//!
//! This module is organized into submodules:
//! - `records`: Backend-agnostic persisted record shapes and codecs
//! - `file`: Flat-file backend (primary), one JSON document per record
//! - `database`: SQLite backend (legacy/optional)
//!
//! [`ClaimStore`] is the process-wide facade the rest of the system talks
//! to: it owns the active backend, the per-world claim managers, and the
//! player-data cache.

mod database;
mod file;
mod records;

#[cfg(test)]
mod tests;

pub use database::SqliteBackend;
pub use file::FlatFileBackend;
pub use records::{
    encode_corner, encode_trust_list, parse_corner, parse_trust_list, ClaimRecord, PlayerRecord,
    RecordError, StoredClaim,
};

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io;
use std::sync::{Arc, Mutex, RwLock};
use std::thread;

use crate::claims::{
    AccessRequest, Claim, ClaimAction, ClaimCacheRef, ClaimError, ClaimId, ClaimWorldManager,
    ClaimsMode, Denial, DeleteMode, IgnoreMode, PlayerData, PlayerId, TrustLevel, WorldId,
    LATEST_SCHEMA_VERSION,
};
use crate::config::ClaimConfig;
use crate::geometry::{ClaimBox, GridPos};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backing store cannot be opened at all. Fatal to initialization;
    /// the caller may fall back to another backend.
    Unavailable { detail: String },
    Io(String),
    Serde(String),
    Sql(String),
    /// The store was written by a newer build than this one.
    UnsupportedSchema { found: u32, supported: u32 },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Unavailable { detail } => {
                write!(f, "backing store unavailable: {detail}")
            }
            StorageError::Io(detail) => write!(f, "storage i/o failure: {detail}"),
            StorageError::Serde(detail) => write!(f, "storage encoding failure: {detail}"),
            StorageError::Sql(detail) => write!(f, "database failure: {detail}"),
            StorageError::UnsupportedSchema { found, supported } => {
                write!(
                    f,
                    "store schema v{found} is newer than supported v{supported}"
                )
            }
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serde(err.to_string())
    }
}

/// A store-level operation failure: either a claim invariant was violated or
/// the backend misbehaved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    Claim(ClaimError),
    Storage(StorageError),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Claim(err) => write!(f, "{err}"),
            StoreError::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl From<ClaimError> for StoreError {
    fn from(err: ClaimError) -> Self {
        StoreError::Claim(err)
    }
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        StoreError::Storage(err)
    }
}

// ============================================================================
// External Interfaces
// ============================================================================

/// Resolves a legacy display name to a stable identity, when the embedding
/// server still knows one. Used only by the one-time key migration.
pub trait NameResolver {
    fn resolve(&self, name: &str) -> Option<PlayerId>;
}

/// Resolver that knows nobody; every legacy key is left in place.
pub struct NoResolver;

impl NameResolver for NoResolver {
    fn resolve(&self, _name: &str) -> Option<PlayerId> {
        None
    }
}

impl NameResolver for BTreeMap<String, PlayerId> {
    fn resolve(&self, name: &str) -> Option<PlayerId> {
        self.get(name).cloned()
    }
}

// ============================================================================
// Backend Contract
// ============================================================================

/// The contract both storage backends satisfy identically. All methods are
/// called with the store-wide write lock held, so implementations never see
/// concurrent calls.
pub trait ClaimBackend: Send {
    /// Opens or creates the backing store and ensures its schema objects
    /// exist. Failure here is fatal to initialization.
    fn ensure_schema(&mut self) -> Result<(), StorageError>;

    fn schema_version(&mut self) -> Result<u32, StorageError>;
    fn set_schema_version(&mut self, version: u32) -> Result<(), StorageError>;

    /// Applies the migration that upgrades the store to schema `step`. Each
    /// step must be idempotent so a partially completed run can be repeated.
    fn apply_migration(&mut self, step: u32, resolver: &dyn NameResolver)
        -> Result<(), StorageError>;

    /// Every readable claim record, with its storage world key. Unreadable
    /// entries are logged and skipped, never an error.
    fn load_claim_records(&mut self) -> Result<Vec<StoredClaim>, StorageError>;

    /// Idempotent upsert. A concurrent reader must never observe a
    /// partially-written record.
    fn write_claim(&mut self, world: &str, record: &ClaimRecord) -> Result<(), StorageError>;

    /// Deleting an id with no record is a no-op, not an error.
    fn delete_claim(&mut self, world: &str, id: ClaimId) -> Result<(), StorageError>;

    fn load_next_claim_ids(&mut self) -> Result<BTreeMap<WorldId, ClaimId>, StorageError>;
    fn save_next_claim_id(&mut self, world: &str, next: ClaimId) -> Result<(), StorageError>;

    fn load_player(&mut self, identity: &str) -> Result<Option<PlayerRecord>, StorageError>;
    fn save_player(&mut self, record: &PlayerRecord) -> Result<(), StorageError>;
    fn list_player_identities(&mut self) -> Result<Vec<PlayerId>, StorageError>;
    fn rename_player(&mut self, from: &str, to: &str) -> Result<(), StorageError>;

    fn load_ignore_list(
        &mut self,
        identity: &str,
    ) -> Result<BTreeMap<PlayerId, IgnoreMode>, StorageError>;
    fn save_ignore_list(
        &mut self,
        identity: &str,
        ignored: &BTreeMap<PlayerId, IgnoreMode>,
    ) -> Result<(), StorageError>;
}

// ============================================================================
// ClaimStore
// ============================================================================

type PlayerKey = (PlayerId, WorldId);

/// Process-wide authority over claims and player data.
///
/// Owns the active backend (writes serialized behind one mutex), one
/// [`ClaimWorldManager`] per world (lookups take a per-world read lock), and
/// the player-data cache (one lock per record). Constructed explicitly at
/// startup and passed by handle; tests build isolated instances freely.
pub struct ClaimStore {
    config: ClaimConfig,
    backend: Mutex<Box<dyn ClaimBackend>>,
    worlds: RwLock<BTreeMap<WorldId, Arc<RwLock<ClaimWorldManager>>>>,
    players: Mutex<HashMap<PlayerKey, Arc<Mutex<PlayerData>>>>,
}

impl std::fmt::Debug for ClaimStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimStore").finish_non_exhaustive()
    }
}

impl ClaimStore {
    /// Boots the store: ensures the schema, runs pending migrations in
    /// ascending order, loads every claim record, and reconstructs the claim
    /// graph per world. Corrupt, orphaned, and unknown-world records are
    /// logged and deleted; only a store that cannot be opened at all (or
    /// carries a schema from the future) fails initialization.
    pub fn initialize(
        mut backend: Box<dyn ClaimBackend>,
        config: ClaimConfig,
        resolver: &dyn NameResolver,
    ) -> Result<Self, StorageError> {
        backend.ensure_schema()?;

        let mut version = backend.schema_version()?;
        if version > LATEST_SCHEMA_VERSION {
            return Err(StorageError::UnsupportedSchema {
                found: version,
                supported: LATEST_SCHEMA_VERSION,
            });
        }
        while version < LATEST_SCHEMA_VERSION {
            let step = version + 1;
            log::info!("migrating claim storage to schema v{step}");
            backend.apply_migration(step, resolver)?;
            backend.set_schema_version(step)?;
            version = step;
        }

        let worlds = Self::load_claim_graph(&mut backend, &config)?;

        let store = Self {
            config,
            backend: Mutex::new(backend),
            worlds: RwLock::new(worlds),
            players: Mutex::new(HashMap::new()),
        };
        Ok(store)
    }

    fn load_claim_graph(
        backend: &mut Box<dyn ClaimBackend>,
        config: &ClaimConfig,
    ) -> Result<BTreeMap<WorldId, Arc<RwLock<ClaimWorldManager>>>, StorageError> {
        let stored = backend.load_claim_records()?;
        let next_ids = backend.load_next_claim_ids()?;

        let mut top_level = Vec::new();
        let mut subdivisions = Vec::new();
        let mut discard: Vec<(WorldId, ClaimId)> = Vec::new();

        for StoredClaim { world, record } in stored {
            let id = record.id;
            match record.to_claim() {
                Err(err) => {
                    log::warn!("dropping unreadable claim record #{id} in {world}: {err}");
                    discard.push((world, id));
                }
                Ok(claim) if claim.world != world => {
                    log::warn!(
                        "dropping claim record #{id}: stored under {world} but corners say {}",
                        claim.world
                    );
                    discard.push((world, id));
                }
                Ok(claim) if !config.world_exists(&claim.world) => {
                    log::warn!(
                        "dropping claim record #{id}: world {} does not exist",
                        claim.world
                    );
                    discard.push((world, id));
                }
                Ok(claim) if claim.parent.is_none() => top_level.push(claim),
                Ok(claim) => subdivisions.push(claim),
            }
        }

        let mut managers: BTreeMap<WorldId, ClaimWorldManager> = BTreeMap::new();
        for claim in top_level {
            let manager = managers
                .entry(claim.world.clone())
                .or_insert_with(|| ClaimWorldManager::new(claim.world.clone()));
            let world = claim.world.clone();
            let id = claim.id;
            if let Err(err) = manager.add_claim(claim) {
                log::warn!("dropping claim record #{id} in {world}: {err}");
                discard.push((world, id));
            }
        }

        // Subdivisions attach to whichever top-level claim contains their
        // lesser corner; the stored parent id is a hint, not authoritative.
        for mut claim in subdivisions {
            let world = claim.world.clone();
            let id = claim.id;
            let Some(manager) = managers.get_mut(&world) else {
                log::warn!("dropping orphaned subdivision record #{id}: no claims in {world}");
                discard.push((world, id));
                continue;
            };
            let parent_id = manager
                .top_level_claims()
                .find(|top| top.bounds().contains(claim.bounds().lesser(), true))
                .map(|top| top.id);
            let Some(parent_id) = parent_id else {
                log::warn!("dropping orphaned subdivision record #{id} in {world}");
                discard.push((world, id));
                continue;
            };
            claim.parent = Some(parent_id);
            if let Err(err) = manager.add_claim(claim) {
                log::warn!("dropping subdivision record #{id} in {world}: {err}");
                discard.push((world, id));
            }
        }

        for (world, id) in discard {
            if let Err(err) = backend.delete_claim(&world, id) {
                log::error!("failed to purge dropped claim record #{id} in {world}: {err}");
            }
        }

        let mut worlds = BTreeMap::new();
        let mut total = 0usize;
        for (world, mut manager) in managers {
            if let Some(next) = next_ids.get(&world) {
                manager.seed_next_claim_id(*next);
            }
            total += manager.len();
            worlds.insert(world, Arc::new(RwLock::new(manager)));
        }
        log::info!("loaded {total} claims across {} worlds", worlds.len());
        Ok(worlds)
    }

    pub fn config(&self) -> &ClaimConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // World managers and lookup
    // ------------------------------------------------------------------

    /// The manager for `world`, created empty on first use.
    pub fn get_claim_world_manager(&self, world: &str) -> Arc<RwLock<ClaimWorldManager>> {
        {
            let worlds = self.worlds.read().expect("world table lock poisoned");
            if let Some(manager) = worlds.get(world) {
                return Arc::clone(manager);
            }
        }
        let mut worlds = self.worlds.write().expect("world table lock poisoned");
        Arc::clone(
            worlds
                .entry(world.to_string())
                .or_insert_with(|| Arc::new(RwLock::new(ClaimWorldManager::new(world)))),
        )
    }

    /// Most specific claim containing `pos` in `world`, if any.
    pub fn get_claim_at(
        &self,
        world: &str,
        pos: GridPos,
        ignore_height: bool,
        hint: Option<&ClaimCacheRef>,
    ) -> Option<Arc<Claim>> {
        let manager = self.get_claim_world_manager(world);
        let manager = manager.read().expect("world manager lock poisoned");
        manager.get_claim_at(pos, ignore_height, hint)
    }

    // ------------------------------------------------------------------
    // Claim mutation (validated in memory, then written through)
    // ------------------------------------------------------------------

    /// Validates and registers a claim; with `write_to_storage` the record
    /// and the world's id counter are persisted before returning.
    pub fn add_claim(
        &self,
        claim: Claim,
        write_to_storage: bool,
    ) -> Result<Arc<Claim>, StoreError> {
        let world = claim.world.clone();
        let (added, next_id) = {
            let manager = self.get_claim_world_manager(&world);
            let mut manager = manager.write().expect("world manager lock poisoned");
            let added = manager.add_claim(claim)?;
            (added, manager.next_claim_id())
        };

        if write_to_storage {
            let mut backend = self.backend.lock().expect("backend mutex poisoned");
            backend.write_claim(&world, &ClaimRecord::from_claim(&added))?;
            backend.save_next_claim_id(&world, next_id)?;
        }
        Ok(added)
    }

    /// Removes a claim from the index and the backing store. With
    /// `release_blocks`, the claim's area is returned to the owner's bonus
    /// balance. Deleting a parent with live subdivisions requires
    /// [`DeleteMode::Cascade`].
    pub fn delete_claim(
        &self,
        world: &str,
        id: ClaimId,
        mode: DeleteMode,
        release_blocks: bool,
    ) -> Result<(), StoreError> {
        let removed = {
            let manager = self.get_claim_world_manager(world);
            let mut manager = manager.write().expect("world manager lock poisoned");
            manager.delete_claim(id, mode)?
        };

        {
            let mut backend = self.backend.lock().expect("backend mutex poisoned");
            for claim in &removed {
                backend.delete_claim(world, claim.id)?;
            }
        }

        if release_blocks {
            for claim in &removed {
                let (Some(owner), None) = (&claim.owner, claim.parent) else {
                    continue;
                };
                let data = self.get_or_create_player_data(world, owner);
                let mut data = data.lock().expect("player data lock poisoned");
                data.add_bonus(claim.area_blocks());
            }
        }
        Ok(())
    }

    /// Applies new boundaries after re-validating overlap and containment,
    /// then persists the updated record.
    pub fn resize_claim(
        &self,
        world: &str,
        id: ClaimId,
        bounds: ClaimBox,
    ) -> Result<Arc<Claim>, StoreError> {
        let resized = {
            let manager = self.get_claim_world_manager(world);
            let mut manager = manager.write().expect("world manager lock poisoned");
            manager.resize_claim(id, bounds)?
        };

        let mut backend = self.backend.lock().expect("backend mutex poisoned");
        backend.write_claim(world, &ClaimRecord::from_claim(&resized))?;
        Ok(resized)
    }

    /// Rewrites a top-level claim's owner and persists it. Subdivisions are
    /// refused.
    pub fn transfer_claim_owner(
        &self,
        world: &str,
        id: ClaimId,
        new_owner: impl Into<String>,
    ) -> Result<Arc<Claim>, StoreError> {
        let transferred = {
            let manager = self.get_claim_world_manager(world);
            let mut manager = manager.write().expect("world manager lock poisoned");
            manager.transfer_claim_owner(id, new_owner)?
        };

        let mut backend = self.backend.lock().expect("backend mutex poisoned");
        backend.write_claim(world, &ClaimRecord::from_claim(&transferred))?;
        Ok(transferred)
    }

    /// Adds `entry` to a claim's trust list for `level` and persists the
    /// record. Whether the granting actor holds manager trust is the
    /// caller's check, via [`ClaimAction::GrantTrust`].
    pub fn grant_trust(
        &self,
        world: &str,
        id: ClaimId,
        level: TrustLevel,
        entry: impl Into<String>,
    ) -> Result<Arc<Claim>, StoreError> {
        let granted = {
            let manager = self.get_claim_world_manager(world);
            let mut manager = manager.write().expect("world manager lock poisoned");
            manager.grant_trust(id, level, entry)?
        };

        let mut backend = self.backend.lock().expect("backend mutex poisoned");
        backend.write_claim(world, &ClaimRecord::from_claim(&granted))?;
        Ok(granted)
    }

    /// Removes `entry` from every trust list of a claim and persists the
    /// record.
    pub fn revoke_trust(
        &self,
        world: &str,
        id: ClaimId,
        entry: &str,
    ) -> Result<Arc<Claim>, StoreError> {
        let revoked = {
            let manager = self.get_claim_world_manager(world);
            let mut manager = manager.write().expect("world manager lock poisoned");
            manager.revoke_trust(id, entry)?
        };

        let mut backend = self.backend.lock().expect("backend mutex poisoned");
        backend.write_claim(world, &ClaimRecord::from_claim(&revoked))?;
        Ok(revoked)
    }

    // ------------------------------------------------------------------
    // Player data
    // ------------------------------------------------------------------

    /// The cached record for (player, world), loading it from storage on
    /// first access. A backend read failure is logged and yields a fresh
    /// record rather than blocking play.
    pub fn get_or_create_player_data(
        &self,
        world: &str,
        player: &str,
    ) -> Arc<Mutex<PlayerData>> {
        let key = (player.to_string(), world.to_string());
        let mut players = self.players.lock().expect("player cache lock poisoned");
        if let Some(data) = players.get(&key) {
            return Arc::clone(data);
        }

        let mut data = PlayerData::new(player, world);
        {
            let mut backend = self.backend.lock().expect("backend mutex poisoned");
            match backend.load_player(player) {
                Ok(Some(record)) => {
                    data.accrued_blocks = record.accrued_blocks;
                    data.bonus_blocks = record.bonus_blocks;
                    data.last_login_ms = record.last_login_ms;
                }
                Ok(None) => {}
                Err(err) => {
                    log::warn!("failed to load player data for {player}: {err}");
                }
            }
            match backend.load_ignore_list(player) {
                Ok(ignored) => data.ignored = ignored,
                Err(err) => {
                    log::warn!("failed to load ignore list for {player}: {err}");
                }
            }
        }

        let data = Arc::new(Mutex::new(data));
        players.insert(key, Arc::clone(&data));
        data
    }

    /// Writes one player record (and its ignore list) through to storage and
    /// clears the dirty flag.
    pub fn save_player_data(&self, data: &Arc<Mutex<PlayerData>>) -> Result<(), StorageError> {
        let (record, ignored, identity) = {
            let data = data.lock().expect("player data lock poisoned");
            (
                PlayerRecord {
                    identity: data.player.clone(),
                    last_login_ms: data.last_login_ms,
                    accrued_blocks: data.accrued_blocks,
                    bonus_blocks: data.bonus_blocks,
                },
                data.ignored.clone(),
                data.player.clone(),
            )
        };

        let mut backend = self.backend.lock().expect("backend mutex poisoned");
        backend.save_player(&record)?;
        backend.save_ignore_list(&identity, &ignored)?;
        drop(backend);

        data.lock().expect("player data lock poisoned").mark_clean();
        Ok(())
    }

    /// Flushes a cached record on a background thread, off the
    /// permission-check path. Returns the join handle so shutdown (and
    /// tests) can wait for the write; a missing cache entry returns `None`.
    pub fn async_save_player_data(
        self: &Arc<Self>,
        world: &str,
        player: &str,
    ) -> Option<thread::JoinHandle<()>> {
        let key = (player.to_string(), world.to_string());
        let data = {
            let players = self.players.lock().expect("player cache lock poisoned");
            players.get(&key).map(Arc::clone)
        }?;

        let store = Arc::clone(self);
        let player = player.to_string();
        Some(thread::spawn(move || {
            if let Err(err) = store.save_player_data(&data) {
                log::error!("async save of player data for {player} failed: {err}");
            }
        }))
    }

    /// Evicts the cached record for (player, world), as on disconnect.
    pub fn clear_cached_player_data(&self, world: &str, player: &str) {
        let key = (player.to_string(), world.to_string());
        self.players
            .lock()
            .expect("player cache lock poisoned")
            .remove(&key);
    }

    /// Snapshot of every cached player record, for the maintenance tasks.
    pub fn cached_player_data(&self) -> Vec<Arc<Mutex<PlayerData>>> {
        self.players
            .lock()
            .expect("player cache lock poisoned")
            .values()
            .map(Arc::clone)
            .collect()
    }

    /// Claim blocks the player can still spend in `world`.
    pub fn remaining_claim_blocks(&self, world: &str, player: &str) -> i64 {
        let claimed = {
            let manager = self.get_claim_world_manager(world);
            let manager = manager.read().expect("world manager lock poisoned");
            manager.claimed_area(player)
        };
        let data = self.get_or_create_player_data(world, player);
        let data = data.lock().expect("player data lock poisoned");
        data.remaining_claim_blocks(claimed)
    }

    // ------------------------------------------------------------------
    // Permission checks
    // ------------------------------------------------------------------

    /// Full permission decision for one action at one position, including
    /// wilderness policy when no claim contains the position.
    ///
    /// `placing_starter` marks the bootstrap case a creative-locked world
    /// exempts: a player with no claims yet placing the starter item.
    pub fn allow_action(
        &self,
        world: &str,
        pos: GridPos,
        actor: &str,
        action: ClaimAction,
        placing_starter: bool,
    ) -> Result<(), Denial> {
        let data = self.get_or_create_player_data(world, actor);
        let (hint, ignore_claims) = {
            let data = data.lock().expect("player data lock poisoned");
            (data.last_claim, data.ignore_claims)
        };

        let manager = self.get_claim_world_manager(world);
        let manager = manager.read().expect("world manager lock poisoned");
        let Some(claim) = manager.get_claim_at(pos, false, hint.as_ref()) else {
            drop(manager);
            return self.allow_in_wilderness(world, actor, action, placing_starter);
        };

        let parent = claim.parent.and_then(|id| manager.claim(id).cloned());
        let groups = self.config.groups_of(actor);
        let request = AccessRequest {
            actor,
            action,
            groups: &groups,
            ignore_claims,
        };
        let decision = claim.check_action(&request, parent.as_deref(), &self.config.permission_policy());
        drop(manager);

        let mut data = data.lock().expect("player data lock poisoned");
        data.last_claim = Some(ClaimCacheRef {
            claim_id: claim.id,
            version: claim.version,
        });
        decision
    }

    fn allow_in_wilderness(
        &self,
        world: &str,
        actor: &str,
        action: ClaimAction,
        placing_starter: bool,
    ) -> Result<(), Denial> {
        let mode = self.config.world_mode(world);
        match mode {
            ClaimsMode::OpenSurvival => Ok(()),
            ClaimsMode::SurvivalRequiringClaims => Err(Denial::Wilderness { mode }),
            ClaimsMode::CreativeLocked => {
                let bootstrap = self.config.creative_bootstrap
                    && action == ClaimAction::Build
                    && placing_starter
                    && {
                        let manager = self.get_claim_world_manager(world);
                        let manager = manager.read().expect("world manager lock poisoned");
                        let no_claims = manager.claims_owned_by(actor).next().is_none();
                        no_claims
                    };
                if bootstrap {
                    Ok(())
                } else {
                    Err(Denial::Wilderness { mode })
                }
            }
        }
    }

    pub fn allow_build(
        &self,
        world: &str,
        pos: GridPos,
        actor: &str,
        placing_starter: bool,
    ) -> Result<(), Denial> {
        self.allow_action(world, pos, actor, ClaimAction::Build, placing_starter)
    }

    pub fn allow_break(&self, world: &str, pos: GridPos, actor: &str) -> Result<(), Denial> {
        self.allow_action(world, pos, actor, ClaimAction::Break, false)
    }

    pub fn allow_container_access(
        &self,
        world: &str,
        pos: GridPos,
        actor: &str,
    ) -> Result<(), Denial> {
        self.allow_action(world, pos, actor, ClaimAction::AccessContainer, false)
    }

    pub fn allow_use(&self, world: &str, pos: GridPos, actor: &str) -> Result<(), Denial> {
        self.allow_action(world, pos, actor, ClaimAction::Use, false)
    }
}
