//! Flat-file backend: one JSON document per record under a data directory.
//!
//! Layout:
//!
//! ```text
//! <root>/schema_version            store schema version, bare integer
//! <root>/claims/<world>/<id>.json  one claim record per file
//! <root>/claims/<world>/_nextid    per-world claim id counter
//! <root>/players/<id>.json         player block balances
//! <root>/players/<id>.ignore.json  player ignore list
//! ```
//!
//! Stores written before schema v2 kept claim files directly under
//! `claims/`; the v2 migration sorts them into per-world directories.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::claims::{ClaimId, IgnoreMode, PlayerId, WorldId, LATEST_SCHEMA_VERSION};

use super::records::{ClaimRecord, PlayerRecord, StoredClaim};
use super::{ClaimBackend, NameResolver, StorageError};

const SCHEMA_FILE: &str = "schema_version";
const CLAIMS_DIR: &str = "claims";
const PLAYERS_DIR: &str = "players";
const NEXT_ID_FILE: &str = "_nextid";
const IGNORE_SUFFIX: &str = ".ignore.json";

pub struct FlatFileBackend {
    root: PathBuf,
}

impl FlatFileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn claims_dir(&self) -> PathBuf {
        self.root.join(CLAIMS_DIR)
    }

    fn players_dir(&self) -> PathBuf {
        self.root.join(PLAYERS_DIR)
    }

    fn claim_path(&self, world: &str, id: ClaimId) -> PathBuf {
        self.claims_dir().join(world).join(format!("{id}.json"))
    }

    fn player_path(&self, identity: &str) -> PathBuf {
        self.players_dir().join(format!("{identity}.json"))
    }

    fn ignore_path(&self, identity: &str) -> PathBuf {
        self.players_dir().join(format!("{identity}{IGNORE_SUFFIX}"))
    }

    fn has_any_data(&self) -> Result<bool, StorageError> {
        for dir in [self.claims_dir(), self.players_dir()] {
            if dir_entries(&dir)?.next().is_some() {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl ClaimBackend for FlatFileBackend {
    fn ensure_schema(&mut self) -> Result<(), StorageError> {
        for dir in [self.root.clone(), self.claims_dir(), self.players_dir()] {
            fs::create_dir_all(&dir).map_err(|err| StorageError::Unavailable {
                detail: format!("cannot create {}: {err}", dir.display()),
            })?;
        }
        // A brand-new store writes with the current schema from the start.
        if !self.root.join(SCHEMA_FILE).exists() && !self.has_any_data()? {
            self.set_schema_version(LATEST_SCHEMA_VERSION)?;
        }
        Ok(())
    }

    fn schema_version(&mut self) -> Result<u32, StorageError> {
        let path = self.root.join(SCHEMA_FILE);
        if !path.exists() {
            self.set_schema_version(0)?;
            return Ok(0);
        }
        let text = fs::read_to_string(&path)?;
        text.trim()
            .parse::<u32>()
            .map_err(|_| StorageError::Serde(format!("invalid schema version {text:?}")))
    }

    fn set_schema_version(&mut self, version: u32) -> Result<(), StorageError> {
        fs::write(self.root.join(SCHEMA_FILE), version.to_string())?;
        Ok(())
    }

    fn apply_migration(
        &mut self,
        step: u32,
        resolver: &dyn NameResolver,
    ) -> Result<(), StorageError> {
        match step {
            1 => self.migrate_player_keys(resolver),
            2 => self.migrate_claims_into_world_dirs(),
            other => Err(StorageError::Serde(format!("unknown migration step {other}"))),
        }
    }

    fn load_claim_records(&mut self) -> Result<Vec<StoredClaim>, StorageError> {
        let mut loaded = Vec::new();
        for world_entry in dir_entries(&self.claims_dir())? {
            let world_entry = world_entry?;
            let world_path = world_entry.path();
            if !world_path.is_dir() {
                continue;
            }
            let world: WorldId = world_entry.file_name().to_string_lossy().into_owned();
            for entry in dir_entries(&world_path)? {
                let path = entry?.path();
                if claim_id_of(&path).is_none() {
                    continue;
                }
                match read_json_from_path::<ClaimRecord>(&path) {
                    Ok(record) => loaded.push(StoredClaim {
                        world: world.clone(),
                        record,
                    }),
                    Err(err) => {
                        log::warn!("skipping unreadable claim file {}: {err}", path.display());
                    }
                }
            }
        }
        Ok(loaded)
    }

    fn write_claim(&mut self, world: &str, record: &ClaimRecord) -> Result<(), StorageError> {
        let path = self.claim_path(world, record.id);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        write_json_atomic(&path, record)
    }

    fn delete_claim(&mut self, world: &str, id: ClaimId) -> Result<(), StorageError> {
        remove_file_if_present(&self.claim_path(world, id))
    }

    fn load_next_claim_ids(&mut self) -> Result<BTreeMap<WorldId, ClaimId>, StorageError> {
        let mut counters = BTreeMap::new();
        for world_entry in dir_entries(&self.claims_dir())? {
            let world_entry = world_entry?;
            if !world_entry.path().is_dir() {
                continue;
            }
            let path = world_entry.path().join(NEXT_ID_FILE);
            if !path.exists() {
                continue;
            }
            let text = fs::read_to_string(&path)?;
            match text.trim().parse::<ClaimId>() {
                Ok(next) => {
                    let world = world_entry.file_name().to_string_lossy().into_owned();
                    counters.insert(world, next);
                }
                Err(_) => {
                    log::warn!("ignoring invalid id counter {}", path.display());
                }
            }
        }
        Ok(counters)
    }

    fn save_next_claim_id(&mut self, world: &str, next: ClaimId) -> Result<(), StorageError> {
        let dir = self.claims_dir().join(world);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join(NEXT_ID_FILE), next.to_string())?;
        Ok(())
    }

    fn load_player(&mut self, identity: &str) -> Result<Option<PlayerRecord>, StorageError> {
        let path = self.player_path(identity);
        if !path.exists() {
            return Ok(None);
        }
        match read_json_from_path::<PlayerRecord>(&path) {
            Ok(record) => Ok(Some(record)),
            Err(err) => {
                log::warn!("skipping unreadable player file {}: {err}", path.display());
                Ok(None)
            }
        }
    }

    fn save_player(&mut self, record: &PlayerRecord) -> Result<(), StorageError> {
        write_json_atomic(&self.player_path(&record.identity), record)
    }

    fn list_player_identities(&mut self) -> Result<Vec<PlayerId>, StorageError> {
        let mut identities = Vec::new();
        for entry in dir_entries(&self.players_dir())? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if name.ends_with(IGNORE_SUFFIX) {
                continue;
            }
            if let Some(identity) = name.strip_suffix(".json") {
                identities.push(identity.to_string());
            }
        }
        Ok(identities)
    }

    fn rename_player(&mut self, from: &str, to: &str) -> Result<(), StorageError> {
        let src = self.player_path(from);
        let dst = self.player_path(to);
        if src.exists() && !dst.exists() {
            match read_json_from_path::<PlayerRecord>(&src) {
                Ok(mut record) => {
                    record.identity = to.to_string();
                    write_json_atomic(&dst, &record)?;
                    remove_file_if_present(&src)?;
                }
                // An unreadable record keeps its old key; re-keying garbage
                // would only hide it.
                Err(err) => {
                    log::warn!("not re-keying unreadable player file {}: {err}", src.display());
                }
            }
        }

        let src = self.ignore_path(from);
        let dst = self.ignore_path(to);
        if src.exists() && !dst.exists() {
            fs::rename(&src, &dst)?;
        }
        Ok(())
    }

    fn load_ignore_list(
        &mut self,
        identity: &str,
    ) -> Result<BTreeMap<PlayerId, IgnoreMode>, StorageError> {
        let path = self.ignore_path(identity);
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        match read_json_from_path(&path) {
            Ok(ignored) => Ok(ignored),
            Err(err) => {
                log::warn!("skipping unreadable ignore list {}: {err}", path.display());
                Ok(BTreeMap::new())
            }
        }
    }

    fn save_ignore_list(
        &mut self,
        identity: &str,
        ignored: &BTreeMap<PlayerId, IgnoreMode>,
    ) -> Result<(), StorageError> {
        write_json_atomic(&self.ignore_path(identity), ignored)
    }
}

// ============================================================================
// Migrations
// ============================================================================

impl FlatFileBackend {
    /// v0 -> v1: player files were keyed by display name. Re-key to stable
    /// identity where the resolver still knows the name; unresolved files
    /// stay under the legacy key rather than being dropped.
    fn migrate_player_keys(&mut self, resolver: &dyn NameResolver) -> Result<(), StorageError> {
        for name in self.list_player_identities()? {
            match resolver.resolve(&name) {
                Some(identity) if identity != name => {
                    log::info!("re-keying player data {name} -> {identity}");
                    self.rename_player(&name, &identity)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// v1 -> v2: claim files lived flat under `claims/`. Sort them into
    /// per-world directories using the world named in the record, and purge
    /// the old `-1` sentinel records.
    fn migrate_claims_into_world_dirs(&mut self) -> Result<(), StorageError> {
        let mut flat_files = Vec::new();
        for entry in dir_entries(&self.claims_dir())? {
            flat_files.push(entry?.path());
        }
        for path in flat_files {
            let Some(id) = claim_id_of(&path) else {
                continue;
            };
            if id < 0 {
                log::info!("purging sentinel claim file {}", path.display());
                remove_file_if_present(&path)?;
                continue;
            }
            let record = match read_json_from_path::<ClaimRecord>(&path) {
                Ok(record) => record,
                Err(err) => {
                    log::warn!("leaving unmigratable claim file {}: {err}", path.display());
                    continue;
                }
            };
            match record.world() {
                Ok(world) => {
                    self.write_claim(&world, &record)?;
                    remove_file_if_present(&path)?;
                }
                Err(err) => {
                    log::warn!("leaving unmigratable claim file {}: {err}", path.display());
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// Helper functions
// ============================================================================

fn dir_entries(dir: &Path) -> Result<fs::ReadDir, StorageError> {
    fs::read_dir(dir).map_err(StorageError::from)
}

/// Claim id encoded in a record file name (`<id>.json`), if this is one.
fn claim_id_of(path: &Path) -> Option<ClaimId> {
    if !path.is_file() {
        return None;
    }
    path.file_name()?
        .to_str()?
        .strip_suffix(".json")?
        .parse::<ClaimId>()
        .ok()
}

fn read_json_from_path<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let data = fs::read(path)?;
    Ok(serde_json::from_slice(&data)?)
}

/// Writes via a sibling temp file and rename, so a reader never sees a
/// half-written record.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let data = serde_json::to_vec_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

fn remove_file_if_present(path: &Path) -> Result<(), StorageError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}
