//! SQLite backend. Kept for stores that predate the flat-file layout; both
//! backends satisfy the same contract and pass the same suite.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};

use crate::claims::{ClaimId, IgnoreMode, PlayerId, WorldId, LATEST_SCHEMA_VERSION};

use super::records::{parse_corner, ClaimRecord, PlayerRecord, StoredClaim};
use super::{ClaimBackend, NameResolver, StorageError};

/// How long a busy database is retried before an operation fails.
const BUSY_TIMEOUT: Duration = Duration::from_secs(3);

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS claimdata (
    id INTEGER NOT NULL,
    world TEXT NOT NULL DEFAULT '',
    owner TEXT NOT NULL DEFAULT '',
    lessercorner TEXT NOT NULL DEFAULT '',
    greatercorner TEXT NOT NULL DEFAULT '',
    accessors TEXT NOT NULL DEFAULT '',
    containers TEXT NOT NULL DEFAULT '',
    builders TEXT NOT NULL DEFAULT '',
    managers TEXT NOT NULL DEFAULT '',
    parentid INTEGER NOT NULL DEFAULT -1
);
CREATE TABLE IF NOT EXISTS playerdata (
    name TEXT PRIMARY KEY,
    lastlogin INTEGER NOT NULL DEFAULT 0,
    accruedblocks INTEGER NOT NULL DEFAULT 0,
    bonusblocks INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE IF NOT EXISTS ignoredata (
    name TEXT NOT NULL,
    target TEXT NOT NULL,
    adminforced INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (name, target)
);
CREATE TABLE IF NOT EXISTS nextclaimid (
    world TEXT PRIMARY KEY,
    nextid INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS schemaversion (
    version INTEGER NOT NULL
);
";

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Sql(err.to_string())
    }
}

pub struct SqliteBackend {
    path: PathBuf,
    conn: Option<Connection>,
}

impl SqliteBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            conn: None,
        }
    }

    /// The live connection, probed first. A probe failure drops the stale
    /// connection and reopens once before giving up.
    fn connection(&mut self) -> Result<&Connection, StorageError> {
        let healthy = self
            .conn
            .as_ref()
            .is_some_and(|conn| conn.query_row("SELECT 1", [], |_| Ok(())).is_ok());
        if !healthy {
            let conn =
                Connection::open(&self.path).map_err(|err| StorageError::Unavailable {
                    detail: format!("cannot open {}: {err}", self.path.display()),
                })?;
            conn.busy_timeout(BUSY_TIMEOUT)?;
            self.conn = Some(conn);
        }
        self.conn.as_ref().ok_or_else(|| StorageError::Unavailable {
            detail: "no database connection".to_string(),
        })
    }
}

impl ClaimBackend for SqliteBackend {
    fn ensure_schema(&mut self) -> Result<(), StorageError> {
        let conn = self.connection()?;
        conn.execute_batch(CREATE_TABLES)?;

        // A brand-new database writes with the current schema from the
        // start; only a store that already has rows can be behind.
        let has_version = conn
            .query_row("SELECT version FROM schemaversion LIMIT 1", [], |row| {
                row.get::<_, u32>(0)
            })
            .optional()?
            .is_some();
        if !has_version {
            let claims: i64 =
                conn.query_row("SELECT COUNT(*) FROM claimdata", [], |row| row.get(0))?;
            let players: i64 =
                conn.query_row("SELECT COUNT(*) FROM playerdata", [], |row| row.get(0))?;
            if claims == 0 && players == 0 {
                self.set_schema_version(LATEST_SCHEMA_VERSION)?;
            }
        }
        Ok(())
    }

    fn schema_version(&mut self) -> Result<u32, StorageError> {
        let conn = self.connection()?;
        let version = conn
            .query_row("SELECT version FROM schemaversion LIMIT 1", [], |row| {
                row.get::<_, u32>(0)
            })
            .optional()?;
        match version {
            Some(version) => Ok(version),
            None => {
                self.set_schema_version(0)?;
                Ok(0)
            }
        }
    }

    fn set_schema_version(&mut self, version: u32) -> Result<(), StorageError> {
        let conn = self.connection()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM schemaversion", [])?;
        tx.execute("INSERT INTO schemaversion (version) VALUES (?1)", [version])?;
        tx.commit()?;
        Ok(())
    }

    fn apply_migration(
        &mut self,
        step: u32,
        resolver: &dyn NameResolver,
    ) -> Result<(), StorageError> {
        match step {
            1 => self.migrate_player_keys(resolver),
            2 => self.migrate_claim_worlds(),
            other => Err(StorageError::Sql(format!("unknown migration step {other}"))),
        }
    }

    fn load_claim_records(&mut self) -> Result<Vec<StoredClaim>, StorageError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, world, owner, lessercorner, greatercorner, \
             accessors, containers, builders, managers, parentid FROM claimdata",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(StoredClaim {
                world: row.get::<_, WorldId>(1)?,
                record: ClaimRecord {
                    id: row.get(0)?,
                    owner: row.get(2)?,
                    lesser_corner: row.get(3)?,
                    greater_corner: row.get(4)?,
                    accessors: row.get(5)?,
                    containers: row.get(6)?,
                    builders: row.get(7)?,
                    managers: row.get(8)?,
                    parent_id: row.get(9)?,
                },
            })
        })?;

        let mut loaded = Vec::new();
        for row in rows {
            match row {
                Ok(stored) => loaded.push(stored),
                Err(err) => log::warn!("skipping unreadable claim row: {err}"),
            }
        }
        Ok(loaded)
    }

    fn write_claim(&mut self, world: &str, record: &ClaimRecord) -> Result<(), StorageError> {
        let conn = self.connection()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "DELETE FROM claimdata WHERE world = ?1 AND id = ?2",
            params![world, record.id],
        )?;
        tx.execute(
            "INSERT INTO claimdata (id, world, owner, lessercorner, greatercorner, \
             accessors, containers, builders, managers, parentid) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                record.id,
                world,
                record.owner,
                record.lesser_corner,
                record.greater_corner,
                record.accessors,
                record.containers,
                record.builders,
                record.managers,
                record.parent_id,
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn delete_claim(&mut self, world: &str, id: ClaimId) -> Result<(), StorageError> {
        let conn = self.connection()?;
        conn.execute(
            "DELETE FROM claimdata WHERE world = ?1 AND id = ?2",
            params![world, id],
        )?;
        Ok(())
    }

    fn load_next_claim_ids(&mut self) -> Result<BTreeMap<WorldId, ClaimId>, StorageError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT world, nextid FROM nextclaimid")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, WorldId>(0)?, row.get::<_, ClaimId>(1)?))
        })?;

        let mut counters = BTreeMap::new();
        for row in rows {
            match row {
                Ok((world, next)) => {
                    counters.insert(world, next);
                }
                Err(err) => log::warn!("skipping unreadable id counter row: {err}"),
            }
        }
        Ok(counters)
    }

    fn save_next_claim_id(&mut self, world: &str, next: ClaimId) -> Result<(), StorageError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO nextclaimid (world, nextid) VALUES (?1, ?2)",
            params![world, next],
        )?;
        Ok(())
    }

    fn load_player(&mut self, identity: &str) -> Result<Option<PlayerRecord>, StorageError> {
        let conn = self.connection()?;
        let record = conn
            .query_row(
                "SELECT lastlogin, accruedblocks, bonusblocks FROM playerdata WHERE name = ?1",
                [identity],
                |row| {
                    Ok(PlayerRecord {
                        identity: identity.to_string(),
                        last_login_ms: row.get::<_, i64>(0)?.max(0) as u64,
                        accrued_blocks: row.get(1)?,
                        bonus_blocks: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn save_player(&mut self, record: &PlayerRecord) -> Result<(), StorageError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT OR REPLACE INTO playerdata (name, lastlogin, accruedblocks, bonusblocks) \
             VALUES (?1, ?2, ?3, ?4)",
            params![
                record.identity,
                record.last_login_ms as i64,
                record.accrued_blocks,
                record.bonus_blocks,
            ],
        )?;
        Ok(())
    }

    fn list_player_identities(&mut self) -> Result<Vec<PlayerId>, StorageError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT name FROM playerdata")?;
        let rows = stmt.query_map([], |row| row.get::<_, PlayerId>(0))?;
        Ok(rows.filter_map(Result::ok).collect())
    }

    fn rename_player(&mut self, from: &str, to: &str) -> Result<(), StorageError> {
        let conn = self.connection()?;
        let taken = conn
            .query_row(
                "SELECT 1 FROM playerdata WHERE name = ?1",
                [to],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if taken {
            return Ok(());
        }
        let tx = conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE playerdata SET name = ?1 WHERE name = ?2",
            params![to, from],
        )?;
        tx.execute(
            "UPDATE ignoredata SET name = ?1 WHERE name = ?2",
            params![to, from],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn load_ignore_list(
        &mut self,
        identity: &str,
    ) -> Result<BTreeMap<PlayerId, IgnoreMode>, StorageError> {
        let conn = self.connection()?;
        let mut stmt =
            conn.prepare("SELECT target, adminforced FROM ignoredata WHERE name = ?1")?;
        let rows = stmt.query_map([identity], |row| {
            let admin: i64 = row.get(1)?;
            let mode = if admin != 0 {
                IgnoreMode::AdminForced
            } else {
                IgnoreMode::Standard
            };
            Ok((row.get::<_, PlayerId>(0)?, mode))
        })?;
        Ok(rows.filter_map(Result::ok).collect())
    }

    fn save_ignore_list(
        &mut self,
        identity: &str,
        ignored: &BTreeMap<PlayerId, IgnoreMode>,
    ) -> Result<(), StorageError> {
        let conn = self.connection()?;
        let tx = conn.unchecked_transaction()?;
        tx.execute("DELETE FROM ignoredata WHERE name = ?1", [identity])?;
        for (target, mode) in ignored {
            tx.execute(
                "INSERT INTO ignoredata (name, target, adminforced) VALUES (?1, ?2, ?3)",
                params![identity, target, (*mode == IgnoreMode::AdminForced) as i64],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

// ============================================================================
// Migrations
// ============================================================================

impl SqliteBackend {
    /// v0 -> v1: player rows were keyed by display name. Re-key to stable
    /// identity where the resolver still knows the name; unresolved rows
    /// stay under the legacy key rather than being dropped.
    fn migrate_player_keys(&mut self, resolver: &dyn NameResolver) -> Result<(), StorageError> {
        for name in self.list_player_identities()? {
            match resolver.resolve(&name) {
                Some(identity) if identity != name => {
                    log::info!("re-keying player row {name} -> {identity}");
                    self.rename_player(&name, &identity)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// v1 -> v2: adds the world column, fills it from the lesser corner, and
    /// purges the old `-1` sentinel rows. Rows whose corner cannot be parsed
    /// keep an empty world and are dropped at load.
    fn migrate_claim_worlds(&mut self) -> Result<(), StorageError> {
        let conn = self.connection()?;
        let has_world_column = {
            let mut stmt = conn.prepare("PRAGMA table_info(claimdata)")?;
            let names = stmt.query_map([], |row| row.get::<_, String>(1))?;
            let found = names.filter_map(Result::ok).any(|name| name == "world");
            found
        };
        if !has_world_column {
            conn.execute_batch("ALTER TABLE claimdata ADD COLUMN world TEXT NOT NULL DEFAULT ''")?;
        }

        let pending = {
            let mut stmt =
                conn.prepare("SELECT id, lessercorner FROM claimdata WHERE world = ''")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, ClaimId>(0)?, row.get::<_, String>(1)?))
            })?;
            rows.filter_map(Result::ok).collect::<Vec<_>>()
        };
        for (id, corner) in pending {
            match parse_corner(&corner) {
                Ok((world, _)) => {
                    conn.execute(
                        "UPDATE claimdata SET world = ?1 WHERE id = ?2 AND lessercorner = ?3",
                        params![world, id, corner],
                    )?;
                }
                Err(err) => {
                    log::warn!("claim row #{id} has no usable world: {err}");
                }
            }
        }

        conn.execute("DELETE FROM claimdata WHERE id < 0", [])?;
        Ok(())
    }
}
