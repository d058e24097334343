//! Tests for the store module, including the contract suite both backends
//! must pass identically.

use super::*;
use crate::claims::{ClaimsMode, DeleteMode, TrustLevel};
use crate::config::{ClaimConfig, WorldClaimConfig};
use crate::geometry::{ClaimBox, GridPos};

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Fresh scratch directory under the system temp dir. Tags must be unique
/// per test so parallel tests never share state.
fn scratch_dir(tag: &str) -> PathBuf {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = std::env::temp_dir().join(format!("claim-world-{tag}-{}", std::process::id()));
    if dir.exists() {
        fs::remove_dir_all(&dir).expect("clear scratch dir");
    }
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn test_config(worlds: &[&str]) -> ClaimConfig {
    let mut config = ClaimConfig::default();
    for world in worlds {
        config
            .worlds
            .insert(world.to_string(), WorldClaimConfig::default());
    }
    config
}

fn pos(x: i32, y: i32, z: i32) -> GridPos {
    GridPos::new(x, y, z)
}

fn sample_claim(world: &str, owner: &str, a: (i32, i32, i32), b: (i32, i32, i32)) -> Claim {
    Claim::new(
        -1,
        world,
        Some(owner.to_string()),
        ClaimBox::from_coords(a, b),
    )
}

fn sample_record(id: ClaimId, world: &str) -> ClaimRecord {
    ClaimRecord {
        id,
        owner: "ada".to_string(),
        lesser_corner: format!("{world};0;0;0"),
        greater_corner: format!("{world};10;10;10"),
        accessors: "public".to_string(),
        containers: String::new(),
        builders: "grace;[mods]".to_string(),
        managers: String::new(),
        parent_id: crate::claims::NO_PARENT,
    }
}

fn file_store(dir: &PathBuf, config: ClaimConfig) -> ClaimStore {
    ClaimStore::initialize(Box::new(FlatFileBackend::new(dir)), config, &NoResolver)
        .expect("initialize file store")
}

fn make_file_backend(tag: &str) -> (PathBuf, FlatFileBackend) {
    let dir = scratch_dir(tag);
    let backend = FlatFileBackend::new(&dir);
    (dir, backend)
}

fn make_sqlite_backend(tag: &str) -> (PathBuf, SqliteBackend) {
    let dir = scratch_dir(tag);
    let backend = SqliteBackend::new(dir.join("claims.db"));
    (dir, backend)
}

mod contract;
