//! The backend contract, written once and run against both implementations.

use std::collections::BTreeMap;

use super::*;

fn claim_records_round_trip(backend: &mut dyn ClaimBackend) {
    backend.ensure_schema().unwrap();
    let record = sample_record(4, "overworld");

    backend.write_claim("overworld", &record).unwrap();
    // Writing again is an upsert, not a duplicate.
    backend.write_claim("overworld", &record).unwrap();

    let loaded = backend.load_claim_records().unwrap();
    assert_eq!(
        loaded,
        vec![StoredClaim {
            world: "overworld".to_string(),
            record,
        }]
    );
}

fn deleting_a_missing_record_is_a_noop(backend: &mut dyn ClaimBackend) {
    backend.ensure_schema().unwrap();
    backend.delete_claim("overworld", 999).unwrap();

    let record = sample_record(1, "overworld");
    backend.write_claim("overworld", &record).unwrap();
    backend.delete_claim("overworld", 1).unwrap();
    backend.delete_claim("overworld", 1).unwrap();
    assert!(backend.load_claim_records().unwrap().is_empty());
}

fn player_records_round_trip(backend: &mut dyn ClaimBackend) {
    backend.ensure_schema().unwrap();
    assert_eq!(backend.load_player("ada").unwrap(), None);

    let record = PlayerRecord {
        identity: "ada".to_string(),
        last_login_ms: 1_700_000_000_000,
        accrued_blocks: 1_200,
        bonus_blocks: 300,
    };
    backend.save_player(&record).unwrap();
    assert_eq!(backend.load_player("ada").unwrap(), Some(record.clone()));

    let mut ignored = BTreeMap::new();
    ignored.insert("grace".to_string(), IgnoreMode::Standard);
    ignored.insert("alan".to_string(), IgnoreMode::AdminForced);
    backend.save_ignore_list("ada", &ignored).unwrap();
    assert_eq!(backend.load_ignore_list("ada").unwrap(), ignored);

    let mut identities = backend.list_player_identities().unwrap();
    identities.sort();
    assert_eq!(identities, vec!["ada".to_string()]);
}

fn next_claim_ids_round_trip(backend: &mut dyn ClaimBackend) {
    backend.ensure_schema().unwrap();
    assert!(backend.load_next_claim_ids().unwrap().is_empty());

    backend.save_next_claim_id("overworld", 7).unwrap();
    backend.save_next_claim_id("nether", 2).unwrap();
    backend.save_next_claim_id("overworld", 9).unwrap();

    let counters = backend.load_next_claim_ids().unwrap();
    assert_eq!(counters.get("overworld"), Some(&9));
    assert_eq!(counters.get("nether"), Some(&2));
}

fn fresh_store_starts_at_the_latest_schema(backend: &mut dyn ClaimBackend) {
    backend.ensure_schema().unwrap();
    assert_eq!(backend.schema_version().unwrap(), LATEST_SCHEMA_VERSION);
}

fn rename_keeps_an_existing_target(backend: &mut dyn ClaimBackend) {
    backend.ensure_schema().unwrap();
    for identity in ["Ada", "uuid-ada"] {
        backend
            .save_player(&PlayerRecord {
                identity: identity.to_string(),
                last_login_ms: 0,
                accrued_blocks: if identity == "Ada" { 1 } else { 2 },
                bonus_blocks: 0,
            })
            .unwrap();
    }

    // Never clobber data already stored under the new key.
    backend.rename_player("Ada", "uuid-ada").unwrap();
    let kept = backend.load_player("uuid-ada").unwrap().unwrap();
    assert_eq!(kept.accrued_blocks, 2);
}

fn rename_rewrites_the_key(backend: &mut dyn ClaimBackend) {
    backend.ensure_schema().unwrap();
    backend
        .save_player(&PlayerRecord {
            identity: "Grace".to_string(),
            last_login_ms: 5,
            accrued_blocks: 40,
            bonus_blocks: 4,
        })
        .unwrap();
    let mut ignored = BTreeMap::new();
    ignored.insert("alan".to_string(), IgnoreMode::Standard);
    backend.save_ignore_list("Grace", &ignored).unwrap();

    backend.rename_player("Grace", "uuid-grace").unwrap();
    assert_eq!(backend.load_player("Grace").unwrap(), None);
    let moved = backend.load_player("uuid-grace").unwrap().unwrap();
    assert_eq!(moved.accrued_blocks, 40);
    assert_eq!(moved.identity, "uuid-grace");
    assert_eq!(backend.load_ignore_list("uuid-grace").unwrap(), ignored);
}

macro_rules! backend_contract_tests {
    ($prefix:ident, $make:expr) => {
        mod $prefix {
            use std::fs;

            use super::*;

            #[test]
            fn claim_records_round_trip() {
                let (dir, mut backend) = $make(concat!(stringify!($prefix), "-claims-rt"));
                super::claim_records_round_trip(&mut backend);
                fs::remove_dir_all(dir).unwrap();
            }

            #[test]
            fn deleting_a_missing_record_is_a_noop() {
                let (dir, mut backend) = $make(concat!(stringify!($prefix), "-del-noop"));
                super::deleting_a_missing_record_is_a_noop(&mut backend);
                fs::remove_dir_all(dir).unwrap();
            }

            #[test]
            fn player_records_round_trip() {
                let (dir, mut backend) = $make(concat!(stringify!($prefix), "-player-rt"));
                super::player_records_round_trip(&mut backend);
                fs::remove_dir_all(dir).unwrap();
            }

            #[test]
            fn next_claim_ids_round_trip() {
                let (dir, mut backend) = $make(concat!(stringify!($prefix), "-nextid-rt"));
                super::next_claim_ids_round_trip(&mut backend);
                fs::remove_dir_all(dir).unwrap();
            }

            #[test]
            fn fresh_store_starts_at_the_latest_schema() {
                let (dir, mut backend) = $make(concat!(stringify!($prefix), "-fresh"));
                super::fresh_store_starts_at_the_latest_schema(&mut backend);
                fs::remove_dir_all(dir).unwrap();
            }

            #[test]
            fn rename_keeps_an_existing_target() {
                let (dir, mut backend) = $make(concat!(stringify!($prefix), "-rename-keep"));
                super::rename_keeps_an_existing_target(&mut backend);
                fs::remove_dir_all(dir).unwrap();
            }

            #[test]
            fn rename_rewrites_the_key() {
                let (dir, mut backend) = $make(concat!(stringify!($prefix), "-rename"));
                super::rename_rewrites_the_key(&mut backend);
                fs::remove_dir_all(dir).unwrap();
            }
        }
    };
}

backend_contract_tests!(flat_file, super::make_file_backend);
backend_contract_tests!(sqlite, super::make_sqlite_backend);
