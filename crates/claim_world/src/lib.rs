//! Ownership and access control over rectangular volumes of a shared grid
//! world: the claim data model, per-world spatial lookup, a layered
//! permission resolver, and schema-versioned persistence behind swappable
//! backends.

pub mod claims;
pub mod config;
pub mod geometry;
pub mod store;
pub mod tasks;

pub use claims::{
    AccessRequest, Claim, ClaimAction, ClaimCacheRef, ClaimError, ClaimId, ClaimWorldManager,
    ClaimsMode, Denial, DeleteMode, IgnoreMode, PermissionPolicy, PlayerData, PlayerId, Timestamp,
    TrustLevel, WorldId, LATEST_SCHEMA_VERSION, NO_PARENT, PUBLIC_ENTRY,
};
pub use config::{ClaimConfig, ConfigError, WorldClaimConfig};
pub use geometry::{ClaimBox, GridPos};
pub use store::{
    ClaimBackend, ClaimRecord, ClaimStore, FlatFileBackend, NameResolver, NoResolver,
    PlayerRecord, RecordError, SqliteBackend, StorageError, StoreError, StoredClaim,
};
