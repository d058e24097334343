//! Claim domain model: entities, per-world registries, and permission
//! resolution.
//!
//! This module is organized into submodules:
//! - `types`: Core type definitions (IDs, constants, trust tiers, actions)
//! - `claim`: The Claim entity and its permission resolver
//! - `world_manager`: Per-world registry, spatial lookup, invariants
//! - `player_data`: Per-(player, world) balances and session state

mod claim;
mod player_data;
mod types;
mod world_manager;

#[cfg(test)]
mod tests;

pub use claim::{AccessRequest, Claim, Denial, PermissionPolicy};
pub use player_data::{ClaimCacheRef, PlayerData};
pub use types::{
    ClaimAction, ClaimId, ClaimsMode, IgnoreMode, PlayerId, Timestamp, TrustLevel, WorldId,
    LATEST_SCHEMA_VERSION, NO_PARENT, PUBLIC_ENTRY,
};
pub use world_manager::{ClaimError, ClaimWorldManager, DeleteMode};
