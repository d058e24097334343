//! Core type definitions: IDs, constants, trust tiers, and action kinds.

use serde::{Deserialize, Serialize};

// ============================================================================
// Type Aliases
// ============================================================================

/// Stable player identity. Display names are never used as keys.
pub type PlayerId = String;
pub type WorldId = String;
pub type ClaimId = i64;
/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

// ============================================================================
// Constants
// ============================================================================

/// Parent id recorded for top-level claims.
pub const NO_PARENT: ClaimId = -1;
/// Trust list entry granting a tier to everyone.
pub const PUBLIC_ENTRY: &str = "public";
pub const LATEST_SCHEMA_VERSION: u32 = 2;

// ============================================================================
// Trust Tiers
// ============================================================================

/// Escalating trust tiers grantable per claim. The derived order is the
/// permission order: a higher tier implies every lower one.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TrustLevel {
    Access,
    Container,
    Build,
    Manage,
}

impl TrustLevel {
    pub const ALL: [TrustLevel; 4] = [
        TrustLevel::Access,
        TrustLevel::Container,
        TrustLevel::Build,
        TrustLevel::Manage,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            TrustLevel::Access => "accessor",
            TrustLevel::Container => "container",
            TrustLevel::Build => "builder",
            TrustLevel::Manage => "manager",
        }
    }

    /// Tiers from `self` upward, in ascending order.
    pub fn and_above(self) -> impl Iterator<Item = TrustLevel> {
        Self::ALL.into_iter().filter(move |level| *level >= self)
    }
}

// ============================================================================
// Actions
// ============================================================================

/// A world-mutating (or world-using) action checked against a claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimAction {
    Build,
    Break,
    AccessContainer,
    Use,
    GrantTrust,
}

impl ClaimAction {
    /// Minimum trust tier that permits this action.
    pub fn required_trust(self) -> TrustLevel {
        match self {
            ClaimAction::Build | ClaimAction::Break => TrustLevel::Build,
            ClaimAction::AccessContainer => TrustLevel::Container,
            ClaimAction::Use => TrustLevel::Access,
            ClaimAction::GrantTrust => TrustLevel::Manage,
        }
    }

    /// Key matched (case-insensitively, by substring) against the ban list.
    pub fn permission_key(self) -> &'static str {
        match self {
            ClaimAction::Build => "block-place",
            ClaimAction::Break => "block-break",
            ClaimAction::AccessContainer => "interact-inventory",
            ClaimAction::Use => "interact-use",
            ClaimAction::GrantTrust => "give-trust",
        }
    }
}

// ============================================================================
// World Modes
// ============================================================================

/// Per-world policy for actions in the wilderness (outside any claim).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimsMode {
    #[default]
    OpenSurvival,
    CreativeLocked,
    SurvivalRequiringClaims,
}

// ============================================================================
// Ignore Modes
// ============================================================================

/// How one player ignores another. Admin-forced entries cannot be removed by
/// the ignoring player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreMode {
    Standard,
    AdminForced,
}
