//! Claim entity and per-claim permission resolution.

use std::collections::BTreeSet;
use std::fmt;

use crate::geometry::ClaimBox;

use super::types::{ClaimAction, ClaimId, ClaimsMode, PlayerId, TrustLevel, WorldId, PUBLIC_ENTRY};

// ============================================================================
// Claim
// ============================================================================

/// An owned, axis-aligned volume of one world: either a top-level claim or a
/// subdivision nested inside one.
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    pub id: ClaimId,
    pub world: WorldId,
    /// `None` marks an administrative claim with no player owner.
    pub owner: Option<PlayerId>,
    bounds: ClaimBox,
    pub parent: Option<ClaimId>,
    /// Subdivision ids, in creation order. Always empty for subdivisions.
    pub children: Vec<ClaimId>,
    /// Whether a subdivision resolves permissions against its parent's lists.
    /// Cleared the first time the subdivision declares lists of its own.
    pub inherit_permissions: bool,
    pub accessors: BTreeSet<String>,
    pub containers: BTreeSet<String>,
    pub builders: BTreeSet<String>,
    pub managers: BTreeSet<String>,
    /// Bumped on every geometry or permission change, so stale cached
    /// references to this claim can be detected by id + version.
    pub version: u64,
    /// True while this object is registered in the authoritative index.
    pub in_data_store: bool,
    /// Players currently watching a live boundary visualization. Transient.
    pub watchers: BTreeSet<PlayerId>,
}

impl Claim {
    pub fn new(id: ClaimId, world: impl Into<WorldId>, owner: Option<PlayerId>, bounds: ClaimBox) -> Self {
        Self {
            id,
            world: world.into(),
            owner,
            bounds,
            parent: None,
            children: Vec::new(),
            inherit_permissions: true,
            accessors: BTreeSet::new(),
            containers: BTreeSet::new(),
            builders: BTreeSet::new(),
            managers: BTreeSet::new(),
            version: 0,
            in_data_store: false,
            watchers: BTreeSet::new(),
        }
    }

    pub fn bounds(&self) -> ClaimBox {
        self.bounds
    }

    /// Replaces the boundary box in one assignment and bumps the version.
    pub fn set_bounds(&mut self, bounds: ClaimBox) {
        self.bounds = bounds;
        self.version += 1;
    }

    pub fn is_subdivision(&self) -> bool {
        self.parent.is_some()
    }

    pub fn is_admin_claim(&self) -> bool {
        self.owner.is_none() && self.parent.is_none()
    }

    pub fn area_blocks(&self) -> i64 {
        self.bounds.area()
    }

    pub fn tier_list(&self, level: TrustLevel) -> &BTreeSet<String> {
        match level {
            TrustLevel::Access => &self.accessors,
            TrustLevel::Container => &self.containers,
            TrustLevel::Build => &self.builders,
            TrustLevel::Manage => &self.managers,
        }
    }

    fn tier_list_mut(&mut self, level: TrustLevel) -> &mut BTreeSet<String> {
        match level {
            TrustLevel::Access => &mut self.accessors,
            TrustLevel::Container => &mut self.containers,
            TrustLevel::Build => &mut self.builders,
            TrustLevel::Manage => &mut self.managers,
        }
    }

    /// Adds `entry` (an identity, a `[group]` name, or `public`) to a tier.
    /// A subdivision granting its own trust stops inheriting from its parent.
    pub fn grant(&mut self, level: TrustLevel, entry: impl Into<String>) {
        self.inherit_permissions = false;
        self.tier_list_mut(level).insert(entry.into());
        self.version += 1;
    }

    /// Removes `entry` from every tier list.
    pub fn revoke(&mut self, entry: &str) {
        for level in TrustLevel::ALL {
            self.tier_list_mut(level).remove(entry);
        }
        self.version += 1;
    }

    /// Declares this subdivision's lists authoritative even while empty,
    /// cutting it off from the parent's lists.
    pub fn declare_own_permissions(&mut self) {
        self.inherit_permissions = false;
        self.version += 1;
    }

    /// True when any list on this claim has entries.
    pub fn has_declared_permissions(&self) -> bool {
        TrustLevel::ALL
            .into_iter()
            .any(|level| !self.tier_list(level).is_empty())
    }

    // ------------------------------------------------------------------
    // Permission resolution
    // ------------------------------------------------------------------

    /// Decides whether `request.actor` may perform `request.action` here.
    ///
    /// Checks run in a fixed order, first match wins: administrative bypass,
    /// ownership, the configured ban list, then the trust tiers from the
    /// action's minimum tier upward. A subdivision without declared lists of
    /// its own resolves tiers against `parent`.
    pub fn check_action(
        &self,
        request: &AccessRequest<'_>,
        parent: Option<&Claim>,
        policy: &PermissionPolicy<'_>,
    ) -> Result<(), Denial> {
        if request.ignore_claims || policy.bypass.contains(request.actor) {
            return Ok(());
        }

        if self.is_owned_by(request.actor) || parent.is_some_and(|p| p.is_owned_by(request.actor)) {
            return Ok(());
        }

        let key = request.action.permission_key();
        for (banned, reason) in policy.bans {
            if key.contains(banned.to_lowercase().as_str()) {
                return Err(Denial::Banned {
                    reason: reason.clone(),
                });
            }
        }

        let lists: &Claim = match parent {
            Some(parent) if self.inherit_permissions => parent,
            _ => self,
        };
        let required = request.action.required_trust();
        for level in required.and_above() {
            if lists.list_matches(level, request) {
                return Ok(());
            }
        }

        Err(Denial::InsufficientTrust { required })
    }

    fn is_owned_by(&self, actor: &str) -> bool {
        self.owner.as_deref() == Some(actor)
    }

    fn list_matches(&self, level: TrustLevel, request: &AccessRequest<'_>) -> bool {
        let list = self.tier_list(level);
        if list.contains(request.actor) || list.contains(PUBLIC_ENTRY) {
            return true;
        }
        request.groups.iter().any(|group| {
            let entry = format!("[{group}]");
            list.contains(entry.as_str())
        })
    }
}

// ============================================================================
// Access Requests
// ============================================================================

/// One actor attempting one action, with the ambient facts the resolver needs.
#[derive(Debug, Clone)]
pub struct AccessRequest<'a> {
    pub actor: &'a str,
    pub action: ClaimAction,
    /// Groups the actor belongs to, matched against `[group]` list entries.
    pub groups: &'a BTreeSet<String>,
    /// Actor is operating in an explicit ignore-claims mode.
    pub ignore_claims: bool,
}

/// Externally configured inputs to permission resolution.
#[derive(Debug, Clone, Copy)]
pub struct PermissionPolicy<'a> {
    /// Permission-key fragment to human-readable denial reason.
    pub bans: &'a std::collections::BTreeMap<String, String>,
    /// Identities that bypass claims entirely.
    pub bypass: &'a BTreeSet<PlayerId>,
}

// ============================================================================
// Denials
// ============================================================================

/// Why an action was refused. Every variant renders a reason fit to show the
/// acting player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    Banned { reason: String },
    InsufficientTrust { required: TrustLevel },
    Wilderness { mode: ClaimsMode },
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::Banned { reason } => write!(f, "{reason}"),
            Denial::InsufficientTrust { required } => {
                write!(
                    f,
                    "that action requires {} trust in this claim",
                    required.display_name()
                )
            }
            Denial::Wilderness { mode } => match mode {
                ClaimsMode::OpenSurvival => write!(f, "allowed in the wilderness"),
                ClaimsMode::CreativeLocked => {
                    write!(f, "you can only build inside your own claims in this world")
                }
                ClaimsMode::SurvivalRequiringClaims => {
                    write!(f, "this world requires a claim before building")
                }
            },
        }
    }
}
