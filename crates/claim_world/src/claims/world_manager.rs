//! Per-world claim registry: spatial lookup, invariant enforcement, and
//! claim id allocation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::geometry::{ClaimBox, GridPos};

use super::claim::Claim;
use super::player_data::ClaimCacheRef;
use super::types::{ClaimId, TrustLevel, WorldId};

// ============================================================================
// Errors
// ============================================================================

/// A claim mutation rejected because it would break a structural invariant.
/// Nothing is applied when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimError {
    Overlap { other: ClaimId },
    OutsideParent { parent: ClaimId },
    ChildEscapes { child: ClaimId },
    SubdivisionDepth { parent: ClaimId },
    NoTransferSubdivision,
    ChildrenPresent { children: usize },
    NotRegistered { claim_id: ClaimId },
    WorldMismatch { expected: WorldId, found: WorldId },
}

impl fmt::Display for ClaimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimError::Overlap { other } => write!(f, "overlaps claim #{other}"),
            ClaimError::OutsideParent { parent } => {
                write!(f, "subdivision extends outside claim #{parent}")
            }
            ClaimError::ChildEscapes { child } => {
                write!(f, "new boundaries would cut off subdivision #{child}")
            }
            ClaimError::SubdivisionDepth { parent } => {
                write!(f, "claim #{parent} is a subdivision and cannot be subdivided")
            }
            ClaimError::NoTransferSubdivision => {
                write!(f, "subdivisions cannot change hands; transfer the top-level claim")
            }
            ClaimError::ChildrenPresent { children } => {
                write!(
                    f,
                    "claim still has {children} subdivision(s); delete requires an explicit cascade"
                )
            }
            ClaimError::NotRegistered { claim_id } => {
                write!(f, "claim #{claim_id} is not registered in this world")
            }
            ClaimError::WorldMismatch { expected, found } => {
                write!(f, "claim belongs to world {found}, not {expected}")
            }
        }
    }
}

// ============================================================================
// Delete Policy
// ============================================================================

/// What to do when deleting a claim that still has subdivisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Refuse the deletion and leave everything in place.
    #[default]
    RejectChildren,
    /// Delete the subdivisions along with the parent.
    Cascade,
}

// ============================================================================
// ClaimWorldManager
// ============================================================================

/// Authoritative registry and spatial index of every claim in one world.
///
/// All claims (top-level and subdivisions) live in one id-keyed table;
/// hierarchy is expressed through `parent`/`children` ids. Mutations replace
/// the stored `Arc<Claim>` wholesale, so a reader holding a snapshot never
/// observes a half-updated claim.
#[derive(Debug, Clone, Default)]
pub struct ClaimWorldManager {
    world: WorldId,
    claims: BTreeMap<ClaimId, Arc<Claim>>,
    next_claim_id: ClaimId,
}

impl ClaimWorldManager {
    pub fn new(world: impl Into<WorldId>) -> Self {
        Self {
            world: world.into(),
            claims: BTreeMap::new(),
            next_claim_id: 0,
        }
    }

    pub fn world(&self) -> &str {
        &self.world
    }

    pub fn next_claim_id(&self) -> ClaimId {
        self.next_claim_id
    }

    /// Raises the id counter to at least `next`. Never lowers it; ids are not
    /// reused even when the newest claim has been deleted.
    pub fn seed_next_claim_id(&mut self, next: ClaimId) {
        self.next_claim_id = self.next_claim_id.max(next);
    }

    pub fn claim(&self, id: ClaimId) -> Option<&Arc<Claim>> {
        self.claims.get(&id)
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    pub fn all_claims(&self) -> impl Iterator<Item = &Arc<Claim>> {
        self.claims.values()
    }

    pub fn top_level_claims(&self) -> impl Iterator<Item = &Arc<Claim>> {
        self.claims.values().filter(|claim| claim.parent.is_none())
    }

    /// Top-level claims owned by `owner`. Subdivisions carry no ownership of
    /// their own.
    pub fn claims_owned_by<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a Arc<Claim>> {
        self.top_level_claims()
            .filter(move |claim| claim.owner.as_deref() == Some(owner))
    }

    /// Total claimed footprint area for `owner`, in claim blocks.
    pub fn claimed_area(&self, owner: &str) -> i64 {
        self.claims_owned_by(owner)
            .map(|claim| claim.area_blocks())
            .sum()
    }

    // ------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------

    /// Returns the most specific claim containing `pos`, preferring a
    /// subdivision over its parent when the position is inside both (a point
    /// on their shared boundary also resolves to the subdivision).
    ///
    /// A valid `hint` that still contains the position short-circuits the
    /// scan. Hints are checked by id and version, so a hint referring to a
    /// deleted or reshaped claim is simply ignored.
    pub fn get_claim_at(
        &self,
        pos: GridPos,
        ignore_height: bool,
        hint: Option<&ClaimCacheRef>,
    ) -> Option<Arc<Claim>> {
        if let Some(cached) = hint {
            if let Some(claim) = self.claims.get(&cached.claim_id) {
                if claim.version == cached.version && claim.bounds().contains(pos, ignore_height) {
                    return Some(Arc::clone(claim));
                }
            }
        }

        for claim in self.top_level_claims() {
            if !claim.bounds().contains(pos, ignore_height) {
                continue;
            }
            for child_id in &claim.children {
                if let Some(child) = self.claims.get(child_id) {
                    if child.bounds().contains(pos, ignore_height) {
                        return Some(Arc::clone(child));
                    }
                }
            }
            return Some(Arc::clone(claim));
        }
        None
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Registers a claim, assigning the next id when the claim carries a
    /// negative one. Top-level claims are validated against every other
    /// top-level footprint; subdivisions are validated against their parent.
    pub fn add_claim(&mut self, mut claim: Claim) -> Result<Arc<Claim>, ClaimError> {
        if claim.world != self.world {
            return Err(ClaimError::WorldMismatch {
                expected: self.world.clone(),
                found: claim.world,
            });
        }

        match claim.parent {
            None => {
                if let Some(other) = self.find_overlap(&claim.bounds(), None) {
                    return Err(ClaimError::Overlap { other });
                }
            }
            Some(parent_id) => {
                let parent = self
                    .claims
                    .get(&parent_id)
                    .ok_or(ClaimError::NotRegistered { claim_id: parent_id })?;
                if parent.is_subdivision() {
                    return Err(ClaimError::SubdivisionDepth { parent: parent_id });
                }
                if !parent.bounds().contains_box(&claim.bounds()) {
                    return Err(ClaimError::OutsideParent { parent: parent_id });
                }
            }
        }

        if claim.id < 0 {
            claim.id = self.next_claim_id;
            self.next_claim_id += 1;
        } else {
            self.next_claim_id = self.next_claim_id.max(claim.id + 1);
        }
        claim.in_data_store = true;

        if let Some(parent_id) = claim.parent {
            if let Some(parent) = self.claims.get_mut(&parent_id) {
                let parent = Arc::make_mut(parent);
                if !parent.children.contains(&claim.id) {
                    parent.children.push(claim.id);
                }
            }
        }

        let id = claim.id;
        let stored = Arc::new(claim);
        self.claims.insert(id, Arc::clone(&stored));
        Ok(stored)
    }

    /// Removes a claim (and, under [`DeleteMode::Cascade`], its subdivisions)
    /// from the index. The removed claims are returned, flagged as detached,
    /// so the caller can delete their storage records and release blocks.
    pub fn delete_claim(
        &mut self,
        id: ClaimId,
        mode: DeleteMode,
    ) -> Result<Vec<Arc<Claim>>, ClaimError> {
        let claim = self
            .claims
            .get(&id)
            .ok_or(ClaimError::NotRegistered { claim_id: id })?;

        if !claim.children.is_empty() && mode == DeleteMode::RejectChildren {
            return Err(ClaimError::ChildrenPresent {
                children: claim.children.len(),
            });
        }

        let parent_id = claim.parent;
        let child_ids = claim.children.clone();

        let mut removed = Vec::with_capacity(1 + child_ids.len());
        removed.extend(self.detach(id));
        for child_id in child_ids {
            removed.extend(self.detach(child_id));
        }

        if let Some(parent_id) = parent_id {
            if let Some(parent) = self.claims.get_mut(&parent_id) {
                Arc::make_mut(parent).children.retain(|child| *child != id);
            }
        }

        Ok(removed)
    }

    /// Replaces a claim's boundary box, re-validating the same invariants as
    /// creation. The claim's version is bumped so cached references drop.
    pub fn resize_claim(
        &mut self,
        id: ClaimId,
        bounds: ClaimBox,
    ) -> Result<Arc<Claim>, ClaimError> {
        let claim = self
            .claims
            .get(&id)
            .ok_or(ClaimError::NotRegistered { claim_id: id })?;

        match claim.parent {
            None => {
                if let Some(other) = self.find_overlap(&bounds, Some(id)) {
                    return Err(ClaimError::Overlap { other });
                }
                for child_id in &claim.children {
                    if let Some(child) = self.claims.get(child_id) {
                        if !bounds.contains_box(&child.bounds()) {
                            return Err(ClaimError::ChildEscapes { child: *child_id });
                        }
                    }
                }
            }
            Some(parent_id) => {
                let parent = self
                    .claims
                    .get(&parent_id)
                    .ok_or(ClaimError::NotRegistered { claim_id: parent_id })?;
                if !parent.bounds().contains_box(&bounds) {
                    return Err(ClaimError::OutsideParent { parent: parent_id });
                }
            }
        }

        let Some(claim) = self.claims.get_mut(&id) else {
            return Err(ClaimError::NotRegistered { claim_id: id });
        };
        Arc::make_mut(claim).set_bounds(bounds);
        Ok(Arc::clone(claim))
    }

    /// Rewrites a top-level claim's owner. Subdivisions cannot change hands;
    /// ownership is a top-level concept.
    pub fn transfer_claim_owner(
        &mut self,
        id: ClaimId,
        new_owner: impl Into<String>,
    ) -> Result<Arc<Claim>, ClaimError> {
        let claim = self
            .claims
            .get(&id)
            .ok_or(ClaimError::NotRegistered { claim_id: id })?;
        if claim.is_subdivision() {
            return Err(ClaimError::NoTransferSubdivision);
        }

        let Some(claim) = self.claims.get_mut(&id) else {
            return Err(ClaimError::NotRegistered { claim_id: id });
        };
        let updated = Arc::make_mut(claim);
        updated.owner = Some(new_owner.into());
        updated.version += 1;
        Ok(Arc::clone(claim))
    }

    /// Adds `entry` to a claim's trust list for `level`.
    pub fn grant_trust(
        &mut self,
        id: ClaimId,
        level: TrustLevel,
        entry: impl Into<String>,
    ) -> Result<Arc<Claim>, ClaimError> {
        let Some(claim) = self.claims.get_mut(&id) else {
            return Err(ClaimError::NotRegistered { claim_id: id });
        };
        Arc::make_mut(claim).grant(level, entry);
        Ok(Arc::clone(claim))
    }

    /// Removes `entry` from every trust list of a claim.
    pub fn revoke_trust(&mut self, id: ClaimId, entry: &str) -> Result<Arc<Claim>, ClaimError> {
        let Some(claim) = self.claims.get_mut(&id) else {
            return Err(ClaimError::NotRegistered { claim_id: id });
        };
        Arc::make_mut(claim).revoke(entry);
        Ok(Arc::clone(claim))
    }

    /// Adds or removes a live visualization watcher on a claim. Watchers are
    /// transient and never persisted.
    pub fn set_watcher(&mut self, id: ClaimId, player: &str, watching: bool) {
        if let Some(claim) = self.claims.get_mut(&id) {
            let claim = Arc::make_mut(claim);
            if watching {
                claim.watchers.insert(player.to_string());
            } else {
                claim.watchers.remove(player);
            }
        }
    }

    fn detach(&mut self, id: ClaimId) -> Option<Arc<Claim>> {
        let mut claim = self.claims.remove(&id)?;
        Arc::make_mut(&mut claim).in_data_store = false;
        Some(claim)
    }

    fn find_overlap(&self, bounds: &ClaimBox, exclude: Option<ClaimId>) -> Option<ClaimId> {
        self.top_level_claims()
            .filter(|claim| Some(claim.id) != exclude)
            .find(|claim| claim.bounds().intersects_footprint(bounds))
            .map(|claim| claim.id)
    }
}
