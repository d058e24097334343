//! Per-(player, world) record: claim-block balances, ignore list, and the
//! transient session state that never reaches storage.

use std::collections::BTreeMap;

use super::types::{ClaimId, IgnoreMode, PlayerId, Timestamp, WorldId};

// ============================================================================
// Cached Claim Reference
// ============================================================================

/// Weak reference into a world's claim table, used to short-circuit repeated
/// lookups at the same spot. The version pairs with the id so a reference to
/// a deleted or reshaped claim silently stops matching instead of dangling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimCacheRef {
    pub claim_id: ClaimId,
    pub version: u64,
}

// ============================================================================
// PlayerData
// ============================================================================

/// One player's state within one world. Created lazily on first access,
/// cached in memory while the player is connected, flushed and evicted on
/// disconnect.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerData {
    pub player: PlayerId,
    pub world: WorldId,

    // Persisted.
    pub accrued_blocks: i64,
    pub bonus_blocks: i64,
    pub last_login_ms: Timestamp,
    pub ignored: BTreeMap<PlayerId, IgnoreMode>,

    dirty: bool,

    // Transient session state, reset on reconnect.
    pub last_claim: Option<ClaimCacheRef>,
    pub ignore_claims: bool,
    pub pvp_immune: bool,
    pub pvp_immunity_expires_ms: Option<Timestamp>,
    pub visual_claim: Option<ClaimId>,
    pub visual_revert_at_ms: Option<Timestamp>,
}

impl PlayerData {
    pub fn new(player: impl Into<PlayerId>, world: impl Into<WorldId>) -> Self {
        Self {
            player: player.into(),
            world: world.into(),
            accrued_blocks: 0,
            bonus_blocks: 0,
            last_login_ms: 0,
            ignored: BTreeMap::new(),
            dirty: false,
            last_claim: None,
            ignore_claims: false,
            pvp_immune: false,
            pvp_immunity_expires_ms: None,
            visual_claim: None,
            visual_revert_at_ms: None,
        }
    }

    // ------------------------------------------------------------------
    // Claim-block accounting
    // ------------------------------------------------------------------

    /// Blocks still available to spend on new claims, given the total area
    /// this player already has claimed in the world.
    pub fn remaining_claim_blocks(&self, claimed_area: i64) -> i64 {
        self.accrued_blocks + self.bonus_blocks - claimed_area
    }

    /// Adds passively earned blocks, saturating at `cap`. Returns the amount
    /// actually credited.
    pub fn add_accrued(&mut self, amount: i64, cap: i64) -> i64 {
        let headroom = (cap - self.accrued_blocks).max(0);
        let credited = amount.min(headroom).max(0);
        if credited > 0 {
            self.accrued_blocks += credited;
            self.dirty = true;
        }
        credited
    }

    /// Adjusts granted bonus blocks by `delta` (positive or negative).
    pub fn add_bonus(&mut self, delta: i64) {
        if delta != 0 {
            self.bonus_blocks += delta;
            self.dirty = true;
        }
    }

    pub fn touch_login(&mut self, now_ms: Timestamp) {
        self.last_login_ms = now_ms;
        self.dirty = true;
    }

    // ------------------------------------------------------------------
    // Ignore list
    // ------------------------------------------------------------------

    /// Sets or clears an ignore entry. Clearing an admin-forced entry is
    /// refused; returns whether anything changed.
    pub fn set_ignore(&mut self, target: impl Into<PlayerId>, mode: Option<IgnoreMode>) -> bool {
        let target = target.into();
        let changed = match mode {
            Some(mode) => self.ignored.insert(target, mode) != Some(mode),
            None => {
                if self.ignored.get(&target) == Some(&IgnoreMode::AdminForced) {
                    false
                } else {
                    self.ignored.remove(&target).is_some()
                }
            }
        };
        if changed {
            self.dirty = true;
        }
        changed
    }

    pub fn is_ignoring(&self, target: &str) -> bool {
        self.ignored.contains_key(target)
    }

    // ------------------------------------------------------------------
    // Dirty tracking
    // ------------------------------------------------------------------

    /// Whether this record has unsaved mutations. Saving is caller-triggered;
    /// individual mutations only mark the record.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Drops all session-only state, as happens on reconnect.
    pub fn reset_transient(&mut self) {
        self.last_claim = None;
        self.ignore_claims = false;
        self.pvp_immune = false;
        self.pvp_immunity_expires_ms = None;
        self.visual_claim = None;
        self.visual_revert_at_ms = None;
    }
}
