//! Backend-agnostic persisted record shapes. Both backends read and write
//! exactly these fields, so a claim round-trips identically through either.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::claims::{Claim, ClaimId, PlayerId, Timestamp, TrustLevel, WorldId, NO_PARENT};
use crate::geometry::{ClaimBox, GridPos};

const CORNER_SEP: char = ';';
const LIST_SEP: char = ';';

// ============================================================================
// Claim Records
// ============================================================================

/// One stored claim. Corners carry the world id and three grid coordinates in
/// `world;x;y;z` form; trust lists are `;`-delimited identity strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub id: ClaimId,
    /// Owner identity, or empty for an administrative claim.
    pub owner: String,
    pub lesser_corner: String,
    pub greater_corner: String,
    pub accessors: String,
    pub containers: String,
    pub builders: String,
    pub managers: String,
    /// Containing claim id, or -1 for a top-level claim.
    pub parent_id: ClaimId,
}

impl ClaimRecord {
    pub fn from_claim(claim: &Claim) -> Self {
        Self {
            id: claim.id,
            owner: claim.owner.clone().unwrap_or_default(),
            lesser_corner: encode_corner(&claim.world, claim.bounds().lesser()),
            greater_corner: encode_corner(&claim.world, claim.bounds().greater()),
            accessors: encode_trust_list(claim.tier_list(TrustLevel::Access)),
            containers: encode_trust_list(claim.tier_list(TrustLevel::Container)),
            builders: encode_trust_list(claim.tier_list(TrustLevel::Build)),
            managers: encode_trust_list(claim.tier_list(TrustLevel::Manage)),
            parent_id: claim.parent.unwrap_or(NO_PARENT),
        }
    }

    /// Reconstructs the in-memory claim. Fails on unparsable geometry or
    /// corners that disagree about the world.
    pub fn to_claim(&self) -> Result<Claim, RecordError> {
        let (lesser_world, lesser) = parse_corner(&self.lesser_corner)?;
        let (greater_world, greater) = parse_corner(&self.greater_corner)?;
        if lesser_world != greater_world {
            return Err(RecordError::CornerWorldMismatch {
                lesser: self.lesser_corner.clone(),
                greater: self.greater_corner.clone(),
            });
        }

        let owner = if self.owner.is_empty() {
            None
        } else {
            Some(self.owner.clone())
        };
        let mut claim = Claim::new(self.id, lesser_world, owner, ClaimBox::new(lesser, greater));
        claim.parent = (self.parent_id != NO_PARENT).then_some(self.parent_id);
        claim.accessors = parse_trust_list(&self.accessors);
        claim.containers = parse_trust_list(&self.containers);
        claim.builders = parse_trust_list(&self.builders);
        claim.managers = parse_trust_list(&self.managers);
        // The record shape cannot tell declared-empty lists from undeclared
        // ones, so a subdivision inherits exactly when it stored no entries.
        claim.inherit_permissions = !claim.has_declared_permissions();
        Ok(claim)
    }

    /// World id recorded in the lesser corner, when parsable.
    pub fn world(&self) -> Result<WorldId, RecordError> {
        parse_corner(&self.lesser_corner).map(|(world, _)| world)
    }
}

/// A claim record together with the world key it was stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredClaim {
    pub world: WorldId,
    pub record: ClaimRecord,
}

// ============================================================================
// Player Records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub identity: PlayerId,
    pub last_login_ms: Timestamp,
    pub accrued_blocks: i64,
    pub bonus_blocks: i64,
}

// ============================================================================
// Corner / Trust-List Codecs
// ============================================================================

pub fn encode_corner(world: &str, pos: GridPos) -> String {
    format!("{world}{CORNER_SEP}{}{CORNER_SEP}{}{CORNER_SEP}{}", pos.x, pos.y, pos.z)
}

pub fn parse_corner(encoded: &str) -> Result<(WorldId, GridPos), RecordError> {
    let invalid = || RecordError::InvalidCorner {
        value: encoded.to_string(),
    };

    let mut parts = encoded.split(CORNER_SEP);
    let world = parts.next().filter(|world| !world.is_empty()).ok_or_else(invalid)?;
    let x = parts.next().and_then(|v| v.parse::<i32>().ok()).ok_or_else(invalid)?;
    let y = parts.next().and_then(|v| v.parse::<i32>().ok()).ok_or_else(invalid)?;
    let z = parts.next().and_then(|v| v.parse::<i32>().ok()).ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok((world.to_string(), GridPos::new(x, y, z)))
}

pub fn encode_trust_list(entries: &BTreeSet<String>) -> String {
    entries.iter().cloned().collect::<Vec<_>>().join(&LIST_SEP.to_string())
}

pub fn parse_trust_list(encoded: &str) -> BTreeSet<String> {
    encoded
        .split(LIST_SEP)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

// ============================================================================
// Errors
// ============================================================================

/// A single record that cannot be decoded. Loading logs these and moves on;
/// they never abort a full load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    InvalidCorner { value: String },
    CornerWorldMismatch { lesser: String, greater: String },
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::InvalidCorner { value } => {
                write!(f, "unparsable corner {value:?}")
            }
            RecordError::CornerWorldMismatch { lesser, greater } => {
                write!(f, "corners disagree about the world: {lesser:?} vs {greater:?}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corner_round_trip() {
        let pos = GridPos::new(-12, 64, 300);
        let encoded = encode_corner("overworld", pos);
        assert_eq!(encoded, "overworld;-12;64;300");
        assert_eq!(parse_corner(&encoded).unwrap(), ("overworld".to_string(), pos));
    }

    #[test]
    fn corner_rejects_garbage() {
        for bad in [";1;2;3", "w;1;2", "w;1;2;three", "w;1;2;3;4", ""] {
            assert!(parse_corner(bad).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn claim_record_round_trip() {
        let mut claim = Claim::new(
            7,
            "overworld",
            Some("ada".to_string()),
            ClaimBox::from_coords((0, 0, 0), (10, 10, 10)),
        );
        claim.grant(TrustLevel::Build, "grace");
        claim.grant(TrustLevel::Access, "public");

        let record = ClaimRecord::from_claim(&claim);
        let restored = record.to_claim().unwrap();
        assert_eq!(restored.id, claim.id);
        assert_eq!(restored.world, claim.world);
        assert_eq!(restored.owner, claim.owner);
        assert_eq!(restored.bounds(), claim.bounds());
        assert_eq!(restored.builders, claim.builders);
        assert_eq!(restored.accessors, claim.accessors);
        assert_eq!(restored.parent, None);
    }

    #[test]
    fn mismatched_corner_worlds_are_rejected() {
        let record = ClaimRecord {
            id: 1,
            owner: String::new(),
            lesser_corner: "overworld;0;0;0".to_string(),
            greater_corner: "nether;5;5;5".to_string(),
            accessors: String::new(),
            containers: String::new(),
            builders: String::new(),
            managers: String::new(),
            parent_id: NO_PARENT,
        };
        assert!(matches!(
            record.to_claim(),
            Err(RecordError::CornerWorldMismatch { .. })
        ));
    }
}
