//! Tests for the claims module.

use super::*;
use crate::geometry::{ClaimBox, GridPos};

fn pos(x: i32, y: i32, z: i32) -> GridPos {
    GridPos::new(x, y, z)
}

fn claim(
    id: ClaimId,
    world: &str,
    owner: Option<&str>,
    a: (i32, i32, i32),
    b: (i32, i32, i32),
) -> Claim {
    Claim::new(
        id,
        world,
        owner.map(str::to_string),
        ClaimBox::from_coords(a, b),
    )
}

fn subdivision(
    parent: ClaimId,
    world: &str,
    a: (i32, i32, i32),
    b: (i32, i32, i32),
) -> Claim {
    let mut sub = claim(-1, world, None, a, b);
    sub.parent = Some(parent);
    sub
}

/// Invariant sweep: no two distinct top-level claims in a world may share
/// footprint area.
fn assert_no_top_level_overlap(manager: &ClaimWorldManager) {
    let tops: Vec<_> = manager.top_level_claims().collect();
    for (i, a) in tops.iter().enumerate() {
        for b in tops.iter().skip(i + 1) {
            assert!(
                !a.bounds().intersects_footprint(&b.bounds()),
                "claims #{} and #{} overlap",
                a.id,
                b.id
            );
        }
    }
}

/// Invariant sweep: every subdivision must lie inside its parent's box.
fn assert_subdivisions_contained(manager: &ClaimWorldManager) {
    for sub in manager.all_claims().filter(|claim| claim.is_subdivision()) {
        let parent = sub
            .parent
            .and_then(|id| manager.claim(id))
            .unwrap_or_else(|| panic!("subdivision #{} has no parent", sub.id));
        assert!(
            parent.bounds().contains_box(&sub.bounds()),
            "subdivision #{} escapes parent #{}",
            sub.id,
            parent.id
        );
    }
}

mod manager;
