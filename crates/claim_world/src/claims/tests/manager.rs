use super::*;

#[test]
fn add_claim_assigns_monotonic_ids() {
    let mut manager = ClaimWorldManager::new("overworld");
    let a = manager
        .add_claim(claim(-1, "overworld", Some("ada"), (0, 0, 0), (10, 10, 10)))
        .unwrap();
    let b = manager
        .add_claim(claim(-1, "overworld", Some("ada"), (20, 0, 0), (30, 10, 10)))
        .unwrap();
    assert_eq!(a.id, 0);
    assert_eq!(b.id, 1);
    assert!(a.in_data_store && b.in_data_store);
    assert_eq!(manager.next_claim_id(), 2);
}

#[test]
fn overlapping_top_level_claim_is_rejected() {
    let mut manager = ClaimWorldManager::new("overworld");
    let a = manager
        .add_claim(claim(-1, "overworld", Some("ada"), (0, 0, 0), (10, 10, 10)))
        .unwrap();

    let err = manager
        .add_claim(claim(-1, "overworld", Some("grace"), (5, 0, 0), (15, 10, 10)))
        .unwrap_err();
    assert_eq!(err, ClaimError::Overlap { other: a.id });
    assert_eq!(err.to_string(), format!("overlaps claim #{}", a.id));
    assert_eq!(manager.len(), 1);
    assert_no_top_level_overlap(&manager);
}

#[test]
fn lookup_prefers_subdivision_over_parent() {
    let mut manager = ClaimWorldManager::new("overworld");
    let a = manager
        .add_claim(claim(-1, "overworld", Some("ada"), (0, 0, 0), (10, 10, 10)))
        .unwrap();
    let c = manager
        .add_claim(subdivision(a.id, "overworld", (1, 0, 1), (3, 0, 3)))
        .unwrap();
    assert_subdivisions_contained(&manager);

    let inside_sub = manager.get_claim_at(pos(2, 0, 2), false, None).unwrap();
    assert_eq!(inside_sub.id, c.id);

    let inside_parent = manager.get_claim_at(pos(8, 0, 8), false, None).unwrap();
    assert_eq!(inside_parent.id, a.id);

    // A point exactly on the shared boundary resolves to the subdivision.
    let on_edge = manager.get_claim_at(pos(3, 0, 3), false, None).unwrap();
    assert_eq!(on_edge.id, c.id);

    assert!(manager.get_claim_at(pos(50, 0, 50), false, None).is_none());
}

#[test]
fn lookup_is_deterministic() {
    let mut manager = ClaimWorldManager::new("overworld");
    let a = manager
        .add_claim(claim(-1, "overworld", Some("ada"), (0, 0, 0), (10, 10, 10)))
        .unwrap();
    manager
        .add_claim(subdivision(a.id, "overworld", (0, 0, 0), (4, 10, 4)))
        .unwrap();

    let first = manager.get_claim_at(pos(2, 0, 2), false, None).unwrap();
    let second = manager.get_claim_at(pos(2, 0, 2), false, None).unwrap();
    assert_eq!(first.id, second.id);
}

#[test]
fn lookup_respects_ignore_height() {
    let mut manager = ClaimWorldManager::new("overworld");
    manager
        .add_claim(claim(-1, "overworld", Some("ada"), (0, 0, 0), (10, 10, 10)))
        .unwrap();

    assert!(manager.get_claim_at(pos(5, 200, 5), false, None).is_none());
    assert!(manager.get_claim_at(pos(5, 200, 5), true, None).is_some());
}

#[test]
fn stale_hint_falls_back_to_scan() {
    let mut manager = ClaimWorldManager::new("overworld");
    let a = manager
        .add_claim(claim(-1, "overworld", Some("ada"), (0, 0, 0), (10, 10, 10)))
        .unwrap();

    let fresh = ClaimCacheRef {
        claim_id: a.id,
        version: a.version,
    };
    assert_eq!(
        manager.get_claim_at(pos(5, 5, 5), false, Some(&fresh)).unwrap().id,
        a.id
    );

    // Resizing bumps the version; the stale hint is ignored but the scan
    // still finds the claim.
    manager
        .resize_claim(a.id, ClaimBox::from_coords((0, 0, 0), (12, 10, 12)))
        .unwrap();
    let found = manager.get_claim_at(pos(5, 5, 5), false, Some(&fresh)).unwrap();
    assert_eq!(found.id, a.id);
    assert!(found.version > fresh.version);

    // A hint naming a deleted claim is ignored too.
    manager.delete_claim(a.id, DeleteMode::RejectChildren).unwrap();
    assert!(manager.get_claim_at(pos(5, 5, 5), false, Some(&fresh)).is_none());
}

#[test]
fn subdivision_must_stay_inside_parent() {
    let mut manager = ClaimWorldManager::new("overworld");
    let a = manager
        .add_claim(claim(-1, "overworld", Some("ada"), (0, 0, 0), (10, 10, 10)))
        .unwrap();

    let err = manager
        .add_claim(subdivision(a.id, "overworld", (8, 0, 8), (12, 5, 12)))
        .unwrap_err();
    assert_eq!(err, ClaimError::OutsideParent { parent: a.id });
}

#[test]
fn subdivisions_cannot_nest() {
    let mut manager = ClaimWorldManager::new("overworld");
    let a = manager
        .add_claim(claim(-1, "overworld", Some("ada"), (0, 0, 0), (10, 10, 10)))
        .unwrap();
    let c = manager
        .add_claim(subdivision(a.id, "overworld", (1, 0, 1), (5, 5, 5)))
        .unwrap();

    let err = manager
        .add_claim(subdivision(c.id, "overworld", (2, 0, 2), (3, 3, 3)))
        .unwrap_err();
    assert_eq!(err, ClaimError::SubdivisionDepth { parent: c.id });
}

#[test]
fn deleting_parent_with_children_requires_cascade() {
    let mut manager = ClaimWorldManager::new("overworld");
    let a = manager
        .add_claim(claim(-1, "overworld", Some("ada"), (0, 0, 0), (10, 10, 10)))
        .unwrap();
    let c = manager
        .add_claim(subdivision(a.id, "overworld", (1, 0, 1), (3, 0, 3)))
        .unwrap();

    let err = manager
        .delete_claim(a.id, DeleteMode::RejectChildren)
        .unwrap_err();
    assert_eq!(err, ClaimError::ChildrenPresent { children: 1 });
    assert_eq!(manager.len(), 2);

    let removed = manager.delete_claim(a.id, DeleteMode::Cascade).unwrap();
    let removed_ids: Vec<_> = removed.iter().map(|claim| claim.id).collect();
    assert_eq!(removed_ids, vec![a.id, c.id]);
    assert!(removed.iter().all(|claim| !claim.in_data_store));
    assert!(manager.is_empty());
    assert!(manager.get_claim_at(pos(2, 0, 2), false, None).is_none());
}

#[test]
fn deleting_subdivision_reveals_parent() {
    let mut manager = ClaimWorldManager::new("overworld");
    let a = manager
        .add_claim(claim(-1, "overworld", Some("ada"), (0, 0, 0), (10, 10, 10)))
        .unwrap();
    let c = manager
        .add_claim(subdivision(a.id, "overworld", (1, 0, 1), (3, 0, 3)))
        .unwrap();

    manager.delete_claim(c.id, DeleteMode::RejectChildren).unwrap();
    let found = manager.get_claim_at(pos(2, 0, 2), false, None).unwrap();
    assert_eq!(found.id, a.id);
    assert!(manager.claim(a.id).unwrap().children.is_empty());
}

#[test]
fn claim_ids_are_never_reused() {
    let mut manager = ClaimWorldManager::new("overworld");
    let a = manager
        .add_claim(claim(-1, "overworld", Some("ada"), (0, 0, 0), (10, 10, 10)))
        .unwrap();
    manager.delete_claim(a.id, DeleteMode::RejectChildren).unwrap();

    let b = manager
        .add_claim(claim(-1, "overworld", Some("ada"), (0, 0, 0), (10, 10, 10)))
        .unwrap();
    assert!(b.id > a.id);
}

#[test]
fn transfer_rejects_subdivisions() {
    let mut manager = ClaimWorldManager::new("overworld");
    let a = manager
        .add_claim(claim(-1, "overworld", Some("ada"), (0, 0, 0), (10, 10, 10)))
        .unwrap();
    let c = manager
        .add_claim(subdivision(a.id, "overworld", (1, 0, 1), (3, 0, 3)))
        .unwrap();

    let err = manager.transfer_claim_owner(c.id, "grace").unwrap_err();
    assert_eq!(err, ClaimError::NoTransferSubdivision);

    let transferred = manager.transfer_claim_owner(a.id, "grace").unwrap();
    assert_eq!(transferred.owner.as_deref(), Some("grace"));
}

#[test]
fn resize_revalidates_like_creation() {
    let mut manager = ClaimWorldManager::new("overworld");
    let a = manager
        .add_claim(claim(-1, "overworld", Some("ada"), (0, 0, 0), (10, 10, 10)))
        .unwrap();
    let b = manager
        .add_claim(claim(-1, "overworld", Some("grace"), (20, 0, 0), (30, 10, 10)))
        .unwrap();
    let c = manager
        .add_claim(subdivision(a.id, "overworld", (1, 0, 1), (3, 0, 3)))
        .unwrap();

    // Growing into a neighbor is rejected.
    let err = manager
        .resize_claim(a.id, ClaimBox::from_coords((0, 0, 0), (25, 10, 10)))
        .unwrap_err();
    assert_eq!(err, ClaimError::Overlap { other: b.id });

    // Shrinking past a subdivision is rejected.
    let err = manager
        .resize_claim(a.id, ClaimBox::from_coords((0, 0, 0), (2, 10, 10)))
        .unwrap_err();
    assert_eq!(err, ClaimError::ChildEscapes { child: c.id });

    // A subdivision cannot grow past its parent.
    let err = manager
        .resize_claim(c.id, ClaimBox::from_coords((1, 0, 1), (11, 0, 3)))
        .unwrap_err();
    assert_eq!(err, ClaimError::OutsideParent { parent: a.id });

    let resized = manager
        .resize_claim(a.id, ClaimBox::from_coords((0, 0, 0), (15, 10, 15)))
        .unwrap();
    assert_eq!(resized.bounds(), ClaimBox::from_coords((0, 0, 0), (15, 10, 15)));
    assert_no_top_level_overlap(&manager);
    assert_subdivisions_contained(&manager);
}

#[test]
fn world_mismatch_is_rejected() {
    let mut manager = ClaimWorldManager::new("overworld");
    let err = manager
        .add_claim(claim(-1, "nether", Some("ada"), (0, 0, 0), (10, 10, 10)))
        .unwrap_err();
    assert!(matches!(err, ClaimError::WorldMismatch { .. }));
}

#[test]
fn claimed_area_sums_owned_top_level_claims() {
    let mut manager = ClaimWorldManager::new("overworld");
    let a = manager
        .add_claim(claim(-1, "overworld", Some("ada"), (0, 0, 0), (9, 10, 9)))
        .unwrap();
    manager
        .add_claim(claim(-1, "overworld", Some("ada"), (20, 0, 0), (24, 10, 4)))
        .unwrap();
    manager
        .add_claim(claim(-1, "overworld", Some("grace"), (40, 0, 0), (49, 10, 49)))
        .unwrap();
    // Subdivision area is already counted through the parent.
    manager
        .add_claim(subdivision(a.id, "overworld", (0, 0, 0), (4, 4, 4)))
        .unwrap();

    assert_eq!(manager.claimed_area("ada"), 100 + 25);
    assert_eq!(manager.claimed_area("grace"), 500);
    assert_eq!(manager.claimed_area("alan"), 0);
}
