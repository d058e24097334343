//! Entry points for the embedding server's scheduler: block accrual,
//! PvP-immunity expiry, visualization lifetime, and the periodic flush.
//! These drive the store from outside; none of them hold claim logic.

use crate::claims::{ClaimId, PlayerId, Timestamp, WorldId};
use crate::store::ClaimStore;

/// Credits the configured accrual to every connected player, up to the cap.
/// Returns how many records were actually credited.
pub fn deliver_claim_blocks(store: &ClaimStore, connected: &[(WorldId, PlayerId)]) -> usize {
    let per_run = store.config().accrual_per_run;
    let cap = store.config().accrued_cap;
    if per_run <= 0 {
        return 0;
    }

    let mut credited = 0;
    for (world, player) in connected {
        let data = store.get_or_create_player_data(world, player);
        let mut data = data.lock().expect("player data lock poisoned");
        if data.add_accrued(per_run, cap) > 0 {
            credited += 1;
        }
    }
    credited
}

/// Clears PvP immunity on every cached record whose grace period has ended.
pub fn expire_pvp_immunity(store: &ClaimStore, now_ms: Timestamp) -> usize {
    let mut expired = 0;
    for data in store.cached_player_data() {
        let mut data = data.lock().expect("player data lock poisoned");
        let lapsed = data.pvp_immune
            && data
                .pvp_immunity_expires_ms
                .is_some_and(|expires| expires <= now_ms);
        if lapsed {
            data.pvp_immune = false;
            data.pvp_immunity_expires_ms = None;
            expired += 1;
        }
    }
    expired
}

/// Marks `player` as watching a live visualization of `claim_id`, replacing
/// any visualization they already had, and stamps the auto-revert deadline.
pub fn apply_visualization(
    store: &ClaimStore,
    world: &str,
    player: &str,
    claim_id: ClaimId,
    now_ms: Timestamp,
) {
    let previous = {
        let data = store.get_or_create_player_data(world, player);
        let mut data = data.lock().expect("player data lock poisoned");
        let previous = data.visual_claim.take();
        data.visual_claim = Some(claim_id);
        data.visual_revert_at_ms = Some(now_ms + store.config().visual_revert_ms);
        previous
    };

    let manager = store.get_claim_world_manager(world);
    let mut manager = manager.write().expect("world manager lock poisoned");
    if let Some(previous) = previous {
        manager.set_watcher(previous, player, false);
    }
    manager.set_watcher(claim_id, player, true);
}

/// Reverts every cached visualization whose deadline has passed. Returns how
/// many were reverted.
pub fn revert_expired_visualizations(store: &ClaimStore, now_ms: Timestamp) -> usize {
    let mut pending: Vec<(WorldId, PlayerId, ClaimId)> = Vec::new();
    for data in store.cached_player_data() {
        let mut data = data.lock().expect("player data lock poisoned");
        let due = data
            .visual_revert_at_ms
            .is_some_and(|revert_at| revert_at <= now_ms);
        if !due {
            continue;
        }
        if let Some(claim_id) = data.visual_claim.take() {
            pending.push((data.world.clone(), data.player.clone(), claim_id));
        }
        data.visual_revert_at_ms = None;
    }

    for (world, player, claim_id) in &pending {
        let manager = store.get_claim_world_manager(world);
        let mut manager = manager.write().expect("world manager lock poisoned");
        manager.set_watcher(*claim_id, player, false);
    }
    pending.len()
}

/// Writes every dirty cached player record through to storage. Returns how
/// many records were flushed; failures are logged and do not stop the sweep.
pub fn flush_dirty_player_data(store: &ClaimStore) -> usize {
    let mut flushed = 0;
    for data in store.cached_player_data() {
        let dirty = data.lock().expect("player data lock poisoned").is_dirty();
        if !dirty {
            continue;
        }
        match store.save_player_data(&data) {
            Ok(()) => flushed += 1,
            Err(err) => {
                let player = data.lock().expect("player data lock poisoned").player.clone();
                log::error!("periodic flush of player data for {player} failed: {err}");
            }
        }
    }
    flushed
}
