use crate::config::SimConfig;
use crate::fish::{Fish, FishState};
use crate::vec2::Vec2;
use tracing::debug;

/// Derived view of one active escort. The fish's own `state` field is the
/// single source of truth; records are produced on demand by filtering, so
/// there is no parallel list to fall out of sync.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EscortRecord {
    pub fish_index: usize,
    pub expiry_frame: u64,
}

/// Recruits every idle fish within `follow_distance` of the player into
/// Follow state, expiring at `frame + escort_duration_frames`. Fish already
/// escorting are left untouched, so re-firing mid-escort neither duplicates
/// nor extends anything. Returns the number recruited.
pub fn activate(fishes: &mut [Fish], player_position: Vec2, frame: u64, cfg: &SimConfig) -> usize {
    let expiry_frame = frame + u64::from(cfg.escort_duration_frames);
    let mut recruited = 0;
    for fish in fishes.iter_mut() {
        if fish.is_following() {
            continue;
        }
        if fish.position.distance_to(player_position) < cfg.follow_distance {
            fish.state = FishState::Follow { expiry_frame };
            recruited += 1;
        }
    }
    if recruited > 0 {
        debug!(recruited, frame, "sonar pulse recruited escorts");
    }
    recruited
}

/// Reverts every escort whose deadline has arrived. Runs every tick, so a
/// fish escorted at frame F with duration D is back to Idle exactly when the
/// frame counter reaches F + D, never earlier.
pub fn expire(fishes: &mut [Fish], frame: u64) -> usize {
    let mut expired = 0;
    for fish in fishes.iter_mut() {
        if let FishState::Follow { expiry_frame } = fish.state {
            if frame >= expiry_frame {
                fish.state = FishState::Idle;
                expired += 1;
            }
        }
    }
    expired
}

/// The active escort list, derived from fish state.
pub fn active_records(fishes: &[Fish]) -> Vec<EscortRecord> {
    fishes
        .iter()
        .enumerate()
        .filter_map(|(fish_index, fish)| match fish.state {
            FishState::Follow { expiry_frame } => Some(EscortRecord {
                fish_index,
                expiry_frame,
            }),
            FishState::Idle => None,
        })
        .collect()
}
