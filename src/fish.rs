use crate::config::{EdgePolicy, SimConfig};
use crate::vec2::Vec2;
use rand::Rng;

/// Distance at which an escorting fish stops seeking and starts swirling
/// around the player instead of tracking it exactly.
const FOLLOW_APPROACH_RADIUS: f32 = 50.0;
/// Magnitude of the per-tick random orbit nudge while swirling.
const ORBIT_JITTER: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FishState {
    Idle,
    /// Escorting the player; reverts to Idle once the world frame counter
    /// reaches `expiry_frame`. Carrying the frame inside the variant keeps
    /// state and deadline from ever disagreeing.
    Follow { expiry_frame: u64 },
}

/// One prey agent. Flocks while Idle, pursues/orbits the player while in
/// Follow state.
#[derive(Clone, Debug)]
pub struct Fish {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub rotation: f32,
    pub state: FishState,
}

impl Fish {
    pub fn new(position: Vec2) -> Self {
        let mut rng = rand::thread_rng();
        Fish {
            position,
            velocity: Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
            acceleration: Vec2::ZERO,
            rotation: 0.0,
            state: FishState::Idle,
        }
    }

    #[inline]
    pub fn is_following(&self) -> bool {
        matches!(self.state, FishState::Follow { .. })
    }

    /// Advances this fish one tick against a stable snapshot of its
    /// neighbors. Neighbor references come from the spatial grid and may be
    /// one rebuild interval stale.
    pub fn update(
        &mut self,
        neighbors: &[&Fish],
        player_position: Vec2,
        player_radius: f32,
        cfg: &SimConfig,
        delta_time: f32,
    ) {
        if self.is_following() {
            self.pursue_player(player_position, cfg);
        } else {
            let separation = self.separation(neighbors, cfg);
            let alignment = self.alignment(neighbors, cfg);
            let cohesion = self.cohesion(neighbors, cfg);
            let avoidance = self.avoid_player(player_position, player_radius, cfg);

            // Equal priority by design; no weighted blending.
            self.acceleration = separation + alignment + cohesion + avoidance;
        }

        self.velocity += self.acceleration;
        self.velocity = self.velocity.limited(cfg.fish_max_speed);
        self.position += self.velocity * delta_time;
        self.rotation = self.velocity.heading();

        self.handle_edges(cfg);
    }

    /// Follow-state behavior: seek the player from afar, loose swirl when
    /// close. The swirl is a fresh random nudge every tick, not a tracked
    /// orbit angle.
    fn pursue_player(&mut self, player_position: Vec2, cfg: &SimConfig) {
        if self.position.distance_to(player_position) > FOLLOW_APPROACH_RADIUS {
            self.acceleration = self.seek(player_position, cfg);
        } else {
            let angle = rand::thread_rng().gen_range(0.0..std::f32::consts::TAU);
            self.acceleration = Vec2::from_angle(angle) * ORBIT_JITTER;
        }
    }

    /// Steer away from neighbors closer than the separation radius.
    fn separation(&self, neighbors: &[&Fish], cfg: &SimConfig) -> Vec2 {
        let mut steer = Vec2::ZERO;
        let mut count = 0;

        for other in neighbors {
            let offset = self.position - other.position;
            let distance = offset.length();
            if distance > 0.0 && distance < cfg.separation_radius {
                steer += Vec2::new(offset.x / distance, offset.y / distance);
                count += 1;
            }
        }

        if count > 0 {
            steer = Vec2::new(steer.x / count as f32, steer.y / count as f32);
        }

        if steer.length() > 0.0 {
            steer = steer.normalized() * cfg.fish_max_speed - self.velocity;
            steer = steer.limited(cfg.max_force);
        }
        steer
    }

    /// Match the average velocity of neighbors inside the neighbor radius.
    fn alignment(&self, neighbors: &[&Fish], cfg: &SimConfig) -> Vec2 {
        let mut avg_velocity = Vec2::ZERO;
        let mut count = 0;

        for other in neighbors {
            if self.position.distance_to(other.position) < cfg.neighbor_radius {
                avg_velocity += other.velocity;
                count += 1;
            }
        }

        if count == 0 {
            return Vec2::ZERO;
        }
        avg_velocity = Vec2::new(avg_velocity.x / count as f32, avg_velocity.y / count as f32);
        let desired = avg_velocity.normalized() * cfg.fish_max_speed;
        (desired - self.velocity).limited(cfg.max_force)
    }

    /// Steer toward the center of mass of neighbors inside the neighbor
    /// radius.
    fn cohesion(&self, neighbors: &[&Fish], cfg: &SimConfig) -> Vec2 {
        let mut center = Vec2::ZERO;
        let mut count = 0;

        for other in neighbors {
            if self.position.distance_to(other.position) < cfg.neighbor_radius {
                center += other.position;
                count += 1;
            }
        }

        if count == 0 {
            return Vec2::ZERO;
        }
        center = Vec2::new(center.x / count as f32, center.y / count as f32);
        self.seek(center, cfg)
    }

    /// Steer away from the player inside the avoid radius. On actual contact
    /// (distance under combined radii) a positional push-apart resolves the
    /// penetration immediately instead of waiting for steering to act.
    fn avoid_player(&mut self, player_position: Vec2, player_radius: f32, cfg: &SimConfig) -> Vec2 {
        let offset = self.position - player_position;
        let distance = offset.length();
        if distance <= 0.0 || distance >= cfg.avoid_radius {
            return Vec2::ZERO;
        }

        let mut steer = Vec2::new(offset.x / distance, offset.y / distance);
        steer = steer.normalized() * cfg.fish_max_speed - self.velocity;
        steer = steer.limited(cfg.max_force);

        let combined_radii = cfg.fish_radius + player_radius;
        if distance < combined_radii {
            let push = Vec2::new(offset.x / distance, offset.y / distance) * cfg.push_force;
            self.position += push;
            self.velocity += push;
        }

        steer
    }

    fn seek(&self, target: Vec2, cfg: &SimConfig) -> Vec2 {
        let desired = (target - self.position).normalized() * cfg.fish_max_speed;
        (desired - self.velocity).limited(cfg.max_force)
    }

    fn handle_edges(&mut self, cfg: &SimConfig) {
        match cfg.edge_policy {
            EdgePolicy::Wrap => {
                if self.position.x < 0.0 {
                    self.position.x = cfg.world_width;
                } else if self.position.x > cfg.world_width {
                    self.position.x = 0.0;
                }
                if self.position.y < 0.0 {
                    self.position.y = cfg.world_height;
                } else if self.position.y > cfg.world_height {
                    self.position.y = 0.0;
                }
            }
            EdgePolicy::Bounce => {
                if self.position.x < 0.0 || self.position.x > cfg.world_width {
                    self.velocity.x = -self.velocity.x;
                    self.position.x = self.position.x.clamp(0.0, cfg.world_width);
                }
                if self.position.y < 0.0 || self.position.y > cfg.world_height {
                    self.velocity.y = -self.velocity.y;
                    self.position.y = self.position.y.clamp(0.0, cfg.world_height);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> SimConfig {
        SimConfig::default()
    }

    fn fish_at(x: f32, y: f32) -> Fish {
        let mut fish = Fish::new(Vec2::new(x, y));
        fish.velocity = Vec2::ZERO;
        fish
    }

    #[test]
    fn separation_points_away_from_close_neighbor() {
        let cfg = cfg();
        let fish = fish_at(500.0, 500.0);
        let other = fish_at(520.0, 500.0);
        let steer = fish.separation(&[&other], &cfg);
        assert!(steer.x < 0.0, "should steer -x, got {steer:?}");
        assert!(steer.length() <= cfg.max_force + 1e-5);
    }

    #[test]
    fn separation_ignores_far_neighbors() {
        let cfg = cfg();
        let fish = fish_at(500.0, 500.0);
        let other = fish_at(580.0, 500.0); // outside separation, inside neighbor radius
        assert_eq!(fish.separation(&[&other], &cfg), Vec2::ZERO);
    }

    #[test]
    fn alignment_steers_toward_neighbor_velocity() {
        let cfg = cfg();
        let fish = fish_at(500.0, 500.0);
        let mut other = fish_at(550.0, 500.0);
        other.velocity = Vec2::new(0.0, 3.0);
        let steer = fish.alignment(&[&other], &cfg);
        assert!(steer.y > 0.0, "should steer +y, got {steer:?}");
        assert!(steer.length() <= cfg.max_force + 1e-5);
    }

    #[test]
    fn cohesion_steers_toward_center_of_mass() {
        let cfg = cfg();
        let fish = fish_at(500.0, 500.0);
        let a = fish_at(560.0, 500.0);
        let b = fish_at(560.0, 520.0);
        let steer = fish.cohesion(&[&a, &b], &cfg);
        assert!(steer.x > 0.0, "should steer +x, got {steer:?}");
    }

    #[test]
    fn rules_return_zero_with_no_neighbors() {
        let cfg = cfg();
        let fish = fish_at(500.0, 500.0);
        assert_eq!(fish.separation(&[], &cfg), Vec2::ZERO);
        assert_eq!(fish.alignment(&[], &cfg), Vec2::ZERO);
        assert_eq!(fish.cohesion(&[], &cfg), Vec2::ZERO);
    }

    #[test]
    fn player_contact_pushes_fish_out() {
        let cfg = cfg();
        let mut fish = fish_at(510.0, 500.0);
        // Player overlapping from the left: combined radii 55 > distance 10.
        fish.avoid_player(Vec2::new(500.0, 500.0), cfg.player_radius, &cfg);
        assert!(fish.position.x > 510.0);
        assert!(fish.velocity.x > 0.0);
    }

    #[test]
    fn speed_never_exceeds_max() {
        let cfg = cfg();
        let mut fish = fish_at(500.0, 500.0);
        fish.velocity = Vec2::new(50.0, 50.0);
        fish.update(&[], Vec2::new(1500.0, 900.0), cfg.player_radius, &cfg, 1.0);
        assert!(fish.velocity.length() <= cfg.fish_max_speed + 1e-4);
    }

    #[test]
    fn following_fish_seeks_distant_player() {
        let cfg = cfg();
        let mut fish = fish_at(100.0, 500.0);
        fish.state = FishState::Follow { expiry_frame: 1000 };
        fish.update(&[], Vec2::new(900.0, 500.0), cfg.player_radius, &cfg, 1.0);
        assert!(fish.velocity.x > 0.0, "should move toward player");
    }

    #[test]
    fn wrap_policy_teleports_across_edges() {
        let cfg = cfg();
        let mut fish = fish_at(-1.0, 500.0);
        fish.handle_edges(&cfg);
        assert_eq!(fish.position.x, cfg.world_width);
    }

    #[test]
    fn bounce_policy_reverses_crossing_component() {
        let cfg = SimConfig {
            edge_policy: EdgePolicy::Bounce,
            ..SimConfig::default()
        };
        let mut fish = fish_at(-5.0, 500.0);
        fish.velocity = Vec2::new(-2.0, 1.0);
        fish.handle_edges(&cfg);
        assert_eq!(fish.position.x, 0.0);
        assert_eq!(fish.velocity.x, 2.0);
        assert_eq!(fish.velocity.y, 1.0);
    }
}
