use crate::config::{EdgePolicy, SimConfig};
use crate::fish::Fish;
use crate::vec2::Vec2;
use rand::Rng;

/// Per-axis magnitude of the wandering noise applied each tick.
const WANDER_NOISE: f32 = 0.05;
/// Stun impulse applied when a sonar pulse connects.
const STUN_ACCELERATION: Vec2 = Vec2 { x: -2.0, y: -2.0 };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredatorState {
    Wandering,
    Hunting,
}

/// The hunter. Chases the player at full speed unless escorting fish
/// interpose, in which case it falls back to aimless meandering.
#[derive(Clone, Debug)]
pub struct Predator {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub rotation: f32,
    pub state: PredatorState,
}

impl Predator {
    pub fn new(position: Vec2) -> Self {
        let mut rng = rand::thread_rng();
        Predator {
            position,
            velocity: Vec2::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
            acceleration: Vec2::ZERO,
            rotation: 0.0,
            state: PredatorState::Wandering,
        }
    }

    /// One tick. The state is recomputed from the current world snapshot
    /// every call rather than edge-triggered, so there is no transition
    /// table to drift out of sync.
    pub fn update(&mut self, player_position: Vec2, fishes: &[Fish], cfg: &SimConfig, delta_time: f32) {
        self.state = if self.is_blocked_by_fishes(player_position, fishes) {
            PredatorState::Wandering
        } else {
            PredatorState::Hunting
        };

        match self.state {
            PredatorState::Hunting => self.hunt(player_position, cfg, delta_time),
            PredatorState::Wandering => self.wander(cfg, delta_time),
        }

        self.handle_edges(cfg);
    }

    /// True when any escorting fish sits closer to the player than this
    /// predator does. Pure function of the snapshot passed in.
    pub fn is_blocked_by_fishes(&self, player_position: Vec2, fishes: &[Fish]) -> bool {
        let own_distance = self.position.distance_to(player_position);
        fishes
            .iter()
            .filter(|f| f.is_following())
            .any(|f| f.position.distance_to(player_position) < own_distance)
    }

    fn hunt(&mut self, player_position: Vec2, cfg: &SimConfig, delta_time: f32) {
        self.acceleration = self.seek(player_position, cfg);
        self.velocity += self.acceleration;
        self.velocity = self.velocity.limited(cfg.predator_max_speed);
        self.position += self.velocity * delta_time;
        self.rotation = self.velocity.heading();
    }

    /// Meanders with uniform per-tick noise, capped at half speed.
    fn wander(&mut self, cfg: &SimConfig, delta_time: f32) {
        let mut rng = rand::thread_rng();
        self.acceleration = Vec2::new(
            rng.gen_range(-WANDER_NOISE..WANDER_NOISE),
            rng.gen_range(-WANDER_NOISE..WANDER_NOISE),
        );
        self.velocity += self.acceleration;
        self.velocity = self.velocity.limited(cfg.predator_max_speed / 2.0);
        self.position += self.velocity * delta_time;
        self.rotation = self.velocity.heading();
    }

    /// Pulse hit: kill all momentum on the spot.
    pub fn stun(&mut self) {
        self.acceleration = STUN_ACCELERATION;
        self.velocity = Vec2::ZERO;
    }

    fn seek(&self, target: Vec2, cfg: &SimConfig) -> Vec2 {
        let desired = (target - self.position).normalized() * cfg.predator_max_speed;
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
