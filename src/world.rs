use crate::collision::{sprites_overlap, within_radius, Bounds};
use crate::config::{ConfigError, SimConfig};
use crate::escort;
use crate::fish::Fish;
use crate::grid::SpatialGrid;
use crate::player::{InputState, Player};
use crate::predator::Predator;
use crate::pulse::{Pulse, PulsePool};
use crate::vec2::Vec2;
use rand::Rng;
use rayon::prelude::*;
use tracing::{debug, info};

/// Events emitted during a tick, drained by the presentation layer for
/// sound/UI feedback. The core never blocks on them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimEvent {
    PulseFired,
    /// Fire request arrived with the pool saturated; the pulse was dropped
    /// but escorts were still recruited.
    PulseDropped,
    EscortsRecruited { count: usize },
    PredatorStunned,
    PlayerHit { lives_remaining: u32 },
    FishCaptured { score: u32 },
    GameOver,
    Won,
}

/// The whole simulation: player, shoal, predators, pulse pool, spatial grid,
/// and the per-tick scheduler that drives them in a fixed order.
pub struct World {
    cfg: SimConfig,
    player: Player,
    fishes: Vec<Fish>,
    predators: Vec<Predator>,
    pulses: PulsePool,
    grid: SpatialGrid,
    input: InputState,
    frame: u64,
    score: u32,
    lives: u32,
    charges: u32,
    game_over: bool,
    won: bool,
    fire_requested: bool,
    consume_requested: bool,
    events: Vec<SimEvent>,
}

impl World {
    pub fn new(cfg: SimConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        info!(
            fish = cfg.fish_count,
            predators = cfg.predator_count,
            pool = cfg.pulse_pool_size,
            "world created"
        );

        let mut world = World {
            player: Player::new(Vec2::new(cfg.world_width / 2.0, cfg.world_height / 2.0)),
            fishes: Vec::new(),
            predators: Vec::new(),
            pulses: PulsePool::new(cfg.pulse_pool_size, cfg.pulse_speed, cfg.pulse_lifetime_frames),
            grid: SpatialGrid::new(cfg.cell_size),
            input: InputState::default(),
            frame: 0,
            score: 0,
            lives: cfg.lives,
            charges: cfg.echo_charges,
            game_over: false,
            won: false,
            fire_requested: false,
            consume_requested: false,
            events: Vec::new(),
            cfg,
        };
        world.spawn_population();
        Ok(world)
    }

    fn spawn_population(&mut self) {
        let mut rng = rand::thread_rng();
        self.fishes = (0..self.cfg.fish_count)
            .map(|_| {
                Fish::new(Vec2::new(
                    rng.gen_range(0.0..self.cfg.world_width),
                    rng.gen_range(0.0..self.cfg.world_height),
                ))
            })
            .collect();
        self.predators = (0..self.cfg.predator_count)
            .map(|_| {
                Predator::new(Vec2::new(
                    rng.gen_range(0.0..self.cfg.world_width),
                    rng.gen_range(0.0..self.cfg.world_height),
                ))
            })
            .collect();
        self.rebuild_grid();
    }

    /// Back to the initial state with the same configuration.
    pub fn restart(&mut self) {
        info!("restart");
        self.player = Player::new(Vec2::new(
            self.cfg.world_width / 2.0,
            self.cfg.world_height / 2.0,
        ));
        self.pulses.clear();
        self.input = InputState::default();
        self.frame = 0;
        self.score = 0;
        self.lives = self.cfg.lives;
        self.charges = self.cfg.echo_charges;
        self.game_over = false;
        self.won = false;
        self.fire_requested = false;
        self.consume_requested = false;
        self.events.clear();
        self.spawn_population();
    }

    /// One simulation tick. `delta_time` is in 60Hz frame units (1.0 means
    /// one nominal frame); the tuning constants assume values near 1 and
    /// large spikes are deliberately not compensated.
    pub fn tick(&mut self, delta_time: f32) {
        if self.game_over || self.won {
            return;
        }
        self.frame += 1;

        self.player.update(self.input, &self.cfg, delta_time);
        self.handle_fire_request();

        // Grid rebuild is amortized; the whole phase completes before any
        // neighbor query below runs.
        if (self.frame - 1) % self.cfg.grid_rebuild_interval == 0 {
            self.rebuild_grid();
        }

        self.update_fishes(delta_time);

        let player_position = self.player.position;
        for predator in &mut self.predators {
            predator.update(player_position, &self.fishes, &self.cfg, delta_time);
        }

        escort::expire(&mut self.fishes, self.frame);
        self.pulses
            .update(delta_time, self.cfg.world_width, self.cfg.world_height);

        self.resolve_collisions();
        self.handle_consume_request();
    }

    /// Per-fish steering over a stable snapshot: each fish is cloned,
    /// advanced against immutable neighbor references, and written back.
    /// Safe to parallelize because nothing mutates the shared snapshot.
    fn update_fishes(&mut self, delta_time: f32) {
        let fishes = &self.fishes;
        let grid = &self.grid;
        let cfg = &self.cfg;
        let player_position = self.player.position;

        let updated: Vec<Fish> = (0..fishes.len())
            .into_par_iter()
            .map(|i| {
                let neighbor_indices = grid.neighbors(fishes[i].position);
                let neighbors: Vec<&Fish> = neighbor_indices
                    .iter()
                    .filter(|&&idx| idx != i && idx < fishes.len())
                    .map(|&idx| &fishes[idx])
                    .collect();

                let mut fish = fishes[i].clone();
                fish.update(&neighbors, player_position, cfg.player_radius, cfg, delta_time);
                fish
            })
            .collect();

        self.fishes = updated;
    }

    fn handle_fire_request(&mut self) {
        if !self.fire_requested {
            return;
        }
        self.fire_requested = false;
        if self.charges == 0 {
            return;
        }
        self.charges -= 1;

        let fired = self
            .pulses
            .acquire(self.player.position, self.player.rotation);
        self.events.push(if fired {
            SimEvent::PulseFired
        } else {
            SimEvent::PulseDropped
        });

        // Escorts are recruited by the ping itself, even when the visual
        // pulse was dropped by a saturated pool.
        let count = escort::activate(
            &mut self.fishes,
            self.player.position,
            self.frame,
            &self.cfg,
        );
        self.events.push(SimEvent::EscortsRecruited { count });
    }

    fn handle_consume_request(&mut self) {
        if !self.consume_requested {
            return;
        }
        self.consume_requested = false;

        let combined = self.cfg.player_radius + self.cfg.fish_radius;
        let player_position = self.player.position;
        let nearest = self
            .fishes
            .iter()
            .enumerate()
            .filter(|(_, f)| within_radius(player_position, f.position, combined))
            .min_by(|(_, a), (_, b)| {
                a.position
                    .distance_to(player_position)
                    .total_cmp(&b.position.distance_to(player_position))
            })
            .map(|(i, _)| i);

        if let Some(index) = nearest {
            // Sole prey-removal path; captured fish are gone for good, they
            // do not return to any pool.
            self.fishes.swap_remove(index);
            self.score += 1;
            debug!(score = self.score, "fish captured");
            self.events.push(SimEvent::FishCaptured { score: self.score });
            // Indices shifted; stale buckets would point at the wrong fish.
            self.rebuild_grid();

            if self.fishes.is_empty() {
                info!(score = self.score, "shoal exhausted, game won");
                self.won = true;
                self.events.push(SimEvent::Won);
            }
        }
    }

    fn resolve_collisions(&mut self) {
        let player_bounds = Bounds::around(self.player.position, self.cfg.player_radius);

        // Predator vs pulse: stun, pulse keeps travelling.
        for predator in &mut self.predators {
            let predator_bounds = Bounds::around(predator.position, self.cfg.predator_radius);
            for pulse in self.pulses.pulses() {
                if pulse.active
                    && sprites_overlap(
                        predator_bounds,
                        Bounds::around(pulse.position, self.cfg.pulse_radius),
                    )
                {
                    predator.stun();
                    self.events.push(SimEvent::PredatorStunned);
                    break;
                }
            }
        }

        // Player vs predator: at most one hit per tick.
        for predator in &self.predators {
            let predator_bounds = Bounds::around(predator.position, self.cfg.predator_radius);
            if sprites_overlap(player_bounds, predator_bounds) {
                self.lives = self.lives.saturating_sub(1);
                self.player.position =
                    Vec2::new(self.cfg.world_width / 2.0, self.cfg.world_height / 2.0);
                self.player.speed = 0.0;
                info!(lives = self.lives, "player caught by predator");
                self.events.push(SimEvent::PlayerHit {
                    lives_remaining: self.lives,
                });
                if self.lives == 0 {
                    self.game_over = true;
                    self.events.push(SimEvent::GameOver);
                }
                break;
            }
        }
    }

    fn rebuild_grid(&mut self) {
        self.grid
            .rebuild(self.fishes.iter().enumerate().map(|(i, f)| (i, &f.position)));
    }

    // --- presentation-layer interface ---

    pub fn on_fire_input(&mut self) {
        self.fire_requested = true;
    }

    pub fn on_consume_input(&mut self) {
        self.consume_requested = true;
    }

    pub fn set_input(&mut self, input: InputState) {
        self.input = input;
    }

    /// Events since the last drain, in emission order.
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn active_fish_count(&self) -> usize {
        self.fishes.len()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives_remaining(&self) -> u32 {
        self.lives
    }

    pub fn echo_charges(&self) -> u32 {
        self.charges
    }

    /// Restores spent sonar charges, capped at the configured maximum. The
    /// recharge cadence is the caller's policy, not the core's.
    pub fn recharge(&mut self, amount: u32) {
        self.charges = (self.charges + amount).min(self.cfg.echo_charges);
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_bounds(&self) -> Bounds {
        Bounds::around(self.player.position, self.cfg.player_radius)
    }

    pub fn fishes(&self) -> &[Fish] {
        &self.fishes
    }

    pub fn predators(&self) -> &[Predator] {
        &self.predators
    }

    pub fn pulses(&self) -> &[Pulse] {
        self.pulses.pulses()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fish::FishState;
    use crate::predator::PredatorState;

    fn small_cfg() -> SimConfig {
        SimConfig {
            fish_count: 4,
            predator_count: 1,
            pulse_pool_size: 3,
            ..SimConfig::default()
        }
    }

    fn world() -> World {
        World::new(small_cfg()).unwrap()
    }

    /// Parks every agent far from the player so collisions and escorts
    /// cannot trigger by accident.
    fn park_everyone(world: &mut World) {
        for (i, fish) in world.fishes.iter_mut().enumerate() {
            fish.position = Vec2::new(30.0 + i as f32 * 60.0, 30.0);
            fish.velocity = Vec2::ZERO;
        }
        for predator in &mut world.predators {
            predator.position = Vec2::new(1890.0, 1050.0);
            predator.velocity = Vec2::ZERO;
        }
        world.rebuild_grid();
    }

    #[test]
    fn invalid_config_fails_construction() {
        let cfg = SimConfig {
            cell_size: -1.0,
            ..SimConfig::default()
        };
        assert!(World::new(cfg).is_err());
    }

    #[test]
    fn new_world_spawns_configured_population() {
        let world = world();
        assert_eq!(world.active_fish_count(), 4);
        assert_eq!(world.predators().len(), 1);
        assert_eq!(world.lives_remaining(), 3);
        assert_eq!(world.echo_charges(), 3);
        assert!(!world.is_game_over());
        assert!(!world.is_won());
    }

    #[test]
    fn tick_advances_the_frame_counter() {
        let mut world = world();
        park_everyone(&mut world);
        world.tick(1.0);
        world.tick(1.0);
        assert_eq!(world.frame(), 2);
    }

    #[test]
    fn fire_spends_a_charge_and_recruits_nearby_fish() {
        let mut world = world();
        park_everyone(&mut world);
        // One fish near the player, the rest parked far away.
        world.fishes[0].position = Vec2::new(1000.0, 540.0);
        world.player.position = Vec2::new(960.0, 540.0);

        world.on_fire_input();
        world.tick(1.0);

        assert_eq!(world.echo_charges(), 2);
        assert_eq!(world.pulses.active_count(), 1);
        let events = world.drain_events();
        assert!(events.contains(&SimEvent::PulseFired));
        assert!(events.contains(&SimEvent::EscortsRecruited { count: 1 }));
        assert!(world.fishes()[0].is_following());
    }

    #[test]
    fn fire_without_charges_is_a_no_op() {
        let mut world = world();
        park_everyone(&mut world);
        world.charges = 0;
        world.on_fire_input();
        world.tick(1.0);
        assert_eq!(world.pulses.active_count(), 0);
        assert!(world.drain_events().is_empty());
    }

    #[test]
    fn recharge_saturates_at_configured_maximum() {
        let mut world = world();
        world.charges = 1;
        world.recharge(10);
        assert_eq!(world.echo_charges(), 3);
    }

    #[test]
    fn consume_captures_the_nearest_fish_and_scores() {
        let mut world = world();
        park_everyone(&mut world);
        world.player.position = Vec2::new(960.0, 540.0);
        world.fishes[2].position = Vec2::new(980.0, 540.0); // within capture range

        world.on_consume_input();
        world.tick(1.0);

        assert_eq!(world.score(), 1);
        assert_eq!(world.active_fish_count(), 3);
        assert!(world
            .drain_events()
            .contains(&SimEvent::FishCaptured { score: 1 }));
    }

    #[test]
    fn consume_away_from_any_fish_does_nothing() {
        let mut world = world();
        park_everyone(&mut world);
        world.player.position = Vec2::new(1800.0, 200.0);
        world.on_consume_input();
        world.tick(1.0);
        assert_eq!(world.score(), 0);
        assert_eq!(world.active_fish_count(), 4);
    }

    #[test]
    fn capturing_the_last_fish_wins() {
        let mut world = world();
        park_everyone(&mut world);
        world.fishes.truncate(1);
        world.rebuild_grid();
        world.player.position = Vec2::new(960.0, 540.0);
        world.fishes[0].position = Vec2::new(970.0, 540.0);
        world.fishes[0].velocity = Vec2::ZERO;

        world.on_consume_input();
        world.tick(1.0);

        assert!(world.is_won());
        assert!(world.drain_events().contains(&SimEvent::Won));
        // Terminal state freezes the simulation.
        let frame = world.frame();
        world.tick(1.0);
        assert_eq!(world.frame(), frame);
    }

    #[test]
    fn predator_contact_costs_a_life_and_repositions() {
        let mut world = world();
        park_everyone(&mut world);
        world.player.position = Vec2::new(400.0, 400.0);
        world.predators[0].position = Vec2::new(400.0, 400.0);

        world.tick(1.0);

        assert_eq!(world.lives_remaining(), 2);
        let center = Vec2::new(960.0, 540.0);
        assert!(world.player().position.distance_to(center) < 1.0);
        assert!(world
            .drain_events()
            .iter()
            .any(|e| matches!(e, SimEvent::PlayerHit { lives_remaining: 2 })));
    }

    #[test]
    fn losing_the_last_life_ends_the_game() {
        let mut world = world();
        park_everyone(&mut world);
        world.lives = 1;
        world.player.position = Vec2::new(400.0, 400.0);
        world.predators[0].position = Vec2::new(400.0, 400.0);

        world.tick(1.0);

        assert!(world.is_game_over());
        assert!(world.drain_events().contains(&SimEvent::GameOver));
    }

    #[test]
    fn pulse_overlap_stuns_the_predator() {
        let mut world = world();
        park_everyone(&mut world);
        world.player.position = Vec2::new(100.0, 100.0);
        let predator_position = Vec2::new(1890.0, 1050.0);
        world.predators[0].velocity = Vec2::new(5.0, 5.0);
        world.pulses.acquire(predator_position, 0.0);

        world.tick(1.0);

        assert_eq!(world.predators()[0].velocity, Vec2::ZERO);
        assert!(world.drain_events().contains(&SimEvent::PredatorStunned));
    }

    #[test]
    fn escort_blocks_predator_through_a_full_tick() {
        let mut world = world();
        park_everyone(&mut world);
        world.player.position = Vec2::new(200.0, 500.0);
        world.predators[0].position = Vec2::new(1200.0, 500.0);
        world.fishes[0].position = Vec2::new(400.0, 500.0);
        world.fishes[0].state = FishState::Follow { expiry_frame: u64::MAX };
        world.rebuild_grid();

        world.tick(1.0);

        assert_eq!(world.predators()[0].state, PredatorState::Wandering);
    }

    #[test]
    fn restart_resets_everything() {
        let mut world = world();
        park_everyone(&mut world);
        world.score = 7;
        world.lives = 1;
        world.charges = 0;
        world.game_over = true;
        world.fishes.truncate(1);

        world.restart();

        assert_eq!(world.score(), 0);
        assert_eq!(world.lives_remaining(), 3);
        assert_eq!(world.echo_charges(), 3);
        assert_eq!(world.active_fish_count(), 4);
        assert_eq!(world.frame(), 0);
        assert!(!world.is_game_over());
    }

    #[test]
    fn escort_expires_after_configured_duration() {
        let mut world = World::new(SimConfig {
            escort_duration_frames: 5,
            ..small_cfg()
        })
        .unwrap();
        park_everyone(&mut world);
        world.player.position = Vec2::new(960.0, 540.0);
        world.fishes[0].position = Vec2::new(1000.0, 540.0);
        world.rebuild_grid();

        world.on_fire_input();
        world.tick(1.0); // fired at frame 1, expiry = 6
        assert!(world.fishes()[0].is_following());

        for _ in 0..4 {
            world.tick(1.0);
        }
        assert!(world.fishes()[0].is_following(), "frame 5, still escorting");
        world.tick(1.0);
        assert!(!world.fishes()[0].is_following(), "frame 6, expired");
    }
}
