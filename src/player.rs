use crate::config::SimConfig;
use crate::vec2::Vec2;

/// Held-key state polled by the presentation layer each frame. Fire and
/// consume are edge events and arrive through the world's input methods
/// instead.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputState {
    pub turn_left: bool,
    pub turn_right: bool,
    pub thrust: bool,
    pub brake: bool,
}

/// The player-controlled agent. Moves along its heading with scalar speed,
/// friction bleeding speed off every tick.
#[derive(Clone, Debug)]
pub struct Player {
    pub position: Vec2,
    pub rotation: f32,
    pub speed: f32,
}

impl Player {
    pub fn new(position: Vec2) -> Self {
        Player {
            position,
            rotation: 0.0,
            speed: 0.0,
        }
    }

    /// Heading unit vector; rotation 0 faces up (-y).
    #[inline]
    pub fn heading(&self) -> Vec2 {
        Vec2::new(self.rotation.sin(), -self.rotation.cos())
    }

    pub fn update(&mut self, input: InputState, cfg: &SimConfig, delta_time: f32) {
        if input.turn_left {
            self.rotation -= cfg.player_rotation_speed * delta_time;
        }
        if input.turn_right {
            self.rotation += cfg.player_rotation_speed * delta_time;
        }
        if input.thrust {
            self.speed = (self.speed + cfg.player_acceleration).min(cfg.player_max_speed);
        }
        if input.brake {
            self.speed = (self.speed - cfg.player_acceleration).max(0.0);
        }

        let step = self.bounce_on_edges(cfg, delta_time);
        self.position += step;
        self.position.x = self.position.x.clamp(0.0, cfg.world_width);
        self.position.y = self.position.y.clamp(0.0, cfg.world_height);

        // Friction after moving, so a released throttle coasts down.
        self.speed *= cfg.player_friction;
    }

    /// This tick's displacement, with any component that points further out
    /// past an edge reflected back inward. Inward motion always passes
    /// through, so the player can push off an edge but never wedge on it.
    fn bounce_on_edges(&self, cfg: &SimConfig, delta_time: f32) -> Vec2 {
        let mut step = self.heading() * (self.speed * delta_time);
        if (self.position.x <= 0.0 && step.x < 0.0)
            || (self.position.x >= cfg.world_width && step.x > 0.0)
        {
            step.x = -step.x;
        }
        if (self.position.y <= 0.0 && step.y < 0.0)
            || (self.position.y >= cfg.world_height && step.y > 0.0)
        {
            step.y = -step.y;
        }
        step
    }
}
