use crate::vec2::Vec2;
use tracing::debug;

/// One pooled sonar pulse. Never allocated after pool construction; the
/// `active` flag alone is its lifecycle.
#[derive(Clone, Debug)]
pub struct Pulse {
    pub position: Vec2,
    pub rotation: f32,
    pub active: bool,
    pub age_frames: u32,
}

impl Pulse {
    fn new() -> Self {
        Pulse {
            position: Vec2::ZERO,
            rotation: 0.0,
            active: false,
            age_frames: 0,
        }
    }

    /// Travel direction for the pulse's heading. Rotation 0 points up, so
    /// the forward vector is (sin, -cos), matching the player's movement.
    #[inline]
    pub fn direction(&self) -> Vec2 {
        Vec2::new(self.rotation.sin(), -self.rotation.cos())
    }
}

/// Fixed-capacity pool of sonar pulses. `acquire` scans for the first
/// inactive slot; exhaustion silently drops the fire request, so active
/// pulse count never exceeds capacity.
pub struct PulsePool {
    pulses: Vec<Pulse>,
    speed: f32,
    lifetime_frames: u32,
}

impl PulsePool {
    pub fn new(capacity: usize, speed: f32, lifetime_frames: u32) -> Self {
        PulsePool {
            pulses: vec![Pulse::new(); capacity],
            speed,
            lifetime_frames,
        }
    }

    /// Fires a pulse from `position` heading along `rotation`. Returns false
    /// when every slot is active and the request is dropped.
    pub fn acquire(&mut self, position: Vec2, rotation: f32) -> bool {
        match self.pulses.iter_mut().find(|p| !p.active) {
            Some(pulse) => {
                pulse.position = position;
                pulse.rotation = rotation;
                pulse.active = true;
                pulse.age_frames = 0;
                true
            }
            None => {
                debug!("pulse pool exhausted, fire request dropped");
                false
            }
        }
    }

    /// Advances every active pulse and deactivates those leaving the world
    /// or reaching their lifetime bound.
    pub fn update(&mut self, delta_time: f32, world_width: f32, world_height: f32) {
        for pulse in self.pulses.iter_mut().filter(|p| p.active) {
            let step = pulse.direction() * (self.speed * delta_time);
            pulse.position += step;
            pulse.age_frames += 1;

            let out_of_bounds = pulse.position.x < 0.0
                || pulse.position.x > world_width
                || pulse.position.y < 0.0
                || pulse.position.y > world_height;
            if out_of_bounds || pulse.age_frames >= self.lifetime_frames {
                pulse.active = false;
            }
        }
    }

    pub fn deactivate(&mut self, index: usize) {
        self.pulses[index].active = false;
    }

    pub fn clear(&mut self) {
        for pulse in &mut self.pulses {
            pulse.active = false;
            pulse.age_frames = 0;
        }
    }

    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    pub fn active_count(&self) -> usize {
        self.pulses.iter().filter(|p| p.active).count()
    }
}
