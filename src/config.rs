use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What an agent does when it crosses a world edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgePolicy {
    /// Teleport to the opposite edge.
    Wrap,
    /// Reverse the edge-crossing displacement component.
    Bounce,
}

/// Every tuning constant the simulation consumes, injected at construction.
/// Defaults are the reference values, tuned assuming delta_time ~= 1 at 60Hz.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub world_width: f32,
    pub world_height: f32,

    /// Spatial grid cell edge length.
    pub cell_size: f32,
    /// Ticks between grid rebuilds; neighbor lists may lag by one interval.
    pub grid_rebuild_interval: u64,

    pub fish_count: usize,
    pub predator_count: usize,
    pub pulse_pool_size: usize,

    /// Radius for alignment/cohesion neighbors.
    pub neighbor_radius: f32,
    /// Close-range radius for separation.
    pub separation_radius: f32,
    /// Radius at which fish steer away from the player.
    pub avoid_radius: f32,
    /// Radius around the player inside which a sonar pulse recruits escorts.
    pub follow_distance: f32,
    /// How many frames a recruited fish stays in Follow state.
    pub escort_duration_frames: u32,

    pub max_force: f32,
    pub push_force: f32,
    pub fish_max_speed: f32,
    pub predator_max_speed: f32,

    pub pulse_speed: f32,
    pub pulse_lifetime_frames: u32,

    pub player_max_speed: f32,
    pub player_rotation_speed: f32,
    pub player_acceleration: f32,
    pub player_friction: f32,

    pub fish_radius: f32,
    pub predator_radius: f32,
    pub player_radius: f32,
    pub pulse_radius: f32,

    pub lives: u32,
    pub echo_charges: u32,

    pub edge_policy: EdgePolicy,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            world_width: 1920.0,
            world_height: 1080.0,
            cell_size: 100.0,
            grid_rebuild_interval: 2,
            fish_count: 600,
            predator_count: 1,
            pulse_pool_size: 10,
            neighbor_radius: 100.0,
            separation_radius: 50.0,
            avoid_radius: 150.0,
            follow_distance: 500.0,
            escort_duration_frames: 420,
            max_force: 0.05,
            push_force: 1.0,
            fish_max_speed: 10.0,
            predator_max_speed: 10.0,
            pulse_speed: 10.0,
            pulse_lifetime_frames: 300,
            player_max_speed: 10.0,
            player_rotation_speed: 0.1,
            player_acceleration: 0.2,
            player_friction: 0.98,
            fish_radius: 15.0,
            predator_radius: 50.0,
            player_radius: 40.0,
            pulse_radius: 5.0,
            lives: 3,
            echo_charges: 3,
            edge_policy: EdgePolicy::Wrap,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f32 },
    #[error("{name} must be at least {min}, got {value}")]
    CountTooSmall {
        name: &'static str,
        min: u64,
        value: u64,
    },
}

impl SimConfig {
    /// Rejects configurations the simulation cannot meaningfully run with.
    /// Called once at world construction; nothing mid-simulation can recover
    /// from a bad constant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("world_width", self.world_width),
            ("world_height", self.world_height),
            ("cell_size", self.cell_size),
            ("neighbor_radius", self.neighbor_radius),
            ("separation_radius", self.separation_radius),
            ("avoid_radius", self.avoid_radius),
            ("follow_distance", self.follow_distance),
            ("max_force", self.max_force),
            ("push_force", self.push_force),
            ("fish_max_speed", self.fish_max_speed),
            ("predator_max_speed", self.predator_max_speed),
            ("pulse_speed", self.pulse_speed),
            ("player_max_speed", self.player_max_speed),
            ("fish_radius", self.fish_radius),
            ("predator_radius", self.predator_radius),
            ("player_radius", self.player_radius),
            ("pulse_radius", self.pulse_radius),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        let counts = [
            ("fish_count", self.fish_count as u64, 1),
            ("predator_count", self.predator_count as u64, 1),
            ("pulse_pool_size", self.pulse_pool_size as u64, 1),
            ("grid_rebuild_interval", self.grid_rebuild_interval, 1),
            ("escort_duration_frames", self.escort_duration_frames as u64, 1),
            ("pulse_lifetime_frames", self.pulse_lifetime_frames as u64, 1),
            ("lives", self.lives as u64, 1),
        ];
        for (name, value, min) in counts {
            if value < min {
                return Err(ConfigError::CountTooSmall { name, min, value });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = SimConfig {
            fish_count: 123,
            edge_policy: EdgePolicy::Bounce,
            ..SimConfig::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SimConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn zero_cell_size_is_rejected() {
        let cfg = SimConfig {
            cell_size: 0.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonPositive {
                name: "cell_size",
                ..
            })
        ));
    }

    #[test]
    fn non_finite_world_size_is_rejected() {
        let cfg = SimConfig {
            world_width: f32::NAN,
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_fish_count_is_rejected() {
        let cfg = SimConfig {
            fish_count: 0,
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::CountTooSmall {
                name: "fish_count",
                ..
            })
        ));
    }

    #[test]
    fn zero_pool_size_is_rejected() {
        let cfg = SimConfig {
            pulse_pool_size: 0,
            ..SimConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
