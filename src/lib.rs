//! Real-time 2D ecosystem simulation: a player-steered dolphin, a flocking
//! shoal of fish, and a predator that hunts the player unless escorting fish
//! shield it. The crate is the simulation core; rendering and input live in
//! the binary and talk to [`World`] through a narrow interface.

pub mod collision;
pub mod config;
pub mod escort;
pub mod fish;
pub mod grid;
pub mod player;
pub mod predator;
pub mod pulse;
pub mod vec2;
pub mod world;

pub use collision::Bounds;
pub use config::{ConfigError, EdgePolicy, SimConfig};
pub use fish::{Fish, FishState};
pub use player::{InputState, Player};
pub use predator::{Predator, PredatorState};
pub use pulse::Pulse;
pub use vec2::Vec2;
pub use world::{SimEvent, World};
