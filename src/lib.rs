//! arcade-drive: raycast suspension-and-drive controller for a single
//! rigid-body car, plus a rapier3d host to run it in.

pub mod config;
pub mod controller;
pub mod debug_builders;
pub mod input;
pub mod physics;
pub mod spawn;
pub mod state;
pub mod suspension_contact;
pub mod vehicle;

pub use controller::{TickReport, VehicleController};
pub use input::{InputCollector, InputState, Key};
pub use physics::PhysicsWorld;
pub use vehicle::{VehicleConfig, ARCADE, HEAVY};
