//! controller - engine-agnostic vehicle controller (pure per-tick models + orchestration)

pub mod types;
pub mod kinematics;
pub mod longitudinal;
pub mod steering;
pub mod recovery;
pub mod solve;

pub use types::*;
pub use solve::{TickReport, VehicleController};
