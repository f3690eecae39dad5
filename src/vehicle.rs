use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ConfigError;
use crate::controller::longitudinal::DriveAlignment;
use crate::controller::recovery::TriggerMode;
use crate::controller::VehicleController;
use crate::suspension_contact::DampingMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    pub mass: f32,                    // kg
    pub linear_damping: f32,          // drag
    pub angular_damping: f32,         // rotational drag

    // --- Chassis geometry ---
    pub half_extents: [f32; 3],       // [height, width, length] meters
    pub wheel_inset: f32,             // meters, pulls ray origins inside the silhouette

    // --- Suspension ---
    pub suspension_travel: f32,       // ray length, meters
    pub spring_k: f32,                // N at full compression
    pub damper_b: f32,                // N*s/m
    pub damping_mode: DampingMode,

    // --- Drive ---
    pub forward_force: f32,           // N
    pub reverse_force: f32,           // N
    pub drive_point_drop: f32,        // meters below the center of mass
    pub drive_alignment: DriveAlignment,

    // --- Steering ---
    pub yaw_torque: f32,              // N*m

    // --- Recovery ---
    pub flip_impulse: f32,            // N*s
    pub trigger_mode: TriggerMode,
    pub spawn_point: [f32; 3],        // world, meters
}

impl Default for VehicleConfig {
    fn default() -> Self {
        ARCADE
    }
}

pub const ARCADE: VehicleConfig = VehicleConfig {
    mass: 150.0,
    linear_damping: 0.1,
    angular_damping: 0.8,

    half_extents: [0.5, 1.0, 2.0],
    wheel_inset: 0.1,

    // rests near 45% compression: 4 * k * c = m * g
    suspension_travel: 0.7,
    spring_k: 820.0,
    damper_b: 380.0,
    damping_mode: DampingMode::SuspensionAxis,

    forward_force: 1200.0,
    reverse_force: 400.0,            // 3:1
    drive_point_drop: 0.3,
    drive_alignment: DriveAlignment::PrimaryContact,

    yaw_torque: 250.0,

    flip_impulse: 300.0,
    trigger_mode: TriggerMode::Edge,
    spawn_point: [0.0, 1.0, 0.0],
};

pub const HEAVY: VehicleConfig = VehicleConfig {
    mass: 600.0,
    linear_damping: 0.3,
    angular_damping: 1.5,

    half_extents: [0.7, 1.3, 3.0],
    wheel_inset: 0.15,

    suspension_travel: 0.9,
    spring_k: 3270.0,
    damper_b: 1500.0,
    damping_mode: DampingMode::SuspensionAxis,

    forward_force: 3600.0,
    reverse_force: 1200.0,
    drive_point_drop: 0.4,
    drive_alignment: DriveAlignment::PrimaryContact,

    yaw_torque: 1500.0,

    flip_impulse: 1400.0,
    trigger_mode: TriggerMode::Edge,
    spawn_point: [0.0, 1.4, 0.0],
};

impl VehicleConfig {
    #[inline] pub fn half_height(&self) -> f32 { self.half_extents[0] }
    #[inline] pub fn half_width(&self) -> f32 { self.half_extents[1] }
    #[inline] pub fn half_length(&self) -> f32 { self.half_extents[2] }

    pub fn spawn(&self) -> Vector<Real> {
        vector![self.spawn_point[0], self.spawn_point[1], self.spawn_point[2]]
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.mass > 0.0) {
            return Err(ConfigError::Invalid("mass must be positive"));
        }
        if self.half_extents.iter().any(|h| !(*h > 0.0)) {
            return Err(ConfigError::Invalid("half extents must be positive"));
        }
        if !(self.wheel_inset >= 0.0) || self.wheel_inset >= self.half_width() || self.wheel_inset >= self.half_length() {
            return Err(ConfigError::Invalid("wheel inset must fit inside the chassis"));
        }
        if !(self.suspension_travel > 0.0) {
            return Err(ConfigError::Invalid("suspension travel must be positive"));
        }
        let non_negative = [
            self.spring_k,
            self.damper_b,
            self.forward_force,
            self.reverse_force,
            self.yaw_torque,
            self.flip_impulse,
            self.drive_point_drop,
        ];
        if non_negative.iter().any(|x| !(*x >= 0.0)) {
            return Err(ConfigError::Invalid("gains and forces must be non-negative"));
        }
        if self.forward_force <= self.reverse_force {
            return Err(ConfigError::Invalid("forward force must exceed reverse force"));
        }
        if self.spawn_point.iter().any(|x| !x.is_finite()) {
            return Err(ConfigError::Invalid("spawn point must be finite"));
        }
        Ok(())
    }
}

pub struct Vehicle {
    pub id: Uuid,                     // host-side identity
    pub body: RigidBodyHandle,        // the chassis body
    pub controller: VehicleController,
}
