//! Core shared types for the vehicle controller (engine-agnostic seams).
// controller/types.rs
use std::fmt;

use nalgebra::UnitQuaternion;
use rapier3d::prelude::{Isometry, Point, Real, Vector};
use serde::Serialize;

// ============================================
// Wheel identification
// ============================================

/// One of the four corners. The order of `WheelId::ALL` is the order every
/// per-wheel array in the controller uses.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
pub enum WheelId { FR, FL, BR, BL }

impl WheelId {
    pub const ALL: [WheelId; 4] = [WheelId::FR, WheelId::FL, WheelId::BR, WheelId::BL];

    pub fn index(&self) -> usize {
        match self {
            WheelId::FR => 0,
            WheelId::FL => 1,
            WheelId::BR => 2,
            WheelId::BL => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WheelId::FR => "FR",
            WheelId::FL => "FL",
            WheelId::BR => "BR",
            WheelId::BL => "BL",
        }
    }

    pub fn is_front(&self) -> bool {
        matches!(self, WheelId::FR | WheelId::FL)
    }

    pub fn is_right(&self) -> bool {
        matches!(self, WheelId::FR | WheelId::BR)
    }

    /// (forward sign, right sign) of this corner in chassis space.
    pub fn signs(&self) -> (Real, Real) {
        let f = if self.is_front() { 1.0 } else { -1.0 };
        let r = if self.is_right() { 1.0 } else { -1.0 };
        (f, r)
    }
}

impl fmt::Display for WheelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================
// ----- engine seams -------------------------
// ============================================

/// Result of a ray query against the world geometry.
#[derive(Debug, Clone, Copy)]
pub struct RayHit {
    pub distance: Real,          // along the (unit) ray direction
    pub normal: Vector<Real>,    // surface normal at the hit
    pub point: Point<Real>,      // world-space hit point
}

/// Ray-intersection service owning the static/dynamic collision geometry.
/// Implementations exclude the controlled chassis itself.
pub trait RayCaster {
    fn cast_ray(&self, origin: Point<Real>, dir: Vector<Real>, max_dist: Real) -> Option<RayHit>;
}

/// The rigid body under control. Pose and velocity are owned by the physics
/// engine; the controller only touches them through these calls.
pub trait ChassisBody {
    fn position(&self) -> Isometry<Real>;
    /// World-space center of mass.
    fn center_of_mass(&self) -> Point<Real>;
    fn linvel(&self) -> Vector<Real>;
    fn angvel(&self) -> Vector<Real>;

    fn set_linvel(&mut self, v: Vector<Real>);
    fn set_angvel(&mut self, w: Vector<Real>);
    fn set_translation(&mut self, p: Vector<Real>);
    fn set_rotation(&mut self, q: UnitQuaternion<Real>);

    fn apply_force(&mut self, force: Vector<Real>, point: Point<Real>);
    fn apply_torque(&mut self, torque: Vector<Real>);
    fn apply_impulse(&mut self, impulse: Vector<Real>, point: Point<Real>);

    /// Drop user forces/torques accumulated by previous ticks.
    fn clear_forces(&mut self);
}

/// Read-only copy of the body state taken once at the start of a tick.
#[derive(Debug, Clone, Copy)]
pub struct BodyState {
    pub pose: Isometry<Real>,
    pub com: Point<Real>,
    pub linvel: Vector<Real>,
    pub angvel: Vector<Real>,
}

impl BodyState {
    pub fn capture<B: ChassisBody + ?Sized>(body: &B) -> Self {
        Self {
            pose: body.position(),
            com: body.center_of_mass(),
            linvel: body.linvel(),
            angvel: body.angvel(),
        }
    }
}

#[inline] pub fn v3(v: Vector<Real>) -> [f32; 3] { [v.x, v.y, v.z] }
#[inline] pub fn p3(p: Point<Real>) -> [f32; 3] { [p.x, p.y, p.z] }
