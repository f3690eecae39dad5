// ==============================================================================
// suspension_contact.rs - RAYCAST WHEEL CONTACTS + SPRING/DAMPER SUSPENSION
// ------------------------------------------------------------------------------
// Two halves:
//
// sample_wheel_contacts(...)                 (wheel contact sampler)
//     Lays out the four wheel mounts from the chassis pose and half extents,
//     casts one ray per wheel along the chassis "down" axis and records a
//     WheelContact per corner in WheelId::ALL order (FR, FL, BR, BL).
//
// suspension_force(...)                      (suspension force model)
//     F = -k * c * down - b * damping_term(v_point)
//     where c is the compression ratio and v_point = v + ω × (p - com).
//
// Notes:
// - Nothing here touches the body. Forces are returned and applied by
//   controller::solve after all four contacts exist.
// - Compression is exactly 0 on a miss, and the force is exactly 0 whenever
//   the compression is 0.
// ==============================================================================

use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::controller::kinematics::{point_velocity, BodyAxes};
use crate::controller::types::{BodyState, RayCaster, WheelId};
use crate::vehicle::VehicleConfig;

/// Which part of the point velocity the damper resists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DampingMode {
    /// Only the component along the suspension (chassis up) axis.
    SuspensionAxis,
    /// The whole point velocity. Also brakes forward motion.
    FullVelocity,
}

#[derive(Debug, Clone, Copy)]
pub struct WheelContact {
    pub wheel: WheelId,

    // ray
    pub origin: Point<Real>,          // world-space wheel mount
    pub dir: Vector<Real>,            // chassis down, world space
    pub length: Real,                 // suspension travel

    // result
    pub grounded: bool,
    pub hit_distance: Real,           // == length when not grounded
    pub hit_point: Option<Point<Real>>,
    pub normal: Vector<Real>,         // zero when not grounded
    pub compression: Real,            // 0..1, 0 when not grounded
}

impl WheelContact {
    fn airborne(wheel: WheelId, origin: Point<Real>, dir: Vector<Real>, length: Real) -> Self {
        Self {
            wheel,
            origin,
            dir,
            length,
            grounded: false,
            hit_distance: length,
            hit_point: None,
            normal: Vector::zeros(),
            compression: 0.0,
        }
    }

    /// Placeholder used when the chassis basis cannot be built this tick.
    pub fn unavailable(wheel: WheelId, length: Real) -> Self {
        Self::airborne(wheel, Point::origin(), Vector::zeros(), length)
    }
}

/// World-space ray origins for the four wheels, WheelId::ALL order.
pub fn wheel_mounts(pose: &Isometry<Real>, axes: &BodyAxes, cfg: &VehicleConfig) -> [Point<Real>; 4] {
    let center = Point::from(pose.translation.vector);
    let base = center + axes.down * cfg.half_height();

    let reach_f = cfg.half_length() - cfg.wheel_inset;
    let reach_r = cfg.half_width() - cfg.wheel_inset;

    WheelId::ALL.map(|w| {
        let (sf, sr) = w.signs();
        base + axes.forward * (sf * reach_f) + axes.right * (sr * reach_r)
    })
}

pub fn sample_wheel_contacts<R: RayCaster + ?Sized>(
    pose: &Isometry<Real>,
    axes: &BodyAxes,
    cfg: &VehicleConfig,
    rays: &R,
) -> [WheelContact; 4] {
    let length = cfg.suspension_travel;
    let dir = axes.down;
    let mounts = wheel_mounts(pose, axes, cfg);

    WheelId::ALL.map(|wheel| {
        let origin = mounts[wheel.index()];

        let Some(hit) = rays.cast_ray(origin, dir, length) else {
            return WheelContact::airborne(wheel, origin, dir, length);
        };

        let hit_distance = (hit.point - origin).norm();
        if !hit_distance.is_finite() || hit_distance > length {
            return WheelContact::airborne(wheel, origin, dir, length);
        }

        WheelContact {
            wheel,
            origin,
            dir,
            length,
            grounded: true,
            hit_distance,
            hit_point: Some(hit.point),
            normal: hit.normal,
            compression: (1.0 - hit_distance / length).clamp(0.0, 1.0),
        }
    })
}

/// Spring-damper force for one wheel, applied at `contact.origin`.
pub fn suspension_force(contact: &WheelContact, body: &BodyState, cfg: &VehicleConfig) -> Vector<Real> {
    if !contact.grounded || contact.compression <= 0.0 {
        return Vector::zeros();
    }

    let spring = -contact.dir * (cfg.spring_k * contact.compression);

    let v = point_velocity(body.linvel, body.angvel, body.com, contact.origin);
    let damper = match cfg.damping_mode {
        DampingMode::SuspensionAxis => {
            let axis = -contact.dir;
            axis * (cfg.damper_b * v.dot(&axis))
        }
        DampingMode::FullVelocity => v * cfg.damper_b,
    };

    spring - damper
}
