// ==============================================================================
// debug_builders.rs - SERIALIZABLE CONTROLLER STATE (HOST VISUALIZATION)
// ------------------------------------------------------------------------------
// Flattens a TickReport into plain arrays:
// - DebugWheel: ray origin/direction/length, grounded, compression, hit,
//   normal, suspension force
// - DebugRay: drive force (origin + direction + magnitude)
// - DebugChassis: pose + half extents
//
// Hosts may draw these or ignore them. Nothing here feeds back into physics.
// ==============================================================================

use rapier3d::prelude::*;
use serde::Serialize;

use crate::controller::types::{p3, v3};
use crate::controller::TickReport;
use crate::suspension_contact::WheelContact;
use crate::vehicle::VehicleConfig;

#[derive(Debug, Clone, Serialize)]
pub struct DebugRay {
    pub origin: [f32; 3],
    pub direction: [f32; 3],
    pub length: f32,
    pub hit: Option<[f32; 3]>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DebugChassis {
    pub position: [f32; 3],
    pub rotation: [f32; 4], // quaternion (i, j, k, w)
    pub half_extents: [f32; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct DebugWheel {
    pub id: &'static str,          // "FR", "FL", "BR", "BL"
    pub ray: DebugRay,
    pub grounded: bool,
    pub compression: f32,
    pub normal: [f32; 3],
    pub force: [f32; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct DebugVehicle {
    pub chassis: DebugChassis,
    pub wheels: Vec<DebugWheel>,
    pub drive: Option<DebugRay>,
    pub steer_torque: [f32; 3],
    pub flip_point: Option<[f32; 3]>,
    pub reset: bool,
}

pub fn build_wheel_debug(contact: &WheelContact, force: Vector<Real>) -> DebugWheel {
    DebugWheel {
        id: contact.wheel.as_str(),
        ray: DebugRay {
            origin: p3(contact.origin),
            direction: v3(contact.dir),
            length: contact.length,
            hit: contact.hit_point.map(p3),
        },
        grounded: contact.grounded,
        compression: contact.compression,
        normal: v3(contact.normal),
        force: v3(force),
    }
}

pub fn build_vehicle_debug(report: &TickReport, pose: &Isometry<Real>, config: &VehicleConfig) -> DebugVehicle {
    let q = pose.rotation;

    DebugVehicle {
        chassis: DebugChassis {
            position: v3(pose.translation.vector),
            rotation: [q.i, q.j, q.k, q.w],
            half_extents: config.half_extents,
        },
        wheels: report
            .contacts
            .iter()
            .zip(report.suspension.iter())
            .map(|(c, f)| build_wheel_debug(c, *f))
            .collect(),
        drive: report.drive.map(|d| DebugRay {
            origin: p3(d.point),
            direction: v3(d.direction),
            length: d.force.norm(),
            hit: None,
        }),
        steer_torque: v3(report.steer_torque),
        flip_point: report.flip.map(|f| p3(f.point)),
        reset: report.reset,
    }
}
