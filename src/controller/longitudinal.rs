// ==============================================================================
// longitudinal.rs - DRIVE / BRAKE FORCE (whole body, single force)
// ==============================================================================
// One force per tick from forward/back input:
//
//     F = (fwd * forward_force - back * reverse_force) * drive_dir
//
// - Gated on at least one grounded wheel. Airborne cars never accelerate.
// - forward_force > reverse_force (config validation enforces it).
// - Applied at com + down * drive_point_drop so throttle keeps the nose down.
//
// drive_dir:
// - DriveAlignment::BodyForward     raw chassis forward
// - DriveAlignment::PrimaryContact  ground-aligned forward of the first
//   grounded wheel (FR, FL, BR, BL order). The other wheels' contact planes
//   are ignored for the drive direction.
// ==============================================================================

use rapier3d::prelude::{Point, Real, Vector};
use serde::{Deserialize, Serialize};

use crate::controller::kinematics::{ground_forward, BodyAxes};
use crate::controller::types::BodyState;
use crate::input::{InputState, Key};
use crate::suspension_contact::WheelContact;
use crate::vehicle::VehicleConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriveAlignment {
    BodyForward,
    PrimaryContact,
}

#[derive(Debug, Clone, Copy)]
pub struct DriveOutput {
    pub force: Vector<Real>,
    pub point: Point<Real>,
    pub direction: Vector<Real>,            // unit
    pub primary_contact: Option<usize>,     // index into the contact array
}

/// First grounded wheel, if any.
pub fn primary_contact_index(contacts: &[WheelContact; 4]) -> Option<usize> {
    contacts.iter().position(|c| c.grounded)
}

pub fn drive_force(
    contacts: &[WheelContact; 4],
    axes: &BodyAxes,
    body: &BodyState,
    input: &InputState,
    cfg: &VehicleConfig,
) -> Option<DriveOutput> {
    let primary = primary_contact_index(contacts)?;

    let mut magnitude = 0.0;
    if input.pressed(Key::Forward) { magnitude += cfg.forward_force; }
    if input.pressed(Key::Back) { magnitude -= cfg.reverse_force; }
    if magnitude == 0.0 {
        return None;
    }

    let (direction, primary_contact) = match cfg.drive_alignment {
        DriveAlignment::BodyForward => (axes.forward, None),
        DriveAlignment::PrimaryContact => {
            let n = contacts[primary].normal;
            let Some(dir) = ground_forward(axes.right, n, axes.forward) else {
                tracing::trace!(wheel = %contacts[primary].wheel, "degenerate ground forward, drive skipped");
                return None;
            };
            (dir, Some(primary))
        }
    };

    Some(DriveOutput {
        force: direction * magnitude,
        point: body.com + axes.down * cfg.drive_point_drop,
        direction,
        primary_contact,
    })
}
