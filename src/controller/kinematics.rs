// ==============================================================================
// kinematics.rs - CHASSIS BASIS + POINT VELOCITY + GROUND ALIGNMENT
// ------------------------------------------------------------------------------
// Pure functions over explicit pose/velocity values (no body handle):
//
// BodyAxes::from_pose(pose):
// - Transforms the local unit axes through the full world transform, removes
//   the translation again and re-normalizes. Local frame: +Z forward, +Y up,
//   -X right.
// - Returns None when any axis degenerates (near-zero or non-finite), so a
//   broken pose never feeds NaN into force application.
//
// point_velocity(linvel, angvel, com, p):
//     v(p) = v_com + ω × (p - com)
//
// ground_forward(right, normal, body_forward):
// - normalize(right × n), flipped when it points against the chassis forward.
//   With -X as right the raw cross product points backwards on level ground,
//   so the flip is taken on every ordinary tick.
// ==============================================================================

use rapier3d::prelude::{Isometry, Point, Real, Vector};

pub const AXIS_EPS: Real = 1e-6;

/// Chassis-local unit directions.
pub const LOCAL_FORWARD: [Real; 3] = [0.0, 0.0, 1.0];
pub const LOCAL_RIGHT: [Real; 3] = [-1.0, 0.0, 0.0];
pub const LOCAL_DOWN: [Real; 3] = [0.0, -1.0, 0.0];

/// World-space unit axes of the chassis for one tick.
#[derive(Debug, Clone, Copy)]
pub struct BodyAxes {
    pub forward: Vector<Real>,
    pub right: Vector<Real>,
    pub down: Vector<Real>,
}

impl BodyAxes {
    pub fn from_pose(pose: &Isometry<Real>) -> Option<Self> {
        Some(Self {
            forward: world_axis(pose, LOCAL_FORWARD)?,
            right: world_axis(pose, LOCAL_RIGHT)?,
            down: world_axis(pose, LOCAL_DOWN)?,
        })
    }

    #[inline]
    pub fn up(&self) -> Vector<Real> {
        -self.down
    }
}

// local unit vector → world point → minus position → unit direction
fn world_axis(pose: &Isometry<Real>, local: [Real; 3]) -> Option<Vector<Real>> {
    let p = pose * Point::new(local[0], local[1], local[2]);
    safe_normalize(p.coords - pose.translation.vector)
}

#[inline]
pub fn safe_normalize(v: Vector<Real>) -> Option<Vector<Real>> {
    let n = v.norm();
    if n.is_finite() && n > AXIS_EPS { Some(v / n) } else { None }
}

/// World-space velocity of an arbitrary point rigidly attached to the body:
/// v(p) = v_com + ω × (p - com)
#[inline]
pub fn point_velocity(linvel: Vector<Real>, angvel: Vector<Real>, com: Point<Real>, p: Point<Real>) -> Vector<Real> {
    let r = p.coords - com.coords;
    linvel + angvel.cross(&r)
}

/// Chassis forward projected into the contact plane.
pub fn ground_forward(right: Vector<Real>, normal: Vector<Real>, body_forward: Vector<Real>) -> Option<Vector<Real>> {
    let f = safe_normalize(right.cross(&normal))?;
    if f.dot(&body_forward) < 0.0 { Some(-f) } else { Some(f) }
}
