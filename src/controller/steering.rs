// ==============================================================================
// steering.rs - YAW TORQUE FROM LEFT/RIGHT INPUT
// ==============================================================================
// τ = up_body * yaw_torque * (left - right)
//
// - No grounded gating: the car can be spun in the air.
// - Left alone gives +τ about the chassis up axis (nose swings toward +X,
//   the chassis left). Right alone gives -τ. Both held cancel to zero.
// - Independent of forward/back input.
// ==============================================================================

use rapier3d::prelude::{Real, Vector};

use crate::controller::kinematics::BodyAxes;
use crate::input::InputState;
use crate::vehicle::VehicleConfig;

pub fn yaw_torque(axes: &BodyAxes, input: &InputState, cfg: &VehicleConfig) -> Vector<Real> {
    let steer = input.steer_axis();
    if steer == 0.0 {
        return Vector::zeros();
    }
    axes.up() * (cfg.yaw_torque * steer)
}
