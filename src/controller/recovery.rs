// ==============================================================================
// recovery.rs - FLIP IMPULSE + HARD RESET
// ------------------------------------------------------------------------------
// Flip:  world-up impulse at a random point of the chassis footprint,
//        u, v ~ U[-1, 1] independently:
//            p = center + u * half_length * forward + v * half_width * right
// Reset: translation = spawn, rotation = identity, linvel = angvel = 0.
//
// Both commands go through a CommandLatch:
// - TriggerMode::Edge        fire once on the released → held transition,
//                            re-arm on release (Idle → Triggered → Idle)
// - TriggerMode::Continuous  fire on every tick the key is held
// ==============================================================================

use nalgebra::UnitQuaternion;
use rand::Rng;
use rapier3d::prelude::{Point, Real, Vector};
use serde::{Deserialize, Serialize};

use crate::controller::kinematics::BodyAxes;
use crate::controller::types::{BodyState, ChassisBody};
use crate::vehicle::VehicleConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerMode {
    Edge,
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandLatch {
    #[default]
    Idle,
    Triggered,
}

impl CommandLatch {
    /// Advances the latch with this tick's key state; true means "fire now".
    pub fn poll(&mut self, held: bool, mode: TriggerMode) -> bool {
        let was_idle = *self == CommandLatch::Idle;
        *self = if held { CommandLatch::Triggered } else { CommandLatch::Idle };

        match mode {
            TriggerMode::Continuous => held,
            TriggerMode::Edge => held && was_idle,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RecoveryState {
    pub flip: CommandLatch,
    pub reset: CommandLatch,
}

#[derive(Debug, Clone, Copy)]
pub struct FlipEvent {
    pub impulse: Vector<Real>,
    pub point: Point<Real>,
    /// (forward, lateral) offset from the chassis center, meters.
    pub local_offset: [Real; 2],
}

pub fn sample_flip<R: Rng + ?Sized>(
    body: &BodyState,
    axes: &BodyAxes,
    cfg: &VehicleConfig,
    rng: &mut R,
) -> FlipEvent {
    let u: Real = rng.gen_range(-1.0..=1.0);
    let v: Real = rng.gen_range(-1.0..=1.0);
    let along = u * cfg.half_length();
    let across = v * cfg.half_width();

    let center = Point::from(body.pose.translation.vector);
    FlipEvent {
        impulse: Vector::y() * cfg.flip_impulse,
        point: center + axes.forward * along + axes.right * across,
        local_offset: [along, across],
    }
}

pub fn reset_body<B: ChassisBody + ?Sized>(body: &mut B, cfg: &VehicleConfig) {
    body.clear_forces();
    body.set_translation(cfg.spawn());
    body.set_rotation(UnitQuaternion::identity());
    body.set_linvel(Vector::zeros());
    body.set_angvel(Vector::zeros());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing::MockBody;
    use crate::vehicle::ARCADE;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rapier3d::prelude::{vector, Isometry};

    #[test]
    fn edge_latch_fires_once_per_press() {
        let mut latch = CommandLatch::default();
        let held = [false, true, true, true, false, true, false];
        let fired: Vec<bool> = held.iter().map(|h| latch.poll(*h, TriggerMode::Edge)).collect();
        assert_eq!(fired, vec![false, true, false, false, false, true, false]);
    }

    #[test]
    fn continuous_latch_fires_while_held() {
        let mut latch = CommandLatch::default();
        let held = [true, true, false, true];
        let fired: Vec<bool> = held.iter().map(|h| latch.poll(*h, TriggerMode::Continuous)).collect();
        assert_eq!(fired, held.to_vec());
    }

    #[test]
    fn latch_state_tracks_key() {
        let mut latch = CommandLatch::default();
        latch.poll(true, TriggerMode::Edge);
        assert_eq!(latch, CommandLatch::Triggered);
        latch.poll(false, TriggerMode::Edge);
        assert_eq!(latch, CommandLatch::Idle);
    }

    #[test]
    fn flip_points_stay_inside_footprint() {
        let rot = UnitQuaternion::from_euler_angles(2.8, 0.4, 1.0); // mostly upside down
        let pose = Isometry::from_parts(vector![4.0, 0.6, -3.0].into(), rot);
        let body = BodyState { pose, com: Point::from(pose.translation.vector), linvel: Vector::zeros(), angvel: Vector::zeros() };
        let axes = BodyAxes::from_pose(&pose).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1000 {
            let ev = sample_flip(&body, &axes, &ARCADE, &mut rng);
            let [along, across] = ev.local_offset;
            assert!(along.abs() <= ARCADE.half_length());
            assert!(across.abs() <= ARCADE.half_width());

            // back into chassis space
            let local = pose.inverse_transform_point(&ev.point);
            assert!(local.z.abs() <= ARCADE.half_length() + 1e-4);
            assert!(local.x.abs() <= ARCADE.half_width() + 1e-4);
            assert!(local.y.abs() < 1e-4);
        }
    }

    #[test]
    fn flip_impulse_is_world_up() {
        let pose = Isometry::identity();
        let body = BodyState { pose, com: Point::origin(), linvel: Vector::zeros(), angvel: Vector::zeros() };
        let axes = BodyAxes::from_pose(&pose).unwrap();
        let ev = sample_flip(&body, &axes, &ARCADE, &mut StdRng::seed_from_u64(1));
        assert_eq!(ev.impulse, vector![0.0, ARCADE.flip_impulse, 0.0]);
    }

    #[test]
    fn reset_snaps_state_and_is_idempotent() {
        let mut body = MockBody::at(vector![30.0, -2.0, 8.0]);
        body.pose.rotation = UnitQuaternion::from_euler_angles(1.0, 2.0, 3.0);
        body.linvel = vector![5.0, -9.0, 1.0];
        body.angvel = vector![0.3, 4.0, -2.0];

        reset_body(&mut body, &ARCADE);
        let once = (body.pose, body.linvel, body.angvel);
        reset_body(&mut body, &ARCADE);
        let twice = (body.pose, body.linvel, body.angvel);

        assert_eq!(once, twice);
        assert_eq!(body.pose.translation.vector, ARCADE.spawn());
        assert_eq!(body.pose.rotation, UnitQuaternion::identity());
        assert_eq!(body.linvel, Vector::zeros());
        assert_eq!(body.angvel, Vector::zeros());
    }
}
