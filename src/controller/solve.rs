// ==============================================================================
// solve.rs - PER-TICK VEHICLE CONTROLLER
// ==============================================================================
// VehicleController::on_tick(host, input, dt) runs once per physics step,
// before the engine integrates:
//
//   0) recovery latches        (flip / reset edge or continuous)
//   1) reset                   hard snap, nothing else this tick
//   2) capture BodyState       one pose/velocity snapshot for the whole tick
//   3) sample 4 wheel contacts (read-only borrow of the host)
//   4) suspension forces       one per grounded wheel, at the wheel mount
//   5) drive force             gated on any grounded wheel
//   6) yaw torque              no gating
//   7) flip impulse
//
// Steps 3–7 compute from the same snapshot; the body is only written after
// every contact exists.
// ==============================================================================

use rand::rngs::StdRng;
use rand::SeedableRng;
use rapier3d::prelude::{Real, Vector};

use crate::controller::kinematics::BodyAxes;
use crate::controller::longitudinal::{drive_force, DriveOutput};
use crate::controller::recovery::{reset_body, sample_flip, FlipEvent, RecoveryState};
use crate::controller::steering::yaw_torque;
use crate::controller::types::{BodyState, ChassisBody, RayCaster, WheelId};
use crate::input::{InputState, Key};
use crate::suspension_contact::{sample_wheel_contacts, suspension_force, WheelContact};
use crate::vehicle::VehicleConfig;

/// Everything the controller decided this tick, as plain data.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub dt: Real,
    pub contacts: [WheelContact; 4],
    pub suspension: [Vector<Real>; 4],
    pub drive: Option<DriveOutput>,
    pub steer_torque: Vector<Real>,
    pub flip: Option<FlipEvent>,
    pub reset: bool,
    pub degenerate: bool,
}

impl TickReport {
    fn idle(dt: Real, cfg: &VehicleConfig) -> Self {
        Self {
            dt,
            contacts: WheelId::ALL.map(|w| WheelContact::unavailable(w, cfg.suspension_travel)),
            suspension: [Vector::zeros(); 4],
            drive: None,
            steer_torque: Vector::zeros(),
            flip: None,
            reset: false,
            degenerate: false,
        }
    }

    pub fn grounded_wheels(&self) -> usize {
        self.contacts.iter().filter(|c| c.grounded).count()
    }

    pub fn total_suspension(&self) -> Vector<Real> {
        self.suspension.iter().sum()
    }
}

pub struct VehicleController {
    pub config: VehicleConfig,
    recovery: RecoveryState,
    rng: StdRng,
}

impl VehicleController {
    pub fn new(config: VehicleConfig) -> Self {
        Self {
            config,
            recovery: RecoveryState::default(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic flip sampling.
    pub fn with_seed(config: VehicleConfig, seed: u64) -> Self {
        Self {
            config,
            recovery: RecoveryState::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn recovery(&self) -> &RecoveryState {
        &self.recovery
    }

    pub fn on_tick<H>(&mut self, host: &mut H, input: InputState, dt: Real) -> TickReport
    where
        H: ChassisBody + RayCaster,
    {
        let cfg = &self.config;
        let mut report = TickReport::idle(dt, cfg);

        let fire_flip = self.recovery.flip.poll(input.pressed(Key::Flip), cfg.trigger_mode);
        let fire_reset = self.recovery.reset.poll(input.pressed(Key::Reset), cfg.trigger_mode);

        if fire_reset {
            reset_body(&mut *host, cfg);
            tracing::debug!(spawn = ?cfg.spawn_point, "vehicle reset");
            report.reset = true;
            return report;
        }

        host.clear_forces();

        let body = BodyState::capture(&*host);
        let Some(axes) = BodyAxes::from_pose(&body.pose) else {
            tracing::warn!(pose = ?body.pose, "degenerate chassis axes, tick skipped");
            report.degenerate = true;
            return report;
        };

        // ---------------------------------------------
        // 1) sense (read-only)
        // ---------------------------------------------
        let contacts = sample_wheel_contacts(&body.pose, &axes, cfg, &*host);
        let suspension = contacts.map(|c| suspension_force(&c, &body, cfg));
        let drive = drive_force(&contacts, &axes, &body, &input, cfg);
        let steer_torque = yaw_torque(&axes, &input, cfg);
        let flip = fire_flip.then(|| sample_flip(&body, &axes, cfg, &mut self.rng));

        // ---------------------------------------------
        // 2) act
        // ---------------------------------------------
        for (c, f) in contacts.iter().zip(suspension.iter()) {
            if c.grounded {
                host.apply_force(*f, c.origin);
            }
        }

        if let Some(d) = &drive {
            host.apply_force(d.force, d.point);
        }

        if steer_torque != Vector::zeros() {
            host.apply_torque(steer_torque);
        }

        if let Some(ev) = &flip {
            host.apply_impulse(ev.impulse, ev.point);
            tracing::debug!(point = ?ev.local_offset, "flip impulse");
        }

        report.contacts = contacts;
        report.suspension = suspension;
        report.drive = drive;
        report.steer_torque = steer_torque;
        report.flip = flip;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing::{FlatGround, MockBody, TestHost};
    use crate::controller::recovery::TriggerMode;
    use crate::vehicle::ARCADE;
    use approx::assert_relative_eq;
    use nalgebra::UnitQuaternion;
    use rapier3d::prelude::{vector, Real};

    const DT: Real = 1.0 / 60.0;

    fn grounded_host() -> TestHost {
        // compression 0.5 on all wheels
        TestHost::new(MockBody::at(vector![0.0, 0.85, 0.0]), Some(FlatGround::new(0.0)))
    }

    fn airborne_host() -> TestHost {
        TestHost::new(MockBody::at(vector![0.0, 20.0, 0.0]), None)
    }

    fn controller() -> VehicleController {
        VehicleController::with_seed(ARCADE, 42)
    }

    #[test]
    fn grounded_rest_applies_four_suspension_forces() {
        let mut host = grounded_host();
        let report = controller().on_tick(&mut host, InputState::new(), DT);

        assert_eq!(report.grounded_wheels(), 4);
        assert_eq!(host.body.forces.len(), 4);
        for (f, c) in host.body.forces.iter().zip(report.contacts.iter()) {
            assert_eq!(f.1, c.origin);
            assert_relative_eq!(f.0, vector![0.0, ARCADE.spring_k * 0.5, 0.0], epsilon = 1e-3);
        }
        assert!(report.drive.is_none());
        assert!(host.body.torques.is_empty());
    }

    #[test]
    fn airborne_submits_no_suspension_or_drive() {
        let mut host = airborne_host();
        let input = InputState::new().with(Key::Forward);
        let report = controller().on_tick(&mut host, input, DT);

        assert_eq!(report.grounded_wheels(), 0);
        assert_eq!(report.total_suspension(), Vector::zeros());
        assert!(report.drive.is_none());
        assert!(host.body.forces.is_empty());
    }

    #[test]
    fn airborne_still_steers() {
        let mut host = airborne_host();
        let report = controller().on_tick(&mut host, InputState::new().with(Key::Right), DT);
        assert_eq!(host.body.torques.len(), 1);
        assert!(report.steer_torque.y < 0.0);
    }

    #[test]
    fn forward_input_adds_drive_force_below_com() {
        let mut host = grounded_host();
        let report = controller().on_tick(&mut host, InputState::new().with(Key::Forward), DT);

        let drive = report.drive.unwrap();
        assert_eq!(host.body.forces.len(), 5);
        let (f, p) = host.body.forces[4];
        assert_relative_eq!(f, vector![0.0, 0.0, ARCADE.forward_force], epsilon = 1e-3);
        assert!(p.y < host.body.center_of_mass().y);
        assert_eq!(drive.primary_contact, Some(0));
    }

    #[test]
    fn forces_are_cleared_every_tick() {
        let mut host = grounded_host();
        let mut ctl = controller();
        ctl.on_tick(&mut host, InputState::new(), DT);
        ctl.on_tick(&mut host, InputState::new(), DT);
        assert_eq!(host.body.clears, 2);
    }

    #[test]
    fn edge_flip_fires_once_while_held() {
        let mut host = airborne_host();
        let mut ctl = controller();
        let held = InputState::new().with(Key::Flip);
        for _ in 0..10 {
            ctl.on_tick(&mut host, held, DT);
        }
        assert_eq!(host.body.impulses.len(), 1);

        ctl.on_tick(&mut host, InputState::new(), DT);
        ctl.on_tick(&mut host, held, DT);
        assert_eq!(host.body.impulses.len(), 2);
    }

    #[test]
    fn continuous_flip_fires_every_held_tick() {
        let mut host = airborne_host();
        let cfg = VehicleConfig { trigger_mode: TriggerMode::Continuous, ..ARCADE };
        let mut ctl = VehicleController::with_seed(cfg, 3);
        for _ in 0..10 {
            ctl.on_tick(&mut host, InputState::new().with(Key::Flip), DT);
        }
        assert_eq!(host.body.impulses.len(), 10);
    }

    #[test]
    fn flip_point_is_inside_chassis_footprint() {
        let mut host = grounded_host();
        let mut ctl = controller();
        for _ in 0..200 {
            ctl.on_tick(&mut host, InputState::new().with(Key::Flip), DT);
            ctl.on_tick(&mut host, InputState::new(), DT);
        }
        assert_eq!(host.body.impulses.len(), 200);
        for (j, p) in &host.body.impulses {
            assert_relative_eq!(*j, vector![0.0, ARCADE.flip_impulse, 0.0]);
            assert!(p.z.abs() <= ARCADE.half_length() + 1e-5);
            assert!(p.x.abs() <= ARCADE.half_width() + 1e-5);
        }
    }

    #[test]
    fn reset_from_any_state_is_exact() {
        let mut host = grounded_host();
        host.body.pose.translation.vector = vector![55.0, 3.0, -12.0];
        host.body.pose.rotation = UnitQuaternion::from_euler_angles(3.0, 0.2, -1.0);
        host.body.linvel = vector![10.0, 2.0, -7.0];
        host.body.angvel = vector![1.0, -5.0, 0.5];

        let mut ctl = controller();
        let report = ctl.on_tick(&mut host, InputState::new().with(Key::Reset), DT);

        assert!(report.reset);
        assert_eq!(host.body.pose.translation.vector, ARCADE.spawn());
        assert_eq!(host.body.pose.rotation, UnitQuaternion::identity());
        assert_eq!(host.body.linvel, Vector::zeros());
        assert_eq!(host.body.angvel, Vector::zeros());
        assert!(host.body.forces.is_empty());
        assert!(host.body.impulses.is_empty());
    }

    #[test]
    fn reset_twice_matches_reset_once() {
        let cfg = VehicleConfig { trigger_mode: TriggerMode::Continuous, ..ARCADE };
        let mut ctl = VehicleController::with_seed(cfg, 9);
        let mut host = grounded_host();
        host.body.linvel = vector![3.0, 0.0, 1.0];

        ctl.on_tick(&mut host, InputState::new().with(Key::Reset), DT);
        let once = (host.body.pose, host.body.linvel, host.body.angvel);
        ctl.on_tick(&mut host, InputState::new().with(Key::Reset), DT);
        assert_eq!(once, (host.body.pose, host.body.linvel, host.body.angvel));
    }

    #[test]
    fn degenerate_pose_submits_nothing() {
        let mut host = grounded_host();
        host.body.pose.translation.vector = vector![Real::NAN, 1.0, 0.0];
        let input = InputState::new().with(Key::Forward).with(Key::Left).with(Key::Flip);
        let report = controller().on_tick(&mut host, input, DT);

        assert!(report.degenerate);
        assert!(host.body.forces.is_empty());
        assert!(host.body.torques.is_empty());
        assert!(host.body.impulses.is_empty());
    }

    #[test]
    fn reset_recovers_a_degenerate_pose() {
        let mut host = grounded_host();
        host.body.pose.translation.vector = vector![Real::NAN, Real::NAN, 0.0];
        let report = controller().on_tick(&mut host, InputState::new().with(Key::Reset), DT);
        assert!(report.reset);
        assert_eq!(host.body.pose.translation.vector, ARCADE.spawn());
    }
}
