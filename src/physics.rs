// src/physics.rs

use std::collections::HashMap;

use nalgebra::UnitQuaternion;
use rapier3d::prelude::*;
use rapier3d::prelude::{Group, InteractionGroups};

use crate::controller::types::{ChassisBody, RayCaster, RayHit};
use crate::vehicle::VehicleConfig;

const GROUP_GROUND: Group  = Group::from_bits_truncate(0b0001);
const GROUP_CHASSIS: Group = Group::from_bits_truncate(0b0010);

/// Beyond this distance from the origin a body is considered exploded.
const WORLD_LIMIT: Real = 1_000.0;

pub struct PhysicsWorld {
    pub gravity: Vector<Real>, // gravity vector
    pub pipeline: PhysicsPipeline, // physics pipeline
    pub island_manager: IslandManager, // manages islands of bodies
    pub broad_phase: DefaultBroadPhase, // broad-phase collision detection
    pub narrow_phase: NarrowPhase, // collision detection
    pub bodies: RigidBodySet, // for rigid bodies
    pub colliders: ColliderSet, // for collision shapes
    pub joints: ImpulseJointSet, // for constraints
    pub multibody_joints: MultibodyJointSet,// for articulated bodies
    pub ccd: CCDSolver, // continuous collision detection
    pub query_pipeline: QueryPipeline, // for raycasting
    pub spawns: HashMap<RigidBodyHandle, Vector<Real>>, // chassis → safe position
}

impl PhysicsWorld {
    pub fn new() -> Self {
        let gravity = vector![0.0, -9.81, 0.0];

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        // === Big static ground box, top surface exactly at y = 0 ===
        let ground_rb = RigidBodyBuilder::fixed()
            .translation(vector![0.0, -1.0, 0.0])
            .build();

        let ground_handle = bodies.insert(ground_rb);

        let ground_collider = ColliderBuilder::cuboid(500.0, 1.0, 500.0)
            .collision_groups(InteractionGroups::new(GROUP_GROUND, GROUP_CHASSIS))
            .friction(1.2)
            .restitution(0.0)
            .build();

        colliders.insert_with_parent(ground_collider, ground_handle, &mut bodies);

        let mut query_pipeline = QueryPipeline::new();
        query_pipeline.update(&colliders);

        tracing::info!(bodies = bodies.len(), colliders = colliders.len(), "🌎 ground inserted");

        Self {
            gravity,
            pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies,
            colliders,
            joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            query_pipeline,
            spawns: HashMap::new(),
        }
    }

    /// Static obstacle (ramps, blocks). Rays hit it like the ground.
    pub fn add_static_box(
        &mut self,
        center: Vector<Real>,
        half_extents: Vector<Real>,
        rotation: UnitQuaternion<Real>,
    ) -> ColliderHandle {
        let rb = RigidBodyBuilder::fixed()
            .position(Isometry::from_parts(center.into(), rotation))
            .build();
        let handle = self.bodies.insert(rb);

        let collider = ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
            .collision_groups(InteractionGroups::new(GROUP_GROUND, GROUP_CHASSIS))
            .friction(1.0)
            .restitution(0.0)
            .build();

        let ch = self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        self.query_pipeline.update(&self.colliders);
        ch
    }

    /// Dynamic box chassis at the config's spawn point. Wheels are rays, not
    /// colliders, so the box only touches the world when the suspension bottoms out.
    pub fn spawn_vehicle(&mut self, config: &VehicleConfig) -> RigidBodyHandle {
        let spawn = config.spawn();

        let rb = RigidBodyBuilder::dynamic()
            .translation(spawn)
            .linear_damping(config.linear_damping)
            .angular_damping(config.angular_damping)
            .ccd_enabled(true)
            .build();

        // cuboid takes (x, y, z) = (width, height, length)
        let [hh, hw, hl] = config.half_extents;
        let collider = ColliderBuilder::cuboid(hw, hh, hl)
            .collision_groups(InteractionGroups::new(
                GROUP_CHASSIS,
                GROUP_GROUND | GROUP_CHASSIS,
            ))
            .active_events(ActiveEvents::empty())
            .mass(config.mass)
            .friction(0.0) // IMPORTANT
            .restitution(0.0)
            .build();

        let handle = self.bodies.insert(rb);
        self.colliders.insert_with_parent(collider, handle, &mut self.bodies);
        self.spawns.insert(handle, spawn);
        self.query_pipeline.update(&self.colliders);

        tracing::info!(?handle, spawn = ?config.spawn_point, mass = config.mass, "🚗 spawned vehicle body");
        handle
    }

    pub fn remove_vehicle(&mut self, handle: RigidBodyHandle) {
        self.spawns.remove(&handle);
        self.bodies.remove(
            handle,
            &mut self.island_manager,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            true,
        );
        self.query_pipeline.update(&self.colliders);
    }

    /// Body + ray service view of one chassis, for VehicleController::on_tick.
    pub fn chassis(&mut self, handle: RigidBodyHandle) -> Option<RapierChassis<'_>> {
        self.bodies.get(handle)?;
        Some(RapierChassis {
            bodies: &mut self.bodies,
            colliders: &self.colliders,
            query: &self.query_pipeline,
            handle,
        })
    }

    /// Sync ray queries with collider positions before controllers run.
    pub fn refresh_queries(&mut self) {
        self.query_pipeline.update(&self.colliders);
    }

    /// Steps the world; returns the chassis bodies that had to be pulled back.
    pub fn step(&mut self, dt: Real) -> Vec<RigidBodyHandle> {
        self.pipeline.step(
            &self.gravity,
            &IntegrationParameters {
                dt,
                ..IntegrationParameters::default()
            },
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            Some(&mut self.query_pipeline),
            &(),
            &(),
        );

        // Safety: prevent bodies from exploding to insane coordinates
        let mut recovered = Vec::new();
        for (&handle, &spawn) in self.spawns.iter() {
            let Some(body) = self.bodies.get_mut(handle) else { continue };
            let pos = *body.translation();

            let bad = pos.iter().any(|c| !c.is_finite() || c.abs() > WORLD_LIMIT)
                || !body.rotation().coords.iter().all(|c| c.is_finite());

            if bad {
                body.set_translation(spawn, true);
                body.set_rotation(UnitQuaternion::identity(), true);
                body.set_linvel(Vector::zeros(), true);
                body.set_angvel(Vector::zeros(), true);
                tracing::warn!(?handle, ?pos, "⚠️ reset exploding body back to spawn");
                recovered.push(handle);
            }
        }
        recovered
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

// ------------------------------------------------------------------------------
// rapier adapter for the controller seams
// ------------------------------------------------------------------------------

pub struct RapierChassis<'a> {
    bodies: &'a mut RigidBodySet,
    colliders: &'a ColliderSet,
    query: &'a QueryPipeline,
    handle: RigidBodyHandle,
}

impl RapierChassis<'_> {
    fn body(&self) -> &RigidBody {
        &self.bodies[self.handle]
    }

    fn body_mut(&mut self) -> &mut RigidBody {
        &mut self.bodies[self.handle]
    }
}

impl RayCaster for RapierChassis<'_> {
    fn cast_ray(&self, origin: Point<Real>, dir: Vector<Real>, max_dist: Real) -> Option<RayHit> {
        let ray = Ray::new(origin, dir);
        let filter = QueryFilter::default().exclude_rigid_body(self.handle);

        let (_collider, hit) = self.query.cast_ray_and_get_normal(
            &*self.bodies,
            self.colliders,
            &ray,
            max_dist,
            true,
            filter,
        )?;

        Some(RayHit {
            distance: hit.time_of_impact,
            normal: hit.normal,
            point: ray.point_at(hit.time_of_impact),
        })
    }
}

impl ChassisBody for RapierChassis<'_> {
    fn position(&self) -> Isometry<Real> { *self.body().position() }
    fn center_of_mass(&self) -> Point<Real> { *self.body().center_of_mass() }
    fn linvel(&self) -> Vector<Real> { *self.body().linvel() }
    fn angvel(&self) -> Vector<Real> { *self.body().angvel() }

    fn set_linvel(&mut self, v: Vector<Real>) { self.body_mut().set_linvel(v, true) }
    fn set_angvel(&mut self, w: Vector<Real>) { self.body_mut().set_angvel(w, true) }
    fn set_translation(&mut self, p: Vector<Real>) { self.body_mut().set_translation(p, true) }
    fn set_rotation(&mut self, q: UnitQuaternion<Real>) { self.body_mut().set_rotation(q, true) }

    fn apply_force(&mut self, force: Vector<Real>, point: Point<Real>) {
        self.body_mut().add_force_at_point(force, point, true)
    }

    fn apply_torque(&mut self, torque: Vector<Real>) {
        self.body_mut().add_torque(torque, true)
    }

    fn apply_impulse(&mut self, impulse: Vector<Real>, point: Point<Real>) {
        self.body_mut().apply_impulse_at_point(impulse, point, true)
    }

    fn clear_forces(&mut self) {
        let body = self.body_mut();
        body.reset_forces(true);
        body.reset_torques(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::ARCADE;
    use approx::assert_relative_eq;

    #[test]
    fn ground_top_face_is_at_zero() {
        let mut world = PhysicsWorld::new();
        let handle = world.spawn_vehicle(&ARCADE);
        let chassis = world.chassis(handle).unwrap();

        let hit = chassis
            .cast_ray(Point::new(10.0, 5.0, -3.0), vector![0.0, -1.0, 0.0], 10.0)
            .unwrap();
        assert_relative_eq!(hit.distance, 5.0, epsilon = 1e-4);
        assert_relative_eq!(hit.point.y, 0.0, epsilon = 1e-4);
        assert_relative_eq!(hit.normal, vector![0.0, 1.0, 0.0], epsilon = 1e-4);
    }

    #[test]
    fn rays_ignore_own_chassis() {
        let mut world = PhysicsWorld::new();
        let handle = world.spawn_vehicle(&ARCADE);
        let chassis = world.chassis(handle).unwrap();

        // straight down through the car body
        let hit = chassis
            .cast_ray(Point::new(0.0, 3.0, 0.0), vector![0.0, -1.0, 0.0], 10.0)
            .unwrap();
        assert_relative_eq!(hit.point.y, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn spawned_body_matches_config() {
        let mut world = PhysicsWorld::new();
        let handle = world.spawn_vehicle(&ARCADE);
        assert_relative_eq!(*world.bodies[handle].translation(), ARCADE.spawn());

        world.step(1.0 / 60.0);
        assert_relative_eq!(world.bodies[handle].mass(), ARCADE.mass, epsilon = 1e-2);
    }

    #[test]
    fn unknown_handle_has_no_chassis() {
        let mut world = PhysicsWorld::new();
        let handle = world.spawn_vehicle(&ARCADE);
        world.remove_vehicle(handle);
        assert!(world.chassis(handle).is_none());
    }

    #[test]
    fn exploded_body_is_pulled_back() {
        let mut world = PhysicsWorld::new();
        let handle = world.spawn_vehicle(&ARCADE);
        world.bodies[handle].set_translation(vector![5_000.0, 0.0, 0.0], true);

        let recovered = world.step(1.0 / 60.0);
        assert_eq!(recovered, vec![handle]);
        assert_relative_eq!(*world.bodies[handle].translation(), ARCADE.spawn());
    }

    #[test]
    fn cleared_forces_do_not_act() {
        let mut world = PhysicsWorld::new();
        let handle = world.spawn_vehicle(&ARCADE);
        {
            let mut chassis = world.chassis(handle).unwrap();
            chassis.apply_force(vector![5_000.0, 0.0, 0.0], Point::new(0.0, 1.0, 0.0));
            chassis.apply_torque(vector![0.0, 500.0, 0.0]);
            chassis.clear_forces();
        }
        world.step(1.0 / 60.0);
        let body = &world.bodies[handle];
        assert_relative_eq!(body.linvel().x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(body.angvel().y, 0.0, epsilon = 1e-5);
    }
}
