use std::collections::HashMap;

use rapier3d::prelude::{Real, RigidBodyHandle};
use serde::Serialize;
use uuid::Uuid;

use crate::controller::types::v3;
use crate::controller::{TickReport, VehicleController};
use crate::debug_builders::{build_vehicle_debug, DebugVehicle};
use crate::input::InputState;
use crate::physics::PhysicsWorld;
use crate::spawn::SpawnManager;
use crate::vehicle::{Vehicle, VehicleConfig};

/// Default distance between neighbouring spawn points, meters.
pub const SPAWN_SPACING: f32 = 6.0;

pub struct Entity {
    pub vehicle: Vehicle,
    pub spawn_slot: usize,
    pub last_input: InputState,
    pub last_report: Option<TickReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleSnapshot {
    pub id: Uuid,
    pub grounded_wheels: usize,
    pub speed: f32,
    pub linvel: [f32; 3],
    pub debug: DebugVehicle,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub vehicles: Vec<VehicleSnapshot>,
}

pub struct GameState {
    pub tick: u64,
    pub entities: HashMap<Uuid, Entity>,
    pub spawns: SpawnManager,
}

impl GameState {
    pub fn new() -> Self {
        Self {
            tick: 0,
            entities: HashMap::new(),
            spawns: SpawnManager::new(SPAWN_SPACING),
        }
    }

    /// Spawns a body for `config` at the next free spawn slot.
    pub fn add_vehicle(&mut self, physics: &mut PhysicsWorld, config: VehicleConfig) -> Uuid {
        self.insert(physics, config, None)
    }

    /// Same, with a fixed RNG seed for the flip sampler.
    pub fn add_vehicle_seeded(&mut self, physics: &mut PhysicsWorld, config: VehicleConfig, seed: u64) -> Uuid {
        self.insert(physics, config, Some(seed))
    }

    fn insert(&mut self, physics: &mut PhysicsWorld, mut config: VehicleConfig, seed: Option<u64>) -> Uuid {
        let spawn = self.spawns.allocate(config.spawn_point);
        config.spawn_point = spawn.position;

        let body = physics.spawn_vehicle(&config);
        let controller = match seed {
            Some(seed) => VehicleController::with_seed(config, seed),
            None => VehicleController::new(config),
        };

        let id = Uuid::new_v4();
        self.entities.insert(
            id,
            Entity {
                vehicle: Vehicle { id, body, controller },
                spawn_slot: spawn.slot,
                last_input: InputState::default(),
                last_report: None,
            },
        );
        tracing::info!(%id, slot = spawn.slot, "🟢 vehicle added");
        id
    }

    pub fn remove_vehicle(&mut self, physics: &mut PhysicsWorld, id: &Uuid) -> bool {
        let Some(entity) = self.entities.remove(id) else {
            return false;
        };
        physics.remove_vehicle(entity.vehicle.body);
        self.spawns.release(entity.spawn_slot);
        tracing::info!(%id, "🔴 vehicle removed");
        true
    }

    pub fn update_input(&mut self, id: &Uuid, input: InputState) -> bool {
        match self.entities.get_mut(id) {
            Some(e) => {
                e.last_input = input;
                true
            }
            None => false,
        }
    }

    pub fn body_of(&self, id: &Uuid) -> Option<RigidBodyHandle> {
        self.entities.get(id).map(|e| e.vehicle.body)
    }

    /// One simulation step: every controller ticks against the same
    /// pre-step world, then the world integrates once.
    pub fn step_world(&mut self, physics: &mut PhysicsWorld, dt: Real) -> Snapshot {
        physics.refresh_queries();

        for entity in self.entities.values_mut() {
            let Some(mut chassis) = physics.chassis(entity.vehicle.body) else {
                tracing::warn!(id = %entity.vehicle.id, "vehicle body missing, skipped");
                continue;
            };
            let report = entity.vehicle.controller.on_tick(&mut chassis, entity.last_input, dt);
            entity.last_report = Some(report);
        }

        for handle in physics.step(dt) {
            if let Some(e) = self.entities.values().find(|e| e.vehicle.body == handle) {
                tracing::warn!(id = %e.vehicle.id, "vehicle left the world and was respawned");
            }
        }

        self.tick += 1;
        self.snapshot(physics)
    }

    pub fn snapshot(&self, physics: &PhysicsWorld) -> Snapshot {
        let mut vehicles = Vec::with_capacity(self.entities.len());

        for entity in self.entities.values() {
            let (Some(body), Some(report)) = (physics.bodies.get(entity.vehicle.body), entity.last_report.as_ref()) else {
                continue;
            };
            vehicles.push(VehicleSnapshot {
                id: entity.vehicle.id,
                grounded_wheels: report.grounded_wheels(),
                speed: body.linvel().norm(),
                linvel: v3(*body.linvel()),
                debug: build_vehicle_debug(report, body.position(), &entity.vehicle.controller.config),
            });
        }
        vehicles.sort_by_key(|v| v.id);

        Snapshot { tick: self.tick, vehicles }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}
