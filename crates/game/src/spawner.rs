//! Zombie spawning at the configured spawn points.
//!
//! Every zombie is born at a random point inside a randomly chosen spawn
//! area and is told to walk to the village.

use engine_core::{Transform, Vec3};
use hecs::{Entity, World};
use navigation::NavAgent;
use physics::ColliderHandle;
use rand::Rng;

use crate::area::Area;
use crate::config::{WorldConfig, ZombieConfig};
use crate::zombie::{AgentCollider, Zombie};

/// Components of one zombie.
pub struct ZombieBundle {
    pub transform: Transform,
    pub zombie: Zombie,
    pub nav: NavAgent,
    pub collider: AgentCollider,
}

impl ZombieBundle {
    pub fn new(config: &ZombieConfig, home: Area, position: Vec3) -> Self {
        Self {
            transform: Transform::from_position(position),
            zombie: Zombie::new(config.clone(), home),
            nav: NavAgent::new(config.roam_speed),
            collider: AgentCollider::default(),
        }
    }

    pub fn with_collider(mut self, collider: Option<ColliderHandle>) -> Self {
        self.collider = AgentCollider(collider);
        self
    }

    /// Spawn into the ECS world.
    pub fn spawn(self, world: &mut World) -> Entity {
        world.spawn((self.transform, self.zombie, self.nav, self.collider))
    }
}

/// Picks where zombies appear and which area they call home.
#[derive(Debug, Clone)]
pub struct EnemySpawner {
    pub spawn_points: Vec<Area>,
    pub home: Area,
    /// Zombies spawned so far.
    pub spawned: usize,
}

impl EnemySpawner {
    pub fn new(spawn_points: Vec<Area>, home: Area) -> Self {
        Self {
            spawn_points,
            home,
            spawned: 0,
        }
    }

    pub fn from_config(world: &WorldConfig) -> Self {
        Self::new(
            world.spawn_points.iter().map(Area::from).collect(),
            Area::from(&world.village),
        )
    }

    /// Random point in a random spawn area, or None without spawn points.
    pub fn random_spawn_position<R: Rng>(&self, rng: &mut R) -> Option<Vec3> {
        if self.spawn_points.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.spawn_points.len());
        Some(self.spawn_points[index].random_point(rng))
    }

    /// Spawn one zombie. `make_collider` is handed the feet position so the
    /// caller can add a capsule to its physics world.
    pub fn spawn<R, F>(
        &mut self,
        world: &mut World,
        config: &ZombieConfig,
        rng: &mut R,
        make_collider: F,
    ) -> Option<Entity>
    where
        R: Rng,
        F: FnOnce(Vec3) -> Option<ColliderHandle>,
    {
        let Some(position) = self.random_spawn_position(rng) else {
            log::warn!("No spawn points configured, zombie not spawned");
            return None;
        };
        let entity = ZombieBundle::new(config, self.home.clone(), position)
            .with_collider(make_collider(position))
            .spawn(world);
        self.spawned += 1;
        log::debug!("Spawned zombie {:?} at {:?}", entity, position);
        Some(entity)
    }
}
